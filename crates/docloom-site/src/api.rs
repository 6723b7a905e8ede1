//! API reference normalization.
//!
//! Python and C/C++ references become Sphinx directives (autodoc and
//! breathe do the extraction at build time). Other languages need an
//! [`ApiExtractor`](crate::ApiExtractor) or manually written content.

use std::fmt;

use docloom_config::RawEntry;
use docloom_markup::heading;

use crate::diagnostics::RunContext;
use crate::extract::{ExtractRequest, ExtractorRegistry};
use crate::fields;
use crate::paths::resolve_from;

/// Languages with API reference support.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ApiLanguage {
    Python,
    C,
    Cpp,
    Go,
    Java,
    Rust,
    Protobuf,
}

impl ApiLanguage {
    /// Parse a language name as written in the configuration.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "python" | "py" => Some(Self::Python),
            "c" => Some(Self::C),
            "cpp" | "c++" | "cxx" => Some(Self::Cpp),
            "go" | "golang" => Some(Self::Go),
            "java" => Some(Self::Java),
            "rust" | "rs" => Some(Self::Rust),
            "protobuf" | "proto" => Some(Self::Protobuf),
            _ => None,
        }
    }

    /// Identifier used in configuration and logs.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Python => "python",
            Self::C => "c",
            Self::Cpp => "cpp",
            Self::Go => "go",
            Self::Java => "java",
            Self::Rust => "rust",
            Self::Protobuf => "protobuf",
        }
    }

    /// Display name used in generated text.
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::Python => "Python",
            Self::C => "C",
            Self::Cpp => "C++",
            Self::Go => "Go",
            Self::Java => "Java",
            Self::Rust => "Rust",
            Self::Protobuf => "Protobuf",
        }
    }

    /// Fields naming what to extract, for tool-extracted languages.
    fn target_fields(self) -> &'static [&'static str] {
        match self {
            Self::Go => &["godoc_package", "godoc_packages", "godoc_function", "godoc_type"],
            Self::Java => &["java_package", "java_packages", "java_source_files", "javadoc_path"],
            Self::Rust => &["rustdoc_crate", "rustdoc_path"],
            Self::Protobuf => &["proto_files", "proto_package", "proto_path"],
            Self::Python | Self::C | Self::Cpp => &[],
        }
    }

    /// Field naming the source tree the extractor runs in.
    fn source_field(self) -> Option<&'static str> {
        match self {
            Self::Go => Some("godoc_path"),
            Self::Java => Some("java_source_path"),
            Self::Python | Self::C | Self::Cpp | Self::Rust | Self::Protobuf => None,
        }
    }

    /// Field holding hand-written reference content.
    fn manual_field(self) -> Option<&'static str> {
        match self {
            Self::Go => Some("godoc_manual_content"),
            Self::Java => Some("java_manual_content"),
            Self::Rust => Some("rustdoc_manual_content"),
            Self::Protobuf => Some("protodoc_manual_content"),
            Self::Python | Self::C | Self::Cpp => None,
        }
    }
}

impl fmt::Display for ApiLanguage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Field prefixes that imply a language when `language` is not set.
const INFERRED: [(&str, ApiLanguage); 5] = [
    ("doxygen_", ApiLanguage::Cpp),
    ("godoc_", ApiLanguage::Go),
    ("java_", ApiLanguage::Java),
    ("rustdoc_", ApiLanguage::Rust),
    ("proto", ApiLanguage::Protobuf),
];

/// Normalized API reference of one page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiReference {
    /// Free text from `api_reference`.
    pub preamble: Option<String>,
    pub body: Option<ApiBody>,
}

/// Reference content below the heading.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApiBody {
    /// Sphinx directives, rendered as written.
    Directives(Vec<String>),
    /// Extracted or manually written reStructuredText.
    Text(String),
    /// Nothing could be produced for these targets.
    Unavailable {
        language: ApiLanguage,
        targets: Vec<String>,
    },
}

impl ApiReference {
    #[must_use]
    pub fn render(&self) -> String {
        let mut out = match &self.preamble {
            Some(preamble) => {
                let mut out = heading("API Reference", '-');
                out.push_str(preamble.trim_end());
                out.push_str("\n\n");
                out
            }
            None => heading("API Documentation", '-'),
        };

        match &self.body {
            Some(ApiBody::Directives(directives)) => {
                for directive in directives {
                    out.push_str(directive);
                }
            }
            Some(ApiBody::Text(text)) => {
                out.push_str(text.trim_end());
                out.push_str("\n\n");
            }
            Some(ApiBody::Unavailable { language, targets }) => {
                out.push_str(".. note::\n\n");
                out.push_str(&format!(
                    "   {} API extraction is unavailable. Documented targets:\n\n",
                    language.label()
                ));
                for target in targets {
                    out.push_str(&format!("   * ``{target}``\n"));
                }
                out.push('\n');
            }
            None => {}
        }
        out
    }
}

/// Run-wide inputs for API resolution.
#[derive(Debug, Clone, Copy)]
pub(crate) struct ApiInputs<'a> {
    pub extraction_enabled: bool,
    pub project_name: &'a str,
    pub extractors: &'a ExtractorRegistry,
}

/// Build the API reference of a page, if it declares one.
pub(crate) fn resolve(
    entry: &RawEntry,
    inputs: &ApiInputs<'_>,
    ctx: &mut RunContext,
) -> Option<ApiReference> {
    let preamble = fields::text(entry, "api_reference", ctx);
    let body = language_of(entry, ctx).and_then(|language| match language {
        ApiLanguage::Python => python_directives(entry, ctx),
        ApiLanguage::C | ApiLanguage::Cpp => doxygen_directives(entry, inputs.project_name, ctx),
        _ => extracted(entry, language, inputs, ctx),
    });

    if preamble.is_none() && body.is_none() {
        return None;
    }
    Some(ApiReference { preamble, body })
}

fn language_of(entry: &RawEntry, ctx: &mut RunContext) -> Option<ApiLanguage> {
    if let Some(name) = fields::text(entry, "language", ctx) {
        let language = ApiLanguage::parse(&name);
        if language.is_none() {
            ctx.warn(
                &entry.id,
                Some("language"),
                format!("unsupported API language '{name}'; API reference omitted"),
            );
        }
        return language;
    }
    if fields::value(entry, "module").is_some() {
        return Some(ApiLanguage::Python);
    }
    entry.fields.keys().filter_map(|k| k.as_str()).find_map(|key| {
        INFERRED
            .iter()
            .find(|(prefix, _)| key.starts_with(prefix))
            .map(|&(_, language)| language)
    })
}

fn python_directives(entry: &RawEntry, ctx: &mut RunContext) -> Option<ApiBody> {
    let modules = fields::list(entry, "module", ctx)?;
    let directives = modules
        .iter()
        .map(|module| {
            format!(
                ".. automodule:: {module}\n   :members:\n   :undoc-members:\n   :show-inheritance:\n\n"
            )
        })
        .collect();
    Some(ApiBody::Directives(directives))
}

fn doxygen_directives(entry: &RawEntry, project: &str, ctx: &mut RunContext) -> Option<ApiBody> {
    let mut directives = Vec::new();
    let mut push = |directive: &str, target: &str, members: bool| {
        let mut text = format!(".. {directive}:: {target}\n   :project: {project}\n");
        if members {
            text.push_str("   :members:\n");
        }
        text.push('\n');
        directives.push(text);
    };

    let mut files = fields::list(entry, "doxygen_files", ctx).unwrap_or_default();
    files.extend(fields::list(entry, "doxygen_file", ctx).unwrap_or_default());
    if files.is_empty() && fields::value(entry, "doxygen_class").is_none() {
        files = fields::list(entry, "module", ctx).unwrap_or_default();
    }
    for file in &files {
        push("doxygenfile", file, false);
    }
    for class in fields::list(entry, "doxygen_class", ctx).unwrap_or_default() {
        push("doxygenclass", &class, true);
    }
    for function in fields::list(entry, "doxygen_function", ctx).unwrap_or_default() {
        push("doxygenfunction", &function, false);
    }
    for namespace in fields::list(entry, "doxygen_namespace", ctx).unwrap_or_default() {
        push("doxygennamespace", &namespace, true);
    }

    (!directives.is_empty()).then_some(ApiBody::Directives(directives))
}

/// Adapter output, then manual content, then an unavailable note.
fn extracted(
    entry: &RawEntry,
    language: ApiLanguage,
    inputs: &ApiInputs<'_>,
    ctx: &mut RunContext,
) -> Option<ApiBody> {
    let targets: Vec<String> = language
        .target_fields()
        .iter()
        .filter_map(|field| fields::list(entry, field, ctx))
        .flatten()
        .collect();
    let manual_field = language.manual_field();
    let manual = manual_field.and_then(|field| fields::text(entry, field, ctx));

    if targets.is_empty() && manual.is_none() {
        return None;
    }

    let extractor = inputs
        .extraction_enabled
        .then(|| inputs.extractors.get(language))
        .flatten();

    match extractor {
        Some(extractor) if !targets.is_empty() => {
            let base_dir = language
                .source_field()
                .and_then(|field| fields::text(entry, field, ctx))
                .map_or_else(
                    || entry.base_dir().to_path_buf(),
                    |dir| resolve_from(entry.base_dir(), &dir),
                );
            let request = ExtractRequest {
                page_id: &entry.id,
                targets: &targets,
                base_dir: &base_dir,
                fields: &entry.fields,
            };
            match extractor.extract(&request) {
                Ok(text) => {
                    tracing::debug!(page = %entry.id, %language, "Extracted API reference");
                    return Some(ApiBody::Text(text));
                }
                Err(e) => {
                    let message = match manual {
                        Some(_) => format!("{language} extraction failed: {e}; using manual content"),
                        None => format!("{language} extraction failed: {e}"),
                    };
                    ctx.warn(&entry.id, manual_field, message);
                }
            }
        }
        Some(_) => {}
        None if inputs.extraction_enabled && !targets.is_empty() => {
            ctx.advise(
                &entry.id,
                None,
                format!("no {language} extractor available; using manual content if present"),
            );
        }
        None => {}
    }

    Some(match manual {
        Some(text) => ApiBody::Text(text),
        None => ApiBody::Unavailable { language, targets },
    })
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::diagnostics::Severity;
    use crate::extract::{ApiExtractor, ExtractError};
    use crate::fields::test_support::entry;

    struct GoDoc {
        fail: bool,
    }

    impl ApiExtractor for GoDoc {
        fn language(&self) -> ApiLanguage {
            ApiLanguage::Go
        }

        fn extract(&self, request: &ExtractRequest<'_>) -> Result<String, ExtractError> {
            if self.fail {
                Err(ExtractError::Unavailable("go not installed".to_owned()))
            } else {
                Ok(format!("Package ``{}``\n", request.targets.join(", ")))
            }
        }
    }

    fn registry(fail: bool) -> ExtractorRegistry {
        let mut registry = ExtractorRegistry::new();
        registry.register(Box::new(GoDoc { fail }));
        registry
    }

    fn resolve_with(
        yaml: &str,
        registry: &ExtractorRegistry,
        enabled: bool,
    ) -> (Option<ApiReference>, RunContext) {
        let e = entry("api", yaml);
        let inputs = ApiInputs {
            extraction_enabled: enabled,
            project_name: "core",
            extractors: registry,
        };
        let mut ctx = RunContext::new();
        let api = resolve(&e, &inputs, &mut ctx);
        (api, ctx)
    }

    #[test]
    fn test_language_parse() {
        assert_eq!(ApiLanguage::parse("C++"), Some(ApiLanguage::Cpp));
        assert_eq!(ApiLanguage::parse(" Golang "), Some(ApiLanguage::Go));
        assert_eq!(ApiLanguage::parse("proto"), Some(ApiLanguage::Protobuf));
        assert_eq!(ApiLanguage::parse("cobol"), None);
    }

    #[test]
    fn test_python_module() {
        let (api, ctx) = resolve_with("module: mypkg.core\n", &ExtractorRegistry::new(), true);

        assert_eq!(
            api.unwrap().render(),
            "API Documentation\n-----------------\n\n\
             .. automodule:: mypkg.core\n   :members:\n   :undoc-members:\n   :show-inheritance:\n\n"
        );
        assert!(ctx.diagnostics().is_empty());
    }

    #[test]
    fn test_doxygen_directives() {
        let (api, _) = resolve_with(
            "language: cpp\ndoxygen_files: [a.h, b.h]\ndoxygen_class: Widget\n",
            &ExtractorRegistry::new(),
            true,
        );

        assert_eq!(
            api.unwrap().render(),
            "API Documentation\n-----------------\n\n\
             .. doxygenfile:: a.h\n   :project: core\n\n\
             .. doxygenfile:: b.h\n   :project: core\n\n\
             .. doxygenclass:: Widget\n   :project: core\n   :members:\n\n"
        );
    }

    #[test]
    fn test_c_module_becomes_doxygenfile() {
        let (api, _) = resolve_with("language: c\nmodule: io.h\n", &ExtractorRegistry::new(), true);
        let ApiBody::Directives(directives) = api.unwrap().body.unwrap() else {
            panic!("expected directives");
        };
        assert_eq!(directives, vec![".. doxygenfile:: io.h\n   :project: core\n\n"]);
    }

    #[test]
    fn test_preamble_heading() {
        let (api, _) = resolve_with(
            "api_reference: See the generated docs.\n",
            &ExtractorRegistry::new(),
            true,
        );
        assert_eq!(
            api.unwrap().render(),
            "API Reference\n-------------\n\nSee the generated docs.\n\n"
        );
    }

    #[test]
    fn test_extractor_output_used() {
        let (api, ctx) = resolve_with(
            "godoc_package: example.com/pkg\ngodoc_manual_content: manual\n",
            &registry(false),
            true,
        );
        assert_eq!(
            api.unwrap().body,
            Some(ApiBody::Text("Package ``example.com/pkg``\n".to_owned()))
        );
        assert!(ctx.diagnostics().is_empty());
    }

    #[test]
    fn test_extractor_runs_in_source_path() {
        struct JavaDoc;

        impl ApiExtractor for JavaDoc {
            fn language(&self) -> ApiLanguage {
                ApiLanguage::Java
            }

            fn extract(&self, request: &ExtractRequest<'_>) -> Result<String, ExtractError> {
                Ok(format!(
                    "{} in {}",
                    request.targets.join(", "),
                    request.base_dir.display()
                ))
            }
        }

        let mut registry = ExtractorRegistry::new();
        registry.register(Box::new(JavaDoc));
        let (api, ctx) = resolve_with(
            "language: java\njavadoc_path: com/example\njava_source_path: src/main/java\n",
            &registry,
            true,
        );

        assert_eq!(
            api.unwrap().body,
            Some(ApiBody::Text(
                "com/example in /project/src/main/java".to_owned()
            ))
        );
        assert!(ctx.diagnostics().is_empty());
    }

    #[test]
    fn test_extractor_failure_falls_back_to_manual() {
        let (api, ctx) = resolve_with(
            "godoc_package: example.com/pkg\ngodoc_manual_content: Hand-written reference.\n",
            &registry(true),
            true,
        );

        assert_eq!(
            api.unwrap().body,
            Some(ApiBody::Text("Hand-written reference.".to_owned()))
        );
        assert_eq!(ctx.warning_count(), 1);
        assert_eq!(
            ctx.diagnostics()[0].to_string(),
            "[api] godoc_manual_content: go extraction failed: \
             Extraction tool unavailable: go not installed; using manual content"
        );
    }

    #[test]
    fn test_extraction_disabled_uses_manual() {
        let (api, ctx) = resolve_with(
            "godoc_package: example.com/pkg\ngodoc_manual_content: manual\n",
            &registry(false),
            false,
        );
        assert_eq!(api.unwrap().body, Some(ApiBody::Text("manual".to_owned())));
        assert!(ctx.diagnostics().is_empty());
    }

    #[test]
    fn test_no_extractor_no_manual_renders_note() {
        let (api, ctx) = resolve_with(
            "rustdoc_crate: docloom\nrustdoc_path: src/lib.rs\n",
            &ExtractorRegistry::new(),
            true,
        );

        assert_eq!(
            api.unwrap().render(),
            "API Documentation\n-----------------\n\n\
             .. note::\n\n   Rust API extraction is unavailable. Documented targets:\n\n\
             \x20  * ``docloom``\n   * ``src/lib.rs``\n\n"
        );
        assert_eq!(ctx.diagnostics().len(), 1);
        assert_eq!(ctx.diagnostics()[0].severity, Severity::Advisory);
    }

    #[test]
    fn test_unknown_language_warns() {
        let (api, ctx) = resolve_with("language: cobol\nmodule: x\n", &ExtractorRegistry::new(), true);
        assert!(api.is_none());
        assert_eq!(ctx.warning_count(), 1);
    }

    #[test]
    fn test_no_api_fields() {
        let (api, ctx) = resolve_with("title: Plain\n", &ExtractorRegistry::new(), true);
        assert!(api.is_none());
        assert!(ctx.diagnostics().is_empty());
    }
}
