//! Page content assembly.
//!
//! Turns the field bag of a page definition into an ordered list of
//! [`ContentBlock`]s. Each field yields at most one block, always in the
//! same position regardless of the order fields were written in.
//! Problems with one field are reported and never affect other fields.

use std::fs;
use std::path::{Path, PathBuf};

use docloom_config::{RawEntry, Settings, key_label};
use docloom_diagrams::{DiagramLanguage, DirectiveSupport, render_image, render_source};
use docloom_markup::{
    ConvertOptions, DIRECTIVE_INDENT, DocKind, code_block, convert, indent, literal_block,
};
use serde_yaml::Value;

use crate::api::{self, ApiInputs};
use crate::block::{
    ContentBlock, CustomSection, Diagram, DiagramContent, ExampleKind, GuideSection, IncludeKind,
    InstallStep, ListKind, NarrativeSection, RelatedTool, TroubleshootingItem, UsageExample,
};
use crate::diagnostics::RunContext;
use crate::extract::ExtractorRegistry;
use crate::fields::{self, item_text, value_kind};
use crate::paths::{relative_dir, resolve_from};
use crate::tree::PageNode;

/// Fields that are read but do not produce blocks.
const METADATA_FIELDS: &[&str] = &["title", "parent", "description", "language", "module"];

/// Fields that produce blocks.
const BLOCK_FIELDS: &[&str] = &[
    "overview",
    "features",
    "requirements",
    "installation",
    "configuration",
    "workflow",
    "how_it_works",
    "api_reference",
    "usage_examples",
    "python_api",
    "examples",
    "examples_dir",
    "markdown_includes",
    "rst_includes",
    "latex_includes",
    "file_includes",
    "diagram_includes",
    "custom_sections",
    "limitations",
    "best_practices",
    "troubleshooting",
    "notes",
    "see_also",
    "related_tools",
    "references",
    "changelog",
];

/// API extraction parameters.
const EXTRACTION_FIELDS: &[&str] = &[
    "doxygen_files",
    "doxygen_file",
    "doxygen_class",
    "doxygen_function",
    "doxygen_namespace",
    "godoc_package",
    "godoc_packages",
    "godoc_function",
    "godoc_type",
    "godoc_manual_content",
    "godoc_path",
    "java_package",
    "java_packages",
    "java_source_files",
    "java_manual_content",
    "java_source_path",
    "javadoc_path",
    "rustdoc_crate",
    "rustdoc_path",
    "rustdoc_manual_content",
    "proto_files",
    "proto_package",
    "proto_path",
    "protodoc_manual_content",
    "protobuf_diagrams",
];

/// Deprecated fields and their replacements.
const DEPRECATED_FIELDS: &[(&str, &str)] = &[("doxygen_file", "doxygen_files")];

const DEFAULT_EXAMPLE_TITLE: &str = "Example";

/// LaTeX lines that only make sense in a stand-alone document.
const LATEX_PREAMBLE: &[&str] = &[
    "\\documentclass",
    "\\usepackage",
    "\\begin{document}",
    "\\end{document}",
];

/// Builds content blocks for pages of one run.
#[derive(Debug)]
pub struct Assembler<'a> {
    settings: &'a Settings,
    extractors: &'a ExtractorRegistry,
    output_dir: PathBuf,
}

/// Per-page inputs.
struct Page<'a> {
    node: &'a PageNode,
    entry: &'a RawEntry,
    /// Directory the page document is written to.
    dir: PathBuf,
}

impl<'a> Assembler<'a> {
    /// Create an assembler writing pages below `output_dir`.
    ///
    /// `output_dir` should be absolute so image paths can be made relative
    /// to the generated documents.
    #[must_use]
    pub fn new(
        settings: &'a Settings,
        extractors: &'a ExtractorRegistry,
        output_dir: impl Into<PathBuf>,
    ) -> Self {
        Self {
            settings,
            extractors,
            output_dir: output_dir.into(),
        }
    }

    fn support(&self) -> DirectiveSupport {
        DirectiveSupport {
            plantuml: self.settings.diagrams.plantuml,
            mermaid: self.settings.diagrams.mermaid,
        }
    }

    /// Build the blocks of `node` from its definition `entry`.
    pub fn assemble(
        &self,
        node: &PageNode,
        entry: &RawEntry,
        ctx: &mut RunContext,
    ) -> Vec<ContentBlock> {
        check_fields(entry, ctx);

        let output_file = self.output_dir.join(node.output_file());
        let page = Page {
            node,
            entry,
            dir: output_file
                .parent()
                .map_or_else(|| self.output_dir.clone(), Path::to_path_buf),
        };
        let inputs = ApiInputs {
            extraction_enabled: self.settings.extraction.enabled,
            project_name: &self.settings.doxygen.project_name,
            extractors: self.extractors,
        };

        let mut blocks = Vec::new();
        blocks.extend(narrative(entry, "overview", NarrativeSection::Overview, ctx));
        blocks.extend(list(entry, "features", ListKind::Features, ctx));
        blocks.extend(requirements(entry, ctx));
        blocks.extend(installation(entry, ctx));
        blocks.extend(configuration(entry, ctx));
        blocks.extend(guide(entry, GuideSection::Workflow, ctx));
        blocks.extend(guide(entry, GuideSection::HowItWorks, ctx));
        blocks.extend(api::resolve(entry, &inputs, ctx).map(ContentBlock::ApiReference));
        for kind in [ExampleKind::Usage, ExampleKind::PythonApi, ExampleKind::Examples] {
            blocks.extend(examples(entry, kind, ctx));
        }
        blocks.extend(examples_dir(entry, ctx));
        for kind in [
            IncludeKind::Markdown,
            IncludeKind::Rst,
            IncludeKind::Latex,
            IncludeKind::File,
        ] {
            blocks.extend(self.includes(&page, kind, ctx));
        }
        blocks.extend(self.diagrams(&page, ctx));
        blocks.extend(custom_sections(entry, ctx));
        blocks.extend(list(entry, "limitations", ListKind::Limitations, ctx));
        blocks.extend(list(entry, "best_practices", ListKind::BestPractices, ctx));
        blocks.extend(troubleshooting(entry, ctx));
        blocks.extend(narrative(entry, "notes", NarrativeSection::Notes, ctx));
        blocks.extend(list(entry, "see_also", ListKind::SeeAlso, ctx));
        blocks.extend(related_tools(entry, ctx));
        blocks.extend(list(entry, "references", ListKind::References, ctx));
        blocks.extend(narrative(entry, "changelog", NarrativeSection::Changelog, ctx));

        tracing::debug!(page = %node.id, blocks = blocks.len(), "Assembled page");
        blocks
    }

    fn includes(
        &self,
        page: &Page<'_>,
        kind: IncludeKind,
        ctx: &mut RunContext,
    ) -> Option<ContentBlock> {
        let field = kind.field();
        let paths = fields::list(page.entry, field, ctx)?;

        let mut documents = Vec::with_capacity(paths.len());
        for written in &paths {
            let path = resolve_from(page.entry.base_dir(), written);
            let rendered = match kind {
                IncludeKind::Markdown => read(page, field, written, &path, ctx)
                    .map(|text| markdown(page, &path, &text)),
                IncludeKind::Rst => read(page, field, written, &path, ctx),
                IncludeKind::Latex => read(page, field, written, &path, ctx).map(|t| latex(&t)),
                IncludeKind::File => self.file_include(page, written, &path, ctx),
            };
            documents.extend(rendered);
        }

        (!documents.is_empty()).then_some(ContentBlock::Included { kind, documents })
    }

    /// Dispatch a generic include by file name.
    fn file_include(
        &self,
        page: &Page<'_>,
        written: &str,
        path: &Path,
        ctx: &mut RunContext,
    ) -> Option<String> {
        let field = IncludeKind::File.field();
        let extension = path
            .extension()
            .map(|e| e.to_string_lossy().to_ascii_lowercase())
            .unwrap_or_default();

        if DocKind::from_path(path) == DocKind::License || extension == "txt" {
            return read(page, field, written, path, ctx).map(|t| literal_block(&t));
        }
        match extension.as_str() {
            "md" | "markdown" => {
                read(page, field, written, path, ctx).map(|t| markdown(page, path, &t))
            }
            "rst" => read(page, field, written, path, ctx),
            "tex" => read(page, field, written, path, ctx).map(|t| latex(&t)),
            _ => match DiagramLanguage::from_path(path) {
                Some(DiagramLanguage::Svg) => {
                    Some(render_image(&relative_dir(&page.dir, path), None, None))
                }
                Some(language) => read(page, field, written, path, ctx)
                    .map(|t| render_source(language, &t, None, self.support())),
                None => {
                    ctx.warn(
                        &page.node.id,
                        Some(field),
                        format!("unsupported file type '{written}'; skipped"),
                    );
                    None
                }
            },
        }
    }

    fn diagrams(&self, page: &Page<'_>, ctx: &mut RunContext) -> Option<ContentBlock> {
        let field = "diagram_includes";
        let items = fields::items(page.entry, field, ctx)?;

        let mut diagrams = Vec::with_capacity(items.len());
        for (i, item) in items.into_iter().enumerate() {
            let diagram = match item {
                Value::String(written) => self.diagram_file(page, written, None, None, ctx),
                Value::Mapping(_) => {
                    let title = item_text(item, "title");
                    let alt_text = item_text(item, "alt_text");
                    if let Some(written) = item_text(item, "path") {
                        self.diagram_file(page, &written, title, alt_text, ctx)
                    } else if let Some(code) = item_text(item, "code") {
                        inline_diagram(page, item, code, title, ctx)
                    } else {
                        ctx.warn(
                            &page.node.id,
                            Some(field),
                            format!("item {} needs 'path' or 'code'; skipped", i + 1),
                        );
                        None
                    }
                }
                other => {
                    ctx.warn(
                        &page.node.id,
                        Some(field),
                        format!("item {} is {}; skipped", i + 1, value_kind(other)),
                    );
                    None
                }
            };
            diagrams.extend(diagram);
        }

        (!diagrams.is_empty()).then_some(ContentBlock::Diagrams { diagrams })
    }

    fn diagram_file(
        &self,
        page: &Page<'_>,
        written: &str,
        title: Option<String>,
        alt_text: Option<String>,
        ctx: &mut RunContext,
    ) -> Option<Diagram> {
        let field = "diagram_includes";
        let path = resolve_from(page.entry.base_dir(), written);
        let Some(language) = DiagramLanguage::from_path(&path) else {
            ctx.warn(
                &page.node.id,
                Some(field),
                format!("cannot detect diagram language of '{written}'; skipped"),
            );
            return None;
        };

        let content = if language.is_source() {
            DiagramContent::Source(read(page, field, written, &path, ctx)?)
        } else {
            if !path.is_file() {
                ctx.warn(
                    &page.node.id,
                    Some(field),
                    format!("image '{written}' not found; skipped"),
                );
                return None;
            }
            DiagramContent::Image(relative_dir(&page.dir, &path))
        };

        Some(Diagram {
            language,
            content,
            title,
            alt_text,
        })
    }
}

/// Warn about fields that are neither known nor deprecated aliases.
fn check_fields(entry: &RawEntry, ctx: &mut RunContext) {
    for key in entry.fields.keys() {
        let Some(name) = key_label(key) else {
            ctx.warn(&entry.id, None, "non-text field name; ignored");
            continue;
        };
        if let Some((_, replacement)) = DEPRECATED_FIELDS.iter().find(|(old, _)| *old == name) {
            ctx.advise(
                &entry.id,
                Some(name.as_str()),
                format!("deprecated; use {replacement}"),
            );
            continue;
        }
        let known = [METADATA_FIELDS, BLOCK_FIELDS, EXTRACTION_FIELDS]
            .iter()
            .any(|set| set.contains(&name.as_str()));
        if !known {
            ctx.warn(&entry.id, Some(name.as_str()), "unknown field; ignored");
        }
    }
}

fn read(
    page: &Page<'_>,
    field: &str,
    written: &str,
    path: &Path,
    ctx: &mut RunContext,
) -> Option<String> {
    match fs::read_to_string(path) {
        Ok(text) => Some(text),
        Err(e) => {
            ctx.warn(
                &page.node.id,
                Some(field),
                format!("cannot read '{written}': {e}"),
            );
            None
        }
    }
}

/// Convert an included Markdown file, keeping its image paths valid from
/// the page directory.
fn markdown(page: &Page<'_>, path: &Path, text: &str) -> String {
    let source_dir = path.parent().unwrap_or(Path::new("."));
    let options = ConvertOptions::for_page(page.node.title.clone())
        .with_doc_kind(DocKind::from_path(path))
        .with_base_dir(relative_dir(&page.dir, source_dir));
    convert(text, &options)
}

fn narrative(
    entry: &RawEntry,
    field: &str,
    section: NarrativeSection,
    ctx: &mut RunContext,
) -> Option<ContentBlock> {
    fields::text(entry, field, ctx).map(|text| ContentBlock::Narrative { section, text })
}

fn list(entry: &RawEntry, field: &str, kind: ListKind, ctx: &mut RunContext) -> Option<ContentBlock> {
    fields::list(entry, field, ctx).map(|items| ContentBlock::List { kind, items })
}

/// Plain text reads as prose, a list as bullets.
fn requirements(entry: &RawEntry, ctx: &mut RunContext) -> Option<ContentBlock> {
    match fields::value(entry, "requirements")? {
        Value::Sequence(_) => list(entry, "requirements", ListKind::Requirements, ctx),
        _ => narrative(entry, "requirements", NarrativeSection::Requirements, ctx),
    }
}

fn installation(entry: &RawEntry, ctx: &mut RunContext) -> Option<ContentBlock> {
    let field = "installation";
    let value = fields::value(entry, field)?;
    let Value::Mapping(_) = value else {
        return narrative(entry, field, NarrativeSection::Installation, ctx);
    };

    let title = item_text(value, "title");
    let mut steps = Vec::new();
    match value.get("steps") {
        Some(Value::Sequence(items)) => {
            for (i, item) in items.iter().enumerate() {
                match item {
                    Value::Mapping(_) => match item_text(item, "step") {
                        Some(step) => steps.push(InstallStep {
                            step,
                            description: item_text(item, "description"),
                            code: item_text(item, "code"),
                        }),
                        None => ctx.warn(
                            &entry.id,
                            Some(field),
                            format!("step {} has no 'step' text; skipped", i + 1),
                        ),
                    },
                    other => match key_label(other) {
                        Some(step) => steps.push(InstallStep {
                            step,
                            description: None,
                            code: None,
                        }),
                        None => ctx.warn(
                            &entry.id,
                            Some(field),
                            format!("step {} is {}; skipped", i + 1, value_kind(other)),
                        ),
                    },
                }
            }
        }
        None | Some(Value::Null) => {}
        Some(other) => ctx.warn(
            &entry.id,
            Some(field),
            format!("'steps' is {}, expected a list", value_kind(other)),
        ),
    }

    if title.is_none() && steps.is_empty() {
        ctx.warn(&entry.id, Some(field), "expected text or {title, steps}; field ignored");
        return None;
    }
    Some(ContentBlock::InstallationSteps { title, steps })
}

/// Text as prose. Structured values are shown as a YAML example.
fn configuration(entry: &RawEntry, ctx: &mut RunContext) -> Option<ContentBlock> {
    let field = "configuration";
    let value = fields::value(entry, field)?;
    let text = match value {
        Value::Mapping(_) | Value::Sequence(_) => match serde_yaml::to_string(value) {
            Ok(yaml) => code_block("yaml", &yaml),
            Err(e) => {
                ctx.warn(&entry.id, Some(field), format!("cannot render: {e}"));
                return None;
            }
        },
        _ => fields::text(entry, field, ctx)?,
    };
    Some(ContentBlock::Narrative {
        section: NarrativeSection::Configuration,
        text,
    })
}

/// Text as prose, or `{title, description, steps}`.
fn guide(entry: &RawEntry, section: GuideSection, ctx: &mut RunContext) -> Option<ContentBlock> {
    let field = section.field();
    let value = fields::value(entry, field)?;
    let Value::Mapping(_) = value else {
        return fields::text(entry, field, ctx).map(|text| ContentBlock::Guide {
            section,
            title: None,
            description: Some(text),
            steps: Vec::new(),
        });
    };

    let mut steps = Vec::new();
    match value.get("steps") {
        Some(Value::Sequence(items)) => {
            for (i, item) in items.iter().enumerate() {
                match key_label(item) {
                    Some(step) if !step.trim().is_empty() => steps.push(step),
                    Some(_) => {}
                    None => ctx.warn(
                        &entry.id,
                        Some(field),
                        format!("step {} is {}; skipped", i + 1, value_kind(item)),
                    ),
                }
            }
        }
        None | Some(Value::Null) => {}
        Some(other) => ctx.warn(
            &entry.id,
            Some(field),
            format!("'steps' is {}, expected a list", value_kind(other)),
        ),
    }

    let title = item_text(value, "title");
    let description = item_text(value, "description");
    if title.is_none() && description.is_none() && steps.is_empty() {
        ctx.warn(
            &entry.id,
            Some(field),
            "expected text or {title, description, steps}; field ignored",
        );
        return None;
    }
    Some(ContentBlock::Guide {
        section,
        title,
        description,
        steps,
    })
}

fn examples(entry: &RawEntry, kind: ExampleKind, ctx: &mut RunContext) -> Option<ContentBlock> {
    let field = kind.field();
    let items = fields::items(entry, field, ctx)?;

    let mut examples = Vec::with_capacity(items.len());
    for (i, item) in items.into_iter().enumerate() {
        match item {
            Value::Mapping(_) => examples.push(UsageExample {
                title: item_text(item, "title").unwrap_or_else(|| DEFAULT_EXAMPLE_TITLE.to_owned()),
                description: item_text(item, "description"),
                language: item_text(item, "language")
                    .unwrap_or_else(|| kind.default_language().to_owned()),
                code: item_text(item, "code"),
            }),
            Value::String(code) => examples.push(UsageExample {
                title: DEFAULT_EXAMPLE_TITLE.to_owned(),
                description: None,
                language: kind.default_language().to_owned(),
                code: Some(code.clone()),
            }),
            other => ctx.warn(
                &entry.id,
                Some(field),
                format!("item {} is {}; skipped", i + 1, value_kind(other)),
            ),
        }
    }

    (!examples.is_empty()).then_some(ContentBlock::Examples { kind, examples })
}

fn examples_dir(entry: &RawEntry, ctx: &mut RunContext) -> Option<ContentBlock> {
    let dir = fields::text(entry, "examples_dir", ctx)?;
    Some(ContentBlock::Narrative {
        section: NarrativeSection::AdditionalExamples,
        text: format!("Examples can be found in the ``{}`` directory.", dir.trim()),
    })
}

/// `{name, description, url}` items or plain text.
fn related_tools(entry: &RawEntry, ctx: &mut RunContext) -> Option<ContentBlock> {
    let field = "related_tools";
    let items = fields::items(entry, field, ctx)?;

    let mut tools = Vec::with_capacity(items.len());
    for (i, item) in items.into_iter().enumerate() {
        match item {
            Value::String(text) => tools.push(RelatedTool::Text(text.clone())),
            Value::Mapping(_) => match item_text(item, "name") {
                Some(name) => tools.push(RelatedTool::Described {
                    name,
                    description: item_text(item, "description"),
                    url: item_text(item, "url"),
                }),
                None => ctx.warn(
                    &entry.id,
                    Some(field),
                    format!("item {} needs a 'name'; skipped", i + 1),
                ),
            },
            other => ctx.warn(
                &entry.id,
                Some(field),
                format!("item {} is {}; skipped", i + 1, value_kind(other)),
            ),
        }
    }

    (!tools.is_empty()).then_some(ContentBlock::RelatedTools { tools })
}

fn custom_sections(entry: &RawEntry, ctx: &mut RunContext) -> Option<ContentBlock> {
    let field = "custom_sections";
    let items = fields::items(entry, field, ctx)?;

    let mut sections = Vec::with_capacity(items.len());
    for (i, item) in items.into_iter().enumerate() {
        match (item_text(item, "title"), item.is_mapping()) {
            (Some(title), true) => sections.push(CustomSection {
                title,
                content: item_text(item, "content").unwrap_or_default(),
            }),
            _ => ctx.warn(
                &entry.id,
                Some(field),
                format!("item {} needs a 'title'; skipped", i + 1),
            ),
        }
    }

    (!sections.is_empty()).then_some(ContentBlock::CustomSections { sections })
}

fn troubleshooting(entry: &RawEntry, ctx: &mut RunContext) -> Option<ContentBlock> {
    let field = "troubleshooting";
    let items = fields::items(entry, field, ctx)?;

    let mut entries = Vec::with_capacity(items.len());
    for (i, item) in items.into_iter().enumerate() {
        match item {
            Value::String(text) => entries.push(TroubleshootingItem::Text(text.clone())),
            Value::Mapping(_) => match (item_text(item, "issue"), item_text(item, "solution")) {
                (Some(issue), Some(solution)) => {
                    entries.push(TroubleshootingItem::Issue { issue, solution });
                }
                (Some(issue), None) => entries.push(TroubleshootingItem::Text(issue)),
                _ => ctx.warn(
                    &entry.id,
                    Some(field),
                    format!("item {} needs an 'issue'; skipped", i + 1),
                ),
            },
            other => ctx.warn(
                &entry.id,
                Some(field),
                format!("item {} is {}; skipped", i + 1, value_kind(other)),
            ),
        }
    }

    (!entries.is_empty()).then_some(ContentBlock::Troubleshooting { items: entries })
}

fn inline_diagram(
    page: &Page<'_>,
    item: &Value,
    code: String,
    title: Option<String>,
    ctx: &mut RunContext,
) -> Option<Diagram> {
    let field = "diagram_includes";
    let name = item_text(item, "language").unwrap_or_default();
    match DiagramLanguage::parse(&name) {
        Some(language) if language.is_source() => Some(Diagram {
            language,
            content: DiagramContent::Source(code),
            title,
            alt_text: item_text(item, "alt_text"),
        }),
        _ => {
            ctx.warn(
                &page.node.id,
                Some(field),
                format!("unsupported inline diagram language '{name}'; skipped"),
            );
            None
        }
    }
}

/// Strip the stand-alone preamble and wrap the body in a `math` directive.
fn latex(text: &str) -> String {
    let body: Vec<&str> = text
        .lines()
        .filter(|line| {
            let line = line.trim_start();
            !LATEX_PREAMBLE.iter().any(|p| line.starts_with(p))
        })
        .collect();
    let body = body.join("\n");
    format!(".. math::\n\n{}\n\n", indent(body.trim(), DIRECTIVE_INDENT))
}
