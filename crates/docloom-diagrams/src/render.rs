//! Diagram to reStructuredText rendering.

use docloom_markup::{DIRECTIVE_INDENT, heading, indent};

use crate::language::DiagramLanguage;

/// Which diagram extensions the Sphinx project has enabled.
///
/// `GraphViz` ships with Sphinx and is always available.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DirectiveSupport {
    pub plantuml: bool,
    pub mermaid: bool,
}

impl Default for DirectiveSupport {
    fn default() -> Self {
        Self {
            plantuml: true,
            mermaid: true,
        }
    }
}

impl DirectiveSupport {
    /// Whether `language` can be rendered with its directive.
    #[must_use]
    pub fn supports(self, language: DiagramLanguage) -> bool {
        match language {
            DiagramLanguage::PlantUml => self.plantuml,
            DiagramLanguage::Mermaid => self.mermaid,
            DiagramLanguage::GraphViz | DiagramLanguage::Svg => true,
        }
    }
}

/// Adornment for diagram titles, one level below page sections.
const TITLE_ADORNMENT: char = '~';

/// Render diagram source text.
///
/// Emits the language's directive, or a `code-block` showing the source
/// when the extension for that language is not enabled.
///
/// # Examples
///
/// ```
/// use docloom_diagrams::{render_source, DiagramLanguage, DirectiveSupport};
///
/// let rst = render_source(
///     DiagramLanguage::Mermaid,
///     "graph LR\n  A --> B\n",
///     None,
///     DirectiveSupport::default(),
/// );
/// assert_eq!(rst, ".. mermaid::\n\n   graph LR\n     A --> B\n\n");
/// ```
#[must_use]
pub fn render_source(
    language: DiagramLanguage,
    source: &str,
    title: Option<&str>,
    support: DirectiveSupport,
) -> String {
    let mut out = title_heading(title);
    if support.supports(language) {
        out.push_str(&format!(".. {}::\n\n", language.directive()));
    } else {
        out.push_str(&format!(".. code-block:: {}\n\n", language.code_language()));
    }
    out.push_str(&indent(source.trim_end(), DIRECTIVE_INDENT));
    out.push_str("\n\n");
    out
}

/// Render an image reference (SVG diagrams).
#[must_use]
pub fn render_image(path: &str, title: Option<&str>, alt_text: Option<&str>) -> String {
    let mut out = title_heading(title);
    out.push_str(&format!(".. image:: {path}\n"));
    if let Some(alt) = alt_text.map(str::trim).filter(|a| !a.is_empty()) {
        out.push_str(&format!("   :alt: {alt}\n"));
    }
    out.push_str("   :align: center\n\n");
    out
}

fn title_heading(title: Option<&str>) -> String {
    match title.map(str::trim).filter(|t| !t.is_empty()) {
        Some(title) => heading(title, TITLE_ADORNMENT),
        None => String::new(),
    }
}

/// Rewrite `uml` and `mermaid` directives as code blocks when the matching
/// extension is not enabled.
///
/// Directive options that `code-block` does not accept are dropped.
#[must_use]
pub fn downgrade_directives(content: &str, support: DirectiveSupport) -> String {
    if support.plantuml && support.mermaid {
        return content.to_owned();
    }

    let mut out: Vec<String> = Vec::new();
    // Indentation of the directive whose options are being filtered.
    let mut options_of: Option<usize> = None;

    for line in content.lines() {
        let trimmed = line.trim();
        let line_indent = line.len() - line.trim_start().len();

        if let Some(directive_indent) = options_of {
            if trimmed.starts_with(':') && line_indent > directive_indent {
                if is_code_block_option(trimmed) {
                    out.push(line.to_owned());
                }
                continue;
            }
            options_of = None;
        }

        let downgraded = match trimmed {
            ".. uml::" if !support.plantuml => Some(DiagramLanguage::PlantUml),
            ".. mermaid::" if !support.mermaid => Some(DiagramLanguage::Mermaid),
            _ => None,
        };
        match downgraded {
            Some(language) => {
                out.push(format!(
                    "{}.. code-block:: {}",
                    &line[..line_indent],
                    language.code_language()
                ));
                options_of = Some(line_indent);
            }
            None => out.push(line.to_owned()),
        }
    }

    let mut result = out.join("\n");
    if content.ends_with('\n') {
        result.push('\n');
    }
    result
}

fn is_code_block_option(trimmed: &str) -> bool {
    [":caption:", ":name:", ":class:", ":linenos:", ":emphasize-lines:"]
        .iter()
        .any(|opt| trimmed.starts_with(opt))
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    const NO_PLANTUML: DirectiveSupport = DirectiveSupport {
        plantuml: false,
        mermaid: true,
    };

    #[test]
    fn test_plantuml_directive_with_title() {
        let rst = render_source(
            DiagramLanguage::PlantUml,
            "@startuml\nA -> B\n@enduml",
            Some("Sequence"),
            DirectiveSupport::default(),
        );
        assert_eq!(
            rst,
            "Sequence\n~~~~~~~~\n\n.. uml::\n\n   @startuml\n   A -> B\n   @enduml\n\n"
        );
    }

    #[test]
    fn test_plantuml_code_block_when_unsupported() {
        let rst = render_source(DiagramLanguage::PlantUml, "@startuml\n@enduml\n", None, NO_PLANTUML);
        assert_eq!(rst, ".. code-block:: plantuml\n\n   @startuml\n   @enduml\n\n");
    }

    #[test]
    fn test_graphviz_always_directive() {
        let support = DirectiveSupport {
            plantuml: false,
            mermaid: false,
        };
        let rst = render_source(DiagramLanguage::GraphViz, "digraph { a -> b }", None, support);
        assert_eq!(rst, ".. graphviz::\n\n   digraph { a -> b }\n\n");
    }

    #[test]
    fn test_svg_image() {
        assert_eq!(
            render_image("diagrams/arch.svg", Some("Architecture"), Some("System overview")),
            "Architecture\n~~~~~~~~~~~~\n\n.. image:: diagrams/arch.svg\n   :alt: System overview\n   :align: center\n\n"
        );
        assert_eq!(
            render_image("a.svg", None, Some("  ")),
            ".. image:: a.svg\n   :align: center\n\n"
        );
    }

    #[test]
    fn test_downgrade_is_noop_with_full_support() {
        let content = ".. uml::\n\n   @startuml\n";
        assert_eq!(downgrade_directives(content, DirectiveSupport::default()), content);
    }

    #[test]
    fn test_downgrade_uml_keeps_indent_and_body() {
        let content = "Intro\n\n  .. uml::\n     :scale: 50 %\n     :caption: Flow\n\n     @startuml\n     A -> B\n     @enduml\n";
        assert_eq!(
            downgrade_directives(content, NO_PLANTUML),
            "Intro\n\n  .. code-block:: plantuml\n     :caption: Flow\n\n     @startuml\n     A -> B\n     @enduml\n"
        );
    }

    #[test]
    fn test_downgrade_only_disabled_language() {
        let content = ".. uml::\n\n   x\n\n.. mermaid::\n\n   graph LR\n";
        assert_eq!(
            downgrade_directives(content, NO_PLANTUML),
            ".. code-block:: plantuml\n\n   x\n\n.. mermaid::\n\n   graph LR\n"
        );
    }
}
