//! Diagram types for supported diagram languages.
//!
//! Sphinx renders `PlantUML`, Mermaid and `GraphViz` sources through
//! directives; SVG files are referenced as images.

use std::path::Path;

/// Supported diagram languages.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiagramLanguage {
    PlantUml,
    Mermaid,
    GraphViz,
    Svg,
}

impl DiagramLanguage {
    /// Parse a language name as written in configuration.
    ///
    /// Accepts both language names (`plantuml`) and file extensions
    /// (`puml`), case-insensitively.
    ///
    /// Returns None if the language is not a supported diagram type.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().trim_start_matches('.').to_ascii_lowercase().as_str() {
            "plantuml" | "puml" | "uml" => Some(Self::PlantUml),
            "mermaid" | "mmd" => Some(Self::Mermaid),
            "graphviz" | "dot" | "gv" => Some(Self::GraphViz),
            "svg" => Some(Self::Svg),
            _ => None,
        }
    }

    /// Detect the language of a diagram file from its extension.
    ///
    /// ```
    /// use std::path::Path;
    /// use docloom_diagrams::DiagramLanguage;
    ///
    /// assert_eq!(
    ///     DiagramLanguage::from_path(Path::new("arch/flow.MMD")),
    ///     Some(DiagramLanguage::Mermaid)
    /// );
    /// assert_eq!(DiagramLanguage::from_path(Path::new("notes.txt")), None);
    /// ```
    #[must_use]
    pub fn from_path(path: &Path) -> Option<Self> {
        path.extension()
            .and_then(|ext| ext.to_str())
            .and_then(Self::parse)
    }

    /// Sphinx directive that renders this language.
    #[must_use]
    pub fn directive(self) -> &'static str {
        match self {
            Self::PlantUml => "uml",
            Self::Mermaid => "mermaid",
            Self::GraphViz => "graphviz",
            Self::Svg => "image",
        }
    }

    /// Highlighting language used when the source is shown as code.
    #[must_use]
    pub fn code_language(self) -> &'static str {
        match self {
            Self::PlantUml => "plantuml",
            Self::Mermaid => "mermaid",
            Self::GraphViz => "dot",
            Self::Svg => "xml",
        }
    }

    /// Whether diagrams of this language are embedded as source text.
    ///
    /// SVG files are referenced by path instead.
    #[must_use]
    pub fn is_source(self) -> bool {
        !matches!(self, Self::Svg)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_names_and_extensions() {
        let cases = [
            ("plantuml", DiagramLanguage::PlantUml),
            ("puml", DiagramLanguage::PlantUml),
            (".plantuml", DiagramLanguage::PlantUml),
            ("mermaid", DiagramLanguage::Mermaid),
            ("mmd", DiagramLanguage::Mermaid),
            ("graphviz", DiagramLanguage::GraphViz),
            ("dot", DiagramLanguage::GraphViz),
            ("gv", DiagramLanguage::GraphViz),
            ("SVG", DiagramLanguage::Svg),
        ];
        for (name, expected) in cases {
            assert_eq!(DiagramLanguage::parse(name), Some(expected), "{name}");
        }
    }

    #[test]
    fn test_parse_unknown() {
        assert_eq!(DiagramLanguage::parse("ditaa"), None);
        assert_eq!(DiagramLanguage::parse(""), None);
    }

    #[test]
    fn test_from_path_without_extension() {
        assert_eq!(DiagramLanguage::from_path(Path::new("Makefile")), None);
    }

    #[test]
    fn test_directives() {
        assert_eq!(DiagramLanguage::PlantUml.directive(), "uml");
        assert_eq!(DiagramLanguage::Mermaid.directive(), "mermaid");
        assert_eq!(DiagramLanguage::GraphViz.directive(), "graphviz");
        assert_eq!(DiagramLanguage::Svg.directive(), "image");
        assert!(!DiagramLanguage::Svg.is_source());
    }
}
