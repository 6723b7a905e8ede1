//! Tool-wide settings read from the top level of the configuration.

use serde::Deserialize;

/// Tool-wide settings.
///
/// Every section is optional. Top-level keys not listed here (theme,
/// Sphinx options, ...) are left for other tools and ignored.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct Settings {
    /// Write `index.rst` listing the root pages.
    pub generate_index: bool,
    pub index: IndexSettings,
    pub navigation: NavigationSettings,
    pub extraction: ExtractionSettings,
    pub diagrams: DiagramSettings,
    pub doxygen: DoxygenSettings,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            generate_index: true,
            index: IndexSettings::default(),
            navigation: NavigationSettings::default(),
            extraction: ExtractionSettings::default(),
            diagrams: DiagramSettings::default(),
            doxygen: DoxygenSettings::default(),
        }
    }
}

/// The generated `index.rst`.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct IndexSettings {
    pub title: String,
    pub description: Option<String>,
    pub overview: Option<String>,
    pub custom_sections: Vec<CustomSection>,
}

impl Default for IndexSettings {
    fn default() -> Self {
        Self {
            title: "API Documentation".to_owned(),
            description: None,
            overview: None,
            custom_sections: Vec::new(),
        }
    }
}

/// A titled block of raw reStructuredText.
#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct CustomSection {
    pub title: String,
    pub content: String,
}

/// Options for the `toctree` directives.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct NavigationSettings {
    pub maxdepth: u32,
    pub titles_only: bool,
    pub caption: Option<String>,
    pub hidden: bool,
}

impl Default for NavigationSettings {
    fn default() -> Self {
        Self {
            maxdepth: 2,
            titles_only: true,
            caption: None,
            hidden: false,
        }
    }
}

/// API extraction.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct ExtractionSettings {
    /// Run registered extractors. When off, manual content is used.
    pub enabled: bool,
}

impl Default for ExtractionSettings {
    fn default() -> Self {
        Self { enabled: true }
    }
}

/// Which diagram extensions the Sphinx project has enabled.
#[derive(Debug, Clone, Copy, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct DiagramSettings {
    pub plantuml: bool,
    pub mermaid: bool,
}

impl Default for DiagramSettings {
    fn default() -> Self {
        Self {
            plantuml: true,
            mermaid: true,
        }
    }
}

/// Doxygen integration for C and C++ pages.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct DoxygenSettings {
    /// Breathe project name used by the generated directives.
    pub project_name: String,
}

impl Default for DoxygenSettings {
    fn default() -> Self {
        Self {
            project_name: "default".to_owned(),
        }
    }
}
