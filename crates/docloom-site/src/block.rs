//! Content blocks of a generated page.
//!
//! Every block renders to a self-contained reStructuredText fragment that
//! ends with a blank line, so blocks can be concatenated in any order.

use docloom_diagrams::{
    DiagramLanguage, DirectiveSupport, downgrade_directives, render_image, render_source,
};
use docloom_markup::{bullet_list, code_block, heading};

use crate::api::ApiReference;

/// Adornment for sections directly below the page title.
pub(crate) const SECTION: char = '-';

/// Adornment for subsections.
pub(crate) const SUBSECTION: char = '~';

/// Narrative sections holding free text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NarrativeSection {
    Overview,
    Requirements,
    Installation,
    Configuration,
    Notes,
    Changelog,
    /// Pointer to a directory of further examples.
    AdditionalExamples,
}

impl NarrativeSection {
    #[must_use]
    pub fn title(self) -> &'static str {
        match self {
            Self::Overview => "Overview",
            Self::Requirements => "Requirements",
            Self::Installation => "Installation",
            Self::Configuration => "Configuration",
            Self::Notes => "Notes",
            Self::Changelog => "Changelog",
            Self::AdditionalExamples => "Additional Examples",
        }
    }
}

/// Bulleted sections.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListKind {
    Features,
    Requirements,
    Limitations,
    BestPractices,
    SeeAlso,
    References,
}

impl ListKind {
    #[must_use]
    pub fn title(self) -> &'static str {
        match self {
            Self::Features => "Features",
            Self::Requirements => "Requirements",
            Self::Limitations => "Limitations",
            Self::BestPractices => "Best Practices",
            Self::SeeAlso => "See Also",
            Self::References => "References",
        }
    }
}

/// Sections explaining a process: an optional subtitle, prose and
/// numbered steps.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GuideSection {
    Workflow,
    HowItWorks,
}

impl GuideSection {
    #[must_use]
    pub fn title(self) -> &'static str {
        match self {
            Self::Workflow => "Workflow",
            Self::HowItWorks => "How It Works",
        }
    }

    /// Configuration field of this section.
    #[must_use]
    pub fn field(self) -> &'static str {
        match self {
            Self::Workflow => "workflow",
            Self::HowItWorks => "how_it_works",
        }
    }
}

/// Sections of titled code examples.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExampleKind {
    Usage,
    PythonApi,
    Examples,
}

impl ExampleKind {
    #[must_use]
    pub fn title(self) -> &'static str {
        match self {
            Self::Usage => "Usage Examples",
            Self::PythonApi => "Python API",
            Self::Examples => "Examples",
        }
    }

    /// Configuration field of this section.
    #[must_use]
    pub fn field(self) -> &'static str {
        match self {
            Self::Usage => "usage_examples",
            Self::PythonApi => "python_api",
            Self::Examples => "examples",
        }
    }

    /// Code language when an example does not name one.
    #[must_use]
    pub fn default_language(self) -> &'static str {
        match self {
            Self::Usage | Self::PythonApi => "python",
            Self::Examples => "bash",
        }
    }
}

/// One installation step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstallStep {
    pub step: String,
    pub description: Option<String>,
    /// Shell commands.
    pub code: Option<String>,
}

/// One usage example.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UsageExample {
    pub title: String,
    pub description: Option<String>,
    pub language: String,
    pub code: Option<String>,
}

/// Kind of included document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IncludeKind {
    Markdown,
    Rst,
    Latex,
    /// Generic `file_includes`, dispatched by extension.
    File,
}

impl IncludeKind {
    /// Configuration field listing documents of this kind.
    #[must_use]
    pub fn field(self) -> &'static str {
        match self {
            Self::Markdown => "markdown_includes",
            Self::Rst => "rst_includes",
            Self::Latex => "latex_includes",
            Self::File => "file_includes",
        }
    }
}

/// Diagram content.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DiagramContent {
    /// Diagram source text, from a file or inline.
    Source(String),
    /// Image path relative to the page document.
    Image(String),
}

/// A diagram with optional caption data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagram {
    pub language: DiagramLanguage,
    pub content: DiagramContent,
    pub title: Option<String>,
    pub alt_text: Option<String>,
}

impl Diagram {
    #[must_use]
    pub fn render(&self, support: DirectiveSupport) -> String {
        match &self.content {
            DiagramContent::Source(source) => {
                render_source(self.language, source, self.title.as_deref(), support)
            }
            DiagramContent::Image(path) => {
                render_image(path, self.title.as_deref(), self.alt_text.as_deref())
            }
        }
    }
}

/// A titled block of raw reStructuredText.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CustomSection {
    pub title: String,
    pub content: String,
}

/// A related tool, described or given as plain text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RelatedTool {
    Described {
        name: String,
        description: Option<String>,
        url: Option<String>,
    },
    Text(String),
}

/// A troubleshooting entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TroubleshootingItem {
    Issue { issue: String, solution: String },
    Text(String),
}

/// A unit of page content.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContentBlock {
    Narrative {
        section: NarrativeSection,
        text: String,
    },
    List {
        kind: ListKind,
        items: Vec<String>,
    },
    InstallationSteps {
        title: Option<String>,
        steps: Vec<InstallStep>,
    },
    Guide {
        section: GuideSection,
        title: Option<String>,
        description: Option<String>,
        steps: Vec<String>,
    },
    Examples {
        kind: ExampleKind,
        examples: Vec<UsageExample>,
    },
    ApiReference(ApiReference),
    /// Documents already converted to reStructuredText.
    Included {
        kind: IncludeKind,
        documents: Vec<String>,
    },
    Diagrams {
        diagrams: Vec<Diagram>,
    },
    CustomSections {
        sections: Vec<CustomSection>,
    },
    Troubleshooting {
        items: Vec<TroubleshootingItem>,
    },
    RelatedTools {
        tools: Vec<RelatedTool>,
    },
}

impl ContentBlock {
    /// Render the block. `support` decides how diagram directives are emitted.
    #[must_use]
    pub fn render(&self, support: DirectiveSupport) -> String {
        match self {
            Self::Narrative { section, text } => {
                let mut out = heading(section.title(), SECTION);
                push_paragraph(&mut out, text);
                out
            }
            Self::List { kind, items } => {
                let mut out = heading(kind.title(), SECTION);
                out.push_str(&bullet_list(items));
                out
            }
            Self::InstallationSteps { title, steps } => render_steps(title.as_deref(), steps),
            Self::Guide {
                section,
                title,
                description,
                steps,
            } => render_guide(*section, title.as_deref(), description.as_deref(), steps),
            Self::Examples { kind, examples } => render_examples(*kind, examples),
            Self::ApiReference(api) => api.render(),
            Self::Included { documents, .. } => {
                let mut out = String::new();
                for document in documents {
                    push_paragraph(&mut out, document);
                }
                out
            }
            Self::Diagrams { diagrams } => {
                let mut out = heading("Diagrams", SECTION);
                for diagram in diagrams {
                    out.push_str(&diagram.render(support));
                }
                out
            }
            Self::CustomSections { sections } => {
                let mut out = String::new();
                for section in sections {
                    out.push_str(&heading(&section.title, SECTION));
                    push_paragraph(&mut out, &downgrade_directives(&section.content, support));
                }
                out
            }
            Self::Troubleshooting { items } => render_troubleshooting(items),
            Self::RelatedTools { tools } => render_related_tools(tools),
        }
    }
}

/// Append `text` followed by a blank line. Blank text adds nothing.
pub(crate) fn push_paragraph(out: &mut String, text: &str) {
    let text = text.trim_end();
    if text.trim().is_empty() {
        return;
    }
    out.push_str(text);
    out.push_str("\n\n");
}

fn render_steps(title: Option<&str>, steps: &[InstallStep]) -> String {
    let mut out = heading("Installation", SECTION);
    if let Some(title) = title {
        push_paragraph(&mut out, title);
    }
    for (n, step) in steps.iter().enumerate() {
        out.push_str(&format!("**Step {}: {}**\n\n", n + 1, step.step.trim()));
        if let Some(description) = &step.description {
            push_paragraph(&mut out, description);
        }
        if let Some(code) = &step.code {
            out.push_str(&code_block("bash", code));
        }
    }
    out
}

fn render_guide(
    section: GuideSection,
    title: Option<&str>,
    description: Option<&str>,
    steps: &[String],
) -> String {
    let mut out = heading(section.title(), SECTION);
    if let Some(title) = title {
        out.push_str(&heading(title, SUBSECTION));
    }
    if let Some(description) = description {
        push_paragraph(&mut out, description);
    }
    if !steps.is_empty() {
        for (n, step) in steps.iter().enumerate() {
            out.push_str(&format!("{}. {}\n", n + 1, step.trim()));
        }
        out.push('\n');
    }
    out
}

fn render_examples(kind: ExampleKind, examples: &[UsageExample]) -> String {
    let mut out = heading(kind.title(), SECTION);
    for example in examples {
        out.push_str(&heading(&example.title, SUBSECTION));
        if let Some(description) = &example.description {
            push_paragraph(&mut out, description);
        }
        if let Some(code) = &example.code {
            out.push_str(&code_block(&example.language, code));
        }
    }
    out
}

fn render_related_tools(tools: &[RelatedTool]) -> String {
    let mut out = heading("Related Tools", SECTION);
    for tool in tools {
        match tool {
            RelatedTool::Described {
                name,
                description,
                url,
            } => {
                out.push_str(&format!("* **{}**", name.trim()));
                if let Some(description) = description {
                    out.push_str(&format!(": {}", description.trim()));
                }
                out.push('\n');
                if let Some(url) = url {
                    out.push_str(&format!("\n  {}\n\n", url.trim()));
                }
            }
            RelatedTool::Text(text) => out.push_str(&format!("* {}\n", text.trim())),
        }
    }
    if !out.ends_with("\n\n") {
        out.push('\n');
    }
    out
}

fn render_troubleshooting(items: &[TroubleshootingItem]) -> String {
    let mut out = heading("Troubleshooting", SECTION);
    let mut bullets: Vec<&str> = Vec::new();
    for item in items {
        match item {
            TroubleshootingItem::Issue { issue, solution } => {
                out.push_str(&format!("**{}**\n\n", issue.trim()));
                push_paragraph(&mut out, solution);
            }
            TroubleshootingItem::Text(text) => bullets.push(text),
        }
    }
    if !bullets.is_empty() {
        out.push_str(&bullet_list(&bullets));
    }
    out
}
