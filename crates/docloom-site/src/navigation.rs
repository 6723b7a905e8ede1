//! Navigation (`toctree`) emission.

use docloom_config::NavigationSettings;

use crate::tree::Forest;

/// Options shared by every emitted `toctree`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NavigationOptions {
    pub maxdepth: u32,
    pub titles_only: bool,
    pub caption: Option<String>,
    pub hidden: bool,
}

impl Default for NavigationOptions {
    fn default() -> Self {
        Self::from(&NavigationSettings::default())
    }
}

impl From<&NavigationSettings> for NavigationOptions {
    fn from(settings: &NavigationSettings) -> Self {
        Self {
            maxdepth: settings.maxdepth,
            titles_only: settings.titles_only,
            caption: settings.caption.clone(),
            hidden: settings.hidden,
        }
    }
}

/// The `toctree` of one page, listing its children.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NavigationBlock {
    /// Forest index of the page that owns the block.
    pub node: usize,
    /// Child documents relative to the owning page's directory.
    pub entries: Vec<String>,
    pub options: NavigationOptions,
}

impl NavigationBlock {
    #[must_use]
    pub fn render(&self) -> String {
        toctree(&self.options, &self.entries)
    }
}

/// Emit one block per page with children, in forest order.
///
/// Entries are `<page slug>/<child slug>`: children are written to a
/// directory named after the page, next to the page's own document.
#[must_use]
pub fn emit(forest: &Forest, options: &NavigationOptions) -> Vec<NavigationBlock> {
    forest
        .nodes()
        .iter()
        .enumerate()
        .filter(|(_, node)| !node.children.is_empty())
        .map(|(idx, node)| NavigationBlock {
            node: idx,
            entries: node
                .children
                .iter()
                .filter_map(|&child| forest.get(child))
                .map(|child| format!("{}/{}", node.slug, child.slug))
                .collect(),
            options: options.clone(),
        })
        .collect()
}

/// Render a `toctree` directive.
pub(crate) fn toctree<S: AsRef<str>>(options: &NavigationOptions, entries: &[S]) -> String {
    let mut out = String::from(".. toctree::\n");
    out.push_str(&format!("   :maxdepth: {}\n", options.maxdepth));
    if options.titles_only {
        out.push_str("   :titlesonly:\n");
    }
    if let Some(caption) = options.caption.as_deref().map(str::trim).filter(|c| !c.is_empty()) {
        out.push_str(&format!("   :caption: {caption}\n"));
    }
    if options.hidden {
        out.push_str("   :hidden:\n");
    }
    out.push('\n');
    for entry in entries {
        out.push_str("   ");
        out.push_str(entry.as_ref());
        out.push('\n');
    }
    out.push('\n');
    out
}
