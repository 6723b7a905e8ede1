//! Page and index document rendering.

use docloom_config::IndexSettings;
use docloom_diagrams::{DirectiveSupport, downgrade_directives};
use docloom_markup::{GENERATED_BANNER, heading};

use crate::block::{SECTION, push_paragraph};
use crate::navigation::{NavigationBlock, NavigationOptions, toctree};
use crate::tree::{Forest, PageNode};

/// Adornment for document titles.
const TITLE: char = '=';

const DEFAULT_INDEX_DESCRIPTION: &str = "Generated API documentation.";
const DEFAULT_INDEX_CAPTION: &str = "Documentation";

/// Render the document of one page.
///
/// Without a `description` the page introduces itself by its `module`,
/// or by its title. The page's navigation block, if any, comes after its
/// content.
#[must_use]
pub fn render_page(
    node: &PageNode,
    description: Option<&str>,
    module: Option<&str>,
    navigation: Option<&NavigationBlock>,
    support: DirectiveSupport,
) -> String {
    let mut out = String::from(GENERATED_BANNER);
    out.push_str(&heading(&node.title, TITLE));
    match description {
        Some(description) => push_paragraph(&mut out, description),
        None => {
            let subject = module
                .map(str::trim)
                .filter(|m| !m.is_empty())
                .unwrap_or(node.title.as_str());
            push_paragraph(&mut out, &format!("Documentation for {subject}."));
        }
    }

    for block in &node.blocks {
        out.push_str(&block.render(support));
    }

    if let Some(navigation) = navigation {
        if !navigation.options.hidden {
            out.push_str(&heading("Subpages", SECTION));
        }
        out.push_str(&navigation.render());
    }

    finish(out)
}

/// Render `index.rst` listing the root pages in configuration order.
#[must_use]
pub fn render_index(
    settings: &IndexSettings,
    forest: &Forest,
    navigation: &NavigationOptions,
    support: DirectiveSupport,
) -> String {
    let mut out = String::from(GENERATED_BANNER);
    out.push_str(&heading(&settings.title, TITLE));
    push_paragraph(
        &mut out,
        settings
            .description
            .as_deref()
            .unwrap_or(DEFAULT_INDEX_DESCRIPTION),
    );
    if let Some(overview) = &settings.overview {
        push_paragraph(&mut out, overview);
    }

    let options = NavigationOptions {
        caption: Some(
            navigation
                .caption
                .clone()
                .unwrap_or_else(|| DEFAULT_INDEX_CAPTION.to_owned()),
        ),
        ..navigation.clone()
    };
    let entries: Vec<String> = forest
        .roots()
        .iter()
        .filter_map(|&idx| forest.get(idx))
        .map(PageNode::docname)
        .collect();
    out.push_str(&toctree(&options, &entries));

    for section in &settings.custom_sections {
        if section.title.trim().is_empty() {
            continue;
        }
        out.push_str(&heading(section.title.trim(), SECTION));
        push_paragraph(&mut out, &downgrade_directives(&section.content, support));
    }

    finish(out)
}

/// Trim trailing blank lines, ending with exactly one newline.
fn finish(mut out: String) -> String {
    out.truncate(out.trim_end().len());
    out.push('\n');
    out
}
