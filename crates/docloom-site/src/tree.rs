//! Page hierarchy.
//!
//! # Architecture
//!
//! Pages are stored in a flat `Vec<PageNode>` with parent/children
//! relationships tracked by indices. Nodes never own each other, so the
//! hierarchy can be walked in either direction without reference cycles.
//!
//! The tree is built in passes over the page definitions: create nodes,
//! wire parents, reject cycles, then allocate slugs per sibling scope and
//! derive output paths from the slugs.

use std::collections::{HashMap, HashSet};
use std::path::PathBuf;

use docloom_config::{DefinitionMap, RawEntry, key_label};
use serde_yaml::Value;

use crate::block::ContentBlock;
use crate::diagnostics::RunContext;
use crate::slug::{SlugAllocator, slugify};

/// Directory, relative to the output directory, holding page documents.
pub const GENERATED_DIR: &str = "generated";

/// Parent value that marks a root page.
const ROOT_SENTINEL: &str = "root";

/// One page of the hierarchy.
#[derive(Debug, Clone, PartialEq)]
pub struct PageNode {
    pub id: String,
    pub title: String,
    /// Filesystem-safe name, unique among siblings.
    pub slug: String,
    /// Ancestor slugs and own slug joined with `/`.
    pub path: String,
    pub parent: Option<usize>,
    /// Children in configuration order.
    pub children: Vec<usize>,
    pub blocks: Vec<ContentBlock>,
    /// Configuration file that defines this page.
    pub source: PathBuf,
}

impl PageNode {
    /// Output file relative to the output directory.
    #[must_use]
    pub fn output_file(&self) -> PathBuf {
        PathBuf::from(format!("{GENERATED_DIR}/{}.rst", self.path))
    }

    /// Document name as referenced from the output root.
    #[must_use]
    pub fn docname(&self) -> String {
        format!("{GENERATED_DIR}/{}", self.path)
    }
}

/// Page hierarchy errors.
#[derive(Debug, thiserror::Error)]
pub enum BuildError {
    /// A page names a parent that is not defined.
    #[error("Page '{page}' has unknown parent '{parent}'")]
    DanglingParent { page: String, parent: String },
    /// Pages are their own ancestors.
    #[error("Cyclic page hierarchy: {}", .cycle.join(" -> "))]
    CyclicHierarchy {
        /// Page ids along the cycle, ending with the repeated one.
        cycle: Vec<String>,
    },
}

/// All pages of a run.
#[derive(Debug, Clone, Default)]
pub struct Forest {
    nodes: Vec<PageNode>,
    roots: Vec<usize>,
    index: HashMap<String, usize>,
}

impl Forest {
    #[must_use]
    pub fn get(&self, idx: usize) -> Option<&PageNode> {
        self.nodes.get(idx)
    }

    #[must_use]
    pub fn by_id(&self, id: &str) -> Option<&PageNode> {
        self.index.get(id).map(|&idx| &self.nodes[idx])
    }

    #[must_use]
    pub fn index_of(&self, id: &str) -> Option<usize> {
        self.index.get(id).copied()
    }

    /// Root indices in configuration order.
    #[must_use]
    pub fn roots(&self) -> &[usize] {
        &self.roots
    }

    /// Nodes in configuration order.
    #[must_use]
    pub fn nodes(&self) -> &[PageNode] {
        &self.nodes
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Ancestor indices from the parent up to the root.
    pub fn ancestors(&self, idx: usize) -> impl Iterator<Item = usize> + '_ {
        std::iter::successors(self.nodes.get(idx).and_then(|n| n.parent), |&p| {
            self.nodes[p].parent
        })
    }

    /// Node indices in depth-first pre-order, roots in configuration order.
    #[must_use]
    pub fn preorder(&self) -> Vec<usize> {
        let mut order = Vec::with_capacity(self.nodes.len());
        let mut stack: Vec<usize> = self.roots.iter().rev().copied().collect();
        while let Some(idx) = stack.pop() {
            order.push(idx);
            stack.extend(self.nodes[idx].children.iter().rev());
        }
        order
    }

    pub(crate) fn set_blocks(&mut self, idx: usize, blocks: Vec<ContentBlock>) {
        if let Some(node) = self.nodes.get_mut(idx) {
            node.blocks = blocks;
        }
    }
}

/// Build the page hierarchy from page definitions.
///
/// # Errors
///
/// Returns `BuildError::DanglingParent` when a page names an undefined
/// parent and `BuildError::CyclicHierarchy` when parents form a loop.
pub fn build_forest(
    definitions: &DefinitionMap,
    ctx: &mut RunContext,
) -> Result<Forest, BuildError> {
    let mut forest = Forest::default();
    let mut declared_parents = Vec::with_capacity(definitions.len());

    for entry in definitions.iter() {
        let idx = forest.nodes.len();
        forest.index.insert(entry.id.clone(), idx);
        forest.nodes.push(PageNode {
            id: entry.id.clone(),
            title: page_title(entry, ctx),
            slug: String::new(),
            path: String::new(),
            parent: None,
            children: Vec::new(),
            blocks: Vec::new(),
            source: entry.source.clone(),
        });
        declared_parents.push(declared_parent(entry, ctx));
    }

    wire_parents(&mut forest, &declared_parents)?;
    check_cycles(&forest)?;
    assign_slugs(&mut forest, ctx);

    tracing::info!(
        pages = forest.nodes.len(),
        roots = forest.roots.len(),
        "Built page hierarchy"
    );
    Ok(forest)
}

fn page_title(entry: &RawEntry, ctx: &mut RunContext) -> String {
    match entry.get("title") {
        None | Some(Value::Null) => entry.id.clone(),
        Some(value) => match key_label(value) {
            Some(title) if !title.trim().is_empty() => title.trim().to_owned(),
            Some(_) => entry.id.clone(),
            None => {
                ctx.warn(&entry.id, Some("title"), "expected text; using the page id");
                entry.id.clone()
            }
        },
    }
}

fn declared_parent(entry: &RawEntry, ctx: &mut RunContext) -> Option<String> {
    let value = entry.get("parent")?;
    if value.is_null() {
        return None;
    }
    match key_label(value) {
        Some(parent) => {
            let parent = parent.trim();
            if parent.is_empty() || parent == ROOT_SENTINEL {
                None
            } else {
                Some(parent.to_owned())
            }
        }
        None => {
            ctx.warn(
                &entry.id,
                Some("parent"),
                "expected a page id; treating the page as a root",
            );
            None
        }
    }
}

fn wire_parents(forest: &mut Forest, declared: &[Option<String>]) -> Result<(), BuildError> {
    for (idx, parent) in declared.iter().enumerate() {
        match parent {
            None => forest.roots.push(idx),
            Some(parent_id) => {
                let Some(&parent_idx) = forest.index.get(parent_id) else {
                    return Err(BuildError::DanglingParent {
                        page: forest.nodes[idx].id.clone(),
                        parent: parent_id.clone(),
                    });
                };
                forest.nodes[idx].parent = Some(parent_idx);
                forest.nodes[parent_idx].children.push(idx);
            }
        }
    }
    Ok(())
}

/// Walk every ancestor chain; a chain that revisits a node is a cycle.
fn check_cycles(forest: &Forest) -> Result<(), BuildError> {
    let mut acyclic: HashSet<usize> = HashSet::new();

    for start in 0..forest.nodes.len() {
        let mut chain: Vec<usize> = Vec::new();
        let mut current = Some(start);

        while let Some(idx) = current {
            if acyclic.contains(&idx) {
                break;
            }
            if let Some(pos) = chain.iter().position(|&seen| seen == idx) {
                let mut cycle: Vec<String> = chain[pos..]
                    .iter()
                    .map(|&i| forest.nodes[i].id.clone())
                    .collect();
                cycle.push(forest.nodes[idx].id.clone());
                return Err(BuildError::CyclicHierarchy { cycle });
            }
            chain.push(idx);
            current = forest.nodes[idx].parent;
        }

        acyclic.extend(chain);
    }
    Ok(())
}

/// Allocate slugs scope by scope, parents before children.
fn assign_slugs(forest: &mut Forest, ctx: &mut RunContext) {
    let mut scopes: Vec<(Option<usize>, Vec<usize>)> = vec![(None, forest.roots.clone())];

    while let Some((parent, members)) = scopes.pop() {
        let prefix = parent.map(|p| forest.nodes[p].path.clone());
        let mut allocator = SlugAllocator::new();

        for &idx in &members {
            let node = &mut forest.nodes[idx];
            node.slug = allocator.allocate(&node.title);
            node.path = match &prefix {
                Some(prefix) => format!("{prefix}/{}", node.slug),
                None => node.slug.clone(),
            };
            if slugify(&node.title).is_empty() {
                let message = format!(
                    "title '{}' has no filesystem-safe characters; using slug '{}'",
                    node.title, node.slug
                );
                let id = node.id.clone();
                ctx.advise(&id, Some("title"), message);
            }
        }

        for &idx in members.iter().rev() {
            let children = forest.nodes[idx].children.clone();
            if !children.is_empty() {
                scopes.push((Some(idx), children));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::fs;

    use docloom_config::IncludeResolver;
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::diagnostics::Severity;

    fn definitions(yaml: &str) -> DefinitionMap {
        let temp = tempfile::tempdir().unwrap();
        let path = temp.path().join("docs.yaml");
        fs::write(&path, yaml).unwrap();
        let resolved = IncludeResolver::resolve(&path).unwrap();
        DefinitionMap::from_resolved(&resolved).unwrap()
    }

    fn build(yaml: &str) -> (Result<Forest, BuildError>, RunContext) {
        let defs = definitions(yaml);
        let mut ctx = RunContext::new();
        let forest = build_forest(&defs, &mut ctx);
        (forest, ctx)
    }

    fn paths(forest: &Forest) -> Vec<&str> {
        forest.nodes().iter().map(|n| n.path.as_str()).collect()
    }

    #[test]
    fn test_root_and_child() {
        let (forest, _) = build(
            "modules:\n  root:\n    title: Root\n  child:\n    title: Child\n    parent: root\n",
        );
        let forest = forest.unwrap();

        assert_eq!(paths(&forest), vec!["root", "root/child"]);
        assert_eq!(forest.roots(), &[0]);
        let root = forest.by_id("root").unwrap();
        assert_eq!(root.children, vec![1]);
        assert_eq!(
            forest.by_id("child").unwrap().output_file(),
            PathBuf::from("generated/root/child.rst")
        );
    }

    #[test]
    fn test_every_definition_appears_once() {
        let (forest, _) = build(
            "modules:\n  a: {title: A}\n  b: {title: B, parent: a}\n  c: {title: C, parent: b}\n  d: {title: D}\n  e: {title: E, parent: a}\n",
        );
        let forest = forest.unwrap();

        let mut seen = forest.preorder();
        assert_eq!(seen.len(), 5);
        seen.sort_unstable();
        seen.dedup();
        assert_eq!(seen, vec![0, 1, 2, 3, 4]);

        for idx in 0..forest.len() {
            let last = forest.ancestors(idx).last().unwrap_or(idx);
            assert!(forest.roots().contains(&last));
        }
        let c = forest.index_of("c").unwrap();
        assert_eq!(forest.ancestors(c).collect::<Vec<_>>(), vec![1, 0]);
    }

    #[test]
    fn test_preorder_follows_declaration_order() {
        let (forest, _) = build(
            "modules:\n  b: {title: B, parent: a}\n  a: {title: A}\n  z: {title: Z}\n  c: {title: C, parent: a}\n",
        );
        let forest = forest.unwrap();

        let ids: Vec<&str> = forest
            .preorder()
            .into_iter()
            .map(|i| forest.get(i).unwrap().id.as_str())
            .collect();
        assert_eq!(ids, vec!["a", "b", "c", "z"]);
    }

    #[test]
    fn test_root_sentinels() {
        let (forest, _) = build(
            "modules:\n  a: {title: A, parent: null}\n  b: {title: B, parent: ''}\n  c: {title: C, parent: root}\n",
        );
        assert_eq!(forest.unwrap().roots(), &[0, 1, 2]);
    }

    #[test]
    fn test_title_defaults_to_id() {
        let (forest, _) = build("modules:\n  quick_start: {}\n");
        let forest = forest.unwrap();
        let node = forest.by_id("quick_start").unwrap();
        assert_eq!(node.title, "quick_start");
        assert_eq!(node.slug, "quick-start");
    }

    #[test]
    fn test_dangling_parent() {
        let (forest, _) = build("modules:\n  a: {title: A, parent: ghost}\n");
        let err = forest.unwrap_err();
        assert!(matches!(
            err,
            BuildError::DanglingParent { ref page, ref parent } if page == "a" && parent == "ghost"
        ));
    }

    #[test]
    fn test_two_page_cycle() {
        let (forest, _) = build("modules:\n  a: {title: A, parent: b}\n  b: {title: B, parent: a}\n");
        let BuildError::CyclicHierarchy { cycle } = forest.unwrap_err() else {
            panic!("expected CyclicHierarchy");
        };
        assert_eq!(cycle, vec!["a", "b", "a"]);
    }

    #[test]
    fn test_self_parent_cycle() {
        let (forest, _) = build("modules:\n  a: {title: A, parent: a}\n");
        let BuildError::CyclicHierarchy { cycle } = forest.unwrap_err() else {
            panic!("expected CyclicHierarchy");
        };
        assert_eq!(cycle, vec!["a", "a"]);
    }

    #[test]
    fn test_cycle_reached_from_outside() {
        let (forest, _) = build(
            "modules:\n  leaf: {parent: x}\n  x: {parent: y}\n  y: {parent: x}\n",
        );
        let BuildError::CyclicHierarchy { cycle } = forest.unwrap_err() else {
            panic!("expected CyclicHierarchy");
        };
        assert_eq!(cycle, vec!["x", "y", "x"]);
    }

    #[test]
    fn test_sibling_collisions() {
        let (forest, _) = build(
            "modules:\n  p: {title: Parent}\n  o1: {title: Overview, parent: p}\n  o2: {title: Overview, parent: p}\n  other: {title: Overview}\n",
        );
        let forest = forest.unwrap();

        assert_eq!(forest.by_id("o1").unwrap().path, "parent/overview");
        assert_eq!(forest.by_id("o2").unwrap().path, "parent/overview-2");
        // Different scope, no collision.
        assert_eq!(forest.by_id("other").unwrap().path, "overview");
    }

    #[test]
    fn test_emoji_title_gets_fallback_and_advisory() {
        let (forest, ctx) = build("modules:\n  party:\n    title: \"🚀🎉\"\n");
        let forest = forest.unwrap();

        let node = forest.by_id("party").unwrap();
        assert!(node.slug.starts_with("page-"));
        assert_eq!(ctx.diagnostics().len(), 1);
        assert_eq!(ctx.diagnostics()[0].severity, Severity::Advisory);
        assert_eq!(ctx.diagnostics()[0].page, "party");
    }

    #[test]
    fn test_build_is_deterministic() {
        let yaml = "modules:\n  a: {title: Guide}\n  b: {title: Guide}\n  c: {title: Setup, parent: a}\n  d: {title: \"日本\", parent: b}\n";
        let (first, _) = build(yaml);
        let (second, _) = build(yaml);
        assert_eq!(paths(&first.unwrap()), paths(&second.unwrap()));
    }
}
