use std::collections::{HashMap, HashSet};

use selfora_shared::{Page, PageTreeNode};
use tracing::warn;

/// Build the workspace forest from a flat parent-pointer list.
///
/// Pages whose parent is null, missing from the input, or the page itself
/// become roots. Sibling lists are sorted by `order` ascending; the sort is
/// stable, so equal keys keep their input order. Cycles cannot make this
/// loop: assembly tracks emitted ids and any page left unreached after the
/// root descent sits on a cycle and is re-rooted instead.
pub fn build_forest(pages: &[Page]) -> Vec<PageTreeNode> {
    let ids: HashSet<&str> = pages.iter().map(|p| p.id.as_str()).collect();

    let mut roots: Vec<&Page> = Vec::new();
    let mut children: HashMap<&str, Vec<&Page>> = HashMap::new();
    for page in pages {
        match page.parent.as_deref() {
            Some(parent) if parent != page.id && ids.contains(parent) => {
                children.entry(parent).or_default().push(page);
            }
            _ => roots.push(page),
        }
    }

    roots.sort_by(|a, b| a.order.total_cmp(&b.order));
    for list in children.values_mut() {
        list.sort_by(|a, b| a.order.total_cmp(&b.order));
    }

    let mut emitted: HashSet<&str> = HashSet::with_capacity(pages.len());
    let mut forest = Vec::with_capacity(roots.len());
    for root in roots {
        forest.push(assemble(root, &children, &mut emitted));
    }

    // Anything unreached from a root sits on a cycle. Break the cycle by
    // re-rooting its members in input order so no page is dropped.
    for page in pages {
        if !emitted.contains(page.id.as_str()) {
            warn!(page_id = %page.id, "cycle in page hierarchy, re-rooting");
            forest.push(assemble(page, &children, &mut emitted));
        }
    }

    forest
}

fn assemble<'a>(
    page: &'a Page,
    children: &HashMap<&'a str, Vec<&'a Page>>,
    emitted: &mut HashSet<&'a str>,
) -> PageTreeNode {
    emitted.insert(page.id.as_str());
    let mut node = PageTreeNode {
        page: page.clone(),
        children: Vec::new(),
    };
    if let Some(kids) = children.get(page.id.as_str()) {
        for child in kids {
            // An already-emitted child is a back-edge; skip it.
            if !emitted.contains(child.id.as_str()) {
                node.children.push(assemble(child, children, emitted));
            }
        }
    }
    node
}

/// Preorder flatten of a forest.
pub fn flatten(forest: &[PageTreeNode]) -> Vec<&Page> {
    fn walk<'a>(node: &'a PageTreeNode, out: &mut Vec<&'a Page>) {
        out.push(&node.page);
        for child in &node.children {
            walk(child, out);
        }
    }

    let mut out = Vec::new();
    for node in forest {
        walk(node, &mut out);
    }
    out
}
