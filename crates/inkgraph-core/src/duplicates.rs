//! Duplicate detection and cleanup over a [`GraphDocument`].
//!
//! Two links are duplicates when they join the same unordered pair of
//! nodes under the same label (case and surrounding whitespace ignored).
//! Two nodes are duplicates when their names match under the same
//! normalization. Links are otherwise opaque, so a link without integer
//! `id1`/`id2` fields is never considered a duplicate and never touched.

use std::collections::{HashMap, HashSet};

use indexmap::IndexMap;
use serde::Serialize;
use serde_json::Value;

use crate::document::{GraphDocument, Link};
use crate::id::NodeId;

/// Result of a duplicate audit.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DuplicateReport {
    /// Indices (into `links`) of every link that repeats an earlier one.
    pub duplicate_links: Vec<usize>,
    /// Groups of node ids sharing a normalized name, in first-seen order.
    /// The first id of each group is the one a merge keeps.
    pub duplicate_nodes: Vec<Vec<NodeId>>,
}

impl DuplicateReport {
    /// Returns true when nothing needs cleaning.
    pub fn is_clean(&self) -> bool {
        self.duplicate_links.is_empty() && self.duplicate_nodes.is_empty()
    }
}

fn normalize(text: &str) -> String {
    text.trim().to_lowercase()
}

fn endpoint(link: &Link, field: &str) -> Option<i64> {
    link.get(field).and_then(Value::as_i64)
}

/// Identity of a link for duplicate purposes, or `None` if the link does
/// not carry integer endpoints.
fn link_key(link: &Link) -> Option<(i64, i64, String)> {
    let a = endpoint(link, "id1")?;
    let b = endpoint(link, "id2")?;
    let label = link.get("label").and_then(Value::as_str).unwrap_or("");
    Some((a.min(b), a.max(b), normalize(label)))
}

fn duplicate_link_indices(links: &[Link]) -> Vec<usize> {
    let mut seen = HashSet::new();
    links
        .iter()
        .enumerate()
        .filter_map(|(idx, link)| {
            let key = link_key(link)?;
            (!seen.insert(key)).then_some(idx)
        })
        .collect()
}

fn duplicate_node_groups(doc: &GraphDocument) -> Vec<Vec<NodeId>> {
    let mut by_name: IndexMap<String, Vec<NodeId>> = IndexMap::new();
    for node in &doc.nodes {
        by_name.entry(normalize(&node.name)).or_default().push(node.id);
    }
    by_name
        .into_values()
        .filter(|group| group.len() > 1)
        .collect()
}

/// Reports duplicate links and duplicate nodes without changing anything.
pub fn audit(doc: &GraphDocument) -> DuplicateReport {
    DuplicateReport {
        duplicate_links: duplicate_link_indices(&doc.links),
        duplicate_nodes: duplicate_node_groups(doc),
    }
}

/// Removes every link that repeats an earlier one, keeping the first.
/// Returns the number of links removed.
pub fn remove_duplicate_links(doc: &mut GraphDocument) -> usize {
    let mut seen = HashSet::new();
    let before = doc.links.len();
    doc.links.retain(|link| match link_key(link) {
        Some(key) => seen.insert(key),
        None => true,
    });
    before - doc.links.len()
}

fn retarget(link: &mut Link, field: &str, replaced: &HashMap<i64, i64>) {
    let Some(current) = endpoint(link, field) else {
        return;
    };
    if let (Some(&keep), Some(obj)) = (replaced.get(&current), link.as_object_mut()) {
        obj.insert(field.to_string(), Value::from(keep));
    }
}

/// Merges nodes with the same normalized name into the first node of each
/// group. Links pointing at a merged node are re-pointed at the kept node
/// and the kept node gains any images it did not already list; links that
/// become duplicates through re-pointing are then removed. Image files are
/// not touched. Returns the number of nodes removed.
pub fn merge_duplicate_nodes(doc: &mut GraphDocument) -> usize {
    let groups = duplicate_node_groups(doc);
    if groups.is_empty() {
        return 0;
    }

    // removed id -> kept id
    let mut replaced: HashMap<i64, i64> = HashMap::new();
    for group in &groups {
        let keep = group[0];
        for removed in &group[1..] {
            replaced.insert(removed.0, keep.0);
        }
    }

    for link in &mut doc.links {
        retarget(link, "id1", &replaced);
        retarget(link, "id2", &replaced);
    }

    for group in &groups {
        let keep = group[0];
        let mut inherited: Vec<String> = Vec::new();
        for removed in &group[1..] {
            if let Some(node) = doc.node(*removed) {
                inherited.extend(node.images.iter().cloned());
            }
        }
        if let Some(kept) = doc.node_mut(keep) {
            for image in inherited {
                if !kept.has_image(&image) {
                    kept.images.push(image);
                }
            }
        }
    }

    let before = doc.nodes.len();
    doc.nodes.retain(|node| !replaced.contains_key(&node.id.0));
    let merged = before - doc.nodes.len();

    // re-pointed links may now repeat each other
    if merged > 0 {
        remove_duplicate_links(doc);
    }
    merged
}
