//! Materialized-path helpers shared by the category and comment trees.
//!
//! Every tree row keeps its parent id and a `path` column of the form
//! `/<root id>/<child id>/.../<own id>/`. A subtree is then a single prefix
//! match on `path`, and the ancestors of a row can be read straight out of
//! its own path without walking the table.

use std::collections::{HashMap, HashSet};
use std::hash::Hash;

use serde::Serialize;

/// Path of a root node.
#[must_use]
pub fn root_path(id: &str) -> String {
    format!("/{id}/")
}

/// Path of a node placed under `parent_path`.
#[must_use]
pub fn child_path(parent_path: &str, id: &str) -> String {
    format!("{parent_path}{id}/")
}

/// Depth of a node (0 for roots).
#[must_use]
pub fn depth_of(path: &str) -> i32 {
    path.split('/').filter(|s| !s.is_empty()).count().saturating_sub(1) as i32
}

/// Ancestor ids of a node, root first, excluding the node itself.
#[must_use]
pub fn ancestor_ids(path: &str) -> Vec<String> {
    let mut ids: Vec<String> = path
        .split('/')
        .filter(|s| !s.is_empty())
        .map(ToString::to_string)
        .collect();
    ids.pop();
    ids
}

/// Whether `path` lies inside the subtree rooted at `root_path`
/// (the root itself included).
#[must_use]
pub fn is_within(path: &str, root_path: &str) -> bool {
    path.starts_with(root_path)
}

/// A node of an in-memory tree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TreeNode<T> {
    /// The row at this node.
    pub item: T,
    /// Child nodes, in the order the rows were given.
    pub children: Vec<TreeNode<T>>,
}

impl<T> TreeNode<T> {
    /// Number of nodes in this subtree, this node included.
    #[must_use]
    pub fn size(&self) -> usize {
        1 + self.children.iter().map(Self::size).sum::<usize>()
    }
}

/// Assemble rows into a forest.
///
/// Siblings keep the relative order of `items`, so callers sort the input by
/// the sibling ordering they want. A row whose parent is not among `items`
/// becomes a root.
pub fn build_forest<T, K, FI, FP>(items: Vec<T>, id: FI, parent: FP) -> Vec<TreeNode<T>>
where
    K: Eq + Hash + Clone,
    FI: Fn(&T) -> K,
    FP: Fn(&T) -> Option<K>,
{
    let ids: HashSet<K> = items.iter().map(&id).collect();
    let mut children: HashMap<K, Vec<T>> = HashMap::new();
    let mut roots = Vec::new();

    for item in items {
        match parent(&item).filter(|p| ids.contains(p)) {
            Some(p) => children.entry(p).or_default().push(item),
            None => roots.push(item),
        }
    }

    roots
        .into_iter()
        .map(|root| attach(root, &mut children, &id))
        .collect()
}

fn attach<T, K, FI>(item: T, children: &mut HashMap<K, Vec<T>>, id: &FI) -> TreeNode<T>
where
    K: Eq + Hash + Clone,
    FI: Fn(&T) -> K,
{
    let kids = children.remove(&id(&item)).unwrap_or_default();
    TreeNode {
        children: kids
            .into_iter()
            .map(|kid| attach(kid, children, id))
            .collect(),
        item,
    }
}
