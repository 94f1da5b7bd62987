//! Id-indexed node arena.
//!
//! Nodes live in a flat map keyed by id and refer to each other through
//! explicit `parent_id` / `children` id lists, so there are no cyclic
//! pointers. Sibling lists are kept sorted by `(created_at, id)`.

use std::cmp::Ordering;

use fnv::{FnvHashMap, FnvHashSet};

use crate::entity::Entity;
use crate::error::{HierarchyError, Result};

use super::node::Node;

/// Outcome of inserting a batch of entities.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct InsertSummary {
    pub inserted: usize,
    pub duplicates: usize,
}

#[derive(Debug, Clone)]
pub struct NodeArena<T: Entity> {
    nodes: FnvHashMap<T::Id, Node<T>>,
    roots: Vec<T::Id>,
    root_total: usize,
    has_more_roots: bool,
}

impl<T: Entity> Default for NodeArena<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Entity> NodeArena<T> {
    pub fn new() -> Self {
        Self {
            nodes: FnvHashMap::default(),
            roots: Vec::new(),
            root_total: 0,
            has_more_roots: false,
        }
    }

    /// Builds an arena from a root collection.
    ///
    /// `scope` is the parent every root hangs under (`None` at top level).
    pub fn from_roots(items: Vec<T>, scope: Option<T::Id>, root_total: usize) -> Self {
        let mut arena = Self::new();
        arena.insert_roots(items, scope, root_total);
        arena
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn contains(&self, id: T::Id) -> bool {
        self.nodes.contains_key(&id)
    }

    pub fn get(&self, id: T::Id) -> Option<&Node<T>> {
        self.nodes.get(&id)
    }

    pub fn get_mut(&mut self, id: T::Id) -> Option<&mut Node<T>> {
        self.nodes.get_mut(&id)
    }

    pub fn node(&self, id: T::Id) -> Result<&Node<T>> {
        self.nodes
            .get(&id)
            .ok_or_else(|| HierarchyError::unknown_node(id))
    }

    pub fn node_mut(&mut self, id: T::Id) -> Result<&mut Node<T>> {
        self.nodes
            .get_mut(&id)
            .ok_or_else(|| HierarchyError::unknown_node(id))
    }

    pub fn nodes(&self) -> impl Iterator<Item = &Node<T>> {
        self.nodes.values()
    }

    pub(crate) fn nodes_mut(&mut self) -> impl Iterator<Item = &mut Node<T>> {
        self.nodes.values_mut()
    }

    /// Root ids in render order.
    pub fn roots(&self) -> &[T::Id] {
        &self.roots
    }

    /// Server-reported size of the root collection.
    pub fn root_total(&self) -> usize {
        self.root_total
    }

    pub fn remaining_roots(&self) -> usize {
        self.root_total.saturating_sub(self.roots.len())
    }

    /// Whether another root page can be requested.
    pub fn has_more_roots(&self) -> bool {
        self.has_more_roots
    }

    /// Overrides the count-based default with the root cursor's verdict.
    pub fn set_has_more_roots(&mut self, has_more: bool) {
        self.has_more_roots = has_more;
    }

    pub fn insert_roots(
        &mut self,
        items: Vec<T>,
        scope: Option<T::Id>,
        root_total: usize,
    ) -> InsertSummary {
        let mut summary = InsertSummary::default();
        for item in items {
            let id = item.id();
            if self.nodes.contains_key(&id) {
                summary.duplicates += 1;
                continue;
            }
            self.nodes.insert(id, Node::new(item, scope, 0));
            self.roots.push(id);
            summary.inserted += 1;
        }
        self.root_total = root_total;
        self.has_more_roots = self.remaining_roots() > 0;
        let mut roots = std::mem::take(&mut self.roots);
        self.sort_siblings(&mut roots);
        self.roots = roots;
        if summary.duplicates > 0 {
            log::warn!(
                "hierarchy root load skipped duplicate ids duplicates={} inserted={}",
                summary.duplicates,
                summary.inserted
            );
        }
        summary
    }

    /// Appends one fetched page of children under `parent`.
    ///
    /// Existing children are kept; the page is merged into the sorted
    /// sibling list. Ids already present anywhere in the arena are skipped.
    pub fn append_children(
        &mut self,
        parent: T::Id,
        items: Vec<T>,
        total_child_count: usize,
        page_size: u32,
    ) -> Result<InsertSummary> {
        self.merge_children(parent, items, total_child_count, page_size, 1)
    }

    /// Loads `pages` consecutive child pages, fetched as one batch.
    pub fn restore_children(
        &mut self,
        parent: T::Id,
        items: Vec<T>,
        total_child_count: usize,
        page_size: u32,
        pages: u32,
    ) -> Result<InsertSummary> {
        self.merge_children(parent, items, total_child_count, page_size, pages)
    }

    fn merge_children(
        &mut self,
        parent: T::Id,
        items: Vec<T>,
        total_child_count: usize,
        page_size: u32,
        pages: u32,
    ) -> Result<InsertSummary> {
        let level = self.node(parent)?.hierarchy_level() + 1;
        let mut summary = InsertSummary::default();
        let mut added = Vec::with_capacity(items.len());

        for item in items {
            let id = item.id();
            if id == parent || self.nodes.contains_key(&id) {
                summary.duplicates += 1;
                continue;
            }
            if item.parent_id() != Some(parent) {
                log::debug!(
                    "hierarchy child reparented id={:?} reported_parent={:?} parent={:?}",
                    id,
                    item.parent_id(),
                    parent
                );
            }
            self.nodes.insert(id, Node::new(item, Some(parent), level));
            added.push(id);
            summary.inserted += 1;
        }

        let mut children = {
            let node = self.node_mut(parent)?;
            node.record_pages(total_child_count, page_size, pages);
            std::mem::take(&mut node.children)
        };
        children.extend(added);
        self.sort_siblings(&mut children);
        self.node_mut(parent)?.children = children;

        if summary.duplicates > 0 {
            log::warn!(
                "hierarchy child page skipped duplicate ids parent={:?} duplicates={}",
                parent,
                summary.duplicates
            );
        }
        Ok(summary)
    }

    /// Copies the loaded descendants of `id` from `source` that this arena
    /// lacks, keeping their state. Levels are recomputed below `id`.
    ///
    /// Returns the number of copied nodes.
    pub(crate) fn graft_children(&mut self, id: T::Id, source: &NodeArena<T>) -> Result<usize> {
        let from = source.node(id)?;
        let base_level = self.node(id)?.hierarchy_level();
        let mut stack: Vec<(T::Id, usize)> = from
            .children()
            .iter()
            .filter(|child| !self.nodes.contains_key(*child))
            .map(|child| (*child, base_level + 1))
            .collect();
        let direct: Vec<T::Id> = stack.iter().map(|(child, _)| *child).collect();
        let mut grafted = 0;

        while let Some((current, level)) = stack.pop() {
            if self.nodes.contains_key(&current) {
                continue;
            }
            let Some(node) = source.get(current) else {
                continue;
            };
            let mut copy = node.clone();
            copy.set_level(level);
            copy.children.retain(|child| !self.nodes.contains_key(child));
            stack.extend(copy.children.iter().map(|child| (*child, level + 1)));
            self.nodes.insert(current, copy);
            grafted += 1;
        }

        let mut children = {
            let node = self.node_mut(id)?;
            node.adopt_paging(from.loaded_pages(), from.page_size());
            std::mem::take(&mut node.children)
        };
        children.extend(direct.into_iter().filter(|child| self.nodes.contains_key(child)));
        self.sort_siblings(&mut children);
        self.node_mut(id)?.children = children;
        Ok(grafted)
    }

    /// Orders siblings by creation time, ties broken by id.
    fn sort_siblings(&self, ids: &mut [T::Id]) {
        ids.sort_by(|left, right| self.compare_siblings(*left, *right));
    }

    fn compare_siblings(&self, left: T::Id, right: T::Id) -> Ordering {
        match (self.nodes.get(&left), self.nodes.get(&right)) {
            (Some(l), Some(r)) => l
                .payload()
                .created_at()
                .cmp(&r.payload().created_at())
                .then_with(|| left.cmp(&right)),
            _ => left.cmp(&right),
        }
    }

    /// Walks the parent chain from `id` upwards, excluding `id` itself.
    pub fn ancestors(&self, id: T::Id) -> Vec<T::Id> {
        let mut chain = Vec::new();
        let mut seen = FnvHashSet::default();
        let mut current = self.nodes.get(&id).and_then(|node| node.parent_id());
        while let Some(parent) = current {
            if !seen.insert(parent) {
                break;
            }
            let Some(node) = self.nodes.get(&parent) else {
                break;
            };
            chain.push(parent);
            current = node.parent_id();
        }
        chain
    }

    /// Counts all loaded descendants of `id` regardless of expansion.
    pub fn count_descendants(&self, id: T::Id) -> usize {
        let Some(node) = self.nodes.get(&id) else {
            return 0;
        };
        let mut stack: Vec<T::Id> = node.children().to_vec();
        let mut count = 0;
        while let Some(current) = stack.pop() {
            count += 1;
            if let Some(child) = self.nodes.get(&current) {
                stack.extend_from_slice(child.children());
            }
        }
        count
    }
}
