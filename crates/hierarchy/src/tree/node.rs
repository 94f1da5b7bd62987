//! Per-node state: payload, loaded children, expansion and paging cursor.

use std::sync::Arc;

use crate::entity::Entity;
use crate::generation::{FetchStamp, Generation};

/// Expansion state of a node.
///
/// `Collapsed` covers both "never loaded" and "loaded but hidden"; use
/// [`Node::children_loaded`] to tell them apart.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeStatus {
    Collapsed,
    Loading,
    Expanded,
}

impl NodeStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Collapsed => "collapsed",
            Self::Loading => "loading",
            Self::Expanded => "expanded",
        }
    }
}

/// One entity in the arena.
#[derive(Debug, Clone)]
pub struct Node<T: Entity> {
    id: T::Id,
    parent_id: Option<T::Id>,
    payload: Arc<T>,
    pub(super) children: Vec<T::Id>,
    status: NodeStatus,
    loading_more: bool,
    total_child_count: usize,
    loaded_pages: u32,
    page_size: u32,
    level: usize,
    fetch: FetchStamp,
}

impl<T: Entity> Node<T> {
    pub(super) fn new(payload: T, parent_id: Option<T::Id>, level: usize) -> Self {
        Self {
            id: payload.id(),
            parent_id,
            total_child_count: payload.child_count(),
            payload: Arc::new(payload),
            children: Vec::new(),
            status: NodeStatus::Collapsed,
            loading_more: false,
            loaded_pages: 0,
            page_size: 0,
            level,
            fetch: FetchStamp::default(),
        }
    }

    pub fn id(&self) -> T::Id {
        self.id
    }

    pub fn parent_id(&self) -> Option<T::Id> {
        self.parent_id
    }

    pub fn payload(&self) -> &Arc<T> {
        &self.payload
    }

    /// Loaded children in render order.
    pub fn children(&self) -> &[T::Id] {
        &self.children
    }

    pub fn status(&self) -> NodeStatus {
        self.status
    }

    pub fn is_expanded(&self) -> bool {
        self.status == NodeStatus::Expanded
    }

    pub fn is_loading_children(&self) -> bool {
        self.status == NodeStatus::Loading || self.loading_more
    }

    pub fn total_child_count(&self) -> usize {
        self.total_child_count
    }

    pub fn loaded_child_count(&self) -> usize {
        self.children.len()
    }

    pub fn remaining_child_count(&self) -> usize {
        self.total_child_count.saturating_sub(self.loaded_child_count())
    }

    pub fn has_more_children(&self) -> bool {
        self.loaded_child_count() < self.total_child_count
    }

    pub fn children_loaded(&self) -> bool {
        self.loaded_pages > 0
    }

    pub fn loaded_pages(&self) -> u32 {
        self.loaded_pages
    }

    pub fn page_size(&self) -> u32 {
        self.page_size
    }

    /// Depth in the tree; roots are level 0.
    pub fn hierarchy_level(&self) -> usize {
        self.level
    }

    pub fn fetch_generation(&self) -> Generation {
        self.fetch.generation()
    }

    pub fn is_current_fetch(&self, generation: Generation) -> bool {
        self.fetch.is_current(generation)
    }

    pub(crate) fn begin_expand_fetch(&mut self, generation: Generation) {
        self.status = NodeStatus::Loading;
        self.fetch.issue(generation);
    }

    pub(crate) fn begin_load_more(&mut self, generation: Generation) {
        self.loading_more = true;
        self.fetch.issue(generation);
    }

    /// Drops any in-flight fetch and clears loading flags.
    pub(crate) fn cancel_fetch(&mut self, superseding: Generation) {
        self.fetch.issue(superseding);
        self.loading_more = false;
        if self.status == NodeStatus::Loading {
            self.status = NodeStatus::Collapsed;
        }
    }

    /// Returns a failed fetch to the last good state.
    pub(crate) fn fail_fetch(&mut self) {
        self.loading_more = false;
        if self.status == NodeStatus::Loading {
            self.status = NodeStatus::Collapsed;
        }
    }

    pub(crate) fn set_expanded(&mut self, expanded: bool) {
        self.status = if expanded {
            NodeStatus::Expanded
        } else {
            NodeStatus::Collapsed
        };
    }

    pub(super) fn record_pages(&mut self, total_child_count: usize, page_size: u32, pages: u32) {
        self.loaded_pages += pages;
        self.page_size = page_size;
        self.total_child_count = total_child_count;
        self.loading_more = false;
    }

    pub(super) fn set_level(&mut self, level: usize) {
        self.level = level;
    }

    /// Raises the paging cursor to `loaded_pages` after children were grafted.
    pub(super) fn adopt_paging(&mut self, loaded_pages: u32, page_size: u32) {
        if loaded_pages > self.loaded_pages {
            self.loaded_pages = loaded_pages;
            self.page_size = page_size;
        }
    }

    /// Takes over the expansion state and pending fetch of `previous`.
    pub(crate) fn adopt_state(&mut self, previous: &Node<T>) {
        self.status = previous.status;
        self.loading_more = previous.loading_more;
        self.fetch = previous.fetch;
    }
}
