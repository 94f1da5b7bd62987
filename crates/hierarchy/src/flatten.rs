//! Flattening a partially expanded tree into render rows.
//!
//! The traversal is depth-first pre-order over the arena's sorted sibling
//! lists. After the rendered children of an expanded node that still has
//! unloaded children, a [`RenderRow::LoadMore`] sentinel is emitted. A root
//! sentinel closes the list when the root collection has more pages.
//!
//! Sentinels are their own variant; they never borrow or encode a real id.

use std::sync::Arc;

use fnv::FnvHashSet;

use crate::entity::Entity;
use crate::tree::{Node, NodeArena, NodeStatus};

/// A real entity row.
#[derive(Debug, Clone, PartialEq)]
pub struct NodeRow<T: Entity> {
    pub id: T::Id,
    pub parent_id: Option<T::Id>,
    pub hierarchy_level: usize,
    pub status: NodeStatus,
    pub is_loading_children: bool,
    pub loaded_child_count: usize,
    pub total_child_count: usize,
    pub payload: Arc<T>,
}

impl<T: Entity> NodeRow<T> {
    fn from_node(node: &Node<T>) -> Self {
        Self {
            id: node.id(),
            parent_id: node.parent_id(),
            hierarchy_level: node.hierarchy_level(),
            status: node.status(),
            is_loading_children: node.is_loading_children(),
            loaded_child_count: node.loaded_child_count(),
            total_child_count: node.total_child_count(),
            payload: node.payload().clone(),
        }
    }

    pub fn is_expanded(&self) -> bool {
        self.status == NodeStatus::Expanded
    }

    pub fn has_children(&self) -> bool {
        self.total_child_count > 0
    }
}

/// "Load more" affordance for the next page of `parent_id`'s children.
///
/// `parent_id == None` targets the root collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoadMoreRow<Id> {
    pub parent_id: Option<Id>,
    pub hierarchy_level: usize,
    pub remaining: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub enum RenderRow<T: Entity> {
    Node(NodeRow<T>),
    LoadMore(LoadMoreRow<T::Id>),
}

impl<T: Entity> RenderRow<T> {
    pub fn is_sentinel(&self) -> bool {
        matches!(self, Self::LoadMore(_))
    }

    /// Id of the real entity, `None` for sentinels.
    pub fn node_id(&self) -> Option<T::Id> {
        match self {
            Self::Node(row) => Some(row.id),
            Self::LoadMore(_) => None,
        }
    }

    pub fn parent_id(&self) -> Option<T::Id> {
        match self {
            Self::Node(row) => row.parent_id,
            Self::LoadMore(row) => row.parent_id,
        }
    }

    pub fn hierarchy_level(&self) -> usize {
        match self {
            Self::Node(row) => row.hierarchy_level,
            Self::LoadMore(row) => row.hierarchy_level,
        }
    }

    pub fn as_node(&self) -> Option<&NodeRow<T>> {
        match self {
            Self::Node(row) => Some(row),
            Self::LoadMore(_) => None,
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct FlattenOptions<'a, Id> {
    /// When false, every loaded child is emitted regardless of expansion.
    pub respect_expand_state: bool,
    /// Restricts emitted nodes to this set (filter-before-flatten).
    pub visible: Option<&'a FnvHashSet<Id>>,
}

impl<Id> Default for FlattenOptions<'_, Id> {
    fn default() -> Self {
        Self {
            respect_expand_state: true,
            visible: None,
        }
    }
}

/// Flattens the arena into render order.
pub fn flatten<T: Entity>(
    arena: &NodeArena<T>,
    options: FlattenOptions<'_, T::Id>,
) -> Vec<RenderRow<T>> {
    let mut rows = Vec::with_capacity(arena.len() + 1);
    flatten_siblings(arena, arena.roots(), options, &mut rows);

    if !arena.roots().is_empty() && arena.has_more_roots() {
        rows.push(RenderRow::LoadMore(LoadMoreRow {
            parent_id: None,
            hierarchy_level: 0,
            remaining: arena.remaining_roots().max(1),
        }));
    }
    rows
}

fn flatten_siblings<T: Entity>(
    arena: &NodeArena<T>,
    ids: &[T::Id],
    options: FlattenOptions<'_, T::Id>,
    rows: &mut Vec<RenderRow<T>>,
) {
    for id in ids {
        let Some(node) = arena.get(*id) else {
            continue;
        };
        if let Some(visible) = options.visible {
            if !visible.contains(id) {
                continue;
            }
        }

        rows.push(RenderRow::Node(NodeRow::from_node(node)));

        let open = !options.respect_expand_state || node.is_expanded();
        if open && !node.children().is_empty() {
            flatten_siblings(arena, node.children(), options, rows);
            if node.has_more_children() {
                rows.push(RenderRow::LoadMore(LoadMoreRow {
                    parent_id: Some(node.id()),
                    hierarchy_level: node.hierarchy_level() + 1,
                    remaining: node.remaining_child_count(),
                }));
            }
        }
    }
}

/// Published snapshot of the render rows.
#[derive(Debug, Clone)]
pub struct RenderList<T: Entity> {
    revision: u64,
    rows: Vec<RenderRow<T>>,
}

impl<T: Entity> Default for RenderList<T> {
    fn default() -> Self {
        Self {
            revision: 0,
            rows: Vec::new(),
        }
    }
}

impl<T: Entity> RenderList<T> {
    pub fn new(revision: u64, rows: Vec<RenderRow<T>>) -> Self {
        Self { revision, rows }
    }

    /// Monotonic publish counter; bumps on every rebuild.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn rows(&self) -> &[RenderRow<T>] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, RenderRow<T>> {
        self.rows.iter()
    }

    pub fn sentinel_count(&self) -> usize {
        self.rows.iter().filter(|row| row.is_sentinel()).count()
    }

    /// Row index of a real node.
    pub fn position(&self, id: T::Id) -> Option<usize> {
        self.rows.iter().position(|row| row.node_id() == Some(id))
    }

    /// Ids of the real rows in order.
    pub fn node_ids(&self) -> Vec<T::Id> {
        self.rows.iter().filter_map(RenderRow::node_id).collect()
    }
}
