//! Paginated hierarchical list engine.
//!
//! This crate turns a lazily loaded tree of entities into a flat list of
//! render rows:
//! - Node arena with per-node child pagination and expand state
//! - Depth-first flattening with "load more" sentinel rows
//! - Keyword and attribute filtering that keeps ancestor chains visible
//! - Cumulative root reloads, drill-down navigation and breadcrumbs
//! - A controller that publishes each rebuilt list to subscribers

pub mod config;
pub mod controller;
pub mod entity;
pub mod error;
pub mod expand;
pub mod filter;
pub mod flatten;
pub mod generation;
pub mod loader;
pub mod navigation;
pub mod page;
pub mod tree;

#[cfg(test)]
mod test_support;

// Re-export main types
pub use config::{load_or_default_hierarchy_config, HierarchyConfig};
pub use controller::{CommandOutcome, HierarchyController, HierarchyStats};
pub use entity::{Attribute, Entity, EntityKind, EntitySummary, NodeId};
pub use error::{HierarchyError, Result, TransportError};
pub use expand::ExpandStateCache;
pub use filter::{FilterEngine, FilterState, Selection};
pub use flatten::{flatten, FlattenOptions, LoadMoreRow, NodeRow, RenderList, RenderRow};
pub use loader::{CumulativeRootLoader, RootCursor};
pub use navigation::{Breadcrumb, Navigator};
pub use page::{Page, PageProvider, PageRequest, SharedPageProvider};
pub use tree::{NodeArena, Node, NodeStatus};
