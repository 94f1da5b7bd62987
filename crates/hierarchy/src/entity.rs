//! Entity summaries consumed by the hierarchy engine.
//!
//! The engine is generic over the payload it renders. Anything implementing
//! [`Entity`] can be flattened: projects, tasks and threaded comments all
//! share [`EntitySummary`] as their wire shape, but hosts may supply their
//! own types.

use std::fmt::Debug;
use std::hash::Hash;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Identifier of a node within one entity kind.
pub trait NodeId: Copy + Eq + Ord + Hash + Debug + Send + Sync + 'static {}

impl<T> NodeId for T where T: Copy + Eq + Ord + Hash + Debug + Send + Sync + 'static {}

/// Attributes the filter engine can compare for equality.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Attribute {
    Status,
    Type,
    Priority,
}

impl Attribute {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Status => "status",
            Self::Type => "type",
            Self::Priority => "priority",
        }
    }
}

/// A hierarchical entity as reported by the page provider.
pub trait Entity: Clone + Send + Sync + 'static {
    type Id: NodeId;

    fn id(&self) -> Self::Id;

    fn parent_id(&self) -> Option<Self::Id>;

    fn display_name(&self) -> &str;

    fn created_at(&self) -> DateTime<Utc>;

    /// Server-reported number of direct children.
    fn child_count(&self) -> usize;

    /// Looks up a searchable text field by name.
    fn text_field(&self, name: &str) -> Option<&str>;

    fn attribute(&self, attribute: Attribute) -> Option<&str>;
}

/// Kind of entity a summary describes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntityKind {
    Project,
    Task,
    Comment,
}

impl EntityKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Project => "project",
            Self::Task => "task",
            Self::Comment => "comment",
        }
    }
}

/// Summary row shared by projects, tasks and comments.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EntitySummary {
    pub id: i64,
    pub parent_id: Option<i64>,
    pub kind: EntityKind,
    pub display_name: String,
    #[serde(default)]
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub child_count: usize,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub entity_type: Option<String>,
    #[serde(default)]
    pub priority: Option<String>,
}

impl EntitySummary {
    pub fn new(
        kind: EntityKind,
        id: i64,
        parent_id: Option<i64>,
        display_name: impl Into<String>,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            parent_id,
            kind,
            display_name: display_name.into(),
            description: None,
            created_at,
            child_count: 0,
            status: None,
            entity_type: None,
            priority: None,
        }
    }

    pub fn with_child_count(mut self, child_count: usize) -> Self {
        self.child_count = child_count;
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_status(mut self, status: impl Into<String>) -> Self {
        self.status = Some(status.into());
        self
    }

    pub fn with_type(mut self, entity_type: impl Into<String>) -> Self {
        self.entity_type = Some(entity_type.into());
        self
    }

    pub fn with_priority(mut self, priority: impl Into<String>) -> Self {
        self.priority = Some(priority.into());
        self
    }
}

impl Entity for EntitySummary {
    type Id = i64;

    fn id(&self) -> i64 {
        self.id
    }

    fn parent_id(&self) -> Option<i64> {
        self.parent_id
    }

    fn display_name(&self) -> &str {
        self.display_name.as_str()
    }

    fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    fn child_count(&self) -> usize {
        self.child_count
    }

    fn text_field(&self, name: &str) -> Option<&str> {
        match name {
            "name" | "displayName" | "display_name" | "title" => Some(self.display_name.as_str()),
            "description" | "content" | "body" => self.description.as_deref(),
            "kind" => Some(self.kind.as_str()),
            _ => None,
        }
    }

    fn attribute(&self, attribute: Attribute) -> Option<&str> {
        match attribute {
            Attribute::Status => self.status.as_deref(),
            Attribute::Type => self.entity_type.as_deref(),
            Attribute::Priority => self.priority.as_deref(),
        }
    }
}
