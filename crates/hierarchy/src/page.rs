//! Page-fetch contract between the engine and its data source.

use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::entity::{Entity, NodeId};
use crate::error::{HierarchyError, Result, TransportError};

pub const MIN_PAGE_SIZE: u32 = 1;
pub const MAX_PAGE_SIZE: u32 = 100;

/// Validates a page size against the provider contract.
pub fn validate_page_size(page_size: u32) -> Result<()> {
    if !(MIN_PAGE_SIZE..=MAX_PAGE_SIZE).contains(&page_size) {
        return Err(HierarchyError::Validation(format!(
            "page size {page_size} is outside [{MIN_PAGE_SIZE}, {MAX_PAGE_SIZE}]"
        )));
    }
    Ok(())
}

/// A validated request for one page of children.
///
/// `parent` is `None` for the root collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest<Id> {
    parent: Option<Id>,
    page: u32,
    page_size: u32,
}

impl<Id: NodeId> PageRequest<Id> {
    /// Builds a request, rejecting out-of-range values instead of clamping them.
    pub fn new(parent: Option<Id>, page: u32, page_size: u32) -> Result<Self> {
        if page < 1 {
            return Err(HierarchyError::Validation(format!(
                "page must be at least 1, got {page}"
            )));
        }
        validate_page_size(page_size)?;
        Ok(Self {
            parent,
            page,
            page_size,
        })
    }

    pub fn parent(&self) -> Option<Id> {
        self.parent
    }

    pub fn page(&self) -> u32 {
        self.page
    }

    pub fn page_size(&self) -> u32 {
        self.page_size
    }
}

/// One page of items as reported by the provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    pub items: Vec<T>,
    pub total_count: usize,
    pub page_number: u32,
    pub total_pages: u32,
}

impl<T> Page<T> {
    pub fn empty(page_number: u32) -> Self {
        Self {
            items: Vec::new(),
            total_count: 0,
            page_number,
            total_pages: 0,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

/// Source of paginated children for one entity kind.
#[async_trait]
pub trait PageProvider<T: Entity>: Send + Sync {
    async fn fetch(
        &self,
        request: PageRequest<T::Id>,
    ) -> std::result::Result<Page<T>, TransportError>;
}

pub type SharedPageProvider<T> = Arc<dyn PageProvider<T>>;
