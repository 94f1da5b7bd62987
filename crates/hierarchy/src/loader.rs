//! Cumulative reload of a paged collection.
//!
//! A reload refetches pages `1..=current_page` in ascending order and
//! concatenates them, so rows the user already paged into stay visible after
//! a refresh. The root collection keeps one loader; rehydration builds a
//! short-lived one per open node to restore its child pages. The loop stops early on an empty page or when the server's
//! reported page count drops below the page about to be fetched.
//!
//! Loading does not mutate the loader. The caller commits the returned
//! cursor once the result is accepted, so a failed or superseded reload
//! leaves the previous cursor untouched.

use crate::entity::{Entity, NodeId};
use crate::error::{HierarchyError, Result};
use crate::page::{validate_page_size, PageProvider, PageRequest};

/// Root pagination cursor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RootCursor {
    pub current_page: u32,
    pub total_pages: u32,
    pub total_count: usize,
}

impl Default for RootCursor {
    fn default() -> Self {
        Self {
            current_page: 1,
            total_pages: 0,
            total_count: 0,
        }
    }
}

impl RootCursor {
    pub fn has_more(&self) -> bool {
        self.current_page < self.total_pages
    }
}

/// Result of one cumulative reload.
#[derive(Debug, Clone)]
pub struct RootLoad<T> {
    /// Items of every fetched page, concatenated in page order.
    pub items: Vec<T>,
    pub cursor: RootCursor,
    pub pages_fetched: u32,
    /// True when the requested page was beyond the server's page count.
    pub clamped: bool,
}

#[derive(Debug, Clone)]
pub struct CumulativeRootLoader<Id> {
    scope: Option<Id>,
    page_size: u32,
    cursor: RootCursor,
}

impl<Id: NodeId> CumulativeRootLoader<Id> {
    pub fn new(scope: Option<Id>, page_size: u32) -> Result<Self> {
        validate_page_size(page_size)?;
        Ok(Self {
            scope,
            page_size,
            cursor: RootCursor::default(),
        })
    }

    /// Parent whose children form the root collection (`None` = top level).
    pub fn scope(&self) -> Option<Id> {
        self.scope
    }

    pub fn page_size(&self) -> u32 {
        self.page_size
    }

    pub fn cursor(&self) -> RootCursor {
        self.cursor
    }

    pub fn current_page(&self) -> u32 {
        self.cursor.current_page
    }

    /// Re-scopes the loader and rewinds it to page 1.
    pub fn reset(&mut self, scope: Option<Id>) {
        self.scope = scope;
        self.cursor = RootCursor::default();
    }

    pub fn set_current_page(&mut self, page: u32) -> Result<()> {
        if page < 1 {
            return Err(HierarchyError::Validation(format!(
                "page must be at least 1, got {page}"
            )));
        }
        self.cursor.current_page = page;
        Ok(())
    }

    /// Moves the cursor to the next page when the server reports one.
    pub fn advance(&mut self) -> bool {
        if !self.cursor.has_more() {
            return false;
        }
        self.cursor.current_page += 1;
        true
    }

    pub fn commit(&mut self, cursor: RootCursor) {
        self.cursor = cursor;
    }

    /// Fetches pages `1..=current_page` and concatenates their items.
    pub async fn load<T>(&self, provider: &dyn PageProvider<T>) -> Result<RootLoad<T>>
    where
        T: Entity<Id = Id>,
    {
        let target = self.cursor.current_page.max(1);
        let mut items = Vec::new();
        let mut pages_fetched = 0;
        let mut reported_total_pages: Option<u32> = None;
        let mut last_non_empty: Option<RootCursor> = None;

        for page in 1..=target {
            if let Some(total_pages) = reported_total_pages {
                if page > total_pages {
                    break;
                }
            }

            let request = PageRequest::new(self.scope, page, self.page_size)?;
            let response = provider.fetch(request).await?;
            pages_fetched += 1;
            reported_total_pages = Some(response.total_pages);

            if response.items.is_empty() {
                break;
            }
            last_non_empty = Some(RootCursor {
                current_page: response.page_number.max(1),
                total_pages: response.total_pages,
                total_count: response.total_count,
            });
            items.extend(response.items);
        }

        let cursor = match last_non_empty {
            Some(cursor) => cursor,
            None => RootCursor {
                current_page: 1,
                total_pages: reported_total_pages.unwrap_or(0),
                total_count: 0,
            },
        };
        let clamped = cursor.current_page < target;
        if clamped {
            log::warn!(
                "hierarchy cursor clamped scope={:?} requested_page={} current_page={} total_pages={}",
                self.scope,
                target,
                cursor.current_page,
                cursor.total_pages
            );
        }

        log::debug!(
            "hierarchy cumulative load scope={:?} pages_fetched={} items={} total_count={}",
            self.scope,
            pages_fetched,
            items.len(),
            cursor.total_count
        );

        Ok(RootLoad {
            items,
            cursor,
            pages_fetched,
            clamped,
        })
    }
}
