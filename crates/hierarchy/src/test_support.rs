//! In-memory page provider for tests.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Duration, TimeZone, Utc};
use fnv::{FnvHashMap, FnvHashSet};
use parking_lot::Mutex;
use tokio::sync::Notify;

use crate::entity::{EntityKind, EntitySummary};
use crate::error::TransportError;
use crate::page::{Page, PageProvider, PageRequest};

pub(crate) fn created(offset: i64) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap() + Duration::seconds(offset)
}

/// Summary whose creation order follows its id.
pub(crate) fn summary(id: i64, parent: Option<i64>, name: &str) -> EntitySummary {
    EntitySummary::new(EntityKind::Task, id, parent, name, created(id))
}

/// Blocks one fetch until released.
#[derive(Clone, Default)]
pub(crate) struct FetchGate {
    entered: Arc<Notify>,
    release: Arc<Notify>,
}

impl FetchGate {
    pub(crate) async fn entered(&self) {
        self.entered.notified().await;
    }

    pub(crate) fn release(&self) {
        self.release.notify_one();
    }
}

#[derive(Default)]
pub(crate) struct FakeProvider {
    children: Mutex<FnvHashMap<Option<i64>, Vec<EntitySummary>>>,
    scripted: Mutex<FnvHashMap<(Option<i64>, u32), Page<EntitySummary>>>,
    failing: Mutex<FnvHashSet<Option<i64>>>,
    gates: Mutex<FnvHashMap<Option<i64>, FetchGate>>,
    calls: Mutex<Vec<(Option<i64>, u32, u32)>>,
}

impl FakeProvider {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Registers `items` as the children of `parent`, fixing up child counts
    /// of already registered entities.
    pub(crate) fn with_children(self, parent: Option<i64>, items: Vec<EntitySummary>) -> Self {
        self.set_children(parent, items);
        self
    }

    pub(crate) fn set_children(&self, parent: Option<i64>, items: Vec<EntitySummary>) {
        let mut children = self.children.lock();
        let count = items.len();
        if let Some(parent_id) = parent {
            for siblings in children.values_mut() {
                for item in siblings.iter_mut().filter(|item| item.id == parent_id) {
                    item.child_count = count;
                }
            }
        }
        let items = items
            .into_iter()
            .map(|mut item| {
                if let Some(grandchildren) = children.get(&Some(item.id)) {
                    item.child_count = grandchildren.len();
                }
                item
            })
            .collect();
        children.insert(parent, items);
    }

    /// Overrides the response for one page.
    pub(crate) fn script(&self, parent: Option<i64>, page: Page<EntitySummary>) {
        self.scripted.lock().insert((parent, page.page_number), page);
    }

    pub(crate) fn fail(&self, parent: Option<i64>) {
        self.failing.lock().insert(parent);
    }

    pub(crate) fn recover(&self, parent: Option<i64>) {
        self.failing.lock().remove(&parent);
    }

    /// Blocks the next fetch for `parent` until the returned gate is released.
    pub(crate) fn gate(&self, parent: Option<i64>) -> FetchGate {
        let gate = FetchGate::default();
        self.gates.lock().insert(parent, gate.clone());
        gate
    }

    pub(crate) fn as_dyn(&self) -> &dyn PageProvider<EntitySummary> {
        self
    }

    pub(crate) fn calls(&self) -> Vec<(Option<i64>, u32, u32)> {
        self.calls.lock().clone()
    }

    pub(crate) fn calls_for(&self, parent: Option<i64>) -> usize {
        self.calls
            .lock()
            .iter()
            .filter(|(called, _, _)| *called == parent)
            .count()
    }

    fn page_of(&self, request: &PageRequest<i64>) -> Page<EntitySummary> {
        if let Some(page) = self.scripted.lock().get(&(request.parent(), request.page())) {
            return page.clone();
        }
        let children = self.children.lock();
        let all = children
            .get(&request.parent())
            .cloned()
            .unwrap_or_default();
        let size = request.page_size() as usize;
        let start = (request.page() as usize - 1) * size;
        let items = all.iter().skip(start).take(size).cloned().collect();
        Page {
            items,
            total_count: all.len(),
            page_number: request.page(),
            total_pages: all.len().div_ceil(size) as u32,
        }
    }
}

#[async_trait]
impl PageProvider<EntitySummary> for FakeProvider {
    async fn fetch(
        &self,
        request: PageRequest<i64>,
    ) -> Result<Page<EntitySummary>, TransportError> {
        self.calls
            .lock()
            .push((request.parent(), request.page(), request.page_size()));

        let gate = self.gates.lock().remove(&request.parent());
        if let Some(gate) = gate {
            gate.entered.notify_one();
            gate.release.notified().await;
        }

        if self.failing.lock().contains(&request.parent()) {
            return Err(TransportError::new(format!(
                "connection reset fetching children of {:?}",
                request.parent()
            )));
        }
        Ok(self.page_of(&request))
    }
}
