//! HierarchyController - the public face of one hierarchical list.
//!
//! The controller owns the node arena, expand cache, root loader, filter and
//! breadcrumb trail of a single list instance. Every command runs as
//! "mutate node graph, rebuild rows, publish" under one lock. The lock is
//! released while a page fetch is pending, so other commands stay
//! responsive; when the fetch returns, its generation is checked against the
//! target's newest fetch and stale results are dropped.
//!
//! ## Reloads
//!
//! A reload (refresh, root "load more", navigation, context switch) builds a
//! fresh arena off-lock: the cumulative root load, then eager rehydration of
//! every node the expand cache marks as open, level by level, with as many
//! child pages as it had loaded before. Only the finished arena is swapped
//! in and published. Navigation and cursor changes ride along with the
//! reload and are committed only if it succeeds.
//!
//! Node commands keep running against the current arena while a reload is
//! in flight. Each one marks its node as touched; at commit the touched
//! nodes (and any node with a fetch still pending) carry their state and
//! loaded children over into the new arena.

use std::collections::VecDeque;
use std::sync::Arc;

use fnv::{FnvHashMap, FnvHashSet};
use parking_lot::Mutex;
use tokio::sync::watch;
use tokio_stream::wrappers::WatchStream;

use crate::config::HierarchyConfig;
use crate::entity::Entity;
use crate::error::{HierarchyError, Result};
use crate::expand::ExpandStateCache;
use crate::filter::{FilterEngine, FilterState};
use crate::flatten::{flatten, FlattenOptions, RenderList, RenderRow};
use crate::generation::{FetchStamp, Generation, GenerationTracker};
use crate::loader::{CumulativeRootLoader, RootCursor, RootLoad};
use crate::navigation::{Breadcrumb, Navigator};
use crate::page::{PageRequest, SharedPageProvider};
use crate::tree::{NodeArena, NodeStatus};

/// What a command did to the published rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandOutcome {
    /// State changed and a new list was published.
    Applied,
    /// Nothing to do; the list was not republished.
    Unchanged,
    /// The command's fetch was superseded and its result discarded.
    Stale,
}

/// Counters describing the current list.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct HierarchyStats {
    pub revision: u64,
    pub loaded_nodes: usize,
    pub expanded_nodes: usize,
    pub loading_nodes: usize,
    pub visible_rows: usize,
    pub sentinel_rows: usize,
    pub root_loaded: usize,
    pub root_total: usize,
    pub current_page: u32,
    pub total_pages: u32,
    pub cached_expand_flags: usize,
    pub rehydration_failures: usize,
}

struct ControllerState<T: Entity> {
    arena: NodeArena<T>,
    cache: ExpandStateCache<T::Id>,
    loader: CumulativeRootLoader<T::Id>,
    navigator: Navigator<T::Id>,
    filter: FilterState,
    root_fetch: FetchStamp,
    revision: u64,
    rehydration_failures: usize,
    /// Nodes changed by commands since the newest reload was planned.
    touched: FnvHashSet<T::Id>,
}

/// A reload prepared under the lock and committed after its fetches.
struct ReloadPlan<T: Entity> {
    generation: Generation,
    loader: CumulativeRootLoader<T::Id>,
    navigator: Navigator<T::Id>,
    /// New browsing context; the expand cache is reset on commit.
    context: Option<String>,
    /// Loaded child pages and page size per node, restored on rehydration.
    child_pages: FnvHashMap<T::Id, (u32, u32)>,
}

pub struct HierarchyController<T: Entity> {
    provider: SharedPageProvider<T>,
    config: HierarchyConfig,
    filter_engine: FilterEngine,
    generations: GenerationTracker,
    state: Mutex<ControllerState<T>>,
    publisher: watch::Sender<Arc<RenderList<T>>>,
}

impl<T: Entity> HierarchyController<T> {
    /// Creates an empty controller; call [`refresh`](Self::refresh) to load.
    pub fn new(provider: SharedPageProvider<T>, config: HierarchyConfig) -> Result<Self> {
        config.validate()?;
        let loader = CumulativeRootLoader::new(None, config.root_page_size)?;
        let filter_engine = FilterEngine::new(config.search_fields.iter().cloned());
        let (publisher, _) = watch::channel(Arc::new(RenderList::default()));

        Ok(Self {
            provider,
            config,
            filter_engine,
            generations: GenerationTracker::new(),
            state: Mutex::new(ControllerState {
                arena: NodeArena::new(),
                cache: ExpandStateCache::new(),
                loader,
                navigator: Navigator::new(),
                filter: FilterState::default(),
                root_fetch: FetchStamp::default(),
                revision: 0,
                rehydration_failures: 0,
                touched: FnvHashSet::default(),
            }),
            publisher,
        })
    }

    pub fn config(&self) -> &HierarchyConfig {
        &self.config
    }

    // ------------------------------------------------------------------
    // Observation
    // ------------------------------------------------------------------

    pub fn subscribe(&self) -> watch::Receiver<Arc<RenderList<T>>> {
        self.publisher.subscribe()
    }

    /// Published lists as a stream, starting with the current one.
    pub fn stream(&self) -> WatchStream<Arc<RenderList<T>>> {
        WatchStream::new(self.publisher.subscribe())
    }

    /// The most recently published list.
    pub fn rows(&self) -> Arc<RenderList<T>> {
        self.publisher.borrow().clone()
    }

    /// Every loaded node regardless of expansion, with the filter applied.
    pub fn full_rows(&self) -> Vec<RenderRow<T>> {
        let state = self.state.lock();
        let visible = self.filter_engine.visible_set(&state.filter, &state.arena);
        flatten(
            &state.arena,
            FlattenOptions {
                respect_expand_state: false,
                visible: visible.as_ref(),
            },
        )
    }

    pub fn breadcrumbs(&self) -> Vec<Breadcrumb<T::Id>> {
        self.state.lock().navigator.trail().to_vec()
    }

    pub fn current_parent(&self) -> Option<Breadcrumb<T::Id>> {
        self.state.lock().navigator.current().cloned()
    }

    pub fn filter(&self) -> FilterState {
        self.state.lock().filter.clone()
    }

    pub fn cursor(&self) -> RootCursor {
        self.state.lock().loader.cursor()
    }

    pub fn context(&self) -> Option<String> {
        self.state.lock().cache.context().map(str::to_string)
    }

    pub fn node_status(&self, id: T::Id) -> Option<NodeStatus> {
        self.state.lock().arena.get(id).map(|node| node.status())
    }

    pub fn stats(&self) -> HierarchyStats {
        let state = self.state.lock();
        let rows = self.rows();
        let cursor = state.loader.cursor();
        HierarchyStats {
            revision: rows.revision(),
            loaded_nodes: state.arena.len(),
            expanded_nodes: state.arena.nodes().filter(|node| node.is_expanded()).count(),
            loading_nodes: state
                .arena
                .nodes()
                .filter(|node| node.is_loading_children())
                .count(),
            visible_rows: rows.len(),
            sentinel_rows: rows.sentinel_count(),
            root_loaded: state.arena.roots().len(),
            root_total: state.arena.root_total(),
            current_page: cursor.current_page,
            total_pages: cursor.total_pages,
            cached_expand_flags: state.cache.len(),
            rehydration_failures: state.rehydration_failures,
        }
    }

    // ------------------------------------------------------------------
    // Expand / collapse / paging
    // ------------------------------------------------------------------

    /// Expands a node, fetching its first child page if needed.
    pub async fn expand(&self, id: T::Id) -> Result<CommandOutcome> {
        let (generation, request) = {
            let mut state = self.state.lock();
            let node = state.arena.node(id)?;
            if node.status() != NodeStatus::Collapsed {
                return Ok(CommandOutcome::Unchanged);
            }
            if node.children_loaded() || node.total_child_count() == 0 {
                state.arena.node_mut(id)?.set_expanded(true);
                state.cache.remember(id, true);
                state.touched.insert(id);
                self.publish_locked(&mut state);
                log::debug!("hierarchy expand from memory id={:?}", id);
                return Ok(CommandOutcome::Applied);
            }

            let request = PageRequest::new(Some(id), 1, self.config.child_page_size)?;
            let generation = self.generations.next_generation();
            state.arena.node_mut(id)?.begin_expand_fetch(generation);
            state.touched.insert(id);
            self.publish_locked(&mut state);
            (generation, request)
        };

        let result = self.provider.fetch(request).await;

        let mut state = self.state.lock();
        if !Self::is_current_node_fetch(&state.arena, id, generation) {
            log::debug!(
                "hierarchy discarded stale expand id={:?} generation={}",
                id,
                generation
            );
            return Ok(CommandOutcome::Stale);
        }
        match result {
            Ok(page) => {
                // A reload may have restored the children meanwhile.
                if !state.arena.node(id)?.children_loaded() {
                    state.arena.append_children(
                        id,
                        page.items,
                        page.total_count,
                        request.page_size(),
                    )?;
                }
                state.arena.node_mut(id)?.set_expanded(true);
                state.cache.remember(id, true);
                state.touched.insert(id);
                self.publish_locked(&mut state);
                Ok(CommandOutcome::Applied)
            }
            Err(error) => {
                state.arena.node_mut(id)?.fail_fetch();
                state.touched.insert(id);
                self.publish_locked(&mut state);
                log::warn!("hierarchy expand failed id={:?} error={}", id, error);
                Err(error.into())
            }
        }
    }

    /// Hides a node's children; they stay loaded for the next expand.
    pub fn collapse(&self, id: T::Id) -> Result<CommandOutcome> {
        let mut state = self.state.lock();
        let status = state.arena.node(id)?.status();
        match status {
            NodeStatus::Collapsed => {
                state.cache.remember(id, false);
                Ok(CommandOutcome::Unchanged)
            }
            NodeStatus::Loading => {
                let superseding = self.generations.next_generation();
                state.arena.node_mut(id)?.cancel_fetch(superseding);
                state.cache.remember(id, false);
                state.touched.insert(id);
                self.publish_locked(&mut state);
                log::debug!("hierarchy collapse cancelled pending expand id={:?}", id);
                Ok(CommandOutcome::Applied)
            }
            NodeStatus::Expanded => {
                state.arena.node_mut(id)?.set_expanded(false);
                state.cache.remember(id, false);
                state.touched.insert(id);
                self.publish_locked(&mut state);
                Ok(CommandOutcome::Applied)
            }
        }
    }

    pub async fn toggle(&self, id: T::Id) -> Result<CommandOutcome> {
        let status = self
            .node_status(id)
            .ok_or_else(|| HierarchyError::unknown_node(id))?;
        match status {
            NodeStatus::Collapsed => self.expand(id).await,
            NodeStatus::Loading | NodeStatus::Expanded => self.collapse(id),
        }
    }

    /// Collapses every node and forgets which ones were open.
    pub fn collapse_all(&self) -> CommandOutcome {
        let mut state = self.state.lock();
        let mut changed = Vec::new();
        for node in state.arena.nodes_mut() {
            match node.status() {
                NodeStatus::Collapsed => {}
                NodeStatus::Loading => {
                    node.cancel_fetch(self.generations.next_generation());
                    changed.push(node.id());
                }
                NodeStatus::Expanded => {
                    node.set_expanded(false);
                    changed.push(node.id());
                }
            }
        }
        state.cache.clear();
        if changed.is_empty() {
            return CommandOutcome::Unchanged;
        }
        state.touched.extend(changed);
        self.publish_locked(&mut state);
        CommandOutcome::Applied
    }

    /// Loads the next page under `parent`, or the next root page for `None`.
    pub async fn load_more(&self, parent: Option<T::Id>) -> Result<CommandOutcome> {
        match parent {
            Some(id) => self.load_more_children(id).await,
            None => self.load_more_roots().await,
        }
    }

    async fn load_more_children(&self, id: T::Id) -> Result<CommandOutcome> {
        let (generation, request) = {
            let mut state = self.state.lock();
            let node = state.arena.node(id)?;
            if !node.is_expanded() {
                return Err(HierarchyError::InvalidState(format!(
                    "load more requires expanded node {id:?}"
                )));
            }
            if !node.has_more_children() {
                return Err(HierarchyError::InvalidState(format!(
                    "node {id:?} has no more children to load"
                )));
            }
            if node.is_loading_children() {
                return Ok(CommandOutcome::Unchanged);
            }
            let page_size = match node.page_size() {
                0 => self.config.child_page_size,
                size => size,
            };
            let request = PageRequest::new(Some(id), node.loaded_pages() + 1, page_size)?;
            let generation = self.generations.next_generation();
            state.arena.node_mut(id)?.begin_load_more(generation);
            state.touched.insert(id);
            self.publish_locked(&mut state);
            (generation, request)
        };

        let result = self.provider.fetch(request).await;

        let mut state = self.state.lock();
        if !Self::is_current_node_fetch(&state.arena, id, generation) {
            log::debug!(
                "hierarchy discarded stale page id={:?} page={} generation={}",
                id,
                request.page(),
                generation
            );
            return Ok(CommandOutcome::Stale);
        }
        match result {
            Ok(page) => {
                let summary = state.arena.append_children(
                    id,
                    page.items,
                    page.total_count,
                    request.page_size(),
                )?;
                state.touched.insert(id);
                self.publish_locked(&mut state);
                log::debug!(
                    "hierarchy loaded child page id={:?} page={} inserted={}",
                    id,
                    request.page(),
                    summary.inserted
                );
                Ok(CommandOutcome::Applied)
            }
            Err(error) => {
                state.arena.node_mut(id)?.fail_fetch();
                state.touched.insert(id);
                self.publish_locked(&mut state);
                log::warn!(
                    "hierarchy load more failed id={:?} page={} error={}",
                    id,
                    request.page(),
                    error
                );
                Err(error.into())
            }
        }
    }

    async fn load_more_roots(&self) -> Result<CommandOutcome> {
        let plan = {
            let mut state = self.state.lock();
            let mut loader = state.loader.clone();
            if !state.arena.has_more_roots() || !loader.advance() {
                return Err(HierarchyError::InvalidState(
                    "root collection has no more pages".to_string(),
                ));
            }
            let navigator = state.navigator.clone();
            self.plan_reload(&mut state, loader, navigator, None)
        };
        self.run_reload(plan).await
    }

    // ------------------------------------------------------------------
    // Filtering
    // ------------------------------------------------------------------

    pub fn set_filter(&self, filter: FilterState) -> CommandOutcome {
        let mut state = self.state.lock();
        if state.filter == filter {
            return CommandOutcome::Unchanged;
        }
        state.filter = filter;
        self.publish_locked(&mut state);
        CommandOutcome::Applied
    }

    // ------------------------------------------------------------------
    // Reloads and navigation
    // ------------------------------------------------------------------

    /// Cumulatively reloads the root collection and rehydrates open nodes.
    pub async fn refresh(&self) -> Result<CommandOutcome> {
        let plan = {
            let mut state = self.state.lock();
            let loader = state.loader.clone();
            let navigator = state.navigator.clone();
            self.plan_reload(&mut state, loader, navigator, None)
        };
        self.run_reload(plan).await
    }

    /// Sets the root cursor and reloads pages `1..=page`.
    pub async fn reload_through_page(&self, page: u32) -> Result<CommandOutcome> {
        let plan = {
            let mut state = self.state.lock();
            let mut loader = state.loader.clone();
            loader.set_current_page(page)?;
            let navigator = state.navigator.clone();
            self.plan_reload(&mut state, loader, navigator, None)
        };
        self.run_reload(plan).await
    }

    /// Drills into `id`, making its children the root collection.
    pub async fn descend(&self, id: T::Id) -> Result<CommandOutcome> {
        let plan = {
            let mut state = self.state.lock();
            let label = state.arena.node(id)?.payload().display_name().to_string();
            let mut navigator = state.navigator.clone();
            if !navigator.descend(Breadcrumb::new(id, label)) {
                return Ok(CommandOutcome::Unchanged);
            }
            let mut loader = state.loader.clone();
            loader.reset(Some(id));
            self.plan_reload(&mut state, loader, navigator, None)
        };
        self.run_reload(plan).await
    }

    pub async fn ascend(&self) -> Result<CommandOutcome> {
        let plan = {
            let mut state = self.state.lock();
            let mut navigator = state.navigator.clone();
            if !navigator.ascend() {
                return Ok(CommandOutcome::Unchanged);
            }
            let mut loader = state.loader.clone();
            loader.reset(navigator.current_id());
            self.plan_reload(&mut state, loader, navigator, None)
        };
        self.run_reload(plan).await
    }

    /// Makes a breadcrumb (or the current parent) current and reloads it.
    pub async fn jump_to_breadcrumb(&self, id: T::Id) -> Result<CommandOutcome> {
        let plan = {
            let mut state = self.state.lock();
            let mut navigator = state.navigator.clone();
            navigator.jump_to(id)?;
            let mut loader = state.loader.clone();
            loader.reset(Some(id));
            self.plan_reload(&mut state, loader, navigator, None)
        };
        self.run_reload(plan).await
    }

    pub async fn jump_to_top(&self) -> Result<CommandOutcome> {
        let plan = {
            let mut state = self.state.lock();
            let mut navigator = state.navigator.clone();
            if !navigator.jump_to_top() {
                return Ok(CommandOutcome::Unchanged);
            }
            let mut loader = state.loader.clone();
            loader.reset(None);
            self.plan_reload(&mut state, loader, navigator, None)
        };
        self.run_reload(plan).await
    }

    /// Switches to another browsing context (e.g. a different project).
    ///
    /// The expand cache and breadcrumb trail start empty and the root
    /// collection is reloaded under `scope`.
    pub async fn switch_context(
        &self,
        context: impl Into<String>,
        scope: Option<T::Id>,
    ) -> Result<CommandOutcome> {
        let context = context.into();
        let plan = {
            let mut state = self.state.lock();
            let mut loader = state.loader.clone();
            loader.reset(scope);
            self.plan_reload(&mut state, loader, Navigator::new(), Some(context))
        };
        self.run_reload(plan).await
    }

    fn plan_reload(
        &self,
        state: &mut ControllerState<T>,
        loader: CumulativeRootLoader<T::Id>,
        navigator: Navigator<T::Id>,
        context: Option<String>,
    ) -> ReloadPlan<T> {
        let generation = self.generations.next_generation();
        state.root_fetch.issue(generation);
        state.touched.clear();
        let child_pages = match context {
            Some(_) => FnvHashMap::default(),
            None => state
                .arena
                .nodes()
                .filter(|node| node.loaded_pages() > 0)
                .map(|node| (node.id(), (node.loaded_pages(), node.page_size())))
                .collect(),
        };
        ReloadPlan {
            generation,
            loader,
            navigator,
            context,
            child_pages,
        }
    }

    async fn run_reload(&self, plan: ReloadPlan<T>) -> Result<CommandOutcome> {
        let load = match plan.loader.load(self.provider.as_ref()).await {
            Ok(load) => load,
            Err(error) => {
                log::warn!(
                    "hierarchy reload failed scope={:?} page={} error={}",
                    plan.loader.scope(),
                    plan.loader.current_page(),
                    error
                );
                return Err(error);
            }
        };

        let cache = match plan.context {
            Some(_) => ExpandStateCache::new(),
            None => self.state.lock().cache.clone(),
        };
        let pages_fetched = load.pages_fetched;
        let mut arena =
            NodeArena::from_roots(load.items, plan.loader.scope(), load.cursor.total_count);
        arena.set_has_more_roots(load.cursor.has_more());
        let rehydration_failures = self.rehydrate(&mut arena, &cache, &plan.child_pages).await;

        let mut state = self.state.lock();
        if !state.root_fetch.is_current(plan.generation) {
            log::debug!(
                "hierarchy discarded stale reload scope={:?} generation={}",
                plan.loader.scope(),
                plan.generation
            );
            return Ok(CommandOutcome::Stale);
        }

        let carried = match plan.context {
            Some(context) => {
                state.cache.switch_context(Some(context));
                0
            }
            None => Self::carry_over(&mut arena, &state.arena, &state.touched),
        };
        state.touched.clear();
        let mut loader = plan.loader;
        loader.commit(load.cursor);
        state.loader = loader;
        state.navigator = plan.navigator;
        state.arena = arena;
        state.rehydration_failures = rehydration_failures;
        self.publish_locked(&mut state);

        log::info!(
            "hierarchy reload scope={:?} pages_fetched={} roots={} nodes={} current_page={} total_pages={} rehydration_failures={} carried={}",
            state.loader.scope(),
            pages_fetched,
            state.arena.roots().len(),
            state.arena.len(),
            load.cursor.current_page,
            load.cursor.total_pages,
            rehydration_failures,
            carried
        );
        Ok(CommandOutcome::Applied)
    }

    /// Eagerly restores cached-open nodes in a freshly loaded arena.
    ///
    /// Nodes are visited breadth first. Each open node gets back as many
    /// child pages as `child_pages` records for it (one page otherwise),
    /// fetched cumulatively. A failed fetch leaves the node collapsed (its
    /// cache flag is kept for the next reload). Returns the number of failed
    /// fetches.
    async fn rehydrate(
        &self,
        arena: &mut NodeArena<T>,
        cache: &ExpandStateCache<T::Id>,
        child_pages: &FnvHashMap<T::Id, (u32, u32)>,
    ) -> usize {
        let mut failures = 0;
        let mut queue: VecDeque<T::Id> = arena.roots().iter().copied().collect();

        while let Some(id) = queue.pop_front() {
            let Some(node) = arena.get(id) else {
                continue;
            };
            if !cache.is_expanded(id) {
                continue;
            }
            if node.hierarchy_level() >= self.config.max_rehydrate_depth {
                log::debug!("hierarchy rehydrate depth limit reached id={:?}", id);
                continue;
            }
            if node.total_child_count() == 0 {
                if let Some(node) = arena.get_mut(id) {
                    node.set_expanded(true);
                }
                continue;
            }

            let (pages, page_size) = match child_pages.get(&id) {
                Some(&(pages, page_size)) if page_size > 0 => (pages.max(1), page_size),
                _ => (1, self.config.child_page_size),
            };
            let load = match self.load_child_pages(id, pages, page_size).await {
                Ok(load) => load,
                Err(error) => {
                    failures += 1;
                    log::warn!("hierarchy rehydrate failed id={:?} error={}", id, error);
                    continue;
                }
            };
            let restored = arena.restore_children(
                id,
                load.items,
                load.cursor.total_count,
                page_size,
                load.cursor.current_page,
            );
            if let Err(error) = restored {
                failures += 1;
                log::warn!("hierarchy rehydrate failed id={:?} error={}", id, error);
                continue;
            }
            if let Some(node) = arena.get_mut(id) {
                node.set_expanded(true);
                queue.extend(node.children().iter().copied());
            }
        }
        failures
    }

    /// Fetches child pages `1..=pages` of `id` in ascending order.
    async fn load_child_pages(
        &self,
        id: T::Id,
        pages: u32,
        page_size: u32,
    ) -> Result<RootLoad<T>> {
        let mut loader = CumulativeRootLoader::new(Some(id), page_size)?;
        loader.set_current_page(pages)?;
        loader.load(self.provider.as_ref()).await
    }

    /// Moves node state changed during a reload into the reloaded arena.
    ///
    /// Covers nodes touched by commands since the reload was planned and
    /// nodes with a fetch still pending. Children loaded in `previous` but
    /// missing from `arena` are grafted over. Returns the number of nodes
    /// carried.
    fn carry_over(
        arena: &mut NodeArena<T>,
        previous: &NodeArena<T>,
        touched: &FnvHashSet<T::Id>,
    ) -> usize {
        let mut pending: Vec<(usize, T::Id)> = previous
            .nodes()
            .filter(|node| touched.contains(&node.id()) || node.is_loading_children())
            .map(|node| (node.hierarchy_level(), node.id()))
            .collect();
        pending.sort();

        let mut carried = 0;
        for (_, id) in pending {
            let (Some(old), Some(node)) = (previous.get(id), arena.get(id)) else {
                continue;
            };
            if old.loaded_pages() > node.loaded_pages() {
                if let Err(error) = arena.graft_children(id, previous) {
                    log::warn!("hierarchy carry over failed id={:?} error={}", id, error);
                    continue;
                }
            }
            if let Some(node) = arena.get_mut(id) {
                node.adopt_state(old);
                carried += 1;
            }
        }
        if carried > 0 {
            log::debug!("hierarchy carried node state into reload nodes={}", carried);
        }
        carried
    }

    fn is_current_node_fetch(arena: &NodeArena<T>, id: T::Id, generation: Generation) -> bool {
        arena
            .get(id)
            .is_some_and(|node| node.is_current_fetch(generation))
    }

    /// Rebuilds the rows from `state` and publishes them.
    fn publish_locked(&self, state: &mut ControllerState<T>) {
        let visible = self.filter_engine.visible_set(&state.filter, &state.arena);
        let rows = flatten(
            &state.arena,
            FlattenOptions {
                respect_expand_state: true,
                visible: visible.as_ref(),
            },
        );
        state.revision += 1;
        self.publisher
            .send_replace(Arc::new(RenderList::new(state.revision, rows)));
    }
}
