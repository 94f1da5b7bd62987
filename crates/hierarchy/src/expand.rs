//! Expand-state cache surviving reloads within one browsing context.

use fnv::FnvHashMap;

use crate::entity::NodeId;

/// Remembers which nodes the user had open.
///
/// The cache belongs to exactly one browsing context (for example one
/// project's task list). Switching to a different context clears it.
#[derive(Debug, Clone)]
pub struct ExpandStateCache<Id> {
    context: Option<String>,
    entries: FnvHashMap<Id, bool>,
}

impl<Id: NodeId> Default for ExpandStateCache<Id> {
    fn default() -> Self {
        Self::new()
    }
}

impl<Id: NodeId> ExpandStateCache<Id> {
    pub fn new() -> Self {
        Self {
            context: None,
            entries: FnvHashMap::default(),
        }
    }

    pub fn context(&self) -> Option<&str> {
        self.context.as_deref()
    }

    /// Moves the cache to `context`, clearing it when the context changes.
    ///
    /// Returns true if the cache was reset.
    pub fn switch_context(&mut self, context: Option<String>) -> bool {
        if self.context == context {
            return false;
        }
        log::debug!(
            "expand cache context switch from={:?} to={:?} dropped={}",
            self.context,
            context,
            self.entries.len()
        );
        self.context = context;
        self.entries.clear();
        true
    }

    pub fn remember(&mut self, id: Id, expanded: bool) {
        self.entries.insert(id, expanded);
    }

    /// Returns the cached flag; unknown nodes count as collapsed.
    pub fn is_expanded(&self, id: Id) -> bool {
        self.entries.get(&id).copied().unwrap_or(false)
    }

    pub fn get(&self, id: Id) -> Option<bool> {
        self.entries.get(&id).copied()
    }

    pub fn expanded_ids(&self) -> impl Iterator<Item = Id> + '_ {
        self.entries
            .iter()
            .filter(|(_, expanded)| **expanded)
            .map(|(id, _)| *id)
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn remembers_flags_per_node() {
        let mut cache = ExpandStateCache::new();
        cache.remember(1_i64, true);
        cache.remember(2, false);

        assert!(cache.is_expanded(1));
        assert!(!cache.is_expanded(2));
        assert!(!cache.is_expanded(3));
        assert_eq!(cache.get(2), Some(false));
        assert_eq!(cache.expanded_ids().collect::<Vec<_>>(), vec![1]);
    }

    #[test]
    fn switching_context_clears_entries() {
        let mut cache = ExpandStateCache::new();
        cache.switch_context(Some("project-1".to_string()));
        cache.remember(1_i64, true);

        assert!(!cache.switch_context(Some("project-1".to_string())));
        assert!(cache.is_expanded(1));

        assert!(cache.switch_context(Some("project-2".to_string())));
        assert!(cache.is_empty());
        assert_eq!(cache.context(), Some("project-2"));
    }
}
