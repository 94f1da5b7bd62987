//! Keyword and attribute filtering over the loaded node set.
//!
//! Filters run before flattening. The result is a visibility set holding
//! every matching node plus its full ancestor chain, so a match deep in the
//! tree is never orphaned from its parents.

use fnv::FnvHashSet;
use serde::{Deserialize, Serialize};

use crate::entity::{Attribute, Entity};
use crate::tree::NodeArena;

const ALL: &str = "ALL";

/// Equality filter value; `All` disables the filter.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Selection {
    #[default]
    All,
    Only(String),
}

impl Selection {
    /// Parses a UI value; `"ALL"` (any case) and blank strings mean no filter.
    pub fn parse(value: &str) -> Self {
        let trimmed = value.trim();
        if trimmed.is_empty() || trimmed.eq_ignore_ascii_case(ALL) {
            Self::All
        } else {
            Self::Only(trimmed.to_string())
        }
    }

    pub fn is_all(&self) -> bool {
        matches!(self, Self::All)
    }

    pub fn matches(&self, candidate: Option<&str>) -> bool {
        match self {
            Self::All => true,
            Self::Only(expected) => {
                candidate.is_some_and(|value| value.eq_ignore_ascii_case(expected))
            }
        }
    }
}

/// Filter inputs as set by the host UI.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FilterState {
    pub keyword: String,
    pub status: Selection,
    pub entity_type: Selection,
    pub priority: Selection,
}

impl FilterState {
    pub fn keyword(keyword: impl Into<String>) -> Self {
        Self {
            keyword: keyword.into(),
            ..Self::default()
        }
    }

    pub fn with_status(mut self, status: Selection) -> Self {
        self.status = status;
        self
    }

    pub fn with_type(mut self, entity_type: Selection) -> Self {
        self.entity_type = entity_type;
        self
    }

    pub fn with_priority(mut self, priority: Selection) -> Self {
        self.priority = priority;
        self
    }

    pub fn is_active(&self) -> bool {
        !self.keyword.trim().is_empty()
            || !self.status.is_all()
            || !self.entity_type.is_all()
            || !self.priority.is_all()
    }
}

/// Predicate set compiled from a [`FilterState`].
#[derive(Debug, Clone)]
struct CompiledFilter {
    keyword: Option<String>,
    equality: Vec<(Attribute, Selection)>,
}

impl CompiledFilter {
    fn compile(state: &FilterState) -> Self {
        let keyword = state.keyword.trim();
        let keyword = (!keyword.is_empty()).then(|| keyword.to_lowercase());

        let equality = [
            (Attribute::Status, &state.status),
            (Attribute::Type, &state.entity_type),
            (Attribute::Priority, &state.priority),
        ]
        .into_iter()
        .filter(|(_, selection)| !selection.is_all())
        .map(|(attribute, selection)| (attribute, selection.clone()))
        .collect();

        Self { keyword, equality }
    }

    fn matches<T: Entity>(&self, entity: &T, search_fields: &[String]) -> bool {
        let attributes_match = self
            .equality
            .iter()
            .all(|(attribute, selection)| selection.matches(entity.attribute(*attribute)));
        if !attributes_match {
            return false;
        }

        match self.keyword.as_deref() {
            None => true,
            Some(keyword) => search_fields.iter().any(|field| {
                entity
                    .text_field(field)
                    .is_some_and(|text| text.to_lowercase().contains(keyword))
            }),
        }
    }
}

/// Applies [`FilterState`] to entities using a configured set of text fields.
#[derive(Debug, Clone)]
pub struct FilterEngine {
    search_fields: Vec<String>,
}

impl FilterEngine {
    pub fn new<I, S>(search_fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            search_fields: search_fields.into_iter().map(Into::into).collect(),
        }
    }

    pub fn search_fields(&self) -> &[String] {
        &self.search_fields
    }

    pub fn matches<T: Entity>(&self, state: &FilterState, entity: &T) -> bool {
        CompiledFilter::compile(state).matches(entity, &self.search_fields)
    }

    /// Computes the visible node set, or `None` when no filter is active.
    pub fn visible_set<T: Entity>(
        &self,
        state: &FilterState,
        arena: &NodeArena<T>,
    ) -> Option<FnvHashSet<T::Id>> {
        if !state.is_active() {
            return None;
        }
        let compiled = CompiledFilter::compile(state);
        let mut visible = FnvHashSet::default();

        for node in arena.nodes() {
            if !compiled.matches(node.payload().as_ref(), &self.search_fields) {
                continue;
            }
            if visible.insert(node.id()) {
                visible.extend(arena.ancestors(node.id()));
            }
        }

        log::debug!(
            "hierarchy filter applied keyword={:?} matched_with_ancestors={} loaded={}",
            state.keyword,
            visible.len(),
            arena.len()
        );
        Some(visible)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::{EntityKind, EntitySummary};
    use chrono::{TimeZone, Utc};

    fn task(id: i64, parent: Option<i64>, name: &str) -> EntitySummary {
        let created = Utc.with_ymd_and_hms(2024, 2, 1, 0, 0, 0).unwrap();
        EntitySummary::new(EntityKind::Task, id, parent, name, created)
    }

    fn engine() -> FilterEngine {
        FilterEngine::new(["name", "description"])
    }

    #[test]
    fn selection_parse_treats_all_as_no_filter() {
        assert_eq!(Selection::parse("ALL"), Selection::All);
        assert_eq!(Selection::parse("all"), Selection::All);
        assert_eq!(Selection::parse("  "), Selection::All);
        assert_eq!(Selection::parse("Done"), Selection::Only("Done".to_string()));
    }

    #[test]
    fn keyword_matches_any_configured_field_case_insensitively() {
        let entity = task(1, None, "Release").with_description("Ship the INSTALLER");
        let engine = engine();

        assert!(engine.matches(&FilterState::keyword("installer"), &entity));
        assert!(engine.matches(&FilterState::keyword("rele"), &entity));
        assert!(!engine.matches(&FilterState::keyword("budget"), &entity));

        let name_only = FilterEngine::new(["name"]);
        assert!(!name_only.matches(&FilterState::keyword("installer"), &entity));
    }

    #[test]
    fn equality_filters_compose_with_keyword() {
        let entity = task(1, None, "Release")
            .with_status("Done")
            .with_priority("High");
        let engine = engine();

        let state = FilterState::keyword("release").with_status(Selection::parse("done"));
        assert!(engine.matches(&state, &entity));

        let state = state.with_priority(Selection::parse("Low"));
        assert!(!engine.matches(&state, &entity));

        let untyped = FilterState::default().with_type(Selection::parse("bug"));
        assert!(!engine.matches(&untyped, &entity));
    }

    #[test]
    fn inactive_filter_yields_no_visibility_set() {
        let arena = NodeArena::from_roots(vec![task(1, None, "a")], None, 1);
        assert!(engine().visible_set(&FilterState::default(), &arena).is_none());
    }

    #[test]
    fn grandchild_match_keeps_ancestor_chain() {
        let mut arena = NodeArena::from_roots(
            vec![task(1, None, "Website").with_child_count(1), task(2, None, "Mobile")],
            None,
            2,
        );
        arena
            .append_children(1, vec![task(10, Some(1), "Frontend").with_child_count(1)], 1, 20)
            .unwrap();
        arena
            .append_children(10, vec![task(100, Some(10), "Fix navbar")], 1, 20)
            .unwrap();

        let visible = engine()
            .visible_set(&FilterState::keyword("navbar"), &arena)
            .unwrap();
        let mut ids: Vec<i64> = visible.into_iter().collect();
        ids.sort();
        assert_eq!(ids, vec![1, 10, 100]);
    }
}
