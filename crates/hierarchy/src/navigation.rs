//! Drill-down navigation with a breadcrumb trail.
//!
//! The trail holds the ancestors of the current parent, oldest first. The
//! current parent itself is tracked separately and is never the last trail
//! entry.

use crate::entity::NodeId;
use crate::error::{HierarchyError, Result};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Breadcrumb<Id> {
    pub id: Id,
    pub label: String,
}

impl<Id> Breadcrumb<Id> {
    pub fn new(id: Id, label: impl Into<String>) -> Self {
        Self {
            id,
            label: label.into(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Navigator<Id> {
    trail: Vec<Breadcrumb<Id>>,
    current: Option<Breadcrumb<Id>>,
}

impl<Id: NodeId> Default for Navigator<Id> {
    fn default() -> Self {
        Self::new()
    }
}

impl<Id: NodeId> Navigator<Id> {
    pub fn new() -> Self {
        Self {
            trail: Vec::new(),
            current: None,
        }
    }

    pub fn trail(&self) -> &[Breadcrumb<Id>] {
        &self.trail
    }

    pub fn current(&self) -> Option<&Breadcrumb<Id>> {
        self.current.as_ref()
    }

    pub fn current_id(&self) -> Option<Id> {
        self.current.as_ref().map(|crumb| crumb.id)
    }

    pub fn is_top_level(&self) -> bool {
        self.current.is_none()
    }

    /// Makes `target` the current parent, pushing the previous one.
    ///
    /// Returns false when `target` already is the current parent.
    pub fn descend(&mut self, target: Breadcrumb<Id>) -> bool {
        if self.current_id() == Some(target.id) {
            return false;
        }
        if let Some(previous) = self.current.take() {
            let already_last = self
                .trail
                .last()
                .is_some_and(|crumb| crumb.id == previous.id);
            if !already_last {
                self.trail.push(previous);
            }
        }
        self.current = Some(target);
        true
    }

    /// Moves one level up; at the first level this returns to the top.
    ///
    /// Returns false when already at the top level.
    pub fn ascend(&mut self) -> bool {
        if self.current.is_none() {
            return false;
        }
        self.current = self.trail.pop();
        true
    }

    /// Jumps to a trail entry, dropping everything after it.
    ///
    /// Returns false when `id` already is the current parent.
    pub fn jump_to(&mut self, id: Id) -> Result<bool> {
        if self.current_id() == Some(id) {
            return Ok(false);
        }
        let index = self
            .trail
            .iter()
            .position(|crumb| crumb.id == id)
            .ok_or_else(|| HierarchyError::unknown_node(id))?;
        let target = self.trail[index].clone();
        self.trail.truncate(index);
        self.current = Some(target);
        Ok(true)
    }

    /// Clears the trail and the current parent.
    pub fn jump_to_top(&mut self) -> bool {
        if self.current.is_none() && self.trail.is_empty() {
            return false;
        }
        self.trail.clear();
        self.current = None;
        true
    }
}
