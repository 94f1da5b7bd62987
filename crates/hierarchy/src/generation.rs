//! Fetch generations for rejecting superseded page fetches.
//!
//! Every fetch issued by the controller is stamped with a generation drawn
//! from one monotonic counter. The target (a node, or the root collection)
//! remembers the generation of its newest fetch; a result whose stamp no
//! longer matches is stale and gets discarded instead of applied.
//!
//! Because all targets draw from the same counter, a generation is never
//! reused, even after the node arena is rebuilt by a reload.

use std::sync::atomic::{AtomicU64, Ordering};

/// Generation value carried by an in-flight fetch. Zero means "none issued".
pub type Generation = u64;

/// Monotonic source of fetch generations.
#[derive(Debug, Default)]
pub struct GenerationTracker {
    latest: AtomicU64,
}

impl GenerationTracker {
    pub fn new() -> Self {
        Self {
            latest: AtomicU64::new(0),
        }
    }

    /// Issues a new generation, superseding every earlier one.
    pub fn next_generation(&self) -> Generation {
        self.latest.fetch_add(1, Ordering::SeqCst) + 1
    }

    /// Returns the most recently issued generation without advancing.
    pub fn current_generation(&self) -> Generation {
        self.latest.load(Ordering::SeqCst)
    }
}

/// Per-target record of the newest fetch generation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FetchStamp {
    generation: Generation,
}

impl FetchStamp {
    /// Records `generation` as the newest fetch for this target.
    pub fn issue(&mut self, generation: Generation) {
        self.generation = generation;
    }

    /// Returns true when `generation` is still the newest fetch.
    #[inline]
    pub fn is_current(&self, generation: Generation) -> bool {
        self.generation == generation
    }

    pub fn generation(&self) -> Generation {
        self.generation
    }
}
