//! Per-marker click handler table.
//!
//! Each marker is bound to one slot in an index-addressed table instead of
//! its own closure. Slot `i` resolves to entity `i` of the sequence the
//! table was built with, so a click always reports the entity the marker was
//! created for, whatever happened to visibility since.
//!
//! # Release
//!
//! Slots are released individually. [`HandlerTable::release_all`] flips every
//! live slot exactly once and reports how many it released; repeated calls
//! release nothing. Clicks on a released slot are dropped.

use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tracing::{debug, warn};

/// Index of a click handler slot. Slot `i` belongs to marker `i`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct HandlerId(pub usize);

impl fmt::Display for HandlerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "handler#{}", self.0)
    }
}

/// Click callback supplied by the caller.
pub type ClickNotifier<E> = Box<dyn Fn(&E) + Send + Sync>;

/// Arena of click handlers, one per entity.
pub struct HandlerTable<E> {
    entities: Arc<[E]>,
    notify: ClickNotifier<E>,
    released: Box<[AtomicBool]>,
}

impl<E> HandlerTable<E> {
    /// Create a table with one live slot per entity.
    pub fn new<F>(entities: Arc<[E]>, notify: F) -> Self
    where
        F: Fn(&E) + Send + Sync + 'static,
    {
        let released = (0..entities.len()).map(|_| AtomicBool::new(false)).collect();
        Self {
            entities,
            notify: Box::new(notify),
            released,
        }
    }

    /// Number of slots.
    pub fn len(&self) -> usize {
        self.released.len()
    }

    /// Whether the table has no slots.
    pub fn is_empty(&self) -> bool {
        self.released.is_empty()
    }

    /// Handler id for marker `index`, if it exists.
    pub fn handler_for(&self, index: usize) -> Option<HandlerId> {
        (index < self.len()).then_some(HandlerId(index))
    }

    /// Entity a slot resolves to.
    pub fn entity(&self, id: HandlerId) -> Option<&E> {
        self.entities.get(id.0)
    }

    /// Invoke the slot: notify the caller with the slot's entity.
    ///
    /// Returns `false` without notifying if the slot does not exist or has
    /// been released.
    pub fn dispatch(&self, id: HandlerId) -> bool {
        let Some(entity) = self.entities.get(id.0) else {
            warn!(handler = %id, slots = self.len(), "Click on unknown handler");
            return false;
        };

        if self.is_released(id) {
            debug!(handler = %id, "Click on released handler dropped");
            return false;
        }

        (self.notify)(entity);
        true
    }

    /// Whether a slot has been released. Unknown slots count as released.
    pub fn is_released(&self, id: HandlerId) -> bool {
        self.released
            .get(id.0)
            .map_or(true, |flag| flag.load(Ordering::Acquire))
    }

    /// Release every live slot. Returns how many were released by this call.
    pub fn release_all(&self) -> usize {
        let released = self
            .released
            .iter()
            .filter(|flag| !flag.swap(true, Ordering::AcqRel))
            .count();

        if released > 0 {
            debug!(released, "Released click handlers");
        }
        released
    }
}

impl<E> fmt::Debug for HandlerTable<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let live = self
            .released
            .iter()
            .filter(|flag| !flag.load(Ordering::Acquire))
            .count();
        f.debug_struct("HandlerTable")
            .field("slots", &self.len())
            .field("live", &live)
            .finish_non_exhaustive()
    }
}
