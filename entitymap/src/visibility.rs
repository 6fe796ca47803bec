//! Visibility controller.
//!
//! Reconciles a requested visibility vector against what the map surface
//! currently shows, issuing add/remove calls only for entities whose
//! visibility changes.
//!
//! # State Machine
//!
//! ```text
//! Uninitialized --update(v)--> Shown(v)    adds only, never removes
//! Shown(a)      --update(b)--> Shown(b)    per-index diff of a against b
//! ```
//!
//! # Connector Coupling
//!
//! Connector `i - 1` moves in lockstep with marker `i`: it is added when
//! marker `i` is shown and removed when marker `i` is hidden, whatever the
//! state of marker `i - 1`. A connector can therefore be on the surface while
//! its leading endpoint is hidden, and vice versa.
//!
//! # Thread Safety
//!
//! Planning, surface calls, and the shown-state swap for one update all run
//! under a single mutex guard. Concurrent updates are serialized and the
//! shown state moves from one fully-applied vector to the next.

use parking_lot::Mutex;
use tracing::debug;

use crate::registry::Registry;
use crate::surface::{MapSurface, Renderable};

/// A visibility change for one entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    /// Entity went from hidden to shown: add marker, and connector `i - 1`.
    Show(usize),
    /// Entity went from shown to hidden: remove marker, and connector `i - 1`.
    Hide(usize),
}

impl Transition {
    /// Entity index the transition applies to.
    pub fn index(&self) -> usize {
        match self {
            Transition::Show(i) | Transition::Hide(i) => *i,
        }
    }
}

/// Compute the transitions that take `previous` to `requested`, in index order.
///
/// `previous` is `None` before the first update. In that case nothing is on
/// the surface yet, so only [`Transition::Show`] is produced.
///
/// # Panics
///
/// Panics if `previous` and `requested` differ in length.
pub fn plan_transitions(previous: Option<&[bool]>, requested: &[bool]) -> Vec<Transition> {
    match previous {
        None => requested
            .iter()
            .enumerate()
            .filter(|&(_, &show)| show)
            .map(|(i, _)| Transition::Show(i))
            .collect(),
        Some(previous) => {
            assert_eq!(
                previous.len(),
                requested.len(),
                "visibility vector length changed between updates"
            );
            previous
                .iter()
                .zip(requested)
                .enumerate()
                .filter_map(|(i, (&was, &now))| match (was, now) {
                    (false, true) => Some(Transition::Show(i)),
                    (true, false) => Some(Transition::Hide(i)),
                    _ => None,
                })
                .collect()
        }
    }
}

/// Counts of surface calls issued by one update.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct UpdateSummary {
    /// Whether this was the first update applied.
    pub initial: bool,
    pub markers_added: usize,
    pub markers_removed: usize,
    pub connectors_added: usize,
    pub connectors_removed: usize,
}

impl UpdateSummary {
    /// Total add calls.
    pub fn added(&self) -> usize {
        self.markers_added + self.connectors_added
    }

    /// Total remove calls.
    pub fn removed(&self) -> usize {
        self.markers_removed + self.connectors_removed
    }

    /// Whether the update touched the surface at all.
    pub fn is_noop(&self) -> bool {
        self.added() == 0 && self.removed() == 0
    }
}

/// Owner of the authoritative shown state.
#[derive(Debug)]
pub struct VisibilityController {
    len: usize,
    shown: Mutex<Option<Vec<bool>>>,
}

impl VisibilityController {
    /// Create a controller for `len` entities. Nothing is shown yet.
    pub fn new(len: usize) -> Self {
        Self {
            len,
            shown: Mutex::new(None),
        }
    }

    /// Number of entities this controller tracks.
    pub fn len(&self) -> usize {
        self.len
    }

    /// Whether the controller tracks no entities.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Snapshot of the shown state, `None` before the first update.
    pub fn shown(&self) -> Option<Vec<bool>> {
        self.shown.lock().clone()
    }

    /// Whether [`update`](Self::update) has been applied at least once.
    pub fn is_initialized(&self) -> bool {
        self.shown.lock().is_some()
    }

    /// Apply a requested visibility vector to the surface.
    ///
    /// # Panics
    ///
    /// Panics if `requested.len()` differs from the entity count. A mismatched
    /// vector is a caller bug and is never truncated or padded.
    pub fn update(
        &self,
        requested: &[bool],
        registry: &Registry,
        surface: &dyn MapSurface,
    ) -> UpdateSummary {
        assert!(
            requested.len() == self.len,
            "invalid visibility vector length: expected {}, got {}",
            self.len,
            requested.len()
        );
        debug_assert_eq!(registry.len(), self.len);

        let mut shown = self.shown.lock();
        let transitions = plan_transitions(shown.as_deref(), requested);

        let mut summary = UpdateSummary {
            initial: shown.is_none(),
            ..UpdateSummary::default()
        };

        for transition in transitions {
            let i = transition.index();
            let marker = &registry.markers()[i];
            let connector = i.checked_sub(1).and_then(|c| registry.connector(c));

            match transition {
                Transition::Show(_) => {
                    surface.add(Renderable::Marker(marker));
                    summary.markers_added += 1;
                    if let Some(connector) = connector {
                        surface.add(Renderable::Connector(connector));
                        summary.connectors_added += 1;
                    }
                }
                Transition::Hide(_) => {
                    surface.remove(Renderable::Marker(marker));
                    summary.markers_removed += 1;
                    if let Some(connector) = connector {
                        surface.remove(Renderable::Connector(connector));
                        summary.connectors_removed += 1;
                    }
                }
            }
        }

        *shown = Some(requested.to_vec());

        debug!(
            initial = summary.initial,
            added = summary.added(),
            removed = summary.removed(),
            visible = requested.iter().filter(|&&s| s).count(),
            "Applied visibility update"
        );

        summary
    }
}
