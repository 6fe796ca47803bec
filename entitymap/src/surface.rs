//! Map surface abstraction.
//!
//! The map surface is the external mapping library: it owns pan/zoom, tiles
//! and projection. The visibility controller depends on exactly two of its
//! operations, adding a renderable and removing one, expressed by the
//! [`MapSurface`] trait.
//!
//! # Thread Safety
//!
//! Implementations must be `Send + Sync` so an [`EntityMap`](crate::EntityMap)
//! can be shared across threads. Calls for a single update arrive serialized
//! under the controller's lock.

use std::collections::BTreeSet;
use std::fmt;

use parking_lot::Mutex;

use crate::registry::{ConnectorDescriptor, MarkerDescriptor};

/// A descriptor handed to the map surface.
#[derive(Debug, Clone, Copy)]
pub enum Renderable<'a> {
    /// A clickable point for one entity.
    Marker(&'a MarkerDescriptor),
    /// A line joining two consecutive entities.
    Connector(&'a ConnectorDescriptor),
}

impl Renderable<'_> {
    /// Identity of the renderable, independent of its geometry.
    pub fn key(&self) -> RenderableKey {
        match self {
            Renderable::Marker(marker) => RenderableKey::Marker(marker.index),
            Renderable::Connector(connector) => RenderableKey::Connector(connector.index),
        }
    }
}

/// Index-based identity of a marker or connector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum RenderableKey {
    /// Marker for entity `i`.
    Marker(usize),
    /// Connector `i`, joining entity `i` and entity `i + 1`.
    Connector(usize),
}

impl fmt::Display for RenderableKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RenderableKey::Marker(i) => write!(f, "marker[{}]", i),
            RenderableKey::Connector(i) => write!(f, "connector[{}]", i),
        }
    }
}

/// The two surface operations the controller issues.
pub trait MapSurface: Send + Sync {
    /// Put a renderable on the map.
    fn add(&self, renderable: Renderable<'_>);

    /// Take a renderable off the map. Removing an absent renderable is a no-op.
    fn remove(&self, renderable: Renderable<'_>);
}

/// A surface operation as recorded by [`RecordingSurface`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SurfaceOp {
    Add(RenderableKey),
    Remove(RenderableKey),
}

impl fmt::Display for SurfaceOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SurfaceOp::Add(key) => write!(f, "add {}", key),
            SurfaceOp::Remove(key) => write!(f, "remove {}", key),
        }
    }
}

#[derive(Debug, Default)]
struct RecordingState {
    present: BTreeSet<RenderableKey>,
    log: Vec<SurfaceOp>,
}

/// In-memory map surface that tracks membership and logs every call.
///
/// Behaves like a typical web mapping library: adding twice keeps a single
/// copy and removing an absent item does nothing, but both calls are logged.
#[derive(Debug, Default)]
pub struct RecordingSurface {
    state: Mutex<RecordingState>,
}

impl RecordingSurface {
    /// Create an empty surface.
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether the renderable is currently on the surface.
    pub fn contains(&self, key: RenderableKey) -> bool {
        self.state.lock().present.contains(&key)
    }

    /// Everything currently on the surface, markers first, in index order.
    pub fn present(&self) -> Vec<RenderableKey> {
        self.state.lock().present.iter().copied().collect()
    }

    /// Every call made so far, in order.
    pub fn log(&self) -> Vec<SurfaceOp> {
        self.state.lock().log.clone()
    }

    /// Return the calls made since the last drain and clear the log.
    ///
    /// Membership is unaffected.
    pub fn drain_log(&self) -> Vec<SurfaceOp> {
        std::mem::take(&mut self.state.lock().log)
    }
}

impl MapSurface for RecordingSurface {
    fn add(&self, renderable: Renderable<'_>) {
        let key = renderable.key();
        let mut state = self.state.lock();
        state.present.insert(key);
        state.log.push(SurfaceOp::Add(key));
    }

    fn remove(&self, renderable: Renderable<'_>) {
        let key = renderable.key();
        let mut state = self.state.lock();
        state.present.remove(&key);
        state.log.push(SurfaceOp::Remove(key));
    }
}
