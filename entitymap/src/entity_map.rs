//! The entity map component.
//!
//! `EntityMap` owns the registry, the visibility controller and the click
//! handler table for one entity sequence on one map surface.
//!
//! # Lifecycle
//!
//! 1. [`EntityMap::new`] builds descriptors and handler slots. The surface is
//!    not touched.
//! 2. [`EntityMap::update`] reconciles visibility; the first call only adds.
//! 3. The host delivers marker clicks through [`EntityMap::click`].
//! 4. [`EntityMap::release`] frees every handler slot. Surface membership is
//!    left as is.
//!
//! # Example
//!
//! ```ignore
//! let map = EntityMap::new(surface, on_click, Rgba::BLUE, entities);
//! map.update(&[true, false, true]);
//! map.click(HandlerId(2)); // notifies with entity 2
//! map.release();
//! ```

use std::fmt;
use std::sync::Arc;

use tracing::info;

use crate::config::MapConfig;
use crate::coord::GeoBounds;
use crate::entity::Located;
use crate::handlers::{HandlerId, HandlerTable};
use crate::registry::{ConnectorDescriptor, MarkerDescriptor, Registry};
use crate::style::Rgba;
use crate::surface::MapSurface;
use crate::visibility::{UpdateSummary, VisibilityController};

/// Clickable entity markers joined by connector lines on a map surface.
pub struct EntityMap<E> {
    surface: Arc<dyn MapSurface>,
    entities: Arc<[E]>,
    registry: Registry,
    controller: VisibilityController,
    handlers: HandlerTable<E>,
}

impl<E: Located> EntityMap<E> {
    /// Build the component for an ordered entity sequence.
    ///
    /// # Arguments
    ///
    /// * `surface` - Map surface markers and connectors are added to
    /// * `notify` - Called with the entity whenever one of its markers is clicked
    /// * `line_color` - Color of every connector line
    /// * `entities` - Ordered entity sequence; order defines the connectors
    pub fn new<F>(
        surface: Arc<dyn MapSurface>,
        notify: F,
        line_color: Rgba,
        entities: impl Into<Arc<[E]>>,
    ) -> Self
    where
        F: Fn(&E) + Send + Sync + 'static,
    {
        let entities: Arc<[E]> = entities.into();
        let registry = Registry::build(&entities, line_color);
        let controller = VisibilityController::new(entities.len());
        let handlers = HandlerTable::new(Arc::clone(&entities), notify);

        info!(
            entities = entities.len(),
            connectors = registry.connectors().len(),
            line_color = %line_color,
            "Entity map created"
        );

        Self {
            surface,
            entities,
            registry,
            controller,
            handlers,
        }
    }

    /// Build the component using the line color from a map configuration.
    pub fn with_config<F>(
        surface: Arc<dyn MapSurface>,
        notify: F,
        config: &MapConfig,
        entities: impl Into<Arc<[E]>>,
    ) -> Self
    where
        F: Fn(&E) + Send + Sync + 'static,
    {
        Self::new(surface, notify, config.line_color, entities)
    }
}

impl<E> EntityMap<E> {
    /// Apply a visibility vector, one element per entity.
    ///
    /// # Panics
    ///
    /// Panics if `requested.len()` differs from the number of entities.
    pub fn update(&self, requested: &[bool]) -> UpdateSummary {
        self.controller
            .update(requested, &self.registry, self.surface.as_ref())
    }

    /// Show every entity.
    pub fn show_all(&self) -> UpdateSummary {
        self.update(&vec![true; self.len()])
    }

    /// Hide every entity. Does nothing before the first update.
    pub fn hide_all(&self) -> UpdateSummary {
        self.update(&vec![false; self.len()])
    }

    /// Deliver a click on the marker bound to `handler`.
    ///
    /// Returns `true` if the caller was notified.
    pub fn click(&self, handler: HandlerId) -> bool {
        self.handlers.dispatch(handler)
    }

    /// Deliver a click on marker `index`.
    pub fn click_marker(&self, index: usize) -> bool {
        match self.registry.marker(index) {
            Some(marker) => self.click(marker.handler),
            None => false,
        }
    }

    /// Release every click handler. Returns how many were released by this
    /// call; later calls return 0. Markers and connectors stay on the surface.
    pub fn release(&self) -> usize {
        let released = self.handlers.release_all();
        if released > 0 {
            info!(released, "Entity map released");
        }
        released
    }

    /// Number of entities.
    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    pub fn entities(&self) -> &[E] {
        &self.entities
    }

    pub fn markers(&self) -> &[MarkerDescriptor] {
        self.registry.markers()
    }

    pub fn connectors(&self) -> &[ConnectorDescriptor] {
        self.registry.connectors()
    }

    /// Snapshot of what is currently shown, `None` before the first update.
    pub fn shown(&self) -> Option<Vec<bool>> {
        self.controller.shown()
    }

    /// Bounding box of every entity, `None` when empty.
    pub fn bounds(&self) -> Option<GeoBounds> {
        self.registry.bounds()
    }
}

impl<E> fmt::Debug for EntityMap<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EntityMap")
            .field("entities", &self.entities.len())
            .field("controller", &self.controller)
            .field("handlers", &self.handlers)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coord::LatLon;
    use crate::entity::Entity;
    use crate::surface::RecordingSurface;
    use crate::surface::RenderableKey::{Connector, Marker};
    use parking_lot::Mutex;

    struct Fixture {
        surface: Arc<RecordingSurface>,
        clicks: Arc<Mutex<Vec<String>>>,
        map: EntityMap<Entity>,
    }

    fn fixture(ids: &[&str]) -> Fixture {
        let surface = Arc::new(RecordingSurface::new());
        let clicks = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&clicks);
        let entities: Vec<Entity> = ids
            .iter()
            .enumerate()
            .map(|(i, id)| Entity::new(*id, LatLon::new(50.0 + i as f64, 8.0 + i as f64)))
            .collect();

        let map = EntityMap::new(
            surface.clone(),
            move |e: &Entity| sink.lock().push(e.id.clone()),
            Rgba::BLUE,
            entities,
        );

        Fixture {
            surface,
            clicks,
            map,
        }
    }

    fn assert_send_sync<T: Send + Sync>() {}

    #[test]
    fn test_entity_map_is_send_sync() {
        assert_send_sync::<EntityMap<Entity>>();
    }

    #[test]
    fn test_construction_adds_nothing() {
        let f = fixture(&["A", "B", "C"]);
        assert!(f.surface.log().is_empty());
        assert_eq!(f.map.markers().len(), 3);
        assert_eq!(f.map.connectors().len(), 2);
        assert!(f.map.shown().is_none());
    }

    #[test]
    fn test_three_entity_walkthrough() {
        let f = fixture(&["A", "B", "C"]);

        f.map.update(&[true, false, true]);
        assert_eq!(f.surface.present(), vec![Marker(0), Marker(2), Connector(1)]);

        let summary = f.map.update(&[false, false, true]);
        assert_eq!(summary.markers_removed, 1);
        assert_eq!(summary.connectors_removed, 0);
        assert_eq!(f.surface.present(), vec![Marker(2), Connector(1)]);
    }

    #[test]
    fn test_click_reports_captured_entity_across_updates() {
        let f = fixture(&["A", "B", "C"]);

        f.map.update(&[true, true, true]);
        assert!(f.map.click_marker(1));
        f.map.update(&[false, true, false]);
        assert!(f.map.click(HandlerId(1)));
        f.map.update(&[true, false, true]);
        assert!(f.map.click_marker(2));

        assert_eq!(*f.clicks.lock(), vec!["B", "B", "C"]);
    }

    #[test]
    fn test_click_unknown_marker() {
        let f = fixture(&["A"]);
        assert!(!f.map.click_marker(3));
        assert!(f.clicks.lock().is_empty());
    }

    #[test]
    fn test_release_is_idempotent_and_keeps_surface() {
        let f = fixture(&["A", "B"]);
        f.map.show_all();
        let before = f.surface.present();

        assert_eq!(f.map.release(), 2);
        assert_eq!(f.map.release(), 0);

        assert_eq!(f.surface.present(), before);
        assert!(!f.map.click_marker(0));
        assert!(f.clicks.lock().is_empty());
    }

    #[test]
    fn test_hide_all_before_first_update_is_noop() {
        let f = fixture(&["A", "B"]);
        assert!(f.map.hide_all().is_noop());
        assert_eq!(f.map.shown(), Some(vec![false, false]));
    }

    #[test]
    fn test_with_config_uses_line_color() {
        let config = MapConfig {
            line_color: Rgba::RED,
        };
        let surface = Arc::new(RecordingSurface::new());
        let map = EntityMap::with_config(
            surface,
            |_: &Entity| {},
            &config,
            vec![
                Entity::new("A", LatLon::new(0.0, 0.0)),
                Entity::new("B", LatLon::new(1.0, 1.0)),
            ],
        );
        assert_eq!(map.connectors()[0].color, Rgba::RED);
    }

    #[test]
    fn test_concurrent_updates_are_serialized() {
        let f = fixture(&["A", "B", "C", "D", "E", "F"]);
        let map = &f.map;

        std::thread::scope(|scope| {
            for t in 0..4usize {
                scope.spawn(move || {
                    for round in 0..200usize {
                        let vector: Vec<bool> = (0..6).map(|i| (i + t + round) % 3 == 0).collect();
                        map.update(&vector);
                    }
                });
            }
        });

        let shown = map.shown().unwrap();
        for (i, &visible) in shown.iter().enumerate() {
            assert_eq!(f.surface.contains(Marker(i)), visible, "marker {}", i);
        }
    }
}
