//! Integration tests for the entity map component.
//!
//! These tests drive the public API the way a host application would:
//! - A custom map surface that keeps rendered geometry
//! - A caller-defined entity type
//! - Click delivery through a channel while visibility changes
//!
//! Run with: `cargo test --test entity_map_integration`

use std::collections::HashMap;
use std::sync::mpsc;
use std::sync::Arc;
use std::thread;

use parking_lot::Mutex;

use entitymap::{
    EntityMap, HandlerId, LatLon, Located, MapSurface, Renderable, RenderableKey, Rgba,
};

// ============================================================================
// Helpers
// ============================================================================

/// A bus stop on a route.
#[derive(Debug, Clone, PartialEq)]
struct Stop {
    name: &'static str,
    position: LatLon,
}

impl Located for Stop {
    fn coord(&self) -> LatLon {
        self.position
    }
}

/// What a drawn item looks like on the surface.
#[derive(Debug, Clone, PartialEq)]
enum Drawn {
    Point(LatLon),
    Line { from: LatLon, to: LatLon, color: String },
}

/// Surface that keeps the geometry of everything on it.
#[derive(Default)]
struct GeometrySurface {
    items: Mutex<HashMap<RenderableKey, Drawn>>,
    removals: Mutex<usize>,
}

impl MapSurface for GeometrySurface {
    fn add(&self, renderable: Renderable<'_>) {
        let drawn = match renderable {
            Renderable::Marker(m) => Drawn::Point(m.coord),
            Renderable::Connector(c) => Drawn::Line {
                from: c.from,
                to: c.to,
                color: c.color.to_html(),
            },
        };
        self.items.lock().insert(renderable.key(), drawn);
    }

    fn remove(&self, renderable: Renderable<'_>) {
        self.items.lock().remove(&renderable.key());
        *self.removals.lock() += 1;
    }
}

/// A short route through Hamburg.
const ROUTE: &[(&str, f64, f64)] = &[
    ("Hauptbahnhof", 53.5530, 10.0069),
    ("Jungfernstieg", 53.5526, 9.9930),
    ("Stadthausbrücke", 53.5495, 9.9837),
    ("Landungsbrücken", 53.5461, 9.9706),
];

fn stops() -> Vec<Stop> {
    ROUTE
        .iter()
        .map(|&(name, lat, lon)| Stop {
            name,
            position: LatLon::new(lat, lon),
        })
        .collect()
}

fn build(
    surface: Arc<GeometrySurface>,
) -> (EntityMap<Stop>, mpsc::Receiver<&'static str>) {
    let (tx, rx) = mpsc::channel();
    let tx = Mutex::new(tx);
    let map = EntityMap::new(
        surface,
        move |stop: &Stop| {
            let _ = tx.lock().send(stop.name);
        },
        Rgba::rgb(0xe2, 0x00, 0x1a),
        stops(),
    );
    (map, rx)
}

// ============================================================================
// Integration Tests
// ============================================================================

#[test]
fn test_surface_receives_entity_geometry() {
    let surface = Arc::new(GeometrySurface::default());
    let (map, _rx) = build(surface.clone());

    assert!(surface.items.lock().is_empty(), "construction must not draw");

    map.show_all();

    let items = surface.items.lock();
    assert_eq!(items.len(), 4 + 3);
    assert_eq!(
        items.get(&RenderableKey::Marker(0)),
        Some(&Drawn::Point(LatLon::new(53.5530, 10.0069)))
    );
    assert_eq!(
        items.get(&RenderableKey::Connector(2)),
        Some(&Drawn::Line {
            from: LatLon::new(53.5495, 9.9837),
            to: LatLon::new(53.5461, 9.9706),
            color: "#e2001a".to_string(),
        })
    );
}

#[test]
fn test_first_update_with_hidden_entities_removes_nothing() {
    let surface = Arc::new(GeometrySurface::default());
    let (map, _rx) = build(surface.clone());

    map.update(&[false, true, false, false]);

    assert_eq!(*surface.removals.lock(), 0);
    let items = surface.items.lock();
    assert!(items.contains_key(&RenderableKey::Marker(1)));
    assert!(items.contains_key(&RenderableKey::Connector(0)));
    assert_eq!(items.len(), 2);
}

#[test]
fn test_connector_follows_trailing_marker_only() {
    let surface = Arc::new(GeometrySurface::default());
    let (map, _rx) = build(surface.clone());

    map.update(&[false, false, true, false]);
    // connector[1] joins stops 1 and 2; stop 1 is hidden yet the line is drawn
    assert!(surface.items.lock().contains_key(&RenderableKey::Connector(1)));

    map.update(&[false, true, true, false]);
    // showing stop 1 adds connector[0], connector[1] is untouched
    let items = surface.items.lock();
    assert!(items.contains_key(&RenderableKey::Connector(0)));
    assert!(items.contains_key(&RenderableKey::Connector(1)));
}

#[test]
fn test_clicks_resolve_to_original_stop() {
    let surface = Arc::new(GeometrySurface::default());
    let (map, rx) = build(surface);

    map.update(&[true, true, false, true]);
    assert!(map.click(HandlerId(3)));
    map.update(&[false, false, true, true]);
    assert!(map.click(HandlerId(3)));
    assert!(map.click_marker(2));

    let received: Vec<_> = rx.try_iter().collect();
    assert_eq!(
        received,
        vec!["Landungsbrücken", "Landungsbrücken", "Stadthausbrücke"]
    );
}

#[test]
fn test_clicks_from_other_threads_during_updates() {
    let surface = Arc::new(GeometrySurface::default());
    let (map, rx) = build(surface);
    let map = Arc::new(map);

    let clicker = {
        let map = Arc::clone(&map);
        thread::spawn(move || {
            for _ in 0..100 {
                map.click_marker(0);
            }
        })
    };
    for round in 0..100 {
        map.update(&[round % 2 == 0, true, round % 3 == 0, false]);
    }
    clicker.join().expect("clicker thread should not panic");

    let received: Vec<_> = rx.try_iter().collect();
    assert_eq!(received.len(), 100);
    assert!(received.iter().all(|&name| name == "Hauptbahnhof"));
}

#[test]
fn test_release_leaves_surface_and_silences_clicks() {
    let surface = Arc::new(GeometrySurface::default());
    let (map, rx) = build(surface.clone());
    map.show_all();

    assert_eq!(map.release(), 4);
    assert_eq!(map.release(), 0);

    assert_eq!(surface.items.lock().len(), 7);
    assert!(!map.click_marker(1));
    assert!(rx.try_recv().is_err());
}

#[test]
fn test_empty_route() {
    let surface = Arc::new(GeometrySurface::default());
    let map: EntityMap<Stop> = EntityMap::new(surface, |_: &Stop| {}, Rgba::BLUE, Vec::<Stop>::new());

    assert!(map.is_empty());
    assert!(map.bounds().is_none());
    assert!(map.update(&[]).is_noop());
    assert_eq!(map.release(), 0);
}

#[test]
fn test_mismatched_length_panics_for_any_size() {
    for n in 1..6 {
        let surface = Arc::new(GeometrySurface::default());
        let entities: Vec<Stop> = stops().into_iter().cycle().take(n).collect();
        let map = EntityMap::new(surface, |_: &Stop| {}, Rgba::BLUE, entities);

        for len in [0, n - 1, n + 1] {
            let vector = vec![true; len];
            let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
                map.update(&vector);
            }));
            assert!(result.is_err(), "n={} len={} should panic", n, len);
        }
    }
}
