//! EntityMap - clickable entity markers on an interactive map
//!
//! This library renders an ordered sequence of geographically-located entities
//! onto a map surface: one clickable marker per entity and one connector line
//! between each pair of consecutive entities. Callers toggle which entities are
//! visible by supplying a boolean visibility vector; the library diffs it
//! against what the surface currently shows and issues only the add/remove
//! calls that are needed.
//!
//! # Architecture
//!
//! ```text
//! caller ──update(&[bool])──► VisibilityController ──add/remove──► MapSurface
//!                                   │
//!                              Registry (markers, connectors)
//!                                   │
//! caller ◄──notify(&entity)── HandlerTable ◄──click(HandlerId)── host events
//! ```
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use entitymap::{Entity, EntityMap, LatLon, RecordingSurface, Rgba};
//!
//! let surface = Arc::new(RecordingSurface::new());
//! let entities = vec![
//!     Entity::new("A", LatLon::new(53.55, 9.99)),
//!     Entity::new("B", LatLon::new(52.52, 13.40)),
//!     Entity::new("C", LatLon::new(48.14, 11.58)),
//! ];
//!
//! let map = EntityMap::new(surface.clone(), |e: &Entity| println!("{}", e.id), Rgba::BLUE, entities);
//! let summary = map.update(&[true, false, true]);
//! assert_eq!(summary.markers_added, 2);
//! assert_eq!(summary.removed(), 0);
//! ```

pub mod config;
pub mod coord;
pub mod entity;
pub mod entity_map;
pub mod handlers;
pub mod logging;
pub mod registry;
pub mod style;
pub mod surface;
pub mod visibility;

pub use config::{ConfigError, ConfigFile, ConfigKey, LoggingConfig, MapConfig};
pub use coord::{CoordError, GeoBounds, LatLon};
pub use entity::{load_entities, parse_entities, Entity, EntityLoadError, Located};
pub use entity_map::EntityMap;
pub use handlers::{HandlerId, HandlerTable};
pub use logging::{init_logging, LoggingError, LoggingGuard};
pub use registry::{ConnectorDescriptor, MarkerDescriptor, Registry};
pub use style::{ColorError, Rgba};
pub use surface::{MapSurface, RecordingSurface, Renderable, RenderableKey, SurfaceOp};
pub use visibility::{plan_transitions, Transition, UpdateSummary, VisibilityController};
