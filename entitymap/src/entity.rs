//! Entities placed on the map.
//!
//! Any type implementing [`Located`] can be rendered. [`Entity`] is the
//! concrete record shipped with the crate and the one [`load_entities`]
//! deserializes from JSON.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::coord::{CoordError, LatLon};

/// Something with a geographic position.
pub trait Located {
    /// Where this item sits on the map.
    fn coord(&self) -> LatLon;
}

/// A caller-owned item with identity and a coordinate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Entity {
    /// Stable identifier.
    pub id: String,
    /// Optional human-readable label.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    /// Position of the entity.
    #[serde(flatten)]
    pub coord: LatLon,
}

impl Entity {
    /// Create an entity without a label.
    pub fn new(id: impl Into<String>, coord: LatLon) -> Self {
        Self {
            id: id.into(),
            label: None,
            coord,
        }
    }

    /// Attach a label.
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    /// Label if present, otherwise the id.
    pub fn display_name(&self) -> &str {
        self.label.as_deref().unwrap_or(&self.id)
    }
}

impl Located for Entity {
    fn coord(&self) -> LatLon {
        self.coord
    }
}

impl<T: Located + ?Sized> Located for &T {
    fn coord(&self) -> LatLon {
        (**self).coord()
    }
}

/// Errors from loading an entity file.
#[derive(Debug, Error)]
pub enum EntityLoadError {
    /// The file could not be read.
    #[error("Failed to read entity file: {0}")]
    Io(#[from] std::io::Error),

    /// The file is not a JSON array of entities.
    #[error("Failed to parse entity file: {0}")]
    Json(#[from] serde_json::Error),

    /// An entity carries an out-of-range coordinate.
    #[error("Entity '{id}' at index {index}: {source}")]
    InvalidCoord {
        index: usize,
        id: String,
        #[source]
        source: CoordError,
    },
}

/// Load an ordered entity sequence from a JSON file.
///
/// The file holds an array of `{"id": ..., "label": ..., "lat": ..., "lon": ...}`
/// records; order in the file is the connector order on the map.
pub fn load_entities(path: &Path) -> Result<Vec<Entity>, EntityLoadError> {
    let contents = fs::read_to_string(path)?;
    parse_entities(&contents)
}

/// Parse an entity sequence from JSON text, validating coordinates.
pub fn parse_entities(json: &str) -> Result<Vec<Entity>, EntityLoadError> {
    let entities: Vec<Entity> = serde_json::from_str(json)?;

    for (index, entity) in entities.iter().enumerate() {
        entity
            .coord
            .validate()
            .map_err(|source| EntityLoadError::InvalidCoord {
                index,
                id: entity.id.clone(),
                source,
            })?;
    }

    tracing::debug!(count = entities.len(), "Loaded entities");
    Ok(entities)
}
