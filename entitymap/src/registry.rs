//! Entity registry: marker and connector descriptors.
//!
//! Built once from the ordered entity sequence. N entities produce N markers
//! and N-1 connectors; connector `i` joins entity `i` and entity `i + 1`, so
//! marker `i` and connector `i - 1` share their trailing endpoint.
//!
//! Construction is pure. Nothing reaches the map surface until the first
//! visibility update.

use crate::coord::{GeoBounds, LatLon};
use crate::entity::Located;
use crate::handlers::HandlerId;
use crate::style::Rgba;

/// A clickable point for one entity.
#[derive(Debug, Clone, PartialEq)]
pub struct MarkerDescriptor {
    /// Position of the entity in the sequence.
    pub index: usize,
    /// Where the marker is drawn.
    pub coord: LatLon,
    /// Click handler slot bound to this marker's entity.
    pub handler: HandlerId,
}

/// A line joining two consecutive entities.
#[derive(Debug, Clone, PartialEq)]
pub struct ConnectorDescriptor {
    /// Connector position; joins entity `index` and entity `index + 1`.
    pub index: usize,
    /// Coordinate of entity `index`.
    pub from: LatLon,
    /// Coordinate of entity `index + 1`.
    pub to: LatLon,
    /// Line color.
    pub color: Rgba,
}

/// Index-aligned marker and connector descriptors.
#[derive(Debug, Clone, Default)]
pub struct Registry {
    markers: Vec<MarkerDescriptor>,
    connectors: Vec<ConnectorDescriptor>,
}

impl Registry {
    /// Build descriptors for an ordered entity sequence.
    ///
    /// An empty sequence yields an empty registry.
    pub fn build<E: Located>(entities: &[E], line_color: Rgba) -> Self {
        let mut markers = Vec::with_capacity(entities.len());
        let mut connectors = Vec::with_capacity(entities.len().saturating_sub(1));

        for (i, entity) in entities.iter().enumerate() {
            let coord = entity.coord();
            markers.push(MarkerDescriptor {
                index: i,
                coord,
                handler: HandlerId(i),
            });

            if i > 0 {
                connectors.push(ConnectorDescriptor {
                    index: i - 1,
                    from: entities[i - 1].coord(),
                    to: coord,
                    color: line_color,
                });
            }
        }

        tracing::debug!(
            markers = markers.len(),
            connectors = connectors.len(),
            color = %line_color,
            "Built entity registry"
        );

        Self {
            markers,
            connectors,
        }
    }

    /// Number of entities (and markers).
    pub fn len(&self) -> usize {
        self.markers.len()
    }

    /// Whether the registry holds no entities.
    pub fn is_empty(&self) -> bool {
        self.markers.is_empty()
    }

    pub fn markers(&self) -> &[MarkerDescriptor] {
        &self.markers
    }

    pub fn connectors(&self) -> &[ConnectorDescriptor] {
        &self.connectors
    }

    pub fn marker(&self, index: usize) -> Option<&MarkerDescriptor> {
        self.markers.get(index)
    }

    pub fn connector(&self, index: usize) -> Option<&ConnectorDescriptor> {
        self.connectors.get(index)
    }

    /// Bounding box of every marker, `None` when empty.
    pub fn bounds(&self) -> Option<GeoBounds> {
        GeoBounds::enclosing(self.markers.iter().map(|m| m.coord))
    }
}
