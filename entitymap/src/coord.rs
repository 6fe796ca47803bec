//! Geographic coordinates
//!
//! Provides the latitude/longitude pair entities are placed at, plus a
//! bounding box derived from a set of coordinates for fitting a map view.
//!
//! Coordinates are opaque to the registry and controller: they are carried
//! through to the map surface untouched. Validation is offered separately via
//! [`LatLon::try_new`] for callers that load coordinates from untrusted input.

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Maximum latitude representable in Web Mercator.
pub const MAX_LAT: f64 = 85.05112878;

/// Minimum latitude representable in Web Mercator.
pub const MIN_LAT: f64 = -85.05112878;

/// Maximum longitude.
pub const MAX_LON: f64 = 180.0;

/// Minimum longitude.
pub const MIN_LON: f64 = -180.0;

/// Errors from coordinate validation.
#[derive(Debug, Clone, Copy, PartialEq, Error)]
pub enum CoordError {
    /// Latitude outside the Web Mercator range.
    #[error("Invalid latitude: {0} (must be between -85.05112878 and 85.05112878)")]
    InvalidLatitude(f64),

    /// Longitude outside -180..=180.
    #[error("Invalid longitude: {0} (must be between -180 and 180)")]
    InvalidLongitude(f64),
}

/// A geographic coordinate in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LatLon {
    /// Latitude in degrees, positive north.
    pub lat: f64,
    /// Longitude in degrees, positive east.
    pub lon: f64,
}

impl LatLon {
    /// Create a coordinate without validation.
    pub const fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }

    /// Create a coordinate, rejecting values outside the Web Mercator range.
    ///
    /// # Arguments
    ///
    /// * `lat` - Latitude in degrees (-85.05112878 to 85.05112878)
    /// * `lon` - Longitude in degrees (-180.0 to 180.0)
    pub fn try_new(lat: f64, lon: f64) -> Result<Self, CoordError> {
        Self::new(lat, lon).validate()
    }

    /// Check this coordinate against the Web Mercator range.
    pub fn validate(self) -> Result<Self, CoordError> {
        if !(MIN_LAT..=MAX_LAT).contains(&self.lat) {
            return Err(CoordError::InvalidLatitude(self.lat));
        }
        if !(MIN_LON..=MAX_LON).contains(&self.lon) {
            return Err(CoordError::InvalidLongitude(self.lon));
        }
        Ok(self)
    }
}

impl fmt::Display for LatLon {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let lat_hem = if self.lat >= 0.0 { 'N' } else { 'S' };
        let lon_hem = if self.lon >= 0.0 { 'E' } else { 'W' };
        write!(
            f,
            "{:.5}°{} {:.5}°{}",
            self.lat.abs(),
            lat_hem,
            self.lon.abs(),
            lon_hem
        )
    }
}

/// Geographic bounding box.
///
/// Represents the minimum rectangle containing a set of coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GeoBounds {
    /// Minimum (southernmost) latitude
    pub min_lat: f64,
    /// Maximum (northernmost) latitude
    pub max_lat: f64,
    /// Minimum (westernmost) longitude
    pub min_lon: f64,
    /// Maximum (easternmost) longitude
    pub max_lon: f64,
}

impl GeoBounds {
    /// Create a bounding box from a single point.
    pub fn from_point(point: LatLon) -> Self {
        Self {
            min_lat: point.lat,
            max_lat: point.lat,
            min_lon: point.lon,
            max_lon: point.lon,
        }
    }

    /// Smallest box containing every point, or `None` for no points.
    pub fn enclosing<I>(points: I) -> Option<Self>
    where
        I: IntoIterator<Item = LatLon>,
    {
        let mut points = points.into_iter();
        let mut bounds = Self::from_point(points.next()?);
        for point in points {
            bounds.expand(point);
        }
        Some(bounds)
    }

    /// Expand this bounding box to include a point.
    pub fn expand(&mut self, point: LatLon) {
        self.min_lat = self.min_lat.min(point.lat);
        self.max_lat = self.max_lat.max(point.lat);
        self.min_lon = self.min_lon.min(point.lon);
        self.max_lon = self.max_lon.max(point.lon);
    }

    /// Get the center point of the bounds.
    pub fn center(&self) -> LatLon {
        LatLon::new(
            (self.min_lat + self.max_lat) / 2.0,
            (self.min_lon + self.max_lon) / 2.0,
        )
    }

    /// Whether the point lies inside or on the edge of the bounds.
    pub fn contains(&self, point: LatLon) -> bool {
        (self.min_lat..=self.max_lat).contains(&point.lat)
            && (self.min_lon..=self.max_lon).contains(&point.lon)
    }
}
