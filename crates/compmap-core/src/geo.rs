//! Coordinate and competitor value types shared by the search and map layers.

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum GeoError {
    #[error("latitude {0} is outside [-90, 90]")]
    LatitudeOutOfRange(f64),
    #[error("longitude {0} is outside [-180, 180]")]
    LongitudeOutOfRange(f64),
    #[error("distance {0} must be a non-negative number of miles")]
    InvalidDistance(f64),
}

/// A latitude/longitude pair in decimal degrees.
///
/// Out-of-range and non-finite coordinates are rejected both by [`GeoPoint::new`]
/// and when deserializing, so a `GeoPoint` in hand is always drawable.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawGeoPoint")]
pub struct GeoPoint {
    lat: f64,
    lng: f64,
}

#[derive(Deserialize)]
struct RawGeoPoint {
    lat: f64,
    lng: f64,
}

impl TryFrom<RawGeoPoint> for GeoPoint {
    type Error = GeoError;

    fn try_from(raw: RawGeoPoint) -> Result<Self, Self::Error> {
        Self::new(raw.lat, raw.lng)
    }
}

impl GeoPoint {
    /// # Errors
    ///
    /// Returns [`GeoError`] if either coordinate is non-finite or out of range.
    pub fn new(lat: f64, lng: f64) -> Result<Self, GeoError> {
        if !lat.is_finite() || !(-90.0..=90.0).contains(&lat) {
            return Err(GeoError::LatitudeOutOfRange(lat));
        }
        if !lng.is_finite() || !(-180.0..=180.0).contains(&lng) {
            return Err(GeoError::LongitudeOutOfRange(lng));
        }
        Ok(Self { lat, lng })
    }

    #[must_use]
    pub fn lat(&self) -> f64 {
        self.lat
    }

    #[must_use]
    pub fn lng(&self) -> f64 {
        self.lng
    }
}

/// A nearby business returned by the search collaborator.
///
/// `rating` is advisory (0-5 scale). `distance_miles` is measured from the
/// search center by whoever produced the record, and deserialization rejects
/// negative or non-finite values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", try_from = "RawCompetitor")]
pub struct Competitor {
    pub id: String,
    pub name: String,
    pub location: GeoPoint,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rating: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub distance_miles: Option<f64>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawCompetitor {
    id: String,
    name: String,
    location: GeoPoint,
    #[serde(default)]
    rating: Option<f64>,
    #[serde(default)]
    distance_miles: Option<f64>,
}

impl TryFrom<RawCompetitor> for Competitor {
    type Error = GeoError;

    fn try_from(raw: RawCompetitor) -> Result<Self, Self::Error> {
        if let Some(miles) = raw.distance_miles {
            if !miles.is_finite() || miles < 0.0 {
                return Err(GeoError::InvalidDistance(miles));
            }
        }
        Ok(Self {
            id: raw.id,
            name: raw.name,
            location: raw.location,
            rating: raw.rating,
            distance_miles: raw.distance_miles,
        })
    }
}
