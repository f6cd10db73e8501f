//! Competitor map contract.
//!
//! [`render`] turns a [`MapViewModel`] into a [`MapFrame`]: a flat list of
//! drawable markers. Actual drawing belongs to whatever [`MapSink`] consumes
//! the frame; [`GeoJsonSink`] is the one shipped here.

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use thiserror::Error;

use crate::geo::{Competitor, GeoPoint};

pub const DEFAULT_ZOOM: u8 = 13;

/// Center and ranked competitors for one search result.
///
/// `your_location` equals `center` unless explicitly overridden (e.g. device
/// geolocation differing from the searched address).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", from = "RawMapViewModel")]
pub struct MapViewModel {
    pub center: GeoPoint,
    pub competitors: Vec<Competitor>,
    pub your_location: GeoPoint,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawMapViewModel {
    center: GeoPoint,
    #[serde(default)]
    competitors: Vec<Competitor>,
    your_location: Option<GeoPoint>,
}

impl From<RawMapViewModel> for MapViewModel {
    fn from(raw: RawMapViewModel) -> Self {
        let your_location = raw.your_location.unwrap_or(raw.center);
        Self {
            center: raw.center,
            competitors: raw.competitors,
            your_location,
        }
    }
}

impl MapViewModel {
    #[must_use]
    pub fn new(center: GeoPoint, competitors: Vec<Competitor>) -> Self {
        Self {
            center,
            competitors,
            your_location: center,
        }
    }

    #[must_use]
    pub fn with_your_location(mut self, your_location: GeoPoint) -> Self {
        self.your_location = your_location;
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MarkerKind {
    YourLocation,
    Competitor,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Marker {
    pub kind: MarkerKind,
    pub id: String,
    pub position: GeoPoint,
    pub label: String,
    pub z_index: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rating: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub distance_miles: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MapFrame {
    pub center: GeoPoint,
    pub zoom: u8,
    pub markers: Vec<Marker>,
}

impl MapFrame {
    #[must_use]
    pub fn with_zoom(mut self, zoom: u8) -> Self {
        self.zoom = zoom;
        self
    }
}

pub const YOUR_LOCATION_ID: &str = "your-location";
const YOUR_LOCATION_LABEL: &str = "Your location";

/// Lay out markers for a view.
///
/// The your-location marker comes first and stacks above everything. Competitor
/// markers follow in input order with strictly decreasing z-index, so whatever
/// ranking the upstream search applied is what the viewer sees on top. An empty
/// competitor list yields just the your-location marker.
#[must_use]
pub fn render(view: &MapViewModel) -> MapFrame {
    let competitor_count = u32::try_from(view.competitors.len()).unwrap_or(u32::MAX);

    let mut markers = Vec::with_capacity(view.competitors.len() + 1);
    markers.push(Marker {
        kind: MarkerKind::YourLocation,
        id: YOUR_LOCATION_ID.to_string(),
        position: view.your_location,
        label: YOUR_LOCATION_LABEL.to_string(),
        z_index: competitor_count.saturating_add(1),
        rating: None,
        distance_miles: None,
    });

    markers.extend(
        view.competitors
            .iter()
            .zip((1..=competitor_count).rev())
            .map(|(competitor, z_index)| Marker {
                kind: MarkerKind::Competitor,
                id: competitor.id.clone(),
                position: competitor.location,
                label: competitor.name.clone(),
                z_index,
                rating: competitor.rating,
                distance_miles: competitor.distance_miles,
            }),
    );

    MapFrame {
        center: view.center,
        zoom: DEFAULT_ZOOM,
        markers,
    }
}

#[derive(Debug, Error)]
pub enum MapError {
    #[error("map sink failed: {0}")]
    Sink(String),
}

/// Output adapter for rendered frames.
pub trait MapSink {
    type Output;

    /// # Errors
    ///
    /// Returns [`MapError`] if the sink cannot accept the frame.
    fn draw(&mut self, frame: &MapFrame) -> Result<Self::Output, MapError>;
}

/// Emits a GeoJSON `FeatureCollection` with one `Point` feature per marker.
///
/// Coordinates follow GeoJSON's `[lng, lat]` order.
#[derive(Debug, Default, Clone, Copy)]
pub struct GeoJsonSink;

impl MapSink for GeoJsonSink {
    type Output = Value;

    fn draw(&mut self, frame: &MapFrame) -> Result<Value, MapError> {
        let features = frame
            .markers
            .iter()
            .map(|marker| {
                let properties =
                    serde_json::to_value(marker).map_err(|e| MapError::Sink(e.to_string()))?;
                Ok(json!({
                    "type": "Feature",
                    "id": marker.id,
                    "geometry": {
                        "type": "Point",
                        "coordinates": [marker.position.lng(), marker.position.lat()],
                    },
                    "properties": properties,
                }))
            })
            .collect::<Result<Vec<_>, MapError>>()?;

        Ok(json!({
            "type": "FeatureCollection",
            "bbox": bbox(frame),
            "features": features,
        }))
    }
}

fn bbox(frame: &MapFrame) -> [f64; 4] {
    frame.markers.iter().fold(
        [
            frame.center.lng(),
            frame.center.lat(),
            frame.center.lng(),
            frame.center.lat(),
        ],
        |[min_lng, min_lat, max_lng, max_lat], m| {
            [
                min_lng.min(m.position.lng()),
                min_lat.min(m.position.lat()),
                max_lng.max(m.position.lng()),
                max_lat.max(m.position.lat()),
            ]
        },
    )
}
