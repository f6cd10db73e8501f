mod app_config;
mod config;
pub mod geo;
pub mod map;
pub mod search;

pub use app_config::{AppConfig, Environment};
pub use config::{load_app_config, load_app_config_from_env};
pub use geo::{Competitor, GeoError, GeoPoint};
pub use map::{
    render, GeoJsonSink, MapError, MapFrame, MapSink, MapViewModel, Marker, MarkerKind,
    DEFAULT_ZOOM,
};
pub use search::{
    validate, CompetitorSearch, Field, SearchError, SearchRequest, SearchResult, ValidationError,
    Violation, ViolationKind,
};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required environment variable: {0}")]
    MissingEnvVar(String),
    #[error("invalid value for {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },
}
