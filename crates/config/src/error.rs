use layers::error::LayerError;
use serde_json::Value;
use thiserror::Error;

/// Why a `center` value was rejected.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CenterError {
    #[error("expected a [longitude, latitude] list")]
    NotAList,
    #[error("expected 2 values, got {0}")]
    WrongArity(usize),
    #[error("value {index} is not a number")]
    NonNumeric { index: usize },
    #[error("longitude {0} outside [-180, 180]")]
    LngOutOfRange(f64),
    #[error("latitude {0} outside [-90, 90]")]
    LatOutOfRange(f64),
}

/// Caller-facing validation failure. Raised before anything is dispatched.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    #[error("invalid map configuration: {reason}")]
    InvalidConfig { reason: String },
    #[error("invalid {field}: {reason}")]
    InvalidDimension { field: &'static str, reason: String },
    #[error("invalid basemap `{given}`; expected one of: {}", .allowed.join(", "))]
    InvalidBasemap {
        given: String,
        allowed: Vec<&'static str>,
    },
    #[error("invalid view_mode `{given}`; expected 2d or 3d")]
    InvalidViewMode { given: String },
    #[error("invalid center: {reason}")]
    InvalidCenter { reason: CenterError },
    #[error("invalid zoom {given}; expected a number in [0, 20]")]
    InvalidZoom { given: Value },
    #[error("`{field}` must be a list")]
    InvalidLayerList { field: &'static str },
    #[error("invalid layer {index}: {reason}")]
    InvalidLayer { index: usize, reason: LayerError },
    #[error("invalid geojson: {reason}")]
    InvalidGeoJson { reason: LayerError },
    #[error("`{field}` must be true or false")]
    InvalidInteraction { field: &'static str },
}
