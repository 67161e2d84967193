use foundation::ids::LayerKey;
use thiserror::Error;

/// Why a single layer entry was rejected.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LayerError {
    #[error("layer entry must be an object")]
    NotAnObject,
    #[error("missing `kind`")]
    MissingKind,
    #[error("unknown kind `{0}` (expected feature, geojson or graphics)")]
    UnknownKind(String),
    #[error("`kind` ({kind}) and `type` ({type_}) disagree")]
    ConflictingKind { kind: String, type_: String },
    #[error("feature layer needs one of `url` or `portal_item_id`")]
    MissingSource,
    #[error("feature layer has both `url` and `portal_item_id`")]
    AmbiguousSource,
    #[error("invalid url `{url}`: {reason}")]
    InvalidUrl { url: String, reason: String },
    #[error("invalid portal item id `{0}`")]
    InvalidPortalItemId(String),
    #[error("`api_key` and `oauth_token` are mutually exclusive")]
    ConflictingAuth,
    #[error("`{0}` must be a non-empty string")]
    EmptyCredential(&'static str),
    #[error("`{field}` must be {expected}")]
    InvalidField {
        field: &'static str,
        expected: &'static str,
    },
    #[error("invalid renderer: {0}")]
    InvalidRenderer(String),
    #[error("invalid label rules: {0}")]
    InvalidLabels(String),
    #[error("geojson layer needs `data`")]
    MissingData,
    #[error("invalid geojson: {0}")]
    InvalidGeoJson(String),
    #[error("duplicate layer key `{0}`")]
    DuplicateKey(LayerKey),
}
