use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::LayerError;

/// Where a feature layer's features come from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FeatureSource {
    /// Feature service endpoint.
    Url(Url),
    /// Portal item id.
    #[serde(rename = "portal_item_id")]
    PortalItem(String),
}

impl FeatureSource {
    /// Accepts absolute http(s) URLs only.
    pub fn parse_url(raw: &str) -> Result<Self, LayerError> {
        let url = Url::parse(raw.trim()).map_err(|e| LayerError::InvalidUrl {
            url: raw.to_string(),
            reason: e.to_string(),
        })?;
        match url.scheme() {
            "http" | "https" => Ok(FeatureSource::Url(url)),
            other => Err(LayerError::InvalidUrl {
                url: raw.to_string(),
                reason: format!("unsupported scheme `{other}`"),
            }),
        }
    }

    pub fn parse_portal_item(raw: &str) -> Result<Self, LayerError> {
        let id = raw.trim();
        if id.is_empty() || !id.chars().all(|c| c.is_ascii_alphanumeric()) {
            return Err(LayerError::InvalidPortalItemId(raw.to_string()));
        }
        Ok(FeatureSource::PortalItem(id.to_string()))
    }

    /// Identity fragment used when the layer has no explicit id.
    pub fn key_fragment(&self) -> String {
        match self {
            FeatureSource::Url(url) => url.as_str().to_string(),
            FeatureSource::PortalItem(id) => format!("portal:{id}"),
        }
    }
}

/// Credentials forwarded to the engine with a feature layer.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Auth {
    ApiKey(String),
    OauthToken(String),
}

impl Auth {
    /// Builds auth from the two optional raw fields; at most one may be set.
    pub fn from_parts(
        api_key: Option<&str>,
        oauth_token: Option<&str>,
    ) -> Result<Option<Self>, LayerError> {
        match (api_key, oauth_token) {
            (Some(_), Some(_)) => Err(LayerError::ConflictingAuth),
            (Some(k), None) => non_empty(k, "api_key").map(|k| Some(Auth::ApiKey(k))),
            (None, Some(t)) => non_empty(t, "oauth_token").map(|t| Some(Auth::OauthToken(t))),
            (None, None) => Ok(None),
        }
    }
}

fn non_empty(v: &str, field: &'static str) -> Result<String, LayerError> {
    if v.trim().is_empty() {
        return Err(LayerError::EmptyCredential(field));
    }
    Ok(v.to_string())
}

// Credentials end up in tracing output via Debug; never print them.
impl std::fmt::Debug for Auth {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Auth::ApiKey(_) => f.write_str("ApiKey(<redacted>)"),
            Auth::OauthToken(_) => f.write_str("OauthToken(<redacted>)"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{Auth, FeatureSource};
    use crate::error::LayerError;

    #[test]
    fn accepts_https_service_url() {
        let s = FeatureSource::parse_url(
            "https://services.arcgis.com/P3ePLMYs2RVChkJx/ArcGIS/rest/services/USA_States_Generalized/FeatureServer/0",
        )
        .unwrap();
        assert!(matches!(s, FeatureSource::Url(_)));
    }

    #[test]
    fn rejects_relative_and_non_http_urls() {
        assert!(matches!(
            FeatureSource::parse_url("services/FeatureServer/0"),
            Err(LayerError::InvalidUrl { .. })
        ));
        assert!(matches!(
            FeatureSource::parse_url("ftp://example.com/layer"),
            Err(LayerError::InvalidUrl { .. })
        ));
    }

    #[test]
    fn portal_item_ids_are_alphanumeric() {
        assert_eq!(
            FeatureSource::parse_portal_item("99fd67933e754a1181cc755146be21ca"),
            Ok(FeatureSource::PortalItem(
                "99fd67933e754a1181cc755146be21ca".to_string()
            ))
        );
        assert!(FeatureSource::parse_portal_item("").is_err());
        assert!(FeatureSource::parse_portal_item("abc/def").is_err());
    }

    #[test]
    fn auth_is_exclusive() {
        assert_eq!(Auth::from_parts(None, None), Ok(None));
        assert_eq!(
            Auth::from_parts(Some("k"), None),
            Ok(Some(Auth::ApiKey("k".to_string())))
        );
        assert_eq!(
            Auth::from_parts(Some("k"), Some("t")),
            Err(LayerError::ConflictingAuth)
        );
        assert_eq!(
            Auth::from_parts(None, Some(" ")),
            Err(LayerError::EmptyCredential("oauth_token"))
        );
    }

    #[test]
    fn auth_debug_is_redacted() {
        let a = Auth::ApiKey("secret".to_string());
        assert!(!format!("{a:?}").contains("secret"));
    }
}
