use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::LayerError;

/// Renderer block forwarded untouched to the engine.
///
/// Only the shape is checked: an object with a string `type`
/// (`simple`, `unique-value`, `class-breaks`, ...). Whether the engine
/// understands the rest is the engine's business.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Value", into = "Value")]
pub struct Renderer {
    raw: Value,
}

impl Renderer {
    pub fn from_value(raw: &Value) -> Result<Self, LayerError> {
        let obj = raw
            .as_object()
            .ok_or_else(|| LayerError::InvalidRenderer("expected an object".to_string()))?;
        match obj.get("type") {
            Some(Value::String(t)) if !t.trim().is_empty() => Ok(Self { raw: raw.clone() }),
            Some(_) => Err(LayerError::InvalidRenderer(
                "`type` must be a non-empty string".to_string(),
            )),
            None => Err(LayerError::InvalidRenderer("missing `type`".to_string())),
        }
    }
}

impl TryFrom<Value> for Renderer {
    type Error = LayerError;

    fn try_from(v: Value) -> Result<Self, Self::Error> {
        Renderer::from_value(&v)
    }
}

impl From<Renderer> for Value {
    fn from(r: Renderer) -> Self {
        r.raw
    }
}
