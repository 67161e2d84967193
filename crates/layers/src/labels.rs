use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::LayerError;

/// Label rules (`label_info`) forwarded untouched to the engine.
///
/// Shape check only: a list of objects, each carrying either a
/// `labelExpression` or a `labelExpressionInfo`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Value", into = "Value")]
pub struct LabelRules {
    rules: Vec<Value>,
}

impl LabelRules {
    pub fn from_value(raw: &Value) -> Result<Self, LayerError> {
        let items = raw
            .as_array()
            .ok_or_else(|| LayerError::InvalidLabels("expected a list".to_string()))?;
        for (i, rule) in items.iter().enumerate() {
            let Some(obj) = rule.as_object() else {
                return Err(LayerError::InvalidLabels(format!(
                    "rule {i} must be an object"
                )));
            };
            if !obj.contains_key("labelExpression") && !obj.contains_key("labelExpressionInfo") {
                return Err(LayerError::InvalidLabels(format!(
                    "rule {i} has no label expression"
                )));
            }
        }
        Ok(Self {
            rules: items.clone(),
        })
    }
}

impl TryFrom<Value> for LabelRules {
    type Error = LayerError;

    fn try_from(v: Value) -> Result<Self, Self::Error> {
        LabelRules::from_value(&v)
    }
}

impl From<LabelRules> for Value {
    fn from(l: LabelRules) -> Self {
        Value::Array(l.rules)
    }
}
