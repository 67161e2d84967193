use serde::{Serialize, Serializer};
use serde_json::Value;

use crate::error::ValidationError;

/// Smallest accepted pixel size for width and height.
pub const MIN_PIXELS: u32 = 100;

/// Width or height of the map surface.
#[derive(Debug, Copy, Clone, PartialEq)]
pub enum Dimension {
    Pixels(u32),
    /// 0 < value <= 100
    Percent(f64),
}

impl Dimension {
    pub const DEFAULT_WIDTH: Dimension = Dimension::Percent(100.0);
    pub const DEFAULT_HEIGHT: Dimension = Dimension::Pixels(400);
}

impl std::fmt::Display for Dimension {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Dimension::Pixels(px) => write!(f, "{px}px"),
            Dimension::Percent(pct) => write!(f, "{pct}%"),
        }
    }
}

// The engine takes CSS lengths.
impl Serialize for Dimension {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Validates a width/height value.
///
/// Integers are pixels and must be at least [`MIN_PIXELS`]; strings must be
/// `<int>px` (same minimum) or `<float>%` with 0 < value <= 100.
pub fn validate_dimension(field: &'static str, raw: &Value) -> Result<Dimension, ValidationError> {
    let fail = |reason: String| ValidationError::InvalidDimension { field, reason };
    match raw {
        Value::Number(n) => {
            if let Some(px) = n.as_u64() {
                return pixels(px).map_err(fail);
            }
            if n.is_i64() {
                return Err(fail(format!("{n} is negative")));
            }
            Err(fail(format!("{n} is not a whole number of pixels")))
        }
        Value::String(s) => parse_css(s.trim()).map_err(fail),
        other => Err(fail(format!(
            "expected a pixel count or a \"<int>px\" / \"<float>%\" string, got {other}"
        ))),
    }
}

fn pixels(px: u64) -> Result<Dimension, String> {
    if px < MIN_PIXELS as u64 {
        return Err(format!("{px}px is below the {MIN_PIXELS}px minimum"));
    }
    u32::try_from(px)
        .map(Dimension::Pixels)
        .map_err(|_| format!("{px}px is too large"))
}

fn parse_css(s: &str) -> Result<Dimension, String> {
    if let Some(num) = s.strip_suffix("px") {
        if num.is_empty() || !num.bytes().all(|b| b.is_ascii_digit()) {
            return Err(format!("`{s}` is not an integer pixel size"));
        }
        let px: u64 = num
            .parse()
            .map_err(|_| format!("`{s}` is too large"))?;
        return pixels(px);
    }
    if let Some(num) = s.strip_suffix('%') {
        let pct: f64 = num
            .trim()
            .parse()
            .map_err(|_| format!("`{s}` is not a percentage"))?;
        if !pct.is_finite() || pct <= 0.0 || pct > 100.0 {
            return Err(format!("{pct}% is outside (0, 100]"));
        }
        return Ok(Dimension::Percent(pct));
    }
    Err(format!("`{s}` must end in px or %"))
}
