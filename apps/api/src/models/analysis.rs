use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::models::{lenient_text, null_as_default};

/// ATS compatibility report for one resume against one job description.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalysisRecord {
    /// 0 – 100, clamped on decode.
    #[serde(default, deserialize_with = "percentage")]
    pub match_percentage: u8,
    #[serde(default, deserialize_with = "null_as_default")]
    pub missing_keywords: Vec<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub reasoning: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub improvement_tips: Vec<String>,
}

/// Accepts `72`, `72.4`, `"72"` or `"72%"`.
fn percentage<'de, D>(deserializer: D) -> Result<u8, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    let raw = match &value {
        Value::Null => Some(0.0),
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().trim_end_matches('%').trim().parse::<f64>().ok(),
        _ => None,
    }
    .filter(|v| v.is_finite())
    .ok_or_else(|| D::Error::custom(format!("match_percentage is not a number: {value}")))?;

    Ok(raw.round().clamp(0.0, 100.0) as u8)
}
