use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

/// One candidate's scoring output, as returned by the results endpoint.
///
/// Everything but `id` is produced by a language model and decoded leniently:
/// a malformed field degrades to its empty value instead of failing the page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankedItem {
    pub id: u64,
    #[serde(default, deserialize_with = "lenient_text")]
    pub file_name: String,
    /// Kept raw so out-of-range or non-numeric scores survive until display.
    #[serde(default)]
    pub compatibility_score: Value,
    #[serde(default, deserialize_with = "lenient_optional_text")]
    pub candidate_name: Option<String>,
    #[serde(default, deserialize_with = "lenient_optional_text")]
    pub candidate_email: Option<String>,
    #[serde(default, deserialize_with = "lenient_object")]
    pub extracted_info: Map<String, Value>,
    #[serde(default, deserialize_with = "lenient_analysis")]
    pub ranking_analysis: RankingAnalysis,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct RankingAnalysis {
    #[serde(rename = "Strengths", default, deserialize_with = "lenient_list")]
    pub strengths: Vec<String>,
    #[serde(flatten)]
    pub other: Map<String, Value>,
}

fn display_text(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(text) => Some(text.clone()),
        other => Some(other.to_string()),
    }
}

fn lenient_text<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    Ok(display_text(&Value::deserialize(deserializer)?).unwrap_or_default())
}

fn lenient_optional_text<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<Option<String>, D::Error> {
    Ok(display_text(&Value::deserialize(deserializer)?))
}

fn lenient_object<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<Map<String, Value>, D::Error> {
    match Value::deserialize(deserializer)? {
        Value::Object(map) => Ok(map),
        _ => Ok(Map::new()),
    }
}

/// Strings pass through, other entries are rendered as JSON, nulls dropped.
/// A bare string counts as a one-element list.
fn lenient_list<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<String>, D::Error> {
    Ok(match Value::deserialize(deserializer)? {
        Value::Array(values) => values.iter().filter_map(display_text).collect(),
        Value::String(text) if !text.trim().is_empty() => vec![text],
        _ => Vec::new(),
    })
}

fn lenient_analysis<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<RankingAnalysis, D::Error> {
    let map = lenient_object(deserializer)?;
    Ok(serde_json::from_value(Value::Object(map)).unwrap_or_default())
}

impl RankedItem {
    pub fn score(&self) -> u8 {
        clamp_score(&self.compatibility_score)
    }

    /// Scalar attribute from `extracted_info`, numbers rendered as text.
    pub fn extracted_text(&self, key: &str) -> Option<String> {
        match self.extracted_info.get(key)? {
            Value::String(text) if !text.trim().is_empty() => Some(text.clone()),
            Value::Number(number) => Some(number.to_string()),
            _ => None,
        }
    }

    /// List attribute from `extracted_info`; non-string entries are rendered as JSON.
    pub fn extracted_list(&self, key: &str) -> Vec<String> {
        match self.extracted_info.get(key) {
            Some(Value::Array(values)) => values
                .iter()
                .map(|value| match value {
                    Value::String(text) => text.clone(),
                    other => other.to_string(),
                })
                .collect(),
            _ => Vec::new(),
        }
    }
}

/// Clamp a raw score into `0..=100`. Non-numeric values count as 0.
pub fn clamp_score(raw: &Value) -> u8 {
    let value = match raw {
        Value::Number(number) => number.as_f64().unwrap_or(0.0),
        Value::String(text) => text.trim().parse::<f64>().unwrap_or(0.0),
        _ => 0.0,
    };
    if value.is_nan() {
        return 0;
    }
    value.clamp(0.0, 100.0).round() as u8
}

/// Pagination metadata; only the paginated envelope carries it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PageInfo {
    pub total_count: Option<u64>,
    pub has_next: bool,
    pub has_previous: bool,
}

/// One normalized page of ranked results.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ResultsPage {
    pub items: Vec<RankedItem>,
    pub info: PageInfo,
}
