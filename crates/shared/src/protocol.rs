use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::{
    BrewMethod, EntryId, FLAVOR_SCALE_MAX, RATIO_SCORE_MAX, TEMP_SCORE_MAX, TIME_SCORE_MAX,
};

/// Path of the scoring endpoint, relative to the service base url.
pub const SCORE_PATH: &str = "/api/score";
/// Key of the single local record that holds the brew history.
pub const HISTORY_KEY: &str = "brew_history";
/// Number of entries the brew history retains.
pub const HISTORY_CAPACITY: usize = 10;

/// Body of `POST /api/score`.
///
/// Floats that are not finite serialize as `null`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BrewRequest {
    pub method: BrewMethod,
    pub coffee_dose: f64,
    pub water_yield: f64,
    pub temperature: f64,
    pub brew_time: u32,
    pub grind_size: String,
    pub roast_level: String,
}

impl BrewRequest {
    pub fn from_defaults(method: BrewMethod) -> Self {
        let defaults = method.defaults();
        Self {
            method,
            coffee_dose: defaults.coffee_dose,
            water_yield: defaults.water_yield,
            temperature: defaults.temperature,
            brew_time: defaults.brew_time,
            grind_size: defaults.grind_size.to_string(),
            roast_level: defaults.roast_level.to_string(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FlavorProfile {
    #[serde(deserialize_with = "lenient::null_as_default")]
    pub acidity: f64,
    #[serde(deserialize_with = "lenient::null_as_default")]
    pub sweetness: f64,
    #[serde(deserialize_with = "lenient::null_as_default")]
    pub body: f64,
    #[serde(deserialize_with = "lenient::null_as_default")]
    pub bitterness: f64,
}

impl FlavorProfile {
    /// `(axis name, value clamped to the flavor scale)` in display order.
    pub fn axes(&self) -> [(&'static str, f64); 4] {
        let clamp = |value: f64| value.clamp(0.0, FLAVOR_SCALE_MAX);
        [
            ("acidity", clamp(self.acidity)),
            ("sweetness", clamp(self.sweetness)),
            ("body", clamp(self.body)),
            ("bitterness", clamp(self.bitterness)),
        ]
    }
}

/// Response of the scoring service.
///
/// Every field falls back to its default when absent or `null`; unknown fields
/// are ignored. The ideal values are display text and may arrive as numbers.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoreResult {
    #[serde(deserialize_with = "lenient::null_as_default")]
    pub total_score: f64,
    #[serde(deserialize_with = "lenient::null_as_default")]
    pub ratio_score: f64,
    #[serde(deserialize_with = "lenient::null_as_default")]
    pub temp_score: f64,
    #[serde(deserialize_with = "lenient::null_as_default")]
    pub time_score: f64,
    #[serde(deserialize_with = "lenient::null_as_default")]
    pub feedback: Vec<String>,
    #[serde(deserialize_with = "lenient::display_text")]
    pub ideal_ratio: String,
    #[serde(deserialize_with = "lenient::display_text")]
    pub ideal_temp: String,
    #[serde(deserialize_with = "lenient::display_text")]
    pub ideal_time: String,
    #[serde(deserialize_with = "lenient::null_as_default")]
    pub calculated_ratio: f64,
    #[serde(deserialize_with = "lenient::null_as_default")]
    pub flavor: FlavorProfile,
}

impl ScoreResult {
    pub fn ratio_percent(&self) -> f64 {
        percent_of(self.ratio_score, RATIO_SCORE_MAX)
    }

    pub fn temp_percent(&self) -> f64 {
        percent_of(self.temp_score, TEMP_SCORE_MAX)
    }

    pub fn time_percent(&self) -> f64 {
        percent_of(self.time_score, TIME_SCORE_MAX)
    }
}

fn percent_of(score: f64, max: f64) -> f64 {
    if score.is_finite() {
        score / max * 100.0
    } else {
        0.0
    }
}

mod lenient {
    use serde::{Deserialize, Deserializer};

    pub fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
    where
        D: Deserializer<'de>,
        T: Deserialize<'de> + Default,
    {
        Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
    }

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum DisplayValue {
        Text(String),
        Number(serde_json::Number),
        Flag(bool),
    }

    /// Strings pass through, numbers and booleans are rendered, `null` is empty.
    pub fn display_text<'de, D>(deserializer: D) -> Result<String, D::Error>
    where
        D: Deserializer<'de>,
    {
        Ok(match Option::<DisplayValue>::deserialize(deserializer)? {
            Some(DisplayValue::Text(text)) => text,
            Some(DisplayValue::Number(number)) => number.to_string(),
            Some(DisplayValue::Flag(flag)) => flag.to_string(),
            None => String::new(),
        })
    }
}

/// One scored recipe kept in the local brew history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub id: EntryId,
    pub recipe: BrewRequest,
    pub result: ScoreResult,
    pub date: DateTime<Utc>,
}
