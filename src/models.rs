use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum HabitCategory {
    #[serde(alias = "water")]
    Water,
    #[serde(alias = "sleep")]
    Sleep,
    #[serde(alias = "screen")]
    Screen,
}

impl HabitCategory {
    pub const ALL: [HabitCategory; 3] = [HabitCategory::Water, HabitCategory::Sleep, HabitCategory::Screen];

    pub fn as_str(self) -> &'static str {
        match self {
            HabitCategory::Water => "Water",
            HabitCategory::Sleep => "Sleep",
            HabitCategory::Screen => "Screen",
        }
    }

    /// Largest amount a day can record for this category.
    pub fn max_value(self) -> f64 {
        match self {
            HabitCategory::Water | HabitCategory::Sleep => 16.0,
            HabitCategory::Screen => 12.0,
        }
    }
}

impl fmt::Display for HabitCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for HabitCategory {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "water" => Ok(HabitCategory::Water),
            "sleep" => Ok(HabitCategory::Sleep),
            "screen" => Ok(HabitCategory::Screen),
            other => Err(format!("unknown habit category '{other}'")),
        }
    }
}

/// One day's logged amounts. Absent fields deserialize as zero.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
pub struct DailyRecord {
    #[serde(rename = "Water", default)]
    pub water: f64,
    #[serde(rename = "Sleep", default)]
    pub sleep: f64,
    #[serde(rename = "Screen", default)]
    pub screen: f64,
}

impl DailyRecord {
    pub fn new(water: f64, sleep: f64, screen: f64) -> Self {
        Self { water, sleep, screen }
    }

    pub fn get(&self, category: HabitCategory) -> f64 {
        match category {
            HabitCategory::Water => self.water,
            HabitCategory::Sleep => self.sleep,
            HabitCategory::Screen => self.screen,
        }
    }

    /// Returns a copy with one field replaced; the other two are carried over.
    pub fn with(mut self, category: HabitCategory, value: f64) -> Self {
        match category {
            HabitCategory::Water => self.water = value,
            HabitCategory::Sleep => self.sleep = value,
            HabitCategory::Screen => self.screen = value,
        }
        self
    }

    /// Negative and non-finite amounts collapse to zero; the rest is capped
    /// at the category maximum.
    pub fn sanitized(self) -> Self {
        fn fix(value: f64, category: HabitCategory) -> f64 {
            if value.is_finite() && value > 0.0 {
                value.min(category.max_value())
            } else {
                0.0
            }
        }
        Self {
            water: fix(self.water, HabitCategory::Water),
            sleep: fix(self.sleep, HabitCategory::Sleep),
            screen: fix(self.screen, HabitCategory::Screen),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct SelectDateRequest {
    pub date: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ValueSource {
    #[default]
    Input,
    Slider,
}

#[derive(Debug, Deserialize)]
pub struct SetValueRequest {
    pub category: HabitCategory,
    pub value: f64,
    #[serde(default)]
    pub source: ValueSource,
}

#[derive(Debug, Deserialize)]
pub struct CategoryRequest {
    pub category: HabitCategory,
}

#[derive(Debug, Deserialize)]
pub struct NavigateRequest {
    pub delta: i32,
}

#[derive(Debug, Deserialize)]
pub struct CalendarQuery {
    pub month: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct HistoryResponse {
    pub days: std::collections::BTreeMap<String, DailyRecord>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn record_defaults_missing_categories_to_zero() {
        let record: DailyRecord = serde_json::from_str(r#"{"Sleep": 7.5}"#).unwrap();
        assert_eq!(record, DailyRecord::new(0.0, 7.5, 0.0));
    }

    #[test]
    fn record_serializes_with_category_names() {
        let json = serde_json::to_value(DailyRecord::new(8.0, 7.0, 2.5)).unwrap();
        assert_eq!(json, serde_json::json!({ "Water": 8.0, "Sleep": 7.0, "Screen": 2.5 }));
    }

    #[test]
    fn with_keeps_sibling_fields() {
        let record = DailyRecord::new(4.0, 6.0, 3.0).with(HabitCategory::Sleep, 7.5);
        assert_eq!(record, DailyRecord::new(4.0, 7.5, 3.0));
    }

    #[test]
    fn sanitized_clamps_negative_and_nan() {
        let record = DailyRecord::new(-1.0, f64::NAN, 2.0).sanitized();
        assert_eq!(record, DailyRecord::new(0.0, 0.0, 2.0));
    }

    #[test]
    fn sanitized_caps_at_category_max() {
        let record = DailyRecord::new(20.0, 16.0, 12.5).sanitized();
        assert_eq!(record, DailyRecord::new(16.0, 16.0, 12.0));
    }

    #[test]
    fn category_parses_case_insensitively() {
        assert_eq!("screen".parse::<HabitCategory>(), Ok(HabitCategory::Screen));
        assert_eq!(" Water ".parse::<HabitCategory>(), Ok(HabitCategory::Water));
        assert!("steps".parse::<HabitCategory>().is_err());
    }

    #[test]
    fn set_value_request_defaults_to_input_source() {
        let req: SetValueRequest =
            serde_json::from_str(r#"{"category": "Water", "value": 3}"#).unwrap();
        assert_eq!(req.source, ValueSource::Input);
        assert_eq!(req.category, HabitCategory::Water);
    }
}
