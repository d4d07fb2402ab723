use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// Lunar day and month of one solar day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LunarRecord {
    pub day: u32,
    pub month: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub year: Option<i32>,
}

impl LunarRecord {
    pub fn new(day: u32, month: u32) -> Self {
        Self {
            day,
            month,
            year: None,
        }
    }

    pub fn is_well_formed(&self) -> bool {
        (1..=30).contains(&self.day) && (1..=12).contains(&self.month)
    }

    /// Reads one entry of a month response; anything that is not a
    /// well-formed record is treated as unavailable.
    pub fn from_entry(entry: &Value) -> Option<Self> {
        if !entry.is_object() || entry.get("error").is_some() {
            return None;
        }
        serde_json::from_value::<LunarRecord>(entry.clone())
            .ok()
            .filter(LunarRecord::is_well_formed)
    }
}

/// Decodes a month response body, one slot per calendar day.
pub fn decode_month_entries(entries: &[Value]) -> Vec<Option<LunarRecord>> {
    entries.iter().map(LunarRecord::from_entry).collect()
}

/// Body of the month lookup; `month` is one-based.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LunarMonthRequest {
    pub month: u32,
    pub year: i32,
}

/// One slot of the month lookup response as served by this backend.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum LunarMonthEntry {
    Record(LunarRecord),
    Failed { error: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DayDetailQuery {
    pub day: u32,
    pub month: u32,
    pub year: i32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DayDetail {
    pub solar_day: u32,
    pub solar_month: u32,
    pub solar_year: i32,
    pub lunar_date: String,
    pub lunar_day_name: String,
    pub lunar_month_name: String,
    pub lunar_year_name: String,
    pub auspicious_hours: Vec<String>,
    pub inauspicious_hours: Vec<String>,
}

/// Persisted lunar months, keyed by `YYYY-MM`.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct LunarCache {
    pub months: BTreeMap<String, Vec<LunarRecord>>,
}

impl LunarCache {
    pub fn key(request: LunarMonthRequest) -> String {
        format!("{:04}-{:02}", request.year, request.month)
    }

    pub fn get(&self, request: LunarMonthRequest) -> Option<&Vec<LunarRecord>> {
        self.months.get(&Self::key(request))
    }
}
