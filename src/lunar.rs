use crate::config::Config;
use crate::errors::LunarError;
use crate::models::{
    decode_month_entries, DayDetailQuery, LunarMonthEntry, LunarMonthRequest, LunarRecord,
};
use serde::Deserialize;
use serde_json::Value;
use std::time::Duration;
use tokio::time::sleep;
use tracing::{error, info};

/// Source of the lunar dates for a whole month, one slot per solar day.
#[allow(async_fn_in_trait)]
pub trait MonthLunarSource {
    async fn fetch_month(
        &self,
        request: LunarMonthRequest,
    ) -> Result<Vec<Option<LunarRecord>>, LunarError>;
}

/// Client of this service's own `/api/lunar-month-dates` endpoint.
#[derive(Debug, Clone)]
pub struct ApiLunarClient {
    client: reqwest::Client,
    base_url: String,
}

impl ApiLunarClient {
    pub fn new(client: reqwest::Client, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }
}

impl MonthLunarSource for ApiLunarClient {
    async fn fetch_month(
        &self,
        request: LunarMonthRequest,
    ) -> Result<Vec<Option<LunarRecord>>, LunarError> {
        let response = self
            .client
            .post(format!("{}/api/lunar-month-dates", self.base_url))
            .json(&request)
            .send()
            .await?;
        if !response.status().is_success() {
            return Err(LunarError::Status(response.status().as_u16()));
        }
        let body = response.bytes().await?;
        let entries: Vec<Value> = serde_json::from_slice(&body)?;
        Ok(decode_month_entries(&entries))
    }
}

/// Lunar date of one solar day as reported by the upstream converter.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct UpstreamDay {
    pub day: u32,
    pub month: u32,
    #[serde(default)]
    pub year: Option<i32>,
    /// Earthly branches of the auspicious hours, when the upstream has them.
    #[serde(default)]
    pub hoang_dao: Vec<String>,
    #[serde(default)]
    pub hac_dao: Vec<String>,
}

impl UpstreamDay {
    pub fn record(&self) -> LunarRecord {
        LunarRecord {
            day: self.day,
            month: self.month,
            year: self.year,
        }
    }
}

#[derive(Debug, Deserialize)]
struct UpstreamEnvelope {
    data: Option<UpstreamDay>,
}

/// Converts solar days by calling the upstream lunar converter one day at a time.
#[derive(Debug, Clone)]
pub struct UpstreamConverter {
    client: reqwest::Client,
    url: String,
    delay: Duration,
}

impl UpstreamConverter {
    pub fn new(config: &Config) -> Result<Self, LunarError> {
        let client = reqwest::Client::builder()
            .timeout(config.upstream_timeout)
            .build()?;
        Ok(Self {
            client,
            url: config.upstream_url.clone(),
            delay: config.upstream_delay,
        })
    }

    pub async fn convert_day(&self, date: DayDetailQuery) -> Result<UpstreamDay, LunarError> {
        let response = self.client.post(&self.url).json(&date).send().await?;
        if response.status() != reqwest::StatusCode::OK {
            return Err(LunarError::Status(response.status().as_u16()));
        }
        let body = response.bytes().await?;
        let envelope: UpstreamEnvelope = serde_json::from_slice(&body)?;
        envelope.data.ok_or(LunarError::MissingData)
    }

    /// Converts every day of a month. Days the upstream cannot convert
    /// become error entries; the month itself always completes.
    pub async fn convert_month(&self, request: LunarMonthRequest, days: u32) -> Vec<LunarMonthEntry> {
        info!("fetching lunar dates for month {}/{}", request.month, request.year);
        let mut entries = Vec::with_capacity(days as usize);
        for day in 1..=days {
            if day > 1 && !self.delay.is_zero() {
                sleep(self.delay).await;
            }
            let date = DayDetailQuery {
                day,
                month: request.month,
                year: request.year,
            };
            let entry = match self.convert_day(date).await {
                Ok(lunar) => LunarMonthEntry::Record(lunar.record()),
                Err(err) => {
                    error!(
                        "lunar conversion for {day}/{}/{} failed: {err}",
                        request.month, request.year
                    );
                    LunarMonthEntry::Failed {
                        error: failure_message(day, &err),
                    }
                }
            };
            entries.push(entry);
        }
        entries
    }
}

fn failure_message(day: u32, err: &LunarError) -> String {
    match err {
        LunarError::Status(code) => format!("API failed for day {day} status: {code}"),
        LunarError::MissingData => format!("No data for day {day}"),
        other => format!("Exception for day {day}: {other}"),
    }
}
