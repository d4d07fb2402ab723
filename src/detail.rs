use crate::errors::LunarError;
use crate::lunar::UpstreamDay;
use crate::models::{DayDetail, DayDetailQuery};
use crate::names;
use std::time::Duration;
use tokio::time::sleep;

#[allow(async_fn_in_trait)]
pub trait DayDetailSource {
    async fn fetch_detail(&self, query: DayDetailQuery) -> Result<DayDetail, LunarError>;
}

/// Answers every lookup with the same illustrative payload after a fixed
/// delay. Stands in for a detail backend that is not wired up yet.
#[derive(Debug, Clone)]
pub struct PlaceholderDetailSource {
    pub delay: Duration,
}

impl Default for PlaceholderDetailSource {
    fn default() -> Self {
        Self {
            delay: Duration::from_millis(500),
        }
    }
}

impl DayDetailSource for PlaceholderDetailSource {
    async fn fetch_detail(&self, query: DayDetailQuery) -> Result<DayDetail, LunarError> {
        sleep(self.delay).await;
        Ok(DayDetail {
            solar_day: query.day,
            solar_month: query.month,
            solar_year: query.year,
            lunar_date: "Ví dụ".to_string(),
            lunar_day_name: "Ví dụ".to_string(),
            lunar_month_name: "Ví dụ".to_string(),
            lunar_year_name: "Ví dụ".to_string(),
            auspicious_hours: vec!["Tý (23-1)".to_string(), "Sửu (1-3)".to_string()],
            inauspicious_hours: vec!["Dần (3-5)".to_string()],
        })
    }
}

/// Client of this service's `/api/lunar-day-detail` endpoint.
#[derive(Debug, Clone)]
pub struct HttpDetailSource {
    client: reqwest::Client,
    base_url: String,
}

impl HttpDetailSource {
    pub fn new(client: reqwest::Client, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }
}

impl DayDetailSource for HttpDetailSource {
    async fn fetch_detail(&self, query: DayDetailQuery) -> Result<DayDetail, LunarError> {
        let response = self
            .client
            .get(format!("{}/api/lunar-day-detail", self.base_url))
            .query(&query)
            .send()
            .await?;
        if !response.status().is_success() {
            return Err(LunarError::Status(response.status().as_u16()));
        }
        let body = response.bytes().await?;
        Ok(serde_json::from_slice(&body)?)
    }
}

/// Builds the detail payload of a day from its upstream conversion.
pub fn build_detail(query: DayDetailQuery, lunar: &UpstreamDay) -> DayDetail {
    let lunar_year = lunar.year.unwrap_or(query.year);
    DayDetail {
        solar_day: query.day,
        solar_month: query.month,
        solar_year: query.year,
        lunar_date: format!("{}/{}/{}", lunar.day, lunar.month, lunar_year),
        lunar_day_name: names::day_name(lunar.day),
        lunar_month_name: names::month_name(lunar.month),
        lunar_year_name: names::year_name(lunar_year),
        auspicious_hours: lunar.hoang_dao.iter().map(|b| names::branch(b)).collect(),
        inauspicious_hours: lunar.hac_dao.iter().map(|b| names::branch(b)).collect(),
    }
}
