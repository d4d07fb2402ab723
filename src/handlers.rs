use crate::calendar::{days_in_month, CalendarCursor};
use crate::detail::build_detail;
use crate::errors::AppError;
use crate::models::{DayDetail, DayDetailQuery, LunarCache, LunarMonthEntry, LunarMonthRequest, LunarRecord};
use crate::state::AppState;
use crate::storage::persist_cache;
use crate::surface::HtmlSurface;
use crate::ui::render_page;
use crate::view::MonthCalendarView;
use axum::{
    extract::{Query, State},
    response::Html,
    Json,
};
use chrono::{Local, NaiveDate};
use serde::Deserialize;
use tracing::error;

/// Month shown by the page; `month` is one-based like the rest of the URL API.
#[derive(Debug, Deserialize)]
pub struct CalendarQuery {
    pub year: Option<i32>,
    pub month: Option<u32>,
}

pub async fn perpetual_calendar(
    State(state): State<AppState>,
    Query(query): Query<CalendarQuery>,
) -> Html<String> {
    let today = Local::now().date_naive();
    let current = CalendarCursor::from_date(today);
    let cursor = CalendarCursor::new(
        query.year.unwrap_or(current.year),
        query.month.map_or(i64::from(current.month), |m| i64::from(m) - 1),
    );

    let mut view = MonthCalendarView::new(HtmlSurface::default(), cursor);
    let ticket = view.render_month_at(cursor.year, cursor.month, today);

    let cached = state.cache.lock().await.get(ticket.request).cloned();
    let prefilled = match cached {
        Some(records) => {
            let slots: Vec<Option<LunarRecord>> = records.into_iter().map(Some).collect();
            view.apply_lunar_batch(&slots, ticket.generation)
        }
        None => false,
    };

    Html(render_page(view.surface(), cursor, prefilled))
}

pub async fn lunar_month_dates(
    State(state): State<AppState>,
    Json(request): Json<LunarMonthRequest>,
) -> Result<Json<Vec<LunarMonthEntry>>, AppError> {
    if !(1..=12).contains(&request.month) {
        return Err(AppError::bad_request("month must be between 1 and 12"));
    }

    let cached = state.cache.lock().await.get(request).cloned();
    if let Some(records) = cached {
        return Ok(Json(records.into_iter().map(LunarMonthEntry::Record).collect()));
    }

    let days = days_in_month(request.year, request.month - 1);
    let entries = state.converter.convert_month(request, days).await;

    let complete: Option<Vec<LunarRecord>> = entries
        .iter()
        .map(|entry| match entry {
            LunarMonthEntry::Record(record) => Some(*record),
            LunarMonthEntry::Failed { .. } => None,
        })
        .collect();
    if let Some(records) = complete {
        let mut cache = state.cache.lock().await;
        cache.months.insert(LunarCache::key(request), records);
        if let Err(err) = persist_cache(&state.data_path, &cache).await {
            error!("failed to persist lunar cache: {}", err.message);
        }
    }

    Ok(Json(entries))
}

pub async fn lunar_day_detail(
    State(state): State<AppState>,
    Query(query): Query<DayDetailQuery>,
) -> Result<Json<DayDetail>, AppError> {
    if NaiveDate::from_ymd_opt(query.year, query.month, query.day).is_none() {
        return Err(AppError::bad_request("day, month and year must form a valid date"));
    }

    let lunar = state.converter.convert_day(query).await.map_err(|err| {
        error!(
            "lunar detail for {}/{}/{} failed: {err}",
            query.day, query.month, query.year
        );
        AppError::from(err)
    })?;
    Ok(Json(build_detail(query, &lunar)))
}
