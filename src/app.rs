use crate::handlers;
use crate::state::AppState;
use axum::{routing::{get, post}, Router};

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(handlers::perpetual_calendar))
        .route("/perpetual-calendar", get(handlers::perpetual_calendar))
        .route("/api/lunar-month-dates", post(handlers::lunar_month_dates))
        .route("/api/lunar-day-detail", get(handlers::lunar_day_detail))
        .with_state(state)
}
