use crate::handlers;
use crate::state::AppState;
use axum::{routing::{get, post}, Router};

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(handlers::index))
        .route("/api/session", get(handlers::get_session))
        .route("/api/session/select", post(handlers::select_date))
        .route("/api/session/value", post(handlers::set_value))
        .route("/api/session/increment", post(handlers::increment))
        .route("/api/session/decrement", post(handlers::decrement))
        .route("/api/session/commit", post(handlers::commit))
        .route("/api/calendar", get(handlers::get_calendar))
        .route("/api/calendar/navigate", post(handlers::navigate_month))
        .route("/api/dashboard", get(handlers::get_dashboard))
        .route("/api/goals", get(handlers::get_goals))
        .route("/api/history", get(handlers::get_history))
        .with_state(state)
}
