use crate::calendar::CalendarGrid;
use crate::dates::{YearMonth, parse_date_key};
use crate::errors::AppError;
use crate::goals::GoalTable;
use crate::models::{
    CalendarQuery, CategoryRequest, HistoryResponse, NavigateRequest, SelectDateRequest,
    SetValueRequest, ValueSource,
};
use crate::session::SessionSnapshot;
use crate::state::AppState;
use crate::stats::Dashboard;
use crate::ui::render_index;
use axum::{
    extract::{Query, State},
    response::Html,
    Json,
};
use tracing::info;

pub async fn index(State(state): State<AppState>) -> Html<String> {
    let snapshot = state.tracker.lock().await.snapshot();
    Html(render_index(&snapshot))
}

pub async fn get_session(State(state): State<AppState>) -> Json<SessionSnapshot> {
    Json(state.tracker.lock().await.snapshot())
}

pub async fn select_date(
    State(state): State<AppState>,
    Json(payload): Json<SelectDateRequest>,
) -> Result<Json<SessionSnapshot>, AppError> {
    let date = parse_date_key(&payload.date)
        .ok_or_else(|| AppError::bad_request("date must be YYYY-MM-DD"))?;

    let mut tracker = state.tracker.lock().await;
    tracker.select_date(date);
    Ok(Json(tracker.snapshot()))
}

pub async fn set_value(
    State(state): State<AppState>,
    Json(payload): Json<SetValueRequest>,
) -> Result<Json<SessionSnapshot>, AppError> {
    let mut tracker = state.tracker.lock().await;
    match payload.source {
        ValueSource::Slider => {
            if let Some(seq) = tracker.set_value_deferred(payload.category, payload.value)? {
                state.schedule_flush(seq);
            }
        }
        ValueSource::Input => {
            tracker.set_value(payload.category, payload.value)?;
        }
    }
    Ok(Json(tracker.snapshot()))
}

pub async fn increment(
    State(state): State<AppState>,
    Json(payload): Json<CategoryRequest>,
) -> Result<Json<SessionSnapshot>, AppError> {
    let mut tracker = state.tracker.lock().await;
    tracker.increment(payload.category)?;
    Ok(Json(tracker.snapshot()))
}

pub async fn decrement(
    State(state): State<AppState>,
    Json(payload): Json<CategoryRequest>,
) -> Result<Json<SessionSnapshot>, AppError> {
    let mut tracker = state.tracker.lock().await;
    tracker.decrement(payload.category)?;
    Ok(Json(tracker.snapshot()))
}

pub async fn commit(State(state): State<AppState>) -> Result<Json<SessionSnapshot>, AppError> {
    let mut tracker = state.tracker.lock().await;
    let (date, _) = tracker.commit()?;
    info!(%date, "saved via api");
    Ok(Json(tracker.snapshot()))
}

pub async fn get_calendar(
    State(state): State<AppState>,
    Query(query): Query<CalendarQuery>,
) -> Result<Json<CalendarGrid>, AppError> {
    let month = match query.month.as_deref() {
        Some(raw) => Some(YearMonth::parse(raw).ok_or_else(|| AppError::bad_request("month must be YYYY-MM"))?),
        None => None,
    };
    let grid = state.tracker.lock().await.calendar(month);
    grid.map(Json).ok_or_else(|| AppError::bad_request("month out of range"))
}

pub async fn navigate_month(
    State(state): State<AppState>,
    Json(payload): Json<NavigateRequest>,
) -> Result<Json<CalendarGrid>, AppError> {
    if payload.delta != 1 && payload.delta != -1 {
        return Err(AppError::bad_request("delta must be 1 or -1"));
    }

    let mut tracker = state.tracker.lock().await;
    tracker
        .navigate_month(payload.delta)
        .ok_or_else(|| AppError::bad_request("month out of range"))?;
    tracker
        .calendar(None)
        .map(Json)
        .ok_or_else(|| AppError::bad_request("month out of range"))
}

pub async fn get_dashboard(State(state): State<AppState>) -> Json<Dashboard> {
    Json(state.tracker.lock().await.dashboard())
}

pub async fn get_goals(State(state): State<AppState>) -> Json<GoalTable> {
    Json(state.tracker.lock().await.goals().clone())
}

pub async fn get_history(State(state): State<AppState>) -> Json<HistoryResponse> {
    Json(HistoryResponse {
        days: state.tracker.lock().await.history(),
    })
}
