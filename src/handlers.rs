use crate::coordinator::{Channel, DeskState};
use crate::errors::AppError;
use crate::export::CONTENT_TYPE;
use crate::models::{FilterCriteria, StaffLookupResult};
use crate::state::AppState;
use crate::stats::ShiftSummary;
use crate::view::AttendancePage;
use axum::{
    extract::{Path, Query, State},
    http::{header, StatusCode},
    response::IntoResponse,
    Json,
};
use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct InputRequest {
    #[serde(default)]
    pub value: String,
}

#[derive(Debug, Deserialize)]
pub struct PageRequest {
    pub page: usize,
}

#[derive(Debug, Deserialize)]
pub struct StaffQuery {
    #[serde(default)]
    pub q: String,
}

pub async fn get_attendance(State(state): State<AppState>) -> Json<AttendancePage> {
    Json(state.desk.page().await)
}

pub async fn set_filter(
    State(state): State<AppState>,
    Json(criteria): Json<FilterCriteria>,
) -> Json<AttendancePage> {
    Json(state.desk.set_filter(criteria).await)
}

pub async fn reset_filter(State(state): State<AppState>) -> Json<AttendancePage> {
    Json(state.desk.reset_filter().await)
}

pub async fn set_page(
    State(state): State<AppState>,
    Json(payload): Json<PageRequest>,
) -> Json<AttendancePage> {
    Json(state.desk.set_page(payload.page).await)
}

/// Manual retry. A failure shows up as `stale_error` or an error status in the page.
pub async fn refresh(State(state): State<AppState>) -> Json<AttendancePage> {
    let _ = state.desk.refresh().await;
    Json(state.desk.page().await)
}

pub async fn get_summary(State(state): State<AppState>) -> Json<ShiftSummary> {
    Json(state.desk.summary().await)
}

pub async fn export(State(state): State<AppState>) -> Result<impl IntoResponse, AppError> {
    let (file_name, bytes) = state.desk.export().await?;
    let disposition = format!("attachment; filename=\"{file_name}\"");
    Ok((
        [
            (header::CONTENT_TYPE, CONTENT_TYPE.to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        bytes,
    ))
}

pub async fn check_in_input(
    State(state): State<AppState>,
    Json(payload): Json<InputRequest>,
) -> (StatusCode, Json<DeskState>) {
    apply_input(&state, Channel::CheckIn, &payload.value).await
}

pub async fn check_out_input(
    State(state): State<AppState>,
    Json(payload): Json<InputRequest>,
) -> (StatusCode, Json<DeskState>) {
    apply_input(&state, Channel::CheckOut, &payload.value).await
}

async fn apply_input(
    state: &AppState,
    channel: Channel,
    value: &str,
) -> (StatusCode, Json<DeskState>) {
    state.desk.input(channel, value).await;
    (StatusCode::ACCEPTED, Json(state.desk.desk().await))
}

pub async fn check_in_reset(State(state): State<AppState>) -> Json<DeskState> {
    state.desk.reset_channel(Channel::CheckIn).await;
    Json(state.desk.desk().await)
}

pub async fn check_out_reset(State(state): State<AppState>) -> Json<DeskState> {
    state.desk.reset_channel(Channel::CheckOut).await;
    Json(state.desk.desk().await)
}

pub async fn get_desk(State(state): State<AppState>) -> Json<DeskState> {
    Json(state.desk.desk().await)
}

pub async fn dismiss_toast(State(state): State<AppState>, Path(id): Path<u64>) -> StatusCode {
    if state.desk.dismiss_toast(id).await {
        StatusCode::NO_CONTENT
    } else {
        StatusCode::NOT_FOUND
    }
}

pub async fn search_staff(
    State(state): State<AppState>,
    Query(query): Query<StaffQuery>,
) -> Result<Json<Vec<StaffLookupResult>>, AppError> {
    Ok(Json(state.desk.search_staff(&query.q).await?))
}
