use crate::handlers;
use crate::state::AppState;
use axum::{routing::{get, post}, Router};

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/api/attendance", get(handlers::get_attendance))
        .route("/api/attendance/filter", post(handlers::set_filter))
        .route("/api/attendance/filter/reset", post(handlers::reset_filter))
        .route("/api/attendance/page", post(handlers::set_page))
        .route("/api/attendance/refresh", post(handlers::refresh))
        .route("/api/attendance/summary", get(handlers::get_summary))
        .route("/api/attendance/export", get(handlers::export))
        .route("/api/check-in/input", post(handlers::check_in_input))
        .route("/api/check-out/input", post(handlers::check_out_input))
        .route("/api/check-in/reset", post(handlers::check_in_reset))
        .route("/api/check-out/reset", post(handlers::check_out_reset))
        .route("/api/desk", get(handlers::get_desk))
        .route("/api/toasts/:id/dismiss", post(handlers::dismiss_toast))
        .route("/api/staff", get(handlers::search_staff))
        .with_state(state)
}
