use super::controller;
use crate::app::AppState;
use axum::Router;
use axum::routing::{get, post};

pub fn register_routes(state: AppState) -> Router {
    Router::new()
        .route("/", get(controller::health))
        .route("/login", post(controller::login))
        .route("/admin/stats", get(controller::admin_stats))
        .route("/admin/upload-policy", post(controller::upload_policy))
        .route("/student/dashboard", get(controller::student_dashboard))
        .route("/ai/checklist", get(controller::checklist))
        .with_state(state)
}
