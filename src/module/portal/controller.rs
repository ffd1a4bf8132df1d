use super::crud;
use super::error::AppError;
use super::schema::{ErrorResponse, LoginRequest, UploadPolicyForm};
use crate::app::AppState;
use axum::Json;
use axum::body::Bytes;
use axum::extract::State;
use axum::extract::multipart::{Multipart, MultipartRejection};
use axum::response::{IntoResponse, Response};
use tracing::{error, info, warn};

pub async fn health(State(state): State<AppState>) -> impl IntoResponse {
    (axum::http::StatusCode::OK, Json(crud::health(&state)))
}

pub async fn login(State(state): State<AppState>, body: Bytes) -> Response {
    match crud::login(&state, LoginRequest::from_body(&body)).await {
        Ok(resp) => {
            info!(role = resp.role.as_str(), "login accepted");
            (axum::http::StatusCode::OK, Json(resp)).into_response()
        }
        Err(err) => error_response(err, "login"),
    }
}

pub async fn admin_stats(State(state): State<AppState>) -> Response {
    match crud::admin_stats(&state).await {
        Ok(resp) => (axum::http::StatusCode::OK, Json(resp)).into_response(),
        Err(err) => error_response(err, "admin_stats"),
    }
}

pub async fn student_dashboard() -> impl IntoResponse {
    (axum::http::StatusCode::OK, Json(crud::student_dashboard()))
}

pub async fn upload_policy(
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Response {
    let form = match multipart {
        Ok(multipart) => match read_upload_form(multipart).await {
            Ok(form) => form,
            Err(err) => return error_response(err, "upload_policy"),
        },
        Err(rejection) => {
            warn!(reason = %rejection, "upload request is not multipart");
            UploadPolicyForm::default()
        }
    };

    match crud::upload_policy(&state, form).await {
        Ok(resp) => {
            info!(file_url = %resp.file_url, "policy upload accepted");
            (axum::http::StatusCode::OK, Json(resp)).into_response()
        }
        Err(err) => error_response(err, "upload_policy"),
    }
}

pub async fn checklist(State(state): State<AppState>) -> Response {
    match crud::checklist(&state).await {
        Ok(resp) => (axum::http::StatusCode::OK, Json(resp)).into_response(),
        Err(err) => error_response(err, "checklist"),
    }
}

async fn read_upload_form(mut multipart: Multipart) -> Result<UploadPolicyForm, AppError> {
    let mut form = UploadPolicyForm::default();
    while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
        let name = field.name().map(ToOwned::to_owned);
        match name.as_deref() {
            Some("file") if form.bytes.is_none() => {
                let file_name = field
                    .file_name()
                    .map(ToOwned::to_owned)
                    .filter(|n| !n.is_empty());
                let bytes = field.bytes().await.map_err(multipart_error)?;
                if file_name.is_some() {
                    form.file_name = file_name;
                    form.bytes = Some(bytes.to_vec());
                }
            }
            Some("uploaded_by") => {
                form.uploaded_by = Some(field.text().await.map_err(multipart_error)?);
            }
            _ => {}
        }
    }
    Ok(form)
}

fn multipart_error(e: axum::extract::multipart::MultipartError) -> AppError {
    AppError::internal("MULTIPART_READ_FAILED", "Upload failed").with_detail(e)
}

fn error_response(err: AppError, operation: &'static str) -> Response {
    let detail = err.detail.as_deref().unwrap_or_default();
    if err.status.is_server_error() {
        error!(operation, error_code = err.code, detail = %detail, "request failed");
    } else {
        warn!(operation, error_code = err.code, reason = %err.message, "request rejected");
    }
    (
        err.status,
        Json(ErrorResponse {
            success: false,
            message: err.message,
        }),
    )
        .into_response()
}
