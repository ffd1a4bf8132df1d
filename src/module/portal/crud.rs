use super::error::AppError;
use super::schema::{
    AdminStatsResponse, ChecklistResponse, HealthResponse, LoginRequest, LoginResponse,
    StudentDashboardResponse, UploadPolicyForm, UploadPolicyResponse,
};
use crate::app::AppState;
use crate::infra::STUDENT_LOGIN_TABLE;
use crate::service::checklist_service::{ChecklistError, generate_checklist};
use crate::service::credential_service::classify;
use crate::service::policy_store_service::store_policy;

pub const DEFAULT_UPLOADER: &str = "admin";

pub const STUDENT_DASHBOARD_FEATURES: [&str; 3] = [
    "View personalized checklist",
    "Track deadlines",
    "View risk status",
];

pub fn health(state: &AppState) -> HealthResponse {
    HealthResponse {
        status: "OK".to_string(),
        service: state.config.service_name.clone(),
    }
}

pub async fn login(state: &AppState, req: LoginRequest) -> Result<LoginResponse, AppError> {
    let Some(raw_email) = req.email.as_deref() else {
        return Err(AppError::bad_request(
            "EMAIL_MISSING",
            "Email missing in request",
        ));
    };

    let found = classify(state.infra.tables.as_ref(), raw_email)
        .await
        .map_err(|e| AppError::internal("CREDENTIAL_LOOKUP_FAILED", "Internal server error").with_detail(e))?;

    let Some(record) = found else {
        return Err(AppError::not_found("USER_NOT_FOUND", "User not found"));
    };

    Ok(LoginResponse {
        success: true,
        role: record.role,
        email: record.email,
        message: "Login successful".to_string(),
    })
}

pub async fn admin_stats(state: &AppState) -> Result<AdminStatsResponse, AppError> {
    let total_students = state
        .infra
        .tables
        .count_rows(STUDENT_LOGIN_TABLE)
        .await
        .map_err(|e| {
            AppError::internal("STATS_QUERY_FAILED", "Failed to fetch admin stats").with_detail(e)
        })?;

    Ok(AdminStatsResponse {
        success: true,
        total_students,
    })
}

pub fn student_dashboard() -> StudentDashboardResponse {
    StudentDashboardResponse {
        page: "Student Dashboard".to_string(),
        features: STUDENT_DASHBOARD_FEATURES
            .iter()
            .map(|f| f.to_string())
            .collect(),
    }
}

pub async fn upload_policy(
    state: &AppState,
    form: UploadPolicyForm,
) -> Result<UploadPolicyResponse, AppError> {
    let (Some(file_name), Some(bytes)) = (form.file_name, form.bytes) else {
        return Err(AppError::bad_request("FILE_MISSING", "No file uploaded"));
    };
    let uploaded_by = form
        .uploaded_by
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .unwrap_or(DEFAULT_UPLOADER);

    let stored = store_policy(
        &state.infra,
        &state.config.policy_prefix,
        &file_name,
        bytes,
        uploaded_by,
    )
    .await
    .map_err(|e| AppError::internal("POLICY_UPLOAD_FAILED", "Upload failed").with_detail(e))?;

    Ok(UploadPolicyResponse {
        success: true,
        message: "Policy uploaded successfully".to_string(),
        file_url: stored.file_url,
    })
}

pub async fn checklist(state: &AppState) -> Result<ChecklistResponse, AppError> {
    let checklist = generate_checklist(&state.infra).await.map_err(|e| match e {
        ChecklistError::NoPolicies => AppError::not_found("NO_POLICIES", "No policies found"),
        other => AppError::internal("CHECKLIST_GENERATION_FAILED", "Failed to generate checklist")
            .with_detail(other),
    })?;

    Ok(ChecklistResponse {
        success: true,
        checklist,
    })
}
