use super::model::Role;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Login body. Only a JSON object carrying a string `email` yields an email;
/// arrays, scalars and unparsable bodies all read as missing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoginRequest {
    pub email: Option<String>,
}

impl LoginRequest {
    pub fn from_body(body: &[u8]) -> Self {
        let email = match serde_json::from_slice::<Value>(body) {
            Ok(Value::Object(fields)) => fields
                .get("email")
                .and_then(Value::as_str)
                .map(ToOwned::to_owned),
            _ => None,
        };
        Self { email }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LoginResponse {
    pub success: bool,
    pub role: Role,
    pub email: String,
    pub message: String,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub service: String,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AdminStatsResponse {
    pub success: bool,
    pub total_students: u64,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StudentDashboardResponse {
    pub page: String,
    pub features: Vec<String>,
}

/// Parsed multipart upload. `file_name`/`bytes` are `None` when no usable file part was sent.
#[derive(Debug, Clone, Default)]
pub struct UploadPolicyForm {
    pub file_name: Option<String>,
    pub bytes: Option<Vec<u8>>,
    pub uploaded_by: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct UploadPolicyResponse {
    pub success: bool,
    pub message: String,
    pub file_url: String,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ChecklistResponse {
    pub success: bool,
    pub checklist: String,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ErrorResponse {
    pub success: bool,
    pub message: String,
}
