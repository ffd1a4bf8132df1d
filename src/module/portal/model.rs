use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    Student,
}

impl Role {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Admin => "admin",
            Self::Student => "student",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CredentialRecord {
    pub email: String,
    pub role: Role,
}

/// Row written to the policy metadata table on upload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewPolicyDocument {
    pub policy_name: String,
    pub description: String,
    pub file_url: String,
    pub uploaded_by: String,
}

/// Row read back from the policy metadata table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PolicyDocumentRecord {
    pub policy_name: String,
    #[serde(default)]
    pub description: Option<String>,
    pub file_url: String,
    #[serde(default)]
    pub uploaded_by: Option<String>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}
