use crate::infra::{InfraClients, InfraError, PDF_CONTENT_TYPE};
use crate::module::portal::model::NewPolicyDocument;
use thiserror::Error;
use tracing::{info, warn};
use unicode_normalization::UnicodeNormalization;
use uuid::Uuid;

pub const POLICY_DESCRIPTION: &str = "Uploaded policy document";

const WINDOWS_DEVICE_NAMES: [&str; 22] = [
    "CON", "PRN", "AUX", "NUL", "COM1", "COM2", "COM3", "COM4", "COM5", "COM6", "COM7", "COM8",
    "COM9", "LPT1", "LPT2", "LPT3", "LPT4", "LPT5", "LPT6", "LPT7", "LPT8", "LPT9",
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredPolicy {
    pub policy_name: String,
    pub object_key: String,
    pub file_url: String,
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("object upload failed for {object_key}: {source}")]
    Upload {
        object_key: String,
        source: InfraError,
    },

    #[error("metadata insert failed for {object_key} (blob removed: {compensated}): {source}")]
    Metadata {
        object_key: String,
        compensated: bool,
        source: InfraError,
    },
}

/// Reduces a client-supplied file name to `[A-Za-z0-9_.-]` so it is safe as a storage key.
/// Compatibility decomposition runs first, so accented letters keep their base letter.
pub fn secure_filename(raw: &str) -> String {
    let ascii: String = raw
        .nfkd()
        .filter(char::is_ascii)
        .map(|c| if c == '/' || c == '\\' { ' ' } else { c })
        .collect();
    let joined = ascii.split_whitespace().collect::<Vec<_>>().join("_");
    let kept: String = joined
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '.' | '-'))
        .collect();
    let trimmed = kept.trim_matches(|c| c == '.' || c == '_');

    let stem = trimmed.split('.').next().unwrap_or_default().to_ascii_uppercase();
    if WINDOWS_DEVICE_NAMES.contains(&stem.as_str()) {
        return format!("_{trimmed}");
    }
    trimmed.to_string()
}

pub fn object_key(prefix: &str, file_name: &str) -> String {
    let prefix = prefix.trim_matches('/');
    if prefix.is_empty() {
        return file_name.to_string();
    }
    format!("{prefix}/{file_name}")
}

/// Writes the blob, then the metadata row. A failed metadata insert triggers a
/// best-effort delete of the blob written in the first step.
pub async fn store_policy(
    infra: &InfraClients,
    prefix: &str,
    raw_file_name: &str,
    bytes: Vec<u8>,
    uploaded_by: &str,
) -> Result<StoredPolicy, StoreError> {
    let mut policy_name = secure_filename(raw_file_name);
    if policy_name.is_empty() {
        policy_name = format!("policy-{}.pdf", Uuid::new_v4());
    }
    let object_key = object_key(prefix, &policy_name);

    infra
        .blobs
        .upload(&object_key, bytes, PDF_CONTENT_TYPE)
        .await
        .map_err(|source| StoreError::Upload {
            object_key: object_key.clone(),
            source,
        })?;

    let file_url = infra.blobs.public_url(&object_key);
    let row = NewPolicyDocument {
        policy_name: policy_name.clone(),
        description: POLICY_DESCRIPTION.to_string(),
        file_url: file_url.clone(),
        uploaded_by: uploaded_by.to_string(),
    };

    if let Err(source) = infra.tables.insert_policy(&row).await {
        let compensated = match infra.blobs.remove(&object_key).await {
            Ok(()) => true,
            Err(e) => {
                warn!(error = %e, object_key = %object_key, "orphaned policy blob left in storage");
                false
            }
        };
        return Err(StoreError::Metadata {
            object_key,
            compensated,
            source,
        });
    }

    info!(object_key = %object_key, uploaded_by = %uploaded_by, "policy stored");
    Ok(StoredPolicy {
        policy_name,
        object_key,
        file_url,
    })
}
