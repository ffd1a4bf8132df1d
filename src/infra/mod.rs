pub mod document_fetch;
pub mod gemini;
pub mod memory;
pub mod supabase;

use crate::config::db::{GeminiConfig, HttpClientConfig, SupabaseConfig};
use crate::module::portal::model::{NewPolicyDocument, PolicyDocumentRecord};
use async_trait::async_trait;
use document_fetch::HttpDocumentFetcher;
use gemini::GeminiClient;
use std::fmt;
use std::sync::Arc;
use supabase::SupabaseClient;
use thiserror::Error;

pub const ADMIN_LOGIN_TABLE: &str = "admin_login";
pub const STUDENT_LOGIN_TABLE: &str = "student_login";
pub const ADMIN_POLICIES_TABLE: &str = "admin_policies";

pub const PDF_CONTENT_TYPE: &str = "application/pdf";

#[derive(Debug, Error)]
pub enum InfraError {
    #[error("client init failed: {0}")]
    Init(String),

    #[error("{service} request failed: {reason}")]
    Request {
        service: &'static str,
        reason: String,
    },

    #[error("{service} returned status {status}: {body}")]
    Status {
        service: &'static str,
        status: u16,
        body: String,
    },

    #[error("{service} payload decode failed: {reason}")]
    Decode {
        service: &'static str,
        reason: String,
    },
}

/// Table-style store holding the credential tables and policy metadata.
#[async_trait]
pub trait TableStore: Send + Sync {
    fn backend_tag(&self) -> &'static str;

    async fn email_exists(&self, table: &str, email: &str) -> Result<bool, InfraError>;

    async fn count_rows(&self, table: &str) -> Result<u64, InfraError>;

    async fn insert_policy(&self, row: &NewPolicyDocument) -> Result<(), InfraError>;

    async fn list_policies(&self) -> Result<Vec<PolicyDocumentRecord>, InfraError>;
}

#[async_trait]
pub trait BlobStore: Send + Sync {
    async fn upload(&self, key: &str, bytes: Vec<u8>, content_type: &str)
        -> Result<(), InfraError>;

    fn public_url(&self, key: &str) -> String;

    async fn remove(&self, key: &str) -> Result<(), InfraError>;
}

#[async_trait]
pub trait DocumentFetcher: Send + Sync {
    async fn fetch(&self, url: &str) -> Result<Vec<u8>, InfraError>;
}

#[async_trait]
pub trait TextGenerator: Send + Sync {
    async fn generate(&self, prompt: &str) -> Result<String, InfraError>;
}

#[derive(Clone)]
pub struct InfraClients {
    pub tables: Arc<dyn TableStore>,
    pub blobs: Arc<dyn BlobStore>,
    pub fetcher: Arc<dyn DocumentFetcher>,
    pub generator: Arc<dyn TextGenerator>,
}

impl fmt::Debug for InfraClients {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InfraClients")
            .field("tables", &self.tables.backend_tag())
            .finish_non_exhaustive()
    }
}

pub fn init_infra(
    supabase: &SupabaseConfig,
    gemini: &GeminiConfig,
    http: &HttpClientConfig,
) -> Result<InfraClients, InfraError> {
    let store = Arc::new(SupabaseClient::new(supabase, http)?);
    let fetcher = HttpDocumentFetcher::new(http)?;
    let generator = GeminiClient::new(gemini, http)?;

    Ok(InfraClients {
        tables: store.clone(),
        blobs: store,
        fetcher: Arc::new(fetcher),
        generator: Arc::new(generator),
    })
}

pub(crate) fn build_http_client(http: &HttpClientConfig) -> Result<reqwest::Client, InfraError> {
    let mut builder = reqwest::Client::builder();
    if let Some(timeout) = http.timeout {
        builder = builder.timeout(timeout);
    }
    builder
        .build()
        .map_err(|e| InfraError::Init(format!("failed to build http client: {e}")))
}
