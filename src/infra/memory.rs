use super::{
    ADMIN_POLICIES_TABLE, BlobStore, DocumentFetcher, InfraClients, InfraError, TableStore,
    TextGenerator,
};
use crate::module::portal::model::{NewPolicyDocument, PolicyDocumentRecord};
use async_trait::async_trait;
use chrono::Utc;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::Mutex;

const BASE_URL: &str = "memory://campus";

/// In-process stand-in for every external collaborator, used by the test suite.
/// Holds credential tables, policy metadata, objects, hosted documents and the
/// canned generator reply.
pub struct MemoryBackend {
    bucket: String,
    tables: Mutex<HashMap<String, Vec<String>>>,
    policies: Mutex<Vec<PolicyDocumentRecord>>,
    objects: Mutex<HashMap<String, Vec<u8>>>,
    documents: Mutex<HashMap<String, Vec<u8>>>,
    prompts: Mutex<Vec<String>>,
    reply: Mutex<String>,
    pub fail_reads: AtomicBool,
    pub fail_insert: AtomicBool,
    pub fail_upload: AtomicBool,
    pub fail_remove: AtomicBool,
    pub fail_generate: AtomicBool,
    pub fetch_calls: AtomicU64,
    pub generate_calls: AtomicU64,
}

impl Default for MemoryBackend {
    fn default() -> Self {
        Self {
            bucket: "policies".to_string(),
            tables: Mutex::new(HashMap::new()),
            policies: Mutex::new(Vec::new()),
            objects: Mutex::new(HashMap::new()),
            documents: Mutex::new(HashMap::new()),
            prompts: Mutex::new(Vec::new()),
            reply: Mutex::new("- Review the uploaded policies".to_string()),
            fail_reads: AtomicBool::new(false),
            fail_insert: AtomicBool::new(false),
            fail_upload: AtomicBool::new(false),
            fail_remove: AtomicBool::new(false),
            fail_generate: AtomicBool::new(false),
            fetch_calls: AtomicU64::new(0),
            generate_calls: AtomicU64::new(0),
        }
    }
}

impl MemoryBackend {
    pub fn clients(self: &Arc<Self>) -> InfraClients {
        InfraClients {
            tables: self.clone(),
            blobs: self.clone(),
            fetcher: self.clone(),
            generator: self.clone(),
        }
    }

    pub async fn add_email(&self, table: &str, email: &str) {
        self.tables
            .lock()
            .await
            .entry(table.to_string())
            .or_default()
            .push(email.to_string());
    }

    /// Adds a metadata row and serves `bytes` at its `file_url`.
    pub async fn seed_policy(&self, record: PolicyDocumentRecord, bytes: Vec<u8>) {
        self.documents
            .lock()
            .await
            .insert(record.file_url.clone(), bytes);
        self.policies.lock().await.push(record);
    }

    /// Adds a metadata row without hosting anything at its `file_url`.
    pub async fn add_policy_row(&self, record: PolicyDocumentRecord) {
        self.policies.lock().await.push(record);
    }

    pub async fn set_reply(&self, reply: &str) {
        *self.reply.lock().await = reply.to_string();
    }

    pub async fn policies(&self) -> Vec<PolicyDocumentRecord> {
        self.policies.lock().await.clone()
    }

    pub async fn object(&self, key: &str) -> Option<Vec<u8>> {
        self.objects.lock().await.get(key).cloned()
    }

    pub async fn object_count(&self) -> usize {
        self.objects.lock().await.len()
    }

    pub async fn prompts(&self) -> Vec<String> {
        self.prompts.lock().await.clone()
    }

    fn check(flag: &AtomicBool, what: &'static str) -> Result<(), InfraError> {
        if flag.load(Ordering::SeqCst) {
            return Err(InfraError::Request {
                service: "memory",
                reason: format!("{what} switched to fail"),
            });
        }
        Ok(())
    }
}

#[async_trait]
impl TableStore for MemoryBackend {
    fn backend_tag(&self) -> &'static str {
        "memory"
    }

    async fn email_exists(&self, table: &str, email: &str) -> Result<bool, InfraError> {
        Self::check(&self.fail_reads, "table read")?;
        Ok(self
            .tables
            .lock()
            .await
            .get(table)
            .is_some_and(|rows| rows.iter().any(|e| e == email)))
    }

    async fn count_rows(&self, table: &str) -> Result<u64, InfraError> {
        Self::check(&self.fail_reads, "table read")?;
        if table == ADMIN_POLICIES_TABLE {
            return Ok(self.policies.lock().await.len() as u64);
        }
        Ok(self
            .tables
            .lock()
            .await
            .get(table)
            .map_or(0, |rows| rows.len() as u64))
    }

    async fn insert_policy(&self, row: &NewPolicyDocument) -> Result<(), InfraError> {
        Self::check(&self.fail_insert, "policy insert")?;
        self.policies.lock().await.push(PolicyDocumentRecord {
            policy_name: row.policy_name.clone(),
            description: Some(row.description.clone()),
            file_url: row.file_url.clone(),
            uploaded_by: Some(row.uploaded_by.clone()),
            created_at: Some(Utc::now()),
        });
        Ok(())
    }

    async fn list_policies(&self) -> Result<Vec<PolicyDocumentRecord>, InfraError> {
        Self::check(&self.fail_reads, "table read")?;
        Ok(self.policies.lock().await.clone())
    }
}

#[async_trait]
impl BlobStore for MemoryBackend {
    async fn upload(
        &self,
        key: &str,
        bytes: Vec<u8>,
        _content_type: &str,
    ) -> Result<(), InfraError> {
        Self::check(&self.fail_upload, "object upload")?;
        let mut objects = self.objects.lock().await;
        if objects.contains_key(key) {
            return Err(InfraError::Status {
                service: "memory",
                status: 409,
                body: format!("object already exists: {key}"),
            });
        }
        objects.insert(key.to_string(), bytes);
        Ok(())
    }

    fn public_url(&self, key: &str) -> String {
        format!("{BASE_URL}/storage/v1/object/public/{}/{key}", self.bucket)
    }

    async fn remove(&self, key: &str) -> Result<(), InfraError> {
        Self::check(&self.fail_remove, "object remove")?;
        self.objects.lock().await.remove(key);
        Ok(())
    }
}

#[async_trait]
impl DocumentFetcher for MemoryBackend {
    async fn fetch(&self, url: &str) -> Result<Vec<u8>, InfraError> {
        self.fetch_calls.fetch_add(1, Ordering::SeqCst);
        if let Some(bytes) = self.documents.lock().await.get(url) {
            return Ok(bytes.clone());
        }
        let prefix = self.public_url("");
        let stored = match url.strip_prefix(&prefix) {
            Some(key) => self.objects.lock().await.get(key).cloned(),
            None => None,
        };
        stored.ok_or_else(|| InfraError::Status {
            service: "memory",
            status: 404,
            body: format!("url={url}"),
        })
    }
}

#[async_trait]
impl TextGenerator for MemoryBackend {
    async fn generate(&self, prompt: &str) -> Result<String, InfraError> {
        self.generate_calls.fetch_add(1, Ordering::SeqCst);
        Self::check(&self.fail_generate, "generation")?;
        self.prompts.lock().await.push(prompt.to_string());
        Ok(self.reply.lock().await.clone())
    }
}
