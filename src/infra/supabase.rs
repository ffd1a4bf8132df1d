use super::{ADMIN_POLICIES_TABLE, BlobStore, InfraError, TableStore, build_http_client};
use crate::config::db::{HttpClientConfig, SupabaseConfig};
use crate::module::portal::model::{NewPolicyDocument, PolicyDocumentRecord};
use async_trait::async_trait;
use reqwest::header::{AUTHORIZATION, CONTENT_RANGE, CONTENT_TYPE, HeaderMap, HeaderValue};
use reqwest::{Client, Response};
use serde_json::Value;
use tracing::instrument;

const SERVICE: &str = "supabase";
const POLICY_COLUMNS: &str = "policy_name,description,file_url,uploaded_by,created_at";

/// PostgREST table API and Storage object API of a single Supabase project.
pub struct SupabaseClient {
    http: Client,
    base_url: String,
    bucket: String,
    headers: HeaderMap,
}

impl SupabaseClient {
    pub fn new(config: &SupabaseConfig, http: &HttpClientConfig) -> Result<Self, InfraError> {
        Ok(Self {
            http: build_http_client(http)?,
            base_url: config.url.clone(),
            bucket: config.bucket.clone(),
            headers: auth_headers(&config.key)?,
        })
    }

    fn table_url(&self, table: &str) -> String {
        format!("{}/rest/v1/{table}", self.base_url)
    }

    fn object_url(&self, key: &str) -> String {
        format!("{}/storage/v1/object/{}/{key}", self.base_url, self.bucket)
    }
}

#[async_trait]
impl TableStore for SupabaseClient {
    fn backend_tag(&self) -> &'static str {
        SERVICE
    }

    #[instrument(name = "supabase_email_exists", skip(self, email))]
    async fn email_exists(&self, table: &str, email: &str) -> Result<bool, InfraError> {
        let resp = self
            .http
            .get(self.table_url(table))
            .headers(self.headers.clone())
            .query(&[("select", "email".to_string()), ("email", format!("eq.{email}"))])
            .send()
            .await
            .map_err(request_error)?;
        let rows = ensure_success(resp)
            .await?
            .json::<Vec<Value>>()
            .await
            .map_err(decode_error)?;
        Ok(!rows.is_empty())
    }

    #[instrument(name = "supabase_count_rows", skip(self))]
    async fn count_rows(&self, table: &str) -> Result<u64, InfraError> {
        let resp = self
            .http
            .get(self.table_url(table))
            .headers(self.headers.clone())
            .header("Prefer", "count=exact")
            .query(&[("select", "id"), ("limit", "0")])
            .send()
            .await
            .map_err(request_error)?;
        let resp = ensure_success(resp).await?;
        let content_range = resp
            .headers()
            .get(CONTENT_RANGE)
            .and_then(|v| v.to_str().ok())
            .ok_or_else(|| InfraError::Decode {
                service: SERVICE,
                reason: "missing content-range header".to_string(),
            })?;
        parse_content_range_total(content_range)
    }

    #[instrument(name = "supabase_insert_policy", skip(self, row), fields(policy_name = %row.policy_name))]
    async fn insert_policy(&self, row: &NewPolicyDocument) -> Result<(), InfraError> {
        let resp = self
            .http
            .post(self.table_url(ADMIN_POLICIES_TABLE))
            .headers(self.headers.clone())
            .header("Prefer", "return=minimal")
            .json(row)
            .send()
            .await
            .map_err(request_error)?;
        ensure_success(resp).await?;
        Ok(())
    }

    #[instrument(name = "supabase_list_policies", skip(self))]
    async fn list_policies(&self) -> Result<Vec<PolicyDocumentRecord>, InfraError> {
        let resp = self
            .http
            .get(self.table_url(ADMIN_POLICIES_TABLE))
            .headers(self.headers.clone())
            .query(&[("select", POLICY_COLUMNS), ("order", "created_at.asc")])
            .send()
            .await
            .map_err(request_error)?;
        ensure_success(resp)
            .await?
            .json::<Vec<PolicyDocumentRecord>>()
            .await
            .map_err(decode_error)
    }
}

#[async_trait]
impl BlobStore for SupabaseClient {
    #[instrument(name = "supabase_upload_object", skip(self, bytes), fields(size = bytes.len()))]
    async fn upload(
        &self,
        key: &str,
        bytes: Vec<u8>,
        content_type: &str,
    ) -> Result<(), InfraError> {
        let resp = self
            .http
            .post(self.object_url(key))
            .headers(self.headers.clone())
            .header(CONTENT_TYPE, content_type)
            .body(bytes)
            .send()
            .await
            .map_err(request_error)?;
        ensure_success(resp).await?;
        Ok(())
    }

    fn public_url(&self, key: &str) -> String {
        format!(
            "{}/storage/v1/object/public/{}/{key}",
            self.base_url, self.bucket
        )
    }

    #[instrument(name = "supabase_remove_object", skip(self))]
    async fn remove(&self, key: &str) -> Result<(), InfraError> {
        let resp = self
            .http
            .delete(self.object_url(key))
            .headers(self.headers.clone())
            .send()
            .await
            .map_err(request_error)?;
        ensure_success(resp).await?;
        Ok(())
    }
}

fn auth_headers(key: &str) -> Result<HeaderMap, InfraError> {
    let api_key = HeaderValue::from_str(key)
        .map_err(|e| InfraError::Init(format!("invalid SUPABASE_KEY header value: {e}")))?;
    let bearer = HeaderValue::from_str(&format!("Bearer {key}"))
        .map_err(|e| InfraError::Init(format!("invalid SUPABASE_KEY header value: {e}")))?;
    let mut headers = HeaderMap::new();
    headers.insert("apikey", api_key);
    headers.insert(AUTHORIZATION, bearer);
    Ok(headers)
}

async fn ensure_success(resp: Response) -> Result<Response, InfraError> {
    let status = resp.status();
    if status.is_success() {
        return Ok(resp);
    }
    let body = resp.text().await.unwrap_or_default();
    Err(InfraError::Status {
        service: SERVICE,
        status: status.as_u16(),
        body,
    })
}

fn request_error(e: reqwest::Error) -> InfraError {
    InfraError::Request {
        service: SERVICE,
        reason: e.to_string(),
    }
}

fn decode_error(e: reqwest::Error) -> InfraError {
    InfraError::Decode {
        service: SERVICE,
        reason: e.to_string(),
    }
}

/// Total row count from a PostgREST `Content-Range` header (`0-24/25`, `*/0`).
pub fn parse_content_range_total(value: &str) -> Result<u64, InfraError> {
    value
        .rsplit_once('/')
        .and_then(|(_, total)| total.trim().parse::<u64>().ok())
        .ok_or_else(|| InfraError::Decode {
            service: SERVICE,
            reason: format!("unexpected content-range: {value}"),
        })
}
