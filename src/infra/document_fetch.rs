use super::{DocumentFetcher, InfraError, build_http_client};
use crate::config::db::HttpClientConfig;
use async_trait::async_trait;
use reqwest::Client;
use tracing::instrument;

const SERVICE: &str = "document-fetch";

pub struct HttpDocumentFetcher {
    http: Client,
}

impl HttpDocumentFetcher {
    pub fn new(http: &HttpClientConfig) -> Result<Self, InfraError> {
        Ok(Self {
            http: build_http_client(http)?,
        })
    }
}

#[async_trait]
impl DocumentFetcher for HttpDocumentFetcher {
    #[instrument(name = "fetch_document", skip(self))]
    async fn fetch(&self, url: &str) -> Result<Vec<u8>, InfraError> {
        let resp = self
            .http
            .get(url)
            .send()
            .await
            .map_err(|e| InfraError::Request {
                service: SERVICE,
                reason: e.to_string(),
            })?;

        if !resp.status().is_success() {
            return Err(InfraError::Status {
                service: SERVICE,
                status: resp.status().as_u16(),
                body: format!("url={url}"),
            });
        }

        resp.bytes()
            .await
            .map(|b| b.to_vec())
            .map_err(|e| InfraError::Decode {
                service: SERVICE,
                reason: format!("read body failed: {e}"),
            })
    }
}
