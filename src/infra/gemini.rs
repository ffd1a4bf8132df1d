use super::{InfraError, TextGenerator, build_http_client};
use crate::config::db::{GeminiConfig, HttpClientConfig};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

const SERVICE: &str = "gemini";

/// Client for the hosted `generateContent` endpoint.
pub struct GeminiClient {
    http: Client,
    endpoint: String,
    api_key: String,
}

#[derive(Debug, Serialize)]
struct GenerateContentRequest<'a> {
    contents: Vec<Content<'a>>,
}

#[derive(Debug, Serialize)]
struct Content<'a> {
    parts: Vec<RequestPart<'a>>,
}

#[derive(Debug, Serialize)]
struct RequestPart<'a> {
    text: &'a str,
}

#[derive(Debug, Deserialize)]
pub struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Debug, Deserialize)]
struct ResponsePart {
    text: Option<String>,
}

impl GeminiClient {
    pub fn new(config: &GeminiConfig, http: &HttpClientConfig) -> Result<Self, InfraError> {
        Ok(Self {
            http: build_http_client(http)?,
            endpoint: format!(
                "{}/v1beta/models/{}:generateContent",
                config.base_url, config.model
            ),
            api_key: config.api_key.clone(),
        })
    }
}

#[async_trait]
impl TextGenerator for GeminiClient {
    #[instrument(name = "gemini_generate", skip(self, prompt), fields(prompt_chars = prompt.len()))]
    async fn generate(&self, prompt: &str) -> Result<String, InfraError> {
        let body = GenerateContentRequest {
            contents: vec![Content {
                parts: vec![RequestPart { text: prompt }],
            }],
        };

        let resp = self
            .http
            .post(&self.endpoint)
            .header("x-goog-api-key", &self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| InfraError::Request {
                service: SERVICE,
                reason: e.to_string(),
            })?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(InfraError::Status {
                service: SERVICE,
                status: status.as_u16(),
                body,
            });
        }

        let payload = resp
            .json::<GenerateContentResponse>()
            .await
            .map_err(|e| InfraError::Decode {
                service: SERVICE,
                reason: e.to_string(),
            })?;
        let text = first_candidate_text(&payload)?;
        debug!(response_chars = text.len(), "gemini response received");
        Ok(text)
    }
}

/// Joins the text parts of the first candidate; a candidate without text is an error.
pub fn first_candidate_text(payload: &GenerateContentResponse) -> Result<String, InfraError> {
    let parts = payload
        .candidates
        .first()
        .and_then(|c| c.content.as_ref())
        .map(|c| {
            c.parts
                .iter()
                .filter_map(|p| p.text.as_deref())
                .collect::<Vec<_>>()
        })
        .unwrap_or_default();

    if parts.is_empty() {
        return Err(InfraError::Decode {
            service: SERVICE,
            reason: "response carried no text candidate".to_string(),
        });
    }
    Ok(parts.concat())
}
