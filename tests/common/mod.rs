#![allow(dead_code)]

use axum::body::{Body, to_bytes};
use campus_gateway::app::{AppState, build_router};
use campus_gateway::config::environment::AppConfig;
use campus_gateway::infra::memory::MemoryBackend;
use campus_gateway::module::portal::model::PolicyDocumentRecord;
use chrono::{TimeZone, Utc};
use http::Request;
use serde_json::Value;
use std::sync::Arc;
use tower::util::ServiceExt;

pub const BOUNDARY: &str = "campus-test-boundary";

pub fn test_config() -> AppConfig {
    AppConfig {
        rust_env: "test".to_string(),
        api_host: "127.0.0.1".to_string(),
        api_port: 0,
        service_name: "CampusAI Backend".to_string(),
        supabase_url: None,
        supabase_key: None,
        gemini_api_key: None,
        gemini_model: "gemini-1.5-flash".to_string(),
        gemini_base_url: "http://127.0.0.1:9".to_string(),
        policy_bucket: "policies".to_string(),
        policy_prefix: "policies".to_string(),
        max_upload_bytes: 1024 * 1024,
        outbound_timeout_seconds: None,
        cors_allowed_origins: vec![],
    }
}

pub fn build_app() -> (axum::Router, Arc<MemoryBackend>) {
    let backend = Arc::new(MemoryBackend::default());
    let app = build_router(AppState::new(test_config(), backend.clients()));
    (app, backend)
}

pub async fn send(app: &axum::Router, request: Request<Body>) -> (http::StatusCode, Value) {
    let response = app.clone().oneshot(request).await.expect("request failed");
    let status = response.status();
    let body = to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("read body");
    let payload = serde_json::from_slice(&body).expect("deserialize response");
    (status, payload)
}

pub async fn get(app: &axum::Router, uri: &str) -> (http::StatusCode, Value) {
    let request = Request::builder()
        .method("GET")
        .uri(uri)
        .body(Body::empty())
        .expect("build request");
    send(app, request).await
}

pub async fn post_raw(
    app: &axum::Router,
    uri: &str,
    content_type: Option<&str>,
    body: Vec<u8>,
) -> (http::StatusCode, Value) {
    let mut builder = Request::builder().method("POST").uri(uri);
    if let Some(ct) = content_type {
        builder = builder.header("content-type", ct);
    }
    let request = builder.body(Body::from(body)).expect("build request");
    send(app, request).await
}

pub async fn post_json(app: &axum::Router, uri: &str, body: &Value) -> (http::StatusCode, Value) {
    post_raw(
        app,
        uri,
        Some("application/json"),
        serde_json::to_vec(body).expect("serialize request"),
    )
    .await
}

pub enum Part<'a> {
    File {
        name: &'a str,
        file_name: &'a str,
        bytes: &'a [u8],
    },
    Text {
        name: &'a str,
        value: &'a str,
    },
}

pub fn multipart_body(parts: &[Part<'_>]) -> Vec<u8> {
    let mut body = Vec::new();
    for part in parts {
        body.extend_from_slice(format!("--{BOUNDARY}\r\n").as_bytes());
        match part {
            Part::File {
                name,
                file_name,
                bytes,
            } => {
                body.extend_from_slice(
                    format!(
                        "Content-Disposition: form-data; name=\"{name}\"; filename=\"{file_name}\"\r\n\
                         Content-Type: application/pdf\r\n\r\n"
                    )
                    .as_bytes(),
                );
                body.extend_from_slice(bytes);
            }
            Part::Text { name, value } => {
                body.extend_from_slice(
                    format!("Content-Disposition: form-data; name=\"{name}\"\r\n\r\n{value}")
                        .as_bytes(),
                );
            }
        }
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());
    body
}

pub async fn post_multipart(
    app: &axum::Router,
    uri: &str,
    parts: &[Part<'_>],
) -> (http::StatusCode, Value) {
    post_raw(
        app,
        uri,
        Some(&format!("multipart/form-data; boundary={BOUNDARY}")),
        multipart_body(parts),
    )
    .await
}

pub fn policy_record(name: &str, uploaded_at: Option<i64>) -> PolicyDocumentRecord {
    PolicyDocumentRecord {
        policy_name: name.to_string(),
        description: Some("Uploaded policy document".to_string()),
        file_url: format!("https://files.campus.test/{name}"),
        uploaded_by: Some("admin".to_string()),
        created_at: uploaded_at.map(|ts| Utc.timestamp_opt(ts, 0).unwrap()),
    }
}

/// One-page PDF with a single Helvetica text run.
pub fn make_test_pdf(text: &str) -> Vec<u8> {
    make_test_pdf_pages(&[text])
}

/// One page per entry, in order. An empty entry gets a content stream with
/// no text operators.
pub fn make_test_pdf_pages(pages: &[&str]) -> Vec<u8> {
    use lopdf::dictionary;
    use lopdf::{Document, Object, Stream};

    let mut doc = Document::with_version("1.4");

    let font_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Helvetica",
    });

    let mut page_ids = Vec::with_capacity(pages.len());
    for text in pages {
        let content = if text.is_empty() {
            Vec::new()
        } else {
            format!("BT /F1 12 Tf 100 700 Td ({text}) Tj ET").into_bytes()
        };
        let content_id = doc.add_object(Stream::new(dictionary! {}, content));
        let resources = dictionary! {
            "Font" => dictionary! {
                "F1" => font_id,
            },
        };
        page_ids.push(doc.add_object(dictionary! {
            "Type" => "Page",
            "MediaBox" => vec![0.into(), 0.into(), 612.into(), 792.into()],
            "Contents" => content_id,
            "Resources" => resources,
        }));
    }

    let pages_id = doc.add_object(dictionary! {
        "Type" => "Pages",
        "Kids" => page_ids.iter().map(|id| Object::from(*id)).collect::<Vec<_>>(),
        "Count" => page_ids.len() as i64,
    });

    for page_id in &page_ids {
        if let Ok(Object::Dictionary(dict)) = doc.get_object_mut(*page_id) {
            dict.set("Parent", pages_id);
        }
    }

    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);

    let mut buf = Vec::new();
    doc.save_to(&mut buf).expect("save pdf");
    buf
}
