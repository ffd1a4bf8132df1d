mod common;

use campus_gateway::infra::DocumentFetcher;
use common::{Part, build_app, post_multipart, post_raw, test_config};
use serde_json::json;
use std::sync::atomic::Ordering;

const PDF_BYTES: &[u8] = b"%PDF-1.4\nfake policy body\n%%EOF";

#[tokio::test]
async fn upload_round_trips_bytes_and_records_metadata() {
    let (app, backend) = build_app();

    let (status, body) = post_multipart(
        &app,
        "/admin/upload-policy",
        &[
            Part::File {
                name: "file",
                file_name: "Exam Rules.pdf",
                bytes: PDF_BYTES,
            },
            Part::Text {
                name: "uploaded_by",
                value: "registrar@campus.edu",
            },
        ],
    )
    .await;

    assert_eq!(status, http::StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(body["message"], "Policy uploaded successfully");
    let file_url = body["file_url"].as_str().expect("file_url");
    assert!(file_url.ends_with("/policies/policies/Exam_Rules.pdf"));

    let fetched = backend.fetch(file_url).await.expect("stored object");
    assert_eq!(fetched, PDF_BYTES);

    let policies = backend.policies().await;
    assert_eq!(policies.len(), 1);
    assert_eq!(policies[0].policy_name, "Exam_Rules.pdf");
    assert_eq!(policies[0].file_url, file_url);
    assert_eq!(policies[0].uploaded_by.as_deref(), Some("registrar@campus.edu"));
    assert_eq!(policies[0].description.as_deref(), Some("Uploaded policy document"));
}

#[tokio::test]
async fn uploader_defaults_to_admin() {
    let (app, backend) = build_app();

    let (status, _) = post_multipart(
        &app,
        "/admin/upload-policy",
        &[Part::File {
            name: "file",
            file_name: "fees.pdf",
            bytes: PDF_BYTES,
        }],
    )
    .await;
    assert_eq!(status, http::StatusCode::OK);
    assert_eq!(backend.policies().await[0].uploaded_by.as_deref(), Some("admin"));
}

#[tokio::test]
async fn traversal_in_file_name_stays_under_prefix() {
    let (app, backend) = build_app();

    let (status, body) = post_multipart(
        &app,
        "/admin/upload-policy",
        &[Part::File {
            name: "file",
            file_name: "../../secrets/keys.pdf",
            bytes: PDF_BYTES,
        }],
    )
    .await;
    assert_eq!(status, http::StatusCode::OK);
    assert!(body["file_url"]
        .as_str()
        .unwrap()
        .ends_with("/policies/secrets_keys.pdf"));
    assert!(backend.object("policies/secrets_keys.pdf").await.is_some());
}

#[tokio::test]
async fn missing_file_part_is_rejected() {
    let (app, backend) = build_app();

    let (status, body) = post_multipart(
        &app,
        "/admin/upload-policy",
        &[Part::Text {
            name: "uploaded_by",
            value: "admin",
        }],
    )
    .await;
    assert_eq!(status, http::StatusCode::BAD_REQUEST);
    assert_eq!(body, json!({"success": false, "message": "No file uploaded"}));
    assert_eq!(backend.object_count().await, 0);
}

#[tokio::test]
async fn file_part_without_file_name_is_rejected() {
    let (app, _) = build_app();

    let (status, body) = post_multipart(
        &app,
        "/admin/upload-policy",
        &[Part::File {
            name: "file",
            file_name: "",
            bytes: PDF_BYTES,
        }],
    )
    .await;
    assert_eq!(status, http::StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "No file uploaded");
}

#[tokio::test]
async fn non_multipart_request_is_rejected() {
    let (app, _) = build_app();

    let (status, body) = post_raw(&app, "/admin/upload-policy", None, Vec::new()).await;
    assert_eq!(status, http::StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "No file uploaded");
}

#[tokio::test]
async fn storage_failure_is_generic_and_writes_no_metadata() {
    let (app, backend) = build_app();
    backend.fail_upload.store(true, Ordering::SeqCst);

    let (status, body) = post_multipart(
        &app,
        "/admin/upload-policy",
        &[Part::File {
            name: "file",
            file_name: "fees.pdf",
            bytes: PDF_BYTES,
        }],
    )
    .await;
    assert_eq!(status, http::StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body, json!({"success": false, "message": "Upload failed"}));
    assert!(backend.policies().await.is_empty());
}

#[tokio::test]
async fn metadata_failure_removes_the_uploaded_blob() {
    let (app, backend) = build_app();
    backend.fail_insert.store(true, Ordering::SeqCst);

    let (status, body) = post_multipart(
        &app,
        "/admin/upload-policy",
        &[Part::File {
            name: "file",
            file_name: "fees.pdf",
            bytes: PDF_BYTES,
        }],
    )
    .await;
    assert_eq!(status, http::StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["message"], "Upload failed");
    assert_eq!(backend.object_count().await, 0);
}

#[tokio::test]
async fn failed_compensation_leaves_orphan_but_still_fails() {
    let (app, backend) = build_app();
    backend.fail_insert.store(true, Ordering::SeqCst);
    backend.fail_remove.store(true, Ordering::SeqCst);

    let (status, _) = post_multipart(
        &app,
        "/admin/upload-policy",
        &[Part::File {
            name: "file",
            file_name: "fees.pdf",
            bytes: PDF_BYTES,
        }],
    )
    .await;
    assert_eq!(status, http::StatusCode::INTERNAL_SERVER_ERROR);
    assert!(backend.object("policies/fees.pdf").await.is_some());
    assert!(backend.policies().await.is_empty());
}

#[tokio::test]
async fn duplicate_object_key_fails_upload() {
    let (app, backend) = build_app();
    let parts = [Part::File {
        name: "file",
        file_name: "fees.pdf",
        bytes: PDF_BYTES,
    }];

    let (first, _) = post_multipart(&app, "/admin/upload-policy", &parts).await;
    let (second, body) = post_multipart(&app, "/admin/upload-policy", &parts).await;
    assert_eq!(first, http::StatusCode::OK);
    assert_eq!(second, http::StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["message"], "Upload failed");
    assert_eq!(backend.policies().await.len(), 1);
}

#[tokio::test]
async fn accented_file_name_keeps_base_letters() {
    let (app, backend) = build_app();

    let (status, body) = post_multipart(
        &app,
        "/admin/upload-policy",
        &[Part::File {
            name: "file",
            file_name: "Règlement intérieur.pdf",
            bytes: PDF_BYTES,
        }],
    )
    .await;
    assert_eq!(status, http::StatusCode::OK);
    assert!(body["file_url"]
        .as_str()
        .unwrap()
        .ends_with("/policies/Reglement_interieur.pdf"));
    assert_eq!(backend.policies().await[0].policy_name, "Reglement_interieur.pdf");
}

#[tokio::test]
async fn upload_over_body_limit_fails_without_storing() {
    let (app, backend) = build_app();
    let oversized = vec![b'x'; test_config().max_upload_bytes + 1];

    let (status, body) = post_multipart(
        &app,
        "/admin/upload-policy",
        &[Part::File {
            name: "file",
            file_name: "huge.pdf",
            bytes: &oversized,
        }],
    )
    .await;
    assert_eq!(status, http::StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body, json!({"success": false, "message": "Upload failed"}));
    assert_eq!(backend.object_count().await, 0);
    assert!(backend.policies().await.is_empty());
}
