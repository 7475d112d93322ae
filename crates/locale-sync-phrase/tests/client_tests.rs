use std::sync::Arc;

use locale_sync::{
    CatalogError, Diagnostics, DownloadOptions, LocaleCatalog, LocaleId, Transfer,
    TransferError, UploadOptions, UploadRequest,
};
use locale_sync_phrase::{PER_PAGE, PhraseClient, PhraseClientConfig};
use serde_json::json;
use wiremock::matchers::{body_string_contains, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn client_for(server: &MockServer) -> PhraseClient {
    PhraseClient::new(PhraseClientConfig {
        access_token: "secret".into(),
        host: Some(server.uri()),
    })
}

fn locales_json(range: std::ops::Range<usize>) -> serde_json::Value {
    range
        .map(|i| json!({ "id": format!("id{i}"), "name": format!("Locale {i}"), "code": format!("c{i}") }))
        .collect()
}

#[tokio::test]
async fn locales_sends_token_and_parses_records() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/projects/p1/locales"))
        .and(header("Authorization", "token secret"))
        .and(query_param("page", "1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            { "id": "l1", "name": "English", "code": "en", "default": true },
            { "id": "l2", "name": "Klingon", "code": null }
        ])))
        .mount(&server)
        .await;

    let records = client_for(&server).locales("p1").await.unwrap();

    assert_eq!(records.len(), 2);
    assert_eq!(records[0].id, LocaleId::new("l1"));
    assert_eq!(records[0].code, "en");
    assert_eq!(records[1].name, "Klingon");
    assert_eq!(records[1].code, "");
}

#[tokio::test]
async fn locales_drains_every_page() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/projects/p1/locales"))
        .and(query_param("page", "1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(locales_json(0..PER_PAGE)))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/projects/p1/locales"))
        .and(query_param("page", "2"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(locales_json(PER_PAGE..PER_PAGE + 3)),
        )
        .expect(1)
        .mount(&server)
        .await;

    let records = client_for(&server).locales("p1").await.unwrap();

    assert_eq!(records.len(), PER_PAGE + 3);
    assert_eq!(records[PER_PAGE].id, LocaleId::new(format!("id{PER_PAGE}")));
}

#[tokio::test]
async fn locales_unauthorized() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/projects/p1/locales"))
        .respond_with(ResponseTemplate::new(401).set_body_string("bad token"))
        .mount(&server)
        .await;

    let err = client_for(&server).locales("p1").await.unwrap_err();
    assert!(matches!(err, CatalogError::Unauthorized(_)));
}

#[tokio::test]
async fn locales_unknown_project() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/projects/missing/locales"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let err = client_for(&server).locales("missing").await.unwrap_err();
    match err {
        CatalogError::ProjectNotFound(project) => assert_eq!(project, "missing"),
        other => panic!("unexpected error: {other}"),
    }
}

#[tokio::test]
async fn locales_invalid_json_is_parse_error() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/projects/p1/locales"))
        .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
        .mount(&server)
        .await;

    let err = client_for(&server).locales("p1").await.unwrap_err();
    assert!(matches!(err, CatalogError::Parse(_)));
}

#[tokio::test]
async fn download_passes_options_as_query() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/projects/p1/locales/l1/download"))
        .and(query_param("file_format", "yml"))
        .and(query_param("tag", "web"))
        .and(query_param("include_empty_translations", "true"))
        .respond_with(ResponseTemplate::new(200).set_body_string("en:\n  hello: Hello\n"))
        .mount(&server)
        .await;

    let options = DownloadOptions {
        file_format: Some("yml".into()),
        tag: Some("web".into()),
        include_empty_translations: Some(true),
        ..Default::default()
    };
    let bytes = client_for(&server)
        .download("p1", &LocaleId::new("l1"), &options)
        .await
        .unwrap();

    assert_eq!(bytes, b"en:\n  hello: Hello\n");
}

#[tokio::test]
async fn download_encodes_locale_names() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/projects/p1/locales/Brazilian%20Portuguese/download"))
        .respond_with(ResponseTemplate::new(200).set_body_string("pt-BR: {}"))
        .mount(&server)
        .await;

    let bytes = client_for(&server)
        .download(
            "p1",
            &LocaleId::new("Brazilian Portuguese"),
            &DownloadOptions::default(),
        )
        .await
        .unwrap();
    assert_eq!(bytes, b"pt-BR: {}");
}

#[tokio::test]
async fn download_missing_locale_is_not_found() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/projects/p1/locales/nope/download"))
        .respond_with(ResponseTemplate::new(404).set_body_string("not found"))
        .mount(&server)
        .await;

    let err = client_for(&server)
        .download("p1", &LocaleId::new("nope"), &DownloadOptions::default())
        .await
        .unwrap_err();
    assert!(matches!(err, TransferError::NotFound(_)));
}

#[tokio::test]
async fn download_server_error_keeps_status() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/projects/p1/locales/l1/download"))
        .respond_with(ResponseTemplate::new(503).set_body_string("maintenance"))
        .mount(&server)
        .await;

    let err = client_for(&server)
        .download("p1", &LocaleId::new("l1"), &DownloadOptions::default())
        .await
        .unwrap_err();
    match err {
        TransferError::Http { status, body } => {
            assert_eq!(status, 503);
            assert_eq!(body, "maintenance");
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[tokio::test]
async fn upload_posts_multipart_form() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/projects/p1/uploads"))
        .and(body_string_contains("name=\"file_format\""))
        .and(body_string_contains("filename=\"en.yml\""))
        .and(body_string_contains("web,mobile"))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({
            "id": "u1",
            "filename": "en.yml",
            "format": "yml",
            "state": "processing"
        })))
        .mount(&server)
        .await;

    let request = UploadRequest {
        file_name: "en.yml".into(),
        content: b"en:\n  hello: Hello\n".to_vec(),
        locale_id: Some(LocaleId::new("l1")),
        options: UploadOptions {
            file_format: Some("yml".into()),
            tags: Some("web,mobile".into()),
            update_translations: Some(true),
            ..Default::default()
        },
    };
    let summary = client_for(&server).upload("p1", &request).await.unwrap();

    assert_eq!(summary.id, "u1");
    assert_eq!(summary.state, "processing");
}

#[tokio::test]
async fn diagnostics_record_requests() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/projects/p1/locales"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&server)
        .await;

    let buffer = locale_sync::test_support::SharedBuffer::default();
    let diagnostics = Arc::new(Diagnostics::new(true, buffer.clone()));
    let client = client_for(&server).with_diagnostics(diagnostics);
    client.locales("p1").await.unwrap();

    let output = buffer.contents();
    assert!(output.contains("GET "));
    assert!(output.contains("/projects/p1/locales"));
    assert!(output.contains("status: 200 OK"));
    assert!(!output.contains("secret"));
}
