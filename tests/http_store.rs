//! Integration tests for the HTTP document store against a local server
//!
//! Each test serves canned replies from a loopback listener and checks both
//! the request the store sent and how it read the reply.

use std::collections::BTreeMap;

use chrono::Utc;
use serde_json::{Map, Value, json};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::task::JoinHandle;

use survey_studio::api::{DocumentStore, HttpDocumentStore, ResilienceConfig, StoreError, StoredDocument};
use survey_studio::participant::{ResponseRecord, SurveyMetadata};
use survey_studio::survey::{Project, SurveyDocument};

/// A request as the server received it
#[derive(Debug)]
struct Received {
    request_line: String,
    body: String,
}

impl Received {
    fn json(&self) -> Value {
        serde_json::from_str(&self.body).unwrap()
    }
}

/// Serve one canned `(status, body)` reply per connection, in order
async fn serve(replies: Vec<(u16, &'static str)>) -> (HttpDocumentStore, JoinHandle<Vec<Received>>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let base_url = format!("http://{}/api", listener.local_addr().unwrap());

    let server = tokio::spawn(async move {
        let mut received = Vec::new();
        for (status, body) in replies {
            let (mut stream, _) = listener.accept().await.unwrap();
            received.push(read_request(&mut stream).await);

            let reply = format!(
                "HTTP/1.1 {} {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                status,
                reason(status),
                body.len(),
                body
            );
            stream.write_all(reply.as_bytes()).await.unwrap();
            // The client may already have hung up after reading the status
            let _ = stream.shutdown().await;
        }
        received
    });

    let store = HttpDocumentStore::new(base_url, &ResilienceConfig::disabled()).unwrap();
    (store, server)
}

fn reason(status: u16) -> &'static str {
    match status {
        200 => "OK",
        404 => "Not Found",
        500 => "Internal Server Error",
        _ => "Unknown",
    }
}

async fn read_request(stream: &mut TcpStream) -> Received {
    let mut buffer = Vec::new();
    let mut chunk = [0u8; 4096];

    let header_end = loop {
        let read = stream.read(&mut chunk).await.unwrap();
        assert!(read > 0, "client closed before sending headers");
        buffer.extend_from_slice(&chunk[..read]);
        if let Some(position) = buffer.windows(4).position(|window| window == b"\r\n\r\n") {
            break position + 4;
        }
    };

    let head = String::from_utf8_lossy(&buffer[..header_end]).to_string();
    let content_length = head
        .lines()
        .filter_map(|line| line.split_once(':'))
        .find(|(name, _)| name.trim().eq_ignore_ascii_case("content-length"))
        .map(|(_, value)| value.trim().parse::<usize>().unwrap())
        .unwrap_or(0);

    while buffer.len() < header_end + content_length {
        let read = stream.read(&mut chunk).await.unwrap();
        assert!(read > 0, "client closed before sending the body");
        buffer.extend_from_slice(&chunk[..read]);
    }

    Received {
        request_line: head.lines().next().unwrap_or_default().to_string(),
        body: String::from_utf8_lossy(&buffer[header_end..header_end + content_length]).to_string(),
    }
}

fn record(participant_id: &str) -> ResponseRecord {
    let mut responses = Map::new();
    responses.insert("street1".to_string(), json!(4));
    ResponseRecord {
        participant_id: participant_id.to_string(),
        responses,
        displayed_images: BTreeMap::from([(
            "street1".to_string(),
            vec!["street_3.jpg".to_string()],
        )]),
        survey_metadata: SurveyMetadata {
            completion_time: Utc::now(),
            user_agent: "test".to_string(),
            screen_resolution: None,
            survey_version: "2.0-admin-p1".to_string(),
            project_id: "p1".to_string(),
        },
    }
}

#[tokio::test]
async fn test_put_sends_project_document_and_storage_config() {
    let (store, server) = serve(vec![(200, r#"{"success":true}"#)]).await;
    let document = StoredDocument::new(Project::new("p1", "Streets"), SurveyDocument::starter());

    store.put("p1", &document).await.unwrap();

    let received = server.await.unwrap();
    assert!(received[0].request_line.starts_with("PUT /api/documents/p1 "));
    let body = received[0].json();
    let keys: Vec<&str> = body.as_object().unwrap().keys().map(String::as_str).collect();
    assert_eq!(keys.len(), 3);
    for key in ["project", "surveyDocument", "responseStorageConfig"] {
        assert!(keys.contains(&key), "missing {} in {:?}", key, keys);
    }
    assert_eq!(body["project"]["id"], "p1");
    assert_eq!(body["surveyDocument"]["title"], document.survey_document.unwrap().title);
}

#[tokio::test]
async fn test_missing_document_is_not_found() {
    let (store, server) = serve(vec![(404, r#"{"success":false,"error":"no such file"}"#)]).await;

    assert_eq!(store.fetch("p1").await, Err(StoreError::NotFound("p1".to_string())));
    assert!(server.await.unwrap()[0].request_line.starts_with("GET /api/documents/p1 "));
}

#[tokio::test]
async fn test_unsuccessful_write_is_rejected() {
    let (store, server) = serve(vec![(200, r#"{"success":false,"error":"disk full"}"#)]).await;
    let document = StoredDocument::new(Project::new("p1", "Streets"), SurveyDocument::starter());

    assert_eq!(
        store.put("p1", &document).await,
        Err(StoreError::Rejected {
            status: None,
            message: "disk full".to_string()
        })
    );
    server.await.unwrap();
}

#[tokio::test]
async fn test_server_error_is_rejected_with_status() {
    let (store, server) = serve(vec![(500, r#"{"success":false,"error":"boom"}"#)]).await;

    let err = store.fetch("p1").await.unwrap_err();
    assert_eq!(
        err,
        StoreError::Rejected {
            status: Some(500),
            message: "boom".to_string()
        }
    );
    assert!(err.is_unavailable());
    server.await.unwrap();
}

#[tokio::test]
async fn test_full_fetch_asks_for_images() {
    let (store, server) = serve(vec![(
        200,
        r#"{"success":true,"project":{"id":"p1","name":"Streets"},"surveyDocument":{"title":"Streets","pages":[]}}"#,
    )])
    .await;

    let stored = store.fetch_full("p1").await.unwrap();
    assert_eq!(stored.project.name, "Streets");
    assert_eq!(stored.survey_document.unwrap().title, "Streets");

    let received = server.await.unwrap();
    assert!(
        received[0]
            .request_line
            .starts_with("GET /api/documents/p1?include=images "),
        "unexpected request line {:?}",
        received[0].request_line
    );
}

#[tokio::test]
async fn test_append_response_returns_stored_key() {
    let (store, server) =
        serve(vec![(200, r#"{"success":true,"filename":"response_u1_2024.json"}"#)]).await;

    let key = store.append_response(&record("u1")).await.unwrap();
    assert_eq!(key, "response_u1_2024.json");

    let received = server.await.unwrap();
    assert!(received[0].request_line.starts_with("POST /api/responses "));
    let body = received[0].json();
    assert_eq!(body["participant_id"], "u1");
    assert_eq!(body["responses"]["street1"], 4);
    assert_eq!(body["displayed_images"]["street1"], json!(["street_3.jpg"]));
}

#[tokio::test]
async fn test_append_response_without_key_falls_back_to_local_key() {
    let (store, server) = serve(vec![(200, r#"{"success":true}"#)]).await;
    let record = record("u2");

    assert_eq!(store.append_response(&record).await.unwrap(), record.storage_key());
    server.await.unwrap();
}

#[tokio::test]
async fn test_missing_response_endpoint_is_rejected() {
    let (store, server) = serve(vec![(404, "")]).await;

    let err = store.append_response(&record("u3")).await.unwrap_err();
    assert_eq!(
        err,
        StoreError::Rejected {
            status: Some(404),
            message: "Not Found".to_string()
        }
    );
    assert!(!err.is_unavailable());
    server.await.unwrap();
}
