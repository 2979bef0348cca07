mod stub_server;

use pinocchio_core::{
    AnalysisRequest, ContentDocument, PinocchioError, ScoringClient, TranscriptDocument,
    VideoMetadata,
};
use serde_json::{Value, json};
use stub_server::StubServer;

fn document() -> TranscriptDocument {
    TranscriptDocument {
        text: "# Moon landing\n\nSource: https://www.youtube.com/watch?v=m00n\n\n## Transcript\n\nwe went".to_string(),
        transcript: "we went".to_string(),
        url: "https://www.youtube.com/watch?v=m00n".to_string(),
        metadata: VideoMetadata {
            title: "Moon landing".to_string(),
            author: None,
            duration_seconds: None,
            view_count: None,
        },
    }
}

fn client(server: &StubServer) -> ScoringClient {
    ScoringClient::with_client(reqwest::Client::new(), &format!("{}/", server.base_url))
}

#[tokio::test]
async fn posts_document_and_parses_result() {
    let server = StubServer::spawn(|_, _| {
        (
            200,
            json!({
                "misinformation_score": 2,
                "misinformation_detected": false,
                "summary": "Accurate account.",
                "sources": ["https://nasa.gov"],
                "source_objects": [{"url": "https://nasa.gov", "title": "NASA"}]
            })
            .to_string(),
        )
    });

    let result = client(&server)
        .analyze(&AnalysisRequest::for_content(&ContentDocument::from_transcript(&document())))
        .await
        .expect("result");

    assert_eq!(result.misinformation_score, 2);
    assert_eq!(result.summary.as_deref(), Some("Accurate account."));
    assert_eq!(result.source_objects[0].title.as_deref(), Some("NASA"));

    let requests = server.requests();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].method, "POST");
    assert_eq!(requests[0].url, "/api/analyze");
    let body: Value = serde_json::from_str(&requests[0].body).expect("json body");
    assert_eq!(body["url"], "https://www.youtube.com/watch?v=m00n");
    assert_eq!(body["title"], "Moon landing");
    assert_eq!(body["type"], "youtube");
    assert!(body["content"].as_str().expect("content").starts_with("# Moon landing"));
}

#[tokio::test]
async fn error_body_is_a_rejection_even_with_ok_status() {
    let server = StubServer::spawn(|_, _| (200, json!({"error": "content too short"}).to_string()));

    let err = client(&server)
        .analyze(&AnalysisRequest::for_content(&ContentDocument::from_transcript(&document())))
        .await
        .unwrap_err();

    assert!(
        matches!(err, PinocchioError::AnalysisRejected { ref reason } if reason == "content too short"),
        "{err}"
    );
}

#[tokio::test]
async fn error_status_without_error_body_reports_status() {
    let server = StubServer::spawn(|_, _| (502, "<html>bad gateway</html>".to_string()));

    let err = client(&server)
        .analyze(&AnalysisRequest::for_content(&ContentDocument::from_transcript(&document())))
        .await
        .unwrap_err();

    assert!(matches!(err, PinocchioError::ApiStatus { status: 502, .. }), "{err}");
}

#[tokio::test]
async fn plain_text_requests_send_null_url() {
    let server = StubServer::spawn(|_, _| (200, json!({"misinformation_score": 0}).to_string()));
    let request = AnalysisRequest::for_content(&ContentDocument::direct_input("the earth is flat"));

    client(&server).analyze(&request).await.expect("result");

    let body: Value = serde_json::from_str(&server.requests()[0].body).expect("json body");
    assert_eq!(body["type"], "text");
    assert_eq!(body["content"], "the earth is flat");
    assert!(body["url"].is_null());
    assert!(body.get("filename").is_none());
}
