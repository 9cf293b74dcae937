use std::sync::Arc;

use axum::body::{Body, to_bytes};
use axum::http::{Request, StatusCode, header};
use lexicon_db::LexemeStore;
use lexicon_xref::PhraseMatcher;
use tower::util::ServiceExt;

use pocketdict::handlers::{AppState, router};
use pocketdict::index::PrefixIndex;

const GLOSSES: &str = r#"{"word":"koira","pos":"noun","meanings":["dog"]}
{"word":"koiranen","pos":"noun","meanings":["diminutive of koira."]}
{"word":"kala","pos":"noun","meanings":["fish"]}
{"word":"kalastaja","pos":"noun","meanings":["fisherman"]}
"#;

fn make_state() -> AppState {
    let words = "koira\nkoiran\nkoiranen\nkala\nkalastaja\n";
    let tempdir = tempfile::tempdir().unwrap();
    let path = tempdir.path().join("words.txt");
    std::fs::write(&path, words).unwrap();
    let index = PrefixIndex::build_from_file(&path).unwrap();
    AppState {
        index: Arc::clone(&index),
        store: Arc::new(LexemeStore::from_jsonl_str(GLOSSES).unwrap()),
        phrases: Arc::new(PhraseMatcher::from_phrases(["diminutive of"])),
        max_page_size: 500,
        disable_cache: false,
    }
}

async fn get(uri: &str) -> (StatusCode, serde_json::Value) {
    let app = router(make_state());
    let response = app
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();
    let status = response.status();
    let body_bytes = to_bytes(response.into_body(), 1024 * 1024).await.unwrap();
    let body = serde_json::from_slice(&body_bytes).unwrap_or(serde_json::Value::Null);
    (status, body)
}

#[tokio::test]
async fn healthz_ok() {
    let app = router(make_state());
    let response = app
        .oneshot(
            Request::builder()
                .uri("/healthz")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn matches_endpoint_returns_prefix_matches() {
    let (status, body) = get("/v1/matches?prefix=koi").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["prefix"], "koi");
    let items: Vec<&str> = body["items"]
        .as_array()
        .unwrap()
        .iter()
        .map(|v| v.as_str().unwrap())
        .collect();
    assert_eq!(items, vec!["koira", "koiran", "koiranen"]);
}

#[tokio::test]
async fn matches_endpoint_treats_missing_prefix_as_empty() {
    let (status, body) = get("/v1/matches").await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["items"].as_array().unwrap().is_empty());

    let (status, body) = get("/v1/matches?prefix=zzz").await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["items"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn matches_endpoint_clamps_and_validates_limit() {
    let (status, body) = get("/v1/matches?prefix=k&limit=1000").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["limit"], 50);

    let (status, body) = get("/v1/matches?prefix=k&limit=2").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["items"].as_array().unwrap().len(), 2);

    let (status, body) = get("/v1/matches?prefix=k&limit=0").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(
        body["error"]
            .as_str()
            .unwrap_or_default()
            .contains("limit")
    );
}

#[tokio::test]
async fn define_endpoint_expands_references() {
    let (status, body) = get("/v1/define?word=koiranen").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["word"], "koiranen");
    let meaning = &body["entries"][0]["meanings"][0];
    assert_eq!(meaning["text"], "diminutive of koira.");
    assert_eq!(meaning["expansion"]["headword"], "koira");
    assert_eq!(meaning["expansion"]["depth"], 1);
    assert_eq!(
        meaning["expansion"]["entries"][0]["meanings"][0]["text"],
        "dog"
    );
    assert!(
        body["text"]
            .as_str()
            .unwrap()
            .contains("  ~> koira (noun)\n      - dog\n")
    );
}

#[tokio::test]
async fn define_endpoint_renders_plain_text() {
    let app = router(make_state());
    let response = app
        .oneshot(
            Request::builder()
                .uri("/v1/define?word=kala&format=text")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers()[header::CACHE_CONTROL],
        "public, max-age=300"
    );
    let body_bytes = to_bytes(response.into_body(), 1024 * 1024).await.unwrap();
    assert_eq!(&body_bytes[..], b"kala (noun)\n\n- fish\n");
}

#[tokio::test]
async fn define_endpoint_reports_unknown_word() {
    let (status, body) = get("/v1/define?word=kissa").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "'kissa' not found.");

    let (status, _) = get("/v1/define?word=%20").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = get("/v1/define?word=kala&format=xml").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(
        body["error"]
            .as_str()
            .unwrap_or_default()
            .contains("format")
    );
}

#[tokio::test]
async fn reverse_endpoint_searches_meanings() {
    let (status, body) = get("/v1/reverse?meaning=FISH").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total"], 2);
    assert_eq!(body["has_more"], false);
    assert_eq!(
        body["items"],
        serde_json::json!(["kala", "kalastaja"])
    );

    let (status, body) = get("/v1/reverse?meaning=fish&limit=1").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["items"], serde_json::json!(["kala"]));
    assert_eq!(body["has_more"], true);

    let (status, body) = get("/v1/reverse?meaning=").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(
        body["error"]
            .as_str()
            .unwrap_or_default()
            .contains("required")
    );
}
