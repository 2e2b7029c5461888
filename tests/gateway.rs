//! Gemini client and relay client against local servers

use std::sync::{Arc, Mutex};

use axum::{
    Json, Router,
    extract::{Path, State},
    http::{HeaderMap, StatusCode},
    routing::post,
};
use quill_gateway::api::ApiServerBuilder;
use quill_gateway::canvas::png_data_url;
use quill_gateway::gateway::{grading_prompt, speech_prompt};
use quill_gateway::{GeminiClient, InferenceGateway, PcmClip, RelayClient, Verdict};
use secrecy::SecretString;
use serde_json::{Value, json};

mod common;
use common::{FakeGateway, spawn_server};

const TEST_KEY: &str = "test-gemini-key";

/// One request seen by the fake upstream
#[derive(Clone, Debug)]
struct Seen {
    model_path: String,
    api_key: Option<String>,
    body: Value,
}

#[derive(Clone)]
struct Upstream {
    status: StatusCode,
    reply: Value,
    seen: Arc<Mutex<Vec<Seen>>>,
}

async fn generate(
    State(upstream): State<Upstream>,
    Path(rest): Path<String>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> (StatusCode, Json<Value>) {
    upstream.seen.lock().unwrap().push(Seen {
        model_path: rest,
        api_key: headers
            .get("x-goog-api-key")
            .and_then(|v| v.to_str().ok())
            .map(ToString::to_string),
        body,
    });
    (upstream.status, Json(upstream.reply.clone()))
}

/// Start a fake Gemini host and return a client aimed at it
async fn fake_gemini(status: StatusCode, reply: Value) -> (GeminiClient, Arc<Mutex<Vec<Seen>>>) {
    let seen = Arc::new(Mutex::new(Vec::new()));
    let router = Router::new()
        .route("/v1beta/models/{*rest}", post(generate))
        .with_state(Upstream {
            status,
            reply,
            seen: seen.clone(),
        });
    let addr = spawn_server(router).await;

    let client = GeminiClient::new(SecretString::from(TEST_KEY.to_string()))
        .unwrap()
        .with_base_url(format!("http://{addr}"));
    (client, seen)
}

fn text_reply(text: &str) -> Value {
    json!({ "candidates": [{ "content": { "parts": [{ "text": text }] } }] })
}

#[tokio::test]
async fn pronounce_sends_key_voice_and_prompt() {
    let clip = PcmClip::new(vec![100, -100, 2000]);
    let reply = json!({
        "candidates": [{
            "content": { "parts": [{ "inlineData": { "mimeType": "audio/L16;rate=24000", "data": clip.to_base64() } }] }
        }]
    });
    let (client, seen) = fake_gemini(StatusCode::OK, reply).await;

    let bytes = client.pronounce("shelter").await.unwrap();
    assert_eq!(bytes, clip.to_le_bytes());

    let seen = seen.lock().unwrap();
    let request = &seen[0];
    assert_eq!(request.model_path, "gemini-2.5-flash-preview-tts:generateContent");
    assert_eq!(request.api_key.as_deref(), Some(TEST_KEY));
    assert_eq!(
        request.body["contents"][0]["parts"][0]["text"],
        speech_prompt("shelter")
    );
    assert_eq!(
        request.body["generationConfig"]["responseModalities"][0],
        "AUDIO"
    );
    assert_eq!(
        request.body["generationConfig"]["speechConfig"]["voiceConfig"]["prebuiltVoiceConfig"]
            ["voiceName"],
        "Kore"
    );
}

#[tokio::test]
async fn pronounce_without_audio_is_empty() {
    let (client, _) = fake_gemini(StatusCode::OK, json!({ "candidates": [] })).await;

    assert!(client.pronounce("air").await.unwrap().is_empty());
}

#[tokio::test]
async fn grade_sends_prompt_and_inline_png() {
    let (client, seen) = fake_gemini(StatusCode::OK, text_reply("Correct")).await;
    let data_url = png_data_url(b"\x89PNG fake");

    let answer = client.grade(&data_url, "food").await.unwrap();
    assert_eq!(Verdict::classify(&answer), Verdict::Correct);

    let seen = seen.lock().unwrap();
    let request = &seen[0];
    assert_eq!(request.model_path, "gemini-2.5-flash:generateContent");
    assert_eq!(request.api_key.as_deref(), Some(TEST_KEY));

    let parts = &request.body["contents"][0]["parts"];
    assert_eq!(parts[0]["inlineData"]["mimeType"], "image/png");
    assert_eq!(parts[1]["text"], grading_prompt("food"));
    assert_eq!(
        parts[0]["inlineData"]["data"],
        data_url.trim_start_matches("data:image/png;base64,")
    );
    assert!(request.body.get("generationConfig").is_none());
}

#[tokio::test]
async fn grade_with_empty_answer_fails() {
    let (client, _) = fake_gemini(StatusCode::OK, text_reply("")).await;

    let result = client.grade(&png_data_url(b"png"), "air").await;
    assert!(result.is_err());
}

#[tokio::test]
async fn upstream_error_status_fails_without_body() {
    let (client, _) = fake_gemini(
        StatusCode::FORBIDDEN,
        json!({ "error": { "message": "API key leaked-detail is invalid" } }),
    )
    .await;

    let err = client.pronounce("air").await.unwrap_err();
    let message = err.to_string();
    assert!(message.contains("403"));
    assert!(!message.contains("leaked-detail"));
}

#[tokio::test]
async fn relay_client_round_trips_through_server() {
    let gateway = Arc::new(FakeGateway {
        audio: Some(vec![0, 1, 2, 3]),
        answer: Some(" Incorrect ".to_string()),
        ..FakeGateway::default()
    });
    let router = ApiServerBuilder::new(gateway.clone(), 0).build().router();
    let addr = spawn_server(router).await;

    let relay = RelayClient::from_endpoint(&format!("http://{addr}/api/gemini")).unwrap();

    assert_eq!(relay.pronounce("air").await.unwrap(), vec![0, 1, 2, 3]);
    assert_eq!(
        relay.grade(&png_data_url(b"png"), "air").await.unwrap(),
        "Incorrect"
    );
    assert_eq!(gateway.pronounce_calls(), 1);
    assert_eq!(gateway.grade_calls(), 1);
}

#[tokio::test]
async fn relay_client_surfaces_server_failure() {
    let router = ApiServerBuilder::new(Arc::new(FakeGateway::failing()), 0)
        .build()
        .router();
    let addr = spawn_server(router).await;

    let relay = RelayClient::from_endpoint(&format!("http://{addr}/api/gemini")).unwrap();

    let err = relay.grade(&png_data_url(b"png"), "air").await.unwrap_err();
    assert!(err.to_string().contains("500"));
    assert!(!err.to_string().contains("abc123"));
}
