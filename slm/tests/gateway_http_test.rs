use axum::extract::Query;
use axum::http::{HeaderMap, StatusCode};
use axum::routing::post;
use axum::{Json, Router};
use meetmap_core::config::ChatConfig;
use serde_json::{json, Value};
use slm::{
    ChatCompleter, ChatCompletionClient, ChatMessage, GatewayError, GeminiClient, Role,
    TextGenerator,
};
use std::collections::HashMap;
use std::time::Duration;

async fn serve(app: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{addr}")
}

#[tokio::test]
async fn test_gemini_client_posts_prompt_and_reads_candidate() {
    let app = Router::new().route(
        "/models/:call",
        post(
            |Query(params): Query<HashMap<String, String>>, Json(body): Json<Value>| async move {
                assert_eq!(params.get("key").map(String::as_str), Some("test-key"));
                let prompt = body
                    .pointer("/contents/0/parts/0/text")
                    .and_then(Value::as_str)
                    .unwrap_or_default()
                    .to_string();
                Json(json!({
                    "candidates": [{"content": {"parts": [{"text": format!("echo: {prompt}")}]}}]
                }))
            },
        ),
    );
    let base = serve(app).await;

    let client =
        GeminiClient::new(&base, "gemini-1.5-flash", "test-key", Duration::from_secs(5)).unwrap();
    let text = client.generate("who spoke first?").await.unwrap();
    assert_eq!(text, "echo: who spoke first?");
}

#[tokio::test]
async fn test_gemini_client_surfaces_http_errors() {
    let app = Router::new().route(
        "/models/:call",
        post(|| async { (StatusCode::TOO_MANY_REQUESTS, "quota exceeded") }),
    );
    let base = serve(app).await;

    let client = GeminiClient::new(&base, "gemini-1.5-flash", "k", Duration::from_secs(5)).unwrap();
    match client.generate("x").await.unwrap_err() {
        GatewayError::Http { status, body } => {
            assert_eq!(status, 429);
            assert_eq!(body, "quota exceeded");
        }
        other => panic!("expected http error, got {other:?}"),
    }
}

#[tokio::test]
async fn test_chat_client_sends_bearer_and_messages() {
    let app = Router::new().route(
        "/chat/completions",
        post(|headers: HeaderMap, Json(body): Json<Value>| async move {
            assert_eq!(
                headers.get("authorization").and_then(|v| v.to_str().ok()),
                Some("Bearer flp_test")
            );
            assert_eq!(body["stream"], json!(false));
            assert_eq!(body["max_tokens"], json!(512));
            let count = body["messages"].as_array().map(Vec::len).unwrap_or(0);
            Json(json!({
                "choices": [{"message": {"role": "assistant", "content": format!("{count} messages")}}]
            }))
        }),
    );
    let base = serve(app).await;

    let config = ChatConfig {
        api_key: Some("flp_test".to_string()),
        base_url: base,
        ..ChatConfig::default()
    };
    let client = ChatCompletionClient::from_config(&config).unwrap();
    let answer = client
        .complete(&[
            ChatMessage::new(Role::System, "context"),
            ChatMessage::new(Role::User, "who owns logs?"),
        ])
        .await
        .unwrap();
    assert_eq!(answer, "2 messages");
}

#[tokio::test]
async fn test_chat_client_distinguishes_failures() {
    let app = Router::new()
        .route(
            "/bad-status/chat/completions",
            post(|| async { (StatusCode::BAD_GATEWAY, "upstream down") }),
        )
        .route(
            "/not-json/chat/completions",
            post(|| async { "<html>oops</html>" }),
        );
    let base = serve(app).await;

    let client_for = |path: &str| {
        ChatCompletionClient::from_config(&ChatConfig {
            api_key: Some("k".to_string()),
            base_url: format!("{base}/{path}"),
            ..ChatConfig::default()
        })
        .unwrap()
    };
    let messages = [ChatMessage::new(Role::User, "hi")];

    let err = client_for("bad-status").complete(&messages).await.unwrap_err();
    assert!(matches!(err, GatewayError::Http { status: 502, .. }));

    let err = client_for("not-json").complete(&messages).await.unwrap_err();
    match err {
        GatewayError::NonJson(body) => assert_eq!(body, "<html>oops</html>"),
        other => panic!("expected non-json error, got {other:?}"),
    }
}
