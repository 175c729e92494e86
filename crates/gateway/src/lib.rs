//! HTTP gateway for CycleMate.
//!
//! Exposes the chat endpoint, a preview endpoint for inspecting the
//! assembled turns, and a health check. Built on Axum.

mod chat;

use std::sync::Arc;

use axum::{
    Router,
    extract::{DefaultBodyLimit, State},
    http::{HeaderValue, Method, header},
    response::Json,
    routing::{get, post},
};
use cyclemate_agent::ChatAssistant;
use cyclemate_config::{AppConfig, GatewayConfig};
use serde::Serialize;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tracing::{info, warn};

pub(crate) type SharedAssistant = Arc<ChatAssistant>;

/// Build the Axum router.
///
/// Layers applied:
/// - CORS restricted to `gateway.allowed_origins`
/// - Request body size limit (`gateway.max_body_bytes`)
/// - HTTP trace logging
pub fn build_router(assistant: SharedAssistant, config: &GatewayConfig) -> Router {
    Router::new()
        .route("/health", get(health_handler))
        .route("/api/chat", post(chat::chat_handler))
        .route("/api/chat/preview", post(chat::preview_handler))
        .with_state(assistant)
        .layer(DefaultBodyLimit::max(config.max_body_bytes))
        .layer(cors_layer(&config.allowed_origins))
        .layer(tower_http::trace::TraceLayer::new_for_http())
}

fn cors_layer(allowed_origins: &[String]) -> CorsLayer {
    let origin = if allowed_origins.iter().any(|o| o == "*") {
        AllowOrigin::from(Any)
    } else {
        let origins: Vec<HeaderValue> = allowed_origins
            .iter()
            .filter_map(|origin| match origin.parse() {
                Ok(value) => Some(value),
                Err(_) => {
                    warn!(origin = %origin, "Ignoring unparseable CORS origin");
                    None
                }
            })
            .collect();
        AllowOrigin::list(origins)
    };

    CorsLayer::new()
        .allow_origin(origin)
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([header::CONTENT_TYPE])
        .max_age(std::time::Duration::from_secs(3600))
}

/// Start the gateway HTTP server.
///
/// The provider and assistant are built once and shared by every request.
pub async fn start(config: AppConfig) -> Result<(), Box<dyn std::error::Error>> {
    let addr = format!("{}:{}", config.gateway.host, config.gateway.port);

    if !config.has_api_key() {
        warn!("No API key configured; chat requests will fail until one is set");
    }

    let provider = cyclemate_providers::build_from_config(&config)?;
    if config.has_api_key() {
        match provider.health_check().await {
            Ok(true) => info!(provider = provider.name(), "Provider reachable"),
            Ok(false) => warn!(provider = provider.name(), "Provider reported unhealthy"),
            Err(e) => warn!(provider = provider.name(), error = %e, "Provider health check failed"),
        }
    }
    let assistant = Arc::new(ChatAssistant::from_config(&config, provider));
    let app = build_router(assistant, &config.gateway);

    info!(
        addr = %addr,
        model = %config.provider.model,
        max_pairs = config.conversation.max_pairs,
        "Gateway starting"
    );
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

// --- Handlers ---

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    version: &'static str,
    provider: String,
    max_pairs: usize,
}

async fn health_handler(State(assistant): State<SharedAssistant>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
        provider: assistant.provider().name().to_string(),
        max_pairs: assistant.max_pairs(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use cyclemate_core::error::ProviderError;
    use cyclemate_core::message::TurnSequence;
    use cyclemate_core::provider::{Provider, ProviderRequest, ProviderResponse};
    use http_body_util::BodyExt;
    use std::sync::Mutex;
    use tower::ServiceExt;

    struct MockProvider {
        result: Result<String, ProviderError>,
        calls: Mutex<Vec<TurnSequence>>,
    }

    #[async_trait::async_trait]
    impl Provider for MockProvider {
        fn name(&self) -> &str {
            "mock"
        }

        async fn complete(
            &self,
            request: ProviderRequest,
        ) -> Result<ProviderResponse, ProviderError> {
            self.calls.lock().unwrap().push(request.turns);
            self.result.clone().map(|text| ProviderResponse {
                text,
                usage: None,
                model: "mock".into(),
            })
        }
    }

    fn app(result: Result<String, ProviderError>) -> (Router, Arc<MockProvider>) {
        let provider = Arc::new(MockProvider {
            result,
            calls: Mutex::new(Vec::new()),
        });
        let config = AppConfig::default();
        let assistant = Arc::new(ChatAssistant::from_config(&config, provider.clone()));
        (build_router(assistant, &config.gateway), provider)
    }

    fn post_json(uri: &str, body: impl Into<Body>) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header("content-type", "application/json")
            .body(body.into())
            .unwrap()
    }

    async fn json_body(response: axum::response::Response) -> serde_json::Value {
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn health_endpoint() {
        let (app, _) = app(Ok("unused".into()));
        let req = Request::builder()
            .uri("/health")
            .body(Body::empty())
            .unwrap();

        let response = app.oneshot(req).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let json = json_body(response).await;
        assert_eq!(json["status"], "ok");
        assert_eq!(json["provider"], "mock");
        assert_eq!(json["max_pairs"], 10);
    }

    #[tokio::test]
    async fn chat_success() {
        let (app, provider) = app(Ok("Try iron-rich foods...".into()));
        let body = serde_json::json!({
            "message": "What foods help with period cramps?",
            "history": [
                {"role": "user", "content": "hi"},
                {"role": "assistant", "content": "Hello! How can I help?"},
                {"role": "user", "content": "I get cramps"}
            ],
            "requesterName": "Maya"
        });

        let response = app
            .oneshot(post_json("/api/chat", body.to_string()))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let json = json_body(response).await;
        assert_eq!(json["success"], true);
        assert_eq!(json["reply"], "Try iron-rich foods...");
        assert!(json["timestamp"].is_string());

        let calls = provider.calls.lock().unwrap();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].len(), 6);
        assert!(calls[0].greeting().text.contains("Maya"));
    }

    #[tokio::test]
    async fn whitespace_message_is_400_without_provider_call() {
        let (app, provider) = app(Ok("unused".into()));
        let response = app
            .oneshot(post_json("/api/chat", r#"{"message":"   "}"#))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let json = json_body(response).await;
        assert_eq!(json["success"], false);
        assert_eq!(json["error"], "validation_failed");
        assert!(provider.calls.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn malformed_json_is_a_validation_failure() {
        let (app, provider) = app(Ok("unused".into()));
        let response = app
            .oneshot(post_json("/api/chat", "{not json"))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let json = json_body(response).await;
        assert_eq!(json["error"], "validation_failed");
        assert!(provider.calls.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn quota_error_maps_to_429() {
        let (app, _) = app(Err(ProviderError::ApiError {
            status_code: 429,
            message: "RESOURCE_EXHAUSTED: quota exceeded".into(),
        }));
        let response = app
            .oneshot(post_json("/api/chat", r#"{"message":"hello"}"#))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
        let json = json_body(response).await;
        assert_eq!(json["error"], "rate_limited");
        assert_eq!(json["success"], false);
        assert!(!json["reply"].as_str().unwrap().contains("RESOURCE_EXHAUSTED"));
    }

    #[tokio::test]
    async fn unknown_failure_maps_to_500() {
        let (app, _) = app(Err(ProviderError::Network("connection reset".into())));
        let response = app
            .oneshot(post_json("/api/chat", r#"{"message":"hello"}"#))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(json_body(response).await["error"], "unknown");
    }

    #[tokio::test]
    async fn preview_returns_turns_without_calling_provider() {
        let (app, provider) = app(Ok("unused".into()));
        let response = app
            .oneshot(post_json("/api/chat/preview", r#"{"message":"hello"}"#))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let json = json_body(response).await;
        assert_eq!(json["turns"]["turns"].as_array().unwrap().len(), 3);
        assert_eq!(json["older_turns"], 0);
        assert!(provider.calls.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn oversized_body_is_413() {
        let (app, _) = app(Ok("unused".into()));
        let big = format!(r#"{{"message":"{}"}}"#, "a".repeat(128 * 1024));
        let response = app.oneshot(post_json("/api/chat", big)).await.unwrap();
        assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
    }

    #[tokio::test]
    async fn cors_allows_configured_origin() {
        let (app, _) = app(Ok("unused".into()));
        let req = Request::builder()
            .uri("/health")
            .header("origin", "http://localhost:3000")
            .body(Body::empty())
            .unwrap();

        let response = app.oneshot(req).await.unwrap();
        assert_eq!(
            response.headers().get("access-control-allow-origin").unwrap(),
            "http://localhost:3000"
        );
    }
}
