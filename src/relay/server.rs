//! Server side of the relay: a dumb forwarder with a server-held credential.

use axum::{
    extract::State,
    http::StatusCode,
    routing::post,
    Json, Router,
};
use serde_json::{json, Value};
use tower_http::cors::CorsLayer;

use super::types::RelayRequest;
use crate::backends::google;
use crate::error::HeyMemeError;

const UPSTREAM_BASE: &str = "https://generativelanguage.googleapis.com/v1beta/models";

/// Relay server forwarding chat turns to the upstream Gemini endpoint.
pub struct RelayServer {
    /// Server-held Gemini credential
    api_key: String,
    /// Upstream model identifier
    model: String,
    /// Upstream endpoint base URL
    upstream_base: String,
}

#[derive(Clone)]
struct ServerState {
    api_key: String,
    model: String,
    upstream_base: String,
    client: reqwest::Client,
}

impl RelayServer {
    /// Creates a relay with the given server-side credential.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            model: google::DEFAULT_MODEL.to_string(),
            upstream_base: UPSTREAM_BASE.to_string(),
        }
    }

    /// Overrides the upstream model.
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Overrides the upstream endpoint, for alternate deployments.
    pub fn with_upstream_base(mut self, base: impl Into<String>) -> Self {
        self.upstream_base = base.into();
        self
    }

    /// Builds the router; separated from [`run`](Self::run) for tests.
    pub fn router(&self) -> Router {
        Router::new()
            .route("/api/chat", post(handle_chat))
            .layer(CorsLayer::permissive())
            .with_state(ServerState {
                api_key: self.api_key.clone(),
                model: self.model.clone(),
                upstream_base: self.upstream_base.clone(),
                client: reqwest::Client::new(),
            })
    }

    /// Binds the address and serves until the process exits.
    pub async fn run(self, addr: &str) -> Result<(), HeyMemeError> {
        if self.api_key.is_empty() {
            return Err(HeyMemeError::AuthError(
                "Relay needs GEMINI_API_KEY to be set".to_string(),
            ));
        }
        let app = self.router();
        let listener = tokio::net::TcpListener::bind(addr)
            .await
            .map_err(|e| HeyMemeError::Generic(e.to_string()))?;
        log::info!("Relay listening on {}", addr);
        axum::serve(listener, app)
            .await
            .map_err(|e| HeyMemeError::Generic(e.to_string()))
    }
}

/// Handles `POST /api/chat`.
///
/// Builds the upstream turn list from the request body, forwards once with
/// the server credential, and passes the upstream JSON back unmodified with
/// the upstream status. Internal failures become a generic 500 with an
/// `{"error": ...}` body; no upstream detail leaks into it.
async fn handle_chat(
    State(state): State<ServerState>,
    Json(req): Json<RelayRequest>,
) -> (StatusCode, Json<Value>) {
    let contents = req.to_contents();

    let url = format!(
        "{base}/{model}:generateContent?key={key}",
        base = state.upstream_base,
        model = state.model,
        key = state.api_key
    );

    let upstream = state
        .client
        .post(&url)
        .json(&json!({ "contents": contents }))
        .send()
        .await;

    match upstream {
        Ok(resp) => {
            let status =
                StatusCode::from_u16(resp.status().as_u16()).unwrap_or(StatusCode::BAD_GATEWAY);
            match resp.json::<Value>().await {
                Ok(body) => (status, Json(body)),
                Err(e) => {
                    log::error!("Relay could not read upstream body: {}", e);
                    (
                        StatusCode::INTERNAL_SERVER_ERROR,
                        Json(json!({"error": "Relay upstream call failed"})),
                    )
                }
            }
        }
        Err(e) => {
            log::error!("Relay upstream call failed: {}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({"error": "Relay upstream call failed"})),
            )
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Binds a router on an ephemeral local port and returns its base URL.
    async fn serve(router: Router) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });
        format!("http://{}", addr)
    }

    fn fake_upstream(status: StatusCode, body: Value) -> Router {
        Router::new().route(
            "/*path",
            post(move |Json(received): Json<Value>| async move {
                let mut body = body.clone();
                body["received"] = received;
                (status, Json(body))
            }),
        )
    }

    #[tokio::test]
    async fn success_status_and_body_pass_through_unmodified() {
        let upstream = fake_upstream(
            StatusCode::OK,
            json!({"candidates": [{"content": {"parts": [{"text": "womp womp"}]}}]}),
        );
        let relay = RelayServer::new("server-key").with_upstream_base(serve(upstream).await);
        let relay_url = serve(relay.router()).await;

        let resp = reqwest::Client::new()
            .post(format!("{}/api/chat", relay_url))
            .json(&json!({"systemInstruction": "Be a troll.", "message": "hi"}))
            .send()
            .await
            .unwrap();

        assert_eq!(resp.status().as_u16(), 200);
        let body: Value = resp.json().await.unwrap();
        assert_eq!(
            body["candidates"][0]["content"]["parts"][0]["text"],
            "womp womp"
        );
        // The relay built the upstream turn list from the request body.
        assert_eq!(body["received"]["contents"][0]["parts"][0]["text"], "Be a troll.");
        assert_eq!(body["received"]["contents"][1]["parts"][0]["text"], "hi");
    }

    #[tokio::test]
    async fn upstream_failure_status_and_error_body_pass_through() {
        let upstream = fake_upstream(
            StatusCode::TOO_MANY_REQUESTS,
            json!({"error": {"code": 429, "status": "RESOURCE_EXHAUSTED"}}),
        );
        let relay = RelayServer::new("server-key").with_upstream_base(serve(upstream).await);
        let relay_url = serve(relay.router()).await;

        let resp = reqwest::Client::new()
            .post(format!("{}/api/chat", relay_url))
            .json(&json!({"message": "hello?"}))
            .send()
            .await
            .unwrap();

        // The client needs the real status and body to classify the quota
        // failure, so neither is rewritten on the way through.
        assert_eq!(resp.status().as_u16(), 429);
        let body: Value = resp.json().await.unwrap();
        assert_eq!(body["error"]["status"], "RESOURCE_EXHAUSTED");
    }

    #[tokio::test]
    async fn unreachable_upstream_is_a_generic_500() {
        let relay = RelayServer::new("server-key").with_upstream_base("http://127.0.0.1:9");
        let relay_url = serve(relay.router()).await;

        let resp = reqwest::Client::new()
            .post(format!("{}/api/chat", relay_url))
            .json(&json!({"message": "hi"}))
            .send()
            .await
            .unwrap();

        assert_eq!(resp.status().as_u16(), 500);
        let body: Value = resp.json().await.unwrap();
        assert_eq!(body["error"], "Relay upstream call failed");
    }
}
