//! HTTP surface: `POST /analyze-label` and `GET /health`.

use std::any::Any;
use std::sync::Arc;

use axum::{
    Json, Router,
    body::Bytes,
    extract::{DefaultBodyLimit, State},
    response::{IntoResponse, Response},
    routing::{get, post},
};
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::cors::{Any as AnyOrigin, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{Instrument, debug, info_span};
use uuid::Uuid;

use crate::error::AnalyzeError;
use crate::responder::EmailResponder;

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    pub responder: Arc<EmailResponder>,
}

/// Build the Axum router. Cross-origin requests are allowed from anywhere.
///
/// Request bodies are not size-capped, so every rejection comes from the
/// handler as a JSON `{"Error": ..}` object.
pub fn analyze_routes(responder: Arc<EmailResponder>) -> Router {
    let state = AppState { responder };

    let cors = CorsLayer::new()
        .allow_origin(AnyOrigin)
        .allow_methods(AnyOrigin)
        .allow_headers(AnyOrigin);

    Router::new()
        .route("/analyze-label", post(analyze_label))
        .route("/health", get(health))
        .with_state(state)
        .layer(DefaultBodyLimit::disable())
        .layer(CatchPanicLayer::custom(panic_response))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
}

async fn health() -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "ok",
        "service": "bolt-responder"
    }))
}

/// POST /analyze-label
///
/// The body is read raw so that malformed JSON gets the same 400 as a
/// missing `body` field instead of axum's extractor rejection.
async fn analyze_label(State(state): State<AppState>, body: Bytes) -> Response {
    let span = info_span!("analyze_label", request_id = %Uuid::new_v4());
    async move {
        debug!(payload = %String::from_utf8_lossy(&body), "Received analyze request");
        match state.responder.handle(&body).await {
            Ok(payload) => Json(payload).into_response(),
            Err(e) => e.into_response(),
        }
    }
    .instrument(span)
    .await
}

/// Turn a handler panic into the usual JSON 500.
fn panic_response(err: Box<dyn Any + Send + 'static>) -> Response {
    let detail = if let Some(s) = err.downcast_ref::<String>() {
        s.clone()
    } else if let Some(s) = err.downcast_ref::<&str>() {
        s.to_string()
    } else {
        String::new()
    };
    let message = if detail.is_empty() {
        "request handler panicked".to_string()
    } else {
        format!("request handler panicked: {detail}")
    };
    AnalyzeError::Unknown(message).into_response()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn panic_payload_text_is_kept() {
        let resp = panic_response(Box::new("classifier blew up"));
        assert_eq!(resp.status(), axum::http::StatusCode::INTERNAL_SERVER_ERROR);

        let resp = panic_response(Box::new(String::from("boom")));
        assert_eq!(resp.status(), axum::http::StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn opaque_panic_payload_still_answers() {
        let resp = panic_response(Box::new(42_u32));
        assert_eq!(resp.status(), axum::http::StatusCode::INTERNAL_SERVER_ERROR);
    }
}
