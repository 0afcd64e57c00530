use crate::models::{SchemaError, SubmissionPayload};
use crate::responses::JsonResponse;
use crate::services::analytics::emit;
use crate::state::AppState;
use axum::{
    extract::{Request, State},
    http::Method,
    response::{IntoResponse, Response},
};
use serde_json::Value;
use tracing::info;

const ACCEPTED_MESSAGE: &str = "Form data received successfully";
const REJECTED_MESSAGE: &str = "Method not allowed";
const BODY_LIMIT: usize = 64 * 1024;

/// Outcome of one signup request.
pub enum HandlerResult {
    /// Submission recorded (whether or not the analytics emission worked).
    Accepted,
    /// Wrong HTTP method; no side effects.
    Rejected,
    /// Malformed body; no side effects.
    Invalid(SchemaError),
}

impl IntoResponse for HandlerResult {
    fn into_response(self) -> Response {
        match self {
            HandlerResult::Accepted => JsonResponse::success(ACCEPTED_MESSAGE).into_response(),
            HandlerResult::Rejected => {
                JsonResponse::method_not_allowed(REJECTED_MESSAGE).into_response()
            }
            HandlerResult::Invalid(err) => {
                JsonResponse::bad_request(&err.to_string()).into_response()
            }
        }
    }
}

/// Stateless signup handler. Registered for every method so the 405 body is
/// this crate's fixed message rather than the framework default.
pub async fn handle_signup(State(state): State<AppState>, req: Request) -> Response {
    if req.method() != Method::POST {
        return HandlerResult::Rejected.into_response();
    }

    let bytes = match axum::body::to_bytes(req.into_body(), BODY_LIMIT).await {
        Ok(bytes) => bytes,
        Err(err) => {
            tracing::error!(%err, "failed to read signup request body");
            return HandlerResult::Invalid(SchemaError::InvalidJson).into_response();
        }
    };

    let body: Value = match serde_json::from_slice(&bytes) {
        Ok(value) => value,
        Err(_) => return HandlerResult::Invalid(SchemaError::InvalidJson).into_response(),
    };

    let payload = match SubmissionPayload::from_json(&body, state.config.field_set) {
        Ok(payload) => payload,
        Err(err) => return HandlerResult::Invalid(err).into_response(),
    };

    info!(email = %payload.email(), "received signup submission");

    let mut properties = payload.analytics_properties();
    if !payload.email().is_empty() {
        properties.insert(
            "distinct_id".into(),
            Value::String(payload.email().to_string()),
        );
    }
    // Sink failures are logged inside emit; the submission is accepted anyway.
    emit(
        state.analytics.as_ref(),
        "Server Form Submitted",
        Some(properties),
    )
    .await;

    HandlerResult::Accepted.into_response()
}
