use axum::{http::StatusCode, response::IntoResponse, Json};
use serde::{Deserialize, Serialize};

/// The one wire shape every endpoint speaks: `{ "message": string }`.
#[derive(Serialize, Deserialize)]
pub struct JsonResponse {
    pub message: String,
}

impl JsonResponse {
    fn with_status(status: StatusCode, msg: &str) -> impl IntoResponse {
        (
            status,
            Json(JsonResponse {
                message: msg.to_string(),
            }),
        )
    }

    pub fn success(msg: &str) -> impl IntoResponse {
        Self::with_status(StatusCode::OK, msg)
    }

    pub fn bad_request(msg: &str) -> impl IntoResponse {
        Self::with_status(StatusCode::BAD_REQUEST, msg)
    }

    pub fn method_not_allowed(msg: &str) -> impl IntoResponse {
        Self::with_status(StatusCode::METHOD_NOT_ALLOWED, msg)
    }

    pub fn too_many_requests(msg: &str) -> impl IntoResponse {
        Self::with_status(StatusCode::TOO_MANY_REQUESTS, msg)
    }

    pub fn server_error(msg: &str) -> impl IntoResponse {
        Self::with_status(StatusCode::INTERNAL_SERVER_ERROR, msg)
    }
}
