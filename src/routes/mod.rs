//! HTTP surface
//!
//! - `GET /` - health
//! - `POST /oss/sign` - signed headers for a caller-side PUT
//! - `POST /oss/upload` - upload (and optionally publish) on the caller's behalf

pub mod health;
pub mod objects;

use axum::extract::DefaultBodyLimit;
use axum::http::{HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::{Json, Router};
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{error, info, warn};

use crate::error::Error;
use crate::models::{AppState, ErrorResponse, UpstreamErrorResponse};

pub fn create_router(state: AppState) -> Router {
    info!("Creating application router");

    let body_limit = state.config.server.body_limit_bytes;
    let cors = cors_layer(&state.config.server.cors_allowed_origins);

    Router::new()
        .merge(health::router())
        .merge(objects::router(state))
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
}

fn cors_layer(origins: &[String]) -> CorsLayer {
    let allow_origin = if origins.is_empty() || origins.iter().any(|o| o == "*") {
        AllowOrigin::from(Any)
    } else {
        AllowOrigin::list(
            origins
                .iter()
                .filter_map(|origin| HeaderValue::from_str(origin).ok()),
        )
    };

    CorsLayer::new()
        .allow_origin(allow_origin)
        .allow_methods(Any)
        .allow_headers(Any)
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        match self {
            Error::Validation(message) => {
                warn!(reason = %message, "Rejected request");
                error_response(StatusCode::BAD_REQUEST, "Bad request", message)
            }
            Error::Decode(e) => {
                warn!(error = %e, "Rejected undecodable content");
                error_response(
                    StatusCode::BAD_REQUEST,
                    "Bad request",
                    format!("content is not valid base64: {}", e),
                )
            }
            Error::Configuration(message) => {
                error!(reason = %message, "OSS is not configured");
                error_response(
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "OSS credentials not configured",
                    message,
                )
            }
            Error::Upstream { status, body } => {
                let body = UpstreamErrorResponse {
                    success: false,
                    error: "Upload to OSS failed".to_string(),
                    status: status.as_u16(),
                    message: body,
                };
                (status, Json(body)).into_response()
            }
            Error::Sign(message) => {
                error!(reason = %message, "Signing failed");
                error_response(
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error",
                    message,
                )
            }
            Error::Request(e) => {
                error!(error = %e, "Request to OSS failed");
                error_response(
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error",
                    e.to_string(),
                )
            }
        }
    }
}

fn error_response(status: StatusCode, error: &str, message: String) -> Response {
    let body = ErrorResponse {
        error: error.to_string(),
        message,
    };
    (status, Json(body)).into_response()
}
