use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::{routing::post, Json, Router};
use tracing::info;

use crate::constant::DEFAULT_CONTENT_TYPE;
use crate::error::{Error, Result};
use crate::models::{AppState, SignRequest, SignResponse, UploadRequestBody, UploadResponse};
use crate::{Oss, Payload, UploadRequest, Uploader};

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/oss/sign", post(sign_object))
        .route("/oss/upload", post(upload_object))
        .with_state(state)
}

async fn sign_object(
    State(state): State<AppState>,
    body: std::result::Result<Json<SignRequest>, JsonRejection>,
) -> Result<Json<SignResponse>> {
    let Json(body) = body.map_err(|e| Error::Validation(e.body_text()))?;

    let file_name = required(body.file_name, "fileName")?;
    let content = required(body.content, "content")?;
    let content_type = content_type_or_default(body.content_type);
    info!(file_name = %file_name, content_type = %content_type, "Sign request received");

    let payload = Payload::from_wire(content, &content_type)?;
    let oss = Oss::from_config(&state.config.oss)?;
    let signed = oss.prepare_signed_headers(&file_name, &payload, &content_type)?;

    Ok(Json(SignResponse {
        success: true,
        url: signed.url,
        headers: signed.headers,
        file_name,
        bucket: oss.bucket().to_string(),
    }))
}

async fn upload_object(
    State(state): State<AppState>,
    body: std::result::Result<Json<UploadRequestBody>, JsonRejection>,
) -> Result<Json<UploadResponse>> {
    let Json(body) = body.map_err(|e| Error::Validation(e.body_text()))?;

    let file_name = required(body.file_name, "fileName")?;
    let content = required(body.content, "content")?;
    let content_type = content_type_or_default(body.content_type);
    info!(
        file_name = %file_name,
        content_type = %content_type,
        make_public = body.make_public,
        "Upload request received"
    );

    let payload = Payload::from_wire(content, &content_type)?;
    let uploader = Uploader::new(&state.config.oss, &state.http)?;
    let result = uploader
        .upload_object(UploadRequest {
            object_key: file_name,
            payload,
            content_type,
            make_public: body.make_public,
            passthrough_metadata: body.episode_data,
        })
        .await?;

    Ok(Json(result.into()))
}

fn required(value: Option<String>, field: &str) -> Result<String> {
    match value {
        Some(value) if !value.is_empty() => Ok(value),
        _ => Err(Error::Validation(format!("{} is required", field))),
    }
}

fn content_type_or_default(content_type: Option<String>) -> String {
    content_type
        .map(|ct| ct.trim().to_string())
        .filter(|ct| !ct.is_empty())
        .unwrap_or_else(|| DEFAULT_CONTENT_TYPE.to_string())
}
