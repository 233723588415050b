use std::sync::Arc;

use serde_json::Value;

use crate::config::Config;
use crate::{SignedHeaders, UploadResult};

/// Shared, read-only state handed to every handler.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub http: reqwest::Client,
}

impl AppState {
    pub fn new(config: Config) -> reqwest::Result<Self> {
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = config.oss.request_timeout {
            builder = builder.timeout(timeout);
        }

        Ok(Self {
            config: Arc::new(config),
            http: builder.build()?,
        })
    }
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub service: String,
    pub version: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignRequest {
    pub file_name: Option<String>,
    pub content: Option<String>,
    pub content_type: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadRequestBody {
    pub file_name: Option<String>,
    pub content: Option<String>,
    pub content_type: Option<String>,
    #[serde(default)]
    pub make_public: bool,
    #[serde(default)]
    pub episode_data: Option<Value>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SignResponse {
    pub success: bool,
    pub url: String,
    pub headers: SignedHeaders,
    pub file_name: String,
    pub bucket: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadResponse {
    pub success: bool,
    pub url: String,
    pub file_name: String,
    pub size: usize,
    pub status: u16,
    pub message: String,
    pub is_public: bool,
    pub episode_data: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub acl_error: Option<String>,
}

impl From<UploadResult> for UploadResponse {
    fn from(result: UploadResult) -> Self {
        Self {
            success: result.success,
            url: result.object_url,
            file_name: result.object_key,
            size: result.byte_size,
            status: result.upload_status.as_u16(),
            message: result.message,
            is_public: result.is_public,
            episode_data: result.passthrough_metadata,
            acl_error: result.acl_warning.map(|warning| warning.body),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct UpstreamErrorResponse {
    pub success: bool,
    pub error: String,
    pub status: u16,
    pub message: String,
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
}
