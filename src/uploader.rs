//! Upload orchestration: store the object, then optionally make it public.
//!
//! ```text
//! Validating -> Uploading -> Succeeded (private)
//!                         \-> SettingAcl -> Succeeded (public)
//!                                       \-> Succeeded (ACL failed, warning attached)
//! Validating / Uploading -> Failed
//! ```
//!
//! The two PUTs are not atomic. A stored object whose ACL change was rejected
//! is reported as a successful upload with `is_public == false`.

use chrono::Utc;
use reqwest::{Client, Response, StatusCode};
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::config::OssConfig;
use crate::error::{Error, Result};
use crate::{oss, Oss, Payload};

pub const MSG_UPLOADED: &str = "File uploaded successfully";
pub const MSG_UPLOADED_PUBLIC: &str = "File uploaded successfully and made public";
pub const MSG_ACL_FAILED: &str = "File uploaded successfully but failed to set public access";

#[derive(Debug, Clone)]
pub struct UploadRequest {
    pub object_key: String,
    pub payload: Payload,
    pub content_type: String,
    pub make_public: bool,
    pub passthrough_metadata: Option<Value>,
}

/// Rejected ACL change on an object that was stored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AclWarning {
    pub status: Option<StatusCode>,
    pub body: String,
}

#[derive(Debug, Clone)]
pub struct UploadResult {
    pub success: bool,
    pub object_url: String,
    pub object_key: String,
    pub byte_size: usize,
    pub upload_status: StatusCode,
    pub is_public: bool,
    pub message: String,
    pub acl_warning: Option<AclWarning>,
    pub passthrough_metadata: Option<Value>,
}

/// OSS `<Error>` document, used for log context only.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct OssErrorBody {
    code: Option<String>,
    message: Option<String>,
    request_id: Option<String>,
}

pub struct Uploader<'a> {
    oss: Oss<'a>,
    http: &'a Client,
}

impl<'a> Uploader<'a> {
    #[inline]
    pub fn new(config: &'a OssConfig, http: &'a Client) -> Result<Self> {
        Ok(Self {
            oss: Oss::from_config(config)?,
            http,
        })
    }

    pub async fn upload_object(&self, request: UploadRequest) -> Result<UploadResult> {
        let UploadRequest {
            object_key,
            payload,
            content_type,
            make_public,
            passthrough_metadata,
        } = request;

        oss::validate(&object_key, &payload)?;

        let byte_size = payload.byte_size();
        let object_url = self.oss.object_url(&object_key)?;
        info!(key = %object_key, size = byte_size, content_type = %content_type, "Uploading object");

        let req = self
            .oss
            .put_object(self.http, &object_key, payload, &content_type, Utc::now())?;
        let res = self.http.execute(req).await?;
        let upload_status = res.status();

        if !upload_status.is_success() {
            let body = res.text().await.unwrap_or_default();
            log_upstream_error("object upload", upload_status, &body);
            return Err(Error::Upstream {
                status: upload_status,
                body,
            });
        }
        debug!(key = %object_key, status = %upload_status, "Object stored");

        let (is_public, message, acl_warning) = if make_public {
            match self.set_public_read(&object_key).await {
                Ok(()) => (true, MSG_UPLOADED_PUBLIC, None),
                Err(warning) => (false, MSG_ACL_FAILED, Some(warning)),
            }
        } else {
            (false, MSG_UPLOADED, None)
        };

        info!(key = %object_key, is_public, "Upload finished");

        Ok(UploadResult {
            success: true,
            object_url,
            object_key,
            byte_size,
            upload_status,
            is_public,
            message: message.to_string(),
            acl_warning,
            passthrough_metadata,
        })
    }

    async fn set_public_read(&self, key: &str) -> std::result::Result<(), AclWarning> {
        debug!(key = %key, "Setting object ACL to public-read");

        match self.send_acl(key).await {
            Ok(res) if res.status().is_success() => Ok(()),
            Ok(res) => {
                let status = res.status();
                let body = res.text().await.unwrap_or_default();
                log_upstream_error("ACL change", status, &body);
                Err(AclWarning {
                    status: Some(status),
                    body,
                })
            }
            Err(e) => {
                warn!(key = %key, error = %e, "ACL change request failed");
                Err(AclWarning {
                    status: None,
                    body: e.to_string(),
                })
            }
        }
    }

    async fn send_acl(&self, key: &str) -> Result<Response> {
        let req = self.oss.put_object_acl(self.http, key, Utc::now())?;
        Ok(self.http.execute(req).await?)
    }
}

fn log_upstream_error(operation: &str, status: StatusCode, body: &str) {
    match serde_xml_rs::from_str::<OssErrorBody>(body) {
        Ok(err) => warn!(
            operation,
            status = %status,
            code = err.code.as_deref().unwrap_or(""),
            oss_message = err.message.as_deref().unwrap_or(""),
            request_id = err.request_id.as_deref().unwrap_or(""),
            "OSS rejected request"
        ),
        Err(_) => warn!(operation, status = %status, body, "OSS rejected request"),
    }
}
