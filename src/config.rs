use std::env;
use std::time::Duration;

use anyhow::Result;

use crate::constant::{OSS_DEFAULT_ENDPOINT, OSS_DEFAULT_REGION};
use crate::error::Error;

#[derive(Debug, Clone)]
pub struct Config {
    pub server: ServerConfig,
    pub oss: OssConfig,
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub body_limit_bytes: usize,
    pub cors_allowed_origins: Vec<String>,
}

#[derive(Debug, Clone)]
pub struct OssConfig {
    pub credentials: Credentials,
    pub endpoint: String,
    /// Send requests here instead of `https://{bucket}.{region}.{endpoint}`.
    pub endpoint_url: Option<String>,
    pub request_timeout: Option<Duration>,
}

#[derive(Clone, Default)]
pub struct Credentials {
    pub access_key_id: Option<String>,
    pub access_key_secret: Option<String>,
    pub bucket: Option<String>,
    pub region: String,
}

/// Credentials that passed the presence check.
#[derive(Clone, Copy)]
pub struct OssCredentials<'c> {
    pub access_key_id: &'c str,
    pub access_key_secret: &'c str,
    pub bucket: &'c str,
    pub region: &'c str,
}

impl Credentials {
    /// Presence check, run on every request.
    pub fn require(&self) -> Result<OssCredentials<'_>, Error> {
        fn present(value: &Option<String>) -> Option<&str> {
            value.as_deref().filter(|v| !v.trim().is_empty())
        }

        let access_key_id = present(&self.access_key_id);
        let access_key_secret = present(&self.access_key_secret);
        let bucket = present(&self.bucket);

        match (access_key_id, access_key_secret, bucket) {
            (Some(access_key_id), Some(access_key_secret), Some(bucket)) => Ok(OssCredentials {
                access_key_id,
                access_key_secret,
                bucket,
                region: &self.region,
            }),
            _ => {
                let missing: Vec<&str> = [
                    ("OSS_ACCESS_KEY_ID", access_key_id.is_none()),
                    ("OSS_ACCESS_KEY_SECRET", access_key_secret.is_none()),
                    ("OSS_BUCKET", bucket.is_none()),
                ]
                .iter()
                .filter(|(_, missing)| *missing)
                .map(|(name, _)| *name)
                .collect();

                Err(Error::Configuration(format!(
                    "OSS credentials not configured, missing: {}",
                    missing.join(", ")
                )))
            }
        }
    }
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("access_key_id", &self.access_key_id)
            .field("access_key_secret", &self.access_key_secret.as_ref().map(|_| "***"))
            .field("bucket", &self.bucket)
            .field("region", &self.region)
            .finish()
    }
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();

        let timeout_secs: u64 = env::var("OSS_REQUEST_TIMEOUT_SECS")
            .unwrap_or_else(|_| "30".to_string())
            .parse()?;
        let body_limit_mb: usize = env::var("BODY_LIMIT_MB")
            .unwrap_or_else(|_| "50".to_string())
            .parse()?;

        Ok(Self {
            server: ServerConfig {
                host: env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
                port: env::var("PORT")
                    .unwrap_or_else(|_| "3000".to_string())
                    .parse()?,
                body_limit_bytes: body_limit_mb * 1024 * 1024,
                cors_allowed_origins: env::var("ALLOWED_ORIGINS")
                    .unwrap_or_else(|_| "*".to_string())
                    .split(',')
                    .map(|s| s.trim().to_string())
                    .filter(|s| !s.is_empty())
                    .collect(),
            },
            oss: OssConfig {
                credentials: Credentials {
                    access_key_id: env::var("OSS_ACCESS_KEY_ID").ok(),
                    access_key_secret: env::var("OSS_ACCESS_KEY_SECRET").ok(),
                    bucket: env::var("OSS_BUCKET").ok(),
                    region: env::var("OSS_REGION")
                        .unwrap_or_else(|_| OSS_DEFAULT_REGION.to_string()),
                },
                endpoint: env::var("OSS_ENDPOINT")
                    .unwrap_or_else(|_| OSS_DEFAULT_ENDPOINT.to_string()),
                endpoint_url: env::var("OSS_ENDPOINT_URL")
                    .ok()
                    .map(|url| url.trim_end_matches('/').to_string())
                    .filter(|url| !url.is_empty()),
                request_timeout: match timeout_secs {
                    0 => None,
                    secs => Some(Duration::from_secs(secs)),
                },
            },
        })
    }
}
