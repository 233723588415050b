use chrono::{DateTime, Utc};
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE, DATE};
use reqwest::{Client, Method, Request, Url};

use crate::config::{OssConfig, OssCredentials};
use crate::constant::*;
use crate::error::{Error, Result};
use crate::{canonical_resource, Payload, Signer, StringToSign};

/// Headers a caller must send with its own PUT of the object.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SignedHeaders {
    #[serde(rename = "Authorization")]
    pub authorization: String,
    #[serde(rename = "Date")]
    pub date: String,
    #[serde(rename = "Content-Type")]
    pub content_type: String,
    #[serde(rename = "Content-MD5")]
    pub content_md5: String,
}

impl SignedHeaders {
    pub fn to_header_map(&self) -> Result<HeaderMap> {
        let value = |v: &str| {
            HeaderValue::from_str(v)
                .map_err(|e| Error::Validation(format!("invalid header value {:?}: {}", v, e)))
        };

        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, value(&self.authorization)?);
        headers.insert(DATE, value(&self.date)?);
        headers.insert(CONTENT_TYPE, value(&self.content_type)?);
        headers.insert(OSS_CONTENT_MD5, value(&self.content_md5)?);
        Ok(headers)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SignedPut {
    pub url: String,
    pub headers: SignedHeaders,
}

#[derive(Clone, Copy)]
pub struct Oss<'a> {
    credentials: OssCredentials<'a>,
    endpoint: &'a str,
    endpoint_url: Option<&'a str>,
}

impl<'a> Oss<'a> {
    /// Fails with a configuration error when any credential is missing.
    #[inline]
    pub fn from_config(config: &'a OssConfig) -> Result<Self> {
        Ok(Self {
            credentials: config.credentials.require()?,
            endpoint: &config.endpoint,
            endpoint_url: config.endpoint_url.as_deref(),
        })
    }

    #[inline]
    pub fn bucket(&self) -> &'a str {
        self.credentials.bucket
    }

    #[inline]
    pub fn public_url(&self) -> String {
        format!(
            "https://{bucket}.{region}.{endpoint}",
            bucket = self.credentials.bucket,
            region = self.credentials.region,
            endpoint = self.endpoint,
        )
    }

    #[inline]
    pub fn object_url(&self, key: &str) -> Result<String> {
        Ok(key_url(&self.public_url(), key)?.to_string())
    }

    /// Where requests for `key` are actually sent.
    #[inline]
    fn request_url(&self, key: &str) -> Result<Url> {
        match self.endpoint_url {
            Some(base) => key_url(base, key),
            None => key_url(&self.public_url(), key),
        }
    }

    #[inline]
    pub fn prepare_signed_headers(
        &self,
        key: &str,
        payload: &Payload,
        content_type: &str,
    ) -> Result<SignedPut> {
        self.prepare_signed_headers_at(key, payload, content_type, Utc::now())
    }

    pub fn prepare_signed_headers_at(
        &self,
        key: &str,
        payload: &Payload,
        content_type: &str,
        now: DateTime<Utc>,
    ) -> Result<SignedPut> {
        validate(key, payload)?;

        let date = format_date(now);
        let content_md5 = payload.content_md5();
        let request = StringToSign::new(Method::PUT, canonical_resource(self.bucket(), key, None))
            .content_md5(content_md5.as_str())
            .content_type(content_type)
            .date(date.as_str());

        Ok(SignedPut {
            url: self.object_url(key)?,
            headers: SignedHeaders {
                authorization: self.signer().authorization(&request)?,
                date,
                content_type: content_type.to_string(),
                content_md5,
            },
        })
    }

    pub fn put_object(
        &self,
        http: &Client,
        key: &str,
        payload: Payload,
        content_type: &str,
        now: DateTime<Utc>,
    ) -> Result<Request> {
        let signed = self.prepare_signed_headers_at(key, &payload, content_type, now)?;

        let req = http
            .put(self.request_url(key)?)
            .headers(signed.headers.to_header_map()?)
            .body(payload.into_bytes())
            .build()?;

        Ok(req)
    }

    pub fn put_object_acl(&self, http: &Client, key: &str, now: DateTime<Utc>) -> Result<Request> {
        let date = format_date(now);
        let request = StringToSign::new(
            Method::PUT,
            canonical_resource(self.bucket(), key, Some(OSS_ACL_SUBRESOURCE)),
        )
        .date(date.as_str())
        .oss_header(OSS_ACL_KEY, OSS_ACL_PUBLIC_READ);
        let authorization = self.signer().authorization(&request)?;

        let mut url = self.request_url(key)?;
        url.set_query(Some(OSS_ACL_SUBRESOURCE));

        let req = http
            .put(url)
            .header(AUTHORIZATION, authorization)
            .header(DATE, date)
            .header(OSS_ACL_KEY, OSS_ACL_PUBLIC_READ)
            .build()?;

        Ok(req)
    }

    #[inline]
    fn signer(&self) -> Signer<'a> {
        Signer::new(
            self.credentials.access_key_id,
            self.credentials.access_key_secret,
        )
    }
}

/// `base` with each `/`-separated segment of `key` appended percent-encoded.
/// The signed resource keeps the raw key.
fn key_url(base: &str, key: &str) -> Result<Url> {
    let mut url = Url::parse(base)
        .map_err(|e| Error::Configuration(format!("invalid OSS endpoint {:?}: {}", base, e)))?;
    url.path_segments_mut()
        .map_err(|_| Error::Configuration(format!("OSS endpoint {:?} cannot be a base", base)))?
        .pop_if_empty()
        .extend(key.split('/'));
    Ok(url)
}

/// RFC 1123 date, always in GMT.
#[inline]
pub fn format_date(date: DateTime<Utc>) -> String {
    date.format(OSS_DATE_FORMAT).to_string()
}

#[inline]
pub fn validate(key: &str, payload: &Payload) -> Result<()> {
    if key.trim().is_empty() {
        return Err(Error::Validation("fileName is required".into()));
    }
    if payload.is_empty() {
        return Err(Error::Validation("content is required".into()));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;
    use crate::config::Credentials;

    fn config() -> OssConfig {
        OssConfig {
            credentials: Credentials {
                access_key_id: Some("test-id".into()),
                access_key_secret: Some("test-secret".into()),
                bucket: Some("test-bucket".into()),
                region: OSS_DEFAULT_REGION.into(),
            },
            endpoint: OSS_DEFAULT_ENDPOINT.into(),
            endpoint_url: None,
            request_timeout: None,
        }
    }

    fn at(secs: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, secs).unwrap()
    }

    #[test]
    fn date_is_rfc1123() {
        assert_eq!(format_date(at(0)), "Wed, 01 Jan 2025 00:00:00 GMT");
    }

    #[test]
    fn signed_headers_for_text() {
        let config = config();
        let oss = Oss::from_config(&config).unwrap();
        let payload = Payload::Text("hello world".into());

        let signed = oss
            .prepare_signed_headers_at("notes/a.txt", &payload, "text/plain", at(0))
            .unwrap();

        assert_eq!(
            signed.url,
            "https://test-bucket.oss-cn-hangzhou.aliyuncs.com/notes/a.txt"
        );
        assert_eq!(
            signed.headers,
            SignedHeaders {
                authorization: "OSS test-id:WDCdx569puQqAfYsB8xOPZIR7vc=".into(),
                date: "Wed, 01 Jan 2025 00:00:00 GMT".into(),
                content_type: "text/plain".into(),
                content_md5: "XrY7u+Ae7tCTyyK7j1rNww==".into(),
            }
        );
    }

    #[test]
    fn signing_is_idempotent_per_timestamp() {
        let config = config();
        let oss = Oss::from_config(&config).unwrap();
        let payload = Payload::Text("hello world".into());

        let first = oss.prepare_signed_headers_at("notes/a.txt", &payload, "text/plain", at(0)).unwrap();
        let again = oss.prepare_signed_headers_at("notes/a.txt", &payload, "text/plain", at(0)).unwrap();
        let later = oss.prepare_signed_headers_at("notes/a.txt", &payload, "text/plain", at(1)).unwrap();

        assert_eq!(first, again);
        assert_ne!(first.headers.date, later.headers.date);
        assert_ne!(first.headers.authorization, later.headers.authorization);
        assert_eq!(first.headers.content_md5, later.headers.content_md5);
        assert_eq!(later.headers.authorization, "OSS test-id:gN1RM2lLNESrkHkbLedMx8C3wTs=");
    }

    #[test]
    fn missing_fields_are_rejected() {
        let config = config();
        let oss = Oss::from_config(&config).unwrap();

        let err = oss
            .prepare_signed_headers_at("", &Payload::Text("x".into()), "text/plain", at(0))
            .unwrap_err();
        assert!(matches!(err, Error::Validation(ref msg) if msg.contains("fileName")));

        let err = oss
            .prepare_signed_headers_at("a.txt", &Payload::Text(String::new()), "text/plain", at(0))
            .unwrap_err();
        assert!(matches!(err, Error::Validation(ref msg) if msg.contains("content")));
    }

    #[test]
    fn missing_credentials_are_rejected() {
        let mut config = config();
        config.credentials.access_key_secret = None;
        assert!(matches!(Oss::from_config(&config), Err(Error::Configuration(_))));
    }

    #[test]
    fn acl_request_carries_signed_header() {
        let config = config();
        let oss = Oss::from_config(&config).unwrap();
        let req = oss.put_object_acl(&Client::new(), "notes/a.txt", at(0)).unwrap();

        assert_eq!(req.method(), &Method::PUT);
        assert_eq!(req.url().query(), Some("acl"));
        assert_eq!(req.headers()[OSS_ACL_KEY], "public-read");
        assert_eq!(req.headers()[AUTHORIZATION], "OSS test-id:pfSHy2rbb0u9dWjjwuM8a6QoLwk=");
        assert!(req.body().is_none());
    }

    #[test]
    fn signed_header_map_carries_content_md5() {
        let config = config();
        let oss = Oss::from_config(&config).unwrap();
        let signed = oss
            .prepare_signed_headers_at("notes/a.txt", &Payload::Text("hello world".into()), "text/plain", at(0))
            .unwrap();

        let headers = signed.headers.to_header_map().unwrap();
        assert_eq!(headers[OSS_CONTENT_MD5], "XrY7u+Ae7tCTyyK7j1rNww==");
        assert_eq!(headers[CONTENT_TYPE], "text/plain");
        assert_eq!(headers[DATE], "Wed, 01 Jan 2025 00:00:00 GMT");
        assert_eq!(headers[AUTHORIZATION], "OSS test-id:WDCdx569puQqAfYsB8xOPZIR7vc=");
    }

    #[test]
    fn reserved_characters_in_key_are_percent_encoded() {
        let config = config();
        let oss = Oss::from_config(&config).unwrap();
        let http = Client::new();

        let req = oss
            .put_object(&http, "shows/episode #1.mp3", Payload::Text("x".into()), "text/plain", at(0))
            .unwrap();
        assert_eq!(req.url().path(), "/shows/episode%20%231.mp3");
        assert_eq!(req.url().query(), None);
        assert_eq!(req.url().fragment(), None);

        let req = oss
            .put_object(&http, "a?b.txt", Payload::Text("x".into()), "text/plain", at(0))
            .unwrap();
        assert_eq!(req.url().path(), "/a%3Fb.txt");
        assert_eq!(req.url().query(), None);

        let acl = oss.put_object_acl(&http, "episode #1.mp3", at(0)).unwrap();
        assert_eq!(acl.url().path(), "/episode%20%231.mp3");
        assert_eq!(acl.url().query(), Some("acl"));
        assert_eq!(acl.url().fragment(), None);
    }

    #[test]
    fn reserved_characters_are_signed_raw() {
        let config = config();
        let oss = Oss::from_config(&config).unwrap();
        let payload = Payload::Text("x".into());

        let signed = oss
            .prepare_signed_headers_at("episode #1.mp3", &payload, "text/plain", at(0))
            .unwrap();
        assert_eq!(
            signed.url,
            "https://test-bucket.oss-cn-hangzhou.aliyuncs.com/episode%20%231.mp3"
        );

        let expected = StringToSign::new(Method::PUT, "/test-bucket/episode #1.mp3")
            .content_md5(payload.content_md5())
            .content_type("text/plain")
            .date("Wed, 01 Jan 2025 00:00:00 GMT");
        let expected = Signer::new("test-id", "test-secret")
            .authorization(&expected)
            .unwrap();
        assert_eq!(signed.headers.authorization, expected);
    }

    #[test]
    fn endpoint_url_overrides_destination_only() {
        let mut config = config();
        config.endpoint_url = Some("http://127.0.0.1:9000".into());
        let oss = Oss::from_config(&config).unwrap();

        let req = oss
            .put_object(&Client::new(), "a.txt", Payload::Text("hi".into()), "text/plain", at(0))
            .unwrap();
        assert_eq!(req.url().as_str(), "http://127.0.0.1:9000/a.txt");
        assert_eq!(
            oss.prepare_signed_headers_at("a.txt", &Payload::Text("hi".into()), "text/plain", at(0))
                .unwrap()
                .url,
            "https://test-bucket.oss-cn-hangzhou.aliyuncs.com/a.txt"
        );
    }
}
