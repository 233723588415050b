use std::collections::BTreeMap;

use reqwest::Method;

/// Number of positional lines that precede the OSS headers and the resource.
pub const LEADING_FIELDS: usize = 4;

/// Builder for the OSS header-signature string-to-sign:
///
/// ```text
/// VERB\nContent-MD5\nContent-Type\nDate\n[x-oss-name:value\n]*/bucket/key[?sub]
/// ```
///
/// Absent fields render as empty lines, so the leading block always has
/// [`LEADING_FIELDS`] lines.
#[derive(Debug, Clone)]
pub struct StringToSign {
    method: Method,
    content_md5: String,
    content_type: String,
    date: String,
    oss_headers: BTreeMap<String, String>,
    resource: String,
}

impl StringToSign {
    pub fn new(method: Method, resource: impl Into<String>) -> Self {
        Self {
            method,
            content_md5: String::new(),
            content_type: String::new(),
            date: String::new(),
            oss_headers: BTreeMap::new(),
            resource: resource.into(),
        }
    }

    pub fn content_md5(mut self, content_md5: impl Into<String>) -> Self {
        self.content_md5 = content_md5.into();
        self
    }

    pub fn content_type(mut self, content_type: impl Into<String>) -> Self {
        self.content_type = content_type.into();
        self
    }

    pub fn date(mut self, date: impl Into<String>) -> Self {
        self.date = date.into();
        self
    }

    pub fn oss_header(mut self, name: &str, value: impl Into<String>) -> Self {
        self.oss_headers
            .insert(name.trim().to_lowercase(), value.into().trim().to_string());
        self
    }

    #[inline]
    pub fn resource(&self) -> &str {
        &self.resource
    }

    pub fn string_to_sign(&self) -> String {
        let leading: [&str; LEADING_FIELDS] = [
            self.method.as_str(),
            &self.content_md5,
            &self.content_type,
            &self.date,
        ];

        let mut s = leading.join("\n");
        s.push('\n');
        for (name, value) in &self.oss_headers {
            s.push_str(&format!("{name}:{value}\n", name = name, value = value));
        }
        s.push_str(&self.resource);

        s
    }
}

/// `/bucket/key`, or `/bucket/key?sub` when a sub-resource is addressed.
#[inline]
pub fn canonical_resource(bucket: &str, key: &str, sub_resource: Option<&str>) -> String {
    match sub_resource {
        Some(sub) => format!("/{bucket}/{key}?{sub}", bucket = bucket, key = key, sub = sub),
        None => format!("/{bucket}/{key}", bucket = bucket, key = key),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DATE: &str = "Wed, 01 Jan 2025 00:00:00 GMT";

    #[test]
    fn put_object_has_fixed_shape() {
        let s = StringToSign::new(Method::PUT, "/test-bucket/notes/a.txt")
            .content_md5("XrY7u+Ae7tCTyyK7j1rNww==")
            .content_type("text/plain")
            .date(DATE)
            .string_to_sign();

        assert_eq!(
            s,
            "PUT\nXrY7u+Ae7tCTyyK7j1rNww==\ntext/plain\nWed, 01 Jan 2025 00:00:00 GMT\n/test-bucket/notes/a.txt"
        );
    }

    #[test]
    fn empty_fields_still_emit_their_line() {
        let s = StringToSign::new(Method::PUT, "/test-bucket/empty")
            .date(DATE)
            .string_to_sign();

        let lines: Vec<&str> = s.split('\n').collect();
        assert_eq!(lines.len(), LEADING_FIELDS + 1);
        assert_eq!(lines, vec!["PUT", "", "", DATE, "/test-bucket/empty"]);
    }

    #[test]
    fn acl_headers_precede_resource() {
        let resource = canonical_resource("test-bucket", "notes/a.txt", Some("acl"));
        let s = StringToSign::new(Method::PUT, resource)
            .date(DATE)
            .oss_header("x-oss-object-acl", "public-read")
            .string_to_sign();

        assert_eq!(
            s,
            "PUT\n\n\nWed, 01 Jan 2025 00:00:00 GMT\nx-oss-object-acl:public-read\n/test-bucket/notes/a.txt?acl"
        );
    }

    #[test]
    fn oss_headers_are_lowercased_and_sorted() {
        let s = StringToSign::new(Method::PUT, "/b/k")
            .date(DATE)
            .oss_header("X-Oss-Object-Acl", "private")
            .oss_header("x-oss-meta-author", "alice")
            .string_to_sign();

        let lines: Vec<&str> = s.split('\n').collect();
        assert_eq!(&lines[LEADING_FIELDS..], &["x-oss-meta-author:alice", "x-oss-object-acl:private", "/b/k"]);
    }

    #[test]
    fn canonical_resource_starts_with_bucket() {
        assert_eq!(canonical_resource("b", "dir/k.mp3", None), "/b/dir/k.mp3");
        assert_eq!(canonical_resource("b", "k", Some("acl")), "/b/k?acl");
    }
}
