pub const OSS_AUTH_SCHEME: &str = "OSS";
pub const OSS_CONTENT_MD5: &str = "content-md5";
pub const OSS_ACL_KEY: &str = "x-oss-object-acl";
pub const OSS_ACL_PUBLIC_READ: &str = "public-read";
pub const OSS_ACL_SUBRESOURCE: &str = "acl";
pub const OSS_DEFAULT_REGION: &str = "oss-cn-hangzhou";
pub const OSS_DEFAULT_ENDPOINT: &str = "aliyuncs.com";
pub const OSS_DATE_FORMAT: &str = "%a, %d %b %Y %H:%M:%S GMT";

pub const DEFAULT_CONTENT_TYPE: &str = "text/plain";
pub const BINARY_CONTENT_PREFIXES: [&str; 3] = ["audio/", "video/", "image/"];
