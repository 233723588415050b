use base64::alphabet;
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::engine::{DecodePaddingMode, GeneralPurpose, GeneralPurposeConfig};
use base64::Engine;
use md5::{Digest, Md5};

use crate::constant::BINARY_CONTENT_PREFIXES;
use crate::error::Result;

/// Standard alphabet, padding optional.
const BASE64_WIRE: GeneralPurpose = GeneralPurpose::new(
    &alphabet::STANDARD,
    GeneralPurposeConfig::new().with_decode_padding_mode(DecodePaddingMode::Indifferent),
);

/// Object body as handed to the uploader.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Payload {
    Text(String),
    Binary(Vec<u8>),
}

impl Payload {
    /// Interpret wire `content` according to `content_type`: audio, video and
    /// image types carry base64-encoded bytes, everything else is raw text.
    /// Line breaks and other ASCII whitespace inside base64 are ignored.
    pub fn from_wire(content: String, content_type: &str) -> Result<Self> {
        if is_binary_content_type(content_type) {
            let encoded: Vec<u8> = content
                .bytes()
                .filter(|b| !b.is_ascii_whitespace())
                .collect();
            Ok(Self::Binary(BASE64_WIRE.decode(encoded)?))
        } else {
            Ok(Self::Text(content))
        }
    }

    /// Bytes that go on the wire.
    #[inline]
    pub fn as_bytes(&self) -> &[u8] {
        match self {
            Self::Text(text) => text.as_bytes(),
            Self::Binary(bytes) => bytes,
        }
    }

    #[inline]
    pub fn byte_size(&self) -> usize {
        self.as_bytes().len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.as_bytes().is_empty()
    }

    /// Base64 of the MD5 digest, as carried in `Content-MD5`.
    pub fn content_md5(&self) -> String {
        let mut hasher = Md5::new();
        hasher.update(self.as_bytes());
        BASE64.encode(hasher.finalize())
    }

    pub fn into_bytes(self) -> Vec<u8> {
        match self {
            Self::Text(text) => text.into_bytes(),
            Self::Binary(bytes) => bytes,
        }
    }
}

#[inline]
pub fn is_binary_content_type(content_type: &str) -> bool {
    let content_type = content_type.trim().to_ascii_lowercase();
    BINARY_CONTENT_PREFIXES
        .iter()
        .any(|prefix| content_type.starts_with(prefix))
}
