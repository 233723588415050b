use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use hmac::{Hmac, Mac};
use sha1::Sha1;
use tracing::debug;

use crate::constant::OSS_AUTH_SCHEME;
use crate::error::Result;
use crate::StringToSign;

type HmacSha1 = Hmac<Sha1>;

pub struct Signer<'s> {
    access_key_id: &'s str,
    secret_key: &'s str,
}

impl<'s> Signer<'s> {
    #[inline]
    pub fn new(access_key_id: &'s str, secret_key: &'s str) -> Self {
        Self {
            access_key_id,
            secret_key,
        }
    }

    /// Base64(HMAC-SHA1(secret, string_to_sign)).
    #[inline]
    pub fn sign(&self, request: &StringToSign) -> Result<String> {
        let string_to_sign = request.string_to_sign();
        debug!(string_to_sign = ?string_to_sign, "Built OSS string to sign");

        let mut mac = HmacSha1::new_from_slice(self.secret_key.as_bytes())?;
        mac.update(string_to_sign.as_bytes());
        Ok(BASE64.encode(mac.finalize().into_bytes()))
    }

    #[inline]
    pub fn authorization(&self, request: &StringToSign) -> Result<String> {
        Ok(format!(
            "{scheme} {access_key_id}:{sign}",
            scheme = OSS_AUTH_SCHEME,
            access_key_id = self.access_key_id,
            sign = self.sign(request)?,
        ))
    }
}
