//! Shopify webhook signature verification.
//!
//! Shopify signs the raw request body with HMAC-SHA256 under the app's
//! shared secret and sends the base64 digest in `X-Shopify-Hmac-Sha256`.
//! Reference: https://shopify.dev/docs/apps/build/webhooks/subscribe/https#step-5-verify-the-webhook

use base64::{engine::general_purpose::STANDARD as BASE64_STANDARD, Engine};
use hmac::digest::InvalidLength;
use hmac::{Hmac, Mac};
use sha2::Sha256;
use subtle::ConstantTimeEq;
use tracing::warn;

type HmacSha256 = Hmac<Sha256>;

/// Compute the base64-encoded HMAC-SHA256 of `body` under `secret`.
pub fn sign(secret: &[u8], body: &[u8]) -> Result<String, InvalidLength> {
    let mut mac = HmacSha256::new_from_slice(secret)?;
    mac.update(body);
    Ok(BASE64_STANDARD.encode(mac.finalize().into_bytes()))
}

/// Verify a Shopify webhook signature over the exact raw body bytes.
///
/// # Arguments
///
/// * `secret` - The shared secret configured for the webhook
/// * `body` - The raw, unparsed request body
/// * `signature` - The `X-Shopify-Hmac-Sha256` header value
///
/// # Returns
///
/// `true` if the signature matches, `false` otherwise.
pub fn verify(secret: &[u8], body: &[u8], signature: &str) -> bool {
    let expected = match sign(secret, body) {
        Ok(s) => s,
        Err(_) => {
            warn!("shopify_signature_invalid_key");
            return false;
        }
    };

    let valid = constant_time_eq(expected.as_bytes(), signature.as_bytes());

    if !valid {
        warn!(
            expected_length = expected.len(),
            actual_length = signature.len(),
            "shopify_signature_mismatch"
        );
    }

    valid
}

/// Constant-time byte comparison.
///
/// Length is not secret, so unequal lengths are rejected up front; equal
/// lengths are always scanned in full.
pub fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.ct_eq(b).into()
}
