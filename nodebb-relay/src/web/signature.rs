//! GitHub webhook signature verification.
//!
//! GitHub signs every delivery with HMAC-SHA256 over the raw request body and
//! sends the result as `X-Hub-Signature-256: sha256=<hex digest>`.
//! Reference: https://docs.github.com/en/webhooks/using-webhooks/validating-webhook-deliveries

use hmac::{Hmac, Mac};
use sha2::Sha256;
use subtle::ConstantTimeEq;
use thiserror::Error;
use tracing::warn;

type HmacSha256 = Hmac<Sha256>;

/// Header carrying the delivery signature.
pub const SIGNATURE_HEADER: &str = "x-hub-signature-256";

const SIGNATURE_PREFIX: &str = "sha256=";

/// Why a delivery failed verification.
///
/// Only used for server-side logging; callers always see the same rejection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum SignatureError {
    #[error("signature header missing")]
    Missing,
    #[error("signature does not match payload")]
    Mismatch,
}

/// Compute the `sha256=<hex>` header value for a body.
///
/// Returns `None` if the key is rejected by the MAC.
pub fn sign(secret: &[u8], body: &[u8]) -> Option<String> {
    let mut mac = match HmacSha256::new_from_slice(secret) {
        Ok(m) => m,
        Err(_) => {
            warn!("github_signature_invalid_key");
            return None;
        }
    };

    mac.update(body);

    Some(format!(
        "{}{}",
        SIGNATURE_PREFIX,
        hex::encode(mac.finalize().into_bytes())
    ))
}

/// Verify a delivery signature, reporting why it failed.
///
/// # Arguments
///
/// * `secret` - The webhook secret configured on GitHub
/// * `body` - The exact bytes received on the wire
/// * `presented` - The raw `X-Hub-Signature-256` header value, if any
pub fn check(secret: &[u8], body: &[u8], presented: Option<&[u8]>) -> Result<(), SignatureError> {
    let presented = match presented {
        Some(value) if !value.is_empty() => value,
        _ => return Err(SignatureError::Missing),
    };

    let expected = sign(secret, body).ok_or(SignatureError::Mismatch)?;

    // ct_eq returns false for unequal lengths; length is not secret.
    if bool::from(expected.as_bytes().ct_eq(presented)) {
        Ok(())
    } else {
        warn!(
            expected_length = expected.len(),
            actual_length = presented.len(),
            has_prefix = presented.starts_with(SIGNATURE_PREFIX.as_bytes()),
            "github_signature_mismatch"
        );
        Err(SignatureError::Mismatch)
    }
}

/// Verify a delivery signature.
///
/// Returns `true` only when `presented` is exactly the signature of `body`
/// under `secret`. Missing or malformed headers fail closed.
pub fn verify(secret: &[u8], body: &[u8], presented: Option<&[u8]>) -> bool {
    check(secret, body, presented).is_ok()
}
