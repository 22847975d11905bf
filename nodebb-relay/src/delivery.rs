//! Inbound webhook deliveries.

use axum::body::Bytes;
use axum::http::HeaderMap;
use chrono::{DateTime, Utc};
use serde_json::Value;

use crate::error::RelayError;
use crate::web::signature::{self, SIGNATURE_HEADER};

/// One webhook request as received on the wire.
///
/// The body is kept as raw bytes so the signature is checked against exactly
/// what GitHub signed.
#[derive(Debug, Clone)]
pub struct WebhookDelivery {
    pub body: Bytes,
    pub signature: Option<Vec<u8>>,
    pub received_at: DateTime<Utc>,
}

/// Payload of a delivery whose signature has been checked.
#[derive(Debug, Clone, PartialEq)]
pub struct VerifiedPayload(Value);

impl VerifiedPayload {
    pub fn value(&self) -> &Value {
        &self.0
    }
}

impl WebhookDelivery {
    pub fn new(headers: &HeaderMap, body: Bytes) -> Self {
        Self {
            body,
            signature: headers
                .get(SIGNATURE_HEADER)
                .map(|value| value.as_bytes().to_vec()),
            received_at: Utc::now(),
        }
    }

    /// Check the signature over the raw body, then parse it.
    pub fn verify(&self, secret: &[u8]) -> Result<VerifiedPayload, RelayError> {
        signature::check(secret, &self.body, self.signature.as_deref())?;

        let value = serde_json::from_slice(&self.body).map_err(RelayError::MalformedRequest)?;

        Ok(VerifiedPayload(value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;
    use serde_json::json;

    fn delivery(body: &'static [u8], signature: Option<&str>) -> WebhookDelivery {
        let mut headers = HeaderMap::new();
        if let Some(sig) = signature {
            headers.insert(SIGNATURE_HEADER, HeaderValue::from_str(sig).unwrap());
        }
        WebhookDelivery::new(&headers, Bytes::from_static(body))
    }

    #[test]
    fn test_verify_parses_signed_body() {
        let body = br#"{"sender":{"login":"alice"}}"#;
        let sig = signature::sign(b"key", body).unwrap();

        let payload = delivery(body, Some(&sig)).verify(b"key").unwrap();
        assert_eq!(payload.value(), &json!({"sender": {"login": "alice"}}));
    }

    #[test]
    fn test_verify_uses_wire_bytes() {
        // Same JSON value, different formatting than what was signed.
        let signed = br#"{"a":1}"#;
        let sig = signature::sign(b"key", signed).unwrap();

        let err = delivery(b"{ \"a\": 1 }", Some(&sig)).verify(b"key").unwrap_err();
        assert!(matches!(err, RelayError::SignatureMismatch));
    }

    #[test]
    fn test_verify_missing_header() {
        let err = delivery(b"{}", None).verify(b"key").unwrap_err();
        assert!(matches!(err, RelayError::SignatureMissing));
    }

    #[test]
    fn test_verify_signed_but_not_json() {
        let body = b"not json";
        let sig = signature::sign(b"key", body).unwrap();

        let err = delivery(body, Some(&sig)).verify(b"key").unwrap_err();
        assert!(matches!(err, RelayError::MalformedRequest(_)));
    }
}
