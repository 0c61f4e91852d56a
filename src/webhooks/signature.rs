//! Webhook delivery signatures (HMAC-SHA256, `X-Hub-Signature-256`).
//!
//! Verification is optional: it only runs when a secret is configured. With a
//! secret, every delivery must carry a valid `sha256=<hex>` header.

use hmac::{Hmac, Mac};
use sha2::Sha256;
use thiserror::Error;

type HmacSha256 = Hmac<Sha256>;

/// The header GitHub signs deliveries in.
pub const SIGNATURE_HEADER: &str = "x-hub-signature-256";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum SignatureError {
    #[error("Missing X-Hub-Signature-256 header.")]
    Missing,

    #[error("Invalid X-Hub-Signature-256 header.")]
    Invalid,
}

/// Parses a `sha256=<hex>` header into the raw signature bytes.
///
/// ```
/// use backstroke::webhooks::parse_signature_header;
///
/// assert_eq!(parse_signature_header("sha256=1234abcd"), Some(vec![0x12, 0x34, 0xab, 0xcd]));
/// assert!(parse_signature_header("sha1=1234abcd").is_none());
/// assert!(parse_signature_header("sha256=xyz").is_none());
/// ```
pub fn parse_signature_header(header: &str) -> Option<Vec<u8>> {
    hex::decode(header.strip_prefix("sha256=")?).ok()
}

/// Checks a delivery against the configured secret.
///
/// With no secret every delivery passes.
pub fn verify_delivery(
    secret: Option<&[u8]>,
    signature_header: Option<&str>,
    payload: &[u8],
) -> Result<(), SignatureError> {
    let Some(secret) = secret else {
        return Ok(());
    };
    let header = signature_header.ok_or(SignatureError::Missing)?;
    let expected = parse_signature_header(header).ok_or(SignatureError::Invalid)?;

    let mut mac = HmacSha256::new_from_slice(secret).map_err(|_| SignatureError::Invalid)?;
    mac.update(payload);
    // Constant-time comparison
    mac.verify_slice(&expected)
        .map_err(|_| SignatureError::Invalid)
}

/// Signs `payload` the way GitHub does, returning the header value.
#[cfg(test)]
pub(crate) fn sign(payload: &[u8], secret: &[u8]) -> String {
    let mut mac = HmacSha256::new_from_slice(secret).unwrap();
    mac.update(payload);
    format!("sha256={}", hex::encode(mac.finalize().into_bytes()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn no_secret_accepts_anything() {
        assert_eq!(verify_delivery(None, None, b"{}"), Ok(()));
        assert_eq!(verify_delivery(None, Some("garbage"), b"{}"), Ok(()));
    }

    #[test]
    fn secret_requires_header() {
        assert_eq!(
            verify_delivery(Some(b"secret"), None, b"{}"),
            Err(SignatureError::Missing)
        );
    }

    #[test]
    fn valid_signature_passes() {
        let header = sign(b"Hello, World!", b"It's a Secret to Everybody");
        assert_eq!(
            verify_delivery(
                Some(b"It's a Secret to Everybody"),
                Some(&header),
                b"Hello, World!"
            ),
            Ok(())
        );
    }

    #[test]
    fn malformed_headers_are_invalid() {
        for header in ["", "sha256=", "sha256=zzzz", "sha1=abc123", "not-a-header"] {
            assert_eq!(
                verify_delivery(Some(b"secret"), Some(header), b"test"),
                Err(SignatureError::Invalid),
                "header {:?}",
                header
            );
        }
    }

    #[test]
    fn uppercase_hex_parses() {
        assert_eq!(
            parse_signature_header("sha256=ABCD1234"),
            Some(vec![0xab, 0xcd, 0x12, 0x34])
        );
    }

    proptest! {
        #[test]
        fn signed_payload_verifies(payload: Vec<u8>, secret: Vec<u8>) {
            let header = sign(&payload, &secret);
            prop_assert_eq!(verify_delivery(Some(&secret), Some(&header), &payload), Ok(()));
        }

        #[test]
        fn wrong_secret_fails(payload: Vec<u8>, secret1: Vec<u8>, secret2: Vec<u8>) {
            prop_assume!(secret1 != secret2);
            let header = sign(&payload, &secret1);
            prop_assert_eq!(
                verify_delivery(Some(&secret2), Some(&header), &payload),
                Err(SignatureError::Invalid)
            );
        }

        #[test]
        fn modified_payload_fails(original: Vec<u8>, modified: Vec<u8>, secret: Vec<u8>) {
            prop_assume!(original != modified);
            let header = sign(&original, &secret);
            prop_assert_eq!(
                verify_delivery(Some(&secret), Some(&header), &modified),
                Err(SignatureError::Invalid)
            );
        }

        #[test]
        fn arbitrary_headers_never_panic(header: String, payload: Vec<u8>) {
            let _ = verify_delivery(Some(b"secret"), Some(&header), &payload);
        }
    }
}
