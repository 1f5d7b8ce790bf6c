//! Webhook signature verification using HMAC-SHA256.
//!
//! The messaging platform signs webhook payloads using HMAC-SHA256 with the
//! channel secret as key. The signature is provided in the `X-Line-Signature`
//! header as the base64-encoded digest (no prefix).
//!
//! Verification must run over the exact raw request bytes, never a
//! re-serialized form: re-serialization is not guaranteed to be byte-identical
//! to the sender's encoding. Signature verification is the first step in
//! webhook processing; invalid signatures are rejected before parsing.

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use hmac::{Hmac, Mac};
use sha2::Sha256;

type HmacSha256 = Hmac<Sha256>;

/// Decodes a signature header (base64-encoded digest) into raw bytes.
///
/// Returns `None` for malformed headers (invalid base64). Never panics.
///
/// # Examples
///
/// ```
/// use chat_intake::webhooks::decode_signature_header;
///
/// // Valid base64
/// assert!(decode_signature_header("aGVsbG8=").is_some());
///
/// // Invalid base64
/// assert!(decode_signature_header("not base64 !!").is_none());
/// ```
pub fn decode_signature_header(header: &str) -> Option<Vec<u8>> {
    BASE64.decode(header).ok()
}

/// Computes the HMAC-SHA256 signature of a payload using the given secret.
///
/// This is useful for testing purposes (generating expected signatures).
pub fn compute_signature(payload: &[u8], secret: &[u8]) -> Vec<u8> {
    let mut mac = HmacSha256::new_from_slice(secret).expect("HMAC can take key of any size");
    mac.update(payload);
    mac.finalize().into_bytes().to_vec()
}

/// Formats a signature as the platform's header value (base64).
pub fn format_signature_header(signature: &[u8]) -> String {
    BASE64.encode(signature)
}

/// Verifies a webhook signature against the payload and channel secret.
///
/// Returns `true` if the signature is valid, `false` otherwise.
/// Uses constant-time comparison to prevent timing attacks.
///
/// An empty secret always fails verification: a deployment without a
/// configured channel secret must reject every delivery, never accept
/// them vacuously.
///
/// # Arguments
///
/// * `payload` - The raw webhook payload bytes
/// * `signature_header` - The value of the `X-Line-Signature` header (base64)
/// * `secret` - The channel secret configured with the platform
///
/// # Examples
///
/// ```
/// use chat_intake::webhooks::{verify_signature, compute_signature, format_signature_header};
///
/// let payload = b"{\"events\":[]}";
/// let secret = b"my-channel-secret";
///
/// let sig = compute_signature(payload, secret);
/// let header = format_signature_header(&sig);
///
/// assert!(verify_signature(payload, &header, secret));
/// assert!(!verify_signature(payload, &header, b"wrong-secret"));
/// ```
pub fn verify_signature(payload: &[u8], signature_header: &str, secret: &[u8]) -> bool {
    // Fail closed on a missing secret.
    if secret.is_empty() {
        return false;
    }

    let expected_signature = match decode_signature_header(signature_header) {
        Some(sig) => sig,
        None => return false,
    };

    let mut mac = match HmacSha256::new_from_slice(secret) {
        Ok(mac) => mac,
        Err(_) => return false,
    };
    mac.update(payload);

    // Constant-time comparison via the HMAC library
    mac.verify_slice(&expected_signature).is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    // ========================================================================
    // Unit tests for known vectors and edge cases
    // ========================================================================

    #[test]
    fn test_decode_signature_header_valid() {
        let result = decode_signature_header("EjSrzQ==");
        assert_eq!(result, Some(vec![0x12, 0x34, 0xab, 0xcd]));
    }

    #[test]
    fn test_decode_signature_header_full_length() {
        // Full SHA256 output (32 bytes) is 44 base64 chars with padding
        let header = BASE64.encode([0xaa; 32]);
        let result = decode_signature_header(&header);
        assert!(result.is_some());
        assert_eq!(result.unwrap().len(), 32);
    }

    #[test]
    fn test_decode_signature_header_invalid_base64() {
        assert_eq!(decode_signature_header("!!not-base64!!"), None);
    }

    #[test]
    fn test_decode_signature_header_empty() {
        assert_eq!(decode_signature_header(""), Some(vec![]));
    }

    #[test]
    fn test_verify_signature_wrong_secret() {
        let payload = b"test payload";
        let correct_secret = b"correct-secret";
        let wrong_secret = b"wrong-secret";

        let sig = compute_signature(payload, correct_secret);
        let header = format_signature_header(&sig);

        assert!(verify_signature(payload, &header, correct_secret));
        assert!(!verify_signature(payload, &header, wrong_secret));
    }

    #[test]
    fn test_verify_signature_modified_payload() {
        let original_payload = b"original payload";
        let modified_payload = b"modified payload";
        let secret = b"secret";

        let sig = compute_signature(original_payload, secret);
        let header = format_signature_header(&sig);

        assert!(verify_signature(original_payload, &header, secret));
        assert!(!verify_signature(modified_payload, &header, secret));
    }

    #[test]
    fn test_verify_signature_malformed_header_returns_false() {
        let payload = b"test";
        let secret = b"secret";

        // Malformed headers return false, never panic
        assert!(!verify_signature(payload, "", secret));
        assert!(!verify_signature(payload, "!!!", secret));
        assert!(!verify_signature(payload, "sha256=abc123", secret));
        assert!(!verify_signature(payload, "too short", secret));
    }

    #[test]
    fn test_verify_signature_empty_payload() {
        let payload = b"";
        let secret = b"secret";

        let sig = compute_signature(payload, secret);
        let header = format_signature_header(&sig);

        assert!(verify_signature(payload, &header, secret));
    }

    #[test]
    fn test_verify_signature_empty_secret_fails_closed() {
        // A valid signature computed with an empty key must still be rejected:
        // an unconfigured secret means every delivery is unauthenticated.
        let payload = b"test payload";
        let secret = b"";

        let sig = compute_signature(payload, secret);
        let header = format_signature_header(&sig);

        assert!(!verify_signature(payload, &header, secret));
    }

    #[test]
    fn test_verify_signature_binary_payload() {
        let payload = &[0x00, 0x01, 0xff, 0xfe, 0x00, 0x00, 0x7f];
        let secret = b"secret";

        let sig = compute_signature(payload, secret);
        let header = format_signature_header(&sig);

        assert!(verify_signature(payload, &header, secret));
    }

    #[test]
    fn test_signature_is_32_bytes() {
        // SHA256 always produces 32 bytes
        let sig = compute_signature(b"any payload", b"any secret");
        assert_eq!(sig.len(), 32);
    }

    // ========================================================================
    // Property-based tests
    // ========================================================================

    proptest! {
        /// Property: verify(payload, sign(payload, secret), secret) == true
        /// for any non-empty secret.
        #[test]
        fn prop_sign_verify_roundtrip(payload: Vec<u8>, secret in proptest::collection::vec(any::<u8>(), 1..64)) {
            let sig = compute_signature(&payload, &secret);
            let header = format_signature_header(&sig);
            prop_assert!(verify_signature(&payload, &header, &secret));
        }

        /// Property: signing with one secret and verifying with a different
        /// secret always fails.
        #[test]
        fn prop_wrong_secret_fails(
            payload: Vec<u8>,
            secret1 in proptest::collection::vec(any::<u8>(), 1..64),
            secret2 in proptest::collection::vec(any::<u8>(), 1..64),
        ) {
            prop_assume!(secret1 != secret2);

            let sig = compute_signature(&payload, &secret1);
            let header = format_signature_header(&sig);
            prop_assert!(!verify_signature(&payload, &header, &secret2));
        }

        /// Property: any single-byte mutation of the payload flips
        /// verification to false.
        #[test]
        fn prop_single_byte_mutation_fails(
            payload in proptest::collection::vec(any::<u8>(), 1..256),
            secret in proptest::collection::vec(any::<u8>(), 1..64),
            index in any::<proptest::sample::Index>(),
            delta in 1u8..=255,
        ) {
            let sig = compute_signature(&payload, &secret);
            let header = format_signature_header(&sig);

            let mut mutated = payload.clone();
            let i = index.index(mutated.len());
            mutated[i] = mutated[i].wrapping_add(delta);
            prop_assert_ne!(&mutated, &payload);

            prop_assert!(verify_signature(&payload, &header, &secret));
            prop_assert!(!verify_signature(&mutated, &header, &secret));
        }

        /// Property: decode(format(signature)) roundtrips.
        #[test]
        fn prop_format_decode_roundtrip(signature: [u8; 32]) {
            let header = format_signature_header(&signature);
            let decoded = decode_signature_header(&header);
            prop_assert_eq!(decoded, Some(signature.to_vec()));
        }

        /// Property: compute_signature is deterministic.
        #[test]
        fn prop_signature_deterministic(payload: Vec<u8>, secret: Vec<u8>) {
            let sig1 = compute_signature(&payload, &secret);
            let sig2 = compute_signature(&payload, &secret);
            prop_assert_eq!(sig1, sig2);
        }

        /// Property: malformed headers never cause a panic.
        #[test]
        fn prop_malformed_header_no_panic(header: String, payload: Vec<u8>, secret: Vec<u8>) {
            let _ = decode_signature_header(&header);
            let _ = verify_signature(&payload, &header, &secret);
        }

        /// Property: an empty secret rejects everything.
        #[test]
        fn prop_empty_secret_rejects(payload: Vec<u8>, header: String) {
            prop_assert!(!verify_signature(&payload, &header, b""));
        }
    }
}
