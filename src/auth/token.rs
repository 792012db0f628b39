//! Session token and calendar reference generation.
//!
//! Raw session tokens are random hex secrets handed to the client; only
//! their SHA-256 hash is ever persisted. Calendar references are short
//! URL-safe identifiers used as public, unguessable lookup keys.

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
use rand::Rng;
use sha2::{Digest, Sha256};
use subtle::ConstantTimeEq;

/// Generate a cryptographically random session token.
///
/// Returns a hex-encoded string (64 characters) from 32 random bytes.
pub fn generate_session_token() -> String {
    let mut rng = rand::rng();
    let mut bytes = [0u8; 32];
    rng.fill(&mut bytes);
    hex::encode(bytes)
}

/// SHA-256 of a string, rendered as lowercase hex.
///
/// Used to derive the stored form of a session token; the raw secret
/// never reaches storage.
pub fn sha256_hex(input: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(input.as_bytes());
    hex::encode(hasher.finalize())
}

/// Constant-time string comparison.
///
/// Used for integrity tags and webhook secrets so that comparison time
/// does not depend on where the first mismatching byte sits.
pub fn constant_time_eq(a: &str, b: &str) -> bool {
    a.as_bytes().ct_eq(b.as_bytes()).into()
}

/// Generate an unguessable, URL-safe reference of `len` characters.
///
/// Each character carries 6 bits of entropy (base64 alphabet with `+`, `/`
/// replaced and padding stripped). The generator gives no uniqueness
/// guarantee; collision probability is negligible at len >= 8 and the
/// storage layer owns the keyspace.
pub fn generate_reference(len: usize) -> String {
    let byte_len = (len * 6).div_ceil(8);
    let mut rng = rand::rng();
    let mut bytes = vec![0u8; byte_len];
    rng.fill(bytes.as_mut_slice());

    let mut encoded = URL_SAFE_NO_PAD.encode(&bytes);
    encoded.truncate(len);
    encoded
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_session_token() {
        let token = generate_session_token();

        // 32 bytes as hex is 64 characters
        assert_eq!(token.len(), 64);
        assert!(token.chars().all(|c| c.is_ascii_hexdigit()));

        // Hex must be lowercase
        assert_eq!(token, token.to_lowercase());
    }

    #[test]
    fn test_tokens_are_unique() {
        let token1 = generate_session_token();
        let token2 = generate_session_token();
        assert_ne!(token1, token2);
    }

    #[test]
    fn test_sha256_known_vector() {
        // NIST test vector for SHA-256("abc")
        assert_eq!(
            sha256_hex("abc"),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }

    #[test]
    fn test_sha256_differs_per_input() {
        assert_ne!(sha256_hex("token-a"), sha256_hex("token-b"));
    }

    #[test]
    fn test_constant_time_eq() {
        assert!(constant_time_eq("same", "same"));
        assert!(!constant_time_eq("same", "sama"));
        assert!(!constant_time_eq("short", "longer"));
        assert!(constant_time_eq("", ""));
    }

    #[test]
    fn test_generate_reference_length_and_alphabet() {
        for len in [6, 8, 12, 21] {
            let reference = generate_reference(len);
            assert_eq!(reference.len(), len);
            assert!(reference
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_'));
            // URL-safe: none of the stripped/replaced characters
            assert!(!reference.contains('+'));
            assert!(!reference.contains('/'));
            assert!(!reference.contains('='));
        }
    }

    #[test]
    fn test_references_are_unique() {
        let a = generate_reference(8);
        let b = generate_reference(8);
        assert_ne!(a, b);
    }
}
