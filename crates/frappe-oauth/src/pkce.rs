//! PKCE (Proof Key for Code Exchange) implementation for OAuth 2.0
//!
//! Implements RFC 7636 for binding an authorization code to the client that
//! requested it. The verifier stays with the caller until token exchange; the
//! challenge travels in the authorization request.

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use rand::Rng;
use sha2::{Digest, Sha256};

use crate::error::PkceError;

/// Unreserved URL-safe alphabet allowed in code verifiers (RFC 7636 §4.1).
const VERIFIER_CHARSET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789-._~";

/// Minimum code verifier length in characters.
pub const MIN_VERIFIER_LENGTH: usize = 43;
/// Maximum code verifier length in characters.
pub const MAX_VERIFIER_LENGTH: usize = 128;

/// Minimum state length in random bytes.
pub const MIN_STATE_BYTES: usize = 16;
/// Maximum state length in random bytes.
pub const MAX_STATE_BYTES: usize = 32;

/// Generate a cryptographically secure code verifier
///
/// Produces `length` characters drawn uniformly from the unreserved charset
/// `[A-Za-z0-9-._~]`. `rand::thread_rng` is a CSPRNG reseeded from the
/// operating system; there is no non-cryptographic fallback path.
///
/// # Errors
/// Returns [`PkceError::VerifierLength`] if `length` is outside 43..=128.
/// The length is never clamped.
pub fn generate_code_verifier(length: usize) -> Result<String, PkceError> {
    if !(MIN_VERIFIER_LENGTH..=MAX_VERIFIER_LENGTH).contains(&length) {
        return Err(PkceError::VerifierLength { requested: length });
    }

    let mut rng = rand::thread_rng();
    let verifier = (0..length)
        .map(|_| {
            let idx = rng.gen_range(0..VERIFIER_CHARSET.len());
            char::from(VERIFIER_CHARSET[idx])
        })
        .collect();

    Ok(verifier)
}

/// Generate a code challenge from a verifier using SHA-256
///
/// Per RFC 7636 the challenge is `BASE64URL(SHA256(ASCII(code_verifier)))`
/// with padding stripped. Pure and deterministic: the same verifier always
/// yields the same 43-character challenge.
#[must_use]
pub fn generate_code_challenge(verifier: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(verifier.as_bytes());
    URL_SAFE_NO_PAD.encode(hasher.finalize())
}

/// Generate a random state token for CSRF protection
///
/// Encodes `bytes` cryptographically random bytes as base64url. The state is
/// bound to exactly one authorization attempt and never reused.
///
/// # Errors
/// Returns [`PkceError::StateLength`] if `bytes` is outside 16..=32.
pub fn generate_state(bytes: usize) -> Result<String, PkceError> {
    if !(MIN_STATE_BYTES..=MAX_STATE_BYTES).contains(&bytes) {
        return Err(PkceError::StateLength { requested: bytes });
    }

    let mut rng = rand::thread_rng();
    let random_bytes: Vec<u8> = (0..bytes).map(|_| rng.gen()).collect();
    Ok(URL_SAFE_NO_PAD.encode(random_bytes))
}

/// Validate that the state token matches
///
/// # Arguments
/// * `expected` - The state that was sent in the authorization request
/// * `actual` - The state received in the callback
#[must_use]
pub fn validate_state(expected: &str, actual: &str) -> bool {
    expected == actual
}

/// PKCE verifier/challenge pair for one authorization attempt
///
/// The challenge is derived from the verifier exactly once at construction;
/// the two can never drift apart. The CSRF state token is a separate value
/// (see [`generate_state`]) because it has a different lifecycle: it is
/// correlated by the callback route, while the verifier is held back for the
/// token exchange.
#[derive(Debug, Clone)]
pub struct PkcePair {
    /// Random string (43-128 chars from the unreserved charset).
    /// Kept secret until token exchange.
    pub code_verifier: String,

    /// SHA256 hash of `code_verifier`, base64url encoded.
    /// Sent in the authorization request for server validation.
    pub code_challenge: String,
}

impl PkcePair {
    /// Generate a new pair with a 43-character verifier
    ///
    /// # Errors
    /// Returns an error only if the default length were out of range, which
    /// it is not; the `Result` mirrors [`generate_code_verifier`].
    pub fn generate() -> Result<Self, PkceError> {
        Self::with_verifier_length(MIN_VERIFIER_LENGTH)
    }

    /// Generate a new pair with a verifier of the given length
    ///
    /// # Errors
    /// Returns [`PkceError::VerifierLength`] if `length` is outside 43..=128.
    pub fn with_verifier_length(length: usize) -> Result<Self, PkceError> {
        let code_verifier = generate_code_verifier(length)?;
        let code_challenge = generate_code_challenge(&code_verifier);

        Ok(Self { code_verifier, code_challenge })
    }

    /// Get the challenge method (always "S256" for SHA256)
    #[must_use]
    pub fn method(&self) -> &'static str {
        "S256"
    }
}

#[cfg(test)]
mod tests {
    //! Unit tests for pkce.
    use super::*;

    #[test]
    fn test_verifier_length_and_charset() {
        for length in [43, 64, 128] {
            let verifier = generate_code_verifier(length).expect("valid length");
            assert_eq!(verifier.len(), length);
            assert!(verifier.bytes().all(|b| VERIFIER_CHARSET.contains(&b)));
        }
    }

    #[test]
    fn test_verifier_rejects_out_of_range_length() {
        assert!(matches!(
            generate_code_verifier(42),
            Err(PkceError::VerifierLength { requested: 42 })
        ));
        assert!(matches!(
            generate_code_verifier(129),
            Err(PkceError::VerifierLength { requested: 129 })
        ));
    }

    #[test]
    fn test_challenge_is_deterministic_43_char_base64url() {
        let verifier = generate_code_verifier(43).expect("valid length");

        let challenge1 = generate_code_challenge(&verifier);
        let challenge2 = generate_code_challenge(&verifier);

        assert_eq!(challenge1, challenge2);
        // SHA-256 digest is 32 bytes -> 43 base64url chars, no padding
        assert_eq!(challenge1.len(), 43);
        assert!(!challenge1.contains('='));
        assert!(!challenge1.contains('+'));
        assert!(!challenge1.contains('/'));
    }

    #[test]
    fn test_known_challenge_vector() {
        // RFC 7636 appendix B test vector
        let verifier = "dBjftJeZ4CVP-mB92K27uhbUJU1p1r_wW1gFWFOEjXk";
        assert_eq!(generate_code_challenge(verifier), "E9Melhoa2OwvFrEMTJguCHaoeK1t8URWbuGJSstw-cM");
    }

    #[test]
    fn test_state_generation() {
        let state = generate_state(32).expect("valid length");
        assert!(!state.is_empty());
        assert!(!state.contains('='));
        assert!(!state.contains('+'));
        assert!(!state.contains('/'));

        assert!(matches!(generate_state(8), Err(PkceError::StateLength { requested: 8 })));
        assert!(matches!(generate_state(64), Err(PkceError::StateLength { requested: 64 })));
    }

    #[test]
    fn test_state_validation() {
        let state1 = generate_state(16).expect("valid length");
        let state2 = generate_state(16).expect("valid length");

        assert_ne!(state1, state2);
        assert!(validate_state(&state1, &state1));
        assert!(!validate_state(&state1, &state2));
        assert!(!validate_state(&state1, "invalid"));
    }

    #[test]
    fn test_pair_challenge_matches_verifier() {
        let pair = PkcePair::generate().expect("generation succeeds");

        assert_eq!(pair.code_verifier.len(), 43);
        assert_eq!(pair.code_challenge, generate_code_challenge(&pair.code_verifier));
        assert_eq!(pair.method(), "S256");
    }

    #[test]
    fn test_pairs_are_unique() {
        let pair1 = PkcePair::generate().expect("generation succeeds");
        let pair2 = PkcePair::generate().expect("generation succeeds");

        assert_ne!(pair1.code_verifier, pair2.code_verifier);
        assert_ne!(pair1.code_challenge, pair2.code_challenge);
    }
}
