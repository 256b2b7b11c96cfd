//! Back-office password check.
//!
//! The back office is protected by a single shared password from the
//! environment. Candidates are compared by HMAC-SHA256 digest so the check
//! takes the same time whatever the input.

use hmac::{Hmac, Mac};
use secrecy::{ExposeSecret, SecretString};
use sha2::Sha256;

type HmacSha256 = Hmac<Sha256>;

/// Fixed HMAC key; it only separates this use of SHA-256 from others.
const DIGEST_KEY: &[u8] = b"trailforge-admin-password";

/// Verifies candidate passwords against the configured one.
#[derive(Clone)]
pub struct PasswordGate {
    expected: Option<Vec<u8>>,
}

impl PasswordGate {
    /// Gate for the configured password.
    #[must_use]
    pub fn new(password: &SecretString) -> Self {
        Self {
            expected: digest(password.expose_secret()),
        }
    }

    /// Whether `candidate` matches the configured password.
    #[must_use]
    pub fn verify(&self, candidate: &str) -> bool {
        let Some(expected) = &self.expected else {
            return false;
        };
        let Ok(mut mac) = HmacSha256::new_from_slice(DIGEST_KEY) else {
            return false;
        };
        mac.update(candidate.as_bytes());

        // Constant-time comparison
        mac.verify_slice(expected).is_ok()
    }
}

impl std::fmt::Debug for PasswordGate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PasswordGate")
            .field("expected", &"[REDACTED]")
            .finish()
    }
}

fn digest(value: &str) -> Option<Vec<u8>> {
    let mut mac = HmacSha256::new_from_slice(DIGEST_KEY).ok()?;
    mac.update(value.as_bytes());
    Some(mac.finalize().into_bytes().to_vec())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_verify_accepts_exact_password() {
        let gate = PasswordGate::new(&SecretString::from("k9#Lw2!qTz7mVb"));
        assert!(gate.verify("k9#Lw2!qTz7mVb"));
    }

    #[test]
    fn test_verify_rejects_near_misses() {
        let gate = PasswordGate::new(&SecretString::from("k9#Lw2!qTz7mVb"));
        for candidate in ["", "k9#Lw2!qTz7mV", "k9#Lw2!qTz7mVb ", "K9#LW2!QTZ7MVB"] {
            assert!(!gate.verify(candidate), "{candidate:?}");
        }
    }

    #[test]
    fn test_debug_redacts_digest() {
        let gate = PasswordGate::new(&SecretString::from("k9#Lw2!qTz7mVb"));
        assert!(format!("{gate:?}").contains("[REDACTED]"));
    }
}
