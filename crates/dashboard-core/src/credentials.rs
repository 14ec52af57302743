//! # Credential Store
//!
//! The flat `user:secret` file consulted by the Basic Auth gate.
//!
//! ## File Format
//!
//! ```text
//! # comment
//! alice:plain-text-password
//! bob:$argon2id$v=19$m=19456,t=2,p=1$...
//! ```
//!
//! Secrets are either plaintext or Argon2 PHC strings (as printed by
//! `a11y-dashboard hash-password`). Other htpasswd schemes (`$apr1$`, bcrypt,
//! `{SHA}`, crypt) are rejected at load time rather than silently never
//! matching.

use crate::types::DashboardError;
use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use std::collections::BTreeMap;
use std::fmt;
use std::path::Path;
use subtle::ConstantTimeEq;

/// Prefixes of htpasswd hash schemes this store cannot verify.
const UNSUPPORTED_SCHEMES: [&str; 8] = [
    "$apr1$", "$2a$", "$2b$", "$2y$", "{SHA}", "$1$", "$5$", "$6$",
];

// =============================================================================
// SECRET
// =============================================================================

/// A stored secret. `Debug` never prints the secret itself.
#[derive(Clone, PartialEq, Eq)]
enum Secret {
    Plain(String),
    /// Argon2 PHC string, validated when loaded.
    Argon2(String),
}

impl fmt::Debug for Secret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Plain(_) => f.write_str("Plain(..)"),
            Self::Argon2(_) => f.write_str("Argon2(..)"),
        }
    }
}

// =============================================================================
// CREDENTIAL STORE
// =============================================================================

/// Read-only set of users and their secrets.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CredentialStore {
    entries: BTreeMap<String, Secret>,
}

impl CredentialStore {
    /// Build a store of plaintext entries.
    pub fn from_pairs<I, U, P>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (U, P)>,
        U: Into<String>,
        P: Into<String>,
    {
        let entries = pairs
            .into_iter()
            .map(|(user, password)| (user.into(), Secret::Plain(password.into())))
            .collect();
        Self { entries }
    }

    /// Read and parse a credential file.
    pub fn load(path: &Path) -> Result<Self, DashboardError> {
        let contents = std::fs::read_to_string(path).map_err(|e| {
            DashboardError::IoError(format!(
                "Cannot read credential file '{}': {}",
                path.display(),
                e
            ))
        })?;
        Self::parse(&contents)
    }

    /// Parse credential file contents.
    pub fn parse(contents: &str) -> Result<Self, DashboardError> {
        let mut entries = BTreeMap::new();

        for (index, raw) in contents.lines().enumerate() {
            let line_no = index + 1;
            // Plaintext secrets keep their surrounding whitespace.
            let line = raw.trim_start();
            if line.trim_end().is_empty() || line.starts_with('#') {
                continue;
            }

            let Some((user, secret)) = line.split_once(':') else {
                return Err(DashboardError::Credentials(format!(
                    "line {}: expected 'user:secret'",
                    line_no
                )));
            };
            let user = user.trim_end();
            if user.is_empty() {
                return Err(DashboardError::Credentials(format!(
                    "line {}: empty user name",
                    line_no
                )));
            }
            if entries.contains_key(user) {
                return Err(DashboardError::Credentials(format!(
                    "line {}: duplicate user '{}'",
                    line_no, user
                )));
            }

            entries.insert(user.to_string(), parse_secret(secret, line_no)?);
        }

        Ok(Self { entries })
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Whether verifying `user` runs a password hash (worth moving off the
    /// async executor).
    #[must_use]
    pub fn is_hashed(&self, user: &str) -> bool {
        matches!(self.entries.get(user), Some(Secret::Argon2(_)))
    }

    /// Check a user/password pair.
    #[must_use]
    pub fn verify(&self, user: &str, password: &str) -> bool {
        match self.entries.get(user) {
            Some(Secret::Plain(expected)) => constant_time_eq(password, expected),
            Some(Secret::Argon2(phc)) => PasswordHash::new(phc)
                .and_then(|hash| Argon2::default().verify_password(password.as_bytes(), &hash))
                .is_ok(),
            None => false,
        }
    }
}

fn parse_secret(secret: &str, line_no: usize) -> Result<Secret, DashboardError> {
    let hashed = secret.trim();
    if hashed.starts_with("$argon2") {
        PasswordHash::new(hashed).map_err(|e| {
            DashboardError::Credentials(format!("line {}: invalid Argon2 hash: {}", line_no, e))
        })?;
        return Ok(Secret::Argon2(hashed.to_string()));
    }

    if let Some(scheme) = UNSUPPORTED_SCHEMES
        .iter()
        .find(|scheme| hashed.starts_with(**scheme))
    {
        return Err(DashboardError::Credentials(format!(
            "line {}: unsupported hash scheme '{}' (use plaintext or Argon2)",
            line_no, scheme
        )));
    }

    Ok(Secret::Plain(secret.to_string()))
}

/// Compare two secrets without leaking where they differ.
///
/// Both sides are padded to the same length so `ct_eq` always runs over the
/// same number of bytes; the length check happens after.
fn constant_time_eq(provided: &str, expected: &str) -> bool {
    let provided_bytes = provided.as_bytes();
    let expected_bytes = expected.as_bytes();

    let max_len = provided_bytes.len().max(expected_bytes.len());
    let mut padded_provided = vec![0u8; max_len];
    let mut padded_expected = vec![0u8; max_len];
    padded_provided[..provided_bytes.len()].copy_from_slice(provided_bytes);
    padded_expected[..expected_bytes.len()].copy_from_slice(expected_bytes);

    let bytes_match: bool = padded_provided.ct_eq(&padded_expected).into();
    bytes_match && provided_bytes.len() == expected_bytes.len()
}

/// Hash `password` into an Argon2id PHC string suitable for the credential file.
pub fn hash_password(password: &str) -> Result<String, DashboardError> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| DashboardError::Credentials(format!("argon2 hash: {}", e)))
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_skips_comments_and_blank_lines() {
        let store = CredentialStore::parse("# admins\n\n  \nalice:secret\n  bob :hunter2\r\n")
            .expect("valid file");
        assert_eq!(store.len(), 2);
        assert!(store.verify("alice", "secret"));
        assert!(store.verify("bob", "hunter2"));
    }

    #[test]
    fn plaintext_secrets_keep_surrounding_spaces() {
        let store = CredentialStore::parse("alice: padded pass \n").expect("valid file");
        assert!(store.verify("alice", " padded pass "));
        assert!(!store.verify("alice", "padded pass"));
    }

    #[test]
    fn argon2_entries_tolerate_trailing_spaces() {
        let phc = hash_password("correct horse").expect("hashing works");
        let store = CredentialStore::parse(&format!("alice:{}  ", phc)).expect("valid file");
        assert!(store.verify("alice", "correct horse"));
    }

    #[test]
    fn plaintext_mismatch_rejected() {
        let store = CredentialStore::from_pairs([("alice", "secret")]);
        assert!(!store.verify("alice", "secre"));
        assert!(!store.verify("alice", "secrets"));
        assert!(!store.verify("alice", ""));
        assert!(!store.verify("mallory", "secret"));
    }

    #[test]
    fn password_may_contain_colons() {
        let store = CredentialStore::parse("alice:a:b:c").expect("valid file");
        assert!(store.verify("alice", "a:b:c"));
    }

    #[test]
    fn malformed_lines_rejected() {
        assert!(CredentialStore::parse("no-separator").is_err());
        assert!(CredentialStore::parse(":nouser").is_err());
        assert!(CredentialStore::parse("a:1\na:2").is_err());
    }

    #[test]
    fn unsupported_schemes_rejected() {
        assert!(CredentialStore::parse("alice:$apr1$abc$def").is_err());
        assert!(CredentialStore::parse("alice:{SHA}W6ph5Mm5Pz8GgiULbPgzG37mj9g=").is_err());
        assert!(CredentialStore::parse("alice:$argon2id$garbage").is_err());
    }

    #[test]
    fn argon2_entries_verify() {
        let phc = hash_password("correct horse").expect("hashing works");
        let store = CredentialStore::parse(&format!("alice:{}", phc)).expect("valid file");
        assert!(store.is_hashed("alice"));
        assert!(store.verify("alice", "correct horse"));
        assert!(!store.verify("alice", "battery staple"));
    }

    #[test]
    fn debug_hides_secrets() {
        let store = CredentialStore::from_pairs([("alice", "topsecret")]);
        assert!(!format!("{:?}", store).contains("topsecret"));
    }
}
