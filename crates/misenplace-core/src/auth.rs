//! Staff sign-in.
//!
//! The engine never checks credentials itself. A front end authenticates
//! through an [`Authenticator`] and passes the resulting principal's name on
//! as the cook identity.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::error::AuthError;
use crate::storage::{AuthConfig, AuthMode};

/// An authenticated staff member.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Principal {
    pub name: String,
}

/// Every credential source implements this trait.
pub trait Authenticator: Send + Sync {
    /// Check `secret` for `identity` and return who signed in.
    fn authenticate(&self, identity: &str, secret: &str) -> Result<Principal, AuthError>;

    /// Whether sign-in requires a password at all.
    fn requires_secret(&self) -> bool {
        true
    }
}

/// Hex SHA-256 digest of a password, as stored in the config file.
pub fn hash_secret(secret: &str) -> String {
    hex::encode(Sha256::digest(secret.as_bytes()))
}

/// Compare a password against a stored digest without an early exit.
fn verify_secret(secret: &str, digest: &str) -> bool {
    let actual = hash_secret(secret);
    let expected = digest.trim().to_ascii_lowercase();
    if actual.len() != expected.len() {
        return false;
    }
    actual
        .bytes()
        .zip(expected.bytes())
        .fold(0u8, |acc, (a, b)| acc | (a ^ b))
        == 0
}

/// Authenticator backed by the `[auth]` config section.
#[derive(Debug, Clone)]
pub struct StaticAuthenticator {
    config: AuthConfig,
}

impl StaticAuthenticator {
    pub fn new(config: AuthConfig) -> Self {
        Self { config }
    }
}

impl Authenticator for StaticAuthenticator {
    fn authenticate(&self, identity: &str, secret: &str) -> Result<Principal, AuthError> {
        let name = identity.trim();
        if name.is_empty() {
            return Err(AuthError::InvalidCredentials(identity.to_string()));
        }

        let accepted = match self.config.mode {
            AuthMode::Disabled => true,
            AuthMode::SharedPassword => {
                let digest = self
                    .config
                    .shared_password_sha256
                    .as_deref()
                    .filter(|d| !d.trim().is_empty())
                    .ok_or(AuthError::NotConfigured)?;
                verify_secret(secret, digest)
            }
            AuthMode::NamedUsers => {
                if self.config.users.is_empty() {
                    return Err(AuthError::NotConfigured);
                }
                self.config
                    .users
                    .get(name)
                    .is_some_and(|digest| verify_secret(secret, digest))
            }
        };

        if accepted {
            tracing::info!(user = name, "staff member signed in");
            Ok(Principal { name: name.to_string() })
        } else {
            tracing::warn!(user = name, "rejected sign-in");
            Err(AuthError::InvalidCredentials(name.to_string()))
        }
    }

    fn requires_secret(&self) -> bool {
        self.config.mode != AuthMode::Disabled
    }
}
