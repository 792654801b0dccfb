use std::sync::Arc;

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use sha2::{Digest, Sha256};
use tracing::debug;

use crate::{AuthError, AuthResult, HtpasswdFile};

/// An authenticated caller
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthUser {
    pub email: String,
    /// Stable storage partition key derived from `email`
    pub owner_id: String,
}

/// Lowercase hex SHA-256 of the user name. Raw emails never reach storage.
pub fn hash_owner(email: &str) -> String {
    hex::encode(Sha256::digest(email.as_bytes()))
}

/// `Authorization: Basic ...` checked against an [`HtpasswdFile`].
#[derive(Debug, Clone)]
pub struct BasicAuth {
    htpasswd: Arc<HtpasswdFile>,
}

impl BasicAuth {
    pub fn new(htpasswd: HtpasswdFile) -> Self {
        Self {
            htpasswd: Arc::new(htpasswd),
        }
    }

    pub fn from_file(path: impl AsRef<std::path::Path>) -> AuthResult<Self> {
        Ok(Self::new(HtpasswdFile::load(path)?))
    }

    /// Check the raw `Authorization` header value.
    ///
    /// bcrypt is slow on purpose; async callers should run this on the
    /// blocking pool.
    pub fn authenticate(&self, authorization: Option<&str>) -> AuthResult<AuthUser> {
        let (email, password) = authorization
            .and_then(decode_basic)
            .ok_or(AuthError::NotAuthenticated)?;

        if !self.htpasswd.verify(&email, &password) {
            debug!("basic auth rejected");
            return Err(AuthError::NotAuthenticated);
        }

        Ok(AuthUser {
            owner_id: hash_owner(&email),
            email,
        })
    }
}

fn decode_basic(header: &str) -> Option<(String, String)> {
    let (scheme, encoded) = header.trim().split_once(' ')?;
    if !scheme.eq_ignore_ascii_case("basic") {
        return None;
    }
    let decoded = STANDARD.decode(encoded.trim()).ok()?;
    let decoded = String::from_utf8(decoded).ok()?;
    let (user, password) = decoded.split_once(':')?;
    if user.is_empty() {
        return None;
    }
    Some((user.to_string(), password.to_string()))
}
