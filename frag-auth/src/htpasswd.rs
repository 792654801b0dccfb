use std::collections::HashMap;
use std::path::Path;

use bcrypt::verify;
use tracing::{debug, warn};

use crate::{AuthError, AuthResult};

const BCRYPT_PREFIXES: &[&str] = &["$2a$", "$2b$", "$2y$"];

/// Credentials loaded from an htpasswd file.
///
/// Only bcrypt entries are accepted (`htpasswd -B`). Blank lines and lines
/// starting with `#` are skipped.
#[derive(Debug, Clone, Default)]
pub struct HtpasswdFile {
    users: HashMap<String, String>,
}

impl HtpasswdFile {
    pub fn load(path: impl AsRef<Path>) -> AuthResult<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path).map_err(|source| AuthError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let file = Self::parse(&contents)?;
        debug!(path = %path.display(), users = file.len(), "htpasswd loaded");
        Ok(file)
    }

    pub fn parse(contents: &str) -> AuthResult<Self> {
        let mut users = HashMap::new();

        for (index, raw) in contents.lines().enumerate() {
            let line = raw.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            let number = index + 1;

            let (user, hash) = line
                .split_once(':')
                .ok_or_else(|| AuthError::invalid_entry(number, "expected user:hash"))?;
            if user.is_empty() {
                return Err(AuthError::invalid_entry(number, "empty user name"));
            }
            if !BCRYPT_PREFIXES.iter().any(|p| hash.starts_with(p)) {
                return Err(AuthError::invalid_entry(number, "only bcrypt hashes are supported"));
            }
            if users.insert(user.to_string(), hash.to_string()).is_some() {
                warn!(user, line = number, "duplicate htpasswd user, last entry wins");
            }
        }

        Ok(Self { users })
    }

    /// True when `user` exists and `password` matches its hash
    pub fn verify(&self, user: &str, password: &str) -> bool {
        let Some(hash) = self.users.get(user) else {
            return false;
        };
        verify(password, hash).unwrap_or(false)
    }

    pub fn len(&self) -> usize {
        self.users.len()
    }

    pub fn is_empty(&self) -> bool {
        self.users.is_empty()
    }
}
