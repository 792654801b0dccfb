use std::path::PathBuf;

use thiserror::Error;

pub type AuthResult<T> = Result<T, AuthError>;

#[derive(Error, Debug)]
pub enum AuthError {
    /// Missing, malformed or wrong credentials. Deliberately says nothing more.
    #[error("Not authenticated")]
    NotAuthenticated,

    #[error("Invalid htpasswd entry on line {line}: {message}")]
    InvalidEntry { line: usize, message: String },

    #[error("Unable to read htpasswd file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl AuthError {
    pub fn invalid_entry<S: Into<String>>(line: usize, message: S) -> Self {
        Self::InvalidEntry {
            line,
            message: message.into(),
        }
    }
}
