//! # Errors
//!
//! Every failure in the fragment core is a [`FragmentError`]. Callers branch
//! on [`FragmentError::kind`], never on message text.

use frag_blob::StoreError;
use thiserror::Error;

use crate::MediaType;

/// Result type for fragment operations
pub type FragmentResult<T> = Result<T, FragmentError>;

/// Error classes, each with the HTTP status a transport should use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    InvalidArgument,       // 400
    UnsupportedType,       // 415
    UnsupportedConversion, // 415
    NotFound,              // 404
    ConversionFailed,      // 422
    Storage,               // 500
}

impl ErrorKind {
    pub fn status_code(&self) -> u16 {
        match self {
            ErrorKind::InvalidArgument => 400,
            ErrorKind::UnsupportedType => 415,
            ErrorKind::UnsupportedConversion => 415,
            ErrorKind::NotFound => 404,
            ErrorKind::ConversionFailed => 422,
            ErrorKind::Storage => 500,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            ErrorKind::InvalidArgument => "InvalidArgument",
            ErrorKind::UnsupportedType => "UnsupportedType",
            ErrorKind::UnsupportedConversion => "UnsupportedConversion",
            ErrorKind::NotFound => "NotFound",
            ErrorKind::ConversionFailed => "ConversionFailed",
            ErrorKind::Storage => "StorageError",
        }
    }
}

#[derive(Error, Debug)]
pub enum FragmentError {
    #[error("Invalid argument: {message}")]
    InvalidArgument { message: String },

    #[error("Unsupported fragment type: {content_type}")]
    UnsupportedType { content_type: String },

    #[error("Unsupported conversion from {from} to {to}")]
    UnsupportedConversion { from: String, to: String },

    #[error("Fragment not found: {id}")]
    NotFound { id: String },

    #[error("Unable to convert {from} to {to}: {reason}")]
    ConversionFailed {
        from: MediaType,
        to: MediaType,
        reason: String,
    },

    #[error("Storage error: {source}")]
    Storage {
        #[from]
        source: StoreError,
    },
}

impl FragmentError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            FragmentError::InvalidArgument { .. } => ErrorKind::InvalidArgument,
            FragmentError::UnsupportedType { .. } => ErrorKind::UnsupportedType,
            FragmentError::UnsupportedConversion { .. } => ErrorKind::UnsupportedConversion,
            FragmentError::NotFound { .. } => ErrorKind::NotFound,
            FragmentError::ConversionFailed { .. } => ErrorKind::ConversionFailed,
            FragmentError::Storage { .. } => ErrorKind::Storage,
        }
    }

    /// Create an invalid argument error
    pub fn invalid<S: Into<String>>(message: S) -> Self {
        Self::InvalidArgument {
            message: message.into(),
        }
    }

    /// Create an unsupported type error
    pub fn unsupported_type<S: Into<String>>(content_type: S) -> Self {
        Self::UnsupportedType {
            content_type: content_type.into(),
        }
    }

    /// Create an unsupported conversion error
    pub fn unsupported_conversion<F: Into<String>, T: Into<String>>(from: F, to: T) -> Self {
        Self::UnsupportedConversion {
            from: from.into(),
            to: to.into(),
        }
    }

    /// Create a not found error
    pub fn not_found<S: Into<String>>(id: S) -> Self {
        Self::NotFound { id: id.into() }
    }

    /// Create a conversion failure from any error type
    pub fn conversion_failed<E: std::fmt::Display>(from: MediaType, to: MediaType, error: E) -> Self {
        Self::ConversionFailed {
            from,
            to,
            reason: error.to_string(),
        }
    }

    /// Message that is safe to hand to clients. Storage causes stay in the logs.
    pub fn client_message(&self) -> String {
        match self {
            FragmentError::Storage { .. } => "Storage error".to_string(),
            other => other.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kinds_map_to_status_codes() {
        assert_eq!(FragmentError::invalid("x").kind().status_code(), 400);
        assert_eq!(FragmentError::unsupported_type("a/b").kind().status_code(), 415);
        assert_eq!(
            FragmentError::unsupported_conversion("a/b", "c/d").kind().status_code(),
            415
        );
        assert_eq!(FragmentError::not_found("id").kind().status_code(), 404);
        assert_eq!(
            FragmentError::from(StoreError::backend_msg("boom")).kind(),
            ErrorKind::Storage
        );
    }

    #[test]
    fn storage_details_are_not_exposed_to_clients() {
        let err = FragmentError::from(StoreError::backend_msg("bucket secret-bucket is gone"));
        assert!(err.to_string().contains("secret-bucket"));
        assert!(!err.client_message().contains("secret-bucket"));
    }
}
