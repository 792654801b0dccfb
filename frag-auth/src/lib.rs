//! HTTP Basic authentication for the fragments service.
//!
//! Credentials live in an htpasswd file with bcrypt hashes. A successful
//! check yields an [`AuthUser`] whose `owner_id` partitions that user's
//! fragments.

mod basic;
mod error;
mod htpasswd;

pub use basic::{hash_owner, AuthUser, BasicAuth};
pub use error::{AuthError, AuthResult};
pub use htpasswd::HtpasswdFile;
