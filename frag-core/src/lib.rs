//! # frag-core
//!
//! The fragment domain: the [`Fragment`] descriptor, the closed set of
//! [`MediaType`]s with their conversion graph, the conversion engine, and the
//! [`Fragments`] repository that keeps metadata and payload in step.
//!
//! ```rust
//! use frag_blob::FragmentDb;
//! use frag_core::{Fragment, Fragments};
//!
//! # #[tokio::main]
//! # async fn main() -> frag_core::FragmentResult<()> {
//! let fragments = Fragments::new(FragmentDb::memory());
//!
//! let mut fragment = Fragment::new("owner", "text/markdown")?;
//! fragments.set_data(&mut fragment, "# Hello").await?;
//!
//! let html = fragments.get_converted_data(&fragment, Some("text/html")).await?;
//! assert_eq!(&html[..], b"<h1>Hello</h1>\n");
//! # Ok(())
//! # }
//! ```

pub mod convert;
mod error;
mod fragment;
mod media;
mod repo;

pub use error::{ErrorKind, FragmentError, FragmentResult};
pub use fragment::{Fragment, FragmentBuilder};
pub use media::{is_supported_type, MediaType};
pub use repo::{FragmentList, Fragments};
