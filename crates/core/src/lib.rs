//! `portal-core` — shared building blocks for the admin portal.
//!
//! Pure types only: identifiers and the directory error model.

pub mod error;
pub mod id;

pub use error::{DomainError, DomainResult};
pub use id::UserId;
