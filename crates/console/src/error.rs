use thiserror::Error;

use portal_auth::AuthzError;
use portal_core::DomainError;
use portal_infra::{LoginError, SessionStoreError};

/// Everything a console command can fail with.
#[derive(Debug, Error)]
pub enum ConsoleError {
    #[error(transparent)]
    Login(#[from] LoginError),

    #[error(transparent)]
    Authz(#[from] AuthzError),

    #[error(transparent)]
    Domain(#[from] DomainError),

    #[error(transparent)]
    Storage(#[from] SessionStoreError),

    #[error("nothing to update: pass at least one field")]
    EmptyPatch,

    #[error("output error: {0}")]
    Output(#[from] std::io::Error),

    #[error("output serialization error: {0}")]
    Serialize(#[from] serde_json::Error),
}

pub type ConsoleResult<T> = Result<T, ConsoleError>;
