use async_trait::async_trait;
use thiserror::Error;

use crate::Identity;

/// Why a login attempt was refused.
///
/// Unknown handles and wrong secrets are deliberately the same variant so a
/// caller cannot probe which handles exist.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AuthFailure {
    #[error("Invalid username or password")]
    InvalidCredentials,
}

/// Checks a submitted handle/secret pair.
///
/// Implementations may suspend (the mock backend simulates network latency).
/// On success the identity is returned by value.
#[async_trait]
pub trait CredentialVerifier: Send + Sync {
    async fn verify(&self, handle: &str, secret: &str) -> Result<Identity, AuthFailure>;
}

#[async_trait]
impl<V> CredentialVerifier for std::sync::Arc<V>
where
    V: CredentialVerifier + ?Sized,
{
    async fn verify(&self, handle: &str, secret: &str) -> Result<Identity, AuthFailure> {
        (**self).verify(handle, secret).await
    }
}
