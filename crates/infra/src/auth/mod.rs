//! OAuth client-credentials handling
//!
//! [`CredentialManager`] owns the single live access token and refreshes it
//! on demand. The request pipeline talks to it through [`CredentialProvider`]
//! so tests can substitute a fixed token source.

mod credential_manager;
mod types;

use async_trait::async_trait;
use erpbridge_domain::Result;

pub use credential_manager::CredentialManager;
pub use types::{expiry_for, Credential, TokenResponse, EXPIRY_MARGIN};

/// Source of bearer credentials for outbound calls
#[async_trait]
pub trait CredentialProvider: Send + Sync {
    /// Return a credential that is valid now, exchanging for a new one if
    /// needed.
    async fn ensure_valid(&self) -> Result<Credential>;

    /// Forget the stored credential unconditionally.
    async fn invalidate(&self);

    /// Forget the stored credential only if it is still `token`. Returns
    /// whether anything was cleared.
    async fn invalidate_rejected(&self, token: &str) -> bool;
}
