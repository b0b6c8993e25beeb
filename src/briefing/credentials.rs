//! Credential selection seam used by the media fan-out.

use async_trait::async_trait;

/// Host capability for choosing a different credential.
///
/// Asked by the media fan-out when the video service reports that the
/// current key cannot see the requested model.
#[async_trait]
pub trait CredentialProvider: Send + Sync {
    /// Let the user select a credential. Returns `true` once one is in place.
    async fn ensure_selected(&self) -> bool;
}

/// Never selects anything. Used when no user is available to ask.
#[derive(Debug, Default, Clone, Copy)]
pub struct DenyCredentials;

#[async_trait]
impl CredentialProvider for DenyCredentials {
    async fn ensure_selected(&self) -> bool {
        false
    }
}
