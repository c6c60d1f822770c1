use crate::errors::ForgeResult;
use crate::models::Credential;

/// Persistent credential storage, owned by the embedding application.
///
/// The client calls this only at authenticate/refresh boundaries and never
/// persists session tokens itself.
pub trait ICredentialStore: Send + Sync {
    fn load(&self) -> ForgeResult<Option<Credential>>;
    fn save(&self, credential: &Credential) -> ForgeResult<()>;
    fn clear(&self) -> ForgeResult<()>;
}

/// A store that remembers nothing.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopCredentialStore;

impl ICredentialStore for NoopCredentialStore {
    fn load(&self) -> ForgeResult<Option<Credential>> {
        Ok(None)
    }

    fn save(&self, _credential: &Credential) -> ForgeResult<()> {
        Ok(())
    }

    fn clear(&self) -> ForgeResult<()> {
        Ok(())
    }
}
