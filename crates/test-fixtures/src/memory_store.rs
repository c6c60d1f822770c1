use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use chrforge_core::errors::ForgeResult;
use chrforge_core::models::Credential;
use chrforge_core::traits::ICredentialStore;

/// Credential store that keeps one credential in memory and counts writes.
#[derive(Debug, Default)]
pub struct MemoryCredentialStore {
    credential: Mutex<Option<Credential>>,
    saves: AtomicUsize,
}

impl MemoryCredentialStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_credential(credential: Credential) -> Self {
        Self {
            credential: Mutex::new(Some(credential)),
            saves: AtomicUsize::new(0),
        }
    }

    pub fn current(&self) -> Option<Credential> {
        self.credential.lock().unwrap().clone()
    }

    pub fn save_count(&self) -> usize {
        self.saves.load(Ordering::SeqCst)
    }
}

impl ICredentialStore for MemoryCredentialStore {
    fn load(&self) -> ForgeResult<Option<Credential>> {
        Ok(self.credential.lock().unwrap().clone())
    }

    fn save(&self, credential: &Credential) -> ForgeResult<()> {
        self.saves.fetch_add(1, Ordering::SeqCst);
        *self.credential.lock().unwrap() = Some(credential.clone());
        Ok(())
    }

    fn clear(&self) -> ForgeResult<()> {
        *self.credential.lock().unwrap() = None;
        Ok(())
    }
}
