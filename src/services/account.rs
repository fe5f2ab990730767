use crate::errors::{AppError, AppResult};
use crate::models::UserRecord;
use crate::services::RecordStore;

/// Registration and credential verification. Passwords are stored and
/// compared as plain strings to keep the legacy on-disk record format
/// stable. Known weak point, not a pattern to copy.
#[derive(Clone)]
pub struct AccountManager {
    store: RecordStore,
}

impl AccountManager {
    pub fn new(store: RecordStore) -> Self {
        Self { store }
    }

    /// Creates and persists a fresh record for a new identity.
    pub async fn register(&self, identity: &str, credential: &str) -> AppResult<()> {
        RecordStore::validate_identity(identity)?;

        let _guard = self.store.lock(identity).await;
        if self.store.load(identity).await.is_some() {
            return Err(AppError::AccountExists(identity.to_string()));
        }

        self.store.save(identity, &UserRecord::new(credential)).await?;
        tracing::info!("registered new identity {}", identity);
        Ok(())
    }

    /// Succeeds only if a record exists and its stored credential equals the
    /// supplied value verbatim. An absent account and a wrong password are
    /// indistinguishable to the caller.
    pub async fn authenticate(&self, identity: &str, credential: &str) -> AppResult<()> {
        RecordStore::validate_identity(identity)?;
        tracing::info!("login attempt for identity {}", identity);

        match self.store.load(identity).await {
            Some(record) if record.verify_credential(credential) => Ok(()),
            Some(_) => {
                tracing::info!("invalid password for identity {}", identity);
                Err(AppError::InvalidCredentials)
            }
            None => {
                tracing::info!("login for unknown identity {}", identity);
                Err(AppError::InvalidCredentials)
            }
        }
    }
}
