use dashmap::DashMap;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::fs;
use tokio::sync::{Mutex, OwnedMutexGuard};

use crate::config::Config;
use crate::errors::{AppError, AppResult};
use crate::models::UserRecord;

/// Per-identity mutexes serializing read-modify-write cycles. Needed as soon
/// as more than one caller can mutate the same identity at a time; a lost
/// update is otherwise possible because every save rewrites the whole record.
type RecordLocks = Arc<DashMap<String, Arc<Mutex<()>>>>;

/// Durable storage mapping identity -> UserRecord, one JSON file per
/// identity under the data directory.
#[derive(Clone)]
pub struct RecordStore {
    data_dir: PathBuf,
    locks: RecordLocks,
}

impl RecordStore {
    /// Opens (and creates if needed) the data directory.
    pub fn new(data_dir: impl Into<PathBuf>) -> AppResult<Self> {
        let data_dir = data_dir.into();
        std::fs::create_dir_all(&data_dir)?;
        Ok(Self {
            data_dir,
            locks: Arc::new(DashMap::new()),
        })
    }

    pub fn from_config(config: &Config) -> AppResult<Self> {
        Self::new(&config.storage.data_dir)
    }

    /// Identities double as file names, so anything that cannot be spelled
    /// safely in a path is rejected outright rather than normalized
    /// (normalizing could alias two identities to one record).
    pub fn validate_identity(identity: &str) -> AppResult<()> {
        let safe = !identity.is_empty()
            && identity
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'));
        if safe {
            Ok(())
        } else {
            Err(AppError::InvalidIdentity(identity.to_string()))
        }
    }

    fn record_path(&self, identity: &str) -> PathBuf {
        self.data_dir.join(format!("{}_data.json", identity))
    }

    /// Acquires the identity's mutation lock. Hold the returned guard across
    /// the whole load-modify-save cycle.
    ///
    /// The lock map retains one entry per identity ever locked. That is
    /// deliberate: entries are bounded by the registered user population and
    /// dropping one while a guard is in flight would let two cycles race.
    pub async fn lock(&self, identity: &str) -> OwnedMutexGuard<()> {
        let mutex = self
            .locks
            .entry(identity.to_string())
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone();
        mutex.lock_owned().await
    }

    /// Loads the record for an identity. A missing file, an unreadable file
    /// and malformed content all come back as `None` ("no account"); only
    /// the log line tells them apart. An identity that cannot name a record
    /// file is absent by definition.
    pub async fn load(&self, identity: &str) -> Option<UserRecord> {
        if Self::validate_identity(identity).is_err() {
            tracing::warn!("rejected path-unsafe identity on load: {:?}", identity);
            return None;
        }
        let path = self.record_path(identity);
        let data = match fs::read_to_string(&path).await {
            Ok(data) => data,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                tracing::debug!("no record for identity {}", identity);
                return None;
            }
            Err(e) => {
                tracing::warn!("failed to read record for {}: {}", identity, e);
                return None;
            }
        };

        match serde_json::from_str(&data) {
            Ok(record) => Some(record),
            Err(e) => {
                tracing::warn!(
                    "malformed record for {} at {}: {} (treating as absent)",
                    identity,
                    path.display(),
                    e
                );
                None
            }
        }
    }

    /// Serializes and writes the full record. Failures are surfaced to the
    /// caller and never retried. The identity is validated here too, so a
    /// caller going straight to the store cannot write outside the data
    /// directory.
    pub async fn save(&self, identity: &str, record: &UserRecord) -> AppResult<()> {
        Self::validate_identity(identity)?;
        let json = serde_json::to_string_pretty(record)?;
        fs::write(self.record_path(identity), json).await?;
        tracing::debug!("saved record for {}", identity);
        Ok(())
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }
}
