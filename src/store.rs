//! Record Store
//!
//! Session-scoped cache of the last upload and the records fetched for it.
//! The session is an explicit value with a load / save / clear lifecycle;
//! nothing reads or writes it implicitly.
//!
//! On disk the session is a single JSON file (`session.json`) written
//! atomically via a temp file and rename.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use thiserror::Error;
use uuid::Uuid;

use crate::records::{HealthRecord, UploadSummary};

const SESSION_FILE: &str = "session.json";

/// State carried between commands
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Session {
    /// Identifier of this session
    pub id: Uuid,
    /// Set once an upload has succeeded; gates every page except upload
    #[serde(default)]
    pub authenticated: bool,
    /// Result of the last upload
    #[serde(default)]
    pub upload: Option<UploadSummary>,
    /// Records cached for the pages
    #[serde(default)]
    pub records: Vec<HealthRecord>,
    /// When the session was started
    pub created_at: DateTime<Utc>,
}

impl Session {
    pub fn new() -> Self {
        Self {
            id: Uuid::new_v4(),
            authenticated: false,
            upload: None,
            records: Vec::new(),
            created_at: Utc::now(),
        }
    }

    /// Fresh authenticated session from an upload result
    ///
    /// Records returned with the upload move into the session cache.
    pub fn from_upload(mut summary: UploadSummary) -> Self {
        let records = std::mem::take(&mut summary.records);
        Self {
            authenticated: true,
            upload: Some(summary),
            records,
            ..Self::new()
        }
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

/// Fail unless the session has been authenticated by an upload
pub fn require_auth(session: &Session) -> StoreResult<()> {
    if session.authenticated {
        Ok(())
    } else {
        Err(StoreError::NotAuthenticated)
    }
}

enum Backend {
    File(PathBuf),
    Memory(Mutex<Option<Session>>),
}

/// Persistent home of the current `Session`
pub struct RecordStore {
    backend: Backend,
}

impl RecordStore {
    /// Open a file-backed store in `dir`, creating the directory if needed
    pub fn open(dir: impl AsRef<Path>) -> StoreResult<Self> {
        let dir = dir.as_ref();
        std::fs::create_dir_all(dir)?;
        Ok(Self {
            backend: Backend::File(dir.join(SESSION_FILE)),
        })
    }

    /// Store that lives only as long as this value
    pub fn in_memory() -> Self {
        Self {
            backend: Backend::Memory(Mutex::new(None)),
        }
    }

    /// Path of the session file, if file-backed
    pub fn path(&self) -> Option<&Path> {
        match &self.backend {
            Backend::File(path) => Some(path),
            Backend::Memory(_) => None,
        }
    }

    /// Load the current session, or a fresh one if none was saved
    pub fn load(&self) -> StoreResult<Session> {
        match &self.backend {
            Backend::File(path) => {
                let content = match std::fs::read_to_string(path) {
                    Ok(content) => content,
                    Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                        return Ok(Session::new())
                    }
                    Err(e) => return Err(e.into()),
                };

                serde_json::from_str(&content).map_err(|e| StoreError::Corrupt {
                    path: path.clone(),
                    error: e.to_string(),
                })
            }
            Backend::Memory(slot) => Ok(slot
                .lock()
                .map_err(|e| StoreError::Lock(e.to_string()))?
                .clone()
                .unwrap_or_default()),
        }
    }

    /// Persist `session`, replacing whatever was saved before
    pub fn save(&self, session: &Session) -> StoreResult<()> {
        match &self.backend {
            Backend::File(path) => {
                let json = serde_json::to_vec(session)?;
                let tmp = path.with_extension("json.tmp");
                std::fs::write(&tmp, json)?;
                std::fs::rename(&tmp, path)?;

                tracing::debug!(
                    session_id = %session.id,
                    records = session.records.len(),
                    "Saved session"
                );
                Ok(())
            }
            Backend::Memory(slot) => {
                *slot.lock().map_err(|e| StoreError::Lock(e.to_string()))? = Some(session.clone());
                Ok(())
            }
        }
    }

    /// Forget the session; clearing an empty store is not an error
    pub fn clear(&self) -> StoreResult<()> {
        match &self.backend {
            Backend::File(path) => match std::fs::remove_file(path) {
                Ok(()) => {
                    tracing::info!("Cleared session");
                    Ok(())
                }
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
                Err(e) => Err(e.into()),
            },
            Backend::Memory(slot) => {
                *slot.lock().map_err(|e| StoreError::Lock(e.to_string()))? = None;
                Ok(())
            }
        }
    }
}

/// Errors that can occur in the record store
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Session file {path:?} is corrupt ({error}); run `ownmyhealth logout` to reset it")]
    Corrupt { path: PathBuf, error: String },

    #[error("Not signed in. Upload a health export first with `ownmyhealth upload <file>`")]
    NotAuthenticated,

    #[error("Lock error: {0}")]
    Lock(String),
}

impl From<serde_json::Error> for StoreError {
    fn from(err: serde_json::Error) -> Self {
        StoreError::Serialization(err.to_string())
    }
}

/// Result type alias for store operations
pub type StoreResult<T> = Result<T, StoreError>;

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn summary() -> UploadSummary {
        UploadSummary {
            message: "File processed.".to_string(),
            records_loaded: 2,
            records: vec![
                HealthRecord::sleep("Asleep", "2024-01-02T23:00:00Z", "2024-01-03T07:00:00Z"),
                HealthRecord::point("HeartRate", 58.0, "2024-01-03T08:00:00Z"),
            ],
        }
    }

    #[test]
    fn test_load_missing_is_fresh_session() {
        let dir = tempdir().unwrap();
        let store = RecordStore::open(dir.path()).unwrap();

        let session = store.load().unwrap();
        assert!(!session.authenticated);
        assert!(session.records.is_empty());
        assert!(require_auth(&session).is_err());
    }

    #[test]
    fn test_save_load_clear() {
        let dir = tempdir().unwrap();
        let store = RecordStore::open(dir.path().join("nested")).unwrap();

        let session = Session::from_upload(summary());
        store.save(&session).unwrap();
        assert!(store.path().unwrap().exists());

        let loaded = store.load().unwrap();
        assert_eq!(loaded, session);
        assert!(require_auth(&loaded).is_ok());
        assert_eq!(loaded.records.len(), 2);
        assert!(loaded.upload.as_ref().unwrap().records.is_empty());

        store.clear().unwrap();
        assert!(!store.path().unwrap().exists());
        assert!(!store.load().unwrap().authenticated);

        // Idempotent
        store.clear().unwrap();
    }

    #[test]
    fn test_corrupt_file() {
        let dir = tempdir().unwrap();
        let store = RecordStore::open(dir.path()).unwrap();
        std::fs::write(store.path().unwrap(), "{ not json").unwrap();

        let err = store.load().unwrap_err();
        assert!(matches!(err, StoreError::Corrupt { .. }));

        store.clear().unwrap();
        assert!(store.load().is_ok());
    }

    #[test]
    fn test_in_memory_store() {
        let store = RecordStore::in_memory();
        assert!(store.path().is_none());
        assert!(!store.load().unwrap().authenticated);

        let session = Session::from_upload(summary());
        store.save(&session).unwrap();
        assert_eq!(store.load().unwrap(), session);

        store.clear().unwrap();
        assert!(!store.load().unwrap().authenticated);
    }

    #[test]
    fn test_upload_with_bad_record_keeps_good_one() {
        let summary: UploadSummary = serde_json::from_value(serde_json::json!({
            "message": "File processed.",
            "records_loaded": 2,
            "records": [
                {"type": "SleepAnalysis", "value": "AsleepCore",
                 "startDate": "2024-01-02T23:00:00Z", "endDate": "2024-01-03T07:00:00Z"},
                {"type": "SleepAnalysis", "value": "AsleepCore",
                 "startDate": 1704236400000i64, "endDate": "2024-01-03T07:00:00Z"}
            ]
        }))
        .unwrap();

        let session = Session::from_upload(summary);
        assert!(session.authenticated);
        assert_eq!(session.records.len(), 1);
        assert!(session.records[0].is_asleep());
    }

    #[test]
    fn test_not_authenticated_message() {
        let err = require_auth(&Session::new()).unwrap_err();
        assert!(err.to_string().starts_with("Not signed in"));
    }
}
