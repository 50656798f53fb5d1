use carrent_core::Session;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

#[derive(Debug, thiserror::Error)]
pub enum SessionStoreError {
    #[error("Session file error: {0}")]
    Io(#[from] io::Error),

    #[error("Session file is corrupt: {0}")]
    Corrupt(#[from] serde_json::Error),
}

/// Keeps the signed-in session on disk between runs.
#[derive(Debug, Clone)]
pub struct SessionStore {
    path: PathBuf,
}

impl SessionStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// `None` when nobody is signed in.
    pub fn load(&self) -> Result<Option<Session>, SessionStoreError> {
        let raw = match fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(err) => return Err(err.into()),
        };
        let session: Session = serde_json::from_str(&raw)?;
        debug!(user_id = %session.user().id, "Session loaded");
        Ok(Some(session))
    }

    pub fn save(&self, session: &Session) -> Result<(), SessionStoreError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let raw = serde_json::to_string_pretty(session)?;
        fs::write(&self.path, raw)?;
        info!(user_id = %session.user().id, path = %self.path.display(), "Session saved");
        Ok(())
    }

    /// Removing a session that is not there is not an error.
    pub fn clear(&self) -> Result<(), SessionStoreError> {
        match fs::remove_file(&self.path) {
            Ok(()) => {
                info!(path = %self.path.display(), "Session cleared");
                Ok(())
            }
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(err) => Err(err.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use carrent_core::AuthGrant;
    use carrent_shared::{EntityId, Masked, Role, User, UserStatus};

    fn session() -> Session {
        Session::establish(AuthGrant {
            token: Masked::new("opaque-token".to_string()),
            user: User {
                id: EntityId::parse("65f1c0ffee0123456789bbbb").unwrap(),
                name: "Amina".to_string(),
                email: "amina@example.com".to_string(),
                phone: "0555".to_string(),
                role: Role::Customer,
                join_date: None,
                status: UserStatus::Active,
            },
        })
        .unwrap()
    }

    #[test]
    fn test_missing_file_means_signed_out() {
        let dir = tempfile::tempdir().unwrap();
        let store = SessionStore::new(dir.path().join("session.json"));

        assert!(store.load().unwrap().is_none());
        store.clear().unwrap();
    }

    #[test]
    fn test_save_load_clear() {
        let dir = tempfile::tempdir().unwrap();
        let store = SessionStore::new(dir.path().join("nested").join("session.json"));

        store.save(&session()).unwrap();
        let loaded = store.load().unwrap().unwrap();
        assert_eq!(loaded.token().expose(), "opaque-token");
        assert_eq!(loaded.role(), Role::Customer);

        store.clear().unwrap();
        assert!(store.load().unwrap().is_none());
    }

    #[test]
    fn test_corrupt_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session.json");
        fs::write(&path, "{not json").unwrap();

        let err = SessionStore::new(path).load().unwrap_err();
        assert!(matches!(err, SessionStoreError::Corrupt(_)));
    }
}
