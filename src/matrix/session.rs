//! Persisted session store.
//!
//! A small string-keyed settings file (JSON) used to carry the homeserver,
//! user id and access token across runs so the operator only logs in once.

use std::collections::HashMap;
use std::io;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::matrix::client::Session;

const KEY_HOMESERVER: &str = "homeserver";
const KEY_USER_ID: &str = "user_id";
const KEY_ACCESS_TOKEN: &str = "access_token";

/// String-keyed settings persisted to a JSON file.
#[derive(Debug)]
pub struct SettingsStore {
    path: PathBuf,
    values: HashMap<String, String>,
}

impl SettingsStore {
    /// Load the store; a missing file yields an empty store.
    pub fn load(path: impl AsRef<Path>) -> io::Result<Self> {
        let path = path.as_ref().to_path_buf();
        let values = match std::fs::read_to_string(&path) {
            Ok(content) => serde_json::from_str(&content)
                .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?,
            Err(e) if e.kind() == io::ErrorKind::NotFound => HashMap::new(),
            Err(e) => return Err(e),
        };
        Ok(Self { path, values })
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(String::as_str)
    }

    pub fn set(&mut self, key: &str, value: &str) {
        self.values.insert(key.to_string(), value.to_string());
    }

    pub fn save(&self) -> io::Result<()> {
        let content = serde_json::to_string_pretty(&self.values)
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
        std::fs::write(&self.path, content)
    }

    /// Restore a cached session, if all three keys are present.
    pub fn session(&self) -> Option<Session> {
        Some(Session {
            homeserver: self.get(KEY_HOMESERVER)?.to_string(),
            user_id: self.get(KEY_USER_ID)?.to_string(),
            access_token: self.get(KEY_ACCESS_TOKEN)?.to_string(),
        })
    }

    /// Cache a session for later runs.
    pub fn remember_session(&mut self, session: &Session) -> io::Result<()> {
        self.set(KEY_HOMESERVER, &session.homeserver);
        self.set(KEY_USER_ID, &session.user_id);
        self.set(KEY_ACCESS_TOKEN, &session.access_token);
        debug!(path = %self.path.display(), "Caching session");
        self.save()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_path(name: &str) -> PathBuf {
        let mut path = std::env::temp_dir();
        path.push(format!("mxplumb-test-{}-{}", std::process::id(), name));
        path
    }

    #[test]
    fn test_missing_file_is_empty() {
        let store = SettingsStore::load(temp_path("missing.json")).unwrap();
        assert!(store.get("access_token").is_none());
        assert!(store.session().is_none());
    }

    #[test]
    fn test_session_round_trip() {
        let path = temp_path("session.json");
        let session = Session {
            homeserver: "https://m.x".to_string(),
            user_id: "@op:x".to_string(),
            access_token: "secret".to_string(),
        };

        let mut store = SettingsStore::load(&path).unwrap();
        store.remember_session(&session).unwrap();

        let reloaded = SettingsStore::load(&path).unwrap();
        let restored = reloaded.session().unwrap();
        assert_eq!(restored.homeserver, "https://m.x");
        assert_eq!(restored.user_id, "@op:x");
        assert_eq!(restored.access_token, "secret");

        std::fs::remove_file(&path).ok();
    }

    #[test]
    fn test_partial_store_yields_no_session() {
        let path = temp_path("partial.json");
        let mut store = SettingsStore::load(&path).unwrap();
        store.set("homeserver", "https://m.x");
        assert!(store.session().is_none());
        std::fs::remove_file(&path).ok();
    }
}
