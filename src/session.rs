//! Credential persistence for the login flow.
//!
//! The store is an explicit capability handed to the commands that need it,
//! so nothing in the crate reaches for an ambient singleton. The file-backed
//! implementation keeps a single JSON document in the config directory.

use std::fs::{self, File};
use std::io::{Read, Write};
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Stored sign-in material. The token is absent until a successful login.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Credentials {
    pub email: String,
    pub password: String,
    #[serde(default)]
    pub token: Option<String>,
}

/// Capability to persist and recall credentials between invocations.
pub trait CredentialStore {
    fn save(&self, creds: &Credentials) -> std::io::Result<()>;
    /// Stored credentials, or `None` when nothing (readable) is stored.
    fn load(&self) -> Option<Credentials>;
    /// Drop the token but keep email and password for the next login.
    fn clear_token(&self) -> std::io::Result<()>;
    /// Forget everything.
    fn clear(&self) -> std::io::Result<()>;
}

/// JSON file store, written atomically via temp file + rename.
#[derive(Debug, Clone)]
pub struct FileCredentialStore {
    path: PathBuf,
}

impl FileCredentialStore {
    pub fn new(path: PathBuf) -> Self {
        FileCredentialStore { path }
    }
}

impl CredentialStore for FileCredentialStore {
    fn save(&self, creds: &Credentials) -> std::io::Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let tmp = self.path.with_extension("json.tmp");
        let data = serde_json::to_string_pretty(creds).map_err(std::io::Error::other)?;
        let mut f = File::create(&tmp)?;
        f.write_all(data.as_bytes())?;
        f.flush()?;
        fs::rename(tmp, &self.path)?;
        Ok(())
    }

    fn load(&self) -> Option<Credentials> {
        if !self.path.exists() {
            return None;
        }
        let mut buf = String::new();
        File::open(&self.path)
            .and_then(|mut f| f.read_to_string(&mut buf))
            .ok()?;
        serde_json::from_str(&buf).ok()
    }

    fn clear_token(&self) -> std::io::Result<()> {
        if let Some(mut creds) = self.load() {
            creds.token = None;
            self.save(&creds)?;
        }
        Ok(())
    }

    fn clear(&self) -> std::io::Result<()> {
        if self.path.exists() {
            fs::remove_file(&self.path)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store_in(dir: &tempfile::TempDir) -> FileCredentialStore {
        FileCredentialStore::new(dir.path().join("credentials.json"))
    }

    fn creds(token: Option<&str>) -> Credentials {
        Credentials {
            email: "ana@example.com".to_string(),
            password: "hunter2".to_string(),
            token: token.map(String::from),
        }
    }

    #[test]
    fn save_then_load_roundtrips() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);
        store.save(&creds(Some("jwt-abc"))).unwrap();
        assert_eq!(store.load(), Some(creds(Some("jwt-abc"))));
    }

    #[test]
    fn missing_file_loads_as_none() {
        let dir = tempfile::tempdir().unwrap();
        assert_eq!(store_in(&dir).load(), None);
    }

    #[test]
    fn corrupt_file_loads_as_none() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);
        fs::write(dir.path().join("credentials.json"), "{not json").unwrap();
        assert_eq!(store.load(), None);
    }

    #[test]
    fn clear_token_keeps_the_login_pair() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);
        store.save(&creds(Some("jwt-abc"))).unwrap();
        store.clear_token().unwrap();
        assert_eq!(store.load(), Some(creds(None)));
    }

    #[test]
    fn clear_removes_the_file() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);
        store.save(&creds(None)).unwrap();
        store.clear().unwrap();
        assert_eq!(store.load(), None);
        // Clearing again is fine.
        store.clear().unwrap();
    }
}
