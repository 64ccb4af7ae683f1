use std::collections::BTreeMap;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use super::{DEFAULT_SESSION_KEY, SessionStore, SessionStoreError};

type Entries = BTreeMap<String, String>;

/// Local-storage style token slot backed by a JSON file.
///
/// The file holds a flat `{ "<key>": "<value>" }` object so several keys can
/// coexist; this store only ever touches its own key. Writes replace the whole
/// file via a temporary sibling and a rename.
#[derive(Debug, Clone)]
pub struct FileSessionStore {
    path: PathBuf,
    key: String,
}

impl FileSessionStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self::with_key(path, DEFAULT_SESSION_KEY)
    }

    pub fn with_key(path: impl Into<PathBuf>, key: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            key: key.into(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn load(&self) -> Result<Entries, SessionStoreError> {
        match std::fs::read(&self.path) {
            Ok(bytes) if bytes.iter().all(u8::is_ascii_whitespace) => Ok(Entries::new()),
            Ok(bytes) => Ok(serde_json::from_slice(&bytes)?),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(Entries::new()),
            Err(e) => Err(e.into()),
        }
    }

    // A corrupt file is replaced rather than blocking every future write.
    fn load_for_write(&self) -> Result<Entries, SessionStoreError> {
        match self.load() {
            Err(SessionStoreError::Json(e)) => {
                tracing::warn!(path = %self.path.display(), error = %e, "discarding unreadable session file");
                Ok(Entries::new())
            }
            other => other,
        }
    }

    fn save(&self, entries: &Entries) -> Result<(), SessionStoreError> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }

        let mut tmp = self.path.clone().into_os_string();
        tmp.push(".tmp");
        let tmp = PathBuf::from(tmp);

        std::fs::write(&tmp, serde_json::to_vec_pretty(entries)?)?;
        std::fs::rename(&tmp, &self.path)?;
        Ok(())
    }
}

impl SessionStore for FileSessionStore {
    fn get(&self) -> Result<Option<String>, SessionStoreError> {
        Ok(self.load()?.remove(&self.key))
    }

    fn set(&self, token: &str) -> Result<(), SessionStoreError> {
        let mut entries = self.load_for_write()?;
        entries.insert(self.key.clone(), token.to_string());
        self.save(&entries)
    }

    fn clear(&self) -> Result<(), SessionStoreError> {
        let mut entries = self.load_for_write()?;
        if entries.remove(&self.key).is_none() && !self.path.exists() {
            return Ok(());
        }
        self.save(&entries)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_reads_as_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileSessionStore::new(dir.path().join("session.json"));

        assert_eq!(store.get().unwrap(), None);
        store.clear().unwrap();
        assert!(!store.path().exists());
    }

    #[test]
    fn token_survives_a_new_handle() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("session.json");

        FileSessionStore::new(&path).set("abc.def.ghi").unwrap();

        let reopened = FileSessionStore::new(&path);
        assert_eq!(reopened.get().unwrap().as_deref(), Some("abc.def.ghi"));
    }

    #[test]
    fn clear_leaves_other_keys_alone() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("storage.json");
        let session = FileSessionStore::new(&path);
        let theme = FileSessionStore::with_key(&path, "theme");

        session.set("tok").unwrap();
        theme.set("dark").unwrap();
        session.clear().unwrap();

        assert_eq!(session.get().unwrap(), None);
        assert_eq!(theme.get().unwrap().as_deref(), Some("dark"));
    }

    #[test]
    fn corrupt_file_is_reported_then_replaced_on_write() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session.json");
        std::fs::write(&path, "{not json").unwrap();
        let store = FileSessionStore::new(&path);

        assert!(matches!(store.get(), Err(SessionStoreError::Json(_))));

        store.set("fresh").unwrap();
        assert_eq!(store.get().unwrap().as_deref(), Some("fresh"));
    }
}
