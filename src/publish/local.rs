use super::Store;
use anyhow::{Context, Result};
use async_trait::async_trait;
use bytes::Bytes;
use std::io::ErrorKind;
use std::path::PathBuf;
use tracing::debug;

/// Stores tables as plain files below a root directory.
pub struct LocalStore {
    root: PathBuf,
}

impl LocalStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.root.join(key)
    }
}

#[async_trait]
impl Store for LocalStore {
    fn describe(&self) -> String {
        format!("file://{}", self.root.display())
    }

    async fn load(&self, key: &str) -> Result<Option<Bytes>> {
        let path = self.path_for(key);
        match tokio::fs::read(&path).await {
            Ok(content) => Ok(Some(Bytes::from(content))),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e).with_context(|| format!("failed to read {}", path.display())),
        }
    }

    async fn save(&self, key: &str, body: Bytes) -> Result<()> {
        let path = self.path_for(key);
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .with_context(|| format!("failed to create {}", parent.display()))?;
        }
        tokio::fs::write(&path, &body)
            .await
            .with_context(|| format!("failed to write {}", path.display()))?;
        debug!(path = %path.display(), bytes = body.len(), "File written");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_missing_file_loads_as_none() {
        let dir = tempfile::tempdir().unwrap();
        let store = LocalStore::new(dir.path());
        assert!(store.load("absent.csv").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_save_creates_directories_and_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let store = LocalStore::new(dir.path().join("nested/out"));

        store
            .save("rki_ndr_districts.csv", Bytes::from("ID\n1\n"))
            .await
            .unwrap();

        let loaded = store.load("rki_ndr_districts.csv").await.unwrap();
        assert_eq!(loaded, Some(Bytes::from("ID\n1\n")));
        assert!(dir.path().join("nested/out/rki_ndr_districts.csv").exists());
    }
}
