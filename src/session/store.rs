use std::{io::ErrorKind, path::PathBuf};

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::{errors::{AppError, AppResult}, models::domain::StoreCoordinates};

/// Persistence port for the last used store coordinates.
#[async_trait]
pub trait SessionStore: Send + Sync {
    async fn load(&self) -> AppResult<Option<StoreCoordinates>>;
    async fn save(&self, coords: &StoreCoordinates) -> AppResult<()>;
    async fn clear(&self) -> AppResult<()>;
}

#[derive(Default)]
pub struct InMemorySessionStore {
    saved: RwLock<Option<StoreCoordinates>>,
}

impl InMemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_coordinates(coords: StoreCoordinates) -> Self {
        Self {
            saved: RwLock::new(Some(coords)),
        }
    }
}

#[async_trait]
impl SessionStore for InMemorySessionStore {
    async fn load(&self) -> AppResult<Option<StoreCoordinates>> {
        Ok(self.saved.read().await.clone())
    }

    async fn save(&self, coords: &StoreCoordinates) -> AppResult<()> {
        *self.saved.write().await = Some(coords.clone());
        Ok(())
    }

    async fn clear(&self) -> AppResult<()> {
        *self.saved.write().await = None;
        Ok(())
    }
}

/// Stores coordinates as a small JSON file.
pub struct FileSessionStore {
    path: PathBuf,
}

impl FileSessionStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

fn io_error(action: &str, err: std::io::Error) -> AppError {
    AppError::InternalError(format!("Failed to {} session file: {}", action, err))
}

#[async_trait]
impl SessionStore for FileSessionStore {
    async fn load(&self) -> AppResult<Option<StoreCoordinates>> {
        let raw = match tokio::fs::read_to_string(&self.path).await {
            Ok(raw) => raw,
            Err(err) if err.kind() == ErrorKind::NotFound => return Ok(None),
            Err(err) => return Err(io_error("read", err)),
        };

        match serde_json::from_str::<StoreCoordinates>(&raw) {
            Ok(coords) => Ok(Some(coords)),
            Err(err) => {
                log::warn!("Ignoring unreadable session file {}: {}", self.path.display(), err);
                Ok(None)
            }
        }
    }

    async fn save(&self, coords: &StoreCoordinates) -> AppResult<()> {
        let raw = serde_json::to_string(coords)?;
        tokio::fs::write(&self.path, raw)
            .await
            .map_err(|e| io_error("write", e))
    }

    async fn clear(&self) -> AppResult<()> {
        match tokio::fs::remove_file(&self.path).await {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(()),
            Err(err) => Err(io_error("remove", err)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn coords() -> StoreCoordinates {
        StoreCoordinates::new("store-1", "fantoms").unwrap()
    }

    #[tokio::test]
    async fn test_in_memory_store_round_trip() {
        let store = InMemorySessionStore::new();
        assert_eq!(store.load().await.unwrap(), None);

        store.save(&coords()).await.unwrap();
        assert_eq!(store.load().await.unwrap(), Some(coords()));

        store.clear().await.unwrap();
        assert_eq!(store.load().await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_file_store_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileSessionStore::new(dir.path().join("session.json"));

        assert_eq!(store.load().await.unwrap(), None);
        store.save(&coords()).await.unwrap();
        assert_eq!(store.load().await.unwrap(), Some(coords()));

        let raw = std::fs::read_to_string(dir.path().join("session.json")).unwrap();
        assert!(raw.contains("\"storeId\":\"store-1\""));

        store.clear().await.unwrap();
        store.clear().await.unwrap();
        assert_eq!(store.load().await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_file_store_ignores_corrupt_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session.json");
        std::fs::write(&path, "{not json").unwrap();

        let store = FileSessionStore::new(path);
        assert_eq!(store.load().await.unwrap(), None);
    }
}
