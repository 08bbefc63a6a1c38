// SPDX-FileCopyrightText: 2025 The EventBuddy Developers
//
// SPDX-License-Identifier: Apache-2.0

use std::{
    fs, io,
    path::{Path, PathBuf},
    sync::Arc,
};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;

use crate::{
    error::{self, Result},
    metadata,
};

/// Durable storage for exactly one serialized record. The session manager is
/// the only logical writer; backends only need whatever atomicity they get
/// for a single key.
#[async_trait]
pub(crate) trait Storage<T>: Send + Sync {
    async fn get(&mut self) -> Result<Option<T>>;
    async fn update(&mut self, data: &T) -> Result<()>;
    async fn clear(&mut self) -> Result<()>;
}

#[async_trait]
impl<Tn: Sync, T: Storage<Tn> + ?Sized> Storage<Tn> for Box<T> {
    async fn get(&mut self) -> Result<Option<Tn>> {
        (**self).get().await
    }

    async fn update(&mut self, data: &Tn) -> Result<()> {
        (**self).update(data).await
    }

    async fn clear(&mut self) -> Result<()> {
        (**self).clear().await
    }
}

/// Process-lifetime storage for `--no-store-session` and tests.
pub(crate) struct Memory<T> {
    data: Arc<RwLock<Option<T>>>,
}

impl<T> Memory<T> {
    pub(crate) fn new() -> Self {
        Self::default()
    }
}

impl<T> Default for Memory<T> {
    fn default() -> Self {
        Self {
            data: Arc::new(RwLock::new(None)),
        }
    }
}

#[async_trait]
impl<T: Send + Sync + Clone> Storage<T> for Memory<T> {
    async fn get(&mut self) -> Result<Option<T>> {
        let data = Arc::clone(&self.data);
        let guard = data.read().await;
        Ok(guard.clone())
    }

    async fn update(&mut self, data: &T) -> Result<()> {
        let target_data = Arc::clone(&self.data);
        let mut guard = target_data.write_owned().await;
        *guard = Some(data.clone());
        Ok(())
    }

    async fn clear(&mut self) -> Result<()> {
        let target_data = Arc::clone(&self.data);
        let mut guard = target_data.write_owned().await;
        *guard = None;
        Ok(())
    }
}

/// A single JSON file under the platform data directory.
pub(crate) struct File {
    path: PathBuf,
}

impl File {
    pub(crate) fn new<P: AsRef<Path>>(file: P) -> Result<Self> {
        metadata::PROJECT_DIRS
            .as_ref()
            .map(|dirs| Self {
                path: dirs.data_dir().to_owned().join(file),
            })
            .ok_or_else(|| error::Storage::NoDataDirectory.into())
    }

    pub(crate) fn with_path<P: Into<PathBuf>>(path: P) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl<T: Send + Serialize + Sync + for<'de> Deserialize<'de>> Storage<T> for File {
    async fn get(&mut self) -> Result<Option<T>> {
        match fs::File::open(&self.path) {
            Ok(fp) => Ok(Some(serde_json::from_reader::<fs::File, T>(fp)?)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    async fn update(&mut self, data: &T) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let file = fs::File::create(&self.path)?;
        serde_json::to_writer(file, data)?;
        Ok(())
    }

    async fn clear(&mut self) -> Result<()> {
        // An absent record is an expected state, not an error.
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use secrecy::ExposeSecret;

    use super::*;
    use crate::session::{SecretToken, Session, Token};

    #[tokio::test]
    async fn memory_round_trip() -> Result<()> {
        let mut storage = Memory::<String>::new();
        assert!(storage.get().await?.is_none());

        storage.update(&"hello".to_owned()).await?;
        assert_eq!(storage.get().await?.as_deref(), Some("hello"));

        storage.clear().await?;
        assert!(storage.get().await?.is_none());
        Ok(())
    }

    #[tokio::test]
    async fn file_round_trips_a_session() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let mut storage = File::with_path(dir.path().join("session.json"));

        assert!(Storage::<Session>::get(&mut storage).await?.is_none());

        let session = Session::new(
            "alice".to_owned(),
            7,
            SecretToken::new(Token::from("abc".to_owned())),
        )?;
        storage.update(&session).await?;

        let loaded: Session = storage.get().await?.ok_or(error::Error::Command)?;
        assert_eq!(loaded.username(), "alice");
        assert_eq!(loaded.user_id(), 7);
        assert_eq!(loaded.token().expose_secret().as_str(), "abc");

        Storage::<Session>::clear(&mut storage).await?;
        assert!(Storage::<Session>::get(&mut storage).await?.is_none());

        // Clearing an already-absent record stays quiet.
        Storage::<Session>::clear(&mut storage).await?;
        Ok(())
    }
}
