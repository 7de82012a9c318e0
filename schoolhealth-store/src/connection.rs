use std::{
    fs,
    io::ErrorKind,
    path::{Path, PathBuf},
    sync::{Arc, Mutex, MutexGuard},
};

use log::{debug, info};
use serde::{de::DeserializeOwned, Serialize};

use crate::error::{Result, StoreError};

/// Local key-value storage: every key is one JSON document in the data
/// directory. Clones share the same lock, so a read-modify-write through
/// [`Store::modify`] is never interleaved with another one in this process.
#[derive(Clone, Debug)]
pub struct Store {
    inner: Arc<Mutex<PathBuf>>,
}

impl Store {
    pub fn open(dir: impl AsRef<Path>) -> Result<Self> {
        let dir = dir.as_ref().to_path_buf();
        fs::create_dir_all(&dir)?;
        info!("Using data directory {}", dir.display());

        Ok(Self {
            inner: Arc::new(Mutex::new(dir)),
        })
    }

    fn lock(&self) -> Result<MutexGuard<'_, PathBuf>> {
        self.inner.lock().map_err(|_| StoreError::Poisoned)
    }

    pub fn get(&self, key: &str) -> Result<Option<String>> {
        let dir = self.lock()?;
        read_key(&dir, key)
    }

    pub fn set(&self, key: &str, value: &str) -> Result<()> {
        let dir = self.lock()?;
        write_key(&dir, key, value)
    }

    /// Reads the array stored under `key`; a key never written reads as empty.
    pub fn load<T: DeserializeOwned>(&self, key: &str) -> Result<Vec<T>> {
        let dir = self.lock()?;
        decode(key, read_key(&dir, key)?)
    }

    /// Loads the array under `key`, applies `f` and writes the result back
    /// if `f` succeeds. The lock is held for the whole cycle.
    pub fn modify<T, R, F>(&self, key: &str, f: F) -> Result<R>
    where
        T: DeserializeOwned + Serialize,
        F: FnOnce(&mut Vec<T>) -> Result<R>,
    {
        let dir = self.lock()?;
        let mut items = decode(key, read_key(&dir, key)?)?;
        let result = f(&mut items)?;

        let encoded = serde_json::to_string(&items).map_err(|source| StoreError::Encode {
            key: key.to_owned(),
            source,
        })?;
        write_key(&dir, key, &encoded)?;
        Ok(result)
    }
}

fn path_for(dir: &Path, key: &str) -> PathBuf {
    dir.join(format!("{}.json", key))
}

fn read_key(dir: &Path, key: &str) -> Result<Option<String>> {
    match fs::read_to_string(path_for(dir, key)) {
        Ok(contents) => Ok(Some(contents)),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
        Err(e) => Err(e.into()),
    }
}

fn write_key(dir: &Path, key: &str, value: &str) -> Result<()> {
    let path = path_for(dir, key);
    let tmp = path.with_extension("json.tmp");
    debug!("Writing {} bytes to {}", value.len(), path.display());
    fs::write(&tmp, value)?;
    fs::rename(&tmp, &path)?;
    Ok(())
}

fn decode<T: DeserializeOwned>(key: &str, contents: Option<String>) -> Result<Vec<T>> {
    match contents {
        Some(contents) => serde_json::from_str(&contents).map_err(|source| StoreError::Corrupt {
            key: key.to_owned(),
            source,
        }),
        None => Ok(Vec::new()),
    }
}
