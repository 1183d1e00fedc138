//! On-disk representation of the record collection.
//!
//! The collection lives in a single pretty-printed JSON array. Every save
//! replaces the whole file through a sibling temporary file and a rename, so
//! readers only ever see a complete snapshot.

use crate::core::{Record, Result, StoreError};
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tracing::{debug, warn};

// ============================================================================
// Durability Configuration
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DurabilityMode {
    /// `fsync` the temporary file before it replaces the collection.
    #[default]
    Sync,
    /// Leave flushing to the operating system.
    Async,
}

impl FromStr for DurabilityMode {
    type Err = String;

    fn from_str(raw: &str) -> std::result::Result<Self, Self::Err> {
        match raw.to_ascii_lowercase().as_str() {
            "sync" => Ok(Self::Sync),
            "async" => Ok(Self::Async),
            other => Err(format!(
                "durability must be one of: sync, async (got '{other}')"
            )),
        }
    }
}

impl fmt::Display for DurabilityMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Sync => f.write_str("sync"),
            Self::Async => f.write_str("async"),
        }
    }
}

// ============================================================================
// Collection File
// ============================================================================

#[derive(Debug, Clone)]
pub struct CollectionFile {
    path: PathBuf,
    durability: DurabilityMode,
}

impl CollectionFile {
    pub fn new<P: AsRef<Path>>(path: P, durability: DurabilityMode) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            durability,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Sibling path the next snapshot is staged in before the rename.
    pub fn temp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|name| name.to_os_string())
            .unwrap_or_default();
        name.push(".tmp");
        self.path.with_file_name(name)
    }

    pub async fn exists(&self) -> bool {
        fs::try_exists(&self.path).await.unwrap_or(false)
    }

    /// Reads and parses the whole collection.
    ///
    /// A missing file is a read failure, not an empty collection.
    pub async fn load(&self) -> Result<Vec<Record>> {
        let bytes = fs::read(&self.path).await.map_err(|err| {
            warn!(path = %self.path.display(), error = %err, "record file unreadable");
            StoreError::read_failure(&self.path, err)
        })?;

        let records: Vec<Record> = serde_json::from_slice(&bytes).map_err(|err| {
            warn!(
                path = %self.path.display(),
                error = %err,
                "record file is not a valid record array"
            );
            StoreError::read_failure(&self.path, format!("malformed JSON: {err}"))
        })?;

        debug!(path = %self.path.display(), records = records.len(), "loaded record file");
        Ok(records)
    }

    /// Replaces the file with the full `records` snapshot.
    pub async fn save(&self, records: &[Record]) -> Result<()> {
        let json = serde_json::to_vec_pretty(records)
            .map_err(|err| StoreError::write_failure(&self.path, format!("serialize: {err}")))?;
        self.atomic_write(&json).await
    }

    /// Creates the parent directories and an empty collection.
    pub async fn create_empty(&self) -> Result<()> {
        let parent = self.parent_dir();
        fs::create_dir_all(parent).await.map_err(|err| {
            StoreError::write_failure(
                &self.path,
                format!("create parent directory '{}': {err}", parent.display()),
            )
        })?;
        self.save(&[]).await
    }

    /// Directory holding the collection; `.` for a bare file name.
    pub fn parent_dir(&self) -> &Path {
        match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        }
    }

    async fn atomic_write(&self, bytes: &[u8]) -> Result<()> {
        let tmp = self.temp_path();

        if let Err(err) = self.write_temp(&tmp, bytes).await {
            discard_temp(&tmp).await;
            return Err(err);
        }

        if let Err(err) = fs::rename(&tmp, &self.path).await {
            discard_temp(&tmp).await;
            return Err(StoreError::write_failure(
                &self.path,
                format!("rename temp file '{}': {err}", tmp.display()),
            ));
        }

        // The rename is only durable once the directory entry is flushed.
        if self.durability == DurabilityMode::Sync
            && let Err(err) = sync_dir(self.parent_dir()).await
        {
            warn!(
                path = %self.path.display(),
                error = %err,
                "record file replaced but its directory could not be synced"
            );
        }

        Ok(())
    }

    async fn write_temp(&self, tmp: &Path, bytes: &[u8]) -> Result<()> {
        let fail = |stage: &str, err: std::io::Error| {
            StoreError::write_failure(
                &self.path,
                format!("{stage} temp file '{}': {err}", tmp.display()),
            )
        };

        let mut file = fs::File::create(tmp)
            .await
            .map_err(|err| fail("create", err))?;
        file.write_all(bytes)
            .await
            .map_err(|err| fail("write", err))?;
        file.flush().await.map_err(|err| fail("flush", err))?;
        if self.durability == DurabilityMode::Sync {
            file.sync_all().await.map_err(|err| fail("sync", err))?;
        }
        Ok(())
    }
}

/// Directories cannot be opened for syncing outside unix.
async fn sync_dir(dir: &Path) -> std::io::Result<()> {
    if cfg!(unix) {
        fs::File::open(dir).await?.sync_all().await?;
    }
    Ok(())
}

async fn discard_temp(tmp: &Path) {
    if let Ok(meta) = fs::metadata(tmp).await
        && meta.is_file()
    {
        let _ = fs::remove_file(tmp).await;
    }
}
