//! File-backed ledger store.
//!
//! The ledger lives in a single CBOR file. Saves write a uniquely named
//! temporary file in the same directory and rename it over the target, so a
//! crash mid-write never leaves a truncated ledger behind.
//!
//! Writers serialize on an advisory lock held on a sibling `<file>.lock`.
//! The lock spans processes, so two `aiakos` invocations against the same
//! ledger apply their changes one after the other.

use super::state::ApprovalLedger;
use super::traits::{LedgerStore, StoreResult};
use async_trait::async_trait;
use fs4::fs_std::FileExt;
use std::fs::{File, OpenOptions};
use std::io::{self, ErrorKind, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use tracing::debug;

/// Ledger store backed by one CBOR file.
#[derive(Debug, Clone)]
pub struct FileStore {
    path: PathBuf,
}

/// Exclusive writer lock on a [`FileStore`]; released on drop.
#[derive(Debug)]
pub struct FileLock {
    _file: File,
}

impl FileStore {
    /// Store at `path`. Nothing is touched until the first lock, load or save.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Location of the ledger file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Location of the writer lock file.
    pub fn lock_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_else(|| "ledger".into());
        name.push(".lock");
        self.path.with_file_name(name)
    }

    /// Directory holding the ledger, its lock and temporary files.
    fn dir(&self) -> PathBuf {
        match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        }
    }
}

/// Runs blocking filesystem work off the async executor.
async fn blocking<T, F>(f: F) -> io::Result<T>
where
    F: FnOnce() -> io::Result<T> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(f).await.map_err(io::Error::other)?
}

#[async_trait]
impl LedgerStore for FileStore {
    type Lock = FileLock;

    async fn lock(&self) -> StoreResult<FileLock> {
        let dir = self.dir();
        let lock_path = self.lock_path();

        let file = blocking(move || {
            std::fs::create_dir_all(&dir)?;
            let file = OpenOptions::new()
                .create(true)
                .truncate(false)
                .read(true)
                .write(true)
                .open(&lock_path)?;
            FileExt::lock_exclusive(&file)?;
            Ok(file)
        })
        .await?;

        debug!(path = %self.lock_path().display(), "writer lock acquired");
        Ok(FileLock { _file: file })
    }

    async fn load(&self) -> StoreResult<Option<ApprovalLedger>> {
        let bytes = match tokio::fs::read(&self.path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!(path = %self.path.display(), "no ledger file yet");
                return Ok(None);
            }
            Err(e) => return Err(e.into()),
        };

        let ledger = ApprovalLedger::from_bytes(&bytes)?;
        ledger.validate()?;
        debug!(
            path = %self.path.display(),
            bytes = bytes.len(),
            events = ledger.events().len(),
            "loaded ledger"
        );
        Ok(Some(ledger))
    }

    async fn save(&self, ledger: &ApprovalLedger) -> StoreResult<()> {
        let bytes = ledger.to_bytes()?;
        let len = bytes.len();
        let dir = self.dir();
        let path = self.path.clone();

        blocking(move || {
            std::fs::create_dir_all(&dir)?;
            let mut temp = NamedTempFile::new_in(&dir)?;
            temp.write_all(&bytes)?;
            temp.as_file().sync_all()?;
            temp.persist(&path).map_err(|e| e.error)?;
            Ok(())
        })
        .await?;

        debug!(path = %self.path.display(), bytes = len, "saved ledger");
        Ok(())
    }
}
