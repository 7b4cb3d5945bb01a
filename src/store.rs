//! Bookmark Store
//!
//! Sole owner of the bookmark file. The whole collection lives in a single JSON
//! array; every load re-reads it and every save replaces it.
//!
//! Saves never write into the live file. The new contents go to a sibling temp
//! file which is fsynced and then renamed over the target, so a reader sees
//! either the old collection or the new one in full. Saves from this process
//! are serialized by `write_lock`; anything racing from outside still resolves
//! as last rename wins.

use std::fs::{self, File};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};

use tokio::sync::Mutex;

use crate::error::StoreError;
use crate::model::Collection;

static TMP_SEQ: AtomicU64 = AtomicU64::new(0);

pub struct BookmarkStore {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl BookmarkStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        BookmarkStore {
            path: path.into(),
            write_lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Reads the collection. A missing or blank file is an empty collection.
    pub async fn load(&self) -> Result<Collection, StoreError> {
        let bytes = match tokio::fs::read(&self.path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                tracing::debug!(path = %self.path.display(), "bookmarks file not found, starting empty");
                return Ok(Collection::new());
            }
            Err(source) => {
                return Err(StoreError::Read {
                    path: self.path.clone(),
                    source,
                });
            }
        };

        decode(&self.path, &bytes)
    }

    /// Replaces the file contents with `bookmarks`.
    pub async fn save(&self, bookmarks: &Collection) -> Result<(), StoreError> {
        let mut bytes = serde_json::to_vec_pretty(bookmarks).map_err(|e| StoreError::Write {
            path: self.path.clone(),
            source: io::Error::from(e),
        })?;
        bytes.push(b'\n');

        let _guard = self.write_lock.lock().await;
        let path = self.path.clone();
        let result = tokio::task::spawn_blocking(move || write_atomic(&path, |w| w.write_all(&bytes)))
            .await
            .unwrap_or_else(|e| Err(io::Error::other(e)));

        result.map_err(|source| StoreError::Write {
            path: self.path.clone(),
            source,
        })?;

        tracing::debug!(path = %self.path.display(), count = bookmarks.len(), "bookmarks written");
        Ok(())
    }
}

fn decode(path: &Path, bytes: &[u8]) -> Result<Collection, StoreError> {
    if bytes.iter().all(u8::is_ascii_whitespace) {
        return Ok(Collection::new());
    }

    serde_json::from_slice(bytes).map_err(|source| StoreError::Decode {
        path: path.to_path_buf(),
        source,
    })
}

fn tmp_path(path: &Path) -> PathBuf {
    let name = path
        .file_name()
        .and_then(|s| s.to_str())
        .unwrap_or("bookmarks");
    let seq = TMP_SEQ.fetch_add(1, Ordering::Relaxed);
    path.with_file_name(format!(".{}.tmp.{}.{}", name, std::process::id(), seq))
}

/// Writes through a fresh temp file next to `path` and renames it into place.
///
/// `fill` produces the contents. If it or any later step fails, the temp file
/// is removed and `path` is left as it was.
fn write_atomic<F>(path: &Path, fill: F) -> io::Result<()>
where
    F: FnOnce(&mut BufWriter<File>) -> io::Result<()>,
{
    let parent = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
        _ => PathBuf::from("."),
    };
    fs::create_dir_all(&parent)?;

    let tmp = tmp_path(path);
    let written = (|| {
        let mut writer = BufWriter::new(File::create(&tmp)?);
        fill(&mut writer)?;
        let file = writer.into_inner().map_err(|e| e.into_error())?;
        file.sync_all()?;
        fs::rename(&tmp, path)
    })();

    if let Err(e) = written {
        if let Err(cleanup) = fs::remove_file(&tmp) {
            if cleanup.kind() != io::ErrorKind::NotFound {
                tracing::warn!(path = %tmp.display(), error = %cleanup, "failed to remove temp file");
            }
        }
        return Err(e);
    }

    // Persist the rename itself; not every platform lets a directory be synced.
    if let Ok(dir) = File::open(&parent) {
        if let Err(e) = dir.sync_all() {
            tracing::debug!(path = %parent.display(), error = %e, "directory sync skipped");
        }
    }
    Ok(())
}
