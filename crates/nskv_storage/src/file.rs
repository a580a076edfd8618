//! Directory-based persistent backend.
//!
//! The backend keeps an ordered in-memory index and appends every mutation
//! to a record log inside its directory:
//!
//! ```text
//! <dir>/
//! ├─ LOCK       # Advisory lock for single-handle access
//! └─ data.log   # Append-only put/delete records
//! ```
//!
//! Record layout (little-endian):
//!
//! ```text
//! | magic "NSKV" | op u8 | key_len u32 | key | val_len u32 | val |
//! ```
//!
//! The log is replayed on open. A torn trailing record (crash mid-append)
//! is truncated away; a bad magic before the tail is reported as corruption.

use crate::backend::{BackendOptions, KvBackend};
use crate::error::{StorageError, StorageResult};
use fs2::FileExt;
use parking_lot::RwLock;
use std::collections::BTreeMap;
use std::fs::{self, File, OpenOptions};
use std::io::{self, Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Name of the record log inside the backend directory.
pub const DATA_FILE: &str = "data.log";
/// Name of the advisory lock file inside the backend directory.
pub const LOCK_FILE: &str = "LOCK";

const RECORD_MAGIC: &[u8; 4] = b"NSKV";
const OP_PUT: u8 = 1;
const OP_DELETE: u8 = 2;
/// magic + op + key_len
const HEADER_LEN: usize = 4 + 1 + 4;

/// Open state; dropped on close.
#[derive(Debug)]
struct OpenState {
    index: BTreeMap<Vec<u8>, Vec<u8>>,
    data: File,
    /// Held for exclusive access; released when dropped.
    _lock: File,
}

/// A persistent ordered backend stored in one directory.
///
/// # Durability
///
/// - Every write is appended to `data.log` before the index is updated
/// - With `sync_on_write`, each append is followed by `File::sync_data()`
/// - `flush()` always syncs the log
///
/// # Thread Safety
///
/// This backend is thread-safe and can be shared across threads.
/// Reads share a lock; writes are serialized.
///
/// # Example
///
/// ```no_run
/// use nskv_storage::{BackendOptions, FileBackend, KvBackend};
/// use std::path::Path;
///
/// let backend = FileBackend::open(Path::new("store"), BackendOptions::default()).unwrap();
/// backend.put(b"key", b"value").unwrap();
/// backend.close().unwrap();
/// ```
#[derive(Debug)]
pub struct FileBackend {
    path: PathBuf,
    options: BackendOptions,
    state: RwLock<Option<OpenState>>,
}

impl FileBackend {
    /// Opens or creates a backend in the given directory.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The directory doesn't exist and `create_if_missing` is false
    /// - Another handle holds the directory lock (`Locked`)
    /// - The log is corrupted before its tail (`Corrupted`)
    /// - I/O errors occur
    pub fn open(path: &Path, options: BackendOptions) -> StorageResult<Self> {
        if !path.exists() {
            if options.create_if_missing {
                fs::create_dir_all(path)?;
            } else {
                return Err(StorageError::NotFound {
                    path: path.to_path_buf(),
                });
            }
        }

        let lock = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(false)
            .open(path.join(LOCK_FILE))?;

        if lock.try_lock_exclusive().is_err() {
            return Err(StorageError::Locked {
                path: path.to_path_buf(),
            });
        }

        let mut data = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(false)
            .open(path.join(DATA_FILE))?;

        let index = replay(&mut data)?;
        debug!(path = %path.display(), entries = index.len(), "replayed data log");

        Ok(Self {
            path: path.to_path_buf(),
            options,
            state: RwLock::new(Some(OpenState {
                index,
                data,
                _lock: lock,
            })),
        })
    }

    /// Returns the backend directory.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Returns `true` while the backend is open.
    #[must_use]
    pub fn is_open(&self) -> bool {
        self.state.read().is_some()
    }

    fn append(&self, state: &mut OpenState, op: u8, key: &[u8], value: &[u8]) -> StorageResult<()> {
        let record = encode_record(op, key, value)?;
        append_record(&mut state.data, &record, self.options.sync_on_write)
    }
}

impl KvBackend for FileBackend {
    fn get(&self, key: &[u8]) -> StorageResult<Option<Vec<u8>>> {
        let guard = self.state.read();
        let state = guard.as_ref().ok_or(StorageError::Closed)?;
        Ok(state.index.get(key).cloned())
    }

    fn put(&self, key: &[u8], value: &[u8]) -> StorageResult<()> {
        let mut guard = self.state.write();
        let state = guard.as_mut().ok_or(StorageError::Closed)?;
        self.append(state, OP_PUT, key, value)?;
        state.index.insert(key.to_vec(), value.to_vec());
        Ok(())
    }

    fn delete(&self, key: &[u8]) -> StorageResult<()> {
        let mut guard = self.state.write();
        let state = guard.as_mut().ok_or(StorageError::Closed)?;
        if !state.index.contains_key(key) {
            return Ok(());
        }
        self.append(state, OP_DELETE, key, &[])?;
        state.index.remove(key);
        Ok(())
    }

    fn iter(&self) -> StorageResult<Vec<(Vec<u8>, Vec<u8>)>> {
        let guard = self.state.read();
        let state = guard.as_ref().ok_or(StorageError::Closed)?;
        Ok(state
            .index
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect())
    }

    fn scan_prefix(&self, prefix: &[u8]) -> StorageResult<Vec<(Vec<u8>, Vec<u8>)>> {
        let guard = self.state.read();
        let state = guard.as_ref().ok_or(StorageError::Closed)?;
        Ok(state
            .index
            .range(prefix.to_vec()..)
            .take_while(|(k, _)| k.starts_with(prefix))
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect())
    }

    fn len(&self) -> StorageResult<usize> {
        let guard = self.state.read();
        let state = guard.as_ref().ok_or(StorageError::Closed)?;
        Ok(state.index.len())
    }

    fn flush(&self) -> StorageResult<()> {
        let mut guard = self.state.write();
        let state = guard.as_mut().ok_or(StorageError::Closed)?;
        state.data.flush()?;
        state.data.sync_all()?;
        Ok(())
    }

    fn close(&self) -> StorageResult<()> {
        let Some(mut state) = self.state.write().take() else {
            return Ok(());
        };
        state.data.flush()?;
        state.data.sync_all()?;
        debug!(path = %self.path.display(), "closed file backend");
        Ok(())
    }
}

fn encode_record(op: u8, key: &[u8], value: &[u8]) -> StorageResult<Vec<u8>> {
    let key_len = u32::try_from(key.len())
        .map_err(|_| StorageError::corrupted(0, "key longer than u32::MAX bytes"))?;
    let val_len = u32::try_from(value.len())
        .map_err(|_| StorageError::corrupted(0, "value longer than u32::MAX bytes"))?;

    let mut record = Vec::with_capacity(HEADER_LEN + key.len() + 4 + value.len());
    record.extend_from_slice(RECORD_MAGIC);
    record.push(op);
    record.extend_from_slice(&key_len.to_le_bytes());
    record.extend_from_slice(key);
    record.extend_from_slice(&val_len.to_le_bytes());
    record.extend_from_slice(value);
    Ok(record)
}

fn read_u32(buf: &[u8], at: usize) -> Option<usize> {
    let bytes: [u8; 4] = buf.get(at..at + 4)?.try_into().ok()?;
    usize::try_from(u32::from_le_bytes(bytes)).ok()
}

/// What an append needs from the log besides writing and seeking.
trait LogFile: Write + Seek {
    fn truncate_to(&mut self, len: u64) -> io::Result<()>;
    fn sync(&mut self) -> io::Result<()>;
}

impl LogFile for File {
    fn truncate_to(&mut self, len: u64) -> io::Result<()> {
        self.set_len(len)
    }

    fn sync(&mut self) -> io::Result<()> {
        self.sync_data()
    }
}

/// Appends `record` at the end of `log`.
///
/// A failed write or sync cuts the log back to its previous length, so a
/// partial record is never followed by later appends.
fn append_record<L: LogFile>(log: &mut L, record: &[u8], sync: bool) -> StorageResult<()> {
    let start = log.seek(SeekFrom::End(0))?;
    let written = log
        .write_all(record)
        .and_then(|()| if sync { log.sync() } else { Ok(()) });

    if let Err(e) = written {
        let rollback = log
            .truncate_to(start)
            .and_then(|()| log.seek(SeekFrom::Start(start)).map(|_| ()));
        if let Err(rollback) = rollback {
            warn!(offset = start, error = %rollback, "failed to roll back partial record");
        }
        return Err(e.into());
    }
    Ok(())
}

/// Rebuilds the index from the log, truncating a torn tail.
fn replay(data: &mut File) -> StorageResult<BTreeMap<Vec<u8>, Vec<u8>>> {
    let mut buf = Vec::new();
    data.seek(SeekFrom::Start(0))?;
    data.read_to_end(&mut buf)?;

    let (index, valid) = parse_log(&buf)?;
    if valid < buf.len() {
        warn!(
            valid,
            total = buf.len(),
            "truncating torn record at end of data log"
        );
        data.set_len(valid as u64)?;
        data.sync_all()?;
    }

    Ok(index)
}

/// Parses complete records from `buf`.
///
/// Returns the index and the length of the valid prefix. Only a record
/// running past the end of `buf` counts as torn; a record whose lengths
/// end anywhere but at the next magic is corruption.
fn parse_log(buf: &[u8]) -> StorageResult<(BTreeMap<Vec<u8>, Vec<u8>>, usize)> {
    let mut index = BTreeMap::new();
    let mut pos = 0usize;

    while pos < buf.len() {
        let remaining = buf.len() - pos;
        if remaining < HEADER_LEN {
            break;
        }
        if &buf[pos..pos + 4] != RECORD_MAGIC {
            return Err(StorageError::corrupted(pos as u64, "bad record magic"));
        }
        let op = buf[pos + 4];
        let Some(key_len) = read_u32(buf, pos + 5) else {
            break;
        };
        let key_start = pos + HEADER_LEN;
        let Some(val_len) = read_u32(buf, key_start + key_len) else {
            break;
        };
        let val_start = key_start + key_len + 4;
        let end = val_start + val_len;
        if end > buf.len() {
            break;
        }
        if buf.len() - end >= RECORD_MAGIC.len() && &buf[end..end + 4] != RECORD_MAGIC {
            return Err(StorageError::corrupted(
                pos as u64,
                "record length does not reach the next record",
            ));
        }

        let key = buf[key_start..key_start + key_len].to_vec();
        match op {
            OP_PUT => {
                index.insert(key, buf[val_start..end].to_vec());
            }
            OP_DELETE => {
                index.remove(&key);
            }
            other => {
                return Err(StorageError::corrupted(
                    pos as u64,
                    format!("unknown record op {other}"),
                ));
            }
        }
        pos = end;
    }

    Ok((index, pos))
}
