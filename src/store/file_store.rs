//! Single-file session store
//!
//! File format:
//! ```text
//! [HEADER: 64 bytes]
//!   - magic: 8 bytes ("NOTARYDB")
//!   - version: 4 bytes (u32 LE)
//!   - flags: 4 bytes
//!   - session_count: 8 bytes (u64 LE)
//!   - body_len: 8 bytes (u64 LE)
//!   - reserved: 32 bytes
//!
//! [BODY: body_len bytes]
//!   - bincode-encoded list of session records, sorted by id
//! ```
//!
//! Every `put` rewrites the whole file through a temporary sibling and an
//! atomic rename, so a crash leaves either the old or the new contents.

use super::SessionStore;
use crate::model::SessionRecord;
use crate::{Error, Result, MAGIC, VERSION};
use parking_lot::RwLock;
use std::collections::BTreeMap;
use std::fs::{self, File, OpenOptions};
use std::io::{Read, Write};
use std::path::{Path, PathBuf};

const HEADER_SIZE: usize = 64;

/// A session store backed by a single file
pub struct FileStore {
    path: PathBuf,
    sessions: RwLock<BTreeMap<String, SessionRecord>>,
}

impl FileStore {
    /// Create a new, empty store file (truncating any existing one)
    pub fn create(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        let store = FileStore {
            path,
            sessions: RwLock::new(BTreeMap::new()),
        };
        store.persist(&store.sessions.read())?;
        Ok(store)
    }

    /// Open an existing store file
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let mut file = File::open(&path)?;

        let mut header = [0u8; HEADER_SIZE];
        file.read_exact(&mut header)
            .map_err(|_| Error::InvalidFile("Truncated header".into()))?;

        if &header[0..8] != MAGIC {
            return Err(Error::InvalidFile("Invalid magic bytes".into()));
        }

        let version = read_u32(&header[8..12]);
        if version != VERSION {
            return Err(Error::VersionMismatch {
                expected: VERSION,
                found: version,
            });
        }

        let session_count = read_u64(&header[16..24]);
        let body_len = read_u64(&header[24..32]) as usize;

        let mut body = Vec::new();
        file.read_to_end(&mut body)?;
        if body.len() != body_len {
            return Err(Error::InvalidFile(format!(
                "Body length mismatch: header says {}, found {}",
                body_len,
                body.len()
            )));
        }

        let records: Vec<SessionRecord> = bincode::deserialize(&body)?;
        if records.len() as u64 != session_count {
            return Err(Error::InvalidFile(format!(
                "Session count mismatch: header says {}, found {}",
                session_count,
                records.len()
            )));
        }

        let sessions = records
            .into_iter()
            .map(|r| (r.session_id.clone(), r))
            .collect();

        tracing::debug!(path = %path.display(), sessions = session_count, "opened session store");
        Ok(FileStore {
            path,
            sessions: RwLock::new(sessions),
        })
    }

    /// Open or create a store file
    pub fn open_or_create(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if path.exists() {
            Self::open(path)
        } else {
            Self::create(path)
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn persist(&self, sessions: &BTreeMap<String, SessionRecord>) -> Result<()> {
        let records: Vec<&SessionRecord> = sessions.values().collect();
        let body = bincode::serialize(&records)?;

        let mut header = [0u8; HEADER_SIZE];
        header[0..8].copy_from_slice(MAGIC);
        header[8..12].copy_from_slice(&VERSION.to_le_bytes());
        // flags: 0
        header[16..24].copy_from_slice(&(records.len() as u64).to_le_bytes());
        header[24..32].copy_from_slice(&(body.len() as u64).to_le_bytes());

        let tmp = temp_path(&self.path);
        {
            let mut file = OpenOptions::new()
                .write(true)
                .create(true)
                .truncate(true)
                .open(&tmp)?;
            file.write_all(&header)?;
            file.write_all(&body)?;
            file.sync_all()?;
        }
        fs::rename(&tmp, &self.path)?;

        tracing::debug!(
            path = %self.path.display(),
            sessions = records.len(),
            bytes = HEADER_SIZE + body.len(),
            "persisted session store"
        );
        Ok(())
    }
}

impl SessionStore for FileStore {
    fn get(&self, session_id: &str) -> Result<Option<SessionRecord>> {
        Ok(self.sessions.read().get(session_id).cloned())
    }

    fn put(&self, record: SessionRecord) -> Result<()> {
        // Hold the write lock across the rewrite so concurrent puts serialize
        let mut sessions = self.sessions.write();
        let previous = sessions.insert(record.session_id.clone(), record.clone());
        if let Err(e) = self.persist(&sessions) {
            match previous {
                Some(prev) => sessions.insert(record.session_id, prev),
                None => sessions.remove(&record.session_id),
            };
            return Err(e);
        }
        Ok(())
    }

    fn list(&self) -> Result<Vec<String>> {
        Ok(self.sessions.read().keys().cloned().collect())
    }
}

/// Sibling used for atomic rewrites: the full file name plus `.tmp`
fn temp_path(path: &Path) -> PathBuf {
    let mut name = path.file_name().map(|n| n.to_os_string()).unwrap_or_default();
    name.push(".tmp");
    path.with_file_name(name)
}

fn read_u32(bytes: &[u8]) -> u32 {
    let mut buf = [0u8; 4];
    buf.copy_from_slice(bytes);
    u32::from_le_bytes(buf)
}

fn read_u64(bytes: &[u8]) -> u64 {
    let mut buf = [0u8; 8];
    buf.copy_from_slice(bytes);
    u64::from_le_bytes(buf)
}
