//! Directory-backed graph store.
//!
//! Layout under `data_dir`:
//!
//! ```text
//! u_4_6_c_even.db            one record per line
//! u_4_6_c_even.db.complete   written (atomically, via rename) on commit
//! ```
//!
//! An entry without its marker is a leftover from an interrupted run and
//! loads as absent.

use std::fs::{self, OpenOptions};
use std::io::{self, BufRead, BufReader, Write};
use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use super::GraphStore;
use crate::{Error, Result};

const MARKER_SUFFIX: &str = ".complete";

#[derive(Debug, Clone)]
pub struct FileStore {
    data_dir: PathBuf,
}

impl FileStore {
    /// Open (creating if needed) a store rooted at `data_dir`.
    pub fn open(data_dir: impl AsRef<Path>) -> Result<Self> {
        let data_dir = data_dir.as_ref().to_path_buf();
        fs::create_dir_all(&data_dir).map_err(|e| unavailable(&data_dir, e))?;
        if !data_dir.is_dir() {
            return Err(Error::CacheStorageUnavailable {
                path: data_dir,
                message: "not a directory".into(),
            });
        }
        debug!(data_dir = %data_dir.display(), "file store opened");
        Ok(Self { data_dir })
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    fn entry_path(&self, name: &str) -> Result<PathBuf> {
        if name.is_empty() || name.contains(['/', '\\']) || name.starts_with('.') {
            return Err(Error::InvalidOptions(format!("invalid store entry name {name:?}")));
        }
        Ok(self.data_dir.join(name))
    }

    fn marker_path(&self, name: &str) -> Result<PathBuf> {
        self.entry_path(name)?;
        Ok(self.data_dir.join(format!("{name}{MARKER_SUFFIX}")))
    }
}

fn unavailable(path: &Path, err: io::Error) -> Error {
    Error::CacheStorageUnavailable { path: path.to_path_buf(), message: err.to_string() }
}

fn remove_if_present(path: &Path) -> Result<()> {
    match fs::remove_file(path) {
        Err(e) if e.kind() != io::ErrorKind::NotFound => Err(unavailable(path, e)),
        _ => Ok(()),
    }
}

impl GraphStore for FileStore {
    fn load(&self, name: &str) -> Result<Option<Vec<String>>> {
        let path = self.entry_path(name)?;
        if !self.marker_path(name)?.exists() {
            if path.exists() {
                warn!(entry = name, "ignoring incomplete store entry");
            }
            return Ok(None);
        }
        let file = match fs::File::open(&path) {
            Ok(file) => file,
            // committed with zero records
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Some(Vec::new())),
            Err(e) => return Err(unavailable(&path, e)),
        };
        let records = BufReader::new(file)
            .lines()
            .collect::<io::Result<Vec<String>>>()
            .map_err(|e| unavailable(&path, e))?;
        Ok(Some(records))
    }

    fn append(&self, name: &str, records: &[String]) -> Result<()> {
        let path = self.entry_path(name)?;
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .map_err(|e| unavailable(&path, e))?;
        let mut buffer = String::new();
        for record in records {
            buffer.push_str(record);
            buffer.push('\n');
        }
        file.write_all(buffer.as_bytes()).map_err(|e| unavailable(&path, e))?;
        Ok(())
    }

    fn commit(&self, name: &str) -> Result<()> {
        let marker = self.marker_path(name)?;
        let staging = self.data_dir.join(format!(".{name}{MARKER_SUFFIX}.tmp"));
        fs::write(&staging, b"").map_err(|e| unavailable(&staging, e))?;
        fs::rename(&staging, &marker).map_err(|e| unavailable(&marker, e))?;
        Ok(())
    }

    fn discard(&self, name: &str) -> Result<()> {
        remove_if_present(&self.marker_path(name)?)?;
        remove_if_present(&self.entry_path(name)?)
    }

    fn describe(&self) -> String {
        self.data_dir.display().to_string()
    }
}
