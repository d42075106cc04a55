//! File-backed durable tier shared by every scenario of a run.
//!
//! One JSON document per run lives at
//! `<results_dir>/persistent-data-<run-id>.json`. Each `put` reads the whole
//! file, sets one key, and rewrites the whole file. Under
//! [`WriteMode::LastWriteWins`] there is no locking: two scenarios writing
//! at the same time can lose one another's keys, and the last whole-file
//! write wins. [`WriteMode::Locked`] serializes the read-modify-write with
//! an exclusive advisory lock on a sidecar `.lock` file.

use crate::config::{WriteMode, ENV_VAR_RUN_ID};
use crate::document::{read_document, Document, Value};
use crate::error::{Result, TdmError};
use chrono::{DateTime, NaiveDateTime, SecondsFormat, Utc};
use fs2::FileExt;
use std::fmt;
use std::fs::{self, File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use tracing::debug;

const FILE_PREFIX: &str = "persistent-data-";
const RUN_ID_FORMAT: &str = "%Y-%m-%dT%H-%M-%S-%3fZ";

/// Identifies one harness run; derived from the run-start timestamp.
///
/// Rendered as an RFC 3339 UTC timestamp with milliseconds where `:` and
/// `.` are replaced by `-`, e.g. `2026-10-18T09-30-00-123Z`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RunId(DateTime<Utc>);

impl RunId {
    /// Run id for a run starting now.
    pub fn now() -> Self {
        Self::from_timestamp(Utc::now())
    }

    /// Run id for a run started at `started_at` (truncated to milliseconds).
    pub fn from_timestamp(started_at: DateTime<Utc>) -> Self {
        let millis = started_at.timestamp_millis();
        Self(DateTime::from_timestamp_millis(millis).unwrap_or(started_at))
    }

    /// Run id shared through `TDM_RUN_ID`, if set.
    ///
    /// A blank value counts as unset. Harness processes of one run export
    /// the same `TDM_RUN_ID` so they all resolve to the same durable file.
    pub fn from_env() -> Result<Option<Self>> {
        match std::env::var(ENV_VAR_RUN_ID) {
            Ok(value) if !value.trim().is_empty() => Self::parse(&value).map(Some),
            _ => Ok(None),
        }
    }

    /// Run id shared through `TDM_RUN_ID`, or a new one starting now.
    pub fn from_env_or_now() -> Result<Self> {
        Ok(Self::from_env()?.unwrap_or_else(Self::now))
    }

    /// Parses a rendered run id.
    pub fn parse(s: &str) -> Result<Self> {
        NaiveDateTime::parse_from_str(s.trim(), RUN_ID_FORMAT)
            .map(|naive| Self(naive.and_utc()))
            .map_err(|_| TdmError::InvalidRunId(s.to_string()))
    }

    /// Run-start timestamp.
    pub fn started_at(&self) -> DateTime<Utc> {
        self.0
    }
}

impl fmt::Display for RunId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let rfc = self.0.to_rfc3339_opts(SecondsFormat::Millis, true);
        write!(f, "{}", rfc.replace([':', '.'], "-"))
    }
}

impl FromStr for RunId {
    type Err = TdmError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

/// Handle to the durable tier file of one run.
///
/// Cheap to clone; every Store of the run gets its own clone pointing at the
/// same path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DurableFile {
    path: PathBuf,
    mode: WriteMode,
}

impl DurableFile {
    /// Durable file for `run` inside `results_dir`.
    pub fn for_run(results_dir: impl AsRef<Path>, run: &RunId) -> Self {
        Self::at(
            results_dir
                .as_ref()
                .join(format!("{}{}.json", FILE_PREFIX, run)),
        )
    }

    /// Run id encoded in a durable file name, if `name` is one.
    pub fn run_id_from_file_name(name: &str) -> Option<RunId> {
        name.strip_prefix(FILE_PREFIX)
            .and_then(|rest| rest.strip_suffix(".json"))
            .and_then(|raw| RunId::parse(raw).ok())
    }

    /// Durable file at an explicit path.
    pub fn at(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            mode: WriteMode::default(),
        }
    }

    /// Sets the write mode.
    pub fn with_mode(mut self, mode: WriteMode) -> Self {
        self.mode = mode;
        self
    }

    /// Path of the backing file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Write mode in effect.
    pub fn mode(&self) -> WriteMode {
        self.mode
    }

    /// Whether the backing file currently exists.
    pub fn exists(&self) -> bool {
        self.path.exists()
    }

    /// Reads the whole durable document.
    ///
    /// A missing file is an empty document.
    pub fn read_document(&self) -> Result<Document> {
        Ok(read_document(&self.path)?.unwrap_or_default())
    }

    /// Reads one key from the durable document.
    pub fn get(&self, key: &str) -> Result<Option<Value>> {
        Ok(self.read_document()?.remove(key))
    }

    /// Sets one key, rewriting the whole file.
    ///
    /// Creates the results directory on first write. An existing file that
    /// fails to parse is left untouched and reported as malformed.
    pub fn put(&self, key: &str, value: Value) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        match self.mode {
            WriteMode::LastWriteWins => self.read_modify_write(key, value),
            WriteMode::Locked => {
                let _guard = self.lock()?;
                self.read_modify_write(key, value)
            }
        }
    }

    /// Deletes the backing file. Does nothing if it doesn't exist.
    pub fn clear(&self) -> Result<()> {
        match fs::remove_file(&self.path) {
            Ok(()) => {
                debug!(path = %self.path.display(), "Removed durable data file");
                Ok(())
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(TdmError::Io(e)),
        }
    }

    fn read_modify_write(&self, key: &str, value: Value) -> Result<()> {
        let mut doc = self.read_document()?;
        doc.insert(key.to_string(), value);
        self.write_document(&doc)?;
        debug!(path = %self.path.display(), key = key, "Persisted durable value");
        Ok(())
    }

    /// Writes the document atomically using temp file + rename.
    fn write_document(&self, doc: &Document) -> Result<()> {
        let content = serde_json::to_string_pretty(doc)?;
        let tmp_path = self.tmp_path();

        {
            let mut file = File::create(&tmp_path)?;
            file.write_all(content.as_bytes())?;
            file.sync_all()?;
        }

        if let Err(e) = fs::rename(&tmp_path, &self.path) {
            let _ = fs::remove_file(&tmp_path);
            return Err(TdmError::Io(e));
        }

        Ok(())
    }

    /// Per-process temp file, so concurrent unlocked writers don't share it.
    fn tmp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_default();
        name.push(format!(".{}.{}.tmp", std::process::id(), uuid::Uuid::new_v4().simple()));
        self.path.with_file_name(name)
    }

    fn lock_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_default();
        name.push(".lock");
        self.path.with_file_name(name)
    }

    /// Takes the exclusive advisory lock, waiting for the current holder.
    fn lock(&self) -> Result<LockGuard> {
        let path = self.lock_path();
        let file = OpenOptions::new()
            .create(true)
            .read(true)
            .write(true)
            .truncate(false)
            .open(&path)
            .map_err(|e| TdmError::LockFailed {
                path: path.clone(),
                reason: e.to_string(),
            })?;

        file.lock_exclusive().map_err(|e| TdmError::LockFailed {
            path: path.clone(),
            reason: e.to_string(),
        })?;

        Ok(LockGuard { file })
    }
}

/// RAII guard releasing the durable file lock on drop.
///
/// The sidecar lock file itself is never removed.
struct LockGuard {
    file: File,
}

impl Drop for LockGuard {
    fn drop(&mut self) {
        let _ = FileExt::unlock(&self.file);
    }
}
