//! intake-storage-json
//!
//! Filesystem persistence for finished submissions: one pretty-printed JSON
//! document per submission, named after its id.

use std::{
    cmp::Reverse,
    fs::{self, File},
    io::{ErrorKind, Write},
    path::{Path, PathBuf},
};

use intake_core::{StoreError, SubmissionStore};
use intake_domain::{StoredSubmission, SubmissionDocument, SubmissionId, SubmissionSummary};
use tracing::{debug, warn};
use uuid::Uuid;

const DOCUMENT_EXTENSION: &str = "json";
const TMP_SUFFIX: &str = "tmp";

/// Stores each submission as `<uuid>.json` under a single directory.
#[derive(Debug, Clone)]
pub struct JsonSubmissionStore {
    submissions_dir: PathBuf,
}

impl JsonSubmissionStore {
    pub fn new(submissions_dir: PathBuf) -> Result<Self, StoreError> {
        fs::create_dir_all(&submissions_dir)?;
        Ok(Self { submissions_dir })
    }

    /// Store rooted at `data_dir/submissions`.
    pub fn in_data_dir(data_dir: &Path) -> Result<Self, StoreError> {
        Self::new(data_dir.join("submissions"))
    }

    pub fn submissions_dir(&self) -> &Path {
        &self.submissions_dir
    }

    pub fn submission_path(&self, id: &SubmissionId) -> PathBuf {
        self.submissions_dir
            .join(format!("{}.{}", id, DOCUMENT_EXTENSION))
    }

    /// Resolves a full id or an unambiguous prefix of one, as typed by a user.
    pub fn resolve(&self, raw: &str) -> Result<SubmissionId, StoreError> {
        let raw = raw.trim();
        if let Ok(uuid) = Uuid::parse_str(raw) {
            return Ok(SubmissionId(uuid));
        }
        let mut matches = self
            .document_paths()?
            .into_iter()
            .filter_map(|path| id_from_path(&path))
            .filter(|id| !raw.is_empty() && id.to_string().starts_with(raw));
        match (matches.next(), matches.next()) {
            (Some(id), None) => Ok(id),
            (Some(_), Some(_)) => Err(StoreError::NotFound(format!(
                "`{raw}` matches more than one submission"
            ))),
            (None, _) => Err(StoreError::NotFound(raw.to_string())),
        }
    }

    fn document_paths(&self) -> Result<Vec<PathBuf>, StoreError> {
        if !self.submissions_dir.exists() {
            return Ok(Vec::new());
        }
        let mut paths = Vec::new();
        for entry in fs::read_dir(&self.submissions_dir)? {
            let path = entry?.path();
            if !path.is_file() {
                continue;
            }
            if path.extension().and_then(|ext| ext.to_str()) != Some(DOCUMENT_EXTENSION) {
                continue;
            }
            paths.push(path);
        }
        Ok(paths)
    }
}

impl SubmissionStore for JsonSubmissionStore {
    fn insert(&self, document: &SubmissionDocument) -> Result<SubmissionId, StoreError> {
        let record = StoredSubmission {
            id: SubmissionId::new(),
            document: document.clone(),
        };
        let path = self.submission_path(&record.id);
        save_submission_to_path(&record, &path)?;
        debug!(submission = %record.id, path = %path.display(), "submission written");
        Ok(record.id)
    }

    fn load(&self, id: &SubmissionId) -> Result<StoredSubmission, StoreError> {
        load_submission_from_path(&self.submission_path(id)).map_err(|err| match err {
            StoreError::Io(io) if io.kind() == ErrorKind::NotFound => {
                StoreError::NotFound(id.to_string())
            }
            other => other,
        })
    }

    fn list(&self) -> Result<Vec<SubmissionSummary>, StoreError> {
        let mut rows = Vec::new();
        for path in self.document_paths()? {
            match load_submission_from_path(&path) {
                Ok(record) => rows.push(record.summary()),
                Err(err) => {
                    warn!(path = %path.display(), error = %err, "skipping unreadable submission")
                }
            }
        }
        rows.sort_by_key(|row| Reverse(row.submitted_at));
        Ok(rows)
    }
}

/// Writes a stored submission to an arbitrary path through a temp file.
pub fn save_submission_to_path(record: &StoredSubmission, path: &Path) -> Result<(), StoreError> {
    let tmp = tmp_path(path);
    write_atomic(&tmp, &serialize_submission(record)?)?;
    fs::rename(&tmp, path)?;
    Ok(())
}

pub fn load_submission_from_path(path: &Path) -> Result<StoredSubmission, StoreError> {
    let data = fs::read_to_string(path)?;
    serde_json::from_str(&data).map_err(|err| StoreError::Serde(err.to_string()))
}

fn id_from_path(path: &Path) -> Option<SubmissionId> {
    let stem = path.file_stem()?.to_str()?;
    Uuid::parse_str(stem).ok().map(SubmissionId)
}

fn tmp_path(path: &Path) -> PathBuf {
    let mut tmp = path.to_path_buf();
    let ext = match path.extension().and_then(|ext| ext.to_str()) {
        Some(existing) => format!("{}.{}", existing, TMP_SUFFIX),
        None => TMP_SUFFIX.to_string(),
    };
    tmp.set_extension(ext);
    tmp
}

fn write_atomic(path: &Path, data: &str) -> Result<(), StoreError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let mut file = File::create(path)?;
    file.write_all(data.as_bytes())?;
    file.sync_all()?;
    Ok(())
}

fn serialize_submission(record: &StoredSubmission) -> Result<String, StoreError> {
    serde_json::to_string_pretty(record).map_err(|err| StoreError::Serde(err.to_string()))
}
