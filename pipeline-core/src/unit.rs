//! On-disk layout of a unit of work.
//!
//! Every unread message becomes one directory under the attachments root,
//! named with a fresh UUID. Extraction writes the body and attachments into
//! it, enrichment adds `output.json`, reconciliation reads that record back.

use crate::record::ExtractedRecord;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;
use uuid::Uuid;

/// Plain-text body of the message.
pub const EMAIL_TEXT_FILE: &str = "email_text.txt";

/// Structured record produced by enrichment.
pub const RECORD_FILE: &str = "output.json";

const RECORD_TMP_FILE: &str = "output.json.tmp";

#[derive(Debug, Error)]
pub enum UnitError {
    #[error("No output.json in unit {0}")]
    RecordMissing(String),

    #[error("Invalid output.json in unit {unit}: {source}")]
    RecordInvalid {
        unit: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("I/O error in unit {unit}: {source}")]
    Io {
        unit: String,
        #[source]
        source: io::Error,
    },
}

/// One unit of work: a directory under the attachments root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnitOfWork {
    pub id: String,
    pub path: PathBuf,
}

impl UnitOfWork {
    /// Open an existing unit directory.
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let id = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default();
        Self { id, path }
    }

    /// Create a new, uniquely named unit directory under `root`.
    pub fn create(root: &Path) -> Result<Self, UnitError> {
        let id = Uuid::new_v4().to_string();
        let path = root.join(&id);
        fs::create_dir_all(&path).map_err(|source| UnitError::Io {
            unit: id.clone(),
            source,
        })?;
        Ok(Self { id, path })
    }

    pub fn record_path(&self) -> PathBuf {
        self.path.join(RECORD_FILE)
    }

    pub fn email_text_path(&self) -> PathBuf {
        self.path.join(EMAIL_TEXT_FILE)
    }

    /// Read and parse `output.json`.
    pub fn read_record(&self) -> Result<ExtractedRecord, UnitError> {
        let raw = match fs::read_to_string(self.record_path()) {
            Ok(raw) => raw,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                return Err(UnitError::RecordMissing(self.id.clone()));
            }
            Err(source) => return Err(self.io_error(source)),
        };

        serde_json::from_str(&raw).map_err(|source| UnitError::RecordInvalid {
            unit: self.id.clone(),
            source,
        })
    }

    /// Write `output.json` as pretty JSON, replacing any previous record.
    pub fn write_record(&self, record: &ExtractedRecord) -> Result<(), UnitError> {
        let body = serde_json::to_string_pretty(record).map_err(|source| {
            UnitError::RecordInvalid {
                unit: self.id.clone(),
                source,
            }
        })?;
        let tmp = self.path.join(RECORD_TMP_FILE);
        fs::write(&tmp, body).map_err(|e| self.io_error(e))?;
        fs::rename(&tmp, self.record_path()).map_err(|e| self.io_error(e))
    }

    /// The message body, if extraction found one.
    pub fn read_email_text(&self) -> Result<Option<String>, UnitError> {
        match fs::read(self.email_text_path()) {
            Ok(bytes) => Ok(Some(String::from_utf8_lossy(&bytes).into_owned())),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(self.io_error(e)),
        }
    }

    pub fn write_email_text(&self, text: &str) -> Result<(), UnitError> {
        fs::write(self.email_text_path(), text).map_err(|e| self.io_error(e))
    }

    /// Store an attachment under a sanitized version of its file name and
    /// return the name actually used.
    pub fn write_attachment(&self, filename: &str, bytes: &[u8]) -> Result<String, UnitError> {
        let name = sanitize_file_name(filename);
        fs::write(self.path.join(&name), bytes).map_err(|e| self.io_error(e))?;
        Ok(name)
    }

    /// Attachment files in lexical order, excluding the body and the record.
    pub fn attachments(&self) -> Result<Vec<PathBuf>, UnitError> {
        let entries = fs::read_dir(&self.path).map_err(|e| self.io_error(e))?;
        let mut files = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|e| self.io_error(e))?;
            let file_type = entry.file_type().map_err(|e| self.io_error(e))?;
            if !file_type.is_file() {
                continue;
            }
            let name = entry.file_name();
            let name = name.to_string_lossy();
            if name == EMAIL_TEXT_FILE || name == RECORD_FILE || name == RECORD_TMP_FILE {
                continue;
            }
            files.push(entry.path());
        }
        files.sort();
        Ok(files)
    }

    fn io_error(&self, source: io::Error) -> UnitError {
        UnitError::Io {
            unit: self.id.clone(),
            source,
        }
    }
}

/// Enumerate the units under `root` in lexical order of their names.
///
/// Plain files at the root are ignored.
pub fn list_units(root: &Path) -> io::Result<Vec<UnitOfWork>> {
    let mut units = Vec::new();
    for entry in fs::read_dir(root)? {
        let entry = entry?;
        if entry.file_type()?.is_dir() {
            units.push(UnitOfWork::open(entry.path()));
        }
    }
    units.sort_by(|a, b| a.id.cmp(&b.id));
    Ok(units)
}

/// Strip directory components and characters that are unsafe in file names.
pub fn sanitize_file_name(raw: &str) -> String {
    let base = raw
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or_default()
        .trim();
    let cleaned: String = base
        .chars()
        .map(|c| {
            if c.is_control() || matches!(c, ':' | '*' | '?' | '"' | '<' | '>' | '|') {
                '_'
            } else {
                c
            }
        })
        .collect();
    let cleaned = cleaned.trim_start_matches('.');
    if cleaned.is_empty() || cleaned == EMAIL_TEXT_FILE || cleaned == RECORD_FILE {
        format!("attachment-{}", cleaned.trim_start_matches('.'))
            .trim_end_matches('-')
            .to_string()
    } else {
        cleaned.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn list_units_skips_files_and_sorts_by_name() {
        let root = tempfile::tempdir().unwrap();
        fs::create_dir(root.path().join("b-unit")).unwrap();
        fs::create_dir(root.path().join("a-unit")).unwrap();
        fs::write(root.path().join("stray.txt"), "x").unwrap();

        let units = list_units(root.path()).unwrap();
        let ids: Vec<_> = units.iter().map(|u| u.id.as_str()).collect();
        assert_eq!(ids, vec!["a-unit", "b-unit"]);
    }

    #[test]
    fn missing_record_is_reported_as_missing() {
        let root = tempfile::tempdir().unwrap();
        let unit = UnitOfWork::create(root.path()).unwrap();
        assert!(matches!(unit.read_record(), Err(UnitError::RecordMissing(_))));
    }

    #[test]
    fn corrupt_record_is_reported_as_invalid() {
        let root = tempfile::tempdir().unwrap();
        let unit = UnitOfWork::create(root.path()).unwrap();
        fs::write(unit.record_path(), "{ nope").unwrap();
        assert!(matches!(
            unit.read_record(),
            Err(UnitError::RecordInvalid { .. })
        ));
    }

    #[test]
    fn record_written_can_be_read_back() {
        let root = tempfile::tempdir().unwrap();
        let unit = UnitOfWork::create(root.path()).unwrap();
        let record = ExtractedRecord {
            username: Some("alice".to_string()),
            transaction_amount: Some("₹100".to_string()),
            ..Default::default()
        };

        unit.write_record(&record).unwrap();

        assert_eq!(unit.read_record().unwrap(), record);
        assert!(!unit.path.join("output.json.tmp").exists());
    }

    #[test]
    fn attachments_exclude_body_and_record() {
        let root = tempfile::tempdir().unwrap();
        let unit = UnitOfWork::create(root.path()).unwrap();
        unit.write_email_text("hello").unwrap();
        unit.write_record(&ExtractedRecord::default()).unwrap();
        unit.write_attachment("receipt.png", b"png").unwrap();

        let names: Vec<_> = unit
            .attachments()
            .unwrap()
            .into_iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, vec!["receipt.png"]);
    }

    #[test]
    fn sanitize_strips_paths_and_reserved_names() {
        assert_eq!(sanitize_file_name("../../etc/passwd"), "passwd");
        assert_eq!(sanitize_file_name("C:\\docs\\slip?.jpg"), "slip_.jpg");
        assert_eq!(sanitize_file_name("output.json"), "attachment-output.json");
        assert_eq!(sanitize_file_name(""), "attachment");
        assert_eq!(sanitize_file_name(".hidden"), "hidden");
    }
}
