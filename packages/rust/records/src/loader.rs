//! Source record loader.
//!
//! Reads one directory of YAML documents and parses each into an untyped
//! record keyed by its file stem. Records keep the directory-listing order the
//! OS hands back, which is filesystem-dependent and not normalized here.

use std::path::{Path, PathBuf};

use serde_json::Value;
use tracing::{debug, instrument, trace};

use lasfera_shared::{Result, SOURCE_EXTENSION, SferaError};

/// One parsed source document.
#[derive(Debug, Clone, PartialEq)]
pub struct SourceRecord {
    /// File name with the `.yaml` extension stripped.
    pub key: String,
    /// File the record was read from.
    pub path: PathBuf,
    /// Parsed document. Empty documents are `Value::Null`.
    pub value: Value,
}

impl SourceRecord {
    pub fn new(key: impl Into<String>, value: Value) -> Self {
        let key = key.into();
        Self {
            path: PathBuf::from(format!("{key}.{SOURCE_EXTENSION}")),
            key,
            value,
        }
    }
}

/// Loaded records of one entity directory, in listing order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RecordSet {
    records: Vec<SourceRecord>,
}

impl RecordSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, record: SourceRecord) {
        self.records.push(record);
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, SourceRecord> {
        self.records.iter()
    }

    /// Reorder by record key, byte-wise.
    pub fn sort_by_key(&mut self) {
        self.records.sort_by(|a, b| a.key.cmp(&b.key));
    }

    pub fn get(&self, key: &str) -> Option<&SourceRecord> {
        self.records.iter().find(|r| r.key == key)
    }
}

impl IntoIterator for RecordSet {
    type Item = SourceRecord;
    type IntoIter = std::vec::IntoIter<SourceRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.into_iter()
    }
}

impl FromIterator<SourceRecord> for RecordSet {
    fn from_iter<I: IntoIterator<Item = SourceRecord>>(iter: I) -> Self {
        Self {
            records: iter.into_iter().collect(),
        }
    }
}

/// Load every `*.yaml` file in `dir`.
///
/// Other files and subdirectories are skipped. A missing directory is a
/// [`SferaError::FileSystem`]; one malformed document fails the whole load
/// with [`SferaError::Parse`].
#[instrument(skip_all, fields(dir = %dir.display()))]
pub fn load_records(dir: &Path) -> Result<RecordSet> {
    if !dir.is_dir() {
        return Err(SferaError::file_system(dir, "source directory does not exist"));
    }

    let entries = std::fs::read_dir(dir).map_err(|e| SferaError::io(dir, e))?;
    let mut records = RecordSet::new();

    for entry in entries {
        let entry = entry.map_err(|e| SferaError::io(dir, e))?;
        let path = entry.path();

        let Some(key) = record_key(&path) else {
            trace!(path = %path.display(), "skipping unrecognized entry");
            continue;
        };
        if !path.is_file() {
            trace!(path = %path.display(), "skipping non-file entry");
            continue;
        }

        let value = parse_document(&path)?;
        records.push(SourceRecord { key, path, value });
    }

    debug!(count = records.len(), "records loaded");
    Ok(records)
}

/// File stem for recognized source documents, `None` otherwise.
fn record_key(path: &Path) -> Option<String> {
    let name = path.file_name()?.to_str()?;
    name.strip_suffix(&format!(".{SOURCE_EXTENSION}"))
        .map(str::to_string)
}

fn parse_document(path: &Path) -> Result<Value> {
    let content = std::fs::read_to_string(path).map_err(|e| match e.kind() {
        std::io::ErrorKind::InvalidData => {
            SferaError::parse(path, format!("not valid UTF-8: {e}"))
        }
        _ => SferaError::io(path, e),
    })?;

    if content.trim().is_empty() {
        return Ok(Value::Null);
    }

    // Merge keys (`<<: *anchor`) are resolved before the document becomes JSON.
    let mut yaml: serde_yaml::Value =
        serde_yaml::from_str(&content).map_err(|e| SferaError::parse(path, e.to_string()))?;
    yaml.apply_merge().map_err(|e| SferaError::parse(path, e.to_string()))?;
    serde_yaml::from_value(yaml).map_err(|e| SferaError::parse(path, e.to_string()))
}
