//! Lookups the page templates perform on emitted collections.

use std::path::Path;

use serde_json::{Map, Value};

use lasfera_shared::{EntityKind, Result, SferaError};

/// The emitted translations collection, keyed by `line_code`.
#[derive(Debug, Clone, Default)]
pub struct TranslationIndex {
    entries: Map<String, Value>,
}

impl TranslationIndex {
    pub fn new(entries: Map<String, Value>) -> Self {
        Self { entries }
    }

    /// Read `translations.json` from an output directory.
    pub fn load(output_dir: &Path) -> Result<Self> {
        let path = output_dir.join(EntityKind::Translations.output_file_name());
        let content = std::fs::read_to_string(&path).map_err(|e| SferaError::io(&path, e))?;

        match serde_json::from_str(&content) {
            Ok(Value::Object(entries)) => Ok(Self { entries }),
            Ok(_) => Err(SferaError::parse(&path, "expected a JSON object keyed by line_code")),
            Err(e) => Err(SferaError::parse(&path, e.to_string())),
        }
    }

    /// Translation for a stanza's line code, if one exists.
    pub fn get(&self, line_code: &str) -> Option<&Value> {
        self.entries.get(line_code)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Display form of a line code. Currently the code itself.
pub fn format_line_code(line_code: &str) -> &str {
    line_code
}
