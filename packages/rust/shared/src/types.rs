//! Core domain types for the La Sfera data build.

use std::path::PathBuf;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Field carrying the dotted positional identifier of stanzas and translations.
pub const LINE_CODE_FIELD: &str = "line_code";

/// Extension of recognized source documents.
pub const SOURCE_EXTENSION: &str = "yaml";

// ---------------------------------------------------------------------------
// EntityKind
// ---------------------------------------------------------------------------

/// The four entity types the build emits, in build order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntityKind {
    Manuscripts,
    Stanzas,
    Translations,
    Locations,
}

impl EntityKind {
    /// Fixed build sequence.
    pub const ALL: [EntityKind; 4] = [
        EntityKind::Manuscripts,
        EntityKind::Stanzas,
        EntityKind::Translations,
        EntityKind::Locations,
    ];

    /// Plural name, used as source subdirectory and output stem.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Manuscripts => "manuscripts",
            Self::Stanzas => "stanzas",
            Self::Translations => "translations",
            Self::Locations => "locations",
        }
    }

    /// Source subdirectory under the data directory.
    pub fn source_dir_name(&self) -> &'static str {
        self.as_str()
    }

    /// Output file name under the output directory.
    pub fn output_file_name(&self) -> String {
        format!("{}.json", self.as_str())
    }
}

impl std::fmt::Display for EntityKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for EntityKind {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|k| k.as_str() == s)
            .ok_or_else(|| format!("unknown entity kind '{s}'"))
    }
}

// ---------------------------------------------------------------------------
// RecordOrdering
// ---------------------------------------------------------------------------

/// Output order for the unsorted collections (manuscripts, locations).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RecordOrdering {
    /// Directory-listing order as returned by the OS. Not stable across filesystems.
    #[default]
    Listing,
    /// Byte-wise order of the record key (file stem).
    Key,
}

// ---------------------------------------------------------------------------
// Build report
// ---------------------------------------------------------------------------

/// Outcome of building one entity collection.
#[derive(Debug, Clone, Serialize)]
pub struct EntityReport {
    pub kind: EntityKind,
    /// Number of entries in the emitted collection.
    pub count: usize,
    /// Number of recognized source documents that were loaded.
    pub source_count: usize,
    /// Written file, or `None` in check mode.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output_path: Option<PathBuf>,
    /// SHA-256 of the serialized collection.
    pub sha256: String,
}

/// Outcome of a full driver run.
#[derive(Debug, Clone, Serialize)]
pub struct BuildReport {
    pub entities: Vec<EntityReport>,
    pub completed_at: DateTime<Utc>,
    #[serde(skip)]
    pub elapsed: std::time::Duration,
}

impl BuildReport {
    /// Look up the report for one entity kind.
    pub fn entity(&self, kind: EntityKind) -> Option<&EntityReport> {
        self.entities.iter().find(|e| e.kind == kind)
    }
}
