//! YAML source records → JSON data collections for the page templates.
//!
//! This crate provides:
//! - [`loader`]: reads one entity directory into a [`RecordSet`]
//! - [`builders`]: per-entity shaping (sequence, sorted, keyed)
//! - [`driver`]: the fixed-sequence build over all four entities
//! - [`lookup`]: helpers templates use on the emitted data

pub mod builders;
pub mod driver;
pub mod line_code;
pub mod loader;
pub mod lookup;
pub mod writer;

pub use builders::{EntityCollection, build_collection};
pub use driver::{BuildProgress, SilentProgress, build_all, build_entity, check_all};
pub use loader::{RecordSet, SourceRecord, load_records};
pub use lookup::{TranslationIndex, format_line_code};
