//! Deep-zoom viewer synchronization for the transcription page.
//!
//! This crate provides:
//! - [`manifest`]: IIIF manifest model and HTTP fetch
//! - [`folio`]: folio identifier → canvas index matching
//! - [`observer`]: scroll tracking over folio dividers
//! - [`ViewerSession`]: the per-page context tying them together

pub mod folio;
pub mod manifest;
pub mod observer;
pub mod session;

pub use folio::{FolioMatcher, find_folio_canvas};
pub use manifest::{Canvas, Manifest, MetadataEntry, fetch_manifest};
pub use observer::{FolioDivider, FolioEvent, ScrollObserver};
pub use session::{CanvasCommand, ViewerSession};
