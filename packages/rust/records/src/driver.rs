//! End-to-end data build: YAML directories → JSON collections.
//!
//! Entities are built in the fixed order manuscripts, stanzas, translations,
//! locations, each one loaded, shaped and written before the next starts.
//! There is no rollback: if a later entity fails, earlier outputs have
//! already been replaced and later ones are left as they were.

use std::time::Instant;

use chrono::Utc;
use tracing::{info, instrument};

use lasfera_shared::{BuildConfig, BuildReport, EntityKind, EntityReport, Result, SferaError};

use crate::builders::build_collection;
use crate::loader::load_records;
use crate::writer::{checksum, write_output};

/// Progress callback for reporting build status.
pub trait BuildProgress {
    /// Called before an entity's records are loaded.
    fn entity_started(&self, kind: EntityKind);
    /// Called after an entity's collection is shaped (and written, unless checking).
    fn entity_built(&self, report: &EntityReport);
    /// Called when every entity is done.
    fn done(&self, report: &BuildReport);
}

/// No-op progress reporter for headless/test usage.
pub struct SilentProgress;

impl BuildProgress for SilentProgress {
    fn entity_started(&self, _kind: EntityKind) {}
    fn entity_built(&self, _report: &EntityReport) {}
    fn done(&self, _report: &BuildReport) {}
}

/// Build and write every entity collection.
#[instrument(skip_all, fields(data_dir = %config.data_dir.display(), output_dir = %config.output_dir.display()))]
pub fn build_all(config: &BuildConfig, progress: &dyn BuildProgress) -> Result<BuildReport> {
    std::fs::create_dir_all(&config.output_dir)
        .map_err(|e| SferaError::io(&config.output_dir, e))?;

    run(config, progress, true)
}

/// Load, shape and validate every entity without writing anything.
#[instrument(skip_all, fields(data_dir = %config.data_dir.display()))]
pub fn check_all(config: &BuildConfig, progress: &dyn BuildProgress) -> Result<BuildReport> {
    run(config, progress, false)
}

/// Build a single entity. The output directory must already exist when `write` is set.
#[instrument(skip(config), fields(entity = %kind))]
pub fn build_entity(kind: EntityKind, config: &BuildConfig, write: bool) -> Result<EntityReport> {
    let source_dir = config.data_dir.join(kind.source_dir_name());
    let records = load_records(&source_dir)?;
    let source_count = records.len();

    let collection = build_collection(kind, records, config)?;
    let json = collection.to_json_pretty()?;

    let (output_path, sha256) = if write {
        let path = config.output_dir.join(kind.output_file_name());
        let sum = write_output(&path, &json)?;
        (Some(path), sum)
    } else {
        (None, checksum(&json))
    };

    info!(entity = %kind, count = collection.len(), "built {} {kind}", collection.len());

    Ok(EntityReport {
        kind,
        count: collection.len(),
        source_count,
        output_path,
        sha256,
    })
}

fn run(config: &BuildConfig, progress: &dyn BuildProgress, write: bool) -> Result<BuildReport> {
    let start = Instant::now();
    let mut entities = Vec::with_capacity(EntityKind::ALL.len());

    for kind in EntityKind::ALL {
        progress.entity_started(kind);
        let report = build_entity(kind, config, write)?;
        progress.entity_built(&report);
        entities.push(report);
    }

    let report = BuildReport {
        entities,
        completed_at: Utc::now(),
        elapsed: start.elapsed(),
    };
    progress.done(&report);

    info!(
        entities = report.entities.len(),
        elapsed_ms = report.elapsed.as_millis(),
        write,
        "data build complete"
    );

    Ok(report)
}
