//! IIIF manifest model, reduced to what folio navigation needs.
//!
//! Presentation API 2.x manifests carry canvases under `sequences[0].canvases`;
//! 3.x manifests put them under `items`. Labels and metadata values come in
//! several shapes (plain string, array, `{"@value": ..}`, language map), so
//! they are kept as raw JSON and flattened on demand by [`text_values`].

use std::path::Path;
use std::time::Duration;

use reqwest::Client;
use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, info, instrument};
use url::Url;

use lasfera_shared::{Result, SferaError};

/// User-Agent string for manifest requests.
const USER_AGENT: &str = concat!("LaSfera/", env!("CARGO_PKG_VERSION"));

/// Default timeout in seconds for fetching a manifest.
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// A IIIF manifest.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Manifest {
    #[serde(rename = "@id", alias = "id", default)]
    pub id: Option<String>,
    #[serde(default)]
    pub label: Value,
    #[serde(default)]
    pub sequences: Vec<Sequence>,
    /// Presentation 3 canvases.
    #[serde(default)]
    pub items: Vec<Canvas>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Sequence {
    #[serde(default)]
    pub canvases: Vec<Canvas>,
}

/// One viewable page of a manifest.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Canvas {
    #[serde(rename = "@id", alias = "id", default)]
    pub id: Option<String>,
    #[serde(default)]
    pub label: Value,
    #[serde(default)]
    pub metadata: Vec<MetadataEntry>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct MetadataEntry {
    #[serde(default)]
    pub label: Value,
    #[serde(default)]
    pub value: Value,
}

impl Canvas {
    /// Canvas with a plain string label, no metadata.
    pub fn labelled(label: &str) -> Self {
        Self {
            id: None,
            label: Value::String(label.to_string()),
            metadata: Vec::new(),
        }
    }

    pub fn with_metadata(mut self, label: &str, value: &str) -> Self {
        self.metadata.push(MetadataEntry {
            label: Value::String(label.to_string()),
            value: Value::String(value.to_string()),
        });
        self
    }

    /// Every string in the label.
    pub fn label_texts(&self) -> Vec<&str> {
        text_values(&self.label)
    }

    /// Every string in every metadata value.
    pub fn metadata_texts(&self) -> Vec<&str> {
        self.metadata.iter().flat_map(|m| text_values(&m.value)).collect()
    }
}

impl Manifest {
    /// Parse a manifest from JSON text.
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json)
            .map_err(|e| SferaError::parse("<manifest>", format!("invalid IIIF manifest: {e}")))
    }

    /// Read a manifest from a local file.
    pub fn from_path(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| SferaError::io(path, e))?;
        serde_json::from_str(&content)
            .map_err(|e| SferaError::parse(path, format!("invalid IIIF manifest: {e}")))
    }

    /// Canvases of the first sequence, or the 3.x `items`.
    pub fn canvases(&self) -> &[Canvas] {
        match self.sequences.first() {
            Some(sequence) => &sequence.canvases,
            None => &self.items,
        }
    }
}

/// Flatten a IIIF label/value into its strings.
pub fn text_values(value: &Value) -> Vec<&str> {
    let mut out = Vec::new();
    collect_text(value, &mut out);
    out
}

fn collect_text<'a>(value: &'a Value, out: &mut Vec<&'a str>) {
    match value {
        Value::String(s) => out.push(s),
        Value::Array(items) => items.iter().for_each(|v| collect_text(v, out)),
        Value::Object(map) => match map.get("@value") {
            Some(inner) => collect_text(inner, out),
            // language map: {"en": ["..."], "it": ["..."]}
            None => map.values().for_each(|v| collect_text(v, out)),
        },
        Value::Number(_) | Value::Bool(_) | Value::Null => {}
    }
}

/// Fetch and parse a manifest over HTTP.
#[instrument(skip_all, fields(url = %url))]
pub async fn fetch_manifest(url: &Url, timeout_secs: u64) -> Result<Manifest> {
    let client = Client::builder()
        .user_agent(USER_AGENT)
        .timeout(Duration::from_secs(timeout_secs))
        .build()
        .map_err(|e| SferaError::Network(format!("failed to build HTTP client: {e}")))?;

    let response = client
        .get(url.as_str())
        .send()
        .await
        .map_err(|e| SferaError::Network(format!("{url}: {e}")))?;

    let status = response.status();
    if !status.is_success() {
        return Err(SferaError::Network(format!("{url}: HTTP {status}")));
    }

    let body = response
        .text()
        .await
        .map_err(|e| SferaError::Network(format!("{url}: failed to read body: {e}")))?;
    debug!(bytes = body.len(), "manifest downloaded");

    let manifest: Manifest = serde_json::from_str(&body)
        .map_err(|e| SferaError::parse(url.as_str(), format!("invalid IIIF manifest: {e}")))?;

    info!(canvases = manifest.canvases().len(), "manifest loaded");
    Ok(manifest)
}
