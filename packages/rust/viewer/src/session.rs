//! Viewer session: the page controller's handle on the deep-zoom viewer.
//!
//! One session per page. It owns the loaded manifest, the viewer window id,
//! the current canvas and the scroll observer; the controller creates it,
//! feeds it scroll positions and folio changes, and tears it down on unload.

use tracing::{debug, info, instrument, warn};
use url::Url;

use lasfera_shared::Result;

use crate::folio::FolioMatcher;
use crate::manifest::{Manifest, fetch_manifest};
use crate::observer::{FolioDivider, FolioEvent, ScrollObserver};

/// A canvas change the viewer should apply.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CanvasCommand {
    pub window_id: String,
    pub canvas_index: usize,
    pub canvas_id: Option<String>,
}

#[derive(Debug)]
pub struct ViewerSession {
    manifest_url: String,
    manifest: Option<Manifest>,
    window_id: Option<String>,
    current_canvas: Option<usize>,
    observer: ScrollObserver,
}

impl ViewerSession {
    /// A session for `manifest_url`, not yet initialized.
    pub fn new(manifest_url: impl Into<String>) -> Self {
        Self {
            manifest_url: manifest_url.into(),
            manifest: None,
            window_id: None,
            current_canvas: None,
            observer: ScrollObserver::new(),
        }
    }

    /// Fetch the manifest and initialize in one step.
    #[instrument(skip_all, fields(url = %manifest_url))]
    pub async fn open(manifest_url: &Url, window_id: &str, timeout_secs: u64) -> Result<Self> {
        let manifest = fetch_manifest(manifest_url, timeout_secs).await?;
        let mut session = Self::new(manifest_url.as_str());
        session.initialize(manifest, window_id);
        Ok(session)
    }

    /// Attach the loaded manifest and the viewer window. Shows canvas 0.
    pub fn initialize(&mut self, manifest: Manifest, window_id: impl Into<String>) {
        let window_id = window_id.into();
        info!(
            manifest = %self.manifest_url,
            window = %window_id,
            canvases = manifest.canvases().len(),
            "viewer session initialized"
        );
        self.manifest = Some(manifest);
        self.window_id = Some(window_id);
        self.current_canvas = Some(0);
    }

    pub fn is_initialized(&self) -> bool {
        self.manifest.is_some() && self.window_id.is_some()
    }

    pub fn manifest_url(&self) -> &str {
        &self.manifest_url
    }

    pub fn current_canvas(&self) -> Option<usize> {
        self.current_canvas
    }

    /// Register the page's folio dividers with the scroll observer.
    pub fn observe_dividers(&mut self, dividers: impl IntoIterator<Item = FolioDivider>) {
        for divider in dividers {
            self.observer.observe(divider);
        }
        debug!(dividers = self.observer.observed_count(), "observing folio dividers");
    }

    /// Move the viewer to the canvas matching `folio`.
    ///
    /// Returns `None` without touching state when the session is not
    /// initialized, the folio is blank, or no canvas matches.
    pub fn navigate_to_folio(&mut self, folio: &str) -> Option<CanvasCommand> {
        let (Some(manifest), Some(window_id)) = (&self.manifest, &self.window_id) else {
            debug!(folio, "cannot navigate: viewer not initialized");
            return None;
        };

        let matcher = FolioMatcher::new(folio)?;
        let canvases = manifest.canvases();
        let Some(index) = matcher.find_canvas(canvases) else {
            let sample: Vec<_> = canvases.iter().take(5).map(|c| c.label_texts()).collect();
            debug!(folio, first_labels = ?sample, "no matching canvas for folio");
            return None;
        };

        let command = CanvasCommand {
            window_id: window_id.clone(),
            canvas_index: index,
            canvas_id: canvases[index].id.clone(),
        };
        self.current_canvas = Some(index);
        Some(command)
    }

    /// React to a folio scrolling into view.
    pub fn handle_folio_change(&mut self, folio: &str) -> Option<CanvasCommand> {
        if !self.is_initialized() {
            warn!(folio, "folio change before viewer initialized");
            return None;
        }
        self.navigate_to_folio(folio)
    }

    /// Feed a scroll position; returns the navigations it caused.
    pub fn on_scroll(&mut self, scroll_top: f64, viewport_height: f64) -> Vec<CanvasCommand> {
        let events = self.observer.update(scroll_top, viewport_height);
        events
            .into_iter()
            .filter_map(|event| match event {
                FolioEvent::Entered(folio) => self.handle_folio_change(&folio),
                FolioEvent::Left(_) => None,
            })
            .collect()
    }

    /// Disconnect the observer and drop the manifest.
    pub fn teardown(&mut self) {
        self.observer.disconnect();
        self.manifest = None;
        self.window_id = None;
        self.current_canvas = None;
        debug!(manifest = %self.manifest_url, "viewer session torn down");
    }
}
