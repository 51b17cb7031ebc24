//! Annotation sidebar.
//!
//! Two ways in: an annotated span is fetched by id through the annotation
//! API ([`Sidebar::open`]), while an inline notation carries its text with it
//! and is shown as-is ([`Sidebar::show_notation`]).

use tracing::warn;

use crate::client::AnnotationClient;
use crate::document::escape_html;
use crate::model::{AnnotationDetail, AnnotationId, AnnotationType};

pub const LOADING_TEXT: &str = "Loading annotation...";
pub const FAILED_TEXT: &str = "Failed to load annotation. Please try again.";

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum SidebarState {
    #[default]
    Hidden,
    Loading(AnnotationId),
    Showing {
        kind: AnnotationType,
        body: String,
    },
    Failed,
    /// Inline notation text, shown without a fetch.
    Notation(String),
}

/// Where a click landed, relative to the sidebar.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClickTarget {
    Sidebar,
    AnnotatedText,
    Elsewhere,
}

#[derive(Debug, Clone, Default)]
pub struct Sidebar {
    state: SidebarState,
}

impl Sidebar {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &SidebarState {
        &self.state
    }

    pub fn is_active(&self) -> bool {
        self.state != SidebarState::Hidden
    }

    pub fn open_loading(&mut self, id: AnnotationId) {
        self.state = SidebarState::Loading(id);
    }

    /// Show a fetched annotation. A response for an annotation other than the
    /// one being loaded is ignored.
    pub fn show(&mut self, id: &AnnotationId, detail: AnnotationDetail) {
        if self.state != SidebarState::Loading(id.clone()) {
            return;
        }
        self.state = SidebarState::Showing {
            kind: detail.annotation_type,
            body: detail.annotation.unwrap_or_default(),
        };
    }

    /// Show an element's inline notation. Replaces whatever was showing,
    /// including a load in progress.
    pub fn show_notation(&mut self, text: impl Into<String>) {
        self.state = SidebarState::Notation(text.into());
    }

    pub fn fail(&mut self, id: &AnnotationId) {
        if self.state == SidebarState::Loading(id.clone()) {
            self.state = SidebarState::Failed;
        }
    }

    pub fn close(&mut self) {
        self.state = SidebarState::Hidden;
    }

    pub fn click(&mut self, target: ClickTarget) {
        if target == ClickTarget::Elsewhere {
            self.close();
        }
    }

    /// Load and show an annotation.
    pub async fn open(&mut self, client: &AnnotationClient, id: AnnotationId) {
        self.open_loading(id.clone());
        match client.get(&id).await {
            Ok(detail) => self.show(&id, detail),
            Err(e) => {
                warn!(id = %id, "error loading annotation: {e}");
                self.fail(&id);
            }
        }
    }

    /// HTML fragment for the sidebar content. Empty when hidden.
    pub fn render(&self) -> String {
        match &self.state {
            SidebarState::Hidden => String::new(),
            SidebarState::Loading(_) => format!(r#"<div class="loading">{LOADING_TEXT}</div>"#),
            SidebarState::Showing { kind, body } => format!(
                r#"<div class="annotation-type">{}</div><div class="annotation-content">{}</div>"#,
                kind.label(),
                escape_html(body)
            ),
            SidebarState::Failed => format!(r#"<div class="error">{FAILED_TEXT}</div>"#),
            SidebarState::Notation(text) => {
                format!(r#"<div class="notation-text">{}</div>"#, escape_html(text))
            }
        }
    }
}
