//! Stanza text annotations: API client, annotated-text model, editor flow
//! and the sidebar that displays an annotation.

pub mod client;
pub mod document;
pub mod editor;
pub mod model;
pub mod sidebar;

pub use client::AnnotationClient;
pub use document::{AnnotatedSpan, AnnotatedText};
pub use editor::{AnnotationEditor, PendingSave};
pub use model::{
    AnnotationDetail, AnnotationId, AnnotationType, CreateResponse, NewAnnotation,
    StoredAnnotation,
};
pub use sidebar::{ClickTarget, Sidebar, SidebarState};
