//! Annotation domain types and the annotation API's wire shapes.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use lasfera_shared::{Result, SferaError};

// ---------------------------------------------------------------------------
// AnnotationType
// ---------------------------------------------------------------------------

/// Kind of textual annotation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AnnotationType {
    #[default]
    Note,
    Translation,
    Variant,
    Reference,
}

impl AnnotationType {
    pub const ALL: [AnnotationType; 4] = [
        AnnotationType::Note,
        AnnotationType::Translation,
        AnnotationType::Variant,
        AnnotationType::Reference,
    ];

    /// Wire value, as sent in `annotation_type`.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Note => "note",
            Self::Translation => "translation",
            Self::Variant => "variant",
            Self::Reference => "reference",
        }
    }

    /// Human label shown in the type picker.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Note => "Editorial Note",
            Self::Translation => "Translation",
            Self::Variant => "Textual Variant",
            Self::Reference => "Cross Reference",
        }
    }
}

impl std::fmt::Display for AnnotationType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for AnnotationType {
    type Err = SferaError;

    fn from_str(s: &str) -> Result<Self> {
        Self::ALL
            .into_iter()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| SferaError::user_input(format!("unknown annotation type '{s}'")))
    }
}

// ---------------------------------------------------------------------------
// AnnotationId
// ---------------------------------------------------------------------------

/// Server-assigned annotation identifier. The API returns integers; strings
/// are accepted too and kept verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "Value", into = "String")]
pub struct AnnotationId(String);

impl AnnotationId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for AnnotationId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<Value> for AnnotationId {
    type Error = String;

    fn try_from(value: Value) -> std::result::Result<Self, Self::Error> {
        match value {
            Value::Number(n) => Ok(Self(n.to_string())),
            Value::String(s) if !s.is_empty() => Ok(Self(s)),
            other => Err(format!("invalid annotation id: {other}")),
        }
    }
}

impl From<AnnotationId> for String {
    fn from(id: AnnotationId) -> Self {
        id.0
    }
}

// ---------------------------------------------------------------------------
// Requests and responses
// ---------------------------------------------------------------------------

/// Form payload for `POST /text-annotations/create/`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NewAnnotation {
    pub stanza_id: String,
    pub selected_text: String,
    pub annotation: String,
    pub annotation_type: AnnotationType,
    pub from_pos: usize,
    pub to_pos: usize,
}

impl NewAnnotation {
    /// Reject empty selections and blank annotation text.
    pub fn validate(&self) -> Result<()> {
        if self.from_pos >= self.to_pos || self.selected_text.is_empty() {
            return Err(SferaError::user_input("Please select some text to annotate"));
        }
        if self.annotation.trim().is_empty() {
            return Err(SferaError::user_input("Please enter an annotation"));
        }
        if self.stanza_id.trim().is_empty() {
            return Err(SferaError::user_input(
                "Could not determine which stanza to annotate",
            ));
        }
        Ok(())
    }
}

/// Body returned by the create endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateResponse {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub annotation_id: Option<AnnotationId>,
    #[serde(default)]
    pub error: Option<String>,
}

/// An annotation as listed for a stanza.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct StoredAnnotation {
    pub id: AnnotationId,
    pub selected_text: String,
    #[serde(default)]
    pub annotation: Option<String>,
    #[serde(default)]
    pub annotation_type: AnnotationType,
    #[serde(default)]
    pub from_pos: Option<Value>,
    #[serde(default)]
    pub to_pos: Option<Value>,
}

/// One annotation's content, as shown in the sidebar.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct AnnotationDetail {
    #[serde(default)]
    pub annotation_type: AnnotationType,
    #[serde(default)]
    pub annotation: Option<String>,
}
