//! Stanza annotation editor.
//!
//! Saving an annotation is split in two phases so callers driving their own
//! event loop can keep the editor responsive while the request is in flight:
//! [`AnnotationEditor::begin_save`] validates the selection and reserves its
//! range, [`AnnotationEditor::finish_save`] applies the server's answer.
//! [`AnnotationEditor::annotate`] runs both around a client call.
//!
//! While a save is in flight its range stays reserved: stored annotations
//! that would land on it are skipped, so the server's answer can always be
//! spliced in.

use std::ops::Range;
use std::sync::atomic::{AtomicU64, Ordering};

use tracing::{debug, error, info, instrument, warn};

use lasfera_shared::{Result, SferaError};

use crate::client::AnnotationClient;
use crate::document::{AnnotatedText, overlaps};
use crate::model::{AnnotationId, AnnotationType, NewAnnotation, StoredAnnotation};

static NEXT_SAVE_TOKEN: AtomicU64 = AtomicU64::new(1);

/// A validated save waiting for the server. Only the editor that issued it
/// accepts it back, once.
#[derive(Debug, PartialEq)]
pub struct PendingSave {
    token: u64,
    range: Range<usize>,
    request: NewAnnotation,
}

impl PendingSave {
    pub fn request(&self) -> &NewAnnotation {
        &self.request
    }
}

#[derive(Debug)]
pub struct AnnotationEditor {
    stanza_id: String,
    csrf_token: String,
    document: AnnotatedText,
    in_flight: Option<InFlight>,
}

#[derive(Debug)]
struct InFlight {
    token: u64,
    range: Range<usize>,
}

impl AnnotationEditor {
    pub fn new(
        stanza_id: impl Into<String>,
        csrf_token: impl Into<String>,
        document: AnnotatedText,
    ) -> Self {
        Self {
            stanza_id: stanza_id.into(),
            csrf_token: csrf_token.into(),
            document,
            in_flight: None,
        }
    }

    pub fn stanza_id(&self) -> &str {
        &self.stanza_id
    }

    pub fn document(&self) -> &AnnotatedText {
        &self.document
    }

    pub fn is_saving(&self) -> bool {
        self.in_flight.is_some()
    }

    /// Validate a selection and reserve it until [`Self::finish_save`].
    pub fn begin_save(
        &mut self,
        range: Range<usize>,
        body: &str,
        kind: AnnotationType,
    ) -> Result<PendingSave> {
        if self.in_flight.is_some() {
            return Err(SferaError::user_input("An annotation is already being saved"));
        }
        if self.csrf_token.trim().is_empty() {
            return Err(SferaError::user_input("Security token missing"));
        }
        self.document.check_selection(&range)?;

        let request = NewAnnotation {
            stanza_id: self.stanza_id.clone(),
            selected_text: self.document.slice(range.clone())?,
            annotation: body.to_string(),
            annotation_type: kind,
            from_pos: range.start,
            to_pos: range.end,
        };
        request.validate()?;

        let token = NEXT_SAVE_TOKEN.fetch_add(1, Ordering::Relaxed);
        self.in_flight = Some(InFlight {
            token,
            range: range.clone(),
        });
        Ok(PendingSave {
            token,
            range,
            request,
        })
    }

    /// Apply the outcome of a save. On error the document is left untouched.
    ///
    /// A `pending` this editor is not waiting for is rejected and the save in
    /// flight, if any, stays reserved.
    pub fn finish_save(
        &mut self,
        pending: PendingSave,
        outcome: Result<AnnotationId>,
    ) -> Result<AnnotationId> {
        if self.in_flight.as_ref().map(|f| f.token) != Some(pending.token) {
            warn!(stanza = %self.stanza_id, "save finished that was not in progress");
            return Err(SferaError::user_input("This annotation is not being saved"));
        }
        self.in_flight = None;
        let id = outcome
            .inspect_err(|e| error!(stanza = %self.stanza_id, "error saving annotation: {e}"))?;

        let PendingSave { range, request, .. } = pending;
        self.document
            .splice(range, id.clone(), request.annotation, request.annotation_type)?;
        info!(stanza = %self.stanza_id, id = %id, "annotation applied");
        Ok(id)
    }

    /// Save an annotation for `range` and splice it into the document.
    #[instrument(skip_all, fields(stanza = %self.stanza_id, from = range.start, to = range.end))]
    pub async fn annotate(
        &mut self,
        client: &AnnotationClient,
        range: Range<usize>,
        body: &str,
        kind: AnnotationType,
    ) -> Result<AnnotationId> {
        let pending = self.begin_save(range, body, kind)?;
        let outcome = client.create(pending.request(), &self.csrf_token).await;
        self.finish_save(pending, outcome)
    }

    /// Re-apply stored annotations at the first occurrence of their text.
    /// Returns how many were placed. Placements over a save in flight are
    /// skipped.
    pub fn apply_stored(&mut self, stored: &[StoredAnnotation]) -> usize {
        let mut applied = 0;
        for annotation in stored {
            let Some(range) = self.document.find(&annotation.selected_text) else {
                debug!(id = %annotation.id, "annotated text not found, skipping");
                continue;
            };
            if let Some(in_flight) = &self.in_flight {
                if overlaps(&in_flight.range, &range) {
                    debug!(id = %annotation.id, "text is being annotated, skipping");
                    continue;
                }
            }
            let body = annotation.annotation.clone().unwrap_or_default();
            match self.document.splice(
                range,
                annotation.id.clone(),
                body,
                annotation.annotation_type,
            ) {
                Ok(()) => applied += 1,
                Err(e) => debug!(id = %annotation.id, "cannot restore annotation: {e}"),
            }
        }
        applied
    }

    /// Fetch this stanza's annotations and re-apply them.
    #[instrument(skip_all, fields(stanza = %self.stanza_id))]
    pub async fn restore(&mut self, client: &AnnotationClient) -> Result<usize> {
        let stored = client.list(&self.stanza_id).await?;
        let applied = self.apply_stored(&stored);
        info!(applied, total = stored.len(), "annotations restored");
        Ok(applied)
    }
}
