//! Annotated stanza text.
//!
//! The stanza text is kept as plain text plus a list of non-overlapping
//! annotated spans. Ranges are in character offsets, the unit a reader's
//! selection reports. [`AnnotatedText::to_html`] renders the markup the page
//! shows: each span becomes
//! `<span class="annotated-text" data-annotation-id=.. data-annotation=.. data-annotation-type=..>`.

use std::fmt::Write as _;
use std::ops::Range;

use lasfera_shared::{Result, SferaError};

use crate::model::{AnnotationId, AnnotationType};

/// One annotated region of the text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnnotatedSpan {
    pub range: Range<usize>,
    pub id: AnnotationId,
    pub body: String,
    pub kind: AnnotationType,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AnnotatedText {
    text: String,
    /// Sorted by start, never overlapping.
    spans: Vec<AnnotatedSpan>,
}

impl AnnotatedText {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            spans: Vec::new(),
        }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn spans(&self) -> &[AnnotatedSpan] {
        &self.spans
    }

    pub fn char_len(&self) -> usize {
        self.text.chars().count()
    }

    /// Text covered by a character range.
    pub fn slice(&self, range: Range<usize>) -> Result<String> {
        self.check_range(&range)?;
        Ok(self
            .text
            .chars()
            .skip(range.start)
            .take(range.end - range.start)
            .collect())
    }

    /// Ensure `range` is a non-empty, in-bounds selection clear of existing spans.
    pub fn check_selection(&self, range: &Range<usize>) -> Result<()> {
        self.check_range(range)?;
        if let Some(span) = self.spans.iter().find(|s| overlaps(&s.range, range)) {
            return Err(SferaError::user_input(format!(
                "Selection overlaps annotation {}",
                span.id
            )));
        }
        Ok(())
    }

    fn check_range(&self, range: &Range<usize>) -> Result<()> {
        if range.start >= range.end {
            return Err(SferaError::user_input("Please select some text to annotate"));
        }
        let len = self.char_len();
        if range.end > len {
            return Err(SferaError::user_input(format!(
                "Selection {}..{} is outside the text (length {len})",
                range.start, range.end
            )));
        }
        Ok(())
    }

    /// Wrap `range` in an annotation span.
    pub fn splice(
        &mut self,
        range: Range<usize>,
        id: AnnotationId,
        body: impl Into<String>,
        kind: AnnotationType,
    ) -> Result<()> {
        self.check_selection(&range)?;
        let at = self.spans.partition_point(|s| s.range.start < range.start);
        self.spans.insert(
            at,
            AnnotatedSpan {
                range,
                id,
                body: body.into(),
                kind,
            },
        );
        Ok(())
    }

    /// Character range of the first occurrence of `needle`.
    pub fn find(&self, needle: &str) -> Option<Range<usize>> {
        if needle.is_empty() {
            return None;
        }
        let byte_start = self.text.find(needle)?;
        let start = self.text[..byte_start].chars().count();
        Some(start..start + needle.chars().count())
    }

    /// Render the text with annotation spans, HTML-escaped.
    pub fn to_html(&self) -> String {
        let chars: Vec<char> = self.text.chars().collect();
        let mut out = String::with_capacity(self.text.len());
        let mut pos = 0;

        for span in &self.spans {
            push_escaped(&mut out, chars[pos..span.range.start].iter().copied());
            let _ = write!(
                out,
                r#"<span class="annotated-text" data-annotation-id="{}" data-annotation="{}" data-annotation-type="{}">"#,
                escape_html(span.id.as_str()),
                escape_html(&span.body),
                span.kind,
            );
            push_escaped(&mut out, chars[span.range.clone()].iter().copied());
            out.push_str("</span>");
            pos = span.range.end;
        }
        push_escaped(&mut out, chars[pos..].iter().copied());

        out
    }
}

pub(crate) fn overlaps(a: &Range<usize>, b: &Range<usize>) -> bool {
    a.start < b.end && b.start < a.end
}

pub(crate) fn escape_html(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    push_escaped(&mut out, s.chars());
    out
}

fn push_escaped(out: &mut String, chars: impl Iterator<Item = char>) {
    for c in chars {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            c => out.push(c),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const LINE: &str = "Al nome di colui che 'l mondo cria";

    fn id(s: &str) -> AnnotationId {
        AnnotationId::new(s)
    }

    #[test]
    fn splice_wraps_selection() {
        let mut doc = AnnotatedText::new("la sfera del mondo");
        doc.splice(3..8, id("1"), "sphere", AnnotationType::Translation)
            .unwrap();

        assert_eq!(
            doc.to_html(),
            r#"la <span class="annotated-text" data-annotation-id="1" data-annotation="sphere" data-annotation-type="translation">sfera</span> del mondo"#
        );
    }

    #[test]
    fn spans_render_in_text_order() {
        let mut doc = AnnotatedText::new("abcdef");
        doc.splice(4..6, id("b"), "second", AnnotationType::Note).unwrap();
        doc.splice(0..2, id("a"), "first", AnnotationType::Note).unwrap();

        let html = doc.to_html();
        assert!(html.find("first").unwrap() < html.find("second").unwrap());
        assert!(html.contains("</span>cd<span"));
    }

    #[test]
    fn rejects_empty_out_of_bounds_and_overlapping() {
        let mut doc = AnnotatedText::new("abcdef");
        assert!(doc.splice(2..2, id("x"), "n", AnnotationType::Note).is_err());
        assert!(doc.splice(4..9, id("x"), "n", AnnotationType::Note).is_err());

        doc.splice(1..4, id("a"), "n", AnnotationType::Note).unwrap();
        let err = doc
            .splice(3..5, id("b"), "n", AnnotationType::Note)
            .unwrap_err();
        assert!(matches!(err, SferaError::UserInput(_)));
        // Adjacent is fine.
        doc.splice(4..5, id("c"), "n", AnnotationType::Note).unwrap();
        assert_eq!(doc.spans().len(), 2);
    }

    #[test]
    fn escapes_text_and_attributes() {
        let mut doc = AnnotatedText::new("a <b> & c");
        doc.splice(0..1, id("1"), r#"say "hi" & <go>"#, AnnotationType::Note)
            .unwrap();
        let html = doc.to_html();
        assert!(html.contains(r#"data-annotation="say &quot;hi&quot; &amp; &lt;go&gt;""#));
        assert!(html.ends_with(" &lt;b&gt; &amp; c"));
    }

    #[test]
    fn find_uses_character_offsets() {
        let doc = AnnotatedText::new("perché la sfera");
        assert_eq!(doc.find("sfera"), Some(10..15));
        assert_eq!(doc.slice(10..15).unwrap(), "sfera");
        assert_eq!(doc.find("luna"), None);
        assert_eq!(doc.find(""), None);
    }

    #[test]
    fn find_returns_first_occurrence() {
        let doc = AnnotatedText::new(LINE);
        assert_eq!(doc.find("o"), Some(4..5));
    }
}
