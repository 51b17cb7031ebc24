//! Line-code shape checks.
//!
//! Stanzas are sorted by comparing `line_code` strings byte-wise, which only
//! yields positional order when every code is dotted decimal with the same
//! zero-padded segment widths ("01.02.01" before "01.10.01"). This module
//! verifies that precondition over a whole collection.

use tracing::warn;

use lasfera_shared::{EntityKind, Result, SferaError};

/// Segment widths of a dotted-decimal code, or `None` if the code is not one.
///
/// `"01.10.001"` → `Some([2, 2, 3])`; `"1a.2"` → `None`.
pub fn segment_widths(code: &str) -> Option<Vec<usize>> {
    code.split('.')
        .map(|segment| {
            if !segment.is_empty() && segment.bytes().all(|b| b.is_ascii_digit()) {
                Some(segment.len())
            } else {
                None
            }
        })
        .collect()
}

/// Check that every `(record key, line_code)` pair is dotted decimal and
/// shares the shape of the first one.
///
/// With `strict` a violation is a [`SferaError::Validation`]; otherwise it is
/// logged and the check passes.
pub fn check_line_codes<'a>(
    kind: EntityKind,
    codes: impl IntoIterator<Item = (&'a str, &'a str)>,
    strict: bool,
) -> Result<()> {
    match find_violation(kind, codes) {
        None => Ok(()),
        Some(message) if strict => Err(SferaError::validation(message)),
        Some(message) => {
            warn!(entity = %kind, %message, "line codes are not uniformly padded, sort order may be wrong");
            Ok(())
        }
    }
}

fn find_violation<'a>(
    kind: EntityKind,
    codes: impl IntoIterator<Item = (&'a str, &'a str)>,
) -> Option<String> {
    let mut reference: Option<(&str, &str, Vec<usize>)> = None;

    for (key, code) in codes {
        let Some(widths) = segment_widths(code) else {
            return Some(format!(
                "{kind} record '{key}': line_code '{code}' is not dotted decimal"
            ));
        };

        if let Some((ref_key, ref_code, ref_widths)) = &reference {
            if *ref_widths != widths {
                return Some(format!(
                    "{kind} record '{key}': line_code '{code}' does not match the padding of '{ref_code}' (record '{ref_key}')"
                ));
            }
            continue;
        }
        reference = Some((key, code, widths));
    }

    None
}
