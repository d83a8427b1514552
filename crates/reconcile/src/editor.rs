//! Surgical prefix removal.
//!
//! The content element of a row is host-owned: it may hold link preview
//! widgets, toggle buttons and color spans with listeners attached. Stripping
//! a relay prefix therefore edits text nodes in place and only removes nodes
//! the prefix fully consumed.
//!
//! Lengths are counted in characters with zero-width characters ignored, the
//! same units the classifier reports prefixes in.

use crate::schema::HostSchema;
use classify::text::{cleaned_len, offset_after_visible, strip_zero_width};
use dom::{Document, DomError, NodeKey};
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum StripError {
    /// The live text no longer starts with the prefix, typically because
    /// the host re-rendered the row after it was classified.
    #[error("content does not start with {expected:?} (found {found:?})")]
    PrefixMismatch { expected: String, found: String },
    #[error(transparent)]
    Dom(#[from] DomError),
}

/// Remove `prefix` from the front of the text under `root`.
///
/// Nothing is mutated unless the (cleaned) text starts with `prefix`.
pub fn strip_prefix(
    doc: &mut Document,
    root: NodeKey,
    prefix: &str,
    schema: &HostSchema,
) -> Result<(), StripError> {
    let wanted = prefix.chars().count();
    if wanted == 0 {
        return Ok(());
    }

    // Collect just enough text nodes to cover the prefix.
    let mut span = Vec::new();
    let mut accumulated = String::new();
    let mut visible = 0;
    for node in doc.text_nodes(root) {
        let text = doc.text(node).unwrap_or("");
        accumulated.push_str(text);
        visible += cleaned_len(text);
        span.push(node);
        if visible >= wanted {
            break;
        }
    }

    let cleaned = strip_zero_width(&accumulated);
    if !cleaned.starts_with(prefix) {
        return Err(StripError::PrefixMismatch {
            expected: prefix.to_string(),
            found: cleaned.chars().take(wanted + 10).collect(),
        });
    }

    let mut remaining = wanted;
    let mut emptied = Vec::new();
    for node in span {
        if remaining == 0 {
            break;
        }
        let text = doc.text(node).unwrap_or("").to_string();
        let here = cleaned_len(&text);
        if here <= remaining {
            doc.set_text(node, "")?;
            emptied.push(node);
            remaining -= here;
        } else {
            let cut = offset_after_visible(&text, remaining);
            doc.set_text(node, &text[cut..])?;
            remaining = 0;
        }
    }

    prune_emptied(doc, root, &emptied, schema)?;
    log::trace!(target: "reconcile.editor", "stripped {wanted} chars from {root:?}");
    Ok(())
}

/// Remove text nodes emptied by a strip, then any wrapper elements between
/// them and `root` that became empty as a result. `root` itself and
/// protected elements stay.
fn prune_emptied(
    doc: &mut Document,
    root: NodeKey,
    emptied: &[NodeKey],
    schema: &HostSchema,
) -> Result<(), DomError> {
    for &node in emptied {
        let mut parent = doc.parent(node);
        doc.remove(node)?;
        while let Some(p) = parent {
            if p == root || !doc.children(p).is_empty() || schema.is_protected(doc, p) {
                break;
            }
            parent = doc.parent(p);
            doc.remove(p)?;
        }
    }
    Ok(())
}
