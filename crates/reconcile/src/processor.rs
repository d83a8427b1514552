//! One row, start to finish: classify, rename, recolor, strip, mark.
//!
//! Every edit stays inside the row's subtree. The only state outside the
//! document is the retry queue and the set of rows already warned about.

use crate::config::EngineConfig;
use crate::directory::UserDirectory;
use crate::editor::{StripError, strip_prefix};
use crate::schema::HostSchema;
use crate::signature::{RowKey, row_fingerprint};
use crate::timers::RetryQueue;
use classify::Classifier;
use core_types::Millis;
use dom::{Document, DomError, NodeKey};
use std::collections::HashMap;
use std::rc::Rc;

/// Row attribute holding the post-processing fingerprint in hex.
pub const PROCESSED_ATTR: &str = "data-sb-processed";
pub const NAME_ATTR: &str = "data-name";
pub const BRIDGED_ATTR: &str = "data-bridged";
pub const BRIDGED_CHANNEL_ATTR: &str = "data-bridged-channel";
const HIDDEN_STYLE: &str = "display: none;";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ContentEdit {
    /// The classification asked for no strip.
    Untouched,
    Stripped,
    /// The live text no longer carried the prefix; content left alone.
    Mismatch,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RowOutcome {
    Hidden,
    Unrecognized,
    AlreadyProcessed,
    NotBridged,
    Rewritten { content: ContentEdit },
}

pub struct RowProcessor {
    classifier: Rc<Classifier>,
    config: EngineConfig,
    schema: HostSchema,
    retries: RetryQueue,
    warned: HashMap<RowKey, NodeKey>,
}

impl RowProcessor {
    pub fn new(classifier: Rc<Classifier>, config: EngineConfig, schema: HostSchema) -> Self {
        Self {
            classifier,
            config,
            schema,
            retries: RetryQueue::new(),
            warned: HashMap::new(),
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn process(
        &mut self,
        doc: &mut Document,
        row: NodeKey,
        directory: &mut dyn UserDirectory,
        now: Millis,
    ) -> Result<RowOutcome, DomError> {
        let schema = self.schema;

        if self.config.remove_join_quit && schema.row_type(doc, row).is_join_quit() {
            if doc.attr(row, "style") != Some(HIDDEN_STYLE) {
                doc.set_attribute(row, "style", HIDDEN_STYLE)?;
            }
            mark_processed(doc, &schema, row)?;
            return Ok(RowOutcome::Hidden);
        }

        let (Some(sender), Some(content)) = (schema.sender_of(doc, row), schema.content_of(doc, row))
        else {
            return Ok(RowOutcome::Unrecognized);
        };

        let current = row_fingerprint(doc, &schema, row).to_hex();
        if doc.attr(row, PROCESSED_ATTR) == Some(current.as_str()) {
            return Ok(RowOutcome::AlreadyProcessed);
        }

        let original = doc.text_content(sender);
        let channel = schema.channel_of(doc, row);
        let text = doc.text_content(content);
        let html = doc.inner_html(content);
        let Some(hit) = self
            .classifier
            .classify_with_markup(&text, &html, &original, &channel)
        else {
            return Ok(RowOutcome::NotBridged);
        };
        let name = hit.display_name.as_str();

        doc.set_attribute(sender, NAME_ATTR, name)?;
        doc.set_attribute(sender, BRIDGED_ATTR, &hit.tag)?;
        doc.set_attribute(sender, BRIDGED_CHANNEL_ATTR, &channel)?;

        if self.config.use_autocomplete
            && let Err(err) = directory.register(name, now)
        {
            log::warn!(target: "reconcile.processor", "autocomplete registration for {name:?} failed: {err}");
        }

        self.retries.cancel(row);
        if name != original {
            match directory.color_of(doc, name) {
                Some(color) => apply_color(doc, &schema, sender, &color)?,
                None => {
                    if !self.config.use_autocomplete
                        && let Err(err) = directory.register(name, now)
                    {
                        log::debug!(target: "reconcile.processor", "register before color retry failed: {err}");
                    }
                    let due = now + self.config.color_retry_ms;
                    self.retries.schedule(row, name, due);
                    log::trace!(target: "reconcile.processor", "color for {name:?} unknown, retry at {due:?}");
                }
            }
        }

        let label = self.config.label_for(name);
        if doc.text_content(sender) != label {
            doc.set_text_content(sender, &label)?;
        }

        let edit = match hit.strip_prefix.as_deref() {
            Some(prefix) if !prefix.is_empty() => match strip_prefix(doc, content, prefix, &schema) {
                Ok(()) => ContentEdit::Stripped,
                Err(StripError::PrefixMismatch { expected, found }) => {
                    let key = RowKey::of(doc, &schema, row);
                    if self.warned.insert(key, row).is_none() {
                        log::warn!(
                            target: "reconcile.processor",
                            "prefix removal failed for message from {name:?}: expected {expected:?}, found {found:?}"
                        );
                    }
                    ContentEdit::Mismatch
                }
                Err(StripError::Dom(err)) => return Err(err),
            },
            _ => ContentEdit::Untouched,
        };

        mark_processed(doc, &schema, row)?;
        Ok(RowOutcome::Rewritten { content: edit })
    }

    /// Run every color retry due at `now`. Retries whose row went away or
    /// was renamed since are dropped without a lookup.
    pub fn fire_due(&mut self, doc: &mut Document, directory: &dyn UserDirectory, now: Millis) -> usize {
        let mut applied = 0;
        for retry in self.retries.take_due(now) {
            if !doc.is_connected(retry.row) {
                continue;
            }
            let Some(sender) = self.schema.sender_of(doc, retry.row) else {
                continue;
            };
            if doc.attr(sender, NAME_ATTR) != Some(retry.name.as_str()) {
                continue;
            }
            let Some(color) = directory.color_of(doc, &retry.name) else {
                log::trace!(target: "reconcile.processor", "color for {:?} still unknown", retry.name);
                continue;
            };
            match apply_color(doc, &self.schema, sender, &color) {
                Ok(()) => applied += 1,
                Err(err) => log::warn!(target: "reconcile.processor", "color retry failed: {err}"),
            }
        }
        applied
    }

    /// Forget per-row state for nodes that no longer exist.
    pub fn prune(&mut self, doc: &Document) {
        self.retries.prune(doc);
        self.warned.retain(|_, node| doc.contains(*node));
    }

    pub fn pending_retries(&self) -> usize {
        self.retries.len()
    }

    /// Rows warned about so far.
    pub fn warnings(&self) -> usize {
        self.warned.len()
    }
}

fn mark_processed(doc: &mut Document, schema: &HostSchema, row: NodeKey) -> Result<(), DomError> {
    let hex = row_fingerprint(doc, schema, row).to_hex();
    if doc.attr(row, PROCESSED_ATTR) != Some(hex.as_str()) {
        doc.set_attribute(row, PROCESSED_ATTR, &hex)?;
    }
    Ok(())
}

/// Replace every `color-*` class on `el` with `color`.
pub fn apply_color(doc: &mut Document, schema: &HostSchema, el: NodeKey, color: &str) -> Result<(), DomError> {
    let mut classes: Vec<&str> = doc
        .classes(el)
        .filter(|c| !c.starts_with(schema.color_class_prefix))
        .collect();
    classes.push(color);
    let value = classes.join(" ");
    if doc.attr(el, "class") == Some(value.as_str()) {
        return Ok(());
    }
    doc.set_attribute(el, "class", &value)
}

#[cfg(test)]
mod tests;
