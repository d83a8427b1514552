//! Observation strategy.
//!
//! The coordinator owns the engine's lifecycle against one document: it
//! finds the chat root (and finds it again after the host tears it down),
//! turns mutation records and visibility changes into a de-duplicated queue
//! of candidate rows, and flushes that queue once per host tick. A periodic
//! sweep and a handful of external triggers cover whatever observation
//! missed.
//!
//! ```text
//! Unattached{watcher on body} --root found--> Attached{observer on root}
//!          ^                                          |
//!          +------------- root disconnected ----------+
//! ```

use crate::config::EngineConfig;
use crate::directory::UserDirectory;
use crate::processor::{RowOutcome, RowProcessor};
use crate::schema::HostSchema;
use crate::signature::SignatureTracker;
use bus::HostEvent;
use classify::Classifier;
use core_types::Millis;
use dom::{Document, MutationRecord, NodeKey, ObserveOptions, ObserverId};
use std::collections::HashSet;
use std::rc::Rc;

enum Attachment {
    Unattached { watcher: ObserverId },
    Attached { root: NodeKey, observer: ObserverId },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AttachState {
    Unattached,
    Attached(NodeKey),
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct CoordinatorStats {
    /// Rows that went through the processor.
    pub processed: u64,
    /// Rows the tracker gate let pass without processing.
    pub skipped: u64,
    pub rewritten: u64,
    pub sweeps: u64,
    pub attaches: u64,
    pub row_errors: u64,
}

pub struct Coordinator {
    processor: RowProcessor,
    tracker: SignatureTracker,
    schema: HostSchema,
    attachment: Attachment,
    pending: Vec<NodeKey>,
    queued: HashSet<NodeKey>,
    visible: HashSet<NodeKey>,
    now: Millis,
    next_sweep: Millis,
    needs_attach: bool,
    stats: CoordinatorStats,
}

impl Coordinator {
    pub fn new(doc: &mut Document, classifier: Rc<Classifier>, config: EngineConfig) -> Self {
        Self::with_schema(doc, classifier, config, HostSchema::THELOUNGE)
    }

    pub fn with_schema(
        doc: &mut Document,
        classifier: Rc<Classifier>,
        config: EngineConfig,
        schema: HostSchema,
    ) -> Self {
        let watcher = doc.observe(doc.body(), ObserveOptions::structure());
        Self {
            processor: RowProcessor::new(classifier, config, schema),
            tracker: SignatureTracker::new(schema),
            schema,
            attachment: Attachment::Unattached { watcher },
            pending: Vec::new(),
            queued: HashSet::new(),
            visible: HashSet::new(),
            now: Millis::ZERO,
            next_sweep: Millis::ZERO,
            needs_attach: true,
            stats: CoordinatorStats::default(),
        }
    }

    pub fn state(&self) -> AttachState {
        match self.attachment {
            Attachment::Unattached { .. } => AttachState::Unattached,
            Attachment::Attached { root, .. } => AttachState::Attached(root),
        }
    }

    pub fn stats(&self) -> CoordinatorStats {
        self.stats
    }

    pub fn processor(&self) -> &RowProcessor {
        &self.processor
    }

    pub fn tracked_rows(&self) -> usize {
        self.tracker.len()
    }

    pub fn visible_rows(&self) -> usize {
        self.visible.len()
    }

    pub fn handle(&mut self, doc: &mut Document, directory: &mut dyn UserDirectory, event: HostEvent) {
        match event {
            HostEvent::Tick { now } => {
                self.now = self.now.max(now);
                self.pump(doc, directory);
            }
            HostEvent::Visibility { row, visible } => {
                if !visible {
                    self.visible.remove(&row);
                    return;
                }
                if !doc.is_connected(row) || !self.schema.is_row(doc, row) {
                    return;
                }
                if self.visible.insert(row) {
                    self.process_if_needed(doc, directory, row);
                }
            }
            HostEvent::DocumentVisible | HostEvent::WindowFocused => {
                self.reattach(doc, directory, false);
            }
            HostEvent::ActiveChannelChanged { channel } => {
                log::debug!(target: "reconcile.coordinator", "active channel is now {channel:?}");
                self.reattach(doc, directory, true);
            }
        }
    }

    /// One scheduling turn.
    fn pump(&mut self, doc: &mut Document, directory: &mut dyn UserDirectory) {
        self.check_attachment(doc, directory);

        if let Attachment::Attached { observer, .. } = self.attachment {
            for record in doc.take_records(observer) {
                self.enqueue_record(doc, &record);
            }
        }
        self.flush(doc, directory);

        self.processor.fire_due(doc, directory, self.now);

        if self.now >= self.next_sweep {
            self.next_sweep = self.now + self.processor.config().sweep_interval_ms;
            if matches!(self.attachment, Attachment::Attached { .. }) {
                self.sweep(doc, directory, false);
            }
        }
    }

    fn check_attachment(&mut self, doc: &mut Document, directory: &mut dyn UserDirectory) {
        match self.attachment {
            Attachment::Attached { root, observer } => {
                if doc.is_connected(root) {
                    return;
                }
                log::debug!(target: "reconcile.coordinator", "chat root {root:?} disconnected");
                doc.disconnect(observer);
                let watcher = doc.observe(doc.body(), ObserveOptions::structure());
                self.attachment = Attachment::Unattached { watcher };
                self.pending.clear();
                self.queued.clear();
                self.try_attach(doc, directory);
            }
            Attachment::Unattached { watcher } => {
                let seen = !doc.take_records(watcher).is_empty();
                if seen || self.needs_attach {
                    self.try_attach(doc, directory);
                }
            }
        }
    }

    fn try_attach(&mut self, doc: &mut Document, directory: &mut dyn UserDirectory) -> bool {
        let Attachment::Unattached { watcher } = self.attachment else {
            return true;
        };
        let Some(root) = self.schema.chat_root(doc) else {
            log::trace!(target: "reconcile.coordinator", "chat root not rendered yet");
            self.needs_attach = false;
            return false;
        };

        doc.disconnect(watcher);
        self.needs_attach = false;
        self.stats.attaches += 1;
        log::debug!(target: "reconcile.coordinator", "attaching to chat root {root:?}");

        self.sweep_under(doc, directory, root);
        let observer = doc.observe(root, ObserveOptions::everything());
        self.attachment = Attachment::Attached { root, observer };
        true
    }

    /// Re-run attachment; `force_sweep` also re-sweeps every row under an
    /// already attached root.
    fn reattach(&mut self, doc: &mut Document, directory: &mut dyn UserDirectory, force_sweep: bool) {
        match self.attachment {
            Attachment::Attached { root, .. } if doc.is_connected(root) => {
                if force_sweep {
                    self.sweep(doc, directory, true);
                }
            }
            _ => {
                self.needs_attach = true;
                self.check_attachment(doc, directory);
            }
        }
    }

    fn enqueue_record(&mut self, doc: &Document, record: &MutationRecord) {
        if let MutationRecord::ChildList { added, .. } = record {
            for &node in added {
                if doc.is_connected(node) && doc.is_element(node) {
                    for row in self.schema.rows_in(doc, node) {
                        self.enqueue(row);
                    }
                }
            }
        }
        let target = record.target();
        if doc.contains(target)
            && let Some(row) = self.schema.row_of(doc, target)
        {
            self.enqueue(row);
        }
    }

    fn enqueue(&mut self, row: NodeKey) {
        if self.queued.insert(row) {
            self.pending.push(row);
        }
    }

    fn flush(&mut self, doc: &mut Document, directory: &mut dyn UserDirectory) {
        let pending = std::mem::take(&mut self.pending);
        self.queued.clear();
        if pending.is_empty() {
            return;
        }
        log::trace!(target: "reconcile.coordinator", "flushing {} rows", pending.len());
        for row in pending {
            if doc.is_connected(row) {
                self.process_if_needed(doc, directory, row);
            }
        }
    }

    /// Periodic safety net: visible rows when any are tracked, otherwise
    /// every row under the root.
    fn sweep(&mut self, doc: &mut Document, directory: &mut dyn UserDirectory, full: bool) {
        let Attachment::Attached { root, .. } = self.attachment else {
            return;
        };
        self.prune(doc);
        if !full && !self.visible.is_empty() {
            let mut rows: Vec<NodeKey> = self.visible.iter().copied().collect();
            rows.sort();
            self.stats.sweeps += 1;
            for row in rows {
                self.process_if_needed(doc, directory, row);
            }
            return;
        }
        self.sweep_under(doc, directory, root);
    }

    fn sweep_under(&mut self, doc: &mut Document, directory: &mut dyn UserDirectory, root: NodeKey) {
        self.stats.sweeps += 1;
        for row in self.schema.rows_in(doc, root) {
            self.process_if_needed(doc, directory, row);
        }
    }

    fn prune(&mut self, doc: &Document) {
        let dropped = self.tracker.prune(doc);
        self.visible.retain(|row| doc.is_connected(*row));
        self.processor.prune(doc);
        if dropped > 0 {
            log::trace!(target: "reconcile.coordinator", "pruned {dropped} dead rows");
        }
    }

    /// Tracker gate, processor, record. A failing row is logged and skipped.
    fn process_if_needed(&mut self, doc: &mut Document, directory: &mut dyn UserDirectory, row: NodeKey) {
        if !self.tracker.should_process(doc, row) {
            self.stats.skipped += 1;
            return;
        }
        self.stats.processed += 1;
        match self.processor.process(doc, row, directory, self.now) {
            Ok(outcome) => {
                if matches!(outcome, RowOutcome::Rewritten { .. }) {
                    self.stats.rewritten += 1;
                }
                self.tracker.record_processed(doc, row);
            }
            Err(err) => {
                self.stats.row_errors += 1;
                log::warn!(target: "reconcile.coordinator", "row {row:?} failed: {err}");
            }
        }
    }
}
