use core_types::Millis;
use dom::NodeKey;
use std::sync::mpsc::{self, Receiver, Sender, TryRecvError};

/// Everything the host page tells the reconciliation engine.
///
/// DOM mutations themselves are not events: they are queued on the
/// document's observers and drained when a `Tick` arrives.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum HostEvent {
    /// A scheduling turn. Drains mutation records, flushes the pending rows,
    /// fires due timers and runs the periodic sweep when it is due.
    Tick { now: Millis },
    /// Viewport intersection changed for a rendered row.
    Visibility { row: NodeKey, visible: bool },
    /// The page became visible again after being hidden.
    DocumentVisible,
    /// The window regained focus.
    WindowFocused,
    /// The host's active-channel state changed.
    ActiveChannelChanged { channel: Option<String> },
}

/// In-thread event channel between the host and one engine instance.
pub struct Bus {
    pub evt_tx: Sender<HostEvent>,
    pub evt_rx: Receiver<HostEvent>,
}

impl Bus {
    pub fn new() -> Self {
        let (evt_tx, evt_rx) = mpsc::channel();
        Self { evt_tx, evt_rx }
    }

    /// A handle the host keeps for publishing events.
    pub fn sender(&self) -> Sender<HostEvent> {
        self.evt_tx.clone()
    }

    /// Drain everything published so far without blocking.
    pub fn drain(&self) -> Vec<HostEvent> {
        let mut out = Vec::new();
        loop {
            match self.evt_rx.try_recv() {
                Ok(evt) => out.push(evt),
                Err(TryRecvError::Empty) | Err(TryRecvError::Disconnected) => break,
            }
        }
        out
    }
}

impl Default for Bus {
    fn default() -> Self {
        Self::new()
    }
}
