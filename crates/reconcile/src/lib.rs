//! # reconcile
//!
//! Keeps a live chat document's bridged messages rewritten as if their real
//! authors had sent them, while the host keeps re-rendering it.
//!
//! Data flow for one row:
//!
//! ```text
//! mutation / visibility / sweep
//!   -> Coordinator queue -> SignatureTracker gate -> RowProcessor
//!   -> Classifier -> editor::strip_prefix -> Document
//! ```
//!
//! Everything runs inside [`Coordinator::handle`] on the host's thread.

pub mod config;
pub mod coordinator;
pub mod directory;
pub mod editor;
pub mod processor;
pub mod schema;
pub mod signature;
pub mod timers;

pub use config::EngineConfig;
pub use coordinator::{AttachState, Coordinator, CoordinatorStats};
pub use directory::{DirectoryError, LoungeDirectory, UserDirectory};
pub use editor::{StripError, strip_prefix};
pub use processor::{ContentEdit, RowOutcome, RowProcessor};
pub use schema::HostSchema;
pub use signature::{Fingerprint, RowKey, SignatureTracker};
pub use timers::{ColorRetry, RetryQueue};
