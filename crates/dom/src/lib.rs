//! # dom
//!
//! Arena-backed live document model shared by a host application and the
//! engines that observe and annotate it.
//!
//! - [`Document`]: the mutable tree, with browser-like structure, attribute
//!   and text operations, plus `inner_html` serialization.
//! - [`MutationRecord`] / [`ObserveOptions`]: MutationObserver-style record
//!   queues drained explicitly by their owner.
//! - [`El`]: declarative subtree builder for hosts and fixtures.
//! - [`DomSnapshot`]: deterministic rendering for tests.

pub mod builder;
mod document;
mod error;
mod markup;
mod observer;
pub mod snapshot;
mod traverse;
mod types;

pub use builder::El;
pub use document::Document;
pub use error::DomError;
pub use observer::{MutationRecord, ObserveOptions, ObserverId};
pub use snapshot::{DomSnapshot, DomSnapshotOptions};
pub use traverse::Descendants;
pub use types::{Node, NodeKey};
