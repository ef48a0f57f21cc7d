//! In-memory document used by the client runtime.
//!
//! The runtime mounts into a [`Document`] parsed from server markup, patches
//! it in place and dispatches events against its nodes. Every write is kept in
//! a mutation log so the cost of an update can be inspected.

mod document;
mod host;
mod parse;

pub use document::{Document, Mutation, NodeId, NodeKind};
pub use host::{BrowserHost, SharedDocument};
