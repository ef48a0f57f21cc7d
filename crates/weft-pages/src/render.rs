//! Rendering: lowering node trees, serializing markup and patching
//! documents.
//!
//! - A traversal turns a [`Node`](crate::node::Node) tree into a
//!   [`Rendered`] tree, resolving routes and component instances.
//! - [`Rendered::to_html`] serializes the result.
//! - [`patch`] and [`patch_children`] reconcile a mounted document against it.

pub mod markup;
mod patch;
mod traversal;
mod tree;

pub use patch::{patch, patch_children};
pub use traversal::lower_detached;
pub use tree::{Listener, ROUTE_PLACEHOLDER, Rendered, RenderedElement};

pub(crate) use traversal::{HookKind, HookPolicy, PendingHook, Traversal};
pub(crate) use tree::marker_lists;
