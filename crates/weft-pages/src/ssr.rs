//! Server-side rendering.
//!
//! A [`ServerSession`] renders a node tree to markup against a server
//! [`Context`](crate::context::Context), awaiting every `prepare` hook first.
//! The states it produced can then be captured into a
//! [`Snapshot`](crate::hydration::Snapshot) and embedded in the page so the
//! client can adopt the markup without preparing again.

mod page;
mod session;

pub use session::{ServerSession, serialize};
