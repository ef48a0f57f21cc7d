//! Client hydration.
//!
//! [`ClientRuntime`] adopts server markup: it seeds instances from the
//! embedded [`Snapshot`], patches the container in place and then keeps the
//! document in sync with reactive writes, event handlers and navigation.

mod runtime;
mod snapshot;

pub use runtime::{ClientRuntime, PatchRecord};
pub use snapshot::{Snapshot, SnapshotEntry};
