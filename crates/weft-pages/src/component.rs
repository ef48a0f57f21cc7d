//! Component definitions, instance keys, the lifecycle and the registry.
//!
//! A component type is a [`Component`] implementation paired with a build-time
//! [`Fingerprint`]. Each occurrence of a component node in a tree resolves to an
//! [`InstanceKey`] (the fingerprint plus an optional sibling key) and through it
//! to one [`Instance`] in the session's [`Registry`].

mod definition;
mod key;
mod lifecycle;
mod registry;

pub use definition::{Component, ComponentType, HookFuture, Scope};
pub use key::{Fingerprint, InstanceKey};
pub use lifecycle::{Lifecycle, LifecycleEvent};
pub use registry::{Instance, Registry};
