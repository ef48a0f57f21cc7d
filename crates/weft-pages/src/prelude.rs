//! Commonly used types.
//!
//! ```
//! use weft_pages::prelude::*;
//! ```

pub use crate::component::{
	Component, ComponentType, HookFuture, InstanceKey, Lifecycle, Scope,
};
pub use crate::config::RenderOptions;
pub use crate::context::Context;
pub use crate::error::{Error, HookError, RenderError};
pub use crate::hydration::{ClientRuntime, Snapshot};
pub use crate::node::{AttrValue, ComponentNode, ElementNode, Event, Handler, Node, h};
pub use crate::reactive::Reactive;
pub use crate::ssr::{ServerSession, serialize};
pub use crate::state::{Props, State};
