//! Error types for rendering, hydration and the component lifecycle.

use std::fmt;

use thiserror::Error;

use crate::component::{InstanceKey, Lifecycle, LifecycleEvent};

/// Result type for engine operations.
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Errors surfaced by the server session and the client runtime.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum Error {
	/// The container element named at mount time is absent from the document.
	#[error("mount point not found: #{0}")]
	MissingMountPoint(String),

	/// A client operation ran before `mount`.
	#[error("runtime is not mounted")]
	NotMounted,

	/// A component's `render` failed.
	#[error("component '{component}' failed to render: {source}")]
	Render {
		component: String,
		#[source]
		source: RenderError,
	},

	/// A `prepare` or `hydrate` hook resolved to an error.
	#[error("component '{component}' failed during {hook}: {source}")]
	Hook {
		component: String,
		hook: &'static str,
		#[source]
		source: HookError,
	},

	/// No live instance is registered under this key.
	#[error("no live instance for '{0}'")]
	UnknownInstance(String),

	/// A handler outside of any component tried to write state.
	#[error("event handler is not owned by a component")]
	DetachedHandler,

	/// The lifecycle state machine rejected a transition.
	#[error(transparent)]
	Lifecycle(#[from] LifecycleError),

	/// The embedded hydration snapshot could not be decoded.
	#[error("malformed hydration snapshot: {0}")]
	Snapshot(#[source] serde_json::Error),

	/// A state value could not be converted to or from JSON.
	#[error("state serialization failed: {0}")]
	State(#[from] serde_json::Error),

	/// Render options could not be parsed.
	#[error("invalid render options: {0}")]
	Config(#[from] toml::de::Error),

	/// A synchronous render path reached an unresolved future.
	#[error("render suspended on a synchronous path")]
	Suspended,
}

impl Error {
	pub(crate) fn render(key: &InstanceKey, source: RenderError) -> Self {
		Self::Render {
			component: key.to_string(),
			source,
		}
	}

	pub(crate) fn hook(key: &InstanceKey, hook: &'static str, source: HookError) -> Self {
		Self::Hook {
			component: key.to_string(),
			hook,
			source,
		}
	}

	pub(crate) fn unknown(key: &InstanceKey) -> Self {
		Self::UnknownInstance(key.to_string())
	}
}

/// Failure raised by a component's `render`.
#[derive(Debug, Error)]
#[error("{message}")]
pub struct RenderError {
	message: String,
}

impl RenderError {
	/// Creates a render error from a message.
	pub fn new(message: impl Into<String>) -> Self {
		Self {
			message: message.into(),
		}
	}

	/// Wraps any displayable error.
	pub fn from_error(err: impl std::error::Error) -> Self {
		Self::new(err.to_string())
	}

	/// Returns the error message.
	pub fn message(&self) -> &str {
		&self.message
	}
}

impl From<serde_json::Error> for RenderError {
	fn from(err: serde_json::Error) -> Self {
		Self::from_error(err)
	}
}

/// Failure raised by an asynchronous `prepare` or `hydrate` hook.
#[derive(Debug, Error)]
#[error("{message}")]
pub struct HookError {
	message: String,
}

impl HookError {
	/// Creates a hook error from a message.
	pub fn new(message: impl Into<String>) -> Self {
		Self {
			message: message.into(),
		}
	}

	/// Wraps any displayable error.
	pub fn from_error(err: impl std::error::Error) -> Self {
		Self::new(err.to_string())
	}

	/// Returns the error message.
	pub fn message(&self) -> &str {
		&self.message
	}
}

/// A lifecycle transition the state machine does not allow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub struct LifecycleError {
	pub from: Lifecycle,
	pub event: LifecycleEvent,
}

impl fmt::Display for LifecycleError {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(
			f,
			"illegal lifecycle transition: {:?} cannot handle {:?}",
			self.from, self.event
		)
	}
}
