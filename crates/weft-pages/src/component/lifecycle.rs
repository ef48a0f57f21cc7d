//! Instance lifecycle state machine.

use crate::error::LifecycleError;

/// Lifecycle phase of a component instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Lifecycle {
	Unmounted,
	Prepared,
	Rendered,
	/// Client: element located and `hydrate` started.
	Hydrated,
	/// Server: markup emitted.
	ServerRendered,
	Updated,
	Destroyed,
}

/// Inputs driving [`Lifecycle::transition`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LifecycleEvent {
	Prepare,
	Render,
	Hydrate,
	CompleteServer,
	Update,
	Destroy,
}

impl Lifecycle {
	/// Applies an event, rejecting moves the lifecycle does not allow.
	pub fn transition(self, event: LifecycleEvent) -> Result<Self, LifecycleError> {
		use Lifecycle::*;
		use LifecycleEvent as E;

		let next = match (self, event) {
			(Destroyed, _) => None,
			(_, E::Destroy) => Some(Destroyed),
			(Unmounted, E::Prepare) => Some(Prepared),
			(Prepared | Rendered, E::Render) => Some(Rendered),
			// Re-rendering keeps the phase reached so far.
			(ServerRendered | Hydrated | Updated, E::Render) => Some(self),
			(Rendered, E::Hydrate) => Some(Hydrated),
			(Rendered | ServerRendered, E::CompleteServer) => Some(ServerRendered),
			(Hydrated | Updated, E::Update) => Some(Updated),
			_ => None,
		};

		next.ok_or(LifecycleError { from: self, event })
	}

	/// Whether the instance is live in a client document.
	pub fn is_mounted(self) -> bool {
		matches!(self, Self::Hydrated | Self::Updated)
	}
}
