//! Component definitions.

use std::fmt;
use std::rc::Rc;

use futures::future::LocalBoxFuture;
use tracing::warn;

use super::key::{Fingerprint, InstanceKey};
use crate::context::Context;
use crate::error::{HookError, RenderError};
use crate::node::Node;
use crate::state::{Props, State};

/// Future returned by `prepare` and `hydrate`.
///
/// It resolves to the state writes to apply to the instance. The future is
/// `'static` so it can outlive the traversal that started it; a result that
/// arrives after its instance was destroyed is discarded.
pub type HookFuture = LocalBoxFuture<'static, Result<State, HookError>>;

/// Behavior shared by every instance of a component type.
///
/// Only `defaults` and `render` are required. Hooks that return `None`
/// complete immediately.
///
/// # Example
///
/// ```
/// use weft_pages::component::{Component, Scope};
/// use weft_pages::node::{ElementNode, Node};
/// use weft_pages::{Props, RenderError, State};
///
/// struct Greeting;
///
/// impl Component for Greeting {
///     fn defaults(&self, props: &Props) -> State {
///         State::new().with("name", props.get::<String>("name").unwrap_or_default())
///     }
///
///     fn render(&self, scope: &Scope<'_>) -> Result<Node, RenderError> {
///         let name: String = scope.state().get("name").unwrap_or_default();
///         Ok(ElementNode::new("p").child(format!("Hello, {name}")).into())
///     }
/// }
/// ```
pub trait Component: 'static {
	/// Declared state fields and their initial values.
	fn defaults(&self, props: &Props) -> State;

	/// Produces the subtree for the current state. Must not have side effects.
	fn render(&self, scope: &Scope<'_>) -> Result<Node, RenderError>;

	/// Runs once before the first render of an instance.
	fn prepare(&self, _scope: &Scope<'_>) -> Option<HookFuture> {
		None
	}

	/// Runs in the client once the instance's element is located.
	fn hydrate(&self, _scope: &Scope<'_>) -> Option<HookFuture> {
		None
	}

	/// Runs after each reactive re-render in the client.
	fn update(&self, _scope: &Scope<'_>) {}

	/// Runs when a full traversal no longer reaches the instance.
	fn destroy(&self, _scope: &Scope<'_>) {}

	/// Human-readable name used in logs.
	fn name(&self) -> &'static str {
		std::any::type_name::<Self>()
	}
}

/// A component definition paired with its fingerprint.
#[derive(Clone)]
pub struct ComponentType {
	fingerprint: Fingerprint,
	definition: Rc<dyn Component>,
}

impl ComponentType {
	/// Pairs `component` with `fingerprint`. A fingerprint that fails
	/// [`Fingerprint::is_valid`] is accepted with a warning; its instances
	/// will not be found again from marker or snapshot text.
	pub fn new(fingerprint: impl Into<Fingerprint>, component: impl Component) -> Self {
		let fingerprint = fingerprint.into();
		if !Fingerprint::is_valid(fingerprint.as_str()) {
			warn!(%fingerprint, "fingerprint contains a reserved character");
		}
		Self {
			fingerprint,
			definition: Rc::new(component),
		}
	}

	pub fn fingerprint(&self) -> &Fingerprint {
		&self.fingerprint
	}

	pub fn name(&self) -> &'static str {
		self.definition.name()
	}

	pub(crate) fn definition(&self) -> &dyn Component {
		self.definition.as_ref()
	}
}

impl PartialEq for ComponentType {
	fn eq(&self, other: &Self) -> bool {
		self.fingerprint == other.fingerprint
	}
}

impl fmt::Debug for ComponentType {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("ComponentType")
			.field("fingerprint", &self.fingerprint)
			.field("name", &self.name())
			.finish()
	}
}

/// Read-only view of one instance handed to `render` and the hooks.
#[derive(Debug, Clone, Copy)]
pub struct Scope<'a> {
	key: &'a InstanceKey,
	state: &'a State,
	props: &'a Props,
	children: &'a [Node],
	context: &'a Context,
}

impl<'a> Scope<'a> {
	pub(crate) fn new(
		key: &'a InstanceKey,
		state: &'a State,
		props: &'a Props,
		children: &'a [Node],
		context: &'a Context,
	) -> Self {
		Self {
			key,
			state,
			props,
			children,
			context,
		}
	}

	pub fn key(&self) -> &'a InstanceKey {
		self.key
	}

	pub fn state(&self) -> &'a State {
		self.state
	}

	pub fn props(&self) -> &'a Props {
		self.props
	}

	/// Nodes passed between the component node's open and close.
	pub fn children(&self) -> &'a [Node] {
		self.children
	}

	pub fn context(&self) -> &'a Context {
		self.context
	}
}
