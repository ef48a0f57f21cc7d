//! Node tree traversal.
//!
//! A traversal lowers a node tree into a [`Rendered`] tree. Along the way it
//! resolves route patterns against the context, resolves component nodes to
//! registry instances (creating them and running `prepare` on first
//! encounter) and records which instances it reached.
//!
//! The traversal is written once as a recursive future. Asynchronous entry
//! points await it; synchronous ones (reactive writes, event dispatch) run it
//! with [`HookPolicy::Defer`], which queues hook futures instead of awaiting
//! them, so the future completes on its first poll.

use std::collections::HashSet;

use futures::FutureExt;
use futures::future::LocalBoxFuture;
use tracing::{debug, warn};

use super::tree::{Listener, Rendered, RenderedElement};
use crate::component::{HookFuture, InstanceKey, Lifecycle, LifecycleEvent, Registry};
use crate::context::Context;
use crate::error::{Error, Result};
use crate::hydration::Snapshot;
use crate::node::{AttrValue, ComponentNode, ElementNode, Node};
use crate::router::apply_route;

/// How `prepare` futures are handled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum HookPolicy {
	/// Await each hook in tree order before rendering the component.
	Await,
	/// Queue hooks as pending tasks and render with current state.
	Defer,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum HookKind {
	Prepare,
	Hydrate,
}

impl HookKind {
	pub(crate) fn name(self) -> &'static str {
		match self {
			Self::Prepare => "prepare",
			Self::Hydrate => "hydrate",
		}
	}
}

/// A hook future waiting to be driven, tagged with the generation of the
/// instance that started it.
pub(crate) struct PendingHook {
	pub(crate) key: InstanceKey,
	pub(crate) generation: u64,
	pub(crate) kind: HookKind,
	pub(crate) future: HookFuture,
}

pub(crate) struct Traversal<'a> {
	registry: &'a mut Registry,
	context: &'a Context,
	marker: &'a str,
	policy: HookPolicy,
	reinitiate_changed: bool,
	snapshot: Option<&'a mut Snapshot>,
	visited: Vec<InstanceKey>,
	seen: HashSet<InstanceKey>,
	pending: Vec<PendingHook>,
	owner: Option<InstanceKey>,
}

impl<'a> Traversal<'a> {
	pub(crate) fn new(
		registry: &'a mut Registry,
		context: &'a Context,
		marker: &'a str,
		policy: HookPolicy,
	) -> Self {
		Self {
			registry,
			context,
			marker,
			policy,
			reinitiate_changed: false,
			snapshot: None,
			visited: Vec::new(),
			seen: HashSet::new(),
			pending: Vec::new(),
			owner: None,
		}
	}

	/// Reinitiates instances whose props changed since they were created.
	pub(crate) fn reinitiating(mut self) -> Self {
		self.reinitiate_changed = true;
		self
	}

	/// Seeds new instances from snapshot entries instead of running `prepare`.
	pub(crate) fn with_snapshot(mut self, snapshot: Option<&'a mut Snapshot>) -> Self {
		self.snapshot = snapshot;
		self
	}

	/// Instances reached, in pre-order, and hooks queued under
	/// [`HookPolicy::Defer`].
	pub(crate) fn finish(self) -> (Vec<InstanceKey>, Vec<PendingHook>) {
		(self.visited, self.pending)
	}

	/// Lowers `node` and everything below it.
	pub(crate) fn lower<'b>(&'b mut self, node: &'b Node) -> LocalBoxFuture<'b, Result<Rendered>> {
		async move {
			if let Some(pattern) = node.route()
				&& !apply_route(pattern, self.context)
			{
				return Ok(Rendered::Placeholder);
			}
			match node {
				Node::Primitive(primitive) => Ok(Rendered::Text(primitive.to_text())),
				Node::Fragment(children) => {
					let mut items = Vec::with_capacity(children.len());
					for child in children {
						items.push(self.lower(child).await?);
					}
					Ok(Rendered::Fragment(items))
				}
				Node::Element(element) => self.lower_element(element).await,
				Node::Component(component) => self.lower_component(component).await,
			}
		}
		.boxed_local()
	}

	/// Lowers `node` without suspending. Only valid under [`HookPolicy::Defer`].
	pub(crate) fn lower_now(&mut self, node: &Node) -> Result<Rendered> {
		self.lower(node).now_or_never().unwrap_or(Err(Error::Suspended))
	}

	/// Re-renders an existing instance without suspending.
	pub(crate) fn render_instance_now(&mut self, key: &InstanceKey) -> Result<Rendered> {
		if self.seen.insert(key.clone()) {
			self.visited.push(key.clone());
		}
		self.render_instance(key).now_or_never().unwrap_or(Err(Error::Suspended))
	}

	async fn lower_element(&mut self, element: &ElementNode) -> Result<Rendered> {
		let mut lowered = RenderedElement::new(element.tag());
		for (name, value) in element.attributes() {
			match value {
				AttrValue::Handler(handler) => lowered.push_listener(Listener {
					name: name.clone(),
					handler: handler.clone(),
					owner: self.owner.clone(),
				}),
				value => {
					if let Some(markup) = value.to_markup() {
						lowered.push_attribute(name.clone(), markup);
					}
				}
			}
		}
		for child in element.child_nodes() {
			let child = self.lower(child).await?;
			lowered.push_child(child);
		}
		Ok(Rendered::Element(lowered))
	}

	async fn lower_component(&mut self, node: &ComponentNode) -> Result<Rendered> {
		let key = node.instance_key();
		self.visit(&key, node).await?;
		self.render_instance(&key).await
	}

	/// Resolves the instance behind `node`, creating and preparing it when new.
	async fn visit(&mut self, key: &InstanceKey, node: &ComponentNode) -> Result<()> {
		let first_visit = self.seen.insert(key.clone());
		if first_visit {
			self.visited.push(key.clone());
		}

		if let Some(instance) = self.registry.get(key) {
			// A previous prepare failed before completing.
			if instance.phase() == Lifecycle::Unmounted {
				return self.prepare(key).await;
			}
			if first_visit
				&& self.registry.refresh_inputs(key, node)
				&& self.reinitiate_changed
			{
				debug!(component = %key, "props changed; reinitiating instance");
				self.registry.reinitiate(key);
				return self.prepare(key).await;
			}
			return Ok(());
		}

		self.registry.insert(key.clone(), node);
		let seeded = self.snapshot.as_deref_mut().and_then(|snapshot| snapshot.take(key));
		if let Some(state) = seeded {
			debug!(component = %key, "seeding instance from snapshot");
			self.registry.apply(key, state)?;
			self.registry.transition(key, LifecycleEvent::Prepare)?;
			return Ok(());
		}
		self.prepare(key).await
	}

	async fn prepare(&mut self, key: &InstanceKey) -> Result<()> {
		let hook = {
			let entry = self.registry.entry(key)?;
			entry.definition().prepare(&entry.scope(key, self.context))
		};
		let Some(future) = hook else {
			self.registry.transition(key, LifecycleEvent::Prepare)?;
			return Ok(());
		};
		match self.policy {
			HookPolicy::Await => {
				let writes = future
					.await
					.map_err(|source| Error::hook(key, HookKind::Prepare.name(), source))?;
				self.registry.apply(key, writes)?;
				self.registry.transition(key, LifecycleEvent::Prepare)?;
			}
			HookPolicy::Defer => {
				self.registry.transition(key, LifecycleEvent::Prepare)?;
				debug!(component = %key, "prepare deferred to pending tasks");
				self.pending.push(PendingHook {
					key: key.clone(),
					generation: self.registry.generation(key),
					kind: HookKind::Prepare,
					future,
				});
			}
		}
		Ok(())
	}

	/// Renders an instance and lowers its output, stamping the root element
	/// with the instance key in the client.
	async fn render_instance(&mut self, key: &InstanceKey) -> Result<Rendered> {
		let node = {
			let entry = self.registry.entry(key)?;
			entry
				.definition()
				.render(&entry.scope(key, self.context))
				.map_err(|source| Error::render(key, source))?
		};
		self.registry.transition(key, LifecycleEvent::Render)?;

		let outer = self.owner.replace(key.clone());
		let lowered = self.lower(&node).await;
		self.owner = outer;
		let mut rendered = lowered?;

		if self.context.is_client() {
			if !rendered.stamp(self.marker, key) {
				warn!(component = %key, "component root is not a single element; it cannot be patched");
			}
		} else {
			self.registry.transition(key, LifecycleEvent::CompleteServer)?;
		}
		Ok(rendered)
	}
}

/// Lowers a node tree with a throwaway registry and no hooks awaited.
///
/// Useful for patching a document against a tree outside of a session.
pub fn lower_detached(node: &Node, context: &Context, marker: &str) -> Result<Rendered> {
	let mut registry = Registry::new();
	let mut traversal = Traversal::new(&mut registry, context, marker, HookPolicy::Defer);
	traversal.lower_now(node)
}
