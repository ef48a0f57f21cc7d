//! Server render session.

use serde::Serialize;
use serde_json::Value;
use tracing::debug;

use super::page;
use crate::component::{Instance, InstanceKey, Registry};
use crate::config::RenderOptions;
use crate::context::Context;
use crate::error::Result;
use crate::hydration::Snapshot;
use crate::node::Node;
use crate::reactive::{Driver, Reactive};
use crate::render::{HookPolicy, Traversal};
use crate::state::State;

/// Renders trees on the server and remembers the instances it created.
pub struct ServerSession {
	context: Context,
	registry: Registry,
	options: RenderOptions,
}

impl ServerSession {
	pub fn new(context: Context) -> Self {
		Self::with_options(context, RenderOptions::default())
	}

	pub fn with_options(context: Context, options: RenderOptions) -> Self {
		Self {
			context,
			registry: Registry::new(),
			options,
		}
	}

	/// Creates a session for a request `path` with the configured origin.
	pub fn for_path(path: impl Into<String>, options: RenderOptions) -> Self {
		let context = Context::server_with_origin(path, options.server_origin.clone());
		Self::with_options(context, options)
	}

	pub fn context(&self) -> &Context {
		&self.context
	}

	pub fn registry(&self) -> &Registry {
		&self.registry
	}

	pub fn options(&self) -> &RenderOptions {
		&self.options
	}

	pub fn find_by_fingerprint(&self, hash: &str) -> Option<&Instance> {
		self.registry.find_by_fingerprint(hash)
	}

	/// Serializes `tree` to markup.
	///
	/// New instances are prepared, awaiting each `prepare` in tree order
	/// before the component renders. Instances the tree no longer reaches are
	/// destroyed. Serializing the same tree again yields identical markup and
	/// runs no further `prepare` hooks.
	pub async fn serialize(&mut self, tree: &Node) -> Result<String> {
		self.context.params().clear();
		let (rendered, visited) = {
			let mut traversal = Traversal::new(
				&mut self.registry,
				&self.context,
				&self.options.marker_attribute,
				HookPolicy::Await,
			);
			let rendered = traversal.lower(tree).await?;
			let (visited, _) = traversal.finish();
			(rendered, visited)
		};
		let destroyed = self.registry.reconcile_visible(visited, &self.context)?;
		if !destroyed.is_empty() {
			debug!(count = destroyed.len(), "destroyed instances the tree no longer reaches");
		}
		Ok(rendered.to_html())
	}

	/// Captures the state of every visible instance.
	pub fn snapshot(&self) -> Snapshot {
		Snapshot::capture(&self.registry, self.registry.visible())
	}

	/// Serializes `tree` and wraps it in a complete HTML document with the
	/// page metadata and, when enabled, the state snapshot.
	pub async fn render_page(&mut self, tree: &Node) -> Result<String> {
		let content = self.serialize(tree).await?;
		let snapshot = self.snapshot();
		page::assemble(&content, &self.context.page().meta(), &snapshot, &self.options)
	}

	/// Stores a state field. No re-render happens on the server.
	pub fn write(&mut self, key: &InstanceKey, field: &str, value: impl Serialize) -> Result<()> {
		Reactive::new(Some(key.clone()), self).write(field, value)
	}

	pub fn reactive(&mut self, key: &InstanceKey) -> Reactive<'_> {
		Reactive::new(Some(key.clone()), self)
	}
}

impl Driver for ServerSession {
	fn instance_state(&self, key: &InstanceKey) -> Option<&State> {
		self.registry.get(key).map(Instance::state)
	}

	fn store(&mut self, key: &InstanceKey, field: String, value: Value) -> Result<()> {
		self.registry.store(key, field, value)
	}

	fn after_write(&mut self, _key: &InstanceKey) -> Result<()> {
		Ok(())
	}

	fn context(&self) -> &Context {
		&self.context
	}
}

impl std::fmt::Debug for ServerSession {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("ServerSession")
			.field("context", &self.context)
			.field("registry", &self.registry)
			.finish()
	}
}

/// Serializes `tree` once in a fresh session over `context`.
pub async fn serialize(tree: &Node, context: &Context) -> Result<String> {
	ServerSession::new(context.clone()).serialize(tree).await
}
