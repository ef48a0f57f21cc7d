//! Client runtime.
//!
//! The runtime owns the client side of a page session: the document, the
//! context bound to it, the registry and the element association map that
//! links instance keys to their mounted elements.

use std::cell::{Ref, RefCell};
use std::collections::HashMap;
use std::rc::Rc;

use serde::Serialize;
use serde_json::Value;
use tracing::{debug, trace, warn};

use super::snapshot::Snapshot;
use crate::component::{Instance, InstanceKey, Lifecycle, LifecycleEvent, Registry};
use crate::config::{DEFAULT_SERVER_ORIGIN, RenderOptions};
use crate::context::{Context, Host};
use crate::dom::{BrowserHost, Document, NodeId, SharedDocument};
use crate::error::{Error, Result};
use crate::node::{Event, Node};
use crate::reactive::{Driver, Reactive};
use crate::render::{
	HookKind, HookPolicy, PendingHook, Rendered, Traversal, marker_lists, patch, patch_children,
};
use crate::state::State;

/// Route re-renders followed in a row before further path writes are ignored.
const MAX_REDIRECTS: usize = 16;

/// One patch pass applied by the runtime.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PatchRecord {
	/// Instance patched, or `None` for a full route re-render.
	pub instance: Option<InstanceKey>,
	/// Node the pass started from.
	pub node: NodeId,
}

/// Client-side session: mounts a tree over server markup and keeps it live.
///
/// ```
/// use weft_pages::dom::Document;
/// use weft_pages::hydration::ClientRuntime;
/// use weft_pages::node::{ElementNode, Node};
///
/// let document = Document::parse("<body><div id=\"app\"><p>Hi</p></div></body>");
/// let mut runtime = ClientRuntime::new(document, "https://example.com/");
/// let tree: Node = ElementNode::new("p").child("Hi").into();
/// futures::executor::block_on(runtime.mount(tree, "app")).unwrap();
/// let document = runtime.document();
/// let app = document.get_element_by_id("app").unwrap();
/// assert_eq!(document.inner_html(app), "<p>Hi</p>");
/// ```
pub struct ClientRuntime {
	document: SharedDocument,
	host: Rc<BrowserHost>,
	context: Context,
	registry: Registry,
	options: RenderOptions,
	tree: Option<Node>,
	container: Option<NodeId>,
	elements: HashMap<InstanceKey, NodeId>,
	snapshot: Option<Snapshot>,
	snapshot_consumed: bool,
	pending: Vec<PendingHook>,
	patches: Vec<PatchRecord>,
	writes: u64,
}

impl ClientRuntime {
	/// Creates a runtime over `document` at `url`, which may be absolute
	/// (`https://host/path`) or a bare path.
	pub fn new(document: Document, url: &str) -> Self {
		Self::with_options(document, url, RenderOptions::default())
	}

	pub fn with_options(document: Document, url: &str, options: RenderOptions) -> Self {
		let (origin, path) = split_url(url);
		let document = Rc::new(RefCell::new(document));
		let host = Rc::new(BrowserHost::new(Rc::clone(&document), origin));
		let context = Context::client(path, Rc::clone(&host) as Rc<dyn Host>);
		Self {
			document,
			host,
			context,
			registry: Registry::new(),
			options,
			tree: None,
			container: None,
			elements: HashMap::new(),
			snapshot: None,
			snapshot_consumed: false,
			pending: Vec::new(),
			patches: Vec::new(),
			writes: 0,
		}
	}

	/// Supplies the snapshot directly instead of reading it from the document.
	pub fn with_snapshot(mut self, snapshot: Snapshot) -> Self {
		self.snapshot = Some(snapshot);
		self
	}

	pub fn context(&self) -> &Context {
		&self.context
	}

	pub fn registry(&self) -> &Registry {
		&self.registry
	}

	pub fn document(&self) -> Ref<'_, Document> {
		self.document.borrow()
	}

	pub fn shared_document(&self) -> SharedDocument {
		Rc::clone(&self.document)
	}

	pub fn history(&self) -> Vec<String> {
		self.host.history()
	}

	/// Patch passes applied by the most recent operation, oldest first.
	///
	/// `mount`, `navigate`, `dispatch`, `write` and `settle` each start a new
	/// pass that clears this log and the document's mutation log.
	pub fn patch_log(&self) -> &[PatchRecord] {
		&self.patches
	}

	pub fn clear_patch_log(&mut self) {
		self.patches.clear();
	}

	pub fn pending_tasks(&self) -> usize {
		self.pending.len()
	}

	/// Element currently associated with an instance.
	pub fn element_of(&self, key: &InstanceKey) -> Option<NodeId> {
		self.elements.get(key).copied()
	}

	pub fn find_by_fingerprint(&self, hash: &str) -> Option<&Instance> {
		self.registry.find_by_fingerprint(hash)
	}

	/// Mounts `tree` into the element with id `container_id`.
	///
	/// Seeds instances from the snapshot (skipping their `prepare`), awaits
	/// the remaining `prepare` hooks in tree order, patches the container's
	/// server markup, then awaits `hydrate` hooks in tree order.
	pub async fn mount(&mut self, tree: Node, container_id: &str) -> Result<()> {
		self.begin_pass();
		let container = self
			.document
			.borrow()
			.get_element_by_id(container_id)
			.ok_or_else(|| Error::MissingMountPoint(container_id.to_string()))?;
		self.container = Some(container);

		if !self.snapshot_consumed && self.snapshot.is_none() {
			self.snapshot =
				Snapshot::from_document(&self.document.borrow(), &self.options.state_script_id)?;
		}
		self.snapshot_consumed = true;
		debug!(
			container = container_id,
			seeded = self.snapshot.as_ref().map_or(0, Snapshot::len),
			"mounting tree"
		);

		self.setup_tree(&tree).await?;
		if let Some(unused) = self.snapshot.take() {
			for key in unused.keys() {
				debug!(component = key, "snapshot entry has no instance in the tree; skipped");
			}
		}

		self.tree = Some(tree);
		self.render_route()?;
		self.drive_pending().await
	}

	/// Runs one full traversal that creates and prepares every reachable
	/// instance and recomputes the visible set.
	pub async fn setup_tree(&mut self, tree: &Node) -> Result<Vec<InstanceKey>> {
		self.context.params().clear();
		let (visited, pending) = {
			let mut traversal = Traversal::new(
				&mut self.registry,
				&self.context,
				&self.options.marker_attribute,
				HookPolicy::Await,
			)
			.reinitiating()
			.with_snapshot(self.snapshot.as_mut());
			traversal.lower(tree).await?;
			traversal.finish()
		};
		self.pending.extend(pending);
		let destroyed = self.registry.reconcile_visible(visited.clone(), &self.context)?;
		self.forget(&destroyed);
		Ok(visited)
	}

	/// Moves to `path`: pushes a history entry, prepares instances the new
	/// route reaches, destroys those it no longer reaches and re-renders.
	pub async fn navigate(&mut self, path: &str) -> Result<()> {
		self.begin_pass();
		let tree = self.tree.take().ok_or(Error::NotMounted)?;
		self.context.router().set_path(path);
		self.context.take_navigation_request();
		let prepared = self.setup_tree(&tree).await;
		self.tree = Some(tree);
		prepared?;
		self.render_route()?;
		self.drive_pending().await
	}

	/// Delivers `event` to `target` and its ancestors.
	///
	/// Each handler runs with a [`Reactive`] bound to the instance that
	/// rendered its element. Afterwards that instance's update path runs
	/// unless the handler already wrote through the handle, or a full route
	/// re-render when the handler changed the path. Returns the number of
	/// handlers invoked.
	pub fn dispatch(&mut self, target: NodeId, event: &Event) -> Result<usize> {
		self.begin_pass();
		let name = event.attribute_name();
		let listeners = {
			let document = self.document.borrow();
			let mut chain = Vec::new();
			let mut current = Some(target);
			while let Some(node) = current {
				if let Some(listener) = document.listener(node, &name) {
					chain.push(listener);
				}
				current = document.parent(node);
			}
			chain
		};
		trace!(event = %event.kind, handlers = listeners.len(), "dispatch");

		for (handler, owner) in &listeners {
			let writes = self.writes;
			handler.call(&mut Reactive::new(owner.clone(), self), event)?;
			if !self.follow_navigation()?
				&& self.writes == writes
				&& let Some(owner) = owner
			{
				self.update_component(owner)?;
				self.follow_navigation()?;
			}
		}
		Ok(listeners.len())
	}

	/// Writes a state field of a live instance through the update path.
	pub fn write(&mut self, key: &InstanceKey, field: &str, value: impl Serialize) -> Result<()> {
		self.begin_pass();
		Reactive::new(Some(key.clone()), self).write(field, value)
	}

	/// Returns a reactive handle bound to `key`.
	pub fn reactive(&mut self, key: &InstanceKey) -> Reactive<'_> {
		Reactive::new(Some(key.clone()), self)
	}

	/// Drives pending hook tasks until none remain.
	///
	/// Results for instances destroyed or reinitiated since the task started
	/// are discarded. Writes from the remaining ones go through the update path.
	/// A path written outside a handler, for example through
	/// `context().router()`, is followed here with a route re-render.
	///
	/// Every task is driven even when some fail; the first failure is
	/// returned once the queue is empty.
	pub async fn settle(&mut self) -> Result<()> {
		self.begin_pass();
		self.drive_pending().await
	}

	async fn drive_pending(&mut self) -> Result<()> {
		let mut first_error = None;
		loop {
			if let Err(err) = self.follow_navigation() {
				keep_first(&mut first_error, err);
			}
			if self.pending.is_empty() {
				break;
			}
			let batch = std::mem::take(&mut self.pending);
			for task in batch {
				if let Err(err) = self.complete(task).await {
					keep_first(&mut first_error, err);
				}
			}
		}
		first_error.map_or(Ok(()), Err)
	}

	async fn complete(&mut self, task: PendingHook) -> Result<()> {
		let PendingHook {
			key,
			generation,
			kind,
			future,
		} = task;
		let outcome = future.await;
		if !self.registry.is_current(&key, generation) {
			debug!(component = %key, hook = kind.name(), "discarding result for a stale instance");
			return Ok(());
		}
		let writes = outcome.map_err(|source| Error::hook(&key, kind.name(), source))?;
		if writes.is_empty() {
			return Ok(());
		}
		self.registry.apply(&key, writes)?;
		self.update_component(&key)
	}

	/// Re-renders the route while a path write is outstanding. Returns whether
	/// any re-render ran.
	fn follow_navigation(&mut self) -> Result<bool> {
		let mut followed = 0;
		while self.context.take_navigation_request() {
			if followed == MAX_REDIRECTS {
				warn!(path = %self.context.router().path(), "too many redirects; path write ignored");
				break;
			}
			self.render_route()?;
			followed += 1;
		}
		Ok(followed > 0)
	}

	fn begin_pass(&mut self) {
		self.document.borrow_mut().clear_mutations();
		self.patches.clear();
	}

	/// Re-renders the whole tree against the current route and patches the
	/// container. The document is untouched when rendering fails.
	fn render_route(&mut self) -> Result<()> {
		let container = self.container.ok_or(Error::NotMounted)?;
		let tree = self.tree.take().ok_or(Error::NotMounted)?;
		let lowered = self.lower_route(&tree);
		self.tree = Some(tree);
		let (rendered, visited, pending) = lowered?;

		patch_children(
			&mut self.document.borrow_mut(),
			container,
			std::slice::from_ref(&rendered),
		);
		self.patches.push(PatchRecord {
			instance: None,
			node: container,
		});
		self.pending.extend(pending);

		let destroyed = self.registry.reconcile_visible(visited, &self.context)?;
		self.forget(&destroyed);
		self.elements.clear();
		self.scan_markers(container);
		self.queue_hydration()
	}

	fn lower_route(&mut self, tree: &Node) -> Result<(Rendered, Vec<InstanceKey>, Vec<PendingHook>)> {
		self.context.params().clear();
		let mut traversal = Traversal::new(
			&mut self.registry,
			&self.context,
			&self.options.marker_attribute,
			HookPolicy::Defer,
		)
		.reinitiating();
		let rendered = traversal.lower_now(tree)?;
		let (visited, pending) = traversal.finish();
		Ok((rendered, visited, pending))
	}

	/// Re-renders one instance and patches only its element, then runs its
	/// `update` hook. A missing element makes this a no-op.
	fn update_component(&mut self, key: &InstanceKey) -> Result<()> {
		let Some(element) = self.locate(key) else {
			trace!(component = %key, "no mounted element; update skipped");
			return Ok(());
		};
		let (mut rendered, visited, pending) = {
			let mut traversal = Traversal::new(
				&mut self.registry,
				&self.context,
				&self.options.marker_attribute,
				HookPolicy::Defer,
			)
			.reinitiating();
			let rendered = traversal.render_instance_now(key)?;
			let (visited, pending) = traversal.finish();
			(rendered, visited, pending)
		};
		self.keep_outer_markers(element, &mut rendered);

		let node = patch(&mut self.document.borrow_mut(), element, &rendered);
		self.patches.push(PatchRecord {
			instance: Some(key.clone()),
			node,
		});
		self.pending.extend(pending);
		self.registry.extend_visible(visited);
		self.scan_markers(node);
		self.queue_hydration()?;

		if self.registry.get(key).is_some_and(|instance| instance.phase().is_mounted()) {
			self.registry.transition(key, LifecycleEvent::Update)?;
			let entry = self.registry.entry(key)?;
			entry.definition().update(&entry.scope(key, &self.context));
		}
		Ok(())
	}

	/// Finds the element carrying `key` in its marker attribute, preferring
	/// the association map and falling back to a document scan.
	fn locate(&mut self, key: &InstanceKey) -> Option<NodeId> {
		let container = self.container?;
		let wanted = key.to_string();
		let marker = self.options.marker_attribute.as_str();
		let found = {
			let document = self.document.borrow();
			let carries = |node: NodeId| {
				document
					.attribute(node, marker)
					.is_some_and(|value| marker_lists(value, &wanted))
			};
			match self.elements.get(key) {
				Some(&node) if document.is_within(container, node) && carries(node) => Some(node),
				_ => document
					.descendants(container)
					.into_iter()
					.find(|node| carries(*node)),
			}
		};
		match found {
			Some(node) => {
				self.elements.insert(key.clone(), node);
			}
			None => {
				self.elements.remove(key);
			}
		}
		found
	}

	/// Carries over marker tokens of enclosing instances that share the
	/// element, so a partial re-render does not drop their association.
	fn keep_outer_markers(&self, element: NodeId, rendered: &mut Rendered) {
		let marker = self.options.marker_attribute.as_str();
		let document = self.document.borrow();
		let (Some(existing), Rendered::Element(root)) = (document.attribute(element, marker), rendered)
		else {
			return;
		};
		let mut tokens: Vec<String> = root
			.attribute(marker)
			.map(|value| value.split_ascii_whitespace().map(str::to_string).collect())
			.unwrap_or_default();
		for token in existing.split_ascii_whitespace() {
			if !tokens.iter().any(|t| t == token) {
				tokens.push(token.to_string());
			}
		}
		root.set_attribute(marker, tokens.join(" "));
	}

	/// Records every marked element below `root` in the association map.
	fn scan_markers(&mut self, root: NodeId) {
		let document = self.document.borrow();
		let marker = self.options.marker_attribute.as_str();
		for node in document.descendants(root) {
			if let Some(value) = document.attribute(node, marker) {
				for token in value.split_ascii_whitespace() {
					self.elements.insert(InstanceKey::parse(token), node);
				}
			}
		}
	}

	/// Starts `hydrate` for each visible instance that has been rendered and
	/// located but not yet hydrated.
	fn queue_hydration(&mut self) -> Result<()> {
		let ready: Vec<InstanceKey> = self
			.registry
			.visible()
			.iter()
			.filter(|key| {
				self.elements.contains_key(*key)
					&& self
						.registry
						.get(key)
						.is_some_and(|instance| instance.phase() == Lifecycle::Rendered)
			})
			.cloned()
			.collect();

		for key in ready {
			let hook = {
				let entry = self.registry.entry(&key)?;
				entry.definition().hydrate(&entry.scope(&key, &self.context))
			};
			self.registry.transition(&key, LifecycleEvent::Hydrate)?;
			debug!(component = %key, "hydrated");
			if let Some(future) = hook {
				self.pending.push(PendingHook {
					generation: self.registry.generation(&key),
					key,
					kind: HookKind::Hydrate,
					future,
				});
			}
		}
		Ok(())
	}

	fn forget(&mut self, destroyed: &[InstanceKey]) {
		for key in destroyed {
			self.elements.remove(key);
		}
	}
}

impl Driver for ClientRuntime {
	fn instance_state(&self, key: &InstanceKey) -> Option<&State> {
		self.registry.get(key).map(Instance::state)
	}

	fn store(&mut self, key: &InstanceKey, field: String, value: Value) -> Result<()> {
		self.registry.store(key, field, value)?;
		self.writes += 1;
		Ok(())
	}

	fn after_write(&mut self, key: &InstanceKey) -> Result<()> {
		self.update_component(key)?;
		self.follow_navigation()?;
		Ok(())
	}

	fn context(&self) -> &Context {
		&self.context
	}
}

fn keep_first(slot: &mut Option<Error>, err: Error) {
	if slot.is_some() {
		warn!(error = %err, "further failure while settling");
	} else {
		*slot = Some(err);
	}
}

/// Splits a location into origin and path, dropping any query or fragment.
fn split_url(url: &str) -> (String, String) {
	let (origin, rest) = match url.find("://") {
		Some(scheme_end) => {
			let authority_start = scheme_end + 3;
			let path_start = url[authority_start..]
				.find('/')
				.map_or(url.len(), |i| authority_start + i);
			(&url[..path_start], &url[path_start..])
		}
		None => (DEFAULT_SERVER_ORIGIN, url),
	};
	let path = rest.split(['?', '#']).next().unwrap_or_default();
	let path = if path.is_empty() { "/" } else { path };
	(origin.to_string(), path.to_string())
}
