//! Arena-backed document tree.

use std::collections::HashMap;
use std::fmt;

use super::parse;
use crate::component::InstanceKey;
use crate::node::Handler;
use crate::render::markup::{escape_text, is_raw_text, is_void, write_open_tag};
use crate::render::{Listener, ROUTE_PLACEHOLDER, Rendered};

/// Handle to a node of a [`Document`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

/// Payload of a document node.
#[derive(Debug, Clone, PartialEq)]
pub enum NodeKind {
	Document,
	Element {
		tag: String,
		attributes: Vec<(String, String)>,
	},
	Text(String),
	Comment(String),
}

/// A recorded write to the document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Mutation {
	SetAttribute { node: NodeId, name: String },
	RemoveAttribute { node: NodeId, name: String },
	SetText { node: NodeId },
	Append { parent: NodeId, child: NodeId },
	Insert { parent: NodeId, child: NodeId, index: usize },
	Remove { parent: NodeId, child: NodeId },
	Replace { parent: NodeId, old: NodeId, new: NodeId },
}

impl Mutation {
	/// The node whose own content or child list was written.
	pub fn target(&self) -> NodeId {
		match self {
			Self::SetAttribute { node, .. }
			| Self::RemoveAttribute { node, .. }
			| Self::SetText { node } => *node,
			Self::Append { parent, .. }
			| Self::Insert { parent, .. }
			| Self::Remove { parent, .. }
			| Self::Replace { parent, .. } => *parent,
		}
	}
}

#[derive(Debug)]
struct NodeData {
	kind: NodeKind,
	parent: Option<NodeId>,
	children: Vec<NodeId>,
}

/// An in-memory document.
///
/// Nodes live in an arena and are addressed by [`NodeId`]. Detached nodes
/// stay in the arena. Every write made through the public mutators is
/// appended to a mutation log.
pub struct Document {
	nodes: Vec<NodeData>,
	listeners: HashMap<NodeId, Vec<Listener>>,
	mutations: Vec<Mutation>,
}

impl Default for Document {
	fn default() -> Self {
		Self::new()
	}
}

const ROOT: NodeId = NodeId(0);

impl Document {
	/// Creates an empty document.
	pub fn new() -> Self {
		Self {
			nodes: vec![NodeData {
				kind: NodeKind::Document,
				parent: None,
				children: Vec::new(),
			}],
			listeners: HashMap::new(),
			mutations: Vec::new(),
		}
	}

	/// Parses markup into a new document. Parsing is lenient and never fails.
	pub fn parse(markup: &str) -> Self {
		let mut document = Self::new();
		parse::parse_into(&mut document, ROOT, markup);
		document
	}

	pub fn root(&self) -> NodeId {
		ROOT
	}

	fn data(&self, node: NodeId) -> Option<&NodeData> {
		self.nodes.get(node.0)
	}

	fn data_mut(&mut self, node: NodeId) -> Option<&mut NodeData> {
		self.nodes.get_mut(node.0)
	}

	pub fn kind(&self, node: NodeId) -> Option<&NodeKind> {
		self.data(node).map(|data| &data.kind)
	}

	pub fn tag(&self, node: NodeId) -> Option<&str> {
		match self.kind(node)? {
			NodeKind::Element { tag, .. } => Some(tag),
			_ => None,
		}
	}

	/// Content of a text or comment node.
	pub fn text(&self, node: NodeId) -> Option<&str> {
		match self.kind(node)? {
			NodeKind::Text(text) | NodeKind::Comment(text) => Some(text),
			_ => None,
		}
	}

	pub fn parent(&self, node: NodeId) -> Option<NodeId> {
		self.data(node)?.parent
	}

	pub fn children(&self, node: NodeId) -> &[NodeId] {
		self.data(node).map_or(&[], |data| data.children.as_slice())
	}

	pub fn attributes(&self, node: NodeId) -> &[(String, String)] {
		match self.kind(node) {
			Some(NodeKind::Element { attributes, .. }) => attributes,
			_ => &[],
		}
	}

	pub fn attribute(&self, node: NodeId, name: &str) -> Option<&str> {
		self.attributes(node)
			.iter()
			.find(|(attr, _)| attr == name)
			.map(|(_, value)| value.as_str())
	}

	pub(super) fn push_node(&mut self, kind: NodeKind) -> NodeId {
		let id = NodeId(self.nodes.len());
		self.nodes.push(NodeData {
			kind,
			parent: None,
			children: Vec::new(),
		});
		id
	}

	/// Attaches without logging; used while building detached subtrees.
	pub(super) fn attach(&mut self, parent: NodeId, child: NodeId) {
		self.detach(child);
		if let Some(data) = self.data_mut(child) {
			data.parent = Some(parent);
		}
		if let Some(data) = self.data_mut(parent) {
			data.children.push(child);
		}
	}

	fn detach(&mut self, child: NodeId) {
		if let Some(parent) = self.parent(child) {
			if let Some(data) = self.data_mut(parent) {
				data.children.retain(|id| *id != child);
			}
			if let Some(data) = self.data_mut(child) {
				data.parent = None;
			}
		}
	}

	pub fn create_element(&mut self, tag: impl Into<String>) -> NodeId {
		self.push_node(NodeKind::Element {
			tag: tag.into().to_ascii_lowercase(),
			attributes: Vec::new(),
		})
	}

	pub fn create_text(&mut self, text: impl Into<String>) -> NodeId {
		self.push_node(NodeKind::Text(text.into()))
	}

	pub fn create_comment(&mut self, text: impl Into<String>) -> NodeId {
		self.push_node(NodeKind::Comment(text.into()))
	}

	pub fn append_child(&mut self, parent: NodeId, child: NodeId) {
		self.attach(parent, child);
		self.mutations.push(Mutation::Append { parent, child });
	}

	/// Inserts `child` at `index`, clamped to the child count.
	pub fn insert_child(&mut self, parent: NodeId, index: usize, child: NodeId) {
		self.detach(child);
		let Some(data) = self.data_mut(parent) else {
			return;
		};
		let index = index.min(data.children.len());
		data.children.insert(index, child);
		if let Some(data) = self.data_mut(child) {
			data.parent = Some(parent);
		}
		self.mutations.push(Mutation::Insert {
			parent,
			child,
			index,
		});
	}

	pub fn remove_child(&mut self, parent: NodeId, child: NodeId) -> bool {
		if self.parent(child) != Some(parent) {
			return false;
		}
		self.detach(child);
		self.unbind_subtree(child);
		self.mutations.push(Mutation::Remove { parent, child });
		true
	}

	/// Puts `new` in place of `old` under `parent`. Listeners of the
	/// replaced subtree are dropped.
	pub fn replace_child(&mut self, parent: NodeId, old: NodeId, new: NodeId) -> bool {
		if self.parent(old) != Some(parent) {
			return false;
		}
		self.detach(new);
		let Some(position) = self
			.children(parent)
			.iter()
			.position(|id| *id == old)
		else {
			return false;
		};
		if let Some(data) = self.data_mut(parent) {
			data.children[position] = new;
		}
		if let Some(data) = self.data_mut(old) {
			data.parent = None;
		}
		if let Some(data) = self.data_mut(new) {
			data.parent = Some(parent);
		}
		self.unbind_subtree(old);
		self.mutations.push(Mutation::Replace { parent, old, new });
		true
	}

	pub fn set_attribute(&mut self, node: NodeId, name: impl Into<String>, value: impl Into<String>) {
		let (name, value) = (name.into(), value.into());
		let Some(NodeKind::Element { attributes, .. }) = self.data_mut(node).map(|d| &mut d.kind) else {
			return;
		};
		match attributes.iter_mut().find(|(attr, _)| *attr == name) {
			Some((_, existing)) => *existing = value,
			None => attributes.push((name.clone(), value)),
		}
		self.mutations.push(Mutation::SetAttribute { node, name });
	}

	pub fn remove_attribute(&mut self, node: NodeId, name: &str) -> bool {
		let Some(NodeKind::Element { attributes, .. }) = self.data_mut(node).map(|d| &mut d.kind) else {
			return false;
		};
		let before = attributes.len();
		attributes.retain(|(attr, _)| attr != name);
		if attributes.len() == before {
			return false;
		}
		self.mutations.push(Mutation::RemoveAttribute {
			node,
			name: name.to_string(),
		});
		true
	}

	/// Rewrites the content of a text or comment node.
	pub fn set_text(&mut self, node: NodeId, text: impl Into<String>) {
		match self.data_mut(node).map(|d| &mut d.kind) {
			Some(NodeKind::Text(content) | NodeKind::Comment(content)) => *content = text.into(),
			_ => return,
		}
		self.mutations.push(Mutation::SetText { node });
	}

	/// Replaces the children of an element with a single text node.
	pub fn set_text_content(&mut self, node: NodeId, text: impl Into<String>) {
		let text = text.into();
		if let [only] = self.children(node)
			&& matches!(self.kind(*only), Some(NodeKind::Text(_)))
		{
			let only = *only;
			if self.text(only) != Some(text.as_str()) {
				self.set_text(only, text);
			}
			return;
		}
		for child in self.children(node).to_vec() {
			self.remove_child(node, child);
		}
		let text_node = self.create_text(text);
		self.append_child(node, text_node);
	}

	/// Concatenated text of a subtree.
	pub fn text_content(&self, node: NodeId) -> String {
		let mut out = String::new();
		for id in self.descendants(node) {
			if let Some(NodeKind::Text(text)) = self.kind(id) {
				out.push_str(text);
			}
		}
		out
	}

	/// `node` and everything below it, in document order.
	pub fn descendants(&self, node: NodeId) -> Vec<NodeId> {
		let mut out = Vec::new();
		let mut stack = vec![node];
		while let Some(id) = stack.pop() {
			if self.data(id).is_none() {
				continue;
			}
			out.push(id);
			stack.extend(self.children(id).iter().rev());
		}
		out
	}

	fn find_first(&self, predicate: impl Fn(NodeId) -> bool) -> Option<NodeId> {
		self.descendants(ROOT).into_iter().find(|id| predicate(*id))
	}

	pub fn get_element_by_id(&self, id: &str) -> Option<NodeId> {
		self.find_by_attribute("id", id)
	}

	pub fn find_by_attribute(&self, name: &str, value: &str) -> Option<NodeId> {
		self.find_first(|node| self.attribute(node, name) == Some(value))
	}

	pub fn find_by_tag(&self, tag: &str) -> Option<NodeId> {
		self.find_first(|node| self.tag(node) == Some(tag))
	}

	pub fn find_all_by_tag(&self, tag: &str) -> Vec<NodeId> {
		self.descendants(ROOT)
			.into_iter()
			.filter(|node| self.tag(*node) == Some(tag))
			.collect()
	}

	/// Whether `node` is `ancestor` or lies below it.
	pub fn is_within(&self, ancestor: NodeId, node: NodeId) -> bool {
		let mut current = Some(node);
		while let Some(id) = current {
			if id == ancestor {
				return true;
			}
			current = self.parent(id);
		}
		false
	}

	pub fn is_attached(&self, node: NodeId) -> bool {
		self.is_within(ROOT, node)
	}

	pub fn outer_html(&self, node: NodeId) -> String {
		let mut out = String::new();
		self.write_html(&mut out, node, false);
		out
	}

	pub fn inner_html(&self, node: NodeId) -> String {
		let raw = self.tag(node).is_some_and(is_raw_text);
		let mut out = String::new();
		for child in self.children(node) {
			self.write_html(&mut out, *child, raw);
		}
		out
	}

	fn write_html(&self, out: &mut String, node: NodeId, raw: bool) {
		match self.kind(node) {
			None => {}
			Some(NodeKind::Document) => {
				for child in self.children(node) {
					self.write_html(out, *child, false);
				}
			}
			Some(NodeKind::Text(text)) if raw => out.push_str(text),
			Some(NodeKind::Text(text)) => out.push_str(&escape_text(text)),
			Some(NodeKind::Comment(text)) => {
				out.push_str("<!--");
				out.push_str(text);
				out.push_str("-->");
			}
			Some(NodeKind::Element { tag, attributes }) => {
				write_open_tag(
					out,
					tag,
					attributes.iter().map(|(n, v)| (n.as_str(), v.as_str())),
				);
				if is_void(tag) {
					return;
				}
				out.push_str(&self.inner_html(node));
				out.push_str("</");
				out.push_str(tag);
				out.push('>');
			}
		}
	}

	/// Writes recorded so far.
	pub fn mutations(&self) -> &[Mutation] {
		&self.mutations
	}

	pub fn take_mutations(&mut self) -> Vec<Mutation> {
		std::mem::take(&mut self.mutations)
	}

	pub fn clear_mutations(&mut self) {
		self.mutations.clear();
	}

	pub fn has_listener(&self, node: NodeId, name: &str) -> bool {
		self.listeners
			.get(&node)
			.is_some_and(|bound| bound.iter().any(|l| l.name == name))
	}

	pub(crate) fn listener(&self, node: NodeId, name: &str) -> Option<(Handler, Option<InstanceKey>)> {
		self.listeners
			.get(&node)?
			.iter()
			.find(|l| l.name == name)
			.map(|l| (l.handler.clone(), l.owner.clone()))
	}

	/// Replaces the listeners bound to `node`.
	pub(crate) fn bind_listeners(&mut self, node: NodeId, listeners: &[Listener]) {
		if listeners.is_empty() {
			self.listeners.remove(&node);
		} else {
			self.listeners.insert(node, listeners.to_vec());
		}
	}

	fn unbind_subtree(&mut self, root: NodeId) {
		if self.listeners.is_empty() {
			return;
		}
		for node in self.descendants(root) {
			self.listeners.remove(&node);
		}
	}

	/// Builds detached nodes for a lowered tree, binding its listeners.
	///
	/// Fragments contribute their items, so one call may return several roots.
	pub(crate) fn build(&mut self, rendered: &Rendered) -> Vec<NodeId> {
		let mut out = Vec::new();
		self.build_into(rendered, &mut out);
		out
	}

	fn build_into(&mut self, rendered: &Rendered, out: &mut Vec<NodeId>) {
		let id = match rendered {
			Rendered::Fragment(items) => {
				for item in items {
					self.build_into(item, out);
				}
				return;
			}
			Rendered::Text(text) => self.create_text(text.clone()),
			Rendered::Placeholder => self.create_comment(ROUTE_PLACEHOLDER),
			Rendered::Element(element) => {
				let id = self.push_node(NodeKind::Element {
					tag: element.tag().to_string(),
					attributes: element.attributes().to_vec(),
				});
				self.bind_listeners(id, element.listeners());
				let mut children = Vec::new();
				for child in element.children() {
					self.build_into(child, &mut children);
				}
				for child in children {
					self.attach(id, child);
				}
				id
			}
		};
		out.push(id);
	}
}

impl fmt::Debug for Document {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("Document")
			.field("nodes", &self.nodes.len())
			.field("mutations", &self.mutations.len())
			.finish()
	}
}
