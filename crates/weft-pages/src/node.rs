//! The node model.
//!
//! A render tree is built from four kinds of node: primitives (text and
//! numbers), elements, component instantiations and fragments. Elements and
//! components may carry a route pattern; a route that does not match the
//! current path renders an inert placeholder instead of the subtree.
//!
//! ```
//! use weft_pages::node::{ElementNode, Node};
//!
//! let node: Node = ElementNode::new("ul")
//!     .attr("class", "menu")
//!     .child(ElementNode::new("li").child("Home"))
//!     .child(ElementNode::new("li").child("Profile").route("/profile/:id"))
//!     .into();
//! assert!(matches!(node, Node::Element(_)));
//! ```

mod attr;
mod builder;

pub use attr::{AttrValue, Event, Handler, format_number};
pub use builder::{Target, h};

use serde::Serialize;

use crate::component::{ComponentType, InstanceKey};
use crate::error::Result;
use crate::reactive::Reactive;
use crate::state::Props;

/// Attribute name that carries a route pattern.
pub const ROUTE_ATTRIBUTE: &str = "route";

/// Attribute name that carries a component instance key.
pub const KEY_ATTRIBUTE: &str = "key";

/// A node of a render tree.
#[derive(Debug, Clone)]
pub enum Node {
	Primitive(Primitive),
	Element(ElementNode),
	Component(ComponentNode),
	/// An ordered group of nodes without a wrapping element.
	Fragment(Vec<Node>),
}

impl Node {
	pub fn text(text: impl Into<String>) -> Self {
		Self::Primitive(Primitive::Text(text.into()))
	}

	/// A node that renders nothing.
	pub fn empty() -> Self {
		Self::Fragment(Vec::new())
	}

	/// Collapses a child list: one child stands for itself, anything else
	/// becomes a fragment.
	pub fn group(mut children: Vec<Node>) -> Self {
		if children.len() == 1
			&& let Some(only) = children.pop()
		{
			return only;
		}
		Self::Fragment(children)
	}

	/// Returns the route pattern carried by the node.
	pub fn route(&self) -> Option<&str> {
		match self {
			Self::Element(element) => element.route_pattern(),
			Self::Component(component) => component.route_pattern(),
			Self::Primitive(_) | Self::Fragment(_) => None,
		}
	}
}

/// A text or numeric leaf.
#[derive(Debug, Clone, PartialEq)]
pub enum Primitive {
	Text(String),
	Int(i64),
	Float(f64),
}

impl Primitive {
	/// Returns the unescaped text content of the leaf.
	pub fn to_text(&self) -> String {
		match self {
			Self::Text(text) => text.clone(),
			Self::Int(n) => n.to_string(),
			Self::Float(n) => format_number(*n),
		}
	}
}

/// An HTML element with attributes, children and an optional route.
#[derive(Debug, Clone)]
pub struct ElementNode {
	tag: String,
	attributes: Vec<(String, AttrValue)>,
	children: Vec<Node>,
	route: Option<String>,
}

impl ElementNode {
	/// Creates an element. Tags are case-insensitive and stored lowercase.
	pub fn new(tag: impl Into<String>) -> Self {
		Self {
			tag: tag.into().to_ascii_lowercase(),
			attributes: Vec::new(),
			children: Vec::new(),
			route: None,
		}
	}

	/// Sets an attribute. The `route` attribute is lifted into the route field.
	pub fn attr(mut self, name: impl Into<String>, value: impl Into<AttrValue>) -> Self {
		self.set_attr(name.into(), value.into());
		self
	}

	/// Binds a handler for `event` (with or without the `on` prefix).
	pub fn on<F>(self, event: &str, handler: F) -> Self
	where
		F: Fn(&mut Reactive<'_>, &Event) -> Result<()> + 'static,
	{
		let name = if event.starts_with("on") {
			event.to_string()
		} else {
			format!("on{event}")
		};
		self.attr(name, Handler::new(handler))
	}

	/// Appends a child. Fragments are flattened into the child list.
	pub fn child(mut self, child: impl Into<Node>) -> Self {
		self.push_child(child.into());
		self
	}

	pub fn children<I, N>(mut self, children: I) -> Self
	where
		I: IntoIterator<Item = N>,
		N: Into<Node>,
	{
		for child in children {
			self.push_child(child.into());
		}
		self
	}

	/// Restricts the element to paths matching `pattern`.
	pub fn route(mut self, pattern: impl Into<String>) -> Self {
		self.route = Some(pattern.into());
		self
	}

	pub fn tag(&self) -> &str {
		&self.tag
	}

	pub fn attributes(&self) -> &[(String, AttrValue)] {
		&self.attributes
	}

	pub fn attribute(&self, name: &str) -> Option<&AttrValue> {
		self.attributes
			.iter()
			.find(|(attr, _)| attr == name)
			.map(|(_, value)| value)
	}

	pub fn child_nodes(&self) -> &[Node] {
		&self.children
	}

	pub fn route_pattern(&self) -> Option<&str> {
		self.route.as_deref()
	}

	pub(crate) fn set_attr(&mut self, name: String, value: AttrValue) {
		if name == ROUTE_ATTRIBUTE
			&& let Some(pattern) = value.as_text()
		{
			self.route = Some(pattern.to_string());
			return;
		}
		match self.attributes.iter_mut().find(|(attr, _)| *attr == name) {
			Some((_, existing)) => *existing = value,
			None => self.attributes.push((name, value)),
		}
	}

	pub(crate) fn push_child(&mut self, child: Node) {
		match child {
			Node::Fragment(nodes) => {
				for node in nodes {
					self.push_child(node);
				}
			}
			node => self.children.push(node),
		}
	}
}

/// An instantiation of a component type.
#[derive(Debug, Clone)]
pub struct ComponentNode {
	component: ComponentType,
	props: Props,
	children: Vec<Node>,
	key: Option<String>,
	route: Option<String>,
}

impl ComponentNode {
	pub fn new(component: &ComponentType) -> Self {
		Self {
			component: component.clone(),
			props: Props::new(),
			children: Vec::new(),
			key: None,
			route: None,
		}
	}

	/// Sets a prop. Values that cannot be encoded as JSON are skipped.
	pub fn prop(mut self, name: impl Into<String>, value: impl Serialize) -> Self {
		self.props = self.props.with(name, value);
		self
	}

	pub fn props(mut self, props: Props) -> Self {
		self.props = props;
		self
	}

	/// Distinguishes sibling instances of the same component type.
	pub fn key(mut self, key: impl Into<String>) -> Self {
		self.key = Some(key.into());
		self
	}

	pub fn route(mut self, pattern: impl Into<String>) -> Self {
		self.route = Some(pattern.into());
		self
	}

	/// Passes child nodes through to the component's render scope.
	pub fn child(mut self, child: impl Into<Node>) -> Self {
		match child.into() {
			Node::Fragment(nodes) => self.children.extend(nodes),
			node => self.children.push(node),
		}
		self
	}

	pub fn component(&self) -> &ComponentType {
		&self.component
	}

	pub fn prop_values(&self) -> &Props {
		&self.props
	}

	pub fn child_nodes(&self) -> &[Node] {
		&self.children
	}

	pub fn key_value(&self) -> Option<&str> {
		self.key.as_deref()
	}

	pub fn route_pattern(&self) -> Option<&str> {
		self.route.as_deref()
	}

	/// The registry key of the instance this node resolves to.
	pub fn instance_key(&self) -> InstanceKey {
		match &self.key {
			Some(key) => InstanceKey::keyed(self.component.fingerprint().clone(), key.clone()),
			None => InstanceKey::new(self.component.fingerprint().clone()),
		}
	}
}

impl From<&str> for Node {
	fn from(value: &str) -> Self {
		Self::text(value)
	}
}

impl From<String> for Node {
	fn from(value: String) -> Self {
		Self::text(value)
	}
}

impl From<i64> for Node {
	fn from(value: i64) -> Self {
		Self::Primitive(Primitive::Int(value))
	}
}

impl From<i32> for Node {
	fn from(value: i32) -> Self {
		Self::Primitive(Primitive::Int(i64::from(value)))
	}
}

impl From<u32> for Node {
	fn from(value: u32) -> Self {
		Self::Primitive(Primitive::Int(i64::from(value)))
	}
}

impl From<f64> for Node {
	fn from(value: f64) -> Self {
		Self::Primitive(Primitive::Float(value))
	}
}

impl From<ElementNode> for Node {
	fn from(value: ElementNode) -> Self {
		Self::Element(value)
	}
}

impl From<ComponentNode> for Node {
	fn from(value: ComponentNode) -> Self {
		Self::Component(value)
	}
}

impl From<Vec<Node>> for Node {
	fn from(value: Vec<Node>) -> Self {
		Self::Fragment(value)
	}
}

impl<T: Into<Node>> From<Option<T>> for Node {
	fn from(value: Option<T>) -> Self {
		value.map_or_else(Node::empty, Into::into)
	}
}
