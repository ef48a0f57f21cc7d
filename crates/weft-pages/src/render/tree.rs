//! Lowered render trees.
//!
//! A [`Rendered`] tree is what a traversal produces from a node tree: routes
//! resolved, components expanded, handlers split out of the attribute list.
//! It serializes to markup on the server and is patched into the document in
//! the client.

use super::markup::{escape_text, is_raw_text, is_void, write_open_tag};
use crate::component::InstanceKey;
use crate::node::Handler;

/// Comment text of the placeholder left by a route that does not match.
pub const ROUTE_PLACEHOLDER: &str = "weft:route";

/// A listener collected from a handler attribute.
#[derive(Debug, Clone)]
pub struct Listener {
	pub(crate) name: String,
	pub(crate) handler: Handler,
	pub(crate) owner: Option<InstanceKey>,
}

impl Listener {
	/// Attribute name, e.g. `onclick`.
	pub fn name(&self) -> &str {
		&self.name
	}

	/// Instance whose render produced the element.
	pub fn owner(&self) -> Option<&InstanceKey> {
		self.owner.as_ref()
	}
}

/// A lowered node.
#[derive(Debug, Clone)]
pub enum Rendered {
	Element(RenderedElement),
	Text(String),
	/// Slot of a route that does not match.
	Placeholder,
	Fragment(Vec<Rendered>),
}

/// A lowered element.
#[derive(Debug, Clone, Default)]
pub struct RenderedElement {
	tag: String,
	attributes: Vec<(String, String)>,
	listeners: Vec<Listener>,
	children: Vec<Rendered>,
}

impl RenderedElement {
	pub(crate) fn new(tag: impl Into<String>) -> Self {
		Self {
			tag: tag.into(),
			..Self::default()
		}
	}

	pub fn tag(&self) -> &str {
		&self.tag
	}

	pub fn attributes(&self) -> &[(String, String)] {
		&self.attributes
	}

	pub fn attribute(&self, name: &str) -> Option<&str> {
		self.attributes
			.iter()
			.find(|(attr, _)| attr == name)
			.map(|(_, value)| value.as_str())
	}

	pub fn listeners(&self) -> &[Listener] {
		&self.listeners
	}

	pub fn children(&self) -> &[Rendered] {
		&self.children
	}

	pub(crate) fn push_attribute(&mut self, name: String, value: String) {
		self.attributes.push((name, value));
	}

	pub(crate) fn push_listener(&mut self, listener: Listener) {
		self.listeners.push(listener);
	}

	pub(crate) fn push_child(&mut self, child: Rendered) {
		match child {
			Rendered::Fragment(items) => {
				for item in items {
					self.push_child(item);
				}
			}
			child => self.children.push(child),
		}
	}

	pub(crate) fn set_attribute(&mut self, name: &str, value: String) {
		match self.attributes.iter_mut().find(|(attr, _)| attr == name) {
			Some((_, existing)) => *existing = value,
			None => self.attributes.push((name.to_string(), value)),
		}
	}
}

impl Rendered {
	/// Serializes the tree to markup.
	pub fn to_html(&self) -> String {
		let mut out = String::new();
		self.write_html(&mut out, false);
		out
	}

	fn write_html(&self, out: &mut String, raw: bool) {
		match self {
			Self::Text(text) if raw => out.push_str(text),
			Self::Text(text) => out.push_str(&escape_text(text)),
			Self::Placeholder => {
				out.push_str("<!--");
				out.push_str(ROUTE_PLACEHOLDER);
				out.push_str("-->");
			}
			Self::Fragment(items) => {
				for item in items {
					item.write_html(out, raw);
				}
			}
			Self::Element(element) => {
				write_open_tag(
					out,
					&element.tag,
					element
						.attributes
						.iter()
						.map(|(name, value)| (name.as_str(), value.as_str())),
				);
				if is_void(&element.tag) {
					return;
				}
				let raw = is_raw_text(&element.tag);
				for child in &element.children {
					child.write_html(out, raw);
				}
				out.push_str("</");
				out.push_str(&element.tag);
				out.push('>');
			}
		}
	}

	/// Flattens fragments into a list of top-level nodes.
	pub fn flatten(&self) -> Vec<&Rendered> {
		let mut out = Vec::new();
		self.collect_flat(&mut out);
		out
	}

	fn collect_flat<'a>(&'a self, out: &mut Vec<&'a Rendered>) {
		match self {
			Self::Fragment(items) => {
				for item in items {
					item.collect_flat(out);
				}
			}
			node => out.push(node),
		}
	}

	pub fn as_element(&self) -> Option<&RenderedElement> {
		match self {
			Self::Element(element) => Some(element),
			_ => None,
		}
	}

	/// Appends `key` to the marker attribute of the root element.
	///
	/// Nested components whose roots coincide share one element, so the
	/// attribute holds a space-separated list. Returns `false` when the tree
	/// has no single root element.
	pub(crate) fn stamp(&mut self, attribute: &str, key: &InstanceKey) -> bool {
		match self {
			Self::Element(element) => {
				let value = match element.attribute(attribute) {
					Some(existing) if !existing.is_empty() => format!("{existing} {key}"),
					_ => key.to_string(),
				};
				element.set_attribute(attribute, value);
				true
			}
			Self::Fragment(items) if items.len() == 1 => items[0].stamp(attribute, key),
			_ => false,
		}
	}
}

/// Whether a marker attribute value lists `key`.
pub(crate) fn marker_lists(value: &str, key: &str) -> bool {
	value.split_ascii_whitespace().any(|token| token == key)
}
