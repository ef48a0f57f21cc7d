//! Node factory.

use tracing::warn;

use super::{AttrValue, ComponentNode, ElementNode, KEY_ATTRIBUTE, Node, ROUTE_ATTRIBUTE};
use crate::component::ComponentType;

/// What [`h`] instantiates: an element tag or a component type.
#[derive(Debug, Clone)]
pub enum Target {
	Tag(String),
	Component(ComponentType),
}

impl From<&str> for Target {
	fn from(value: &str) -> Self {
		Self::Tag(value.to_string())
	}
}

impl From<String> for Target {
	fn from(value: String) -> Self {
		Self::Tag(value)
	}
}

impl From<&ComponentType> for Target {
	fn from(value: &ComponentType) -> Self {
		Self::Component(value.clone())
	}
}

impl From<ComponentType> for Target {
	fn from(value: ComponentType) -> Self {
		Self::Component(value)
	}
}

/// Builds a node from a target, an attribute list and children.
///
/// For elements, `route` is lifted out of the attributes and fragment children
/// are flattened. For components, `route` and `key` are lifted and the
/// remaining attributes become props.
///
/// ```
/// use weft_pages::node::{h, Node};
///
/// let node = h("p", vec![("class", "lead".into())], vec!["Hello".into()]);
/// assert!(matches!(node, Node::Element(_)));
/// ```
pub fn h(target: impl Into<Target>, attributes: Vec<(&str, AttrValue)>, children: Vec<Node>) -> Node {
	match target.into() {
		Target::Tag(tag) => {
			let mut element = ElementNode::new(tag);
			for (name, value) in attributes {
				element.set_attr(name.to_string(), value);
			}
			for child in children {
				element.push_child(child);
			}
			Node::Element(element)
		}
		Target::Component(component) => {
			let mut node = ComponentNode::new(&component);
			for (name, value) in attributes {
				node = match (name, value.as_text()) {
					(ROUTE_ATTRIBUTE, Some(pattern)) => node.route(pattern),
					(KEY_ATTRIBUTE, Some(key)) => node.key(key),
					_ => match value.to_json() {
						Some(json) => node.prop(name, json),
						None => {
							warn!(
								component = component.name(),
								prop = name,
								"handler props are not supported on components"
							);
							node
						}
					},
				};
			}
			node.child(Node::Fragment(children)).into()
		}
	}
}
