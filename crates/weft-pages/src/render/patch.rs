//! Reconciliation of mounted nodes against lowered trees.

use tracing::trace;

use super::tree::{ROUTE_PLACEHOLDER, Rendered, RenderedElement};
use crate::dom::{Document, NodeId, NodeKind};

/// Patches `existing` so it matches `new`, returning the node now in its
/// position.
///
/// Elements with the same tag are updated in place: attributes are synced
/// (absent ones removed, differing ones set, equal ones untouched), listeners
/// are rebound and children are reconciled in lock-step. Anything else is
/// replaced wholesale by a fresh copy of `new`.
pub fn patch(document: &mut Document, existing: NodeId, new: &Rendered) -> NodeId {
	let flat = new.flatten();
	match flat.as_slice() {
		[single] => patch_node(document, existing, single),
		_ => replace_with_many(document, existing, new),
	}
}

/// Reconciles the children of `parent` against `new`, position by position.
pub fn patch_children(document: &mut Document, parent: NodeId, new: &[Rendered]) {
	let new: Vec<&Rendered> = new.iter().flat_map(Rendered::flatten).collect();
	let old = document.children(parent).to_vec();

	for index in 0..old.len().max(new.len()) {
		match (old.get(index), new.get(index)) {
			(Some(&existing), Some(next)) => {
				patch_node(document, existing, next);
			}
			(None, Some(next)) => {
				for built in document.build(next) {
					trace!(?parent, ?built, "append child");
					document.append_child(parent, built);
				}
			}
			(Some(&existing), None) => {
				trace!(?parent, ?existing, "remove child");
				document.remove_child(parent, existing);
			}
			(None, None) => break,
		}
	}
}

fn patch_node(document: &mut Document, existing: NodeId, new: &Rendered) -> NodeId {
	match (document.kind(existing), new) {
		(Some(NodeKind::Element { tag, .. }), Rendered::Element(element)) if tag == element.tag() => {
			patch_element(document, existing, element);
			existing
		}
		(Some(NodeKind::Text(current)), Rendered::Text(text)) => {
			if current != text {
				trace!(node = ?existing, "update text");
				document.set_text(existing, text.clone());
			}
			existing
		}
		(Some(NodeKind::Comment(current)), Rendered::Placeholder) => {
			if current != ROUTE_PLACEHOLDER {
				document.set_text(existing, ROUTE_PLACEHOLDER);
			}
			existing
		}
		_ => replace_with_many(document, existing, new),
	}
}

fn patch_element(document: &mut Document, node: NodeId, element: &RenderedElement) {
	let stale: Vec<String> = document
		.attributes(node)
		.iter()
		.filter(|(name, _)| element.attribute(name).is_none())
		.map(|(name, _)| name.clone())
		.collect();
	for name in stale {
		trace!(?node, %name, "remove attribute");
		document.remove_attribute(node, &name);
	}
	for (name, value) in element.attributes() {
		if document.attribute(node, name) != Some(value.as_str()) {
			trace!(?node, %name, "set attribute");
			document.set_attribute(node, name.clone(), value.clone());
		}
	}
	document.bind_listeners(node, element.listeners());
	patch_children(document, node, element.children());
}

/// Replaces `existing` with freshly built nodes. A detached `existing` is
/// left alone and the first built node is returned.
fn replace_with_many(document: &mut Document, existing: NodeId, new: &Rendered) -> NodeId {
	let built = document.build(new);
	let Some(parent) = document.parent(existing) else {
		return built.first().copied().unwrap_or(existing);
	};
	let Some((&first, rest)) = built.split_first() else {
		document.remove_child(parent, existing);
		return parent;
	};
	trace!(?existing, replacement = ?first, "replace node");
	document.replace_child(parent, existing, first);
	let mut index = document
		.children(parent)
		.iter()
		.position(|id| *id == first)
		.unwrap_or(0);
	for &node in rest {
		index += 1;
		document.insert_child(parent, index, node);
	}
	first
}
