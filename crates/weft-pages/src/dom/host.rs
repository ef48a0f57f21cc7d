//! Host implementation over the in-memory document.

use std::cell::RefCell;
use std::rc::Rc;

use tracing::warn;

use super::document::{Document, NodeId};
use crate::context::Host;

/// Document shared between the runtime and its host.
pub type SharedDocument = Rc<RefCell<Document>>;

/// Applies page and router side effects to a [`Document`] and records
/// history entries.
#[derive(Debug)]
pub struct BrowserHost {
	document: SharedDocument,
	origin: String,
	history: RefCell<Vec<String>>,
}

impl BrowserHost {
	pub fn new(document: SharedDocument, origin: impl Into<String>) -> Self {
		Self {
			document,
			origin: origin.into(),
			history: RefCell::new(Vec::new()),
		}
	}

	/// History entries pushed so far, oldest first.
	pub fn history(&self) -> Vec<String> {
		self.history.borrow().clone()
	}

	fn edit(&self, what: &str, f: impl FnOnce(&mut Document)) {
		match self.document.try_borrow_mut() {
			Ok(mut document) => f(&mut document),
			Err(_) => warn!(what, "document is busy; host update skipped"),
		}
	}
}

fn head(document: &mut Document) -> NodeId {
	if let Some(head) = document.find_by_tag("head") {
		return head;
	}
	let head = document.create_element("head");
	let parent = document.find_by_tag("html").unwrap_or(document.root());
	document.insert_child(parent, 0, head);
	head
}

impl Host for BrowserHost {
	fn origin(&self) -> String {
		self.origin.clone()
	}

	fn set_title(&self, title: &str) {
		self.edit("title", |document| {
			let node = match document.find_by_tag("title") {
				Some(node) => node,
				None => {
					let node = document.create_element("title");
					let head = head(document);
					document.append_child(head, node);
					node
				}
			};
			document.set_text_content(node, title);
		});
	}

	fn set_language(&self, locale: &str) {
		self.edit("lang", |document| {
			if let Some(html) = document.find_by_tag("html")
				&& document.attribute(html, "lang") != Some(locale)
			{
				document.set_attribute(html, "lang", locale);
			}
		});
	}

	fn set_description(&self, description: &str) {
		self.edit("description", |document| {
			let node = match document.find_by_attribute("name", "description") {
				Some(node) => node,
				None => {
					let node = document.create_element("meta");
					document.set_attribute(node, "name", "description");
					let head = head(document);
					document.append_child(head, node);
					node
				}
			};
			document.set_attribute(node, "content", description);
		});
	}

	fn push_history(&self, url: &str) {
		self.history.borrow_mut().push(url.to_string());
	}
}
