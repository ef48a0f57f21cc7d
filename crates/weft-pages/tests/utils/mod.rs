//! Shared components and helpers for integration tests.

#![allow(dead_code)]

pub mod components;

use std::cell::RefCell;
use std::rc::Rc;

use weft_pages::ClientRuntime;
use weft_pages::context::Context;
use weft_pages::node::Node;
use weft_pages::ssr::ServerSession;

/// Ordered record of hook calls, shared by the components that write to it.
#[derive(Debug, Clone, Default)]
pub struct HookLog(Rc<RefCell<Vec<String>>>);

impl HookLog {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn push(&self, entry: impl Into<String>) {
		self.0.borrow_mut().push(entry.into());
	}

	pub fn entries(&self) -> Vec<String> {
		self.0.borrow().clone()
	}

	pub fn count(&self, entry: &str) -> usize {
		self.0.borrow().iter().filter(|e| *e == entry).count()
	}

	pub fn clear(&self) {
		self.0.borrow_mut().clear();
	}
}

/// Renders `tree` as a full page for `path`.
pub async fn server_page(tree: &Node, path: &str) -> String {
	let mut session = ServerSession::new(Context::server(path));
	session.render_page(tree).await.unwrap()
}

/// Renders `tree` for `path` on the server and mounts the same tree over the
/// resulting page in a fresh client runtime.
pub async fn hydrate(tree: Node, path: &str) -> ClientRuntime {
	let page = server_page(&tree, path).await;
	let document = weft_pages::dom::Document::parse(&page);
	let mut runtime = ClientRuntime::new(document, &format!("https://example.com{path}"));
	runtime.mount(tree, "app").await.unwrap();
	runtime
}
