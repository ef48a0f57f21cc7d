//! The render context shared by every component of a session.
//!
//! A [`Context`] is a cheap handle: clones observe the same values. Reads and
//! writes go through three facets. In the client, writes to the page and router
//! facets are reflected into the host document; on the server they are plain
//! assignments.

mod facets;
mod host;

pub use facets::{PageFacet, PageMeta, ParamsFacet, RouterFacet};
pub use host::Host;

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::fmt;
use std::rc::Rc;

use serde::{Deserialize, Serialize};

use crate::config::DEFAULT_SERVER_ORIGIN;

/// Where a session runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
	Client,
	Server,
}

#[derive(Debug, Default)]
pub(crate) struct ContextState {
	pub(crate) page: PageMeta,
	pub(crate) path: String,
	pub(crate) base: String,
	pub(crate) params: BTreeMap<String, String>,
	pub(crate) navigation_requested: bool,
}

struct Inner {
	environment: Environment,
	origin: String,
	host: Option<Rc<dyn Host>>,
	state: RefCell<ContextState>,
}

/// Shared render context.
#[derive(Clone)]
pub struct Context {
	inner: Rc<Inner>,
}

impl Context {
	/// Creates a server context at `path` with the default origin.
	pub fn server(path: impl Into<String>) -> Self {
		Self::server_with_origin(path, DEFAULT_SERVER_ORIGIN)
	}

	pub fn server_with_origin(path: impl Into<String>, origin: impl Into<String>) -> Self {
		Self::build(Environment::Server, path.into(), origin.into(), None)
	}

	/// Creates a client context whose side effects go to `host`.
	pub fn client(path: impl Into<String>, host: Rc<dyn Host>) -> Self {
		let origin = host.origin();
		Self::build(Environment::Client, path.into(), origin, Some(host))
	}

	fn build(environment: Environment, path: String, origin: String, host: Option<Rc<dyn Host>>) -> Self {
		Self {
			inner: Rc::new(Inner {
				environment,
				origin,
				host,
				state: RefCell::new(ContextState {
					path,
					..ContextState::default()
				}),
			}),
		}
	}

	pub fn environment(&self) -> Environment {
		self.inner.environment
	}

	pub fn is_client(&self) -> bool {
		self.inner.environment == Environment::Client
	}

	pub fn page(&self) -> PageFacet<'_> {
		PageFacet::new(self)
	}

	pub fn router(&self) -> RouterFacet<'_> {
		RouterFacet::new(self)
	}

	pub fn params(&self) -> ParamsFacet<'_> {
		ParamsFacet::new(self)
	}

	/// Whether two handles share the same context.
	pub fn ptr_eq(&self, other: &Context) -> bool {
		Rc::ptr_eq(&self.inner, &other.inner)
	}

	pub(crate) fn origin(&self) -> &str {
		&self.inner.origin
	}

	pub(crate) fn with_state<R>(&self, f: impl FnOnce(&ContextState) -> R) -> R {
		f(&self.inner.state.borrow())
	}

	pub(crate) fn update_state<R>(&self, f: impl FnOnce(&mut ContextState) -> R) -> R {
		f(&mut self.inner.state.borrow_mut())
	}

	/// Runs `f` against the host in the client. No state borrow is held while
	/// the host runs.
	pub(crate) fn with_host(&self, f: impl FnOnce(&dyn Host)) {
		if let Some(host) = &self.inner.host {
			f(host.as_ref());
		}
	}

	/// Returns and clears the navigation request raised by a path write.
	pub(crate) fn take_navigation_request(&self) -> bool {
		self.update_state(|state| std::mem::take(&mut state.navigation_requested))
	}
}

impl fmt::Debug for Context {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		let state = self.inner.state.borrow();
		f.debug_struct("Context")
			.field("environment", &self.inner.environment)
			.field("origin", &self.inner.origin)
			.field("path", &state.path)
			.field("params", &state.params)
			.finish()
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use rstest::rstest;

	#[rstest]
	fn test_clones_share_state() {
		let context = Context::server("/");
		let clone = context.clone();
		clone.page().set_title("Shared");
		assert_eq!(context.page().title(), "Shared");
		assert!(context.ptr_eq(&clone));
		assert!(!context.ptr_eq(&Context::server("/")));
	}

	#[rstest]
	fn test_server_environment() {
		let context = Context::server("/a");
		assert_eq!(context.environment(), Environment::Server);
		assert!(!context.is_client());
		assert_eq!(context.router().path(), "/a");
	}

	#[rstest]
	fn test_server_path_write_does_not_request_navigation() {
		let context = Context::server("/a");
		context.router().set_path("/b");
		assert_eq!(context.router().path(), "/b");
		assert!(!context.take_navigation_request());
	}
}
