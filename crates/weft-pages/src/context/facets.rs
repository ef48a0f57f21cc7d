//! Page, router and params facets.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::Context;

/// Document metadata collected during rendering.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageMeta {
	pub title: String,
	pub description: String,
	pub locale: String,
	pub image: Option<String>,
}

/// Title, description, locale and image of the page.
#[derive(Debug, Clone, Copy)]
pub struct PageFacet<'a> {
	context: &'a Context,
}

impl<'a> PageFacet<'a> {
	pub(super) fn new(context: &'a Context) -> Self {
		Self { context }
	}

	pub fn title(&self) -> String {
		self.context.with_state(|state| state.page.title.clone())
	}

	/// Sets the title; in the client also the document title.
	pub fn set_title(&self, title: impl Into<String>) {
		let title = title.into();
		self.context.update_state(|state| state.page.title = title.clone());
		self.context.with_host(|host| host.set_title(&title));
	}

	pub fn description(&self) -> String {
		self.context.with_state(|state| state.page.description.clone())
	}

	/// Sets the description; in the client also the description meta tag.
	pub fn set_description(&self, description: impl Into<String>) {
		let description = description.into();
		self.context
			.update_state(|state| state.page.description = description.clone());
		self.context.with_host(|host| host.set_description(&description));
	}

	pub fn locale(&self) -> String {
		self.context.with_state(|state| state.page.locale.clone())
	}

	/// Sets the locale; in the client also the document language.
	pub fn set_locale(&self, locale: impl Into<String>) {
		let locale = locale.into();
		self.context.update_state(|state| state.page.locale = locale.clone());
		self.context.with_host(|host| host.set_language(&locale));
	}

	pub fn image(&self) -> Option<String> {
		self.context.with_state(|state| state.page.image.clone())
	}

	pub fn set_image(&self, image: impl Into<String>) {
		let image = image.into();
		self.context.update_state(|state| state.page.image = Some(image));
	}

	/// Copies the current metadata.
	pub fn meta(&self) -> PageMeta {
		self.context.with_state(|state| state.page.clone())
	}
}

/// Current path, base and derived URL.
#[derive(Debug, Clone, Copy)]
pub struct RouterFacet<'a> {
	context: &'a Context,
}

impl<'a> RouterFacet<'a> {
	pub(super) fn new(context: &'a Context) -> Self {
		Self { context }
	}

	pub fn path(&self) -> String {
		self.context.with_state(|state| state.path.clone())
	}

	/// Sets the path. In the client this pushes a history entry and requests a
	/// full route re-render.
	pub fn set_path(&self, path: impl Into<String>) {
		let path = path.into();
		let client = self.context.is_client();
		self.context.update_state(|state| {
			state.path = path;
			if client {
				state.navigation_requested = true;
			}
		});
		if client {
			let url = self.url();
			debug!(%url, "navigation requested");
			self.context.with_host(|host| host.push_history(&url));
		}
	}

	pub fn base(&self) -> String {
		self.context.with_state(|state| state.base.clone())
	}

	pub fn set_base(&self, base: impl Into<String>) {
		let base = base.into();
		self.context.update_state(|state| state.base = base);
	}

	/// Absolute URL built from origin, base and path.
	pub fn url(&self) -> String {
		let origin = self.context.origin().trim_end_matches('/');
		self.context.with_state(|state| {
			let base = state.base.trim_matches('/');
			let path = state.path.trim_start_matches('/');
			let mut url = String::from(origin);
			if !base.is_empty() {
				url.push('/');
				url.push_str(base);
			}
			url.push('/');
			url.push_str(path);
			url
		})
	}
}

/// Route parameters bound by the matcher.
#[derive(Debug, Clone, Copy)]
pub struct ParamsFacet<'a> {
	context: &'a Context,
}

impl<'a> ParamsFacet<'a> {
	pub(super) fn new(context: &'a Context) -> Self {
		Self { context }
	}

	pub fn get(&self, name: &str) -> Option<String> {
		self.context.with_state(|state| state.params.get(name).cloned())
	}

	pub fn set(&self, name: impl Into<String>, value: impl Into<String>) {
		let (name, value) = (name.into(), value.into());
		self.context.update_state(|state| {
			state.params.insert(name, value);
		});
	}

	pub fn remove(&self, name: &str) -> Option<String> {
		self.context.update_state(|state| state.params.remove(name))
	}

	pub fn clear(&self) {
		self.context.update_state(|state| state.params.clear());
	}

	pub fn all(&self) -> BTreeMap<String, String> {
		self.context.with_state(|state| state.params.clone())
	}

	pub fn is_empty(&self) -> bool {
		self.context.with_state(|state| state.params.is_empty())
	}
}
