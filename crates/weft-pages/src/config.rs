//! Render options shared by the server session and the client runtime.

use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Default id of the element the client mounts into.
pub const DEFAULT_CONTAINER_ID: &str = "app";

/// Default attribute that carries instance keys on component root elements.
pub const DEFAULT_MARKER_ATTRIBUTE: &str = "data-weft-id";

/// Default id of the embedded hydration snapshot script.
pub const DEFAULT_STATE_SCRIPT_ID: &str = "weft-state";

/// Origin assumed on the server when none is configured.
pub const DEFAULT_SERVER_ORIGIN: &str = "http://localhost";

/// Options for rendering and hydration.
///
/// Every field has a default, so a partial TOML table is enough:
///
/// ```
/// use weft_pages::RenderOptions;
///
/// let options = RenderOptions::from_toml_str("lang = \"ja\"\nminify = true").unwrap();
/// assert_eq!(options.lang, "ja");
/// assert_eq!(options.container_id, "app");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderOptions {
	/// Id of the container element.
	pub container_id: String,
	/// Name of the marker attribute stamped on component roots in the client.
	pub marker_attribute: String,
	/// Id of the JSON state script.
	pub state_script_id: String,
	/// Whether to embed the snapshot script in full pages.
	pub include_state_script: bool,
	/// Whether to minify full pages.
	pub minify: bool,
	/// Language attribute used when the page facet has no locale.
	pub lang: String,
	/// Origin used for absolute URLs on the server.
	pub server_origin: String,
}

impl Default for RenderOptions {
	fn default() -> Self {
		Self {
			container_id: DEFAULT_CONTAINER_ID.to_string(),
			marker_attribute: DEFAULT_MARKER_ATTRIBUTE.to_string(),
			state_script_id: DEFAULT_STATE_SCRIPT_ID.to_string(),
			include_state_script: true,
			minify: false,
			lang: "en".to_string(),
			server_origin: DEFAULT_SERVER_ORIGIN.to_string(),
		}
	}
}

impl RenderOptions {
	/// Creates new default options.
	pub fn new() -> Self {
		Self::default()
	}

	/// Parses options from a TOML document.
	pub fn from_toml_str(source: &str) -> Result<Self> {
		Ok(toml::from_str(source)?)
	}

	/// Sets the container id.
	pub fn container(mut self, id: impl Into<String>) -> Self {
		self.container_id = id.into();
		self
	}

	/// Sets the marker attribute name.
	pub fn marker(mut self, attribute: impl Into<String>) -> Self {
		self.marker_attribute = attribute.into();
		self
	}

	/// Sets the state script id.
	pub fn state_script(mut self, id: impl Into<String>) -> Self {
		self.state_script_id = id.into();
		self
	}

	/// Disables the embedded snapshot script.
	pub fn no_state_script(mut self) -> Self {
		self.include_state_script = false;
		self
	}

	/// Enables minification.
	pub fn minify(mut self) -> Self {
		self.minify = true;
		self
	}

	/// Sets the language.
	pub fn lang(mut self, lang: impl Into<String>) -> Self {
		self.lang = lang.into();
		self
	}

	/// Sets the server origin.
	pub fn origin(mut self, origin: impl Into<String>) -> Self {
		self.server_origin = origin.into();
		self
	}
}
