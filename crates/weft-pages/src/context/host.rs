//! Host document side effects.

/// Side effects the client context applies to the host document.
///
/// Implemented by [`BrowserHost`](crate::dom::BrowserHost) over the in-memory
/// document; an embedder can supply its own.
pub trait Host {
	/// Origin of the window, e.g. `https://example.com`.
	fn origin(&self) -> String;

	fn set_title(&self, title: &str);

	/// Sets the document's `lang` attribute.
	fn set_language(&self, locale: &str);

	/// Sets the description meta tag's content.
	fn set_description(&self, description: &str);

	/// Records a history entry for `url`.
	fn push_history(&self, url: &str);
}
