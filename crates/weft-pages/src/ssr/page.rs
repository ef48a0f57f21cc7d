//! Full-document assembly around rendered content.

use crate::config::RenderOptions;
use crate::context::PageMeta;
use crate::error::Result;
use crate::hydration::Snapshot;
use crate::render::markup::{escape_attr, escape_text, minify_html};

/// Wraps `content` in a complete HTML document.
///
/// The head carries the page title and description when set. The snapshot
/// script is appended after the container unless disabled or empty.
pub(super) fn assemble(
	content: &str,
	meta: &PageMeta,
	snapshot: &Snapshot,
	options: &RenderOptions,
) -> Result<String> {
	let mut html = String::with_capacity(content.len() + 1024);
	let lang = if meta.locale.is_empty() {
		options.lang.as_str()
	} else {
		meta.locale.as_str()
	};

	html.push_str("<!DOCTYPE html>\n");
	html.push_str(&format!("<html lang=\"{}\">\n", escape_attr(lang)));

	html.push_str("<head>\n");
	html.push_str("<meta charset=\"UTF-8\">\n");
	html.push_str("<meta name=\"viewport\" content=\"width=device-width, initial-scale=1.0\">\n");
	if !meta.title.is_empty() {
		html.push_str(&format!("<title>{}</title>\n", escape_text(&meta.title)));
	}
	if !meta.description.is_empty() {
		html.push_str(&format!(
			"<meta name=\"description\" content=\"{}\">\n",
			escape_attr(&meta.description)
		));
	}
	if let Some(image) = &meta.image {
		html.push_str(&format!(
			"<meta property=\"og:image\" content=\"{}\">\n",
			escape_attr(image)
		));
	}
	html.push_str("</head>\n");

	html.push_str("<body>\n");
	html.push_str(&format!("<div id=\"{}\">", escape_attr(&options.container_id)));
	html.push_str(content);
	html.push_str("</div>\n");

	if options.include_state_script && !snapshot.is_empty() {
		html.push_str(&snapshot.to_script_tag(&options.state_script_id)?);
		html.push('\n');
	}

	html.push_str("</body>\n");
	html.push_str("</html>");

	if options.minify {
		Ok(minify_html(&html))
	} else {
		Ok(html)
	}
}
