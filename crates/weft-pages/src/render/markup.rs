//! Escaping and markup helpers.

/// Elements that never have children or a closing tag.
pub const VOID_ELEMENTS: &[&str] = &[
	"area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "source", "track",
	"wbr",
];

/// Elements whose content is emitted and parsed verbatim.
pub const RAW_TEXT_ELEMENTS: &[&str] = &["script", "style"];

pub fn is_void(tag: &str) -> bool {
	VOID_ELEMENTS.contains(&tag)
}

pub fn is_raw_text(tag: &str) -> bool {
	RAW_TEXT_ELEMENTS.contains(&tag)
}

/// Escapes text content.
pub fn escape_text(s: &str) -> String {
	let mut out = String::with_capacity(s.len());
	for c in s.chars() {
		match c {
			'&' => out.push_str("&amp;"),
			'<' => out.push_str("&lt;"),
			'>' => out.push_str("&gt;"),
			_ => out.push(c),
		}
	}
	out
}

/// Escapes a double-quoted attribute value.
pub fn escape_attr(s: &str) -> String {
	let mut out = String::with_capacity(s.len());
	for c in s.chars() {
		match c {
			'&' => out.push_str("&amp;"),
			'<' => out.push_str("&lt;"),
			'>' => out.push_str("&gt;"),
			'"' => out.push_str("&quot;"),
			'\'' => out.push_str("&#x27;"),
			_ => out.push(c),
		}
	}
	out
}

/// Escapes JSON for embedding in a `<script>` element.
///
/// `</` becomes `<\/` so the payload cannot close the script element; JSON
/// string parsing reads the sequence back unchanged.
pub fn escape_json_for_script(json: &str) -> String {
	json.replace("</", "<\\/")
}

/// Writes `<tag attrs>` for an element.
pub(crate) fn write_open_tag<'a, I>(out: &mut String, tag: &str, attributes: I)
where
	I: IntoIterator<Item = (&'a str, &'a str)>,
{
	out.push('<');
	out.push_str(tag);
	for (name, value) in attributes {
		out.push(' ');
		out.push_str(name);
		if !value.is_empty() {
			out.push_str("=\"");
			out.push_str(&escape_attr(value));
			out.push('"');
		}
	}
	out.push('>');
}

/// Decodes the character references the serializer emits plus the common
/// named ones. Unknown references are kept verbatim.
pub fn decode_entities(s: &str) -> String {
	if !s.contains('&') {
		return s.to_string();
	}
	let mut out = String::with_capacity(s.len());
	let mut rest = s;
	while let Some(start) = rest.find('&') {
		out.push_str(&rest[..start]);
		let tail = &rest[start..];
		match tail.find(';').filter(|end| *end <= 10) {
			Some(end) => {
				let name = &tail[1..end];
				match decode_reference(name) {
					Some(c) => out.push(c),
					None => out.push_str(&tail[..=end]),
				}
				rest = &tail[end + 1..];
			}
			None => {
				out.push('&');
				rest = &tail[1..];
			}
		}
	}
	out.push_str(rest);
	out
}

fn decode_reference(name: &str) -> Option<char> {
	match name {
		"amp" => Some('&'),
		"lt" => Some('<'),
		"gt" => Some('>'),
		"quot" => Some('"'),
		"apos" => Some('\''),
		"nbsp" => Some('\u{a0}'),
		_ => {
			let digits = name.strip_prefix('#')?;
			let code = match digits.strip_prefix(['x', 'X']) {
				Some(hex) => u32::from_str_radix(hex, 16).ok()?,
				None => digits.parse().ok()?,
			};
			char::from_u32(code)
		}
	}
}

/// Inputs above this size are returned unmodified by [`minify_html`].
const MINIFY_HTML_MAX_INPUT_SIZE: usize = 1024 * 1024;

/// Collapses whitespace runs in text between tags.
///
/// Tags are copied as written. The bodies of `pre` and `textarea` and of the
/// raw text elements are copied verbatim up to their closing tag, so embedded
/// JSON and preformatted text keep their whitespace.
pub fn minify_html(html: &str) -> String {
	if html.len() > MINIFY_HTML_MAX_INPUT_SIZE {
		return html.to_string();
	}

	let mut out = String::with_capacity(html.len());
	let mut rest = html;
	while let Some(start) = rest.find('<') {
		collapse_whitespace(&mut out, &rest[..start]);
		rest = &rest[start..];
		let tag_len = rest.find('>').map_or(rest.len(), |end| end + 1);
		let (tag, after) = rest.split_at(tag_len);
		out.push_str(tag);
		rest = after;

		if let Some(name) = verbatim_body(tag) {
			let body_len = rest.find(&format!("</{name}")).unwrap_or(rest.len());
			let (body, after) = rest.split_at(body_len);
			out.push_str(body);
			rest = after;
		}
	}
	collapse_whitespace(&mut out, rest);
	out
}

fn collapse_whitespace(out: &mut String, text: &str) {
	let mut in_run = false;
	for c in text.chars() {
		if c.is_whitespace() {
			if !in_run {
				out.push(' ');
			}
			in_run = true;
		} else {
			out.push(c);
			in_run = false;
		}
	}
}

/// Name of the element an opening `tag` starts when its body must not be
/// minified.
fn verbatim_body(tag: &str) -> Option<&str> {
	let inner = tag.strip_prefix('<')?;
	let name_len = inner
		.find(|c: char| c == '>' || c == '/' || c.is_ascii_whitespace())
		.unwrap_or(inner.len());
	let name = &inner[..name_len];
	(matches!(name, "pre" | "textarea") || is_raw_text(name)).then_some(name)
}

#[cfg(test)]
mod tests {
	use super::*;
	use rstest::rstest;

	#[rstest]
	fn test_escape_text() {
		assert_eq!(escape_text("a < b & \"c\""), "a &lt; b &amp; \"c\"");
	}

	#[rstest]
	fn test_escape_attr() {
		assert_eq!(
			escape_attr(r#"x" onload='y'"#),
			"x&quot; onload=&#x27;y&#x27;"
		);
	}

	#[rstest]
	#[case("&lt;b&gt;", "<b>")]
	#[case("a &amp; b", "a & b")]
	#[case("&#x27;&#39;", "''")]
	#[case("&unknown; &", "&unknown; &")]
	#[case("fish &chips", "fish &chips")]
	fn test_decode_entities(#[case] input: &str, #[case] expected: &str) {
		assert_eq!(decode_entities(input), expected);
	}

	#[rstest]
	fn test_escape_json_for_script() {
		let json = r#"{"html":"</script><script>alert(1)</script>"}"#;
		let escaped = escape_json_for_script(json);
		assert!(!escaped.contains("</script>"));
		let decoded: serde_json::Value = serde_json::from_str(&escaped).unwrap();
		assert_eq!(decoded["html"], "</script><script>alert(1)</script>");
	}

	#[rstest]
	fn test_minify_preserves_pre() {
		let html = "<div>\n    <p>a</p>\n</div><pre>  x\n  y</pre>";
		assert_eq!(minify_html(html), "<div> <p>a</p> </div><pre>  x\n  y</pre>");
	}

	#[rstest]
	#[case(
		"<body>\n  <script id=\"s\" type=\"application/json\">{\"a\":\"x    y\"}</script>\n</body>",
		"<body> <script id=\"s\" type=\"application/json\">{\"a\":\"x    y\"}</script> </body>"
	)]
	#[case("<textarea>  a\n b</textarea>  <br>", "<textarea>  a\n b</textarea> <br>")]
	#[case("<style>p  { color: red }</style>", "<style>p  { color: red }</style>")]
	#[case("<p title=\"a  b\">c   d</p>", "<p title=\"a  b\">c d</p>")]
	#[case("<pre>unterminated   body", "<pre>unterminated   body")]
	fn test_minify_keeps_verbatim_bodies(#[case] html: &str, #[case] expected: &str) {
		assert_eq!(minify_html(html), expected);
	}

	#[rstest]
	fn test_minify_skips_oversized_input() {
		let html = format!("<p>{}</p>", "a  ".repeat(MINIFY_HTML_MAX_INPUT_SIZE));
		assert_eq!(minify_html(&html), html);
	}

	#[rstest]
	fn test_open_tag_bare_boolean() {
		let mut out = String::new();
		write_open_tag(&mut out, "input", [("disabled", ""), ("value", "a\"b")]);
		assert_eq!(out, "<input disabled value=\"a&quot;b\">");
	}
}
