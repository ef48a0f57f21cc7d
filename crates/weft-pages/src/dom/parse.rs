//! Lenient markup reader.
//!
//! Reads what the server renderer and page assembly emit: a doctype,
//! comments, void and self-closing elements, quoted and bare attributes,
//! raw-text `script`/`style` content and character references. Unclosed
//! elements are closed at the end of input; stray end tags are ignored.

use super::document::{Document, NodeId, NodeKind};
use crate::render::markup::{decode_entities, is_raw_text, is_void};

pub(super) fn parse_into(document: &mut Document, root: NodeId, input: &str) {
	let mut stack = vec![root];
	let mut rest = input;

	while !rest.is_empty() {
		let parent = stack.last().copied().unwrap_or(root);

		if let Some(after) = rest.strip_prefix("<!--") {
			let (body, tail) = after.split_once("-->").unwrap_or((after, ""));
			let comment = document.push_node(NodeKind::Comment(body.to_string()));
			document.attach(parent, comment);
			rest = tail;
			continue;
		}

		if rest.starts_with("<!") || rest.starts_with("<?") {
			rest = rest.find('>').map_or("", |end| &rest[end + 1..]);
			continue;
		}

		if let Some(after) = rest.strip_prefix("</") {
			let (name, tail) = after.split_once('>').unwrap_or((after, ""));
			let name = name.trim().to_ascii_lowercase();
			if let Some(position) = stack
				.iter()
				.rposition(|id| document.tag(*id) == Some(name.as_str()))
				&& position > 0
			{
				stack.truncate(position);
			}
			rest = tail;
			continue;
		}

		if let Some(tag) = StartTag::read(rest) {
			let element = document.push_node(NodeKind::Element {
				tag: tag.name.clone(),
				attributes: tag.attributes,
			});
			document.attach(parent, element);
			rest = tag.rest;

			if tag.self_closing || is_void(&tag.name) {
				continue;
			}
			if is_raw_text(&tag.name) {
				let (content, tail) = split_raw_text(rest, &tag.name);
				if !content.is_empty() {
					let text = document.push_node(NodeKind::Text(content.to_string()));
					document.attach(element, text);
				}
				rest = tail;
				continue;
			}
			stack.push(element);
			continue;
		}

		// Text runs to the next tag; a `<` that does not open one is literal.
		let first = rest.chars().next().map_or(1, char::len_utf8);
		let end = rest[first..].find('<').map_or(rest.len(), |i| i + first);
		let text = document.push_node(NodeKind::Text(decode_entities(&rest[..end])));
		document.attach(parent, text);
		rest = &rest[end..];
	}
}

/// Splits raw element content from the rest at the matching end tag.
fn split_raw_text<'a>(input: &'a str, tag: &str) -> (&'a str, &'a str) {
	let closing = format!("</{tag}");
	let lower = input.to_ascii_lowercase();
	match lower.find(&closing) {
		Some(start) => {
			let after = &input[start..];
			let tail = after.find('>').map_or("", |end| &after[end + 1..]);
			(&input[..start], tail)
		}
		None => (input, ""),
	}
}

struct StartTag<'a> {
	name: String,
	attributes: Vec<(String, String)>,
	self_closing: bool,
	rest: &'a str,
}

impl<'a> StartTag<'a> {
	fn read(input: &'a str) -> Option<Self> {
		let body = input.strip_prefix('<')?;
		if !body.starts_with(|c: char| c.is_ascii_alphabetic()) {
			return None;
		}
		let name_end = body
			.find(|c: char| !(c.is_ascii_alphanumeric() || c == '-' || c == ':'))
			.unwrap_or(body.len());
		let name = body[..name_end].to_ascii_lowercase();
		let mut cursor = &body[name_end..];
		let mut attributes: Vec<(String, String)> = Vec::new();

		loop {
			cursor = cursor.trim_start();
			if let Some(after) = cursor.strip_prefix("/>") {
				return Some(Self {
					name,
					attributes,
					self_closing: true,
					rest: after,
				});
			}
			if let Some(after) = cursor.strip_prefix('>') {
				return Some(Self {
					name,
					attributes,
					self_closing: false,
					rest: after,
				});
			}
			if cursor.is_empty() {
				return Some(Self {
					name,
					attributes,
					self_closing: false,
					rest: "",
				});
			}
			if let Some(after) = cursor.strip_prefix('/') {
				cursor = after;
				continue;
			}

			let attr_end = cursor
				.find(|c: char| c.is_ascii_whitespace() || c == '=' || c == '>' || c == '/')
				.unwrap_or(cursor.len());
			let attr_name = cursor[..attr_end].to_ascii_lowercase();
			cursor = cursor[attr_end..].trim_start();

			let value = match cursor.strip_prefix('=') {
				Some(after) => {
					let after = after.trim_start();
					let (raw, tail) = match after.chars().next() {
						Some(quote @ ('"' | '\'')) => {
							let inner = &after[1..];
							inner
								.find(quote)
								.map_or((inner, ""), |end| (&inner[..end], &inner[end + 1..]))
						}
						_ => {
							let end = after
								.find(|c: char| c.is_ascii_whitespace() || c == '>')
								.unwrap_or(after.len());
							(&after[..end], &after[end..])
						}
					};
					cursor = tail;
					decode_entities(raw)
				}
				None => String::new(),
			};

			if !attr_name.is_empty() && !attributes.iter().any(|(n, _)| *n == attr_name) {
				attributes.push((attr_name, value));
			}
		}
	}
}
