//! Segment matcher.

use std::collections::BTreeMap;

use tracing::trace;

use crate::context::Context;

/// Pattern that matches every path.
pub const WILDCARD: &str = "*";

/// Outcome of matching one pattern against one path.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RouteMatch {
	pub matches: bool,
	pub params: BTreeMap<String, String>,
}

impl RouteMatch {
	fn miss() -> Self {
		Self::default()
	}
}

fn segments(path: &str) -> Vec<&str> {
	path.split('/').filter(|segment| !segment.is_empty()).collect()
}

/// Matches `pattern` against `path`.
///
/// Empty segments are ignored, so leading and trailing slashes do not matter.
/// A parameter bound twice keeps the later segment. This function treats `*`
/// as a literal; [`apply_route`] handles the wildcard before calling it.
pub fn match_route(pattern: &str, path: &str) -> RouteMatch {
	let expected = segments(pattern);
	let actual = segments(path);
	if expected.len() != actual.len() {
		return RouteMatch::miss();
	}

	let mut params = BTreeMap::new();
	for (want, got) in expected.iter().zip(&actual) {
		match want.strip_prefix(':') {
			Some(name) => {
				params.insert(name.to_string(), (*got).to_string());
			}
			None if want == got => {}
			None => return RouteMatch::miss(),
		}
	}

	RouteMatch {
		matches: true,
		params,
	}
}

/// Tests `pattern` against the context path and writes bound parameters into
/// the params facet on success.
pub fn apply_route(pattern: &str, context: &Context) -> bool {
	if pattern == WILDCARD {
		return true;
	}
	let path = context.router().path();
	let result = match_route(pattern, &path);
	trace!(pattern, %path, matches = result.matches, "route check");
	if result.matches {
		let params = context.params();
		for (name, value) in result.params {
			params.set(name, value);
		}
	}
	result.matches
}

#[cfg(test)]
mod tests {
	use super::*;
	use rstest::rstest;

	#[rstest]
	#[case("/profile/:id", "/profile/42", true)]
	#[case("/profile/:id", "/profile", false)]
	#[case("/profile/:id", "/profile/42/edit", false)]
	#[case("/about", "/about/", true)]
	#[case("about", "/about", true)]
	#[case("/", "", true)]
	#[case("/a/b", "/a/c", false)]
	#[case("*", "/*", true)]
	#[case("*", "/anything", false)]
	fn test_match_route(#[case] pattern: &str, #[case] path: &str, #[case] expected: bool) {
		assert_eq!(match_route(pattern, path).matches, expected);
	}

	#[rstest]
	fn test_binds_parameters() {
		let result = match_route("/users/:user/posts/:post", "/users/7/posts/hello");
		assert!(result.matches);
		assert_eq!(result.params.get("user").map(String::as_str), Some("7"));
		assert_eq!(result.params.get("post").map(String::as_str), Some("hello"));
	}

	#[rstest]
	fn test_collision_last_write_wins() {
		let result = match_route("/:id/:id", "/first/second");
		assert_eq!(result.params.get("id").map(String::as_str), Some("second"));
	}

	#[rstest]
	fn test_miss_binds_nothing() {
		let result = match_route("/:a/x", "/1/y");
		assert!(!result.matches);
		assert!(result.params.is_empty());
	}

	#[rstest]
	fn test_apply_route_writes_params() {
		let context = Context::server("/profile/42");
		assert!(apply_route("/profile/:id", &context));
		assert_eq!(context.params().get("id").as_deref(), Some("42"));

		assert!(!apply_route("/settings/:tab", &context));
		assert_eq!(context.params().get("tab"), None);
	}

	#[rstest]
	fn test_apply_route_wildcard() {
		let context = Context::server("/deep/nested/path");
		assert!(apply_route(WILDCARD, &context));
		assert!(context.params().is_empty());
	}
}
