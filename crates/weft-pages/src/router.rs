//! Route matching.
//!
//! Patterns are compared segment by segment against the context path.
//! `:name` segments bind a parameter, every other segment must match exactly,
//! and the pattern `*` matches any path without binding anything.

mod matcher;

pub use matcher::{RouteMatch, WILDCARD, apply_route, match_route};
