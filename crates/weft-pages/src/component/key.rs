//! Fingerprints and instance keys.

use std::borrow::Cow;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Build-time identifier of a component type.
///
/// `:` separates a fingerprint from a sibling key and whitespace separates
/// tokens of the marker attribute, so neither may appear in a fingerprint.
/// [`Fingerprint::is_valid`] checks a candidate.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Fingerprint(Cow<'static, str>);

impl Fingerprint {
	pub const fn from_static(value: &'static str) -> Self {
		Self(Cow::Borrowed(value))
	}

	pub fn new(value: impl Into<String>) -> Self {
		Self(Cow::Owned(value.into()))
	}

	pub fn as_str(&self) -> &str {
		&self.0
	}

	/// Whether `value` is non-empty and free of `:` and ASCII whitespace.
	pub const fn is_valid(value: &str) -> bool {
		let bytes = value.as_bytes();
		if bytes.is_empty() {
			return false;
		}
		let mut i = 0;
		while i < bytes.len() {
			if bytes[i] == b':' || bytes[i].is_ascii_whitespace() {
				return false;
			}
			i += 1;
		}
		true
	}
}

impl From<&'static str> for Fingerprint {
	fn from(value: &'static str) -> Self {
		Self::from_static(value)
	}
}

impl From<String> for Fingerprint {
	fn from(value: String) -> Self {
		Self::new(value)
	}
}

impl AsRef<str> for Fingerprint {
	fn as_ref(&self) -> &str {
		self.as_str()
	}
}

impl fmt::Display for Fingerprint {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(&self.0)
	}
}

/// Registry key of one instance: a fingerprint plus an optional sibling key.
///
/// Renders as `fingerprint` or `fingerprint:key`; that text is what the
/// snapshot and the marker attribute carry.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct InstanceKey {
	fingerprint: Fingerprint,
	key: Option<String>,
}

impl InstanceKey {
	pub fn new(fingerprint: impl Into<Fingerprint>) -> Self {
		Self {
			fingerprint: fingerprint.into(),
			key: None,
		}
	}

	pub fn keyed(fingerprint: impl Into<Fingerprint>, key: impl Into<String>) -> Self {
		Self {
			fingerprint: fingerprint.into(),
			key: Some(key.into()),
		}
	}

	/// Reads a key back from its display form.
	pub fn parse(value: &str) -> Self {
		match value.split_once(':') {
			Some((fingerprint, key)) => Self::keyed(fingerprint.to_string(), key),
			None => Self::new(value.to_string()),
		}
	}

	pub fn fingerprint(&self) -> &Fingerprint {
		&self.fingerprint
	}

	pub fn key(&self) -> Option<&str> {
		self.key.as_deref()
	}
}

impl fmt::Display for InstanceKey {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match &self.key {
			Some(key) => write!(f, "{}:{}", self.fingerprint, key),
			None => write!(f, "{}", self.fingerprint),
		}
	}
}
