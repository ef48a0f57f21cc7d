//! Field records for component state and props.
//!
//! Both records are string-keyed maps of JSON values, so they serialize
//! directly into the hydration snapshot and compare structurally when the
//! runtime decides whether an instance must be reinitiated.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

macro_rules! impl_field_record {
	($name:ident) => {
		impl $name {
			/// Creates an empty record.
			pub fn new() -> Self {
				Self::default()
			}

			/// Adds a field, skipping values that cannot be represented as JSON.
			pub fn with(mut self, field: impl Into<String>, value: impl Serialize) -> Self {
				if let Ok(value) = serde_json::to_value(value) {
					self.fields.insert(field.into(), value);
				}
				self
			}

			/// Returns the raw value of a field.
			pub fn read(&self, field: &str) -> Option<&Value> {
				self.fields.get(field)
			}

			/// Returns a field decoded into `T`.
			pub fn get<T: DeserializeOwned>(&self, field: &str) -> Option<T> {
				self.fields
					.get(field)
					.and_then(|value| serde_json::from_value(value.clone()).ok())
			}

			/// Stores a raw value, returning the previous one.
			pub fn insert(&mut self, field: impl Into<String>, value: Value) -> Option<Value> {
				self.fields.insert(field.into(), value)
			}

			/// Encodes and stores a value.
			pub fn set(
				&mut self,
				field: impl Into<String>,
				value: impl Serialize,
			) -> Result<(), serde_json::Error> {
				let value = serde_json::to_value(value)?;
				self.fields.insert(field.into(), value);
				Ok(())
			}

			/// Returns whether the field is present.
			pub fn contains(&self, field: &str) -> bool {
				self.fields.contains_key(field)
			}

			/// Iterates over fields in key order.
			pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> {
				self.fields.iter()
			}

			pub fn len(&self) -> usize {
				self.fields.len()
			}

			pub fn is_empty(&self) -> bool {
				self.fields.is_empty()
			}
		}

		impl FromIterator<(String, Value)> for $name {
			fn from_iter<I: IntoIterator<Item = (String, Value)>>(iter: I) -> Self {
				Self {
					fields: iter.into_iter().collect(),
				}
			}
		}
	};
}

/// Declared state of a component instance.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct State {
	fields: Map<String, Value>,
}

impl_field_record!(State);

impl State {
	/// Overlays every field of `other` onto this state.
	pub fn merge(&mut self, other: State) {
		for (field, value) in other.fields {
			self.fields.insert(field, value);
		}
	}
}

/// Inputs passed to a component node by its parent.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Props {
	fields: Map<String, Value>,
}

impl_field_record!(Props);
