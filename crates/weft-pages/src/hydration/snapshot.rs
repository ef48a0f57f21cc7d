//! Hydration snapshot.
//!
//! The server captures the state of every visible instance into a snapshot
//! and embeds it as JSON in the page. The client reads it once at mount and
//! seeds matching instances from it instead of running `prepare` again.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::component::{InstanceKey, Registry};
use crate::dom::Document;
use crate::error::{Error, Result};
use crate::render::markup::{escape_attr, escape_json_for_script};
use crate::state::State;

/// State captured for one instance.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SnapshotEntry {
	pub state: State,
}

/// Instance states keyed by the text form of their instance key.
///
/// Serializes as `{ "<key>": { "state": { ... } } }`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Snapshot {
	entries: BTreeMap<String, SnapshotEntry>,
}

impl Snapshot {
	pub fn new() -> Self {
		Self::default()
	}

	/// Captures the state of each listed instance that is still registered.
	pub fn capture(registry: &Registry, keys: &[InstanceKey]) -> Self {
		let entries = keys
			.iter()
			.filter_map(|key| {
				registry.get(key).map(|instance| {
					(
						key.to_string(),
						SnapshotEntry {
							state: instance.state().clone(),
						},
					)
				})
			})
			.collect();
		Self { entries }
	}

	pub fn insert(&mut self, key: impl Into<String>, state: State) {
		self.entries.insert(key.into(), SnapshotEntry { state });
	}

	pub fn get(&self, key: &str) -> Option<&State> {
		self.entries.get(key).map(|entry| &entry.state)
	}

	/// Removes and returns the state recorded for `key`.
	pub fn take(&mut self, key: &InstanceKey) -> Option<State> {
		self.entries.remove(&key.to_string()).map(|entry| entry.state)
	}

	pub fn keys(&self) -> impl Iterator<Item = &str> {
		self.entries.keys().map(String::as_str)
	}

	pub fn len(&self) -> usize {
		self.entries.len()
	}

	pub fn is_empty(&self) -> bool {
		self.entries.is_empty()
	}

	pub fn to_json(&self) -> Result<String> {
		Ok(serde_json::to_string(self)?)
	}

	pub fn from_json(json: &str) -> Result<Self> {
		serde_json::from_str(json).map_err(Error::Snapshot)
	}

	/// Renders the snapshot as a JSON script element.
	pub fn to_script_tag(&self, id: &str) -> Result<String> {
		let json = escape_json_for_script(&self.to_json()?);
		let id = escape_attr(id);
		Ok(format!(
			r#"<script id="{id}" type="application/json">{json}</script>"#
		))
	}

	/// Reads the snapshot embedded in `document` under the script `id`.
	///
	/// Returns `Ok(None)` when the document carries no such script.
	pub fn from_document(document: &Document, id: &str) -> Result<Option<Self>> {
		let Some(script) = document.get_element_by_id(id) else {
			return Ok(None);
		};
		let json = document.text_content(script);
		if json.trim().is_empty() {
			return Ok(None);
		}
		Self::from_json(&json).map(Some)
	}
}
