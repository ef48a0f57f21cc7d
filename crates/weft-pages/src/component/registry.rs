//! Instance registry.

use std::collections::{HashMap, HashSet, hash_map};
use std::fmt;

use serde_json::Value;
use tracing::debug;

use super::definition::{Component, ComponentType, Scope};
use super::key::InstanceKey;
use super::lifecycle::{Lifecycle, LifecycleEvent};
use crate::context::Context;
use crate::error::{Error, Result};
use crate::node::{ComponentNode, Node};
use crate::state::{Props, State};

/// A live component instance.
#[derive(Debug, Clone, PartialEq)]
pub struct Instance {
	id: u64,
	state: State,
	phase: Lifecycle,
}

impl Instance {
	/// Session-unique id; a recreated instance gets a new one.
	pub fn id(&self) -> u64 {
		self.id
	}

	pub fn state(&self) -> &State {
		&self.state
	}

	pub fn phase(&self) -> Lifecycle {
		self.phase
	}
}

pub(crate) struct Entry {
	component: ComponentType,
	instance: Instance,
	props: Props,
	children: Vec<Node>,
	visible: bool,
}

impl Entry {
	pub(crate) fn definition(&self) -> &dyn Component {
		self.component.definition()
	}

	pub(crate) fn scope<'a>(&'a self, key: &'a InstanceKey, context: &'a Context) -> Scope<'a> {
		Scope::new(key, &self.instance.state, &self.props, &self.children, context)
	}
}

/// Maps instance keys to live instances and tracks which of them the last
/// full traversal reached.
#[derive(Default)]
pub struct Registry {
	entries: HashMap<InstanceKey, Entry>,
	generations: HashMap<InstanceKey, u64>,
	visible: Vec<InstanceKey>,
	next_id: u64,
}

impl Registry {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn get(&self, key: &InstanceKey) -> Option<&Instance> {
		self.entries.get(key).map(|entry| &entry.instance)
	}

	/// Looks up an instance by the text form of its key.
	pub fn find_by_fingerprint(&self, hash: &str) -> Option<&Instance> {
		self.get(&InstanceKey::parse(hash))
	}

	pub fn contains(&self, key: &InstanceKey) -> bool {
		self.entries.contains_key(key)
	}

	pub fn len(&self) -> usize {
		self.entries.len()
	}

	pub fn is_empty(&self) -> bool {
		self.entries.is_empty()
	}

	/// Keys reached by traversals since the last full one, in tree order.
	pub fn visible(&self) -> &[InstanceKey] {
		&self.visible
	}

	pub fn is_visible(&self, key: &InstanceKey) -> bool {
		self.entries.get(key).is_some_and(|entry| entry.visible)
	}

	/// Generation counter for a key, bumped whenever its instance is dropped
	/// or reinitiated.
	pub fn generation(&self, key: &InstanceKey) -> u64 {
		self.generations.get(key).copied().unwrap_or(0)
	}

	pub(crate) fn is_current(&self, key: &InstanceKey, generation: u64) -> bool {
		self.entries.contains_key(key) && self.generation(key) == generation
	}

	/// Replaces an instance with a fresh one built from defaults.
	pub fn reinitiate(&mut self, key: &InstanceKey) -> Option<&Instance> {
		let id = self.allocate_id();
		self.bump_generation(key);
		let entry = self.entries.get_mut(key)?;
		entry.instance = Instance {
			id,
			state: entry.component.definition().defaults(&entry.props),
			phase: Lifecycle::Unmounted,
		};
		Some(&entry.instance)
	}

	pub(crate) fn entry(&self, key: &InstanceKey) -> Result<&Entry> {
		self.entries.get(key).ok_or_else(|| Error::unknown(key))
	}

	/// Creates the instance for `key` unless one exists. An existing entry
	/// keeps its id and state and only takes the node's children.
	pub(crate) fn insert(&mut self, key: InstanceKey, node: &ComponentNode) -> &Instance {
		let entry = match self.entries.entry(key) {
			hash_map::Entry::Occupied(occupied) => occupied.into_mut(),
			hash_map::Entry::Vacant(vacant) => {
				self.next_id += 1;
				let id = self.next_id;
				let component = node.component().clone();
				let props = node.prop_values().clone();
				let instance = Instance {
					id,
					state: component.definition().defaults(&props),
					phase: Lifecycle::Unmounted,
				};
				debug!(component = %vacant.key(), id, "instantiated component");
				vacant.insert(Entry {
					component,
					instance,
					props,
					children: Vec::new(),
					visible: false,
				})
			}
		};
		entry.children = node.child_nodes().to_vec();
		&entry.instance
	}

	/// Stores the latest props and children, returning whether props changed.
	pub(crate) fn refresh_inputs(&mut self, key: &InstanceKey, node: &ComponentNode) -> bool {
		let Some(entry) = self.entries.get_mut(key) else {
			return false;
		};
		entry.children = node.child_nodes().to_vec();
		if entry.props == *node.prop_values() {
			return false;
		}
		entry.props = node.prop_values().clone();
		true
	}

	pub(crate) fn store(&mut self, key: &InstanceKey, field: String, value: Value) -> Result<()> {
		let entry = self.entries.get_mut(key).ok_or_else(|| Error::unknown(key))?;
		entry.instance.state.insert(field, value);
		Ok(())
	}

	pub(crate) fn apply(&mut self, key: &InstanceKey, writes: State) -> Result<()> {
		let entry = self.entries.get_mut(key).ok_or_else(|| Error::unknown(key))?;
		entry.instance.state.merge(writes);
		Ok(())
	}

	pub(crate) fn transition(&mut self, key: &InstanceKey, event: LifecycleEvent) -> Result<Lifecycle> {
		let entry = self.entries.get_mut(key).ok_or_else(|| Error::unknown(key))?;
		entry.instance.phase = entry.instance.phase.transition(event)?;
		Ok(entry.instance.phase)
	}

	/// Adds keys reached by a partial traversal to the visible list.
	pub(crate) fn extend_visible(&mut self, keys: impl IntoIterator<Item = InstanceKey>) {
		for key in keys {
			if !self.visible.contains(&key) {
				if let Some(entry) = self.entries.get_mut(&key) {
					entry.visible = true;
				}
				self.visible.push(key);
			}
		}
	}

	/// Installs the visible list computed by a full traversal and destroys
	/// every instance outside it, deepest first.
	///
	/// Returns the destroyed keys in destroy order.
	pub(crate) fn reconcile_visible(
		&mut self,
		current: Vec<InstanceKey>,
		context: &Context,
	) -> Result<Vec<InstanceKey>> {
		let keep: HashSet<InstanceKey> = current.iter().cloned().collect();
		let previous = std::mem::replace(&mut self.visible, current);

		let mut stale: Vec<InstanceKey> = previous
			.iter()
			.rev()
			.filter(|key| !keep.contains(*key) && self.entries.contains_key(*key))
			.cloned()
			.collect();
		let mut orphans: Vec<InstanceKey> = self
			.entries
			.keys()
			.filter(|key| !keep.contains(*key) && !stale.contains(*key))
			.cloned()
			.collect();
		orphans.sort();
		stale.extend(orphans);

		for key in &stale {
			self.destroy(key, context)?;
		}
		for (key, entry) in &mut self.entries {
			entry.visible = keep.contains(key);
		}
		Ok(stale)
	}

	fn destroy(&mut self, key: &InstanceKey, context: &Context) -> Result<()> {
		if let Some(entry) = self.entries.get(key) {
			entry.definition().destroy(&entry.scope(key, context));
		}
		if let Some(entry) = self.entries.remove(key) {
			let phase = entry.instance.phase.transition(LifecycleEvent::Destroy)?;
			debug!(component = %key, id = entry.instance.id, ?phase, "destroyed component");
		}
		self.bump_generation(key);
		Ok(())
	}

	fn allocate_id(&mut self) -> u64 {
		self.next_id += 1;
		self.next_id
	}

	fn bump_generation(&mut self, key: &InstanceKey) {
		*self.generations.entry(key.clone()).or_insert(0) += 1;
	}
}

impl fmt::Debug for Registry {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("Registry")
			.field("instances", &self.entries.len())
			.field("visible", &self.visible)
			.finish()
	}
}
