//! Reactive state handles.
//!
//! A [`Reactive`] is bound to one instance. Reads pass straight through to the
//! instance state. A write stores the value and, in the client, synchronously
//! re-renders the instance, patches its mounted element and runs its `update`
//! hook before returning. On the server a write only stores the value.

use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::component::InstanceKey;
use crate::context::Context;
use crate::error::{Error, Result};
use crate::state::State;

/// What a session exposes to a [`Reactive`] handle.
pub(crate) trait Driver {
	fn instance_state(&self, key: &InstanceKey) -> Option<&State>;

	fn store(&mut self, key: &InstanceKey, field: String, value: Value) -> Result<()>;

	/// Runs after every stored write.
	fn after_write(&mut self, key: &InstanceKey) -> Result<()>;

	fn context(&self) -> &Context;
}

/// Handle to the state of one instance.
pub struct Reactive<'a> {
	key: Option<InstanceKey>,
	driver: &'a mut dyn Driver,
}

impl<'a> Reactive<'a> {
	pub(crate) fn new(key: Option<InstanceKey>, driver: &'a mut dyn Driver) -> Self {
		Self { key, driver }
	}

	/// The bound instance; `None` for handlers outside any component.
	pub fn key(&self) -> Option<&InstanceKey> {
		self.key.as_ref()
	}

	pub fn context(&self) -> &Context {
		self.driver.context()
	}

	pub fn read(&self, field: &str) -> Option<&Value> {
		let key = self.key.as_ref()?;
		self.driver.instance_state(key)?.read(field)
	}

	pub fn get<T: DeserializeOwned>(&self, field: &str) -> Option<T> {
		let key = self.key.as_ref()?;
		self.driver.instance_state(key)?.get(field)
	}

	/// Stores `value` under `field` and runs the update path.
	pub fn write(&mut self, field: &str, value: impl Serialize) -> Result<()> {
		let key = self.key.clone().ok_or(Error::DetachedHandler)?;
		let value = serde_json::to_value(value)?;
		self.driver.store(&key, field.to_string(), value)?;
		self.driver.after_write(&key)
	}

	/// Reads a field (default when absent), applies `f` and writes it back.
	pub fn update<T, F>(&mut self, field: &str, f: F) -> Result<()>
	where
		T: DeserializeOwned + Serialize + Default,
		F: FnOnce(&mut T),
	{
		let mut value = self.get::<T>(field).unwrap_or_default();
		f(&mut value);
		self.write(field, value)
	}
}

impl std::fmt::Debug for Reactive<'_> {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("Reactive").field("key", &self.key).finish()
	}
}
