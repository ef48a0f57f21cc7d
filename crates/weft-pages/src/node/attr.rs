//! Attribute values and event handlers.

use std::fmt;
use std::rc::Rc;

use serde_json::Value;

use crate::error::Result;
use crate::reactive::Reactive;

/// An event delivered to a handler.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Event {
	/// Event name without the `on` prefix, e.g. `click`.
	pub kind: String,
	/// Current value of the target, for input-like events.
	pub value: Option<String>,
}

impl Event {
	pub fn new(kind: impl Into<String>) -> Self {
		Self {
			kind: kind.into(),
			value: None,
		}
	}

	pub fn with_value(mut self, value: impl Into<String>) -> Self {
		self.value = Some(value.into());
		self
	}

	/// Name of the attribute that carries handlers for this event.
	pub fn attribute_name(&self) -> String {
		format!("on{}", self.kind)
	}
}

type HandlerFn = dyn Fn(&mut Reactive<'_>, &Event) -> Result<()>;

/// An event handler bound to an element attribute.
///
/// Handlers receive a [`Reactive`] bound to the component that rendered
/// the element, so writes go through the same update path as any other
/// state change.
#[derive(Clone)]
pub struct Handler(Rc<HandlerFn>);

impl Handler {
	pub fn new<F>(f: F) -> Self
	where
		F: Fn(&mut Reactive<'_>, &Event) -> Result<()> + 'static,
	{
		Self(Rc::new(f))
	}

	pub(crate) fn call(&self, reactive: &mut Reactive<'_>, event: &Event) -> Result<()> {
		(self.0)(reactive, event)
	}

	/// Returns whether both handles point at the same closure.
	pub fn ptr_eq(&self, other: &Handler) -> bool {
		Rc::ptr_eq(&self.0, &other.0)
	}
}

impl fmt::Debug for Handler {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str("Handler(..)")
	}
}

/// Value of an element attribute.
#[derive(Debug, Clone)]
pub enum AttrValue {
	Text(String),
	Int(i64),
	Float(f64),
	/// `true` renders as a bare attribute, `false` omits it.
	Bool(bool),
	/// Never serialized; bound as a listener in the client.
	Handler(Handler),
}

impl AttrValue {
	/// Returns the markup value, or `None` when the attribute is not emitted.
	pub fn to_markup(&self) -> Option<String> {
		match self {
			Self::Text(text) => Some(text.clone()),
			Self::Int(n) => Some(n.to_string()),
			Self::Float(n) => Some(format_number(*n)),
			Self::Bool(true) => Some(String::new()),
			Self::Bool(false) | Self::Handler(_) => None,
		}
	}

	pub fn is_handler(&self) -> bool {
		matches!(self, Self::Handler(_))
	}

	pub fn as_text(&self) -> Option<&str> {
		match self {
			Self::Text(text) => Some(text),
			_ => None,
		}
	}

	/// Converts the value to JSON for use as a component prop.
	pub(crate) fn to_json(&self) -> Option<Value> {
		match self {
			Self::Text(text) => Some(Value::String(text.clone())),
			Self::Int(n) => Some(Value::from(*n)),
			Self::Float(n) => serde_json::Number::from_f64(*n).map(Value::Number),
			Self::Bool(b) => Some(Value::Bool(*b)),
			Self::Handler(_) => None,
		}
	}
}

/// Formats a number the way it appears in markup: whole values drop the
/// fractional part.
pub fn format_number(n: f64) -> String {
	if n.is_nan() {
		"NaN".to_string()
	} else if n == f64::INFINITY {
		"Infinity".to_string()
	} else if n == f64::NEG_INFINITY {
		"-Infinity".to_string()
	} else if n.fract() == 0.0 && n.abs() < 1e15 {
		format!("{}", n as i64)
	} else {
		n.to_string()
	}
}

impl From<&str> for AttrValue {
	fn from(value: &str) -> Self {
		Self::Text(value.to_string())
	}
}

impl From<String> for AttrValue {
	fn from(value: String) -> Self {
		Self::Text(value)
	}
}

impl From<&String> for AttrValue {
	fn from(value: &String) -> Self {
		Self::Text(value.clone())
	}
}

macro_rules! impl_from_int {
	($($t:ty),*) => {
		$(
			impl From<$t> for AttrValue {
				fn from(value: $t) -> Self {
					Self::Int(i64::from(value))
				}
			}
		)*
	};
}

impl_from_int!(i8, i16, i32, i64, u8, u16, u32);

impl From<f64> for AttrValue {
	fn from(value: f64) -> Self {
		Self::Float(value)
	}
}

impl From<f32> for AttrValue {
	fn from(value: f32) -> Self {
		Self::Float(f64::from(value))
	}
}

impl From<bool> for AttrValue {
	fn from(value: bool) -> Self {
		Self::Bool(value)
	}
}

impl From<Handler> for AttrValue {
	fn from(value: Handler) -> Self {
		Self::Handler(value)
	}
}
