//! Test components.

use futures::FutureExt;
use weft_pages::prelude::*;

use super::HookLog;

/// Counter with a button that increments `count`.
///
/// `prepare` loads `count` from the `start` prop, falling back to 5.
pub struct Counter {
	pub log: HookLog,
}

impl Component for Counter {
	fn defaults(&self, _props: &Props) -> State {
		State::new().with("count", 0)
	}

	fn render(&self, scope: &Scope<'_>) -> Result<Node, RenderError> {
		let count: i64 = scope.state().get("count").unwrap_or_default();
		Ok(ElementNode::new("div")
			.attr("class", "counter")
			.child(ElementNode::new("span").child(format!("Count: {count}")))
			.child(
				ElementNode::new("button")
					.attr("type", "button")
					.on("click", |reactive, _event| {
						reactive.update::<i64, _>("count", |count| *count += 1)
					})
					.child("Increment"),
			)
			.into())
	}

	fn prepare(&self, scope: &Scope<'_>) -> Option<HookFuture> {
		self.log.push(format!("prepare:{}", scope.key()));
		let start = scope.props().get::<i64>("start").unwrap_or(5);
		Some(async move { Ok(State::new().with("count", start)) }.boxed_local())
	}

	fn hydrate(&self, scope: &Scope<'_>) -> Option<HookFuture> {
		self.log.push(format!("hydrate:{}", scope.key()));
		None
	}

	fn update(&self, scope: &Scope<'_>) {
		self.log.push(format!("update:{}", scope.key()));
	}

	fn destroy(&self, scope: &Scope<'_>) {
		self.log.push(format!("destroy:{}", scope.key()));
	}
}

pub fn counter(log: &HookLog) -> ComponentType {
	ComponentType::new("count01", Counter { log: log.clone() })
}

/// Section wrapping the node children it was given.
pub struct Panel {
	pub log: HookLog,
}

impl Component for Panel {
	fn defaults(&self, props: &Props) -> State {
		State::new().with("title", props.get::<String>("title").unwrap_or_default())
	}

	fn render(&self, scope: &Scope<'_>) -> Result<Node, RenderError> {
		let title: String = scope.state().get("title").unwrap_or_default();
		Ok(ElementNode::new("section")
			.child(ElementNode::new("h1").child(title))
			.children(scope.children().iter().cloned())
			.into())
	}

	fn prepare(&self, scope: &Scope<'_>) -> Option<HookFuture> {
		self.log.push(format!("prepare:{}", scope.key()));
		None
	}

	fn destroy(&self, scope: &Scope<'_>) {
		self.log.push(format!("destroy:{}", scope.key()));
	}
}

pub fn panel(log: &HookLog) -> ComponentType {
	ComponentType::new("panel01", Panel { log: log.clone() })
}

/// Shows the `id` route parameter.
pub struct Profile {
	pub log: HookLog,
}

impl Component for Profile {
	fn defaults(&self, _props: &Props) -> State {
		State::new()
	}

	fn render(&self, scope: &Scope<'_>) -> Result<Node, RenderError> {
		let id = scope.context().params().get("id").unwrap_or_default();
		Ok(ElementNode::new("p").attr("class", "profile").child(format!("Profile {id}")).into())
	}

	fn prepare(&self, scope: &Scope<'_>) -> Option<HookFuture> {
		self.log.push(format!("prepare:{}", scope.key()));
		None
	}

	fn destroy(&self, scope: &Scope<'_>) {
		self.log.push(format!("destroy:{}", scope.key()));
	}
}

pub fn profile(log: &HookLog) -> ComponentType {
	ComponentType::new("prof01", Profile { log: log.clone() })
}

/// Static landing content.
pub struct Home;

impl Component for Home {
	fn defaults(&self, _props: &Props) -> State {
		State::new()
	}

	fn render(&self, scope: &Scope<'_>) -> Result<Node, RenderError> {
		scope.context().page().set_title("Home");
		Ok(ElementNode::new("h2").child("Welcome").into())
	}
}

pub fn home() -> ComponentType {
	ComponentType::new("home01", Home)
}

/// Component whose `prepare` result arrives as `loaded: true`.
pub struct Loader {
	pub log: HookLog,
}

impl Component for Loader {
	fn defaults(&self, _props: &Props) -> State {
		State::new().with("loaded", false)
	}

	fn render(&self, scope: &Scope<'_>) -> Result<Node, RenderError> {
		let loaded: bool = scope.state().get("loaded").unwrap_or_default();
		Ok(ElementNode::new("div")
			.attr("class", "loader")
			.child(if loaded { "ready" } else { "loading" })
			.into())
	}

	fn prepare(&self, scope: &Scope<'_>) -> Option<HookFuture> {
		self.log.push(format!("prepare:{}", scope.key()));
		Some(async { Ok(State::new().with("loaded", true)) }.boxed_local())
	}

	fn update(&self, scope: &Scope<'_>) {
		self.log.push(format!("update:{}", scope.key()));
	}

	fn destroy(&self, scope: &Scope<'_>) {
		self.log.push(format!("destroy:{}", scope.key()));
	}
}

pub fn loader(log: &HookLog) -> ComponentType {
	ComponentType::new("load01", Loader { log: log.clone() })
}
