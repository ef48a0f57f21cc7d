//! Integration tests for client hydration
//!
//! These tests verify that the client runtime:
//! 1. Adopts server markup without re-preparing snapshot-seeded instances
//! 2. Patches only the element of the instance whose state changed
//! 3. Keeps instance ids stable until an instance is destroyed
//! 4. Discards hook results that arrive after their instance is gone
//! 5. Follows path writes made by hooks and outside handlers
//! 6. Leaves the document untouched when a render fails

mod utils;

use futures::FutureExt;
use rstest::{fixture, rstest};
use utils::components::{counter, home, loader, panel, profile};
use utils::{HookLog, hydrate, server_page};
use weft_pages::dom::{Document, Mutation};
use weft_pages::hydration::PatchRecord;
use weft_pages::prelude::*;

#[fixture]
fn log() -> HookLog {
	HookLog::new()
}

fn text_of(runtime: &ClientRuntime, tag: &str) -> String {
	let document = runtime.document();
	document
		.find_by_tag(tag)
		.map(|node| document.text_content(node))
		.unwrap_or_default()
}

fn count_key() -> InstanceKey {
	InstanceKey::parse("count01")
}

#[rstest]
#[tokio::test]
async fn test_snapshot_skips_client_prepare(log: HookLog) {
	let tree: Node = ComponentNode::new(&counter(&log)).into();
	let page = server_page(&tree, "/").await;
	log.clear();

	let mut runtime = ClientRuntime::new(Document::parse(&page), "https://example.com/");
	runtime.mount(tree, "app").await.unwrap();

	assert_eq!(log.count("prepare:count01"), 0);
	assert_eq!(log.count("hydrate:count01"), 1);
	let instance = runtime.find_by_fingerprint("count01").unwrap();
	assert_eq!(instance.state().get::<i64>("count"), Some(5));
	assert_eq!(instance.phase(), Lifecycle::Hydrated);

	let document = runtime.document();
	assert!(
		document
			.mutations()
			.iter()
			.all(|m| matches!(m, Mutation::SetAttribute { name, .. } if name == "data-weft-id"))
	);
	let container = document.get_element_by_id("app").unwrap();
	let root = document.children(container)[0];
	assert_eq!(document.attribute(root, "data-weft-id"), Some("count01"));
	assert_eq!(runtime.element_of(&count_key()), Some(root));
}

#[rstest]
#[tokio::test]
async fn test_missing_snapshot_prepares_on_client(log: HookLog) {
	let tree: Node = ComponentNode::new(&counter(&log)).into();
	let options = RenderOptions::default().no_state_script();
	let mut session = ServerSession::with_options(Context::server("/"), options);
	let page = session.render_page(&tree).await.unwrap();
	log.clear();

	let mut runtime = ClientRuntime::new(Document::parse(&page), "/");
	runtime.mount(tree, "app").await.unwrap();

	assert_eq!(log.count("prepare:count01"), 1);
	assert_eq!(text_of(&runtime, "span"), "Count: 5");
	assert!(
		!runtime
			.document()
			.mutations()
			.iter()
			.any(|m| matches!(m, Mutation::SetText { .. }))
	);
}

#[rstest]
#[tokio::test]
async fn test_supplied_snapshot_overrides_document(log: HookLog) {
	let tree: Node = ComponentNode::new(&counter(&log)).into();
	let page = server_page(&tree, "/").await;
	let mut snapshot = Snapshot::new();
	snapshot.insert("count01", State::new().with("count", 40));

	let mut runtime = ClientRuntime::new(Document::parse(&page), "/").with_snapshot(snapshot);
	runtime.mount(tree, "app").await.unwrap();
	assert_eq!(text_of(&runtime, "span"), "Count: 40");
}

#[rstest]
#[tokio::test]
async fn test_write_patches_only_the_written_instance(log: HookLog) {
	let tree: Node = ComponentNode::new(&panel(&log))
		.prop("title", "Stats")
		.child(ComponentNode::new(&counter(&log)))
		.into();
	let mut runtime = hydrate(tree, "/").await;
	let element = runtime.element_of(&count_key()).unwrap();
	let id = runtime.find_by_fingerprint("count01").unwrap().id();
	runtime.shared_document().borrow_mut().clear_mutations();
	runtime.clear_patch_log();
	log.clear();

	runtime.write(&count_key(), "count", 6).unwrap();

	assert_eq!(
		runtime.patch_log(),
		&[PatchRecord {
			instance: Some(count_key()),
			node: element,
		}]
	);
	assert_eq!(log.entries(), vec!["update:count01"]);
	assert_eq!(text_of(&runtime, "span"), "Count: 6");
	assert_eq!(runtime.find_by_fingerprint("count01").unwrap().id(), id);

	let document = runtime.document();
	assert_eq!(document.mutations().len(), 1);
	assert!(document.mutations().iter().all(|m| document.is_within(element, m.target())));
}

#[rstest]
#[tokio::test]
async fn test_click_dispatches_to_owning_instance(log: HookLog) {
	let tree: Node = ComponentNode::new(&counter(&log)).into();
	let mut runtime = hydrate(tree, "/").await;
	let button = runtime.document().find_by_tag("button").unwrap();

	let handled = runtime.dispatch(button, &Event::new("click")).unwrap();
	assert_eq!(handled, 1);
	assert_eq!(text_of(&runtime, "span"), "Count: 6");

	let span = runtime.document().find_by_tag("span").unwrap();
	let handled = runtime.dispatch(span, &Event::new("click")).unwrap();
	assert_eq!(handled, 0);
}

#[rstest]
#[tokio::test]
async fn test_handler_outside_component_cannot_write() {
	let tree: Node = ElementNode::new("button")
		.on("click", |reactive, _event| reactive.write("clicked", true))
		.child("Go")
		.into();
	let mut runtime = hydrate(tree, "/").await;
	let button = runtime.document().find_by_tag("button").unwrap();
	let err = runtime.dispatch(button, &Event::new("click")).unwrap_err();
	assert!(matches!(err, Error::DetachedHandler));
}

#[rstest]
#[tokio::test]
async fn test_navigation_destroys_and_recreates(log: HookLog) {
	let tree: Node = ElementNode::new("div")
		.child(ComponentNode::new(&home()).route("/"))
		.child(ComponentNode::new(&profile(&log)).route("/profile/:id"))
		.into();
	let mut runtime = hydrate(tree, "/profile/42").await;
	assert_eq!(text_of(&runtime, "p"), "Profile 42");
	let first_id = runtime.find_by_fingerprint("prof01").unwrap().id();

	runtime.navigate("/").await.unwrap();
	assert_eq!(text_of(&runtime, "h2"), "Welcome");
	assert!(runtime.find_by_fingerprint("prof01").is_none());
	assert_eq!(log.count("destroy:prof01"), 1);
	assert_eq!(runtime.history(), vec!["https://example.com/"]);
	assert_eq!(runtime.context().page().title(), "Home");

	runtime.navigate("/profile/7").await.unwrap();
	assert_eq!(text_of(&runtime, "p"), "Profile 7");
	assert_ne!(runtime.find_by_fingerprint("prof01").unwrap().id(), first_id);
	assert!(runtime.find_by_fingerprint("home01").is_none());
}

#[rstest]
#[tokio::test]
async fn test_same_route_navigation_leaves_document_untouched(log: HookLog) {
	let tree: Node = ComponentNode::new(&counter(&log)).into();
	let mut runtime = hydrate(tree, "/").await;
	runtime.shared_document().borrow_mut().clear_mutations();

	runtime.navigate("/").await.unwrap();
	assert!(runtime.document().mutations().is_empty());
}

#[rstest]
#[tokio::test]
async fn test_late_prepare_is_discarded_after_destroy(log: HookLog) {
	let tree: Node = ElementNode::new("div")
		.child(
			ElementNode::new("button")
				.on("click", |reactive, _event| {
					reactive.context().router().set_path("/slow");
					Ok(())
				})
				.child("Load"),
		)
		.child(ComponentNode::new(&loader(&log)).route("/slow"))
		.into();
	let mut runtime = hydrate(tree, "/").await;
	let button = runtime.document().find_by_tag("button").unwrap();

	runtime.dispatch(button, &Event::new("click")).unwrap();
	assert_eq!(runtime.pending_tasks(), 1);
	assert_eq!(text_of(&runtime, "div"), "Loadloading");

	runtime.navigate("/").await.unwrap();
	assert_eq!(runtime.pending_tasks(), 0);
	assert!(runtime.find_by_fingerprint("load01").is_none());
	assert_eq!(log.count("destroy:load01"), 1);
	assert_eq!(log.count("update:load01"), 0);

	runtime.navigate("/slow").await.unwrap();
	let document = runtime.document();
	let node = document.find_by_attribute("class", "loader").unwrap();
	assert_eq!(document.text_content(node), "ready");
}

struct Wrapper {
	counter: ComponentType,
}

impl Component for Wrapper {
	fn defaults(&self, _props: &Props) -> State {
		State::new().with("start", 1)
	}

	fn render(&self, scope: &Scope<'_>) -> Result<Node, RenderError> {
		let start: i64 = scope.state().get("start").unwrap_or_default();
		Ok(ComponentNode::new(&self.counter).prop("start", start).into())
	}
}

#[rstest]
#[tokio::test]
async fn test_changed_props_reinitiate_nested_instance(log: HookLog) {
	let wrapper = ComponentType::new(
		"wrap01",
		Wrapper {
			counter: counter(&log),
		},
	);
	let mut runtime = hydrate(ComponentNode::new(&wrapper).into(), "/").await;
	let root = runtime.element_of(&count_key()).unwrap();
	assert_eq!(runtime.element_of(&InstanceKey::parse("wrap01")), Some(root));
	assert_eq!(
		runtime.document().attribute(root, "data-weft-id"),
		Some("count01 wrap01")
	);
	let first_id = runtime.find_by_fingerprint("count01").unwrap().id();

	runtime.write(&InstanceKey::parse("wrap01"), "start", 9).unwrap();
	assert_eq!(text_of(&runtime, "span"), "Count: 0");
	runtime.settle().await.unwrap();

	assert_eq!(text_of(&runtime, "span"), "Count: 9");
	assert_ne!(runtime.find_by_fingerprint("count01").unwrap().id(), first_id);
	assert_eq!(
		runtime.document().attribute(root, "data-weft-id"),
		Some("count01 wrap01")
	);
}

struct Greeter;

impl Component for Greeter {
	fn defaults(&self, _props: &Props) -> State {
		State::new().with("greeting", "Hello")
	}

	fn render(&self, scope: &Scope<'_>) -> Result<Node, RenderError> {
		let greeting: String = scope.state().get("greeting").unwrap_or_default();
		Ok(ElementNode::new("em").child(greeting).into())
	}

	fn hydrate(&self, _scope: &Scope<'_>) -> Option<HookFuture> {
		Some(async { Ok(State::new().with("greeting", "Welcome back")) }.boxed_local())
	}
}

#[rstest]
#[tokio::test]
async fn test_hydrate_writes_patch_after_mount() {
	let greeter = ComponentType::new("greet01", Greeter);
	let runtime = hydrate(ComponentNode::new(&greeter).into(), "/").await;
	assert_eq!(text_of(&runtime, "em"), "Welcome back");
	let instance = runtime.find_by_fingerprint("greet01").unwrap();
	assert_eq!(instance.phase(), Lifecycle::Updated);
}

#[rstest]
#[tokio::test]
async fn test_mount_requires_container() {
	let mut runtime = ClientRuntime::new(Document::parse("<body><main></main></body>"), "/");
	let err = runtime.mount(Node::text("x"), "app").await.unwrap_err();
	assert!(matches!(err, Error::MissingMountPoint(_)));
}

/// Sends the page elsewhere as soon as it hydrates.
struct Redirect;

impl Component for Redirect {
	fn defaults(&self, _props: &Props) -> State {
		State::new()
	}

	fn render(&self, _scope: &Scope<'_>) -> Result<Node, RenderError> {
		Ok(ElementNode::new("b").child("guard").into())
	}

	fn hydrate(&self, scope: &Scope<'_>) -> Option<HookFuture> {
		scope.context().router().set_path("/profile/9");
		None
	}
}

fn guarded_tree(log: &HookLog) -> Node {
	ElementNode::new("div")
		.child(ComponentNode::new(&ComponentType::new("redir01", Redirect)).route("/"))
		.child(ComponentNode::new(&profile(log)).route("/profile/:id"))
		.into()
}

#[rstest]
#[tokio::test]
async fn test_path_write_in_hook_renders_new_route(log: HookLog) {
	let runtime = hydrate(guarded_tree(&log), "/").await;

	assert_eq!(runtime.context().router().path(), "/profile/9");
	assert_eq!(runtime.history(), vec!["https://example.com/profile/9"]);
	assert_eq!(text_of(&runtime, "p"), "Profile 9");
	assert!(runtime.document().find_by_tag("b").is_none());
	assert!(runtime.find_by_fingerprint("redir01").is_none());
	assert_eq!(
		runtime.find_by_fingerprint("prof01").unwrap().phase(),
		Lifecycle::Hydrated
	);
}

#[rstest]
#[tokio::test]
async fn test_external_path_write_is_followed_on_settle(log: HookLog) {
	let tree: Node = ElementNode::new("div")
		.child(ComponentNode::new(&home()).route("/"))
		.child(ComponentNode::new(&profile(&log)).route("/profile/:id"))
		.into();
	let mut runtime = hydrate(tree, "/").await;

	runtime.context().router().set_path("/profile/3");
	assert_eq!(text_of(&runtime, "h2"), "Welcome");

	runtime.settle().await.unwrap();
	assert_eq!(text_of(&runtime, "p"), "Profile 3");
	assert!(runtime.find_by_fingerprint("home01").is_none());
}

/// Redirects from its `update` hook once `open` is set.
struct Gate;

impl Component for Gate {
	fn defaults(&self, _props: &Props) -> State {
		State::new().with("open", false)
	}

	fn render(&self, _scope: &Scope<'_>) -> Result<Node, RenderError> {
		Ok(ElementNode::new("nav").child("gate").into())
	}

	fn update(&self, scope: &Scope<'_>) {
		if scope.state().get::<bool>("open") == Some(true) {
			scope.context().router().set_path("/profile/1");
		}
	}
}

#[rstest]
#[tokio::test]
async fn test_path_write_in_update_hook_renders_new_route(log: HookLog) {
	let tree: Node = ElementNode::new("div")
		.child(ComponentNode::new(&ComponentType::new("gate01", Gate)).route("/"))
		.child(ComponentNode::new(&profile(&log)).route("/profile/:id"))
		.into();
	let mut runtime = hydrate(tree, "/").await;

	runtime.write(&InstanceKey::parse("gate01"), "open", true).unwrap();
	assert_eq!(text_of(&runtime, "p"), "Profile 1");
	assert!(runtime.find_by_fingerprint("gate01").is_none());
}

struct Offline;

impl Component for Offline {
	fn defaults(&self, _props: &Props) -> State {
		State::new()
	}

	fn render(&self, _scope: &Scope<'_>) -> Result<Node, RenderError> {
		Ok(ElementNode::new("b").child("offline").into())
	}

	fn hydrate(&self, _scope: &Scope<'_>) -> Option<HookFuture> {
		Some(async { Err(HookError::new("offline")) }.boxed_local())
	}
}

struct Status;

impl Component for Status {
	fn defaults(&self, _props: &Props) -> State {
		State::new().with("text", "before")
	}

	fn render(&self, scope: &Scope<'_>) -> Result<Node, RenderError> {
		let text: String = scope.state().get("text").unwrap_or_default();
		Ok(ElementNode::new("i").child(text).into())
	}

	fn hydrate(&self, _scope: &Scope<'_>) -> Option<HookFuture> {
		Some(async { Ok(State::new().with("text", "after")) }.boxed_local())
	}
}

#[rstest]
#[tokio::test]
async fn test_failed_hook_does_not_drop_other_results() {
	let tree: Node = ElementNode::new("div")
		.child(ComponentNode::new(&ComponentType::new("bad01", Offline)))
		.child(ComponentNode::new(&ComponentType::new("good01", Status)))
		.into();
	let page = server_page(&tree, "/").await;
	let mut runtime = ClientRuntime::new(Document::parse(&page), "/");

	let err = runtime.mount(tree, "app").await.unwrap_err();
	assert!(matches!(
		err,
		Error::Hook { ref component, hook: "hydrate", .. } if component == "bad01"
	));
	assert_eq!(runtime.pending_tasks(), 0);
	assert_eq!(text_of(&runtime, "i"), "after");
}

/// Fails to render once `fail` is set or the path is `/broken`.
struct Fragile;

impl Component for Fragile {
	fn defaults(&self, _props: &Props) -> State {
		State::new().with("fail", false)
	}

	fn render(&self, scope: &Scope<'_>) -> Result<Node, RenderError> {
		let fail: bool = scope.state().get("fail").unwrap_or_default();
		if fail || scope.context().router().path() == "/broken" {
			return Err(RenderError::new("boom"));
		}
		Ok(ElementNode::new("strong").child("fine").into())
	}
}

fn fragile_tree() -> Node {
	ElementNode::new("div")
		.child(ComponentNode::new(&ComponentType::new("boom01", Fragile)))
		.child(ComponentNode::new(&home()).route("/"))
		.into()
}

fn app_markup(runtime: &ClientRuntime) -> String {
	let document = runtime.document();
	let app = document.get_element_by_id("app").unwrap();
	document.inner_html(app)
}

#[rstest]
#[tokio::test]
async fn test_failed_render_after_write_keeps_document() {
	let mut runtime = hydrate(fragile_tree(), "/").await;
	let before = app_markup(&runtime);

	let err = runtime.write(&InstanceKey::parse("boom01"), "fail", true).unwrap_err();
	assert!(matches!(err, Error::Render { ref component, .. } if component == "boom01"));
	assert_eq!(app_markup(&runtime), before);
	assert!(runtime.document().mutations().is_empty());
	assert!(runtime.patch_log().is_empty());
}

#[rstest]
#[tokio::test]
async fn test_failed_render_after_navigation_keeps_document() {
	let mut runtime = hydrate(fragile_tree(), "/").await;
	let before = app_markup(&runtime);

	let err = runtime.navigate("/broken").await.unwrap_err();
	assert!(matches!(err, Error::Render { ref component, .. } if component == "boom01"));
	assert_eq!(app_markup(&runtime), before);
	assert!(runtime.document().mutations().is_empty());
}

#[rstest]
#[tokio::test]
async fn test_logs_cover_only_the_latest_operation(log: HookLog) {
	let tree: Node = ComponentNode::new(&counter(&log)).into();
	let mut runtime = hydrate(tree, "/").await;

	runtime.write(&count_key(), "count", 6).unwrap();
	runtime.write(&count_key(), "count", 7).unwrap();

	assert_eq!(runtime.patch_log().len(), 1);
	let document = runtime.document();
	assert!(matches!(document.mutations(), [Mutation::SetText { .. }]));
	let button = document.find_by_tag("button").unwrap();
	assert!(document.has_listener(button, "onclick"));
}

#[rstest]
#[tokio::test]
async fn test_click_runs_update_once(log: HookLog) {
	let tree: Node = ComponentNode::new(&counter(&log)).into();
	let mut runtime = hydrate(tree, "/").await;
	let button = runtime.document().find_by_tag("button").unwrap();
	log.clear();

	runtime.dispatch(button, &Event::new("click")).unwrap();

	assert_eq!(log.entries(), vec!["update:count01"]);
	assert_eq!(runtime.patch_log().len(), 1);
	assert_eq!(text_of(&runtime, "span"), "Count: 6");
}

struct Note;

impl Component for Note {
	fn defaults(&self, _props: &Props) -> State {
		State::new().with("body", "a    b")
	}

	fn render(&self, scope: &Scope<'_>) -> Result<Node, RenderError> {
		let body: String = scope.state().get("body").unwrap_or_default();
		Ok(ElementNode::new("pre").child(body).into())
	}
}

#[rstest]
#[tokio::test]
async fn test_minified_page_keeps_snapshot_whitespace() {
	let tree: Node = ComponentNode::new(&ComponentType::new("note01", Note)).into();
	let options = RenderOptions::default().minify();
	let mut session = ServerSession::with_options(Context::server("/"), options);
	let page = session.render_page(&tree).await.unwrap();

	let document = Document::parse(&page);
	let snapshot = Snapshot::from_document(&document, "weft-state").unwrap().unwrap();
	assert_eq!(
		snapshot.get("note01").unwrap().get::<String>("body").as_deref(),
		Some("a    b")
	);

	let mut runtime = ClientRuntime::new(document, "/");
	runtime.mount(tree, "app").await.unwrap();
	assert_eq!(text_of(&runtime, "pre"), "a    b");
	assert!(
		!runtime
			.document()
			.mutations()
			.iter()
			.any(|m| matches!(m, Mutation::SetText { .. }))
	);
}
