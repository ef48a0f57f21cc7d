//! Weft Pages - server-side rendering and client hydration for component trees
//!
//! Component trees are rendered to markup on the server, then adopted by the
//! client without re-rendering from scratch: the client seeds its instances
//! from a state snapshot embedded in the page, patches the existing markup in
//! place and keeps it in sync with state writes from then on.
//!
//! ## Architecture
//!
//! - [`node`]: Node model (elements, components, text, fragments) and the
//!   [`h`] builder
//! - [`component`]: Component definitions, fingerprints, the lifecycle and
//!   the instance registry
//! - [`context`]: Per-session page metadata, router path and route params
//! - [`router`]: Segment-wise route matching
//! - [`render`]: Tree lowering, markup serialization and DOM patching
//! - [`reactive`]: State handles whose writes re-render the owning instance
//! - [`ssr`]: Server render sessions and full-page assembly
//! - [`hydration`]: The client runtime and the state snapshot
//! - [`dom`]: In-memory document the client runtime mounts into
//!
//! ## Example
//!
//! ```
//! use weft_pages::prelude::*;
//!
//! struct Greeting;
//!
//! impl Component for Greeting {
//! 	fn defaults(&self, props: &Props) -> State {
//! 		State::new().with("name", props.get::<String>("name").unwrap_or_default())
//! 	}
//!
//! 	fn render(&self, scope: &Scope<'_>) -> Result<Node, RenderError> {
//! 		let name: String = scope.state().get("name").unwrap_or_default();
//! 		Ok(ElementNode::new("p").child(format!("Hello, {name}")).into())
//! 	}
//! }
//!
//! let greeting = ComponentType::new("greet01", Greeting);
//! let tree: Node = ComponentNode::new(&greeting).prop("name", "Ada").into();
//!
//! let markup = futures::executor::block_on(serialize(&tree, &Context::server("/"))).unwrap();
//! assert_eq!(markup, "<p>Hello, Ada</p>");
//! ```

pub mod component;
pub mod config;
pub mod context;
pub mod dom;
pub mod error;
pub mod hydration;
pub mod node;
pub mod prelude;
pub mod reactive;
pub mod render;
pub mod router;
pub mod ssr;
pub mod state;

pub use component::{Component, ComponentType, Fingerprint, InstanceKey, Lifecycle, Registry, Scope};
pub use config::RenderOptions;
pub use context::{Context, Environment, Host};
pub use error::{Error, HookError, LifecycleError, RenderError, Result};
pub use hydration::{ClientRuntime, Snapshot};
pub use node::{ComponentNode, ElementNode, Node, h};
pub use reactive::Reactive;
pub use router::{apply_route, match_route};
pub use ssr::{ServerSession, serialize};
pub use state::{Props, State};
