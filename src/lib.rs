//! Weft - server-side rendering with client hydration
//!
//! This crate re-exports [`weft_pages`], the rendering engine. Trees built
//! from elements and components are serialized on the server and adopted by
//! the client runtime, which patches the server markup in place.
//!
//! ## Example
//!
//! ```
//! use weft::prelude::*;
//!
//! let tree = h("p", vec![("class", "lead".into())], vec!["Hello".into()]);
//! let markup = futures::executor::block_on(serialize(&tree, &Context::server("/"))).unwrap();
//! assert_eq!(markup, "<p class=\"lead\">Hello</p>");
//! ```

pub use weft_pages::*;
