//! Retained-mode block reconciliation for live DOM trees.
//!
//! A render produces a tree of [`Block`]s. The first tree is mounted into a container, and every
//! tree rendered after it is patched into the one already mounted, which updates the live tree in
//! place: nodes keep their identity, listeners are registered exactly once, and dynamic children
//! are kept in position with insertion markers.
//!
//! Blocks talk to the live tree through the [`Dom`] trait. [`dom::memory::MemoryDom`] is an
//! in-memory tree, and `dom::web::WebDom` (behind the `web` feature) renders into a browser
//! document.
//!
//! ```
//! use blocktree::{dom::memory::MemoryDom, Block, Dom, TemplateBuilder, Value};
//!
//! let dom = MemoryDom::new();
//! let container = dom.create_element("main");
//!
//! let greeting = TemplateBuilder::new()
//!     .with_element("p", None)
//!     .with_text("Hello, ", Some(0))
//!     .with_dynamic_text(Some(0), 0)
//!     .with_slot(Some(0))
//!     .compile(&dom)?;
//!
//! let render = |name: &str, extra: Option<&str>| {
//!     Block::node(&greeting, vec![Value::from(name)], vec![extra.map(Block::text)])
//! };
//!
//! let mut root = render("world", None);
//! root.mount(&dom, &container);
//! assert_eq!(dom.inner_markup(&container), "<p>Hello, world</p>");
//!
//! root.patch(&dom, render("there", Some("!")));
//! assert_eq!(dom.inner_markup(&container), "<p>Hello, there!</p>");
//! # Ok::<(), blocktree::TemplateError>(())
//! ```
pub mod block;
pub mod dom;
pub mod template;
pub mod value;

#[cfg(test)]
mod test_utils;

pub use block::Block;
pub use dom::{Config, Dom, MarkerKind};
pub use template::{Template, TemplateBuilder, TemplateError};
pub use value::{DataCell, Handler, Value};
