mod config;
mod escape;
pub mod memory;
#[cfg(feature = "web")]
pub mod web;

pub use config::{Config, MarkerKind};
pub(crate) use escape::{escape_attribute, escape_text};

/// Callback invoked by the host when a registered event fires.
pub type ListenerFn<E> = Box<dyn Fn(&E)>;

/// The live visual tree that blocks are rendered into.
///
/// Blocks only ever talk to the tree through this trait, so the same block tree can be mounted
/// into a browser document (`web::WebDom`, behind the `web` feature) or into the in-memory tree
/// used for tests and server-side snapshots (see [`memory`]).
///
/// Node handles behave like DOM references: cloning a handle yields another reference to the
/// same node, and equality is identity. Removing a node detaches its whole subtree along with it.
pub trait Dom {
    /// Reference to a node in the tree.
    type Node: Clone + PartialEq + std::fmt::Debug;

    /// Event passed to listeners when they are triggered.
    type Event;

    /// Registration returned from [`Dom::add_listener()`]. Must be handed back to
    /// [`Dom::remove_listener()`] to release the listener.
    type Listener;

    /// Configuration that this host was created with.
    fn config(&self) -> &Config;

    /// Create a detached element with the given tag name.
    fn create_element(&self, tag: &str) -> Self::Node;

    /// Create a detached text node.
    fn create_text(&self, data: &str) -> Self::Node;

    /// Create a detached comment node.
    fn create_comment(&self, data: &str) -> Self::Node;

    /// Create an empty insertion marker, of the kind selected by [`Config::marker`].
    fn create_marker(&self) -> Self::Node {
        match self.config().marker {
            MarkerKind::Text => self.create_text(""),
            MarkerKind::Comment => self.create_comment(""),
        }
    }

    /// Replace the character data of a text (or comment) node.
    fn set_text(&self, node: &Self::Node, data: &str);

    /// Append `node` as the last child of `parent`, moving it if it is already in a tree.
    fn append_child(&self, parent: &Self::Node, node: &Self::Node);

    /// Insert `node` immediately before `marker`, within the marker's parent.
    fn insert_before(&self, node: &Self::Node, marker: &Self::Node);

    /// Put `new` in the exact position currently held by `old`, detaching `old`.
    fn replace(&self, old: &Self::Node, new: &Self::Node);

    /// Detach `node` (and with it, all of its descendants) from its parent.
    fn remove(&self, node: &Self::Node);

    /// Parse a markup string into a list of detached top level nodes.
    fn parse_markup(&self, markup: &str) -> Vec<Self::Node>;

    /// Produce a detached deep copy of `node`. Listeners are not copied.
    fn clone_deep(&self, node: &Self::Node) -> Self::Node;

    /// Child of `parent` at position `index`, counting every node kind.
    fn child_at(&self, parent: &Self::Node, index: usize) -> Option<Self::Node>;

    /// Number of descendant elements of `root` with the given tag name.
    fn count_tagged(&self, root: &Self::Node, tag: &str) -> usize;

    /// First descendant element of `root`, in document order, with the given tag name.
    fn first_tagged(&self, root: &Self::Node, tag: &str) -> Option<Self::Node>;

    /// Set an attribute, or remove it when `value` is [`None`].
    fn set_attribute(&self, node: &Self::Node, name: &str, value: Option<&str>);

    /// Add or remove a single class token.
    fn toggle_class(&self, node: &Self::Node, class: &str, present: bool);

    /// Register `callback` for events of type `event` on `node`.
    fn add_listener(
        &self,
        node: &Self::Node,
        event: &str,
        callback: ListenerFn<Self::Event>,
    ) -> Self::Listener;

    /// Release a registration created by [`Dom::add_listener()`].
    fn remove_listener(&self, listener: Self::Listener);

    /// Serialize `node` (including itself) back to markup.
    fn serialize(&self, node: &Self::Node) -> String;
}
