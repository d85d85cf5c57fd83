//! An in-memory visual tree.
//!
//! Nodes are reference counted and hold a weak link back to their parent, so handles behave like
//! DOM references: they can be cloned freely, compared by identity, and stay valid after being
//! detached. Used for tests, snapshots, and rendering outside of a browser.
mod markup;

use std::{
    cell::{Cell, RefCell},
    fmt,
    rc::{Rc, Weak},
};

use super::{escape_attribute, escape_text, Config, Dom, ListenerFn};
use markup::{is_void_element, tokenize, Token};

/// The content of a [`MemoryNode`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeKind {
    Element {
        tag: String,
        attributes: Vec<(String, String)>,
    },
    Text(String),
    Comment(String),
}

/// Event delivered to listeners by [`MemoryDom::dispatch()`].
#[derive(Debug, Clone)]
pub struct MemoryEvent {
    /// Event type, eg `click`.
    pub name: String,

    /// Node that the event was dispatched on.
    pub target: MemoryNode,
}

struct Registration {
    id: u64,
    event: String,
    callback: Rc<dyn Fn(&MemoryEvent)>,
}

struct NodeData {
    kind: NodeKind,
    parent: Weak<RefCell<NodeData>>,
    children: Vec<MemoryNode>,
    listeners: Vec<Registration>,
}

/// Handle to a node in the in-memory tree.
#[derive(Clone)]
pub struct MemoryNode(Rc<RefCell<NodeData>>);

impl MemoryNode {
    fn new(kind: NodeKind) -> Self {
        Self(Rc::new(RefCell::new(NodeData {
            kind,
            parent: Weak::new(),
            children: Vec::new(),
            listeners: Vec::new(),
        })))
    }

    /// A copy of the node's content.
    pub fn kind(&self) -> NodeKind {
        self.0.borrow().kind.clone()
    }

    /// Tag name, if this node is an element.
    pub fn tag(&self) -> Option<String> {
        match &self.0.borrow().kind {
            NodeKind::Element { tag, .. } => Some(tag.clone()),
            _ => None,
        }
    }

    /// Character data, if this node is a text node.
    pub fn text(&self) -> Option<String> {
        match &self.0.borrow().kind {
            NodeKind::Text(text) => Some(text.clone()),
            _ => None,
        }
    }

    /// Value of an attribute, if this node is an element that has it.
    pub fn attribute(&self, name: &str) -> Option<String> {
        match &self.0.borrow().kind {
            NodeKind::Element { attributes, .. } => attributes
                .iter()
                .find(|(attribute, _)| attribute == name)
                .map(|(_, value)| value.clone()),
            _ => None,
        }
    }

    /// Concatenated character data of every descendant text node.
    pub fn text_content(&self) -> String {
        let data = self.0.borrow();
        match &data.kind {
            NodeKind::Text(text) => text.clone(),
            NodeKind::Comment(_) => String::new(),
            NodeKind::Element { .. } => data.children.iter().map(Self::text_content).collect(),
        }
    }

    pub fn children(&self) -> Vec<MemoryNode> {
        self.0.borrow().children.clone()
    }

    pub fn parent(&self) -> Option<MemoryNode> {
        self.0.borrow().parent.upgrade().map(MemoryNode)
    }

    /// Whether `self` is `ancestor`, or somewhere below it.
    pub fn is_within(&self, ancestor: &MemoryNode) -> bool {
        let mut current = Some(self.clone());
        while let Some(node) = current {
            if node == *ancestor {
                return true;
            }
            current = node.parent();
        }

        false
    }

    fn has_tag(&self, name: &str) -> bool {
        matches!(&self.0.borrow().kind, NodeKind::Element { tag, .. } if tag == name)
    }

    /// Detach from the current parent, if there is one.
    fn detach(&self) {
        if let Some(parent) = self.parent() {
            parent.0.borrow_mut().children.retain(|child| child != self);
        }

        self.0.borrow_mut().parent = Weak::new();
    }

    fn push_child(&self, child: &MemoryNode) {
        child.detach();
        self.0.borrow_mut().children.push(child.clone());
        child.0.borrow_mut().parent = Rc::downgrade(&self.0);
    }

    /// Every descendant in document order, not including `self`.
    fn descendants(&self) -> Vec<MemoryNode> {
        let mut out = Vec::new();
        let mut stack = self.children();
        stack.reverse();

        while let Some(node) = stack.pop() {
            let mut children = node.children();
            children.reverse();
            stack.extend(children);
            out.push(node);
        }

        out
    }

    fn deep_copy(&self) -> MemoryNode {
        let data = self.0.borrow();
        let copy = MemoryNode::new(data.kind.clone());

        for child in &data.children {
            copy.push_child(&child.deep_copy());
        }

        copy
    }

    fn write_markup(&self, out: &mut String) {
        let data = self.0.borrow();

        match &data.kind {
            NodeKind::Element { tag, attributes } => {
                out.push('<');
                out.push_str(tag);
                for (name, value) in attributes {
                    out.push(' ');
                    out.push_str(name);
                    out.push_str("=\"");
                    out.push_str(&escape_attribute(value));
                    out.push('"');
                }
                out.push('>');

                if is_void_element(tag) {
                    return;
                }

                for child in &data.children {
                    child.write_markup(out);
                }

                out.push_str("</");
                out.push_str(tag);
                out.push('>');
            }
            NodeKind::Text(text) => out.push_str(&escape_text(text)),
            NodeKind::Comment(comment) => {
                out.push_str("<!--");
                out.push_str(comment);
                out.push_str("-->");
            }
        }
    }
}

impl PartialEq for MemoryNode {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}

impl Eq for MemoryNode {}

impl fmt::Debug for MemoryNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0.try_borrow() {
            Ok(data) => match &data.kind {
                NodeKind::Element { tag, .. } => write!(f, "MemoryNode(<{tag}>)"),
                NodeKind::Text(text) => write!(f, "MemoryNode({text:?})"),
                NodeKind::Comment(comment) => write!(f, "MemoryNode(<!--{comment}-->)"),
            },
            Err(_) => f.write_str("MemoryNode(<borrowed>)"),
        }
    }
}

/// Registration of a listener on a [`MemoryNode`].
#[derive(Debug)]
pub struct MemoryListener {
    node: MemoryNode,
    id: u64,
}

/// In-memory implementation of [`Dom`].
#[derive(Default)]
pub struct MemoryDom {
    config: Config,
    next_listener: Cell<u64>,
}

impl MemoryDom {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: Config) -> Self {
        Self {
            config,
            next_listener: Cell::new(0),
        }
    }

    /// Fire an event of type `event` on `node`, running every listener registered for it.
    /// Returns the number of listeners that ran. Events do not bubble.
    pub fn dispatch(&self, node: &MemoryNode, event: &str) -> usize {
        // Collect first, as listeners are free to mutate the tree (including this node)
        let callbacks = node
            .0
            .borrow()
            .listeners
            .iter()
            .filter(|registration| registration.event == event)
            .map(|registration| Rc::clone(&registration.callback))
            .collect::<Vec<_>>();

        let event = MemoryEvent {
            name: event.to_string(),
            target: node.clone(),
        };
        for callback in &callbacks {
            callback(&event);
        }

        callbacks.len()
    }

    /// Number of listeners currently registered on `node`.
    pub fn listener_count(&self, node: &MemoryNode) -> usize {
        node.0.borrow().listeners.len()
    }

    /// Serialize the children of `node`, without `node` itself.
    pub fn inner_markup(&self, node: &MemoryNode) -> String {
        let mut out = String::new();
        for child in node.children() {
            child.write_markup(&mut out);
        }

        out
    }
}

impl Dom for MemoryDom {
    type Node = MemoryNode;
    type Event = MemoryEvent;
    type Listener = MemoryListener;

    fn config(&self) -> &Config {
        &self.config
    }

    fn create_element(&self, tag: &str) -> MemoryNode {
        MemoryNode::new(NodeKind::Element {
            tag: tag.to_ascii_lowercase(),
            attributes: Vec::new(),
        })
    }

    fn create_text(&self, data: &str) -> MemoryNode {
        MemoryNode::new(NodeKind::Text(data.to_string()))
    }

    fn create_comment(&self, data: &str) -> MemoryNode {
        MemoryNode::new(NodeKind::Comment(data.to_string()))
    }

    fn set_text(&self, node: &MemoryNode, data: &str) {
        match &mut node.0.borrow_mut().kind {
            NodeKind::Text(text) | NodeKind::Comment(text) => {
                text.clear();
                text.push_str(data);
            }
            NodeKind::Element { tag, .. } => {
                tracing::error!(%tag, "attempted to set character data of an element");
            }
        }
    }

    fn append_child(&self, parent: &MemoryNode, node: &MemoryNode) {
        parent.push_child(node);
    }

    fn insert_before(&self, node: &MemoryNode, marker: &MemoryNode) {
        let Some(parent) = marker.parent() else {
            tracing::error!(?marker, "insertion marker is not attached to a parent");
            return;
        };

        if node == marker {
            return;
        }

        node.detach();

        {
            let mut parent_data = parent.0.borrow_mut();
            let index = parent_data
                .children
                .iter()
                .position(|child| child == marker)
                .unwrap_or(parent_data.children.len());
            parent_data.children.insert(index, node.clone());
        }

        node.0.borrow_mut().parent = Rc::downgrade(&parent.0);
    }

    fn replace(&self, old: &MemoryNode, new: &MemoryNode) {
        let Some(parent) = old.parent() else {
            tracing::error!(?old, "replaced node is not attached to a parent");
            return;
        };

        if old == new {
            return;
        }

        new.detach();

        {
            let mut parent_data = parent.0.borrow_mut();
            if let Some(index) = parent_data.children.iter().position(|child| child == old) {
                parent_data.children[index] = new.clone();
            }
        }

        old.0.borrow_mut().parent = Weak::new();
        new.0.borrow_mut().parent = Rc::downgrade(&parent.0);
    }

    fn remove(&self, node: &MemoryNode) {
        node.detach();
    }

    fn parse_markup(&self, markup: &str) -> Vec<MemoryNode> {
        let mut roots = Vec::new();
        let mut open: Vec<MemoryNode> = Vec::new();

        fn attach(open: &[MemoryNode], roots: &mut Vec<MemoryNode>, node: &MemoryNode) {
            match open.last() {
                Some(parent) => parent.push_child(node),
                None => roots.push(node.clone()),
            }
        }

        for token in tokenize(markup) {
            match token {
                Token::StartTag {
                    name,
                    attributes,
                    self_closing,
                } => {
                    let void = self_closing || is_void_element(&name);
                    let element = MemoryNode::new(NodeKind::Element {
                        tag: name,
                        attributes,
                    });

                    attach(&open, &mut roots, &element);
                    if !void {
                        open.push(element);
                    }
                }
                Token::EndTag(name) => {
                    // Close up to the matching element, ignoring end tags that match nothing
                    if let Some(position) = open.iter().rposition(|node| node.has_tag(&name)) {
                        open.truncate(position);
                    }
                }
                Token::Text(text) => {
                    attach(&open, &mut roots, &MemoryNode::new(NodeKind::Text(text)));
                }
                Token::Comment(comment) => {
                    attach(&open, &mut roots, &MemoryNode::new(NodeKind::Comment(comment)));
                }
            }
        }

        roots
    }

    fn clone_deep(&self, node: &MemoryNode) -> MemoryNode {
        node.deep_copy()
    }

    fn child_at(&self, parent: &MemoryNode, index: usize) -> Option<MemoryNode> {
        parent.0.borrow().children.get(index).cloned()
    }

    fn count_tagged(&self, root: &MemoryNode, tag: &str) -> usize {
        root.descendants()
            .iter()
            .filter(|node| node.has_tag(tag))
            .count()
    }

    fn first_tagged(&self, root: &MemoryNode, tag: &str) -> Option<MemoryNode> {
        root.descendants().into_iter().find(|node| node.has_tag(tag))
    }

    fn set_attribute(&self, node: &MemoryNode, name: &str, value: Option<&str>) {
        let mut data = node.0.borrow_mut();
        let NodeKind::Element { attributes, .. } = &mut data.kind else {
            tracing::error!(name, "attempted to set an attribute on a non-element node");
            return;
        };

        let position = attributes.iter().position(|(attribute, _)| attribute == name);
        match (position, value) {
            (Some(position), Some(value)) => attributes[position].1 = value.to_string(),
            (None, Some(value)) => attributes.push((name.to_string(), value.to_string())),
            (Some(position), None) => {
                attributes.remove(position);
            }
            (None, None) => {}
        }
    }

    fn toggle_class(&self, node: &MemoryNode, class: &str, present: bool) {
        let mut data = node.0.borrow_mut();
        let NodeKind::Element { attributes, .. } = &mut data.kind else {
            tracing::error!(class, "attempted to toggle a class on a non-element node");
            return;
        };

        let position = attributes.iter().position(|(attribute, _)| attribute == "class");
        let mut tokens = position
            .map(|position| {
                attributes[position]
                    .1
                    .split_whitespace()
                    .map(str::to_string)
                    .collect::<Vec<_>>()
            })
            .unwrap_or_default();

        match (present, tokens.iter().any(|token| token == class)) {
            (true, false) => tokens.push(class.to_string()),
            (false, true) => tokens.retain(|token| token != class),
            _ => return,
        }

        let value = tokens.join(" ");
        match position {
            Some(position) => attributes[position].1 = value,
            None => attributes.push(("class".to_string(), value)),
        }
    }

    fn add_listener(
        &self,
        node: &MemoryNode,
        event: &str,
        callback: ListenerFn<MemoryEvent>,
    ) -> MemoryListener {
        let id = self.next_listener.get();
        self.next_listener.set(id + 1);

        node.0.borrow_mut().listeners.push(Registration {
            id,
            event: event.to_string(),
            callback: Rc::from(callback),
        });

        MemoryListener {
            node: node.clone(),
            id,
        }
    }

    fn remove_listener(&self, listener: MemoryListener) {
        listener
            .node
            .0
            .borrow_mut()
            .listeners
            .retain(|registration| registration.id != listener.id);
    }

    fn serialize(&self, node: &MemoryNode) -> String {
        let mut out = String::new();
        node.write_markup(&mut out);
        out
    }
}
