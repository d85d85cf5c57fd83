//! Browser implementation of [`Dom`], over `web-sys`.
//!
//! DOM exceptions are logged and otherwise ignored, so that a single failing operation can't take
//! down the whole render.
use js_sys::Function;
use wasm_bindgen::{prelude::Closure, JsCast, JsValue};
use web_sys::{Document, Element, Event, HtmlTemplateElement, Node};

use super::{escape_text, Config, Dom, ListenerFn};

/// Install a panic hook that forwards panics to the browser console.
pub fn install_panic_hook() {
    console_error_panic_hook::set_once();
}

fn log_failure(operation: &str, error: JsValue) {
    tracing::error!(operation, ?error, "dom operation failed");
}

/// A listener registered through [`WebDom`]. The closure lives for as long as the registration.
pub struct WebListener {
    target: Node,
    event: String,
    closure: Closure<dyn Fn(Event)>,
}

impl WebListener {
    fn function(&self) -> &Function {
        self.closure.as_ref().unchecked_ref()
    }
}

impl std::fmt::Debug for WebListener {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WebListener")
            .field("target", &self.target)
            .field("event", &self.event)
            .finish_non_exhaustive()
    }
}

/// Renders blocks into a browser [`Document`].
pub struct WebDom {
    document: Document,
    config: Config,
}

impl WebDom {
    /// Create a new host for `document`.
    pub fn new(document: &Document) -> Self {
        Self::with_config(document, Config::default())
    }

    pub fn with_config(document: &Document, config: Config) -> Self {
        Self {
            document: document.clone(),
            config,
        }
    }

    /// Create a host for the document of the current window, if there is one.
    pub fn from_window() -> Option<Self> {
        let document = web_sys::window()?.document()?;

        Some(Self::new(&document))
    }

    pub fn document(&self) -> &Document {
        &self.document
    }

    fn parent_of(&self, node: &Node, operation: &str) -> Option<Node> {
        let parent = node.parent_node();
        if parent.is_none() {
            tracing::error!(operation, ?node, "node is not attached to a parent");
        }

        parent
    }
}

impl Dom for WebDom {
    type Node = Node;
    type Event = Event;
    type Listener = WebListener;

    fn config(&self) -> &Config {
        &self.config
    }

    fn create_element(&self, tag: &str) -> Node {
        match self.document.create_element(tag) {
            Ok(element) => element.into(),
            Err(error) => {
                log_failure("create_element", error);
                // Only invalid tag names fail, fall back to something inert
                self.document.create_comment(tag).into()
            }
        }
    }

    fn create_text(&self, data: &str) -> Node {
        self.document.create_text_node(data).into()
    }

    fn create_comment(&self, data: &str) -> Node {
        self.document.create_comment(data).into()
    }

    fn set_text(&self, node: &Node, data: &str) {
        match node.node_type() {
            Node::TEXT_NODE | Node::COMMENT_NODE => node.set_text_content(Some(data)),
            node_type => {
                tracing::error!(node_type, "attempted to set character data of a non-text node");
            }
        }
    }

    fn append_child(&self, parent: &Node, node: &Node) {
        if let Err(error) = parent.append_child(node) {
            log_failure("append_child", error);
        }
    }

    fn insert_before(&self, node: &Node, marker: &Node) {
        let Some(parent) = self.parent_of(marker, "insert_before") else {
            return;
        };

        if let Err(error) = parent.insert_before(node, Some(marker)) {
            log_failure("insert_before", error);
        }
    }

    fn replace(&self, old: &Node, new: &Node) {
        let Some(parent) = self.parent_of(old, "replace") else {
            return;
        };

        if let Err(error) = parent.replace_child(new, old) {
            log_failure("replace", error);
        }
    }

    fn remove(&self, node: &Node) {
        // Already detached nodes have nothing to do
        if let Some(parent) = node.parent_node() {
            if let Err(error) = parent.remove_child(node) {
                log_failure("remove", error);
            }
        }
    }

    fn parse_markup(&self, markup: &str) -> Vec<Node> {
        let template = match self
            .document
            .create_element("template")
            .map(|element| element.unchecked_into::<HtmlTemplateElement>())
        {
            Ok(template) => template,
            Err(error) => {
                log_failure("parse_markup", error);
                return Vec::new();
            }
        };

        template.set_inner_html(markup);
        let content = template.content();

        let mut nodes = Vec::new();
        while let Some(child) = content.first_child() {
            if let Err(error) = content.remove_child(&child) {
                log_failure("parse_markup", error);
                break;
            }
            nodes.push(child);
        }

        nodes
    }

    fn clone_deep(&self, node: &Node) -> Node {
        node.clone_node_with_deep(true).unwrap_or_else(|error| {
            log_failure("clone_deep", error);
            self.document.create_text_node("").into()
        })
    }

    fn child_at(&self, parent: &Node, index: usize) -> Option<Node> {
        parent.child_nodes().get(u32::try_from(index).ok()?)
    }

    fn count_tagged(&self, root: &Node, tag: &str) -> usize {
        root.dyn_ref::<Element>()
            .map(|element| element.get_elements_by_tag_name(tag).length() as usize)
            .unwrap_or(0)
    }

    fn first_tagged(&self, root: &Node, tag: &str) -> Option<Node> {
        root.dyn_ref::<Element>()?
            .get_elements_by_tag_name(tag)
            .item(0)
            .map(Node::from)
    }

    fn set_attribute(&self, node: &Node, name: &str, value: Option<&str>) {
        let Some(element) = node.dyn_ref::<Element>() else {
            tracing::error!(name, "attempted to set an attribute on a non-element node");
            return;
        };

        let result = match value {
            Some(value) => element.set_attribute(name, value),
            None => element.remove_attribute(name),
        };
        if let Err(error) = result {
            log_failure("set_attribute", error);
        }
    }

    fn toggle_class(&self, node: &Node, class: &str, present: bool) {
        let Some(element) = node.dyn_ref::<Element>() else {
            tracing::error!(class, "attempted to toggle a class on a non-element node");
            return;
        };

        if let Err(error) = element.class_list().toggle_with_force(class, present) {
            log_failure("toggle_class", error);
        }
    }

    fn add_listener(&self, node: &Node, event: &str, callback: ListenerFn<Event>) -> WebListener {
        let listener = WebListener {
            target: node.clone(),
            event: event.to_string(),
            closure: Closure::<dyn Fn(Event)>::new(move |event: Event| callback(&event)),
        };

        if let Err(error) = node.add_event_listener_with_callback(event, listener.function()) {
            log_failure("add_listener", error);
        }

        listener
    }

    fn remove_listener(&self, listener: WebListener) {
        if let Err(error) = listener
            .target
            .remove_event_listener_with_callback(&listener.event, listener.function())
        {
            log_failure("remove_listener", error);
        }
    }

    fn serialize(&self, node: &Node) -> String {
        if let Some(element) = node.dyn_ref::<Element>() {
            return element.outer_html();
        }

        let data = node.text_content().unwrap_or_default();
        match node.node_type() {
            Node::COMMENT_NODE => format!("<!--{data}-->"),
            _ => escape_text(&data),
        }
    }
}
