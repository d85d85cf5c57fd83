use std::{borrow::Cow, cell::RefCell, fmt, rc::Rc};

use crate::dom::Dom;

/// An event handler. Shared, so that the same handler can be handed to successive renders.
pub type Handler<D> = Rc<dyn Fn(&<D as Dom>::Event)>;

/// A single dynamic value driving a binding within a node block.
pub enum Value<D>
where
    D: Dom,
{
    /// No value. Removes attributes and classes, renders as empty text.
    Empty,

    Text(String),

    Bool(bool),

    /// Handler for an event binding.
    Handler(Handler<D>),
}

impl<D> Value<D>
where
    D: Dom,
{
    /// Wrap a closure as a [`Value::Handler`].
    pub fn handler<F>(handler: F) -> Self
    where
        F: 'static + Fn(&D::Event),
    {
        Self::Handler(Rc::new(handler))
    }

    /// Content used for text bindings.
    pub fn as_text(&self) -> Cow<'_, str> {
        match self {
            Value::Text(text) => Cow::Borrowed(text),
            Value::Bool(true) => Cow::Borrowed("true"),
            Value::Bool(false) => Cow::Borrowed("false"),
            Value::Empty | Value::Handler(_) => Cow::Borrowed(""),
        }
    }

    /// Content used for attribute bindings, where [`None`] means the attribute is absent.
    pub fn as_attribute(&self) -> Option<&str> {
        match self {
            Value::Text(text) => Some(text),
            Value::Bool(true) => Some(""),
            Value::Bool(false) | Value::Empty | Value::Handler(_) => None,
        }
    }

    /// Whether a class binding should add its class.
    pub fn is_truthy(&self) -> bool {
        match self {
            Value::Text(text) => !text.is_empty(),
            Value::Bool(value) => *value,
            Value::Handler(_) => true,
            Value::Empty => false,
        }
    }
}

impl<D> Clone for Value<D>
where
    D: Dom,
{
    fn clone(&self) -> Self {
        match self {
            Value::Empty => Value::Empty,
            Value::Text(text) => Value::Text(text.clone()),
            Value::Bool(value) => Value::Bool(*value),
            Value::Handler(handler) => Value::Handler(Rc::clone(handler)),
        }
    }
}

impl<D> fmt::Debug for Value<D>
where
    D: Dom,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Empty => f.write_str("Empty"),
            Value::Text(text) => f.debug_tuple("Text").field(text).finish(),
            Value::Bool(value) => f.debug_tuple("Bool").field(value).finish(),
            Value::Handler(_) => f.write_str("Handler(..)"),
        }
    }
}

impl<D> Default for Value<D>
where
    D: Dom,
{
    fn default() -> Self {
        Value::Empty
    }
}

impl<D> From<&str> for Value<D>
where
    D: Dom,
{
    fn from(text: &str) -> Self {
        Value::Text(text.to_string())
    }
}

impl<D> From<String> for Value<D>
where
    D: Dom,
{
    fn from(text: String) -> Self {
        Value::Text(text)
    }
}

impl<D> From<bool> for Value<D>
where
    D: Dom,
{
    fn from(value: bool) -> Self {
        Value::Bool(value)
    }
}

/// The data of a node block, shared between the block and the listeners it registered.
///
/// Listeners are registered once, when the block is built. Rather than capturing a handler, each
/// listener holds a clone of this cell along with the index of its handler, and looks the handler
/// up every time it fires. Patching swaps the contents of the cell, so listeners always run the
/// most recent handler without ever being re-registered.
pub struct DataCell<D>(Rc<RefCell<Vec<Value<D>>>>)
where
    D: Dom;

impl<D> DataCell<D>
where
    D: Dom + 'static,
{
    pub fn new(values: Vec<Value<D>>) -> Self {
        Self(Rc::new(RefCell::new(values)))
    }

    /// Swap in a new set of values.
    pub fn replace(&self, values: Vec<Value<D>>) {
        *self.0.borrow_mut() = values;
    }

    /// Take the values out, leaving the cell empty.
    pub fn take(&self) -> Vec<Value<D>> {
        std::mem::take(&mut *self.0.borrow_mut())
    }

    /// Copy of the value at `index`, [`Value::Empty`] if there is none.
    pub fn get(&self, index: usize) -> Value<D> {
        self.0.borrow().get(index).cloned().unwrap_or_default()
    }

    pub fn len(&self) -> usize {
        self.0.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.borrow().is_empty()
    }

    /// Run `f` with a view of every value.
    pub fn with<R>(&self, f: impl FnOnce(&[Value<D>]) -> R) -> R {
        f(&self.0.borrow())
    }

    /// The handler currently stored at `index`, if that value is a handler.
    pub fn handler(&self, index: usize) -> Option<Handler<D>> {
        match self.0.borrow().get(index) {
            Some(Value::Handler(handler)) => Some(Rc::clone(handler)),
            _ => None,
        }
    }

    /// Create a listener that dispatches to whatever handler is stored at `index` when it fires.
    pub fn listener(&self, index: usize) -> impl Fn(&D::Event) + 'static {
        let cell = self.clone();

        move |event: &D::Event| {
            // Release the borrow before running the handler, as it may well trigger a patch
            if let Some(handler) = cell.handler(index) {
                handler(event);
            }
        }
    }
}

impl<D> Clone for DataCell<D>
where
    D: Dom,
{
    fn clone(&self) -> Self {
        Self(Rc::clone(&self.0))
    }
}

impl<D> fmt::Debug for DataCell<D>
where
    D: Dom,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0.try_borrow() {
            Ok(values) => f.debug_tuple("DataCell").field(&*values).finish(),
            Err(_) => f.write_str("DataCell(<borrowed>)"),
        }
    }
}
