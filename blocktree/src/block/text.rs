use crate::dom::Dom;

/// A single text leaf. Patching re-uses the same node, only replacing its character data.
pub struct TextBlock<D>
where
    D: Dom,
{
    text: String,

    /// The live text node, once mounted.
    node: Option<D::Node>,
}

impl<D> TextBlock<D>
where
    D: Dom,
{
    pub fn new<S>(text: S) -> Self
    where
        S: Into<String>,
    {
        Self {
            text: text.into(),
            node: None,
        }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn handle(&self) -> Option<&D::Node> {
        self.node.as_ref()
    }

    pub(crate) fn mount_before(&mut self, dom: &D, marker: &D::Node) {
        tracing::trace!(text = %self.text, "mounting text block");

        let node = dom.create_text(&self.text);
        dom.insert_before(&node, marker);
        self.node = Some(node);
    }

    pub(crate) fn patch(&mut self, dom: &D, new: Self) {
        if new.text == self.text {
            return;
        }

        if let Some(node) = &self.node {
            dom.set_text(node, &new.text);
        }
        self.text = new.text;
    }

    pub(crate) fn detach(&mut self, dom: &D, top_level: bool) {
        if let Some(node) = self.node.take() {
            if top_level {
                dom.remove(&node);
            }
        }
    }
}

impl<D> std::fmt::Debug for TextBlock<D>
where
    D: Dom,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TextBlock")
            .field("text", &self.text)
            .field("node", &self.node)
            .finish()
    }
}
