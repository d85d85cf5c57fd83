use crate::dom::Dom;

/// Raw markup injected into the tree. The markup is parsed by the host, and every patch throws
/// away the previous nodes in favour of a fresh parse of the new markup.
pub struct HtmlBlock<D>
where
    D: Dom,
{
    markup: String,

    /// Top level nodes produced by parsing the markup.
    leaves: Vec<D::Node>,

    /// Trailing marker, which new leaves are inserted before.
    anchor: Option<D::Node>,
}

impl<D> HtmlBlock<D>
where
    D: Dom,
{
    pub fn new<S>(markup: S) -> Self
    where
        S: Into<String>,
    {
        Self {
            markup: markup.into(),
            leaves: Vec::new(),
            anchor: None,
        }
    }

    pub fn markup(&self) -> &str {
        &self.markup
    }

    /// The first parsed node, or the trailing marker when the markup produced nothing.
    pub fn handle(&self) -> Option<&D::Node> {
        self.leaves.first().or(self.anchor.as_ref())
    }

    pub fn leaves(&self) -> &[D::Node] {
        &self.leaves
    }

    /// The trailing marker, once mounted.
    pub fn anchor(&self) -> Option<&D::Node> {
        self.anchor.as_ref()
    }

    /// Parse `markup` and insert every resulting node before `anchor`.
    fn insert_leaves(dom: &D, markup: &str, anchor: &D::Node) -> Vec<D::Node> {
        let leaves = dom.parse_markup(markup);
        for leaf in &leaves {
            dom.insert_before(leaf, anchor);
        }

        leaves
    }

    pub(crate) fn mount_before(&mut self, dom: &D, marker: &D::Node) {
        tracing::trace!(len = self.markup.len(), "mounting html block");

        let anchor = dom.create_marker();
        dom.insert_before(&anchor, marker);

        self.leaves = Self::insert_leaves(dom, &self.markup, &anchor);
        self.anchor = Some(anchor);
    }

    pub(crate) fn patch(&mut self, dom: &D, new: Self) {
        let Some(anchor) = &self.anchor else {
            tracing::error!("attempted to patch an html block that isn't mounted");
            return;
        };

        tracing::trace!(
            old = self.leaves.len(),
            len = new.markup.len(),
            "patching html block"
        );

        for leaf in self.leaves.drain(..) {
            dom.remove(&leaf);
        }

        self.leaves = Self::insert_leaves(dom, &new.markup, anchor);
        self.markup = new.markup;
    }

    pub(crate) fn detach(&mut self, dom: &D, top_level: bool) {
        let leaves = std::mem::take(&mut self.leaves);
        let anchor = self.anchor.take();

        if top_level {
            leaves
                .iter()
                .chain(anchor.iter())
                .for_each(|node| dom.remove(node));
        }
    }
}

impl<D> std::fmt::Debug for HtmlBlock<D>
where
    D: Dom,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HtmlBlock")
            .field("markup", &self.markup)
            .field("leaves", &self.leaves)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::memory::{MemoryDom, MemoryNode};

    fn mounted(dom: &MemoryDom, markup: &str) -> (MemoryNode, HtmlBlock<MemoryDom>) {
        let container = dom.create_element("div");
        let marker = dom.create_marker();
        dom.append_child(&container, &marker);

        let mut block = HtmlBlock::new(markup);
        block.mount_before(dom, &marker);

        (container, block)
    }

    #[test]
    fn mounts_every_leaf_in_order() {
        let dom = MemoryDom::new();

        let (container, block) = mounted(&dom, "one<b>two</b><i>three</i>");

        assert_eq!(block.leaves().len(), 3);
        assert_eq!(block.handle().and_then(|node| node.text()).as_deref(), Some("one"));
        assert_eq!(dom.inner_markup(&container), "one<b>two</b><i>three</i>");
    }

    #[test]
    fn empty_markup_uses_the_anchor() {
        let dom = MemoryDom::new();

        let (container, block) = mounted(&dom, "");

        assert!(block.leaves().is_empty());
        let handle = block.handle().unwrap();
        assert_eq!(handle.parent(), Some(container));
        assert_eq!(handle.text().as_deref(), Some(""));
    }

    #[test]
    fn patch_replaces_leaves_in_place() {
        let dom = MemoryDom::new();
        let (container, mut block) = mounted(&dom, "<p>old</p><p>old</p>");
        let old = block.leaves().to_vec();
        let after = dom.create_text("after");
        dom.append_child(&container, &after);

        block.patch(&dom, HtmlBlock::new("<em>new</em>"));

        assert!(old.iter().all(|leaf| leaf.parent().is_none()));
        assert_eq!(block.markup(), "<em>new</em>");
        assert_eq!(dom.inner_markup(&container), "<em>new</em>after");
    }

    #[test]
    fn remove_clears_leaves_and_anchor() {
        let dom = MemoryDom::new();
        let (container, mut block) = mounted(&dom, "<hr>text");

        block.detach(&dom, true);

        // Only the caller's marker is left
        assert_eq!(container.children().len(), 1);
        assert!(block.handle().is_none());
    }
}
