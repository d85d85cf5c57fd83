//! The block tree, and the mount/patch/remove state machine shared by every kind of block.
mod collection;
mod html;
mod multi;
mod node;
mod text;

use std::rc::Rc;

pub use self::{
    collection::CollectionBlock, html::HtmlBlock, multi::MultiBlock, node::NodeBlock,
    text::TextBlock,
};
use crate::{dom::Dom, template::Template, value::Value};

/// A retained-mode block, mirroring part of the live tree.
///
/// Blocks are created with all of their data and no visual presence. A root block is mounted
/// once, then patched with every newly rendered tree (which it consumes), and finally removed.
/// Patching must only ever be done with a successor of the same kind and shape.
pub enum Block<D>
where
    D: Dom,
{
    Text(TextBlock<D>),
    Html(HtmlBlock<D>),
    Node(NodeBlock<D>),
    Multi(MultiBlock<D>),
    Collection(CollectionBlock<D>),
}

impl<D> Block<D>
where
    D: Dom + 'static,
{
    pub fn text<S>(text: S) -> Self
    where
        S: Into<String>,
    {
        Self::Text(TextBlock::new(text))
    }

    pub fn html<S>(markup: S) -> Self
    where
        S: Into<String>,
    {
        Self::Html(HtmlBlock::new(markup))
    }

    pub fn node(
        template: &Rc<Template<D>>,
        data: Vec<Value<D>>,
        children: Vec<Option<Block<D>>>,
    ) -> Self {
        Self::Node(NodeBlock::new(template, data, children))
    }

    pub fn multi(children: Vec<Option<Block<D>>>) -> Self {
        Self::Multi(MultiBlock::new(children))
    }

    pub fn collection(children: Vec<Block<D>>) -> Self {
        Self::Collection(CollectionBlock::new(children))
    }

    /// Name of the variant, for logging.
    pub fn kind(&self) -> &'static str {
        match self {
            Block::Text(_) => "text",
            Block::Html(_) => "html",
            Block::Node(_) => "node",
            Block::Multi(_) => "multi",
            Block::Collection(_) => "collection",
        }
    }

    /// The block's representative node in the live tree, [`None`] until mounted.
    pub fn handle(&self) -> Option<&D::Node> {
        match self {
            Block::Text(block) => block.handle(),
            Block::Html(block) => block.handle(),
            Block::Node(block) => block.handle(),
            Block::Multi(block) => block.handle(),
            Block::Collection(block) => block.handle(),
        }
    }

    /// Mount the block as the last child of `container`.
    pub fn mount(&mut self, dom: &D, container: &D::Node) {
        let marker = dom.create_marker();
        dom.append_child(container, &marker);

        self.mount_before(dom, &marker);

        dom.remove(&marker);
    }

    /// Insert the block's entire output immediately before `marker`.
    pub fn mount_before(&mut self, dom: &D, marker: &D::Node) {
        match self {
            Block::Text(block) => block.mount_before(dom, marker),
            Block::Html(block) => block.mount_before(dom, marker),
            Block::Node(block) => block.mount_before(dom, marker),
            Block::Multi(block) => block.mount_before(dom, marker),
            Block::Collection(block) => block.mount_before(dom, marker),
        }
    }

    /// Bring the live tree in line with `new`, re-using as much of it as possible. `new` must be
    /// of the same kind as `self`, otherwise nothing happens.
    pub fn patch(&mut self, dom: &D, new: Block<D>) {
        match (self, new) {
            (Block::Text(block), Block::Text(new)) => block.patch(dom, new),
            (Block::Html(block), Block::Html(new)) => block.patch(dom, new),
            (Block::Node(block), Block::Node(new)) => block.patch(dom, new),
            (Block::Multi(block), Block::Multi(new)) => block.patch(dom, new),
            (Block::Collection(block), Block::Collection(new)) => block.patch(dom, new),
            (block, new) => {
                tracing::error!(
                    old = block.kind(),
                    new = new.kind(),
                    "attempted to patch a block with an incompatible block"
                );
            }
        }
    }

    /// Remove the block's output from the live tree, releasing everything it owns.
    pub fn remove(&mut self, dom: &D) {
        tracing::trace!(kind = self.kind(), "removing block");

        self.detach(dom, true);
    }

    /// Release everything the block owns. Nodes are only taken out of the tree when `top_level`
    /// is set, otherwise they're assumed to leave along with an ancestor.
    pub(crate) fn detach(&mut self, dom: &D, top_level: bool) {
        match self {
            Block::Text(block) => block.detach(dom, top_level),
            Block::Html(block) => block.detach(dom, top_level),
            Block::Node(block) => block.detach(dom, top_level),
            Block::Multi(block) => block.detach(dom, top_level),
            Block::Collection(block) => block.detach(dom, top_level),
        }
    }

    /// Serialize the block's current output. Markers serialize as the host writes them.
    pub fn to_markup(&self, dom: &D) -> String {
        let mut out = String::new();
        self.write_markup(dom, &mut out);
        out
    }

    fn write_markup(&self, dom: &D, out: &mut String) {
        match self {
            Block::Text(block) => {
                if let Some(node) = block.handle() {
                    out.push_str(&dom.serialize(node));
                }
            }
            Block::Html(block) => {
                for leaf in block.leaves() {
                    out.push_str(&dom.serialize(leaf));
                }
                if let Some(anchor) = block.anchor() {
                    out.push_str(&dom.serialize(anchor));
                }
            }
            Block::Node(block) => {
                if let Some(root) = block.handle() {
                    out.push_str(&dom.serialize(root));
                }
            }
            Block::Multi(block) => {
                for (child, anchor) in block.children().iter().zip(block.anchors()) {
                    if let Some(child) = child {
                        child.write_markup(dom, out);
                    }
                    out.push_str(&dom.serialize(anchor));
                }
            }
            Block::Collection(block) => {
                for child in block.children() {
                    child.write_markup(dom, out);
                }
                if let Some(anchor) = block.anchor() {
                    out.push_str(&dom.serialize(anchor));
                }
            }
        }
    }

    pub fn as_text(&self) -> Option<&TextBlock<D>> {
        match self {
            Block::Text(block) => Some(block),
            _ => None,
        }
    }

    pub fn as_html(&self) -> Option<&HtmlBlock<D>> {
        match self {
            Block::Html(block) => Some(block),
            _ => None,
        }
    }

    pub fn as_node(&self) -> Option<&NodeBlock<D>> {
        match self {
            Block::Node(block) => Some(block),
            _ => None,
        }
    }

    pub fn as_multi(&self) -> Option<&MultiBlock<D>> {
        match self {
            Block::Multi(block) => Some(block),
            _ => None,
        }
    }

    pub fn as_collection(&self) -> Option<&CollectionBlock<D>> {
        match self {
            Block::Collection(block) => Some(block),
            _ => None,
        }
    }
}

macro_rules! impl_from_variant {
    ($($variant:ident($block:ident)),*) => {
        $(
            impl<D> From<$block<D>> for Block<D>
            where
                D: Dom,
            {
                fn from(block: $block<D>) -> Self {
                    Block::$variant(block)
                }
            }
        )*
    };
}

impl_from_variant!(
    Text(TextBlock),
    Html(HtmlBlock),
    Node(NodeBlock),
    Multi(MultiBlock),
    Collection(CollectionBlock)
);

impl<D> std::fmt::Debug for Block<D>
where
    D: Dom,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Block::Text(block) => std::fmt::Debug::fmt(block, f),
            Block::Html(block) => std::fmt::Debug::fmt(block, f),
            Block::Node(block) => std::fmt::Debug::fmt(block, f),
            Block::Multi(block) => std::fmt::Debug::fmt(block, f),
            Block::Collection(block) => std::fmt::Debug::fmt(block, f),
        }
    }
}

/// Reconcile positional slots against a successor's children. Each slot's output is kept
/// immediately before the slot's marker in `anchors`.
pub(crate) fn patch_slots<D>(
    dom: &D,
    slots: &mut [Option<Block<D>>],
    anchors: &[D::Node],
    new: Vec<Option<Block<D>>>,
) where
    D: Dom + 'static,
{
    if new.len() != slots.len() {
        tracing::warn!(
            slots = slots.len(),
            new = new.len(),
            "patching slots with a different number of children"
        );
    }

    let mut new = new.into_iter();

    for (index, (slot, anchor)) in slots.iter_mut().zip(anchors).enumerate() {
        match (slot.take(), new.next().flatten()) {
            (None, None) => {}
            (Some(mut old), None) => {
                tracing::debug!(index, kind = old.kind(), "removing child from slot");
                old.remove(dom);
            }
            (None, Some(mut child)) => {
                tracing::debug!(index, kind = child.kind(), "mounting child into slot");
                child.mount_before(dom, anchor);
                *slot = Some(child);
            }
            (Some(mut old), Some(child)) => {
                old.patch(dom, child);
                *slot = Some(old);
            }
        }
    }
}
