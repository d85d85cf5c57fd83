use super::{patch_slots, Block};
use crate::dom::Dom;

/// A fixed number of optional children, each followed by its own insertion marker.
///
/// A block with no slots has no footprint in the live tree at all, so it never has a handle.
pub struct MultiBlock<D>
where
    D: Dom,
{
    children: Vec<Option<Block<D>>>,

    /// Created when mounted, then kept for the life of the block.
    anchors: Vec<D::Node>,
}

impl<D> MultiBlock<D>
where
    D: Dom + 'static,
{
    pub fn new(children: Vec<Option<Block<D>>>) -> Self {
        Self {
            children,
            anchors: Vec::new(),
        }
    }

    pub fn children(&self) -> &[Option<Block<D>>] {
        &self.children
    }

    pub fn anchors(&self) -> &[D::Node] {
        &self.anchors
    }

    /// Number of slots.
    pub fn arity(&self) -> usize {
        self.children.len()
    }

    /// The marker of the first slot. Always [`None`] when there are no slots.
    pub fn handle(&self) -> Option<&D::Node> {
        self.anchors.first()
    }

    pub(crate) fn mount_before(&mut self, dom: &D, marker: &D::Node) {
        tracing::trace!(arity = self.children.len(), "mounting multi block");

        for child in &mut self.children {
            let anchor = dom.create_marker();
            dom.insert_before(&anchor, marker);

            if let Some(child) = child {
                child.mount_before(dom, &anchor);
            }

            self.anchors.push(anchor);
        }
    }

    pub(crate) fn patch(&mut self, dom: &D, new: Self) {
        if self.anchors.len() != self.children.len() {
            tracing::error!("attempted to patch a multi block that isn't mounted");
            return;
        }

        tracing::trace!(arity = self.children.len(), "patching multi block");

        patch_slots(dom, &mut self.children, &self.anchors, new.children);
    }

    pub(crate) fn detach(&mut self, dom: &D, top_level: bool) {
        for child in self.children.iter_mut().flatten() {
            child.detach(dom, top_level);
        }

        for anchor in self.anchors.drain(..) {
            if top_level {
                dom.remove(&anchor);
            }
        }
    }
}

impl<D> std::fmt::Debug for MultiBlock<D>
where
    D: Dom,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MultiBlock")
            .field("children", &self.children)
            .field("anchors", &self.anchors)
            .finish()
    }
}
