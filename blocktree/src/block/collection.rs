use super::Block;
use crate::dom::Dom;

/// An ordered list of blocks, followed by a single trailing marker.
///
/// Collections are recomputed on each render: patching removes every current child and mounts the
/// successor's children before the same marker. No attempt is made to match children up by
/// position or key. This goes beyond the shared patch contract, where the other blocks keep the
/// live nodes they already own; callers that need node identity across renders should use a
/// [`Block::Multi`] or node slots instead.
pub struct CollectionBlock<D>
where
    D: Dom,
{
    children: Vec<Block<D>>,

    anchor: Option<D::Node>,
}

impl<D> CollectionBlock<D>
where
    D: Dom + 'static,
{
    pub fn new(children: Vec<Block<D>>) -> Self {
        Self {
            children,
            anchor: None,
        }
    }

    pub fn children(&self) -> &[Block<D>] {
        &self.children
    }

    pub fn len(&self) -> usize {
        self.children.len()
    }

    pub fn is_empty(&self) -> bool {
        self.children.is_empty()
    }

    /// The first child's handle, or the trailing marker when there are no children.
    pub fn handle(&self) -> Option<&D::Node> {
        self.children
            .first()
            .and_then(Block::handle)
            .or(self.anchor.as_ref())
    }

    pub fn anchor(&self) -> Option<&D::Node> {
        self.anchor.as_ref()
    }

    fn mount_children(dom: &D, children: &mut [Block<D>], anchor: &D::Node) {
        for child in children {
            child.mount_before(dom, anchor);
        }
    }

    pub(crate) fn mount_before(&mut self, dom: &D, marker: &D::Node) {
        tracing::trace!(len = self.children.len(), "mounting collection block");

        let anchor = dom.create_marker();
        dom.insert_before(&anchor, marker);

        Self::mount_children(dom, &mut self.children, &anchor);
        self.anchor = Some(anchor);
    }

    pub(crate) fn patch(&mut self, dom: &D, new: Self) {
        let Some(anchor) = &self.anchor else {
            tracing::error!("attempted to patch a collection block that isn't mounted");
            return;
        };

        tracing::debug!(
            old = self.children.len(),
            new = new.children.len(),
            "rebuilding collection"
        );

        for mut child in self.children.drain(..) {
            child.detach(dom, true);
        }

        self.children = new.children;
        Self::mount_children(dom, &mut self.children, anchor);
    }

    pub(crate) fn detach(&mut self, dom: &D, top_level: bool) {
        for mut child in self.children.drain(..) {
            child.detach(dom, top_level);
        }

        if let Some(anchor) = self.anchor.take() {
            if top_level {
                dom.remove(&anchor);
            }
        }
    }
}

impl<D> std::fmt::Debug for CollectionBlock<D>
where
    D: Dom,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CollectionBlock")
            .field("children", &self.children)
            .field("anchor", &self.anchor)
            .finish()
    }
}
