use std::rc::Rc;

use super::{patch_slots, Block};
use crate::{
    dom::Dom,
    template::{resolve, BindingKind, Template},
    value::{DataCell, Value},
};

/// An instance of a compiled [`Template`], with dynamic children mounted into its slots.
///
/// Building the block deep-clones the template prototype, swaps every placeholder for an insertion
/// marker, and registers one listener per handler binding. The listeners read their handler
/// through the block's [`DataCell`], so patches only ever swap data.
pub struct NodeBlock<D>
where
    D: Dom,
{
    template: Rc<Template<D>>,

    data: DataCell<D>,

    children: Vec<Option<Block<D>>>,

    /// One marker per slot, in document order. Created at build and never moved.
    anchors: Vec<D::Node>,

    /// Resolved node for each of the template's bindings.
    targets: Vec<Option<D::Node>>,

    listeners: Vec<D::Listener>,

    /// Clone of the template prototype, once mounted.
    root: Option<D::Node>,
}

impl<D> NodeBlock<D>
where
    D: Dom + 'static,
{
    /// Create a new node block for `template`. `children` are placed into the template's slots in
    /// document order.
    pub fn new(
        template: &Rc<Template<D>>,
        data: Vec<Value<D>>,
        children: Vec<Option<Block<D>>>,
    ) -> Self {
        Self {
            template: Rc::clone(template),
            data: DataCell::new(data),
            children,
            anchors: Vec::new(),
            targets: Vec::new(),
            listeners: Vec::new(),
            root: None,
        }
    }

    pub fn template(&self) -> &Rc<Template<D>> {
        &self.template
    }

    pub fn data(&self) -> &DataCell<D> {
        &self.data
    }

    pub fn children(&self) -> &[Option<Block<D>>] {
        &self.children
    }

    pub fn anchors(&self) -> &[D::Node] {
        &self.anchors
    }

    /// Number of listeners currently registered by this block, not including children.
    pub fn listener_count(&self) -> usize {
        self.listeners.len()
    }

    pub fn handle(&self) -> Option<&D::Node> {
        self.root.as_ref()
    }

    /// Apply the current data to every text, attribute and class binding.
    fn update(&self, dom: &D) {
        let empty = Value::Empty;

        self.data.with(|values| {
            for (binding, target) in self.template.bindings().iter().zip(&self.targets) {
                let Some(target) = target else {
                    continue;
                };
                let value = values.get(binding.data_index).unwrap_or(&empty);

                match &binding.kind {
                    BindingKind::Text => dom.set_text(target, &value.as_text()),
                    BindingKind::Attribute(name) => {
                        dom.set_attribute(target, name, value.as_attribute())
                    }
                    BindingKind::Class(class) => dom.toggle_class(target, class, value.is_truthy()),
                    // Registered once at build, handlers are looked up on dispatch
                    BindingKind::Handler(_) => {}
                }
            }
        });
    }

    pub(crate) fn mount_before(&mut self, dom: &D, marker: &D::Node) {
        tracing::trace!(
            slots = self.template.slot_count(),
            children = self.children.len(),
            "mounting node block"
        );

        let root = dom.clone_deep(self.template.prototype());

        // Each replacement removes a placeholder, so always take the first remaining one
        let tag = &dom.config().placeholder_tag;
        let count = dom.count_tagged(&root, tag);
        for _ in 0..count {
            let Some(placeholder) = dom.first_tagged(&root, tag) else {
                break;
            };

            let anchor = dom.create_marker();
            dom.replace(&placeholder, &anchor);
            self.anchors.push(anchor);
        }

        if self.children.len() != self.anchors.len() {
            tracing::warn!(
                slots = self.anchors.len(),
                children = self.children.len(),
                "node block children don't match template slots"
            );
            self.children.resize_with(self.anchors.len(), || None);
        }

        // Paths are only valid until children are mounted into the clone
        self.targets = self
            .template
            .bindings()
            .iter()
            .map(|binding| {
                let target = resolve(dom, &root, &binding.path);
                if target.is_none() {
                    tracing::error!(path = ?binding.path, "binding target missing from template clone");
                }
                target
            })
            .collect();

        for (binding, target) in self.template.bindings().iter().zip(&self.targets) {
            if let (BindingKind::Handler(event), Some(target)) = (&binding.kind, target) {
                let listener = self.data.listener(binding.data_index);
                self.listeners
                    .push(dom.add_listener(target, event, Box::new(listener)));
            }
        }

        self.update(dom);

        for (child, anchor) in self.children.iter_mut().zip(&self.anchors) {
            if let Some(child) = child {
                child.mount_before(dom, anchor);
            }
        }

        dom.insert_before(&root, marker);
        self.root = Some(root);
    }

    pub(crate) fn patch(&mut self, dom: &D, new: Self) {
        if self.root.is_none() {
            tracing::error!("attempted to patch a node block that isn't mounted");
            return;
        }

        if !Rc::ptr_eq(&self.template, &new.template) {
            tracing::error!("attempted to patch a node block with a different template");
            return;
        }

        tracing::trace!(slots = self.anchors.len(), "patching node block");

        self.data.replace(new.data.take());
        self.update(dom);

        patch_slots(dom, &mut self.children, &self.anchors, new.children);
    }

    pub(crate) fn detach(&mut self, dom: &D, top_level: bool) {
        for listener in self.listeners.drain(..) {
            dom.remove_listener(listener);
        }

        // Everything the children own lives within the root, so they never touch the tree
        for child in self.children.iter_mut().flatten() {
            child.detach(dom, false);
        }

        self.targets.clear();
        self.anchors.clear();

        if let Some(root) = self.root.take() {
            if top_level {
                dom.remove(&root);
            }
        }
    }
}

impl<D> std::fmt::Debug for NodeBlock<D>
where
    D: Dom,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NodeBlock")
            .field("data", &self.data)
            .field("children", &self.children)
            .field("anchors", &self.anchors)
            .field("root", &self.root)
            .finish_non_exhaustive()
    }
}
