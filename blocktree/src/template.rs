//! Template descriptors for node blocks.
//!
//! A template is the static part of a node block: a tree of elements and text, with placeholder
//! elements marking where dynamic children go, and a list of bindings that tie parts of the tree to
//! the block's data. Templates are compiled once for a host and shared by every block built from
//! them. The compiled prototype is never mutated; blocks deep-clone it when they are built.
use std::rc::Rc;

use smallvec::SmallVec;
use thiserror::Error;

use crate::dom::Dom;

/// Child index path from the template root to a node.
pub type Path = SmallVec<[usize; 4]>;

/// Things that can go wrong when compiling a [`TemplateBuilder`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TemplateError {
    #[error("template has no pieces")]
    Empty,

    #[error("the first piece of a template must be its root")]
    MissingRoot,

    #[error("piece {piece} has no location, but a template can only have one root")]
    MultipleRoots { piece: usize },

    #[error("template root must be an element")]
    RootNotElement,

    #[error("piece {piece} is located in piece {location}, which doesn't precede it")]
    UnknownLocation { piece: usize, location: usize },

    #[error("binding refers to piece {piece}, which doesn't exist")]
    UnknownPiece { piece: usize },

    #[error("piece {piece} is not an element")]
    NotAnElement { piece: usize },

    #[error("piece {piece} uses the slot placeholder tag `{tag}` as a static element")]
    ReservedTag { piece: usize, tag: String },
}

/// A single static piece of a template.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Piece {
    Element {
        tag: String,
        attributes: Vec<(String, String)>,
    },
    Text(String),
    /// Text node whose content comes from the block's data.
    DynamicText,
    /// Placeholder for a dynamic child.
    Slot,
}

/// What a binding does with its value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BindingKind {
    /// Set the content of a text node.
    Text,

    /// Set (or remove) the named attribute.
    Attribute(String),

    /// Add or remove the named class.
    Class(String),

    /// Invoke the handler for the named event.
    Handler(String),
}

/// Ties a node within the template to an entry in the block's data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Binding {
    /// Location of the bound node, relative to the template root.
    pub path: Path,

    pub kind: BindingKind,

    /// Index into the block's data.
    pub data_index: usize,
}

/// Host independent description of a template, which can be compiled for any [`Dom`].
///
/// Pieces are added in order, and each piece is located within a previously added element by
/// its index. The first piece is the root of the template, and the only one without a location.
#[derive(Debug, Default, Clone)]
pub struct TemplateBuilder {
    pieces: Vec<(Piece, Option<usize>)>,
    bindings: Vec<(usize, BindingKind, usize)>,
}

impl TemplateBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an element with the given tag name.
    pub fn with_element<S>(mut self, tag: S, location: Option<usize>) -> Self
    where
        S: AsRef<str>,
    {
        self.pieces.push((
            Piece::Element {
                tag: tag.as_ref().to_string(),
                attributes: Vec::new(),
            },
            location,
        ));
        self
    }

    /// Add a static text node.
    pub fn with_text<S>(mut self, text: S, location: Option<usize>) -> Self
    where
        S: AsRef<str>,
    {
        self.pieces
            .push((Piece::Text(text.as_ref().to_string()), location));
        self
    }

    /// Add a text node whose content is taken from `data_index` of the block's data.
    pub fn with_dynamic_text(mut self, location: Option<usize>, data_index: usize) -> Self {
        let piece = self.pieces.len();

        self.pieces.push((Piece::DynamicText, location));
        self.bindings.push((piece, BindingKind::Text, data_index));
        self
    }

    /// Add a placeholder for a dynamic child. Slots are numbered in document order.
    pub fn with_slot(mut self, location: Option<usize>) -> Self {
        self.pieces.push((Piece::Slot, location));
        self
    }

    /// Set a static attribute on an element piece. Ignored for any other piece.
    pub fn with_attribute<N, V>(mut self, piece: usize, name: N, value: V) -> Self
    where
        N: AsRef<str>,
        V: AsRef<str>,
    {
        if let Some((Piece::Element { attributes, .. }, _)) = self.pieces.get_mut(piece) {
            attributes.push((name.as_ref().to_string(), value.as_ref().to_string()));
        }
        self
    }

    /// Bind an attribute of an element piece to `data_index`.
    pub fn bind_attribute<S>(mut self, piece: usize, name: S, data_index: usize) -> Self
    where
        S: AsRef<str>,
    {
        self.bindings.push((
            piece,
            BindingKind::Attribute(name.as_ref().to_string()),
            data_index,
        ));
        self
    }

    /// Bind the presence of a class on an element piece to `data_index`.
    pub fn bind_class<S>(mut self, piece: usize, class: S, data_index: usize) -> Self
    where
        S: AsRef<str>,
    {
        self.bindings.push((
            piece,
            BindingKind::Class(class.as_ref().to_string()),
            data_index,
        ));
        self
    }

    /// Register a handler for `event` on an element piece, taken from `data_index`.
    pub fn on<S>(mut self, piece: usize, event: S, data_index: usize) -> Self
    where
        S: AsRef<str>,
    {
        self.bindings.push((
            piece,
            BindingKind::Handler(event.as_ref().to_string()),
            data_index,
        ));
        self
    }

    /// Check the structure of the template.
    fn validate(&self) -> Result<(), TemplateError> {
        if self.pieces.is_empty() {
            return Err(TemplateError::Empty);
        }

        for (piece, (_, location)) in self.pieces.iter().enumerate() {
            match (piece, *location) {
                (0, None) => {}
                (0, Some(_)) => return Err(TemplateError::MissingRoot),
                (piece, None) => return Err(TemplateError::MultipleRoots { piece }),
                (piece, Some(location)) if location >= piece => {
                    return Err(TemplateError::UnknownLocation { piece, location });
                }
                (_, Some(location)) => {
                    if !matches!(self.pieces[location].0, Piece::Element { .. }) {
                        return Err(TemplateError::NotAnElement { piece: location });
                    }
                }
            }
        }

        if !matches!(self.pieces[0].0, Piece::Element { .. }) {
            return Err(TemplateError::RootNotElement);
        }

        for (piece, kind, _) in &self.bindings {
            let Some((target, _)) = self.pieces.get(*piece) else {
                return Err(TemplateError::UnknownPiece { piece: *piece });
            };

            let valid = match kind {
                BindingKind::Text => matches!(target, Piece::DynamicText),
                _ => matches!(target, Piece::Element { .. }),
            };
            if !valid {
                return Err(TemplateError::NotAnElement { piece: *piece });
            }
        }

        Ok(())
    }

    /// Build the prototype for `dom`, producing a template that can be shared between blocks.
    pub fn compile<D>(self, dom: &D) -> Result<Rc<Template<D>>, TemplateError>
    where
        D: Dom,
    {
        self.validate()?;

        let placeholder_tag = &dom.config().placeholder_tag;

        // Node blocks find slots by tag, so a static element with that tag would become one
        for (piece, (kind, _)) in self.pieces.iter().enumerate() {
            if let Piece::Element { tag, .. } = kind {
                if tag.eq_ignore_ascii_case(placeholder_tag) {
                    return Err(TemplateError::ReservedTag {
                        piece,
                        tag: placeholder_tag.clone(),
                    });
                }
            }
        }

        let mut nodes: Vec<D::Node> = Vec::with_capacity(self.pieces.len());
        let mut paths: Vec<Path> = Vec::with_capacity(self.pieces.len());
        let mut child_counts = vec![0; self.pieces.len()];
        let mut slot_count = 0;

        for (piece, location) in &self.pieces {
            let node = match piece {
                Piece::Element { tag, attributes } => {
                    let element = dom.create_element(tag);
                    for (name, value) in attributes {
                        dom.set_attribute(&element, name, Some(value));
                    }
                    element
                }
                Piece::Text(text) => dom.create_text(text),
                Piece::DynamicText => dom.create_text(""),
                Piece::Slot => {
                    slot_count += 1;
                    dom.create_element(placeholder_tag)
                }
            };

            let path = match *location {
                Some(location) => {
                    dom.append_child(&nodes[location], &node);

                    let mut path = paths[location].clone();
                    path.push(child_counts[location]);
                    child_counts[location] += 1;
                    path
                }
                None => Path::new(),
            };

            nodes.push(node);
            paths.push(path);
        }

        let bindings = self
            .bindings
            .into_iter()
            .map(|(piece, kind, data_index)| Binding {
                path: paths[piece].clone(),
                kind,
                data_index,
            })
            .collect::<Vec<_>>();

        let data_len = bindings
            .iter()
            .map(|binding| binding.data_index + 1)
            .max()
            .unwrap_or(0);

        tracing::trace!(
            pieces = nodes.len(),
            slots = slot_count,
            bindings = bindings.len(),
            "compiled template"
        );

        Ok(Rc::new(Template {
            prototype: nodes.swap_remove(0),
            bindings,
            slot_count,
            data_len,
        }))
    }
}

/// A compiled template, holding the prototype that node blocks clone when they're built.
pub struct Template<D>
where
    D: Dom,
{
    prototype: D::Node,
    bindings: Vec<Binding>,
    slot_count: usize,
    data_len: usize,
}

impl<D> Template<D>
where
    D: Dom,
{
    /// Start describing a new template.
    pub fn build() -> TemplateBuilder {
        TemplateBuilder::new()
    }

    /// The root of the prototype. Must not be mutated or mounted.
    pub fn prototype(&self) -> &D::Node {
        &self.prototype
    }

    pub fn bindings(&self) -> &[Binding] {
        &self.bindings
    }

    /// Number of dynamic child slots.
    pub fn slot_count(&self) -> usize {
        self.slot_count
    }

    /// Smallest data length that satisfies every binding.
    pub fn data_len(&self) -> usize {
        self.data_len
    }
}

/// Follow `path` down from `root`.
pub(crate) fn resolve<D>(dom: &D, root: &D::Node, path: &[usize]) -> Option<D::Node>
where
    D: Dom,
{
    path.iter()
        .try_fold(root.clone(), |node, index| dom.child_at(&node, *index))
}

#[cfg(test)]
mod tests {
    use smallvec::smallvec;

    use super::*;
    use crate::dom::{memory::MemoryDom, Config};

    fn card() -> TemplateBuilder {
        Template::<MemoryDom>::build()
            .with_element("div", None)
            .with_attribute(0, "class", "card")
            .with_element("h1", Some(0))
            .with_dynamic_text(Some(1), 0)
            .with_slot(Some(0))
            .with_element("button", Some(0))
            .with_text("go", Some(4))
            .bind_attribute(4, "title", 1)
            .bind_class(0, "active", 2)
            .on(4, "click", 3)
            .with_slot(Some(0))
    }

    #[test]
    fn compiles_prototype_and_paths() {
        let dom = MemoryDom::new();

        let template = card().compile(&dom).unwrap();

        assert_eq!(
            dom.serialize(template.prototype()),
            r#"<div class="card"><h1></h1><block-child></block-child><button>go</button><block-child></block-child></div>"#
        );
        assert_eq!(template.slot_count(), 2);
        assert_eq!(template.data_len(), 4);
        assert_eq!(
            template.bindings(),
            &[
                Binding {
                    path: smallvec![0, 0],
                    kind: BindingKind::Text,
                    data_index: 0,
                },
                Binding {
                    path: smallvec![2],
                    kind: BindingKind::Attribute("title".into()),
                    data_index: 1,
                },
                Binding {
                    path: smallvec![],
                    kind: BindingKind::Class("active".into()),
                    data_index: 2,
                },
                Binding {
                    path: smallvec![2],
                    kind: BindingKind::Handler("click".into()),
                    data_index: 3,
                },
            ]
        );
    }

    #[test]
    fn paths_resolve_against_a_clone() {
        let dom = MemoryDom::new();
        let template = card().compile(&dom).unwrap();
        let clone = dom.clone_deep(template.prototype());

        let button = resolve(&dom, &clone, &template.bindings()[1].path).unwrap();

        assert_eq!(button.tag().as_deref(), Some("button"));
        assert!(resolve(&dom, &clone, &[9]).is_none());
    }

    #[test]
    fn placeholder_tag_follows_config() {
        let dom = MemoryDom::with_config(Config::default().with_placeholder_tag("x-slot"));

        let template = Template::<MemoryDom>::build()
            .with_element("p", None)
            .with_slot(Some(0))
            .compile(&dom)
            .unwrap();

        assert_eq!(
            dom.serialize(template.prototype()),
            "<p><x-slot></x-slot></p>"
        );
    }

    #[test]
    fn rejects_malformed_templates() {
        let dom = MemoryDom::new();

        let error = |builder: TemplateBuilder| builder.compile(&dom).err();

        assert_eq!(error(TemplateBuilder::new()), Some(TemplateError::Empty));
        assert_eq!(
            error(TemplateBuilder::new().with_text("loose", None)),
            Some(TemplateError::RootNotElement)
        );
        assert_eq!(
            error(
                TemplateBuilder::new()
                    .with_element("p", None)
                    .with_element("p", None)
            ),
            Some(TemplateError::MultipleRoots { piece: 1 })
        );
        assert_eq!(
            error(
                TemplateBuilder::new()
                    .with_element("p", None)
                    .with_text("a", Some(3))
            ),
            Some(TemplateError::UnknownLocation {
                piece: 1,
                location: 3
            })
        );
        assert_eq!(
            error(
                TemplateBuilder::new()
                    .with_element("p", None)
                    .with_text("a", Some(0))
                    .with_text("b", Some(1))
            ),
            Some(TemplateError::NotAnElement { piece: 1 })
        );
        assert_eq!(
            error(
                TemplateBuilder::new()
                    .with_element("p", None)
                    .on(4, "click", 0)
            ),
            Some(TemplateError::UnknownPiece { piece: 4 })
        );
        assert_eq!(
            error(
                TemplateBuilder::new()
                    .with_element("div", None)
                    .with_element("Block-Child", Some(0))
                    .with_dynamic_text(Some(1), 0)
            ),
            Some(TemplateError::ReservedTag {
                piece: 1,
                tag: "block-child".into()
            })
        );
    }

    #[test]
    fn reserved_tag_follows_config() {
        let dom = MemoryDom::with_config(Config::default().with_placeholder_tag("x-slot"));

        let template = TemplateBuilder::new()
            .with_element("div", None)
            .with_element("block-child", Some(0))
            .with_slot(Some(0))
            .compile(&dom)
            .unwrap();
        assert_eq!(template.slot_count(), 1);

        let error = TemplateBuilder::new()
            .with_element("x-slot", None)
            .compile(&dom)
            .err();
        assert_eq!(
            error,
            Some(TemplateError::ReservedTag {
                piece: 0,
                tag: "x-slot".into()
            })
        );
    }

    #[test]
    fn errors_describe_themselves() {
        assert_eq!(
            TemplateError::UnknownLocation {
                piece: 2,
                location: 5
            }
            .to_string(),
            "piece 2 is located in piece 5, which doesn't precede it"
        );
    }
}
