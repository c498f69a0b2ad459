use std::borrow::Cow;

use glam::Affine3A;

use crate::scene::events::Dispatcher;
use crate::scene::transform::Transform;
use crate::scene::{EmitterKey, LightKey, MeshKey, NodeHandle};

/// What a node carries besides its transform.
///
/// The variants are mutually exclusive, so a node is never both a light and
/// a graphic. Component data lives in the owning [`Scene`](super::Scene)'s
/// slot maps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum NodeContent {
    /// Plain grouping node.
    #[default]
    Group,
    Mesh(MeshKey),
    Light(LightKey),
    /// Positional audio source.
    Emitter(EmitterKey),
}

/// A scene node: hierarchy links, transform, visibility and content.
///
/// # Hierarchy
///
/// - `parent`: non-owning handle to the parent (None for the scene root and
///   for detached nodes)
/// - `children`: owned child handles, in insertion order; this is also the
///   traversal and draw order
#[derive(Debug)]
pub struct Node {
    pub name: Cow<'static, str>,

    pub(crate) parent: Option<NodeHandle>,
    pub(crate) children: Vec<NodeHandle>,

    pub transform: Transform,

    /// Invisible nodes hide their whole subtree.
    pub visible: bool,

    pub(crate) content: NodeContent,
    pub(crate) dispatcher: Dispatcher,
}

impl Node {
    #[must_use]
    pub fn new(name: impl Into<Cow<'static, str>>) -> Self {
        Self {
            name: name.into(),
            parent: None,
            children: Vec::new(),
            transform: Transform::new(),
            visible: true,
            content: NodeContent::Group,
            dispatcher: Dispatcher::new(),
        }
    }

    #[must_use]
    pub fn with_content(name: impl Into<Cow<'static, str>>, content: NodeContent) -> Self {
        let mut node = Self::new(name);
        node.content = content;
        node
    }

    #[inline]
    #[must_use]
    pub fn parent(&self) -> Option<NodeHandle> {
        self.parent
    }

    #[inline]
    #[must_use]
    pub fn children(&self) -> &[NodeHandle] {
        &self.children
    }

    #[inline]
    #[must_use]
    pub fn content(&self) -> NodeContent {
        self.content
    }

    #[inline]
    #[must_use]
    pub fn world_matrix(&self) -> &Affine3A {
        self.transform.world_matrix()
    }

    #[inline]
    pub fn dispatcher_mut(&mut self) -> &mut Dispatcher {
        &mut self.dispatcher
    }
}

impl Default for Node {
    fn default() -> Self {
        Self::new("")
    }
}
