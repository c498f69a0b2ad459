use std::borrow::Cow;

use slotmap::SlotMap;

use crate::renderer::backend::GeometryId;
use crate::resources::audio::AudioEmitter;
use crate::resources::geometry::BoundingBox;
use crate::resources::mesh::Mesh;
use crate::scene::events::{NodeEvent, NodeEventKind, SubscriptionId};
use crate::scene::light::Light;
use crate::scene::node::{Node, NodeContent};
use crate::scene::transform_system;
use crate::scene::wrapper::SceneNode;
use crate::scene::{EmitterKey, LightKey, MeshKey, NodeHandle};

/// Scene graph container.
///
/// Owns every node and component. The hierarchy hangs off a single root
/// created with the scene; nodes created through the `create_*` methods start
/// detached and join the graph through [`Scene::add`]. Only nodes reachable
/// from the root are updated and rendered.
pub struct Scene {
    pub(crate) nodes: SlotMap<NodeHandle, Node>,
    root: NodeHandle,

    // ====组件池====
    pub meshes: SlotMap<MeshKey, Mesh>,
    pub lights: SlotMap<LightKey, Light>,
    pub emitters: SlotMap<EmitterKey, AudioEmitter>,
}

impl Default for Scene {
    fn default() -> Self {
        Self::new()
    }
}

impl Scene {
    #[must_use]
    pub fn new() -> Self {
        let mut nodes = SlotMap::with_key();
        let root = nodes.insert(Node::new("Scene"));
        Self {
            nodes,
            root,
            meshes: SlotMap::with_key(),
            lights: SlotMap::with_key(),
            emitters: SlotMap::with_key(),
        }
    }

    #[inline]
    #[must_use]
    pub fn root(&self) -> NodeHandle {
        self.root
    }

    // ========================================================================
    // Node creation
    // ========================================================================

    /// Creates a detached group node.
    pub fn create_node(&mut self, name: impl Into<Cow<'static, str>>) -> NodeHandle {
        self.nodes.insert(Node::new(name))
    }

    /// Creates a detached node carrying `mesh`.
    pub fn create_mesh(&mut self, mesh: Mesh) -> NodeHandle {
        let name = mesh.name.clone();
        let key = self.meshes.insert(mesh);
        self.nodes.insert(Node::with_content(name, NodeContent::Mesh(key)))
    }

    /// Creates a detached node carrying `light`.
    pub fn create_light(&mut self, light: Light) -> NodeHandle {
        let key = self.lights.insert(light);
        self.nodes.insert(Node::with_content("Light", NodeContent::Light(key)))
    }

    /// Creates a detached node carrying an audio emitter.
    pub fn create_emitter(&mut self, emitter: AudioEmitter) -> NodeHandle {
        let key = self.emitters.insert(emitter);
        self.nodes.insert(Node::with_content("Emitter", NodeContent::Emitter(key)))
    }

    // ========================================================================
    // Hierarchy
    // ========================================================================

    /// Appends `child` to `parent`, detaching it from any previous parent.
    ///
    /// # Panics
    ///
    /// Panics if `child == parent`, if `child` is the scene root, if `child`
    /// is an ancestor of `parent` (the edge would close a cycle), or if
    /// either handle is stale.
    pub fn add(&mut self, parent: NodeHandle, child: NodeHandle) {
        assert!(child != parent, "cannot add a node to itself");
        assert!(child != self.root, "cannot re-parent the scene root");
        assert!(self.nodes.contains_key(parent), "add: stale parent handle");
        assert!(self.nodes.contains_key(child), "add: stale child handle");
        assert!(
            !self.is_ancestor(child, parent),
            "cannot add a node below its own descendant"
        );

        if let Some(old_parent) = self.nodes[child].parent {
            self.detach(old_parent, child);
        }

        self.nodes[parent].children.push(child);
        let node = &mut self.nodes[child];
        node.parent = Some(parent);
        node.transform.mark_dirty();

        self.nodes[parent]
            .dispatcher
            .dispatch(&NodeEvent::ChildAdded { parent, child });
        self.notify_descendant_changed(parent);
    }

    /// Shorthand for `add(scene.root(), child)`.
    pub fn add_to_root(&mut self, child: NodeHandle) {
        self.add(self.root, child);
    }

    /// Detaches `child` from `parent`. Returns `false` if `child` is not a
    /// direct child of `parent`. The child and its subtree stay alive.
    pub fn remove(&mut self, parent: NodeHandle, child: NodeHandle) -> bool {
        let is_child = self
            .nodes
            .get(child)
            .is_some_and(|node| node.parent == Some(parent));
        if !is_child {
            return false;
        }
        self.detach(parent, child);
        true
    }

    fn detach(&mut self, parent: NodeHandle, child: NodeHandle) {
        if let Some(p) = self.nodes.get_mut(parent)
            && let Some(pos) = p.children.iter().position(|&x| x == child)
        {
            p.children.remove(pos);
        }

        let node = &mut self.nodes[child];
        node.parent = None;
        node.transform.mark_dirty();

        if let Some(p) = self.nodes.get_mut(parent) {
            p.dispatcher
                .dispatch(&NodeEvent::ChildRemoved { parent, child });
        }
        self.notify_descendant_changed(parent);
    }

    /// Bubbles `DescendantChanged` from `origin` towards the root until a
    /// callback stops it.
    fn notify_descendant_changed(&mut self, origin: NodeHandle) {
        let mut current = Some(origin);
        while let Some(handle) = current {
            let Some(node) = self.nodes.get_mut(handle) else {
                break;
            };
            if node
                .dispatcher
                .dispatch(&NodeEvent::DescendantChanged { node: handle, origin })
            {
                break;
            }
            current = node.parent;
        }
    }

    /// `true` if `ancestor` appears on the parent chain of `node`.
    #[must_use]
    pub fn is_ancestor(&self, ancestor: NodeHandle, node: NodeHandle) -> bool {
        let mut current = self.nodes.get(node).and_then(|n| n.parent);
        while let Some(handle) = current {
            if handle == ancestor {
                return true;
            }
            current = self.nodes.get(handle).and_then(|n| n.parent);
        }
        false
    }

    /// Frees `handle` and its whole subtree, children first.
    ///
    /// Returns the GPU geometries owned by the freed meshes; hand them to
    /// [`Renderer::release_geometries`](crate::renderer::Renderer::release_geometries).
    ///
    /// # Panics
    ///
    /// Panics when asked to dispose the scene root.
    pub fn dispose(&mut self, handle: NodeHandle) -> Vec<GeometryId> {
        assert!(handle != self.root, "cannot dispose the scene root");
        if !self.nodes.contains_key(handle) {
            log::warn!("dispose: stale node handle {handle:?}");
            return Vec::new();
        }

        if let Some(parent) = self.nodes[handle].parent {
            self.detach(parent, handle);
        }

        let mut released = Vec::new();
        self.dispose_recursive(handle, &mut released);
        released
    }

    fn dispose_recursive(&mut self, handle: NodeHandle, released: &mut Vec<GeometryId>) {
        let children = std::mem::take(&mut self.nodes[handle].children);
        for child in children {
            self.dispose_recursive(child, released);
        }

        let Some(mut node) = self.nodes.remove(handle) else {
            return;
        };
        node.dispatcher
            .dispatch(&NodeEvent::Disposed { node: handle });

        match node.content {
            NodeContent::Mesh(key) => {
                if let Some(gpu) = self.meshes.remove(key).and_then(|m| m.gpu_geometry) {
                    released.push(gpu);
                }
            }
            NodeContent::Light(key) => {
                self.lights.remove(key);
            }
            NodeContent::Emitter(key) => {
                self.emitters.remove(key);
            }
            NodeContent::Group => {}
        }
    }

    // ========================================================================
    // Access
    // ========================================================================

    #[must_use]
    pub fn get_node(&self, handle: NodeHandle) -> Option<&Node> {
        self.nodes.get(handle)
    }

    pub fn get_node_mut(&mut self, handle: NodeHandle) -> Option<&mut Node> {
        self.nodes.get_mut(handle)
    }

    /// Chainable mutable access to one node.
    pub fn node(&mut self, handle: NodeHandle) -> SceneNode<'_> {
        SceneNode::new(self, handle)
    }

    #[must_use]
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    #[must_use]
    pub fn get_mesh(&self, handle: NodeHandle) -> Option<&Mesh> {
        match self.nodes.get(handle)?.content {
            NodeContent::Mesh(key) => self.meshes.get(key),
            _ => None,
        }
    }

    pub fn get_mesh_mut(&mut self, handle: NodeHandle) -> Option<&mut Mesh> {
        match self.nodes.get(handle)?.content {
            NodeContent::Mesh(key) => self.meshes.get_mut(key),
            _ => None,
        }
    }

    #[must_use]
    pub fn get_light(&self, handle: NodeHandle) -> Option<&Light> {
        match self.nodes.get(handle)?.content {
            NodeContent::Light(key) => self.lights.get(key),
            _ => None,
        }
    }

    pub fn get_light_mut(&mut self, handle: NodeHandle) -> Option<&mut Light> {
        match self.nodes.get(handle)?.content {
            NodeContent::Light(key) => self.lights.get_mut(key),
            _ => None,
        }
    }

    #[must_use]
    pub fn get_emitter(&self, handle: NodeHandle) -> Option<&AudioEmitter> {
        match self.nodes.get(handle)?.content {
            NodeContent::Emitter(key) => self.emitters.get(key),
            _ => None,
        }
    }

    // ========================================================================
    // Events
    // ========================================================================

    /// Subscribes `callback` to events of `kind` delivered to `handle`.
    ///
    /// # Panics
    ///
    /// Panics on a stale handle.
    pub fn subscribe<F>(&mut self, handle: NodeHandle, kind: NodeEventKind, callback: F) -> SubscriptionId
    where
        F: FnMut(&NodeEvent) -> bool + 'static,
    {
        self.nodes
            .get_mut(handle)
            .expect("subscribe: stale node handle")
            .dispatcher
            .subscribe(kind, callback)
    }

    pub fn unsubscribe(&mut self, handle: NodeHandle, id: SubscriptionId) -> bool {
        self.nodes
            .get_mut(handle)
            .is_some_and(|node| node.dispatcher.unsubscribe(id))
    }

    // ========================================================================
    // Queries
    // ========================================================================

    /// Resolves a `/`-separated path of child names starting below `from`.
    ///
    /// Each segment matches a direct child by name (first match wins). Empty
    /// segments are ignored, so `"a/b"` and `"/a/b/"` are equivalent.
    #[must_use]
    pub fn find_by_path(&self, from: NodeHandle, path: &str) -> Option<NodeHandle> {
        let mut current = from;
        self.nodes.get(current)?;
        for segment in path.split('/').filter(|s| !s.is_empty()) {
            current = self.nodes[current]
                .children
                .iter()
                .copied()
                .find(|&child| self.nodes.get(child).is_some_and(|n| n.name == segment))?;
        }
        Some(current)
    }

    /// Depth-first search for the first descendant of `from` named `name`.
    #[must_use]
    pub fn find_by_name(&self, from: NodeHandle, name: &str) -> Option<NodeHandle> {
        let node = self.nodes.get(from)?;
        for &child in &node.children {
            if self.nodes.get(child).is_some_and(|n| n.name == name) {
                return Some(child);
            }
            if let Some(found) = self.find_by_name(child, name) {
                return Some(found);
            }
        }
        None
    }

    /// World-space bounds of `handle` and its subtree.
    ///
    /// A mesh contributes its transformed geometry bounds; any other node
    /// contributes its world position. Uses the current world matrices, so
    /// update them first.
    #[must_use]
    pub fn bounding_box(&self, handle: NodeHandle) -> BoundingBox {
        let Some(node) = self.nodes.get(handle) else {
            return BoundingBox::EMPTY;
        };

        let mesh_bounds = match node.content {
            NodeContent::Mesh(key) => self
                .meshes
                .get(key)
                .map(|mesh| mesh.geometry.bounding_box())
                .filter(|bbox| !bbox.is_empty()),
            _ => None,
        };

        let mut bbox = match mesh_bounds {
            Some(local) => local.transform(node.world_matrix()),
            None => BoundingBox::EMPTY.expand_by_point(node.transform.world_position()),
        };

        for &child in &node.children {
            bbox = bbox.union(&self.bounding_box(child));
        }
        bbox
    }

    // ========================================================================
    // 矩阵更新
    // ========================================================================

    /// Checked world-matrix update from the root; static subtrees are skipped.
    /// Returns the number of world matrices recomputed.
    pub fn update_world_matrices(&mut self) -> usize {
        transform_system::update_hierarchy(&mut self.nodes, self.root)
    }

    /// Recomputes every world matrix reachable from the root.
    pub fn update_world_matrices_forced(&mut self) -> usize {
        transform_system::update_hierarchy_forced(&mut self.nodes, self.root)
    }

    /// Recomputes the subtree at `handle` against its parent's world matrix.
    pub fn update_subtree(&mut self, handle: NodeHandle) -> usize {
        transform_system::update_subtree(&mut self.nodes, handle)
    }
}
