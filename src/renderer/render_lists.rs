//! Per-frame scene classification.

use smallvec::SmallVec;

use crate::scene::light::LightKind;
use crate::scene::node::NodeContent;
use crate::scene::scene::Scene;
use crate::scene::{MeshKey, NodeHandle};

/// One material of one mesh node, in traversal order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GraphicItem {
    pub node: NodeHandle,
    pub mesh: MeshKey,
    /// Index into the mesh's materials.
    pub material: usize,
}

/// Buckets rebuilt every frame by a depth-first walk from the scene root.
#[derive(Debug, Default)]
pub struct RenderLists {
    pub ambient: SmallVec<[NodeHandle; 4]>,
    pub directional: SmallVec<[NodeHandle; 4]>,
    pub point: SmallVec<[NodeHandle; 8]>,
    pub spot: SmallVec<[NodeHandle; 8]>,
    pub graphics: Vec<GraphicItem>,
    /// Neither light nor mesh (groups, audio emitters).
    pub others: Vec<NodeHandle>,
}

impl RenderLists {
    pub fn clear(&mut self) {
        self.ambient.clear();
        self.directional.clear();
        self.point.clear();
        self.spot.clear();
        self.graphics.clear();
        self.others.clear();
    }

    /// Classifies every node below the root. Invisible nodes hide their
    /// whole subtree.
    pub fn classify(&mut self, scene: &Scene) {
        let root = &scene.nodes[scene.root()];
        if !root.visible {
            return;
        }
        for &child in &root.children {
            self.visit(scene, child);
        }
    }

    fn visit(&mut self, scene: &Scene, handle: NodeHandle) {
        let Some(node) = scene.nodes.get(handle) else {
            return;
        };
        if !node.visible {
            return;
        }

        match node.content {
            NodeContent::Mesh(key) => {
                if let Some(mesh) = scene.meshes.get(key) {
                    self.graphics
                        .extend((0..mesh.materials().len()).map(|material| GraphicItem {
                            node: handle,
                            mesh: key,
                            material,
                        }));
                }
            }
            NodeContent::Light(key) => {
                if let Some(light) = scene.lights.get(key) {
                    match light.kind {
                        LightKind::Ambient => self.ambient.push(handle),
                        LightKind::Directional => self.directional.push(handle),
                        LightKind::Point(_) => self.point.push(handle),
                        LightKind::Spot(_) => self.spot.push(handle),
                    }
                }
            }
            NodeContent::Group | NodeContent::Emitter(_) => self.others.push(handle),
        }

        for &child in &node.children {
            self.visit(scene, child);
        }
    }

    /// Light buckets in uniform upload order.
    pub fn light_buckets(&self) -> [&[NodeHandle]; 4] {
        [&self.ambient[..], &self.directional[..], &self.point[..], &self.spot[..]]
    }
}
