//! Fluent node editing.
//!
//! [`Scene::node`] hands out a [`SceneNode`], a short-lived mutable borrow
//! that chains transform, visibility and content edits on one handle:
//!
//! ```rust,ignore
//! scene.node(lamp)
//!     .set_position(0.0, 3.0, 0.0)
//!     .look_at(Vec3::ZERO)
//!     .set_light_intensity(2.5);
//! ```
//!
//! Edits on a stale handle, or content edits on a node of another kind, are
//! ignored.
#![allow(clippy::return_self_not_must_use)]
#![allow(clippy::must_use_candidate)]
use std::borrow::Cow;

use glam::{Quat, Vec3};

use crate::scene::NodeHandle;
use crate::scene::scene::Scene;
use crate::scene::transform::Transform;

pub struct SceneNode<'a> {
    scene: &'a mut Scene,
    handle: NodeHandle,
}

impl<'a> SceneNode<'a> {
    #[inline]
    pub fn new(scene: &'a mut Scene, handle: NodeHandle) -> Self {
        Self { scene, handle }
    }

    #[inline]
    #[must_use]
    pub fn handle(&self) -> NodeHandle {
        self.handle
    }

    fn transform(self, edit: impl FnOnce(&mut Transform)) -> Self {
        if let Some(node) = self.scene.get_node_mut(self.handle) {
            edit(&mut node.transform);
        }
        self
    }

    // ---- transform ----

    pub fn set_position(self, x: f32, y: f32, z: f32) -> Self {
        self.transform(|t| t.set_position(Vec3::new(x, y, z)))
    }

    pub fn translate(self, delta: Vec3) -> Self {
        self.transform(|t| t.translate(delta))
    }

    /// Uniform scale.
    pub fn set_scale(self, s: f32) -> Self {
        self.transform(|t| t.set_scale(Vec3::splat(s)))
    }

    pub fn set_quaternion(self, quat: Quat) -> Self {
        self.transform(|t| t.set_quaternion(quat))
    }

    /// XYZ Euler angles in radians.
    pub fn set_rotation_euler(self, x: f32, y: f32, z: f32) -> Self {
        self.transform(|t| t.set_rotation_euler(Vec3::new(x, y, z)))
    }

    pub fn rotate_x(self, angle: f32) -> Self {
        self.transform(|t| t.rotate_x(angle))
    }

    pub fn rotate_y(self, angle: f32) -> Self {
        self.transform(|t| t.rotate_y(angle))
    }

    /// Turns the node's -Z axis towards `target`, given in parent space.
    pub fn look_at(self, target: Vec3) -> Self {
        self.transform(|t| t.look_at(target, Vec3::Y))
    }

    // ---- node ----

    /// Hides or shows the node together with its subtree.
    pub fn set_visible(self, visible: bool) -> Self {
        if let Some(node) = self.scene.get_node_mut(self.handle) {
            node.visible = visible;
        }
        self
    }

    pub fn set_name(self, name: impl Into<Cow<'static, str>>) -> Self {
        if let Some(node) = self.scene.get_node_mut(self.handle) {
            node.name = name.into();
        }
        self
    }

    /// Appends `child` below this node. Same panics as [`Scene::add`].
    pub fn add_child(self, child: NodeHandle) -> Self {
        self.scene.add(self.handle, child);
        self
    }

    // ---- content ----

    pub fn set_light_intensity(self, intensity: f32) -> Self {
        if let Some(light) = self.scene.get_light_mut(self.handle) {
            light.intensity = intensity;
        }
        self
    }

    /// Base color of every material of a mesh node.
    pub fn set_material_color(self, color: Vec3) -> Self {
        if let Some(mesh) = self.scene.get_mesh_mut(self.handle) {
            for entry in mesh.materials_mut() {
                entry.material.color = color;
            }
        }
        self
    }
}

#[cfg(test)]
mod tests {
    use crate::resources::{Geometry, Material, Mesh};
    use crate::scene::{Light, Scene};
    use glam::Vec3;

    #[test]
    fn content_edits_only_touch_matching_kind() {
        let mut scene = Scene::new();
        let mesh = scene.create_mesh(Mesh::new(Geometry::unit_quad(), Material::default()));
        let light = scene.create_light(Light::new_point(Vec3::ONE, 1.0));

        scene.node(mesh).set_light_intensity(5.0).set_material_color(Vec3::X);
        scene.node(light).set_light_intensity(3.0).set_material_color(Vec3::Y);

        assert_eq!(scene.get_mesh(mesh).unwrap().materials()[0].material.color, Vec3::X);
        assert!((scene.get_light(light).unwrap().intensity - 3.0).abs() < 1e-6);
    }

    #[test]
    fn add_child_chains() {
        let mut scene = Scene::new();
        let parent = scene.create_node("parent");
        let child = scene.create_node("child");
        scene.node(parent).add_child(child).set_position(1.0, 0.0, 0.0);

        assert_eq!(scene.get_node(child).unwrap().parent(), Some(parent));
        assert_eq!(scene.get_node(parent).unwrap().transform.position(), Vec3::X);
    }
}
