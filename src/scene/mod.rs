//! Scene graph.
//!
//! - Node: hierarchy links, transform, visibility and content
//! - Transform: position / rotation / scale with lazy matrix composition
//! - Scene: node and component storage, hierarchy operations
//! - TransformSystem: checked / unconditional world-matrix propagation
//! - Camera, Light: render collaborators
//! - events: per-node dispatcher for structural notifications

pub mod camera;
pub mod events;
pub mod light;
pub mod node;
pub mod scene;
pub mod transform;
pub mod transform_system;
pub mod wrapper;

pub use camera::{Camera, CameraView, ProjectionType};
pub use events::{Dispatcher, NodeEvent, NodeEventKind, SubscriptionId};
pub use light::{Light, LightKind, PointLight, SpotLight};
pub use node::{Node, NodeContent};
pub use scene::Scene;
pub use transform::Transform;
pub use wrapper::SceneNode;

use slotmap::new_key_type;

new_key_type! {
    pub struct NodeHandle;
    pub struct MeshKey;
    pub struct LightKey;
    pub struct EmitterKey;
}
