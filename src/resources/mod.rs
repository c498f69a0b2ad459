//! Resource definitions: geometry, materials, meshes, audio sources and
//! shader defines.

pub mod audio;
pub mod geometry;
pub mod material;
pub mod mesh;
pub mod shader_defines;

pub use audio::AudioEmitter;
pub use geometry::{BoundingBox, Geometry};
pub use material::{Material, UseLights};
pub use mesh::{Mesh, MeshMaterial};
pub use shader_defines::ShaderDefines;
