//! Graphics backend seam.
//!
//! The renderer and the program cache never touch a graphics API directly;
//! they drive a [`GraphicsBackend`]. Two implementations ship with the crate:
//!
//! | Backend | Use case |
//! |---------|----------|
//! | [`RecordingBackend`] | Headless runs and tests; records every command |
//! | `GlBackend` (feature `gl`) | OpenGL 3.3+ through `glow` |

#[cfg(feature = "gl")]
pub mod gl;
pub mod recording;

#[cfg(feature = "gl")]
pub use gl::GlBackend;
pub use recording::{Command, RecordingBackend};

use bitflags::bitflags;
use glam::{Mat3, Mat4, Vec3, Vec4};

use crate::errors::Result;
use crate::overlay::Rect;
use crate::resources::geometry::Geometry;

/// Handle to a linked GPU program.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ProgramId(pub u32);

/// Handle to uploaded vertex/index buffers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct GeometryId(pub u32);

/// Handle to a texture owned by the backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TextureId(pub u32);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ShaderStage {
    Vertex,
    Fragment,
    Geometry,
}

/// Fully preprocessed sources of one program variant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProgramSource {
    /// Registered program name (for labels and logs).
    pub name: String,
    pub vertex: String,
    pub fragment: String,
    pub geometry: Option<String>,
}

/// Element range of a draw call: indices for indexed geometry, vertices
/// otherwise.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DrawRange {
    pub start: u32,
    pub count: u32,
}

impl DrawRange {
    #[must_use]
    pub const fn new(start: u32, count: u32) -> Self {
        Self { start, count }
    }
}

/// Uniforms written by the renderer.
///
/// The set is closed so backends can resolve each location once per program
/// instead of looking names up per light. Light arrays are flat `vec3`
/// arrays; light `i` of a kind occupies `stride * i .. stride * (i + 1)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Uniform {
    ModelViewMatrix,
    ModelViewProjectionMatrix,
    NormalMatrix,
    /// 1 vec3 per light: radiance
    AmbientLightColor,
    /// 2 vec3 per light: radiance, direction (view space)
    DirLight,
    /// 3 vec3 per light: radiance, position (view space), decay
    PointLight,
    /// 5 vec3 per light: radiance, position, direction, cone, decay
    SpotLight,
    /// 4 vec3: color, specular, emissive, (shininess, opacity, textures)
    Material,
    /// Panel rectangle in normalized device coordinates (x, y, w, h).
    PanelRect,
    PanelColor,
}

impl Uniform {
    pub const ALL: [Uniform; 10] = [
        Uniform::ModelViewMatrix,
        Uniform::ModelViewProjectionMatrix,
        Uniform::NormalMatrix,
        Uniform::AmbientLightColor,
        Uniform::DirLight,
        Uniform::PointLight,
        Uniform::SpotLight,
        Uniform::Material,
        Uniform::PanelRect,
        Uniform::PanelColor,
    ];

    /// Identifier used in the GLSL sources.
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Uniform::ModelViewMatrix => "ModelViewMatrix",
            Uniform::ModelViewProjectionMatrix => "MVP",
            Uniform::NormalMatrix => "NormalMatrix",
            Uniform::AmbientLightColor => "AmbientLightColor",
            Uniform::DirLight => "DirLight",
            Uniform::PointLight => "PointLight",
            Uniform::SpotLight => "SpotLight",
            Uniform::Material => "Material",
            Uniform::PanelRect => "PanelRect",
            Uniform::PanelColor => "PanelColor",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum UniformValue {
    Float(f32),
    Int(i32),
    Vec3(Vec3),
    Vec4(Vec4),
    Mat3(Mat3),
    Mat4(Mat4),
}

bitflags! {
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
    pub struct ClearFlags: u8 {
        const COLOR   = 1 << 0;
        const DEPTH   = 1 << 1;
        const STENCIL = 1 << 2;
    }
}

/// GPU state interface consumed by the renderer and the program cache.
///
/// Rectangles use window pixel coordinates with the origin at the top-left;
/// backends convert to their native convention.
pub trait GraphicsBackend {
    /// Compiles and links one program variant.
    fn create_program(&mut self, source: &ProgramSource) -> Result<ProgramId>;
    fn use_program(&mut self, program: ProgramId);
    fn delete_program(&mut self, program: ProgramId);

    fn upload_geometry(&mut self, geometry: &Geometry) -> Result<GeometryId>;
    fn release_geometry(&mut self, geometry: GeometryId);
    fn bind_geometry(&mut self, geometry: GeometryId);

    /// Binds `texture` to `unit` and points material sampler `unit` at it.
    fn bind_texture(&mut self, unit: u32, texture: TextureId);

    fn set_uniform(&mut self, uniform: Uniform, value: UniformValue);
    /// Writes `values` into a `vec3` array uniform starting at element `offset`.
    fn set_uniform_vec3_array(&mut self, uniform: Uniform, offset: usize, values: &[Vec3]);

    /// Size of the window surface in pixels. Called at the start of every
    /// frame, before any viewport or scissor rectangle.
    fn set_surface_size(&mut self, width: f32, height: f32);
    fn set_viewport(&mut self, rect: Rect);
    /// `None` disables scissoring.
    fn set_scissor(&mut self, rect: Option<Rect>);
    fn clear(&mut self, flags: ClearFlags, color: Vec4);

    /// Draws `range` of the bound geometry as triangles.
    fn draw(&mut self, range: DrawRange);
}
