use std::borrow::Cow;

use bitflags::bitflags;
use glam::Vec3;

use crate::renderer::backend::TextureId;
use crate::scene::light::LightKind;

bitflags! {
    /// Light kinds a material reacts to.
    ///
    /// Kinds missing from the mask are zeroed in the material's shader specs,
    /// so materials that ignore a kind share programs regardless of how many
    /// lights of that kind the scene holds.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
    pub struct UseLights: u8 {
        const AMBIENT     = 1 << 0;
        const DIRECTIONAL = 1 << 1;
        const POINT       = 1 << 2;
        const SPOT        = 1 << 3;
    }
}

impl UseLights {
    #[must_use]
    pub fn includes(self, kind: &LightKind) -> bool {
        self.contains(Self::from(kind))
    }
}

impl From<&LightKind> for UseLights {
    fn from(kind: &LightKind) -> Self {
        match kind {
            LightKind::Ambient => Self::AMBIENT,
            LightKind::Directional => Self::DIRECTIONAL,
            LightKind::Point(_) => Self::POINT,
            LightKind::Spot(_) => Self::SPOT,
        }
    }
}

/// Surface description consumed by the renderer.
#[derive(Debug, Clone)]
pub struct Material {
    /// Name of the registered shader program.
    pub shader: Cow<'static, str>,
    /// The program does not depend on light or texture counts.
    pub shader_unique: bool,
    pub use_lights: UseLights,
    /// Bound to texture units `0..textures.len()` in order.
    pub textures: Vec<TextureId>,

    pub color: Vec3,
    pub specular: Vec3,
    pub emissive: Vec3,
    pub shininess: f32,
    pub opacity: f32,
}

impl Material {
    /// Lit material driven by the `standard` program.
    #[must_use]
    pub fn standard(color: Vec3) -> Self {
        Self {
            shader: Cow::Borrowed("standard"),
            shader_unique: false,
            use_lights: UseLights::all(),
            textures: Vec::new(),
            color,
            specular: Vec3::splat(0.5),
            emissive: Vec3::ZERO,
            shininess: 30.0,
            opacity: 1.0,
        }
    }

    /// Unlit flat color, one program for every instance.
    #[must_use]
    pub fn basic(color: Vec3) -> Self {
        Self {
            shader: Cow::Borrowed("basic"),
            shader_unique: true,
            use_lights: UseLights::empty(),
            ..Self::standard(color)
        }
    }

    #[must_use]
    pub fn with_texture(mut self, texture: TextureId) -> Self {
        self.textures.push(texture);
        self
    }

    #[must_use]
    pub fn with_lights(mut self, use_lights: UseLights) -> Self {
        self.use_lights = use_lights;
        self
    }

    #[inline]
    #[must_use]
    pub fn texture_count(&self) -> usize {
        self.textures.len()
    }
}

impl Default for Material {
    fn default() -> Self {
        Self::standard(Vec3::ONE)
    }
}
