//! Structural program key.
//!
//! A [`ShaderSpecs`] identifies one compiled variant of a registered
//! program: its name plus the light and texture counts the GLSL is
//! specialised for. The program cache compares specs structurally instead of
//! hashing generated source.

use crate::resources::ShaderDefines;
use crate::resources::material::{Material, UseLights};

/// Define keys fed to the preprocessor.
pub const AMB_LIGHTS: &str = "AMB_LIGHTS";
pub const DIR_LIGHTS: &str = "DIR_LIGHTS";
pub const POINT_LIGHTS: &str = "POINT_LIGHTS";
pub const SPOT_LIGHTS: &str = "SPOT_LIGHTS";
pub const MAT_TEXTURES: &str = "MAT_TEXTURES";

#[derive(Debug, Clone, Default)]
pub struct ShaderSpecs {
    /// Registered program name.
    pub name: String,
    /// GLSL version line (without `#version`).
    pub version: String,
    pub ambient_lights_max: usize,
    pub dir_lights_max: usize,
    pub point_lights_max: usize,
    pub spot_lights_max: usize,
    pub mat_tex_count: usize,
    /// Light kinds the requesting material reacts to.
    pub use_lights: UseLights,
    /// The program ignores every count: specs with the same name are equal.
    pub unique: bool,
}

impl PartialEq for ShaderSpecs {
    fn eq(&self, other: &Self) -> bool {
        if self.name != other.name {
            return false;
        }
        if self.unique || other.unique {
            return true;
        }
        self.ambient_lights_max == other.ambient_lights_max
            && self.dir_lights_max == other.dir_lights_max
            && self.point_lights_max == other.point_lights_max
            && self.spot_lights_max == other.spot_lights_max
            && self.mat_tex_count == other.mat_tex_count
    }
}

impl ShaderSpecs {
    #[must_use]
    pub fn new(name: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            version: version.into(),
            use_lights: UseLights::all(),
            ..Default::default()
        }
    }

    /// Copies the material-dependent fields; light counts are left untouched.
    pub fn apply_material(&mut self, material: &Material) {
        self.name.clear();
        self.name.push_str(&material.shader);
        self.unique = material.shader_unique;
        self.use_lights = material.use_lights;
        self.mat_tex_count = material.texture_count();
    }

    /// Copy with the counts of every light kind outside `use_lights` zeroed.
    #[must_use]
    pub fn normalized(&self) -> Self {
        let mut specs = self.clone();
        if !self.use_lights.contains(UseLights::AMBIENT) {
            specs.ambient_lights_max = 0;
        }
        if !self.use_lights.contains(UseLights::DIRECTIONAL) {
            specs.dir_lights_max = 0;
        }
        if !self.use_lights.contains(UseLights::POINT) {
            specs.point_lights_max = 0;
        }
        if !self.use_lights.contains(UseLights::SPOT) {
            specs.spot_lights_max = 0;
        }
        specs
    }

    #[must_use]
    pub fn defines(&self) -> ShaderDefines {
        let mut defines = ShaderDefines::with_capacity(5);
        defines.set(AMB_LIGHTS, self.ambient_lights_max);
        defines.set(DIR_LIGHTS, self.dir_lights_max);
        defines.set(POINT_LIGHTS, self.point_lights_max);
        defines.set(SPOT_LIGHTS, self.spot_lights_max);
        defines.set(MAT_TEXTURES, self.mat_tex_count);
        defines
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn specs(name: &str, point: usize, unique: bool) -> ShaderSpecs {
        ShaderSpecs {
            point_lights_max: point,
            unique,
            ..ShaderSpecs::new(name, "330 core")
        }
    }

    #[test]
    fn unique_specs_ignore_counts() {
        assert_eq!(specs("basic", 0, true), specs("basic", 4, true));
        assert_ne!(specs("basic", 0, true), specs("panel", 0, true));
    }

    #[test]
    fn regular_specs_compare_counts() {
        assert_eq!(specs("standard", 2, false), specs("standard", 2, false));
        assert_ne!(specs("standard", 2, false), specs("standard", 3, false));

        let mut textured = specs("standard", 2, false);
        textured.mat_tex_count = 1;
        assert_ne!(textured, specs("standard", 2, false));
    }

    #[test]
    fn version_is_not_part_of_the_key() {
        let mut a = specs("standard", 1, false);
        a.version = "300 es".into();
        assert_eq!(a, specs("standard", 1, false));
    }

    #[test]
    fn normalization_zeroes_unused_kinds() {
        let mut s = ShaderSpecs::new("standard", "330 core");
        s.ambient_lights_max = 1;
        s.point_lights_max = 3;
        s.spot_lights_max = 2;
        s.use_lights = UseLights::AMBIENT | UseLights::SPOT;

        let n = s.normalized();
        assert_eq!(n.ambient_lights_max, 1);
        assert_eq!(n.point_lights_max, 0);
        assert_eq!(n.spot_lights_max, 2);
    }

    #[test]
    fn defines_cover_all_counts() {
        let mut s = ShaderSpecs::new("standard", "330 core");
        s.dir_lights_max = 2;
        s.mat_tex_count = 1;
        let defines = s.defines();
        assert_eq!(defines.len(), 5);
        assert_eq!(defines.get(DIR_LIGHTS), Some("2"));
        assert_eq!(defines.get(MAT_TEXTURES), Some("1"));
        assert_eq!(defines.get(SPOT_LIGHTS), Some("0"));
    }
}
