//! Light uniform packing.
//!
//! Every light kind maps to a flat `vec3` array uniform; light `i` occupies
//! `i * stride .. (i + 1) * stride`. Positions and directions are converted
//! to view space once per frame.

use glam::{Affine3A, Mat4, Vec3};

use crate::renderer::backend::Uniform;
use crate::scene::light::{Light, LightKind};

pub const AMBIENT_STRIDE: usize = 1;
pub const DIR_STRIDE: usize = 2;
pub const POINT_STRIDE: usize = 3;
pub const SPOT_STRIDE: usize = 5;

/// Uniform array and per-light element count of each light bucket, in
/// ambient, directional, point, spot order.
pub const BUCKET_LAYOUT: [(Uniform, usize); 4] = [
    (Uniform::AmbientLightColor, AMBIENT_STRIDE),
    (Uniform::DirLight, DIR_STRIDE),
    (Uniform::PointLight, POINT_STRIDE),
    (Uniform::SpotLight, SPOT_STRIDE),
];

/// Appends the uniform elements of one light to `out`.
pub fn pack(light: &Light, world: &Affine3A, view: &Mat4, out: &mut Vec<Vec3>) {
    let radiance = light.radiance();
    let position = || view.transform_point3(world.translation.into());
    let direction = || {
        let dir = world.transform_vector3(Vec3::NEG_Z);
        view.transform_vector3(dir).normalize_or_zero()
    };

    match &light.kind {
        LightKind::Ambient => out.push(radiance),
        LightKind::Directional => {
            out.extend_from_slice(&[radiance, direction()]);
        }
        LightKind::Point(point) => {
            out.extend_from_slice(&[
                radiance,
                position(),
                Vec3::new(point.linear_decay, point.quadratic_decay, 0.0),
            ]);
        }
        LightKind::Spot(spot) => {
            out.extend_from_slice(&[
                radiance,
                position(),
                direction(),
                Vec3::new(spot.angular_decay, spot.cutoff_angle.cos(), spot.linear_decay),
                Vec3::new(spot.quadratic_decay, 0.0, 0.0),
            ]);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pack_writes_stride_elements() {
        let world = Affine3A::from_translation(Vec3::new(1.0, 2.0, 3.0));
        let lights = [
            Light::new_ambient(Vec3::ONE, 1.0),
            Light::new_directional(Vec3::ONE, 1.0),
            Light::new_point(Vec3::ONE, 1.0),
            Light::new_spot(Vec3::ONE, 1.0, 0.5),
        ];
        for (light, (_, stride)) in lights.iter().zip(BUCKET_LAYOUT) {
            let mut out = Vec::new();
            pack(light, &world, &Mat4::IDENTITY, &mut out);
            assert_eq!(out.len(), stride);
        }
    }

    #[test]
    fn point_position_is_in_view_space() {
        let light = Light::new_point(Vec3::ONE, 2.0);
        let world = Affine3A::from_translation(Vec3::new(0.0, 0.0, -5.0));
        let view = Mat4::from_translation(Vec3::new(0.0, 0.0, -1.0));

        let mut out = Vec::new();
        pack(&light, &world, &view, &mut out);
        assert_eq!(out[0], Vec3::splat(2.0));
        assert!((out[1] - Vec3::new(0.0, 0.0, -6.0)).length() < 1e-5);
    }

    #[test]
    fn directional_points_down_negative_z() {
        let light = Light::new_directional(Vec3::ONE, 1.0);
        let mut out = Vec::new();
        pack(&light, &Affine3A::IDENTITY, &Mat4::IDENTITY, &mut out);
        assert!((out[1] - Vec3::NEG_Z).length() < 1e-5);
    }
}
