use glam::Vec3;

#[derive(Debug, Clone, PartialEq)]
pub struct PointLight {
    pub linear_decay: f32,
    pub quadratic_decay: f32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SpotLight {
    /// Half-angle of the cone, in radians.
    pub cutoff_angle: f32,
    pub angular_decay: f32,
    pub linear_decay: f32,
    pub quadratic_decay: f32,
}

/// The four supported light kinds. The set is closed: the renderer keeps
/// one bucket and one shader array per kind.
#[derive(Debug, Clone, PartialEq)]
pub enum LightKind {
    Ambient,
    Directional,
    Point(PointLight),
    Spot(SpotLight),
}

/// Light component. Position and direction come from the owning node's
/// world matrix (directional and spot lights shine along the node's -Z).
#[derive(Debug, Clone)]
pub struct Light {
    pub color: Vec3,
    pub intensity: f32,
    pub kind: LightKind,
}

impl Light {
    #[must_use]
    pub fn new_ambient(color: Vec3, intensity: f32) -> Self {
        Self {
            color,
            intensity,
            kind: LightKind::Ambient,
        }
    }

    #[must_use]
    pub fn new_directional(color: Vec3, intensity: f32) -> Self {
        Self {
            color,
            intensity,
            kind: LightKind::Directional,
        }
    }

    #[must_use]
    pub fn new_point(color: Vec3, intensity: f32) -> Self {
        Self {
            color,
            intensity,
            kind: LightKind::Point(PointLight {
                linear_decay: 1.0,
                quadratic_decay: 1.0,
            }),
        }
    }

    #[must_use]
    pub fn new_spot(color: Vec3, intensity: f32, cutoff_angle: f32) -> Self {
        Self {
            color,
            intensity,
            kind: LightKind::Spot(SpotLight {
                cutoff_angle,
                angular_decay: 15.0,
                linear_decay: 1.0,
                quadratic_decay: 1.0,
            }),
        }
    }

    /// Color premultiplied by intensity, as uploaded to shaders.
    #[inline]
    #[must_use]
    pub fn radiance(&self) -> Vec3 {
        self.color * self.intensity
    }
}
