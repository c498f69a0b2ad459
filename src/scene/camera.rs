use glam::{Affine3A, Mat4, Vec3};

/// What the renderer needs from a camera.
pub trait CameraView {
    fn view_matrix(&self) -> Mat4;
    fn projection_matrix(&self) -> Mat4;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProjectionType {
    Perspective,
    Orthographic,
}

#[derive(Debug, Clone)]
pub struct Camera {
    pub projection_type: ProjectionType,
    /// Vertical field of view, radians.
    pub fov: f32,
    pub aspect: f32,
    pub near: f32,
    pub far: f32,
    /// Half-height of the orthographic volume.
    pub ortho_size: f32,

    world_matrix: Affine3A,
    view_matrix: Mat4,
    projection_matrix: Mat4,
}

impl Camera {
    /// `fov` is given in degrees.
    #[must_use]
    pub fn new_perspective(fov: f32, aspect: f32, near: f32, far: f32) -> Self {
        let mut cam = Self {
            projection_type: ProjectionType::Perspective,
            fov: fov.to_radians(),
            aspect,
            near,
            far,
            ortho_size: 10.0,
            world_matrix: Affine3A::IDENTITY,
            view_matrix: Mat4::IDENTITY,
            projection_matrix: Mat4::IDENTITY,
        };
        cam.update_projection_matrix();
        cam
    }

    #[must_use]
    pub fn new_orthographic(ortho_size: f32, aspect: f32, near: f32, far: f32) -> Self {
        let mut cam = Self::new_perspective(45.0, aspect, near, far);
        cam.projection_type = ProjectionType::Orthographic;
        cam.ortho_size = ortho_size;
        cam.update_projection_matrix();
        cam
    }

    /// Call after changing any projection field.
    pub fn update_projection_matrix(&mut self) {
        // OpenGL clip space: depth in [-1, 1]
        self.projection_matrix = match self.projection_type {
            ProjectionType::Perspective => {
                Mat4::perspective_rh_gl(self.fov, self.aspect, self.near, self.far)
            }
            ProjectionType::Orthographic => {
                let w = self.ortho_size * self.aspect;
                let h = self.ortho_size;
                Mat4::orthographic_rh_gl(-w, w, -h, h, self.near, self.far)
            }
        };
    }

    pub fn set_aspect(&mut self, aspect: f32) {
        self.aspect = aspect;
        self.update_projection_matrix();
    }

    /// Places the camera with an explicit world transform.
    pub fn set_world_matrix(&mut self, world: Affine3A) {
        self.world_matrix = world;
        self.view_matrix = Mat4::from(world).inverse();
    }

    /// Places the camera at `eye` looking at `target`.
    pub fn look_at(&mut self, eye: Vec3, target: Vec3, up: Vec3) {
        let view = Mat4::look_at_rh(eye, target, up);
        self.view_matrix = view;
        self.world_matrix = Affine3A::from_mat4(view.inverse());
    }

    #[inline]
    #[must_use]
    pub fn position(&self) -> Vec3 {
        self.world_matrix.translation.into()
    }
}

impl CameraView for Camera {
    fn view_matrix(&self) -> Mat4 {
        self.view_matrix
    }

    fn projection_matrix(&self) -> Mat4 {
        self.projection_matrix
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn look_at_view_moves_eye_to_origin() {
        let mut cam = Camera::new_perspective(60.0, 1.5, 0.1, 100.0);
        cam.look_at(Vec3::new(0.0, 0.0, 5.0), Vec3::ZERO, Vec3::Y);

        let eye_in_view = cam.view_matrix().transform_point3(Vec3::new(0.0, 0.0, 5.0));
        assert!(eye_in_view.length() < 1e-5);
        assert!((cam.position() - Vec3::new(0.0, 0.0, 5.0)).length() < 1e-5);
    }
}
