use std::cell::Cell;

use glam::{Affine3A, EulerRot, Mat3, Mat4, Quat, Vec3};

/// Local TRS state of a node plus its cached local and world matrices.
///
/// The quaternion is the canonical rotation. Euler angles are a derived
/// cache that is resynchronised lazily on read after a quaternion write.
///
/// Every setter that touches position, scale or rotation marks the local
/// matrix dirty; nothing is recomposed until [`Transform::update_local_matrix`]
/// runs (normally from the transform system).
#[derive(Debug, Clone)]
pub struct Transform {
    position: Vec3,
    scale: Vec3,
    quaternion: Quat,

    // Euler cache (XYZ order, radians)
    rotation: Cell<Vec3>,
    rot_needs_update: Cell<bool>,

    mat_needs_update: bool,
    pub(crate) local_matrix: Affine3A,
    pub(crate) world_matrix: Affine3A,
}

impl Transform {
    /// Identity transform. The first update always recomposes.
    #[must_use]
    pub fn new() -> Self {
        Self {
            position: Vec3::ZERO,
            scale: Vec3::ONE,
            quaternion: Quat::IDENTITY,
            rotation: Cell::new(Vec3::ZERO),
            rot_needs_update: Cell::new(false),
            mat_needs_update: true,
            local_matrix: Affine3A::IDENTITY,
            world_matrix: Affine3A::IDENTITY,
        }
    }

    // ========================================================================
    // Setters
    // ========================================================================

    pub fn set_position(&mut self, position: Vec3) {
        self.position = position;
        self.mat_needs_update = true;
    }

    /// Moves the node by `delta` in its parent's space.
    pub fn translate(&mut self, delta: Vec3) {
        self.set_position(self.position + delta);
    }

    pub fn set_scale(&mut self, scale: Vec3) {
        self.scale = scale;
        self.mat_needs_update = true;
    }

    /// Sets rotation from Euler angles (XYZ order, radians).
    pub fn set_rotation_euler(&mut self, euler: Vec3) {
        self.rotation.set(euler);
        self.rot_needs_update.set(false);
        self.quaternion = Quat::from_euler(EulerRot::XYZ, euler.x, euler.y, euler.z);
        self.mat_needs_update = true;
    }

    /// Sets the canonical rotation. The Euler cache goes stale until read.
    pub fn set_quaternion(&mut self, quaternion: Quat) {
        self.quaternion = quaternion;
        self.rot_needs_update.set(true);
        self.mat_needs_update = true;
    }

    /// Rotates around the local X axis by `angle` radians (cumulative).
    pub fn rotate_x(&mut self, angle: f32) {
        self.set_quaternion(self.quaternion * Quat::from_rotation_x(angle));
    }

    /// Rotates around the local Y axis by `angle` radians (cumulative).
    pub fn rotate_y(&mut self, angle: f32) {
        self.set_quaternion(self.quaternion * Quat::from_rotation_y(angle));
    }

    /// Rotates around the local Z axis by `angle` radians (cumulative).
    pub fn rotate_z(&mut self, angle: f32) {
        self.set_quaternion(self.quaternion * Quat::from_rotation_z(angle));
    }

    /// Replaces the local transform with `matrix`, decomposing it into
    /// position, rotation and scale. Shear is lost.
    pub fn set_matrix(&mut self, matrix: Affine3A) {
        let (scale, rotation, translation) = matrix.to_scale_rotation_translation();
        self.position = translation;
        self.scale = scale;
        self.set_quaternion(rotation);
    }

    /// Orients the transform so that -Z faces `target`.
    ///
    /// `target` and `up` are expressed in the parent's coordinate system.
    /// Degenerate inputs (target collinear with `up`) leave rotation unchanged.
    pub fn look_at(&mut self, target: Vec3, up: Vec3) {
        let forward = (target - self.position).normalize_or_zero();
        if forward.cross(up).length_squared() < 1e-4 {
            return;
        }

        let right = forward.cross(up).normalize();
        let new_up = right.cross(forward).normalize();

        let rot_mat = Mat3::from_cols(right, new_up, -forward);
        self.set_quaternion(Quat::from_mat3(&rot_mat));
    }

    /// Forces a recomposition on the next update (e.g. after re-parenting).
    pub fn mark_dirty(&mut self) {
        self.mat_needs_update = true;
    }

    // ========================================================================
    // Getters
    // ========================================================================

    #[inline]
    #[must_use]
    pub fn position(&self) -> Vec3 {
        self.position
    }

    #[inline]
    #[must_use]
    pub fn scale(&self) -> Vec3 {
        self.scale
    }

    #[inline]
    #[must_use]
    pub fn quaternion(&self) -> Quat {
        self.quaternion
    }

    /// Euler angles (XYZ order), resynchronised from the quaternion if stale.
    #[must_use]
    pub fn rotation(&self) -> Vec3 {
        if self.rot_needs_update.get() {
            let (x, y, z) = self.quaternion.to_euler(EulerRot::XYZ);
            self.rotation.set(Vec3::new(x, y, z));
            self.rot_needs_update.set(false);
        }
        self.rotation.get()
    }

    /// `true` while position/scale/rotation changed since the last recomposition.
    #[inline]
    #[must_use]
    pub fn mat_needs_update(&self) -> bool {
        self.mat_needs_update
    }

    /// `true` while the Euler cache lags behind the quaternion.
    #[inline]
    #[must_use]
    pub fn rot_needs_update(&self) -> bool {
        self.rot_needs_update.get()
    }

    #[inline]
    #[must_use]
    pub fn local_matrix(&self) -> &Affine3A {
        &self.local_matrix
    }

    #[inline]
    #[must_use]
    pub fn world_matrix(&self) -> &Affine3A {
        &self.world_matrix
    }

    /// World matrix as a `Mat4`, for uniform upload.
    #[inline]
    #[must_use]
    pub fn world_matrix_as_mat4(&self) -> Mat4 {
        Mat4::from(self.world_matrix)
    }

    #[inline]
    #[must_use]
    pub fn world_position(&self) -> Vec3 {
        self.world_matrix.translation.into()
    }

    /// World-space -Z axis.
    #[must_use]
    pub fn world_direction(&self) -> Vec3 {
        self.world_matrix.transform_vector3(Vec3::NEG_Z).normalize_or_zero()
    }

    // ========================================================================
    // Matrix composition
    // ========================================================================

    /// Recomposes the local matrix if dirty and brings the Euler cache up to
    /// date. Returns whether the matrix changed.
    pub fn update_local_matrix(&mut self) -> bool {
        if !self.mat_needs_update && !self.rot_needs_update.get() {
            return false;
        }
        let _ = self.rotation();

        // T * R * S: scale is applied to the vertex first.
        self.local_matrix =
            Affine3A::from_scale_rotation_translation(self.scale, self.quaternion, self.position);
        self.mat_needs_update = false;
        true
    }

    /// Written by the transform system after composing with the parent.
    #[inline]
    pub(crate) fn set_world_matrix(&mut self, matrix: Affine3A) {
        self.world_matrix = matrix;
    }
}

impl Default for Transform {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::FRAC_PI_2;

    #[test]
    fn first_update_always_recomposes() {
        let mut t = Transform::new();
        assert!(t.mat_needs_update());
        assert!(t.update_local_matrix());
        assert!(!t.update_local_matrix());
    }

    #[test]
    fn quaternion_write_defers_euler_sync() {
        let mut t = Transform::new();
        t.set_quaternion(Quat::from_rotation_y(FRAC_PI_2));
        assert!(t.rot_needs_update());

        let euler = t.rotation();
        assert!((euler.y - FRAC_PI_2).abs() < 1e-4);
        assert!(!t.rot_needs_update());
    }

    #[test]
    fn euler_write_keeps_cache_fresh() {
        let mut t = Transform::new();
        t.set_rotation_euler(Vec3::new(0.1, 0.2, 0.3));
        assert!(!t.rot_needs_update());
        assert_eq!(t.rotation(), Vec3::new(0.1, 0.2, 0.3));
    }
}
