use glam::{Affine3A, Vec2, Vec3};

use crate::renderer::backend::DrawRange;

/// Axis-aligned bounding box.
///
/// [`BoundingBox::EMPTY`] is inverted (`+inf`/`-inf`) so that the first
/// point or box merged into it defines the extent; it never reports a
/// spurious box around the origin.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingBox {
    pub min: Vec3,
    pub max: Vec3,
}

impl BoundingBox {
    pub const EMPTY: Self = Self {
        min: Vec3::splat(f32::INFINITY),
        max: Vec3::splat(f32::NEG_INFINITY),
    };

    #[must_use]
    pub fn new(min: Vec3, max: Vec3) -> Self {
        Self { min, max }
    }

    #[must_use]
    pub fn from_points(points: &[Vec3]) -> Self {
        points.iter().fold(Self::EMPTY, |bbox, &p| bbox.expand_by_point(p))
    }

    /// `true` until at least one point has been merged.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.min.x > self.max.x || self.min.y > self.max.y || self.min.z > self.max.z
    }

    #[must_use]
    pub fn center(&self) -> Vec3 {
        (self.min + self.max) * 0.5
    }

    #[must_use]
    pub fn size(&self) -> Vec3 {
        if self.is_empty() {
            Vec3::ZERO
        } else {
            self.max - self.min
        }
    }

    #[must_use]
    pub fn expand_by_point(&self, point: Vec3) -> Self {
        Self {
            min: self.min.min(point),
            max: self.max.max(point),
        }
    }

    #[must_use]
    pub fn union(&self, other: &BoundingBox) -> BoundingBox {
        BoundingBox {
            min: self.min.min(other.min),
            max: self.max.max(other.max),
        }
    }

    #[must_use]
    pub fn contains_point(&self, point: Vec3) -> bool {
        point.cmpge(self.min).all() && point.cmple(self.max).all()
    }

    /// Box enclosing the eight transformed corners.
    #[must_use]
    pub fn transform(&self, matrix: &Affine3A) -> Self {
        if self.is_empty() {
            return *self;
        }

        let corners = [
            Vec3::new(self.min.x, self.min.y, self.min.z),
            Vec3::new(self.min.x, self.min.y, self.max.z),
            Vec3::new(self.min.x, self.max.y, self.min.z),
            Vec3::new(self.min.x, self.max.y, self.max.z),
            Vec3::new(self.max.x, self.min.y, self.min.z),
            Vec3::new(self.max.x, self.min.y, self.max.z),
            Vec3::new(self.max.x, self.max.y, self.min.z),
            Vec3::new(self.max.x, self.max.y, self.max.z),
        ];

        corners
            .into_iter()
            .fold(Self::EMPTY, |bbox, corner| {
                bbox.expand_by_point(matrix.transform_point3(corner))
            })
    }
}

impl Default for BoundingBox {
    fn default() -> Self {
        Self::EMPTY
    }
}

/// CPU-side triangle geometry.
#[derive(Debug, Clone)]
pub struct Geometry {
    positions: Vec<Vec3>,
    normals: Vec<Vec3>,
    uvs: Vec<Vec2>,
    indices: Vec<u32>,
    bounding_box: BoundingBox,
}

impl Geometry {
    /// Indexed triangle list. Pass empty `indices` for non-indexed drawing.
    #[must_use]
    pub fn new(positions: Vec<Vec3>, indices: Vec<u32>) -> Self {
        let bounding_box = BoundingBox::from_points(&positions);
        Self {
            positions,
            normals: Vec::new(),
            uvs: Vec::new(),
            indices,
            bounding_box,
        }
    }

    #[must_use]
    pub fn with_normals(mut self, normals: Vec<Vec3>) -> Self {
        debug_assert_eq!(normals.len(), self.positions.len());
        self.normals = normals;
        self
    }

    #[must_use]
    pub fn with_uvs(mut self, uvs: Vec<Vec2>) -> Self {
        debug_assert_eq!(uvs.len(), self.positions.len());
        self.uvs = uvs;
        self
    }

    /// Axis-aligned box centred on the origin, with per-face normals and UVs.
    #[must_use]
    pub fn cuboid(size: Vec3) -> Self {
        let half = size * 0.5;
        // (normal, u axis, v axis)
        let faces = [
            (Vec3::X, Vec3::NEG_Z, Vec3::Y),
            (Vec3::NEG_X, Vec3::Z, Vec3::Y),
            (Vec3::Y, Vec3::X, Vec3::NEG_Z),
            (Vec3::NEG_Y, Vec3::X, Vec3::Z),
            (Vec3::Z, Vec3::X, Vec3::Y),
            (Vec3::NEG_Z, Vec3::NEG_X, Vec3::Y),
        ];

        let mut positions = Vec::with_capacity(24);
        let mut normals = Vec::with_capacity(24);
        let mut uvs = Vec::with_capacity(24);
        let mut indices = Vec::with_capacity(36);

        for (normal, u, v) in faces {
            let base = positions.len() as u32;
            for (su, sv) in [(-1.0, -1.0), (1.0, -1.0), (1.0, 1.0), (-1.0, 1.0)] {
                positions.push((normal + u * su + v * sv) * half);
                normals.push(normal);
                uvs.push(Vec2::new((su + 1.0) * 0.5, (sv + 1.0) * 0.5));
            }
            indices.extend_from_slice(&[base, base + 1, base + 2, base, base + 2, base + 3]);
        }

        Self::new(positions, indices).with_normals(normals).with_uvs(uvs)
    }

    /// Unit quad in the XY plane spanning (0,0)..(1,1); used for overlay panels.
    #[must_use]
    pub fn unit_quad() -> Self {
        let positions = vec![
            Vec3::new(0.0, 0.0, 0.0),
            Vec3::new(1.0, 0.0, 0.0),
            Vec3::new(1.0, 1.0, 0.0),
            Vec3::new(0.0, 1.0, 0.0),
        ];
        let uvs = vec![
            Vec2::new(0.0, 0.0),
            Vec2::new(1.0, 0.0),
            Vec2::new(1.0, 1.0),
            Vec2::new(0.0, 1.0),
        ];
        Self::new(positions, vec![0, 1, 2, 0, 2, 3]).with_uvs(uvs)
    }

    #[inline]
    #[must_use]
    pub fn positions(&self) -> &[Vec3] {
        &self.positions
    }

    #[inline]
    #[must_use]
    pub fn normals(&self) -> &[Vec3] {
        &self.normals
    }

    #[inline]
    #[must_use]
    pub fn uvs(&self) -> &[Vec2] {
        &self.uvs
    }

    #[inline]
    #[must_use]
    pub fn indices(&self) -> &[u32] {
        &self.indices
    }

    #[inline]
    #[must_use]
    pub fn is_indexed(&self) -> bool {
        !self.indices.is_empty()
    }

    /// Local-space bounds of all positions.
    #[inline]
    #[must_use]
    pub fn bounding_box(&self) -> BoundingBox {
        self.bounding_box
    }

    /// Range covering every element (indices, or vertices when non-indexed).
    #[must_use]
    pub fn full_range(&self) -> DrawRange {
        let count = if self.is_indexed() {
            self.indices.len()
        } else {
            self.positions.len()
        };
        DrawRange::new(0, count as u32)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_box_is_inverted() {
        assert!(BoundingBox::EMPTY.is_empty());
        assert_eq!(BoundingBox::EMPTY.size(), Vec3::ZERO);
    }

    #[test]
    fn single_point_box_is_degenerate() {
        let p = Vec3::new(2.0, -1.0, 3.0);
        let bbox = BoundingBox::EMPTY.expand_by_point(p);
        assert!(!bbox.is_empty());
        assert_eq!(bbox.min, p);
        assert_eq!(bbox.max, p);
    }

    #[test]
    fn cuboid_bounds_match_size() {
        let geometry = Geometry::cuboid(Vec3::new(2.0, 4.0, 6.0));
        let bbox = geometry.bounding_box();
        assert_eq!(bbox.min, Vec3::new(-1.0, -2.0, -3.0));
        assert_eq!(bbox.max, Vec3::new(1.0, 2.0, 3.0));
        assert_eq!(geometry.full_range(), DrawRange::new(0, 36));
    }

    #[test]
    fn transform_translates_box() {
        let bbox = BoundingBox::new(Vec3::splat(-1.0), Vec3::splat(1.0));
        let moved = bbox.transform(&Affine3A::from_translation(Vec3::new(10.0, 0.0, 0.0)));
        assert_eq!(moved.min, Vec3::new(9.0, -1.0, -1.0));
        assert_eq!(moved.max, Vec3::new(11.0, 1.0, 1.0));
    }
}
