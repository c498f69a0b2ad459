use std::borrow::Cow;

use crate::renderer::backend::{DrawRange, GeometryId};
use crate::resources::geometry::Geometry;
use crate::resources::material::Material;

/// One material bound to a range of the mesh's geometry.
#[derive(Debug, Clone)]
pub struct MeshMaterial {
    pub material: Material,
    pub range: DrawRange,
}

/// Renderable graphic: geometry plus one or more materials.
///
/// Each material is drawn separately, in the order it was added.
#[derive(Debug, Clone)]
pub struct Mesh {
    pub name: Cow<'static, str>,
    pub geometry: Geometry,
    materials: Vec<MeshMaterial>,

    /// Set by the renderer after the first upload.
    pub(crate) gpu_geometry: Option<GeometryId>,
}

impl Mesh {
    /// Mesh drawing the whole geometry with a single material.
    #[must_use]
    pub fn new(geometry: Geometry, material: Material) -> Self {
        let range = geometry.full_range();
        Self {
            name: Cow::Borrowed("Mesh"),
            geometry,
            materials: vec![MeshMaterial { material, range }],
            gpu_geometry: None,
        }
    }

    #[must_use]
    pub fn with_name(mut self, name: impl Into<Cow<'static, str>>) -> Self {
        self.name = name.into();
        self
    }

    /// Adds a material drawing `count` elements starting at `start`.
    pub fn add_group_material(&mut self, material: Material, start: u32, count: u32) {
        self.materials.push(MeshMaterial {
            material,
            range: DrawRange::new(start, count),
        });
    }

    #[inline]
    #[must_use]
    pub fn materials(&self) -> &[MeshMaterial] {
        &self.materials
    }

    #[inline]
    pub fn materials_mut(&mut self) -> &mut [MeshMaterial] {
        &mut self.materials
    }

    #[inline]
    #[must_use]
    pub fn gpu_geometry(&self) -> Option<GeometryId> {
        self.gpu_geometry
    }
}
