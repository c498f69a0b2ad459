//! OpenGL 3.3 backend built on `glow`.
//!
//! The caller owns the context and must keep it current on the calling
//! thread for as long as the backend is used.

use std::sync::Arc;

use glam::{Vec3, Vec4};
use glow::HasContext;
use log::{debug, error, warn};
use rustc_hash::FxHashMap;

use super::{
    ClearFlags, DrawRange, GeometryId, GraphicsBackend, ProgramId, ProgramSource, ShaderStage,
    TextureId, Uniform, UniformValue,
};
use crate::errors::{KestrelError, Result};
use crate::overlay::Rect;
use crate::resources::geometry::Geometry;

const ATTR_POSITION: u32 = 0;
const ATTR_NORMAL: u32 = 1;
const ATTR_UV: u32 = 2;

struct GlGeometry {
    vao: glow::VertexArray,
    buffers: Vec<glow::Buffer>,
    indexed: bool,
}

/// Converts a top-left origin rectangle to GL's bottom-left window
/// coordinates on a surface `surface_height` pixels tall.
fn to_gl_rect(rect: Rect, surface_height: f32) -> [i32; 4] {
    [
        rect.x.round() as i32,
        (surface_height - rect.y - rect.height).round() as i32,
        rect.width.round() as i32,
        rect.height.round() as i32,
    ]
}

/// Location cache key: program, uniform, array element.
type LocationKey = (ProgramId, Uniform, usize);

pub struct GlBackend {
    gl: Arc<glow::Context>,
    programs: Vec<Option<glow::Program>>,
    geometries: Vec<Option<GlGeometry>>,
    textures: Vec<glow::Texture>,
    locations: FxHashMap<LocationKey, Option<glow::UniformLocation>>,
    current_program: Option<ProgramId>,
    bound_geometry: Option<GeometryId>,
    surface_height: f32,
}

impl GlBackend {
    #[must_use]
    pub fn new(gl: Arc<glow::Context>) -> Self {
        Self {
            gl,
            programs: Vec::new(),
            geometries: Vec::new(),
            textures: Vec::new(),
            locations: FxHashMap::default(),
            current_program: None,
            bound_geometry: None,
            surface_height: 0.0,
        }
    }

    /// Makes an externally created texture addressable by materials.
    pub fn register_texture(&mut self, texture: glow::Texture) -> TextureId {
        self.textures.push(texture);
        TextureId(self.textures.len() as u32 - 1)
    }

    #[must_use]
    pub fn context(&self) -> &Arc<glow::Context> {
        &self.gl
    }

    unsafe fn compile_shader(&self, stage: ShaderStage, source: &str) -> Result<glow::Shader> {
        let shader_type = match stage {
            ShaderStage::Vertex => glow::VERTEX_SHADER,
            ShaderStage::Fragment => glow::FRAGMENT_SHADER,
            ShaderStage::Geometry => glow::GEOMETRY_SHADER,
        };
        unsafe {
            let shader = self
                .gl
                .create_shader(shader_type)
                .map_err(KestrelError::Backend)?;
            self.gl.shader_source(shader, source);
            self.gl.compile_shader(shader);

            if !self.gl.get_shader_compile_status(shader) {
                let log = self.gl.get_shader_info_log(shader);
                self.gl.delete_shader(shader);
                return Err(KestrelError::ShaderCompile { stage, log });
            }
            Ok(shader)
        }
    }

    fn location(&mut self, uniform: Uniform, element: usize) -> Option<glow::UniformLocation> {
        let program_id = self.current_program?;
        let program = self.programs.get(program_id.0 as usize).copied().flatten()?;
        let gl = &self.gl;
        self.locations
            .entry((program_id, uniform, element))
            .or_insert_with(|| {
                let name = match uniform {
                    Uniform::AmbientLightColor
                    | Uniform::DirLight
                    | Uniform::PointLight
                    | Uniform::SpotLight
                    | Uniform::Material => format!("{}[{element}]", uniform.name()),
                    _ => uniform.name().to_string(),
                };
                unsafe { gl.get_uniform_location(program, &name) }
            })
            .clone()
    }

    fn sampler_location(&self, unit: u32) -> Option<glow::UniformLocation> {
        let program = self
            .current_program
            .and_then(|id| self.programs.get(id.0 as usize).copied().flatten())?;
        unsafe { self.gl.get_uniform_location(program, &format!("MatTexture[{unit}]")) }
    }

    unsafe fn upload_attribute(&self, index: u32, size: i32, data: &[u8]) -> Result<glow::Buffer> {
        unsafe {
            let vbo = self.gl.create_buffer().map_err(KestrelError::Backend)?;
            self.gl.bind_buffer(glow::ARRAY_BUFFER, Some(vbo));
            self.gl
                .buffer_data_u8_slice(glow::ARRAY_BUFFER, data, glow::STATIC_DRAW);
            self.gl.enable_vertex_attrib_array(index);
            self.gl
                .vertex_attrib_pointer_f32(index, size, glow::FLOAT, false, 0, 0);
            Ok(vbo)
        }
    }
}

impl GraphicsBackend for GlBackend {
    fn create_program(&mut self, source: &ProgramSource) -> Result<ProgramId> {
        unsafe {
            let program = self.gl.create_program().map_err(KestrelError::Backend)?;

            let mut stages = vec![
                (ShaderStage::Vertex, source.vertex.as_str()),
                (ShaderStage::Fragment, source.fragment.as_str()),
            ];
            if let Some(geometry) = &source.geometry {
                stages.push((ShaderStage::Geometry, geometry.as_str()));
            }

            let mut shaders = Vec::with_capacity(stages.len());
            for (stage, text) in stages {
                match self.compile_shader(stage, text) {
                    Ok(shader) => {
                        self.gl.attach_shader(program, shader);
                        shaders.push(shader);
                    }
                    Err(err) => {
                        for shader in shaders {
                            self.gl.delete_shader(shader);
                        }
                        self.gl.delete_program(program);
                        return Err(err);
                    }
                }
            }

            self.gl.bind_attrib_location(program, ATTR_POSITION, "position");
            self.gl.bind_attrib_location(program, ATTR_NORMAL, "normal");
            self.gl.bind_attrib_location(program, ATTR_UV, "uv");
            self.gl.link_program(program);

            for shader in shaders {
                self.gl.detach_shader(program, shader);
                self.gl.delete_shader(shader);
            }

            if !self.gl.get_program_link_status(program) {
                let log = self.gl.get_program_info_log(program);
                self.gl.delete_program(program);
                error!("Linking '{}' failed: {log}", source.name);
                return Err(KestrelError::ProgramLink(log));
            }

            self.programs.push(Some(program));
            let id = ProgramId(self.programs.len() as u32 - 1);
            debug!("GL program {} linked as {:?}", source.name, id);
            Ok(id)
        }
    }

    fn use_program(&mut self, program: ProgramId) {
        let Some(native) = self.programs.get(program.0 as usize).copied().flatten() else {
            warn!("use_program: unknown {program:?}");
            return;
        };
        unsafe { self.gl.use_program(Some(native)) };
        self.current_program = Some(program);
    }

    fn delete_program(&mut self, program: ProgramId) {
        if let Some(slot) = self.programs.get_mut(program.0 as usize)
            && let Some(native) = slot.take()
        {
            unsafe { self.gl.delete_program(native) };
            self.locations.retain(|(id, _, _), _| *id != program);
            if self.current_program == Some(program) {
                self.current_program = None;
            }
        }
    }

    fn upload_geometry(&mut self, geometry: &Geometry) -> Result<GeometryId> {
        unsafe {
            let vao = self
                .gl
                .create_vertex_array()
                .map_err(KestrelError::Backend)?;
            self.gl.bind_vertex_array(Some(vao));

            let mut buffers = Vec::with_capacity(4);
            buffers.push(self.upload_attribute(
                ATTR_POSITION,
                3,
                bytemuck::cast_slice(geometry.positions()),
            )?);
            if !geometry.normals().is_empty() {
                buffers.push(self.upload_attribute(
                    ATTR_NORMAL,
                    3,
                    bytemuck::cast_slice(geometry.normals()),
                )?);
            }
            if !geometry.uvs().is_empty() {
                buffers.push(self.upload_attribute(
                    ATTR_UV,
                    2,
                    bytemuck::cast_slice(geometry.uvs()),
                )?);
            }

            if geometry.is_indexed() {
                let ebo = self.gl.create_buffer().map_err(KestrelError::Backend)?;
                self.gl.bind_buffer(glow::ELEMENT_ARRAY_BUFFER, Some(ebo));
                self.gl.buffer_data_u8_slice(
                    glow::ELEMENT_ARRAY_BUFFER,
                    bytemuck::cast_slice(geometry.indices()),
                    glow::STATIC_DRAW,
                );
                buffers.push(ebo);
            }

            self.gl.bind_vertex_array(None);
            self.bound_geometry = None;

            self.geometries.push(Some(GlGeometry {
                vao,
                buffers,
                indexed: geometry.is_indexed(),
            }));
            Ok(GeometryId(self.geometries.len() as u32 - 1))
        }
    }

    fn release_geometry(&mut self, geometry: GeometryId) {
        if let Some(slot) = self.geometries.get_mut(geometry.0 as usize)
            && let Some(gpu) = slot.take()
        {
            unsafe {
                self.gl.delete_vertex_array(gpu.vao);
                for buffer in gpu.buffers {
                    self.gl.delete_buffer(buffer);
                }
            }
            if self.bound_geometry == Some(geometry) {
                self.bound_geometry = None;
            }
        }
    }

    fn bind_geometry(&mut self, geometry: GeometryId) {
        let Some(Some(gpu)) = self.geometries.get(geometry.0 as usize) else {
            warn!("bind_geometry: unknown {geometry:?}");
            return;
        };
        unsafe { self.gl.bind_vertex_array(Some(gpu.vao)) };
        self.bound_geometry = Some(geometry);
    }

    fn bind_texture(&mut self, unit: u32, texture: TextureId) {
        let Some(native) = self.textures.get(texture.0 as usize).copied() else {
            warn!("bind_texture: unknown {texture:?}");
            return;
        };
        let location = self.sampler_location(unit);
        unsafe {
            self.gl.active_texture(glow::TEXTURE0 + unit);
            self.gl.bind_texture(glow::TEXTURE_2D, Some(native));
            self.gl.uniform_1_i32(location.as_ref(), unit as i32);
        }
    }

    fn set_uniform(&mut self, uniform: Uniform, value: UniformValue) {
        let Some(location) = self.location(uniform, 0) else {
            return;
        };
        let location = Some(&location);
        unsafe {
            match value {
                UniformValue::Float(v) => self.gl.uniform_1_f32(location, v),
                UniformValue::Int(v) => self.gl.uniform_1_i32(location, v),
                UniformValue::Vec3(v) => self.gl.uniform_3_f32(location, v.x, v.y, v.z),
                UniformValue::Vec4(v) => self.gl.uniform_4_f32(location, v.x, v.y, v.z, v.w),
                UniformValue::Mat3(m) => {
                    self.gl
                        .uniform_matrix_3_f32_slice(location, false, &m.to_cols_array());
                }
                UniformValue::Mat4(m) => {
                    self.gl
                        .uniform_matrix_4_f32_slice(location, false, &m.to_cols_array());
                }
            }
        }
    }

    fn set_uniform_vec3_array(&mut self, uniform: Uniform, offset: usize, values: &[Vec3]) {
        if values.is_empty() {
            return;
        }
        // Array elements are contiguous from the first written element.
        let Some(location) = self.location(uniform, offset) else {
            return;
        };
        unsafe {
            self.gl
                .uniform_3_f32_slice(Some(&location), bytemuck::cast_slice(values));
        }
    }

    fn set_surface_size(&mut self, _width: f32, height: f32) {
        self.surface_height = height;
    }

    fn set_viewport(&mut self, rect: Rect) {
        let [x, y, width, height] = to_gl_rect(rect, self.surface_height);
        unsafe {
            self.gl.viewport(x, y, width, height);
        }
    }

    fn set_scissor(&mut self, rect: Option<Rect>) {
        unsafe {
            match rect {
                Some(rect) => {
                    let [x, y, width, height] = to_gl_rect(rect, self.surface_height);
                    self.gl.enable(glow::SCISSOR_TEST);
                    self.gl.scissor(x, y, width, height);
                }
                None => self.gl.disable(glow::SCISSOR_TEST),
            }
        }
    }

    fn clear(&mut self, flags: ClearFlags, color: Vec4) {
        let mut mask = 0;
        if flags.contains(ClearFlags::COLOR) {
            mask |= glow::COLOR_BUFFER_BIT;
        }
        if flags.contains(ClearFlags::DEPTH) {
            mask |= glow::DEPTH_BUFFER_BIT;
        }
        if flags.contains(ClearFlags::STENCIL) {
            mask |= glow::STENCIL_BUFFER_BIT;
        }
        unsafe {
            self.gl.clear_color(color.x, color.y, color.z, color.w);
            self.gl.clear(mask);
        }
    }

    fn draw(&mut self, range: DrawRange) {
        let indexed = self
            .bound_geometry
            .and_then(|id| self.geometries.get(id.0 as usize))
            .and_then(Option::as_ref)
            .is_some_and(|gpu| gpu.indexed);
        unsafe {
            if indexed {
                self.gl.draw_elements(
                    glow::TRIANGLES,
                    range.count as i32,
                    glow::UNSIGNED_INT,
                    (range.start as usize * std::mem::size_of::<u32>()) as i32,
                );
            } else {
                self.gl
                    .draw_arrays(glow::TRIANGLES, range.start as i32, range.count as i32);
            }
        }
    }
}

impl Drop for GlBackend {
    fn drop(&mut self) {
        unsafe {
            for program in self.programs.drain(..).flatten() {
                self.gl.delete_program(program);
            }
            for gpu in self.geometries.drain(..).flatten() {
                self.gl.delete_vertex_array(gpu.vao);
                for buffer in gpu.buffers {
                    self.gl.delete_buffer(buffer);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn top_panel_maps_to_upper_half() {
        let rect = Rect::new(0.0, 0.0, 800.0, 300.0);
        assert_eq!(to_gl_rect(rect, 600.0), [0, 300, 800, 300]);
    }

    #[test]
    fn full_surface_is_unchanged() {
        let rect = Rect::new(0.0, 0.0, 800.0, 600.0);
        assert_eq!(to_gl_rect(rect, 600.0), [0, 0, 800, 600]);
    }

    #[test]
    fn inset_rect_flips_around_surface_height() {
        let rect = Rect::new(100.0, 50.0, 400.0, 300.0);
        assert_eq!(to_gl_rect(rect, 600.0), [100, 250, 400, 300]);
    }
}
