//! Renderer
//!
//! Frame-driven forward renderer over a [`GraphicsBackend`].
//!
//! A frame is two passes, scene first:
//!
//! 1. **Scene**: refresh world matrices, classify the visible nodes into
//!    light buckets / graphics / others, then for each material resolve a
//!    program through the [`ProgramCache`], upload every light by index and
//!    draw.
//! 2. **Overlay**: redraw the panel tree, fully or only where it overlaps the
//!    3D viewport, depending on what changed.
//!
//! [`Renderer::render`] reports whether anything reached the framebuffer, so
//! windowed callers can skip the buffer swap on idle frames.

pub mod backend;
pub mod lights;
mod overlay_pass;
pub mod pipeline;
pub mod render_lists;
pub mod settings;

pub use backend::{GraphicsBackend, RecordingBackend};
pub use render_lists::{GraphicItem, RenderLists};
pub use settings::RendererSettings;

use glam::{Mat3, Mat4, Vec3};
use log::{trace, warn};

use crate::errors::Result;
use crate::overlay::{Overlay, PanelDraw, Rect};
use crate::scene::camera::CameraView;
use crate::scene::node::NodeContent;
use crate::scene::scene::Scene;
use crate::scene::NodeHandle;

use self::backend::{ClearFlags, GeometryId, Uniform, UniformValue};
use self::pipeline::{ProgramCache, ShaderRegistry, ShaderSpecs};

/// Camera matrices captured at the start of the scene pass.
#[derive(Debug, Clone, Copy)]
pub struct RenderInfo {
    pub view: Mat4,
    pub projection: Mat4,
}

impl Default for RenderInfo {
    fn default() -> Self {
        Self {
            view: Mat4::IDENTITY,
            projection: Mat4::IDENTITY,
        }
    }
}

/// Counters of the last rendered frame.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FrameStats {
    pub ambient_lights: usize,
    pub dir_lights: usize,
    pub point_lights: usize,
    pub spot_lights: usize,
    /// Collected mesh materials.
    pub graphics: usize,
    pub others: usize,
    pub draw_calls: usize,
    /// Programs compiled since the renderer was created.
    pub programs_compiled: usize,
    pub panels_drawn: usize,
    pub scene_drawn: bool,
    pub overlay_full_redraw: bool,
}

pub struct Renderer {
    settings: RendererSettings,

    // 着色器
    registry: ShaderRegistry,
    cache: ProgramCache,
    specs: ShaderSpecs,
    panel_specs: ShaderSpecs,

    // 每帧状态
    lists: RenderLists,
    info: RenderInfo,
    /// Packed light uniforms, one vector per bucket.
    light_data: [Vec<Vec3>; 4],
    stats: FrameStats,

    // 叠加层
    screen: Rect,
    overlay_frames: u32,
    panel_quad: Option<GeometryId>,
    panel_draws: Vec<PanelDraw>,
}

impl Renderer {
    /// Renderer with the built-in shader programs registered.
    pub fn new(settings: RendererSettings) -> Result<Self> {
        settings.validate()?;
        let mut registry = ShaderRegistry::with_builtins()?;
        registry.set_index_token(settings.index_token.clone());
        Ok(Self::with_registry(settings, registry))
    }

    /// Renderer using a caller-built registry. Overlay drawing needs a
    /// `panel` program in it.
    #[must_use]
    pub fn with_registry(settings: RendererSettings, registry: ShaderRegistry) -> Self {
        let specs = ShaderSpecs::new("", settings.glsl_version.clone());
        let panel_specs = ShaderSpecs {
            unique: true,
            use_lights: crate::resources::UseLights::empty(),
            ..ShaderSpecs::new("panel", settings.glsl_version.clone())
        };

        Self {
            settings,
            registry,
            cache: ProgramCache::new(),
            specs,
            panel_specs,
            lists: RenderLists::default(),
            info: RenderInfo::default(),
            light_data: Default::default(),
            stats: FrameStats::default(),
            screen: Rect::ZERO,
            overlay_frames: 0,
            panel_quad: None,
            panel_draws: Vec::new(),
        }
    }

    // ====访问器====

    #[inline]
    #[must_use]
    pub fn settings(&self) -> &RendererSettings {
        &self.settings
    }

    #[inline]
    #[must_use]
    pub fn registry(&self) -> &ShaderRegistry {
        &self.registry
    }

    #[inline]
    pub fn registry_mut(&mut self) -> &mut ShaderRegistry {
        &mut self.registry
    }

    #[inline]
    #[must_use]
    pub fn cache(&self) -> &ProgramCache {
        &self.cache
    }

    /// Light counts of the last classified frame.
    #[inline]
    #[must_use]
    pub fn specs(&self) -> &ShaderSpecs {
        &self.specs
    }

    #[inline]
    #[must_use]
    pub fn render_lists(&self) -> &RenderLists {
        &self.lists
    }

    #[inline]
    #[must_use]
    pub fn stats(&self) -> FrameStats {
        self.stats
    }

    /// Sets the window size; the full-screen viewport when the overlay has no
    /// 3D viewport panel.
    pub fn set_size(&mut self, width: u32, height: u32) {
        self.screen = Rect::new(0.0, 0.0, width as f32, height as f32);
    }

    /// Frees GPU geometry returned by [`Scene::dispose`].
    pub fn release_geometries(&mut self, backend: &mut dyn GraphicsBackend, ids: &[GeometryId]) {
        for &id in ids {
            backend.release_geometry(id);
        }
    }

    // ====帧====

    /// Renders one frame: the scene (if any), then the overlay (if any).
    ///
    /// Returns `true` if anything was drawn. A program generation or compile
    /// error aborts the frame.
    pub fn render(
        &mut self,
        backend: &mut dyn GraphicsBackend,
        scene: Option<&mut Scene>,
        overlay: Option<&mut Overlay>,
        camera: &dyn CameraView,
    ) -> Result<bool> {
        self.stats = FrameStats::default();
        backend.set_surface_size(self.screen.width, self.screen.height);
        backend.set_viewport(self.screen);

        let viewport_3d = overlay.as_deref().and_then(Overlay::viewport_rect);

        let scene_drawn = match scene {
            Some(scene) => self.render_scene(backend, scene, camera, viewport_3d)?,
            None => false,
        };

        let overlay_drawn = match overlay {
            Some(overlay) => self.render_overlay(backend, overlay, scene_drawn)?,
            None => false,
        };

        self.stats.scene_drawn = scene_drawn;
        self.stats.programs_compiled = self.cache.len();
        Ok(scene_drawn || overlay_drawn)
    }

    fn render_scene(
        &mut self,
        backend: &mut dyn GraphicsBackend,
        scene: &mut Scene,
        camera: &dyn CameraView,
        viewport_3d: Option<Rect>,
    ) -> Result<bool> {
        scene.update_world_matrices();

        self.info.view = camera.view_matrix();
        self.info.projection = camera.projection_matrix();

        self.lists.clear();
        self.lists.classify(scene);

        self.specs.ambient_lights_max = self.lists.ambient.len();
        self.specs.dir_lights_max = self.lists.directional.len();
        self.specs.point_lights_max = self.lists.point.len();
        self.specs.spot_lights_max = self.lists.spot.len();

        self.stats.ambient_lights = self.lists.ambient.len();
        self.stats.dir_lights = self.lists.directional.len();
        self.stats.point_lights = self.lists.point.len();
        self.stats.spot_lights = self.lists.spot.len();
        self.stats.graphics = self.lists.graphics.len();
        self.stats.others = self.lists.others.len();
        trace!(
            "Classified: amb={} dir={} point={} spot={} graphics={} others={}",
            self.stats.ambient_lights,
            self.stats.dir_lights,
            self.stats.point_lights,
            self.stats.spot_lights,
            self.stats.graphics,
            self.stats.others,
        );

        for i in 0..self.lists.others.len() {
            run_node_hook(scene, self.lists.others[i]);
        }

        if self.lists.graphics.is_empty() {
            return Ok(false);
        }

        self.pack_lights(scene);

        if let Some(rect) = viewport_3d {
            backend.set_viewport(rect);
        }
        backend.set_scissor(viewport_3d);
        backend.clear(
            ClearFlags::COLOR | ClearFlags::DEPTH | ClearFlags::STENCIL,
            self.settings.clear_color(),
        );

        let mut result = Ok(());
        for i in 0..self.lists.graphics.len() {
            let item = self.lists.graphics[i];
            result = self.draw_graphic(backend, scene, item);
            if result.is_err() {
                break;
            }
        }

        if viewport_3d.is_some() {
            backend.set_viewport(self.screen);
            backend.set_scissor(None);
        }
        result.map(|()| true)
    }

    fn pack_lights(&mut self, scene: &Scene) {
        let buckets = self.lists.light_buckets();
        for (data, bucket) in self.light_data.iter_mut().zip(buckets) {
            data.clear();
            for &handle in bucket {
                let node = &scene.nodes[handle];
                if let NodeContent::Light(key) = node.content
                    && let Some(light) = scene.lights.get(key)
                {
                    lights::pack(light, node.transform.world_matrix(), &self.info.view, data);
                }
            }
        }
    }

    fn upload_lights(&self, backend: &mut dyn GraphicsBackend) {
        for (data, (uniform, stride)) in self.light_data.iter().zip(lights::BUCKET_LAYOUT) {
            for (index, values) in data.chunks_exact(stride).enumerate() {
                backend.set_uniform_vec3_array(uniform, index * stride, values);
            }
        }
    }

    fn draw_graphic(
        &mut self,
        backend: &mut dyn GraphicsBackend,
        scene: &mut Scene,
        item: GraphicItem,
    ) -> Result<()> {
        let Some(mesh) = scene.meshes.get_mut(item.mesh) else {
            warn!("Mesh of node {:?} vanished during the frame", item.node);
            return Ok(());
        };
        if mesh.gpu_geometry.is_none() {
            mesh.gpu_geometry = Some(backend.upload_geometry(&mesh.geometry)?);
        }

        let mesh = &scene.meshes[item.mesh];
        let Some(entry) = mesh.materials().get(item.material) else {
            return Ok(());
        };
        let material = &entry.material;
        if material.shader.is_empty() {
            warn!("Skipping material with an empty shader name on {:?}", item.node);
            return Ok(());
        }

        self.specs.apply_material(material);
        self.cache.set_program(backend, &self.registry, &self.specs)?;

        self.upload_lights(backend);

        let world = scene.nodes[item.node].transform.world_matrix_as_mat4();
        let model_view = self.info.view * world;
        let mvp = self.info.projection * model_view;
        let normal_matrix = Mat3::from_mat4(model_view).inverse().transpose();

        backend.set_uniform(Uniform::ModelViewMatrix, UniformValue::Mat4(model_view));
        backend.set_uniform(Uniform::ModelViewProjectionMatrix, UniformValue::Mat4(mvp));
        backend.set_uniform(Uniform::NormalMatrix, UniformValue::Mat3(normal_matrix));
        backend.set_uniform_vec3_array(
            Uniform::Material,
            0,
            &[
                material.color,
                material.specular,
                material.emissive,
                Vec3::new(
                    material.shininess,
                    material.opacity,
                    material.texture_count() as f32,
                ),
            ],
        );
        for (unit, &texture) in material.textures.iter().enumerate() {
            backend.bind_texture(unit as u32, texture);
        }

        if let Some(geometry) = mesh.gpu_geometry {
            backend.bind_geometry(geometry);
        }
        backend.draw(entry.range);
        self.stats.draw_calls += 1;
        Ok(())
    }
}

/// Per-frame side effects of non-graphic, non-light nodes.
fn run_node_hook(scene: &mut Scene, handle: NodeHandle) {
    let Some(node) = scene.nodes.get(handle) else {
        return;
    };
    if !node.visible {
        return;
    }
    match node.content {
        NodeContent::Emitter(key) => {
            let world = *node.transform.world_matrix();
            if let Some(emitter) = scene.emitters.get_mut(key) {
                emitter.sync(&world);
            }
        }
        NodeContent::Group | NodeContent::Mesh(_) | NodeContent::Light(_) => {}
    }
}
