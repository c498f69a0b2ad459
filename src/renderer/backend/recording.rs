//! Headless backend that records every call.

use glam::{Vec3, Vec4};

use super::{
    ClearFlags, DrawRange, GeometryId, GraphicsBackend, ProgramId, ProgramSource, ShaderStage,
    TextureId, Uniform, UniformValue,
};
use crate::errors::{KestrelError, Result};
use crate::overlay::Rect;
use crate::resources::geometry::Geometry;

#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    CreateProgram(ProgramId),
    UseProgram(ProgramId),
    DeleteProgram(ProgramId),
    UploadGeometry(GeometryId),
    ReleaseGeometry(GeometryId),
    BindGeometry(GeometryId),
    BindTexture { unit: u32, texture: TextureId },
    SetUniform(Uniform, UniformValue),
    SetUniformArray { uniform: Uniform, offset: usize, values: Vec<Vec3> },
    Viewport(Rect),
    Scissor(Option<Rect>),
    Clear(ClearFlags, Vec4),
    Draw(DrawRange),
}

/// Backend that keeps programs and commands in memory.
///
/// Program sources are stored so tests can inspect generated GLSL;
/// [`RecordingBackend::fail_next_compile`] injects a compile error.
#[derive(Debug, Default)]
pub struct RecordingBackend {
    commands: Vec<Command>,
    programs: Vec<ProgramSource>,
    next_geometry: u32,
    pending_failure: Option<String>,
    surface_size: (f32, f32),
}

impl RecordingBackend {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn commands(&self) -> &[Command] {
        &self.commands
    }

    /// Returns and clears the recorded commands.
    pub fn take_commands(&mut self) -> Vec<Command> {
        std::mem::take(&mut self.commands)
    }

    /// Number of programs successfully created so far.
    #[must_use]
    pub fn program_count(&self) -> usize {
        self.programs.len()
    }

    #[must_use]
    pub fn program_source(&self, program: ProgramId) -> Option<&ProgramSource> {
        self.programs.get(program.0 as usize)
    }

    /// Last size passed to `set_surface_size`.
    #[must_use]
    pub fn surface_size(&self) -> (f32, f32) {
        self.surface_size
    }

    /// Makes the next `create_program` call fail with `log`.
    pub fn fail_next_compile(&mut self, log: impl Into<String>) {
        self.pending_failure = Some(log.into());
    }

    /// Number of recorded commands matching `predicate`.
    pub fn count(&self, predicate: impl Fn(&Command) -> bool) -> usize {
        self.commands.iter().filter(|c| predicate(c)).count()
    }

    #[must_use]
    pub fn draw_count(&self) -> usize {
        self.count(|c| matches!(c, Command::Draw(_)))
    }
}

impl GraphicsBackend for RecordingBackend {
    fn create_program(&mut self, source: &ProgramSource) -> Result<ProgramId> {
        if let Some(log) = self.pending_failure.take() {
            return Err(KestrelError::ShaderCompile {
                stage: ShaderStage::Fragment,
                log,
            });
        }
        let id = ProgramId(self.programs.len() as u32);
        self.programs.push(source.clone());
        self.commands.push(Command::CreateProgram(id));
        Ok(id)
    }

    fn use_program(&mut self, program: ProgramId) {
        self.commands.push(Command::UseProgram(program));
    }

    fn delete_program(&mut self, program: ProgramId) {
        self.commands.push(Command::DeleteProgram(program));
    }

    fn upload_geometry(&mut self, _geometry: &Geometry) -> Result<GeometryId> {
        let id = GeometryId(self.next_geometry);
        self.next_geometry += 1;
        self.commands.push(Command::UploadGeometry(id));
        Ok(id)
    }

    fn release_geometry(&mut self, geometry: GeometryId) {
        self.commands.push(Command::ReleaseGeometry(geometry));
    }

    fn bind_geometry(&mut self, geometry: GeometryId) {
        self.commands.push(Command::BindGeometry(geometry));
    }

    fn bind_texture(&mut self, unit: u32, texture: TextureId) {
        self.commands.push(Command::BindTexture { unit, texture });
    }

    fn set_uniform(&mut self, uniform: Uniform, value: UniformValue) {
        self.commands.push(Command::SetUniform(uniform, value));
    }

    fn set_uniform_vec3_array(&mut self, uniform: Uniform, offset: usize, values: &[Vec3]) {
        self.commands.push(Command::SetUniformArray {
            uniform,
            offset,
            values: values.to_vec(),
        });
    }

    fn set_surface_size(&mut self, width: f32, height: f32) {
        self.surface_size = (width, height);
    }

    fn set_viewport(&mut self, rect: Rect) {
        self.commands.push(Command::Viewport(rect));
    }

    fn set_scissor(&mut self, rect: Option<Rect>) {
        self.commands.push(Command::Scissor(rect));
    }

    fn clear(&mut self, flags: ClearFlags, color: Vec4) {
        self.commands.push(Command::Clear(flags, color));
    }

    fn draw(&mut self, range: DrawRange) {
        self.commands.push(Command::Draw(range));
    }
}
