//! Program Cache
//!
//! Memoizes compiled programs by [`ShaderSpecs`]. Entries live in a `Vec`
//! and are found with a linear scan: a run only ever sees a handful of
//! distinct material / light-count combinations. Nothing is evicted.
//!
//! # Activation
//!
//! [`ProgramCache::set_program`] resolves a requested spec in three steps:
//!
//! 1. normalize: zero the counts of light kinds the material ignores;
//! 2. equal to the active spec: nothing to do;
//! 3. equal to a cached spec: bind that program, otherwise generate,
//!    compile and append a new one.
//!
//! A failed generation or compile leaves the cache untouched.

use log::{debug, error};

use super::registry::ShaderRegistry;
use super::specs::ShaderSpecs;
use crate::errors::Result;
use crate::renderer::backend::{GraphicsBackend, ProgramId};

#[derive(Debug, Clone)]
pub struct ProgramCacheEntry {
    pub program: ProgramId,
    pub specs: ShaderSpecs,
}

#[derive(Debug, Default)]
pub struct ProgramCache {
    entries: Vec<ProgramCacheEntry>,
    /// Index of the bound entry.
    active: Option<usize>,
}

impl ProgramCache {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes a program matching `requested` current on `backend`.
    ///
    /// Returns `true` when the bound program changed.
    pub fn set_program(
        &mut self,
        backend: &mut dyn GraphicsBackend,
        registry: &ShaderRegistry,
        requested: &ShaderSpecs,
    ) -> Result<bool> {
        let specs = requested.normalized();

        if let Some(active) = self.active
            && self.entries[active].specs == specs
        {
            return Ok(false);
        }

        if let Some(index) = self.entries.iter().position(|entry| entry.specs == specs) {
            let program = self.entries[index].program;
            backend.use_program(program);
            self.active = Some(index);
            debug!("Reusing program '{}' ({program:?})", specs.name);
            return Ok(true);
        }

        let source = registry.generate(&specs).inspect_err(|err| {
            error!("Generating program '{}' failed: {err}", specs.name);
        })?;
        let program = backend.create_program(&source).inspect_err(|err| {
            error!("Compiling program '{}' failed: {err}", specs.name);
        })?;

        debug!(
            "Compiled program '{}' ({program:?}): amb={} dir={} point={} spot={} tex={}",
            specs.name,
            specs.ambient_lights_max,
            specs.dir_lights_max,
            specs.point_lights_max,
            specs.spot_lights_max,
            specs.mat_tex_count,
        );

        backend.use_program(program);
        self.entries.push(ProgramCacheEntry { program, specs });
        self.active = Some(self.entries.len() - 1);
        Ok(true)
    }

    /// The bound entry, if any.
    #[must_use]
    pub fn active(&self) -> Option<&ProgramCacheEntry> {
        self.active.map(|index| &self.entries[index])
    }

    /// Forgets which program is bound (e.g. after external GL state changes).
    /// The next [`set_program`](Self::set_program) rebinds.
    pub fn invalidate_active(&mut self) {
        self.active = None;
    }

    #[must_use]
    pub fn entries(&self) -> &[ProgramCacheEntry] {
        &self.entries
    }

    /// Number of programs compiled so far.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Deletes every cached program.
    pub fn clear(&mut self, backend: &mut dyn GraphicsBackend) {
        for entry in self.entries.drain(..) {
            backend.delete_program(entry.program);
        }
        self.active = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::renderer::backend::RecordingBackend;
    use crate::resources::material::UseLights;

    fn standard(point: usize) -> ShaderSpecs {
        let mut specs = ShaderSpecs::new("standard", "330 core");
        specs.point_lights_max = point;
        specs
    }

    #[test]
    fn repeated_request_is_a_no_op() {
        let registry = ShaderRegistry::with_builtins().unwrap();
        let mut backend = RecordingBackend::new();
        let mut cache = ProgramCache::new();

        assert!(cache.set_program(&mut backend, &registry, &standard(1)).unwrap());
        assert!(!cache.set_program(&mut backend, &registry, &standard(1)).unwrap());
        assert_eq!(backend.program_count(), 1);
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn ignored_light_kinds_share_a_program() {
        let registry = ShaderRegistry::with_builtins().unwrap();
        let mut backend = RecordingBackend::new();
        let mut cache = ProgramCache::new();

        let mut a = standard(0);
        a.use_lights = UseLights::AMBIENT;
        let mut b = standard(4);
        b.use_lights = UseLights::AMBIENT;

        cache.set_program(&mut backend, &registry, &a).unwrap();
        assert!(!cache.set_program(&mut backend, &registry, &b).unwrap());
        assert_eq!(backend.program_count(), 1);
    }

    #[test]
    fn clear_deletes_programs() {
        let registry = ShaderRegistry::with_builtins().unwrap();
        let mut backend = RecordingBackend::new();
        let mut cache = ProgramCache::new();
        cache.set_program(&mut backend, &registry, &standard(0)).unwrap();
        cache.set_program(&mut backend, &registry, &standard(1)).unwrap();

        backend.take_commands();
        cache.clear(&mut backend);
        assert!(cache.is_empty());
        assert!(cache.active().is_none());
        assert_eq!(
            backend.count(|c| matches!(c, crate::renderer::backend::Command::DeleteProgram(_))),
            2
        );
    }
}
