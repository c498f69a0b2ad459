//! Shader Source Registry
//!
//! Explicit registry of GLSL include chunks, shader bodies and program
//! definitions. A registry is built once at startup and handed to the
//! renderer; nothing is registered through global state.
//!
//! [`ShaderRegistry::with_builtins`] loads the sources embedded from
//! `src/renderer/shaders`:
//!
//! | Path | Registered as |
//! |------|---------------|
//! | `chunks/<name>.glsl` | include `<name>` |
//! | `<file>` | shader `<file>` (e.g. `standard.vert`) |
//!
//! and defines the `standard`, `basic` and `panel` programs on top of them.

use log::warn;
use rust_embed::RustEmbed;
use rustc_hash::FxHashMap;

use super::preprocess::Preprocessor;
use super::specs::ShaderSpecs;
use crate::errors::{KestrelError, Result};
use crate::renderer::backend::ProgramSource;
use crate::resources::ShaderDefines;

#[derive(RustEmbed)]
#[folder = "src/renderer/shaders"]
struct BuiltinShaders;

const CHUNK_DIR: &str = "chunks/";
const DEFAULT_INDEX_TOKEN: &str = "{i}";

/// Shader names making up one program.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProgramInfo {
    pub vertex: String,
    pub fragment: String,
    pub geometry: Option<String>,
}

#[derive(Debug, Clone)]
pub struct ShaderRegistry {
    includes: FxHashMap<String, String>,
    shaders: FxHashMap<String, String>,
    programs: FxHashMap<String, ProgramInfo>,
    index_token: String,
}

impl Default for ShaderRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl ShaderRegistry {
    /// Empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self {
            includes: FxHashMap::default(),
            shaders: FxHashMap::default(),
            programs: FxHashMap::default(),
            index_token: DEFAULT_INDEX_TOKEN.to_string(),
        }
    }

    /// Registry preloaded with the embedded chunks, shaders and programs.
    pub fn with_builtins() -> Result<Self> {
        let mut registry = Self::new();

        for path in BuiltinShaders::iter() {
            let Some(file) = BuiltinShaders::get(&path) else {
                continue;
            };
            let Ok(source) = std::str::from_utf8(file.data.as_ref()) else {
                warn!("Skipping non UTF-8 shader asset: {path}");
                continue;
            };

            if let Some(chunk) = path.strip_prefix(CHUNK_DIR) {
                let name = chunk.strip_suffix(".glsl").unwrap_or(chunk);
                registry.add_include(name, source);
            } else {
                registry.add_shader(&*path, source);
            }
        }

        registry.add_program("standard", "standard.vert", "standard.frag", None)?;
        registry.add_program("basic", "basic.vert", "basic.frag", None)?;
        registry.add_program("panel", "panel.vert", "panel.frag", None)?;
        Ok(registry)
    }

    /// Placeholder replaced by the repetition index in quantity includes.
    ///
    /// # Panics
    ///
    /// Panics if `token` is empty.
    pub fn set_index_token(&mut self, token: impl Into<String>) {
        let token = token.into();
        assert!(!token.is_empty(), "index token must not be empty");
        self.index_token = token;
    }

    #[must_use]
    pub fn index_token(&self) -> &str {
        &self.index_token
    }

    // ====注册====

    /// Registers (or replaces) an include chunk.
    pub fn add_include(&mut self, name: impl Into<String>, source: impl Into<String>) {
        self.includes.insert(name.into(), source.into());
    }

    /// Registers (or replaces) a shader body.
    pub fn add_shader(&mut self, name: impl Into<String>, source: impl Into<String>) {
        self.shaders.insert(name.into(), source.into());
    }

    /// Defines a program from already registered shaders.
    pub fn add_program(
        &mut self,
        name: impl Into<String>,
        vertex: &str,
        fragment: &str,
        geometry: Option<&str>,
    ) -> Result<()> {
        for shader in std::iter::once(vertex).chain(Some(fragment)).chain(geometry) {
            if !self.shaders.contains_key(shader) {
                return Err(KestrelError::ShaderNotFound(shader.to_string()));
            }
        }

        self.programs.insert(
            name.into(),
            ProgramInfo {
                vertex: vertex.to_string(),
                fragment: fragment.to_string(),
                geometry: geometry.map(str::to_string),
            },
        );
        Ok(())
    }

    // ====查询====

    #[must_use]
    pub fn include(&self, name: &str) -> Option<&str> {
        self.includes.get(name).map(String::as_str)
    }

    #[must_use]
    pub fn shader(&self, name: &str) -> Option<&str> {
        self.shaders.get(name).map(String::as_str)
    }

    pub fn program(&self, name: &str) -> Result<&ProgramInfo> {
        self.programs
            .get(name)
            .ok_or_else(|| KestrelError::ProgramNotFound(name.to_string()))
    }

    #[must_use]
    pub fn has_program(&self, name: &str) -> bool {
        self.programs.contains_key(name)
    }

    // ====生成====

    /// Expands `#include` directives and prepends the version and defines.
    pub fn preprocess(&self, source: &str, version: &str, defines: &ShaderDefines) -> Result<String> {
        Preprocessor::new(&self.includes, &self.index_token).run(source, version, defines)
    }

    /// Generates every stage of the program named by `specs`, specialised for
    /// its counts.
    pub fn generate(&self, specs: &ShaderSpecs) -> Result<ProgramSource> {
        let info = self.program(&specs.name)?;
        let defines = specs.defines();

        let stage = |name: &str| -> Result<String> {
            let source = self
                .shader(name)
                .ok_or_else(|| KestrelError::ShaderNotFound(name.to_string()))?;
            self.preprocess(source, &specs.version, &defines)
        };

        Ok(ProgramSource {
            name: specs.name.clone(),
            vertex: stage(&info.vertex)?,
            fragment: stage(&info.fragment)?,
            geometry: info.geometry.as_deref().map(stage).transpose()?,
        })
    }
}
