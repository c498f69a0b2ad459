//! Renderer Settings
//!
//! Renderer-wide configuration, loadable from JSON.
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use kestrel::renderer::{Renderer, RendererSettings};
//!
//! // Defaults: GLSL 330 core, two buffered frames, black clear color
//! let renderer = Renderer::new(RendererSettings::default());
//!
//! // Partial JSON, missing fields fall back to their defaults
//! let settings = RendererSettings::from_json_str(r#"{ "buffered_frames": 3 }"#)?;
//! ```

use std::path::Path;

use glam::Vec4;
use serde::{Deserialize, Serialize};

use crate::errors::{KestrelError, Result};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RendererSettings {
    /// Emitted as `#version <glsl_version>` at the top of every generated
    /// shader stage.
    pub glsl_version: String,

    /// Number of frames the overlay keeps being fully redrawn after a panel
    /// change.
    ///
    /// Swap chains hold more than one back buffer, so a single full redraw
    /// leaves stale overlay content in the others. Match this to the
    /// swap chain length (2 for double buffering, 3 for triple).
    pub buffered_frames: u32,

    /// RGBA color used when clearing the 3D viewport and the overlay.
    pub clear_color: [f32; 4],

    /// Placeholder replaced by the repetition index in quantity includes
    /// (`#include <chunk> [COUNT]`). Must not be empty.
    pub index_token: String,
}

impl Default for RendererSettings {
    fn default() -> Self {
        Self {
            glsl_version: "330 core".to_string(),
            buffered_frames: 2,
            clear_color: [0.0, 0.0, 0.0, 1.0],
            index_token: "{i}".to_string(),
        }
    }
}

impl RendererSettings {
    pub fn from_json_str(json: &str) -> Result<Self> {
        let settings: Self = serde_json::from_str(json)?;
        settings.validate()?;
        Ok(settings)
    }

    /// Reads settings from a JSON file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json_str(&text)
    }

    /// Rejects values that would corrupt generated shaders.
    pub fn validate(&self) -> Result<()> {
        if self.index_token.is_empty() {
            return Err(KestrelError::InvalidSetting {
                field: "index_token",
                reason: "must not be empty",
            });
        }
        Ok(())
    }

    #[inline]
    #[must_use]
    pub fn clear_color(&self) -> Vec4 {
        Vec4::from_array(self.clear_color)
    }
}
