//! Error Types
//!
//! This module defines the error types used throughout the engine.
//!
//! # Overview
//!
//! The main error type [`KestrelError`] covers the recoverable failure modes:
//! - Shader configuration errors (missing includes, shaders, programs)
//! - GPU compilation and link failures reported by the backend
//! - Settings loading errors
//!
//! Structural misuse of the scene graph (adding a node to itself, creating a
//! cycle, passing a stale handle to a hierarchy operation) is a programmer
//! error and panics instead.
//!
//! # Usage
//!
//! ```rust,ignore
//! use kestrel::errors::{KestrelError, Result};
//!
//! fn build() -> Result<()> {
//!     registry.add_program("custom", "custom_vertex", "custom_fragment", None)?;
//!     Ok(())
//! }
//! ```

use thiserror::Error;

use crate::renderer::backend::ShaderStage;

/// The main error type for the Kestrel engine.
#[derive(Error, Debug)]
pub enum KestrelError {
    // ========================================================================
    // Shader Configuration Errors
    // ========================================================================
    /// An `#include <name>` directive referenced an unregistered chunk.
    #[error("Include not found: {0}")]
    IncludeNotFound(String),

    /// An include chunk includes itself, directly or through other chunks.
    #[error("Recursive include: {0}")]
    IncludeCycle(String),

    /// A program referenced a shader that was never registered.
    #[error("Shader not found: {0}")]
    ShaderNotFound(String),

    /// A material requested a program that was never registered.
    #[error("Program not found: {0}")]
    ProgramNotFound(String),

    /// The quantity variable of an `#include <name> [VAR]` directive is
    /// defined but is not a non-negative integer.
    #[error("Invalid include quantity for '{variable}': '{value}'")]
    InvalidIncludeQuantity {
        /// Name of the quantity variable
        variable: String,
        /// The offending value
        value: String,
    },

    // ========================================================================
    // GPU Errors
    // ========================================================================
    /// The backend rejected a shader stage.
    #[error("{stage:?} shader compile error: {log}")]
    ShaderCompile {
        /// Stage that failed to compile
        stage: ShaderStage,
        /// Driver info log
        log: String,
    },

    /// The backend failed to link a program.
    #[error("Program link error: {0}")]
    ProgramLink(String),

    /// Any other backend failure (resource creation, context loss).
    #[error("Backend error: {0}")]
    Backend(String),

    // ========================================================================
    // Configuration Errors
    // ========================================================================
    /// Settings file could not be parsed.
    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),

    /// Settings file could not be read.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// A setting holds a value the renderer cannot work with.
    #[error("Invalid setting '{field}': {reason}")]
    InvalidSetting {
        /// Name of the setting
        field: &'static str,
        /// Why the value was rejected
        reason: &'static str,
    },
}

/// Alias for `Result<T, KestrelError>`.
pub type Result<T> = std::result::Result<T, KestrelError>;
