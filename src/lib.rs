#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::cast_precision_loss)]
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::too_many_arguments)]

pub mod errors;
pub mod overlay;
pub mod renderer;
pub mod resources;
pub mod scene;

pub use errors::{KestrelError, Result};
pub use overlay::{Overlay, Panel, PanelHandle, Rect};
pub use renderer::backend::{GraphicsBackend, RecordingBackend};
pub use renderer::pipeline::{ProgramCache, ShaderRegistry, ShaderSpecs};
pub use renderer::{FrameStats, Renderer, RendererSettings};
pub use resources::{AudioEmitter, BoundingBox, Geometry, Material, Mesh, ShaderDefines, UseLights};
pub use scene::{Camera, CameraView, Light, Node, NodeEvent, NodeEventKind, NodeHandle, Scene};

/// Common imports for applications.
pub mod prelude {
    pub use crate::errors::{KestrelError, Result};
    pub use crate::overlay::{Overlay, PanelHandle, Rect};
    pub use crate::renderer::{FrameStats, GraphicsBackend, RecordingBackend, Renderer, RendererSettings};
    pub use crate::resources::{AudioEmitter, Geometry, Material, Mesh, UseLights};
    pub use crate::scene::{Camera, CameraView, Light, NodeHandle, Scene};
}
