//! 着色器管线模块
//!
//! 管理着色器源码与程序缓存：
//! - ShaderSpecs: 程序变体的结构化键（光源数量、纹理数量、unique 标志）
//! - ShaderRegistry: include 片段、着色器、程序定义的注册表
//! - preprocess: `#include <name> [VAR]` 展开
//! - ProgramCache: 按 ShaderSpecs 缓存已编译程序

pub mod cache;
pub mod preprocess;
pub mod registry;
pub mod specs;

pub use cache::{ProgramCache, ProgramCacheEntry};
pub use preprocess::Preprocessor;
pub use registry::{ProgramInfo, ShaderRegistry};
pub use specs::ShaderSpecs;
