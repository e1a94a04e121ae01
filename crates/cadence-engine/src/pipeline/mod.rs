//! Fixed render pipeline.
//!
//! Shader stages come from two files loaded once at startup. The pipeline
//! built from them is immutable for the rest of the process.

mod shader;
mod triangle;

pub use shader::{ShaderCode, ShaderError, ShaderPair, ShaderStage, ShaderStageFile, SPIRV_MAGIC};
pub use triangle::TrianglePipeline;
