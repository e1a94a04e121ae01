//! Command recording.
//!
//! A frame is described once as a [`FrameRecipe`]: a fixed list of steps that
//! is validated at startup and replayed into a fresh submission context every
//! frame. The recipe is pure data; [`TriangleRecorder`] owns the immutable GPU
//! inputs and encodes the recipe with wgpu.

mod encode;
mod geometry;
mod recipe;
mod recorder;

pub use encode::{encode_recipe, FrameTargets, StaticBindings};
pub use geometry::{nested_triangles, Vertex, OUTER_SIZE, SIZE_STEP, VERTICES_PER_TRIANGLE};
pub use recipe::{FrameRecipe, ImageState, RecipeError, RecordedStep};
pub use recorder::TriangleRecorder;
