use wgpu::util::DeviceExt;

use crate::config::SampleConfig;
use crate::device::WgpuContext;
use crate::pipeline::TrianglePipeline;

use super::encode::{encode_recipe, FrameTargets, StaticBindings};
use super::geometry::nested_triangles;
use super::recipe::{FrameRecipe, RecipeError};

/// Fills a submission context with the triangle frame.
///
/// Pipeline, vertex buffer and recipe are built once and never change.
pub struct TriangleRecorder {
    pipeline: TrianglePipeline,
    vertex_buffer: wgpu::Buffer,
    recipe: FrameRecipe,
}

impl TriangleRecorder {
    pub fn new(
        device: &wgpu::Device,
        pipeline: TrianglePipeline,
        config: &SampleConfig,
    ) -> Result<Self, RecipeError> {
        let recipe = FrameRecipe::triangles(config);
        recipe.validate()?;

        let vertices = nested_triangles(config.triangle_count);
        let vertex_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("cadence triangle vertices"),
            contents: bytemuck::cast_slice(&vertices),
            usage: wgpu::BufferUsages::VERTEX,
        });

        log::info!(
            "recorder ready: {} vertices, {} draws per frame",
            vertices.len(),
            recipe.draw_count()
        );

        Ok(Self {
            pipeline,
            vertex_buffer,
            recipe,
        })
    }

    pub fn recipe(&self) -> &FrameRecipe {
        &self.recipe
    }

    /// Encodes the frame into a context opened by `begin_frame`.
    pub fn record(
        &self,
        context: &mut WgpuContext,
        targets: &FrameTargets<'_>,
    ) -> Result<(), RecipeError> {
        let encoder = context.encoder_mut().ok_or(RecipeError::ContextNotOpen)?;

        let bindings = StaticBindings {
            pipeline: self.pipeline.raw(),
            vertex_buffer: &self.vertex_buffer,
        };
        encode_recipe(encoder, &self.recipe, targets, &bindings);

        Ok(())
    }
}
