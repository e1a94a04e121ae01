use super::recipe::{FrameRecipe, ImageState, RecordedStep};

/// Attachments written by a frame.
pub struct FrameTargets<'a> {
    pub color: &'a wgpu::TextureView,
    pub depth: &'a wgpu::TextureView,

    /// Size of both attachments in physical pixels.
    pub extent: (u32, u32),
}

/// Immutable GPU inputs bound by `BindPipeline` / `BindVertexBuffer`.
pub struct StaticBindings<'a> {
    pub pipeline: &'a wgpu::RenderPipeline,
    pub vertex_buffer: &'a wgpu::Buffer,
}

/// Encodes a validated recipe.
///
/// wgpu tracks resource states itself, so a transition to render target opens
/// a render pass and the matching transition back to present closes it. The
/// clears that open a render target section become the pass load operations.
/// Viewport and scissor are clamped to the attachment extent.
pub fn encode_recipe(
    encoder: &mut wgpu::CommandEncoder,
    recipe: &FrameRecipe,
    targets: &FrameTargets<'_>,
    bindings: &StaticBindings<'_>,
) {
    let steps = recipe.steps();
    let mut viewport = None;
    let mut scissor = None;

    let mut i = 0;
    while i < steps.len() {
        match steps[i] {
            RecordedStep::SetViewport { width, height } => viewport = Some((width, height)),
            RecordedStep::SetScissor { width, height } => scissor = Some((width, height)),

            RecordedStep::Transition {
                to: ImageState::RenderTarget,
                ..
            } => {
                let start = i + 1;
                let end = steps[start..]
                    .iter()
                    .position(|s| {
                        matches!(
                            s,
                            RecordedStep::Transition {
                                to: ImageState::Present,
                                ..
                            }
                        )
                    })
                    .map_or(steps.len(), |p| start + p);

                encode_pass(
                    encoder,
                    &steps[start..end],
                    targets,
                    bindings,
                    &mut viewport,
                    &mut scissor,
                );

                i = end + 1;
                continue;
            }

            // Validated recipes only clear, bind and draw inside a pass.
            _ => {}
        }

        i += 1;
    }
}

fn encode_pass(
    encoder: &mut wgpu::CommandEncoder,
    section: &[RecordedStep],
    targets: &FrameTargets<'_>,
    bindings: &StaticBindings<'_>,
    viewport: &mut Option<(f32, f32)>,
    scissor: &mut Option<(u32, u32)>,
) {
    let mut color_load = wgpu::LoadOp::Load;
    let mut depth_load = wgpu::LoadOp::Load;

    let clears = section
        .iter()
        .take_while(|s| {
            matches!(
                s,
                RecordedStep::ClearColor(_)
                    | RecordedStep::ClearDepth(_)
                    | RecordedStep::SetViewport { .. }
                    | RecordedStep::SetScissor { .. }
            )
        })
        .count();

    for step in &section[..clears] {
        match *step {
            RecordedStep::ClearColor([r, g, b, a]) => {
                color_load = wgpu::LoadOp::Clear(wgpu::Color { r, g, b, a });
            }
            RecordedStep::ClearDepth(depth) => depth_load = wgpu::LoadOp::Clear(depth),
            RecordedStep::SetViewport { width, height } => *viewport = Some((width, height)),
            RecordedStep::SetScissor { width, height } => *scissor = Some((width, height)),
            _ => {}
        }
    }

    let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
        label: Some("cadence frame pass"),
        color_attachments: &[Some(wgpu::RenderPassColorAttachment {
            view: targets.color,
            resolve_target: None,
            ops: wgpu::Operations {
                load: color_load,
                store: wgpu::StoreOp::Store,
            },
            depth_slice: None,
        })],
        depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
            view: targets.depth,
            depth_ops: Some(wgpu::Operations {
                load: depth_load,
                store: wgpu::StoreOp::Store,
            }),
            stencil_ops: None,
        }),
        timestamp_writes: None,
        occlusion_query_set: None,
        multiview_mask: None,
    });

    let (target_w, target_h) = targets.extent;

    if let Some((w, h)) = *viewport {
        pass.set_viewport(
            0.0,
            0.0,
            w.min(target_w as f32),
            h.min(target_h as f32),
            0.0,
            1.0,
        );
    }
    if let Some((w, h)) = *scissor {
        pass.set_scissor_rect(0, 0, w.min(target_w), h.min(target_h));
    }

    for step in &section[clears..] {
        match *step {
            RecordedStep::SetViewport { width, height } => {
                *viewport = Some((width, height));
                pass.set_viewport(
                    0.0,
                    0.0,
                    width.min(target_w as f32),
                    height.min(target_h as f32),
                    0.0,
                    1.0,
                );
            }
            RecordedStep::SetScissor { width, height } => {
                *scissor = Some((width, height));
                pass.set_scissor_rect(0, 0, width.min(target_w), height.min(target_h));
            }
            RecordedStep::BindPipeline => pass.set_pipeline(bindings.pipeline),
            RecordedStep::BindVertexBuffer => {
                pass.set_vertex_buffer(0, bindings.vertex_buffer.slice(..));
            }
            RecordedStep::Draw {
                first_vertex,
                vertex_count,
            } => pass.draw(first_vertex..first_vertex + vertex_count, 0..1),
            // Rejected by validation.
            RecordedStep::ClearColor(_)
            | RecordedStep::ClearDepth(_)
            | RecordedStep::Transition { .. } => {}
        }
    }
}
