use thiserror::Error;

use crate::config::SampleConfig;

use super::geometry::VERTICES_PER_TRIANGLE;

/// Usage state of the display image targeted by a frame.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum ImageState {
    /// Owned by the display engine.
    Present,
    /// Writable as a color attachment.
    RenderTarget,
}

/// One command in a frame recipe.
#[derive(Debug, Copy, Clone, PartialEq)]
pub enum RecordedStep {
    SetViewport { width: f32, height: f32 },
    SetScissor { width: u32, height: u32 },
    Transition { from: ImageState, to: ImageState },
    ClearColor([f64; 4]),
    ClearDepth(f32),
    BindPipeline,
    BindVertexBuffer,
    Draw { first_vertex: u32, vertex_count: u32 },
}

#[derive(Debug, Error, PartialEq)]
pub enum RecipeError {
    #[error("step {step}: transition from {found:?}, but the image is {expected:?}")]
    StateMismatch {
        step: usize,
        expected: ImageState,
        found: ImageState,
    },

    #[error("step {step}: {what} outside the render target state")]
    OutsideRenderTarget { step: usize, what: &'static str },

    #[error("step {step}: clear after drawing started")]
    ClearAfterDraw { step: usize },

    #[error("step {step}: draw before a pipeline and vertex buffer are bound")]
    Unbound { step: usize },

    #[error("recipe ends with the image still a render target")]
    UnpairedTransition,

    #[error("submission context is not open for recording")]
    ContextNotOpen,
}

/// Fixed sequence of commands recorded every frame.
#[derive(Debug, Clone, PartialEq)]
pub struct FrameRecipe {
    steps: Vec<RecordedStep>,
}

impl FrameRecipe {
    pub fn new(steps: Vec<RecordedStep>) -> Self {
        Self { steps }
    }

    /// The triangle sample's frame: clear, then one line-strip draw per
    /// nested outline, bracketed by the present/render-target transitions.
    pub fn triangles(config: &SampleConfig) -> Self {
        use ImageState::{Present, RenderTarget};

        let mut steps = vec![
            RecordedStep::SetViewport {
                width: config.width as f32,
                height: config.height as f32,
            },
            RecordedStep::SetScissor {
                width: config.width,
                height: config.height,
            },
            RecordedStep::Transition {
                from: Present,
                to: RenderTarget,
            },
            RecordedStep::ClearColor(config.clear_color),
            RecordedStep::ClearDepth(config.clear_depth),
            RecordedStep::BindPipeline,
            RecordedStep::BindVertexBuffer,
        ];

        steps.extend((0..config.triangle_count).map(|i| RecordedStep::Draw {
            first_vertex: i * VERTICES_PER_TRIANGLE,
            vertex_count: VERTICES_PER_TRIANGLE,
        }));

        steps.push(RecordedStep::Transition {
            from: RenderTarget,
            to: Present,
        });

        Self { steps }
    }

    pub fn steps(&self) -> &[RecordedStep] {
        &self.steps
    }

    pub fn draw_count(&self) -> usize {
        self.steps
            .iter()
            .filter(|s| matches!(s, RecordedStep::Draw { .. }))
            .count()
    }

    /// Checks that the recipe leaves the image presentable.
    ///
    /// Transitions must chain from the current state, clears and draws must
    /// happen while the image is a render target, clears must precede the
    /// first bind or draw of their render target section, and every
    /// transition to render target must be matched by one back to present.
    pub fn validate(&self) -> Result<(), RecipeError> {
        let mut state = ImageState::Present;
        let mut drawing = false;
        let mut pipeline_bound = false;
        let mut vertices_bound = false;

        for (step, cmd) in self.steps.iter().enumerate() {
            let in_target = state == ImageState::RenderTarget;
            let outside = |what| RecipeError::OutsideRenderTarget { step, what };

            match *cmd {
                RecordedStep::SetViewport { .. } | RecordedStep::SetScissor { .. } => {}

                RecordedStep::Transition { from, to } => {
                    if from != state {
                        return Err(RecipeError::StateMismatch {
                            step,
                            expected: state,
                            found: from,
                        });
                    }
                    state = to;
                    drawing = false;
                    pipeline_bound = false;
                    vertices_bound = false;
                }

                RecordedStep::ClearColor(_) | RecordedStep::ClearDepth(_) => {
                    if !in_target {
                        return Err(outside("clear"));
                    }
                    if drawing {
                        return Err(RecipeError::ClearAfterDraw { step });
                    }
                }

                RecordedStep::BindPipeline => {
                    if !in_target {
                        return Err(outside("pipeline bind"));
                    }
                    drawing = true;
                    pipeline_bound = true;
                }

                RecordedStep::BindVertexBuffer => {
                    if !in_target {
                        return Err(outside("vertex buffer bind"));
                    }
                    drawing = true;
                    vertices_bound = true;
                }

                RecordedStep::Draw { .. } => {
                    if !in_target {
                        return Err(outside("draw"));
                    }
                    if !(pipeline_bound && vertices_bound) {
                        return Err(RecipeError::Unbound { step });
                    }
                    drawing = true;
                }
            }
        }

        if state != ImageState::Present {
            return Err(RecipeError::UnpairedTransition);
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ImageState::{Present, RenderTarget};

    fn to_target() -> RecordedStep {
        RecordedStep::Transition {
            from: Present,
            to: RenderTarget,
        }
    }

    fn to_present() -> RecordedStep {
        RecordedStep::Transition {
            from: RenderTarget,
            to: Present,
        }
    }

    fn draw(first_vertex: u32) -> RecordedStep {
        RecordedStep::Draw {
            first_vertex,
            vertex_count: 4,
        }
    }

    #[test]
    fn triangle_recipe_is_valid() {
        let recipe = FrameRecipe::triangles(&SampleConfig::default());
        assert_eq!(recipe.validate(), Ok(()));
    }

    #[test]
    fn triangle_recipe_order() {
        let recipe = FrameRecipe::triangles(&SampleConfig::default());
        let steps = recipe.steps();

        assert!(matches!(steps[0], RecordedStep::SetViewport { .. }));
        assert!(matches!(steps[1], RecordedStep::SetScissor { .. }));
        assert_eq!(steps[2], to_target());
        assert_eq!(steps[3], RecordedStep::ClearColor([0.0, 0.2, 0.4, 1.0]));
        assert_eq!(steps[4], RecordedStep::ClearDepth(1.0));
        assert_eq!(steps[5], RecordedStep::BindPipeline);
        assert_eq!(steps[6], RecordedStep::BindVertexBuffer);
        assert_eq!(steps.last(), Some(&to_present()));
    }

    #[test]
    fn one_draw_per_triangle_at_stride_four() {
        let config = SampleConfig {
            triangle_count: 5,
            ..Default::default()
        };
        let recipe = FrameRecipe::triangles(&config);
        assert_eq!(recipe.draw_count(), 5);

        let firsts: Vec<u32> = recipe
            .steps()
            .iter()
            .filter_map(|s| match s {
                RecordedStep::Draw { first_vertex, .. } => Some(*first_vertex),
                _ => None,
            })
            .collect();
        assert_eq!(firsts, vec![0, 4, 8, 12, 16]);
    }

    #[test]
    fn missing_return_to_present_is_rejected() {
        let recipe = FrameRecipe::new(vec![
            to_target(),
            RecordedStep::BindPipeline,
            RecordedStep::BindVertexBuffer,
            draw(0),
        ]);
        assert_eq!(recipe.validate(), Err(RecipeError::UnpairedTransition));
    }

    #[test]
    fn transition_from_wrong_state_is_rejected() {
        let recipe = FrameRecipe::new(vec![to_present()]);
        assert_eq!(
            recipe.validate(),
            Err(RecipeError::StateMismatch {
                step: 0,
                expected: Present,
                found: RenderTarget,
            })
        );
    }

    #[test]
    fn draw_while_presentable_is_rejected() {
        let recipe = FrameRecipe::new(vec![RecordedStep::BindPipeline]);
        assert_eq!(
            recipe.validate(),
            Err(RecipeError::OutsideRenderTarget {
                step: 0,
                what: "pipeline bind",
            })
        );
    }

    #[test]
    fn clear_after_draw_is_rejected() {
        let recipe = FrameRecipe::new(vec![
            to_target(),
            RecordedStep::BindPipeline,
            RecordedStep::ClearColor([0.0; 4]),
            to_present(),
        ]);
        assert_eq!(
            recipe.validate(),
            Err(RecipeError::ClearAfterDraw { step: 2 })
        );
    }

    #[test]
    fn draw_without_bindings_is_rejected() {
        let recipe = FrameRecipe::new(vec![to_target(), draw(0), to_present()]);
        assert_eq!(recipe.validate(), Err(RecipeError::Unbound { step: 1 }));
    }

    #[test]
    fn clear_only_frame_is_valid() {
        let recipe = FrameRecipe::new(vec![
            to_target(),
            RecordedStep::ClearColor([1.0, 0.0, 0.0, 1.0]),
            to_present(),
        ]);
        assert_eq!(recipe.validate(), Ok(()));
        assert_eq!(recipe.draw_count(), 0);
    }
}
