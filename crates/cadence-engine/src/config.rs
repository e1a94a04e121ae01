//! Sample configuration.
//!
//! These values are fixed for the lifetime of the process. The binary builds a
//! `SampleConfig` once at startup and validates it before any GPU object is
//! created.

use std::path::{Path, PathBuf};

use thiserror::Error;

/// Environment variable naming a directory that holds both shader stages.
pub const SHADER_DIR_ENV: &str = "CADENCE_SHADER_DIR";

/// Largest triangle count whose nested outlines still have a non-negative size.
pub const MAX_TRIANGLES: u32 = 8;

/// Fixed parameters of the triangle sample.
#[derive(Debug, Clone, PartialEq)]
pub struct SampleConfig {
    /// Window title, also used as the suffix of the FPS title.
    pub title: String,

    /// Client area size in physical pixels.
    pub width: u32,
    pub height: u32,

    /// Number of rotating display images.
    pub swap_buffer_count: u32,

    /// Number of nested triangle outlines drawn per frame.
    pub triangle_count: u32,

    /// Vertex stage file (`.wgsl` or `.spv`).
    pub vertex_shader: PathBuf,

    /// Fragment stage file (`.wgsl` or `.spv`).
    pub fragment_shader: PathBuf,

    /// Linear RGBA clear color.
    pub clear_color: [f64; 4],

    pub clear_depth: f32,
}

impl Default for SampleConfig {
    fn default() -> Self {
        Self {
            title: "Triangle".to_string(),
            width: 1920,
            height: 1080,
            swap_buffer_count: 4,
            triangle_count: 8,
            vertex_shader: PathBuf::from("shaders/triangle_vs.wgsl"),
            fragment_shader: PathBuf::from("shaders/triangle_fs.wgsl"),
            clear_color: [0.0, 0.2, 0.4, 1.0],
            clear_depth: 1.0,
        }
    }
}

#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("resolution {width}x{height} has a zero dimension")]
    ZeroResolution { width: u32, height: u32 },

    #[error("{count} display images requested, at least 2 are required")]
    TooFewImages { count: u32 },

    #[error("triangle count {count} is outside 1..={max}")]
    TriangleCount { count: u32, max: u32 },

    #[error("clear depth {0} is outside 0..=1")]
    ClearDepth(f32),
}

impl SampleConfig {
    /// Looks up both stage files by name in `dir` instead of the default
    /// `shaders/` directory.
    pub fn with_shader_dir(mut self, dir: impl AsRef<Path>) -> Self {
        let dir = dir.as_ref();
        for path in [&mut self.vertex_shader, &mut self.fragment_shader] {
            if let Some(name) = path.file_name() {
                let joined = dir.join(name);
                *path = joined;
            }
        }
        self
    }

    /// Defaults with shader paths relative to the working directory, or to
    /// the directory named by [`SHADER_DIR_ENV`] when it is set.
    pub fn from_env() -> Self {
        match std::env::var_os(SHADER_DIR_ENV) {
            Some(dir) if !dir.is_empty() => Self::default().with_shader_dir(dir),
            _ => Self::default(),
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.width == 0 || self.height == 0 {
            return Err(ConfigError::ZeroResolution {
                width: self.width,
                height: self.height,
            });
        }

        if self.swap_buffer_count < 2 {
            return Err(ConfigError::TooFewImages {
                count: self.swap_buffer_count,
            });
        }

        if self.triangle_count == 0 || self.triangle_count > MAX_TRIANGLES {
            return Err(ConfigError::TriangleCount {
                count: self.triangle_count,
                max: MAX_TRIANGLES,
            });
        }

        if !(0.0..=1.0).contains(&self.clear_depth) {
            return Err(ConfigError::ClearDepth(self.clear_depth));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        assert_eq!(SampleConfig::default().validate(), Ok(()));
    }

    #[test]
    fn zero_resolution_is_rejected() {
        let config = SampleConfig {
            height: 0,
            ..Default::default()
        };
        assert_eq!(
            config.validate(),
            Err(ConfigError::ZeroResolution { width: 1920, height: 0 })
        );
    }

    #[test]
    fn single_display_image_is_rejected() {
        let config = SampleConfig {
            swap_buffer_count: 1,
            ..Default::default()
        };
        assert_eq!(config.validate(), Err(ConfigError::TooFewImages { count: 1 }));
    }

    #[test]
    fn triangle_count_bounds() {
        for count in [0, MAX_TRIANGLES + 1] {
            let config = SampleConfig {
                triangle_count: count,
                ..Default::default()
            };
            assert_eq!(
                config.validate(),
                Err(ConfigError::TriangleCount { count, max: MAX_TRIANGLES })
            );
        }
    }

    #[test]
    fn shaders_default_to_the_working_directory() {
        let config = SampleConfig::default();
        assert!(config.vertex_shader.is_relative());
        assert_eq!(config.vertex_shader, Path::new("shaders/triangle_vs.wgsl"));
        assert_eq!(config.fragment_shader, Path::new("shaders/triangle_fs.wgsl"));
    }

    #[test]
    fn shader_dir_keeps_the_stage_file_names() {
        let config = SampleConfig::default().with_shader_dir("/opt/cadence/shaders");
        assert_eq!(
            config.vertex_shader,
            Path::new("/opt/cadence/shaders/triangle_vs.wgsl")
        );
        assert_eq!(
            config.fragment_shader,
            Path::new("/opt/cadence/shaders/triangle_fs.wgsl")
        );
        assert_eq!(config.validate(), Ok(()));
    }

    #[test]
    fn clear_depth_out_of_range_is_rejected() {
        let config = SampleConfig {
            clear_depth: 1.5,
            ..Default::default()
        };
        assert_eq!(config.validate(), Err(ConfigError::ClearDepth(1.5)));
    }
}
