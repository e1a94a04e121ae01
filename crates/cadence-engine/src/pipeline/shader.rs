use std::borrow::Cow;
use std::path::{Path, PathBuf};

use thiserror::Error;

/// First word of every SPIR-V module.
pub const SPIRV_MAGIC: u32 = 0x0723_0203;

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum ShaderStage {
    Vertex,
    Fragment,
}

/// Stage code as loaded from disk.
#[derive(Debug, Clone, PartialEq)]
pub enum ShaderCode {
    Wgsl(String),
    SpirV(Vec<u32>),
}

#[derive(Debug, Error)]
pub enum ShaderError {
    #[error("failed to read {stage:?} shader {path}")]
    Read {
        stage: ShaderStage,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{stage:?} shader {path} is empty")]
    Empty { stage: ShaderStage, path: PathBuf },

    #[error("{stage:?} shader {path} has no .wgsl or .spv extension")]
    UnknownFormat { stage: ShaderStage, path: PathBuf },

    #[error("{stage:?} shader {path} is {len} bytes, not a whole number of SPIR-V words")]
    Misaligned {
        stage: ShaderStage,
        path: PathBuf,
        len: usize,
    },

    #[error("{stage:?} shader {path} starts with {found:#010x}, not the SPIR-V magic number")]
    BadMagic {
        stage: ShaderStage,
        path: PathBuf,
        found: u32,
    },

    #[error("{stage:?} shader {path} is not valid UTF-8")]
    NotUtf8 {
        stage: ShaderStage,
        path: PathBuf,
        #[source]
        source: std::string::FromUtf8Error,
    },
}

/// One shader stage loaded from a file.
#[derive(Debug, Clone, PartialEq)]
pub struct ShaderStageFile {
    pub stage: ShaderStage,
    pub path: PathBuf,
    pub code: ShaderCode,
}

impl ShaderStageFile {
    /// Reads and checks a stage file. The format follows the extension.
    pub fn load(path: impl AsRef<Path>, stage: ShaderStage) -> Result<Self, ShaderError> {
        let path = path.as_ref();
        let bytes = std::fs::read(path).map_err(|source| ShaderError::Read {
            stage,
            path: path.to_path_buf(),
            source,
        })?;

        Self::from_bytes(path, stage, bytes)
    }

    /// Checks stage code that was already read from `path`.
    pub fn from_bytes(
        path: impl AsRef<Path>,
        stage: ShaderStage,
        bytes: Vec<u8>,
    ) -> Result<Self, ShaderError> {
        let path = path.as_ref().to_path_buf();

        if bytes.is_empty() {
            return Err(ShaderError::Empty { stage, path });
        }

        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase);

        let code = match extension.as_deref() {
            Some("spv") => ShaderCode::SpirV(spirv_words(&path, stage, &bytes)?),
            Some("wgsl") => {
                let text = String::from_utf8(bytes).map_err(|source| ShaderError::NotUtf8 {
                    stage,
                    path: path.clone(),
                    source,
                })?;
                if text.trim().is_empty() {
                    return Err(ShaderError::Empty { stage, path });
                }
                ShaderCode::Wgsl(text)
            }
            _ => return Err(ShaderError::UnknownFormat { stage, path }),
        };

        Ok(Self { stage, path, code })
    }

    pub fn create_module(&self, device: &wgpu::Device) -> wgpu::ShaderModule {
        let label = format!("cadence {:?} shader", self.stage);
        let source = match &self.code {
            ShaderCode::Wgsl(text) => wgpu::ShaderSource::Wgsl(Cow::Borrowed(text.as_str())),
            ShaderCode::SpirV(words) => wgpu::ShaderSource::SpirV(Cow::Borrowed(words.as_slice())),
        };

        device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some(&label),
            source,
        })
    }
}

fn spirv_words(path: &Path, stage: ShaderStage, bytes: &[u8]) -> Result<Vec<u32>, ShaderError> {
    if bytes.len() % 4 != 0 {
        return Err(ShaderError::Misaligned {
            stage,
            path: path.to_path_buf(),
            len: bytes.len(),
        });
    }

    let words: Vec<u32> = bytes
        .chunks_exact(4)
        .map(|w| u32::from_le_bytes([w[0], w[1], w[2], w[3]]))
        .collect();

    match words.first() {
        Some(&SPIRV_MAGIC) => Ok(words),
        found => Err(ShaderError::BadMagic {
            stage,
            path: path.to_path_buf(),
            found: found.copied().unwrap_or(0),
        }),
    }
}

/// Vertex and fragment stages of the sample pipeline.
#[derive(Debug, Clone, PartialEq)]
pub struct ShaderPair {
    pub vertex: ShaderStageFile,
    pub fragment: ShaderStageFile,
}

impl ShaderPair {
    pub fn load(vertex: impl AsRef<Path>, fragment: impl AsRef<Path>) -> Result<Self, ShaderError> {
        let vertex = ShaderStageFile::load(vertex, ShaderStage::Vertex)?;
        let fragment = ShaderStageFile::load(fragment, ShaderStage::Fragment)?;

        log::info!(
            "loaded shaders {} and {}",
            vertex.path.display(),
            fragment.path.display()
        );

        Ok(Self { vertex, fragment })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn spirv_bytes(words: &[u32]) -> Vec<u8> {
        words.iter().flat_map(|w| w.to_le_bytes()).collect()
    }

    #[test]
    fn wgsl_text_is_accepted() {
        let file = ShaderStageFile::from_bytes(
            "a.wgsl",
            ShaderStage::Vertex,
            b"@vertex fn main() {}".to_vec(),
        )
        .unwrap();
        assert!(matches!(file.code, ShaderCode::Wgsl(ref s) if s.contains("@vertex")));
    }

    #[test]
    fn spirv_words_are_little_endian() {
        let bytes = spirv_bytes(&[SPIRV_MAGIC, 0x0001_0000, 7]);
        let file = ShaderStageFile::from_bytes("a.SPV", ShaderStage::Fragment, bytes).unwrap();
        assert_eq!(file.code, ShaderCode::SpirV(vec![SPIRV_MAGIC, 0x0001_0000, 7]));
    }

    #[test]
    fn empty_file_is_rejected() {
        let err = ShaderStageFile::from_bytes("a.spv", ShaderStage::Vertex, vec![]).unwrap_err();
        assert!(matches!(err, ShaderError::Empty { .. }));

        let err =
            ShaderStageFile::from_bytes("a.wgsl", ShaderStage::Vertex, b"  \n".to_vec()).unwrap_err();
        assert!(matches!(err, ShaderError::Empty { .. }));
    }

    #[test]
    fn truncated_spirv_is_rejected() {
        let mut bytes = spirv_bytes(&[SPIRV_MAGIC, 1]);
        bytes.pop();
        let err = ShaderStageFile::from_bytes("a.spv", ShaderStage::Vertex, bytes).unwrap_err();
        assert!(matches!(err, ShaderError::Misaligned { len: 7, .. }));
    }

    #[test]
    fn wrong_magic_is_rejected() {
        let bytes = spirv_bytes(&[0xdead_beef]);
        let err = ShaderStageFile::from_bytes("a.spv", ShaderStage::Vertex, bytes).unwrap_err();
        assert!(matches!(err, ShaderError::BadMagic { found: 0xdead_beef, .. }));
    }

    #[test]
    fn unknown_extension_is_rejected() {
        let err =
            ShaderStageFile::from_bytes("a.cso", ShaderStage::Vertex, vec![1, 2, 3, 4]).unwrap_err();
        assert!(matches!(err, ShaderError::UnknownFormat { .. }));
    }

    #[test]
    fn invalid_utf8_wgsl_is_rejected() {
        let err =
            ShaderStageFile::from_bytes("a.wgsl", ShaderStage::Fragment, vec![0xff, 0xfe]).unwrap_err();
        assert!(matches!(err, ShaderError::NotUtf8 { .. }));
    }

    #[test]
    fn missing_file_reports_stage_and_path() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("missing.wgsl");

        let err = ShaderStageFile::load(&missing, ShaderStage::Fragment).unwrap_err();
        match err {
            ShaderError::Read { stage, path, .. } => {
                assert_eq!(stage, ShaderStage::Fragment);
                assert_eq!(path, missing);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn pair_loads_both_stages_from_disk() {
        let dir = tempfile::tempdir().unwrap();
        let vs = dir.path().join("vs.wgsl");
        let fs = dir.path().join("fs.spv");

        std::fs::File::create(&vs)
            .unwrap()
            .write_all(b"@vertex fn vs_main() -> @builtin(position) vec4<f32> { return vec4<f32>(); }")
            .unwrap();
        std::fs::write(&fs, spirv_bytes(&[SPIRV_MAGIC, 0x0001_0000])).unwrap();

        let pair = ShaderPair::load(&vs, &fs).unwrap();
        assert_eq!(pair.vertex.stage, ShaderStage::Vertex);
        assert!(matches!(pair.vertex.code, ShaderCode::Wgsl(_)));
        assert_eq!(pair.fragment.stage, ShaderStage::Fragment);
        assert!(matches!(pair.fragment.code, ShaderCode::SpirV(_)));
    }

    #[test]
    fn shipped_shaders_load() {
        let root = Path::new(env!("CARGO_MANIFEST_DIR")).join("../cadence-triangle/shaders");
        let pair = ShaderPair::load(root.join("triangle_vs.wgsl"), root.join("triangle_fs.wgsl"))
            .unwrap();
        assert!(matches!(pair.vertex.code, ShaderCode::Wgsl(ref s) if s.contains("@vertex")));
        assert!(matches!(pair.fragment.code, ShaderCode::Wgsl(ref s) if s.contains("@fragment")));
    }
}
