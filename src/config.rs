use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::shaders::{PushConstantPolicy, ShaderStage};
use crate::{Error, Result};

const DEFAULT_ENTRY_POINT: &str = "main";
const DEFAULT_SPV_PATH: &str = "output.spv";
const DEFAULT_DESCRIPTOR_PATH: &str = "output.sd";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceLanguage {
    OpenGl,
    Vulkan,
    Hlsl,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ShaderSource {
    pub path: PathBuf,
    #[serde(default = "default_entry_point")]
    pub entry: String,
}

fn default_entry_point() -> String {
    DEFAULT_ENTRY_POINT.to_string()
}

/// the config file as written on disk
#[derive(Debug, Deserialize)]
struct ConfigFile {
    #[serde(default)]
    sources: BTreeMap<String, ShaderSource>,
    #[serde(default)]
    vulkan_define: bool,
    #[serde(default)]
    hlsl: bool,
    spv: Option<String>,
    descriptor: Option<PathBuf>,
    #[serde(default)]
    push_constant_stages: PushConstantPolicy,
}

#[derive(Debug, Clone)]
pub struct Config {
    /// the shader source for each stage, in pipeline order
    pub sources: BTreeMap<ShaderStage, ShaderSource>,
    pub language: SourceLanguage,
    /// the prefix of each stage's spirv artifact
    pub spv_path: String,
    /// where the descriptor report is written
    pub descriptor_path: PathBuf,
    pub push_constant_policy: PushConstantPolicy,
}

impl Config {
    pub fn from_path(path: &Path) -> Result<Self> {
        let json = std::fs::read_to_string(path).map_err(|err| Error::Config {
            path: path.to_path_buf(),
            reason: err.to_string(),
        })?;
        Self::from_json(&json, path)
    }

    /// parses config json, using `path` for error messages
    pub fn from_json(json: &str, path: &Path) -> Result<Self> {
        let file: ConfigFile = serde_json::from_str(json).map_err(|err| Error::Config {
            path: path.to_path_buf(),
            reason: err.to_string(),
        })?;

        if file.sources.is_empty() {
            return Err(Error::Config {
                path: path.to_path_buf(),
                reason: "at least one shader source is required".to_string(),
            });
        }

        let sources = file
            .sources
            .into_iter()
            .map(|(key, source)| -> Result<_> { Ok((key.parse::<ShaderStage>()?, source)) })
            .collect::<Result<BTreeMap<_, _>>>()?;

        let language = if file.hlsl {
            SourceLanguage::Hlsl
        } else if file.vulkan_define {
            SourceLanguage::Vulkan
        } else {
            SourceLanguage::OpenGl
        };

        Ok(Self {
            sources,
            language,
            spv_path: file.spv.unwrap_or_else(|| DEFAULT_SPV_PATH.to_string()),
            descriptor_path: file
                .descriptor
                .unwrap_or_else(|| PathBuf::from(DEFAULT_DESCRIPTOR_PATH)),
            push_constant_policy: file.push_constant_stages,
        })
    }

    pub fn stages(&self) -> Vec<ShaderStage> {
        self.sources.keys().copied().collect()
    }

    /// vulkan and hlsl sources report attribute types as vulkan formats
    pub fn remaps_attribute_types(&self) -> bool {
        matches!(self.language, SourceLanguage::Vulkan | SourceLanguage::Hlsl)
    }

    pub fn shader_bin_filename(&self, stage: ShaderStage) -> String {
        format!("{}.{}.sr", self.spv_path, stage.artifact_suffix())
    }
}
