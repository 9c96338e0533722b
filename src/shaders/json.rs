use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::ShaderStage;
use super::descriptor_pool::DescriptorPoolSizing;
use crate::error::Result;

mod resources;
pub use resources::*;

/// the descriptor report written next to the compiled spirv
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct ShaderDescriptorJson {
    pub variables: VariablesJson,
    pub brief: BriefJson,
    pub descriptor_pool: DescriptorPoolSizing,
    /// spirv artifact file name to the stage it holds
    pub spvs: BTreeMap<String, ShaderStage>,
}

/// reflected resources by name
///
/// a category is absent when the program had no live resources in it
#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq)]
pub struct VariablesJson {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attributes: Option<BTreeMap<String, AttributeJson>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uniform_blocks: Option<BTreeMap<String, UniformBlockJson>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uniform_variables: Option<BTreeMap<String, UniformVariableJson>>,
    #[serde(default)]
    pub push_constant: BTreeMap<String, PushConstantJson>,
}

/// live resource counts, including push constants and block members
#[derive(Debug, Serialize, Deserialize, Clone, Copy, Default, PartialEq, Eq)]
pub struct BriefJson {
    pub attributes_count: usize,
    pub uniform_blocks_count: usize,
    pub uniform_variables_count: usize,
}

impl ShaderDescriptorJson {
    /// pretty json with four space indents
    pub fn to_json_bytes(&self) -> Result<Vec<u8>> {
        let mut bytes = Vec::new();
        let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
        let mut serializer = serde_json::Serializer::with_formatter(&mut bytes, formatter);
        self.serialize(&mut serializer)?;

        Ok(bytes)
    }
}
