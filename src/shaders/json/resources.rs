use serde::{Deserialize, Serialize};

use crate::shaders::push_constants::StageMask;
use crate::shaders::reflection::{Qualifier, Sampler};
use crate::shaders::type_defs::TypeCode;

/// the layout indices a resource declared, without its push constant flag
#[derive(Debug, Serialize, Deserialize, Clone, Copy, Default, PartialEq, Eq)]
pub struct Layout {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub binding: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub set: Option<u32>,
}

impl From<&Qualifier> for Layout {
    fn from(qualifier: &Qualifier) -> Self {
        Self {
            binding: qualifier.binding,
            location: qualifier.location,
            set: qualifier.set,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct AttributeJson {
    #[serde(rename = "type")]
    pub type_code: TypeCode,
    pub basic_type: String,
    pub vector_size: u32,
    #[serde(flatten)]
    pub layout: Layout,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct UniformBlockJson {
    pub block_size: u32,
    pub basic_type: String,
    #[serde(flatten)]
    pub layout: Layout,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub offset: Option<u32>,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct UniformVariableJson {
    pub basic_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sampler: Option<Sampler>,
    #[serde(flatten)]
    pub layout: Layout,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub offset: Option<u32>,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct PushConstantBlockJson {
    pub block_size: u32,
    pub basic_type: String,
    /// the stages that declared this block
    #[serde(default, skip_serializing_if = "StageMask::is_empty")]
    pub stage: StageMask,
    #[serde(flatten)]
    pub layout: Layout,
}

/// push constants are blocks in practice,
/// but an attribute carrying the qualifier is kept too
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(untagged)]
pub enum PushConstantJson {
    Block(PushConstantBlockJson),
    Attribute(AttributeJson),
}

impl PushConstantJson {
    pub fn stage(&self) -> Option<&StageMask> {
        match self {
            Self::Block(block) => Some(&block.stage),
            Self::Attribute(_) => None,
        }
    }
}
