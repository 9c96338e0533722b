use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::ShaderStage;
use crate::config::{ShaderSource, SourceLanguage};
use crate::error::CompileError;

mod snapshot;
pub use snapshot::*;

/// layout qualifiers of one resource
///
/// each index is present only when the shader declared it
#[derive(Debug, Serialize, Deserialize, Clone, Copy, Default, PartialEq, Eq)]
pub struct Qualifier {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub binding: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub set: Option<u32>,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub push_constant: bool,
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
pub enum SamplerDim {
    #[serde(rename = "1d")]
    Dim1D,
    #[serde(rename = "2d")]
    Dim2D,
    #[serde(rename = "3d")]
    Dim3D,
    #[serde(rename = "cube")]
    Cube,
    #[serde(rename = "rect")]
    Rect,
    #[serde(rename = "buffer")]
    Buffer,
    #[serde(rename = "subpass_input")]
    SubpassInput,
}

/// the sampled result type
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum SamplerKind {
    Float,
    Double,
    Int,
    Uint,
    Int64,
    Uint64,
    Float16,
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
pub struct Sampler {
    pub dim: SamplerDim,
    #[serde(rename = "type")]
    pub kind: SamplerKind,
    /// a combined texture + sampler, as opposed to a separate sampler object
    pub combined: bool,
}

/// a live vertex input
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Attribute {
    pub name: String,
    /// the GL type enum, eg 0x8B51 for vec3
    pub gl_type: u32,
    pub basic_type: String,
    pub vector_size: u32,
    #[serde(default)]
    pub qualifier: Qualifier,
}

/// a live uniform or push-constant block
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct UniformBlock {
    pub name: String,
    /// size in bytes
    pub size: u32,
    pub basic_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub buffer_offset: Option<u32>,
    #[serde(default)]
    pub qualifier: Qualifier,
}

/// a live uniform variable, either free-standing or a member of a block
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct UniformVariable {
    pub name: String,
    pub basic_type: String,
    /// index of the owning uniform block, if this is a block member
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub block_index: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub buffer_offset: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sampler: Option<Sampler>,
    #[serde(default)]
    pub qualifier: Qualifier,
}

impl UniformVariable {
    pub fn is_sampler(&self) -> bool {
        self.basic_type.contains("sampler")
    }
}

/// read-only reflection of a linked program
///
/// each slice holds exactly the live resources of its category
pub trait ReflectionSource {
    fn attributes(&self) -> &[Attribute];
    fn uniform_blocks(&self) -> &[UniformBlock];
    fn uniform_variables(&self) -> &[UniformVariable];
}

/// a successfully linked program, owned by the compiler
///
/// whatever the compiler holds for it is released on drop
pub trait LinkedProgram: ReflectionSource {
    /// generates spirv words for one of the linked stages
    fn spirv(&self, stage: ShaderStage) -> Result<Vec<u32>, CompileError>;
}

/// the external shader compiler
pub trait ShaderCompiler {
    type Program: LinkedProgram;

    /// compiles `source` and links a program containing only this stage
    fn link_stage(
        &mut self,
        stage: ShaderStage,
        source: &ShaderSource,
        language: SourceLanguage,
    ) -> Result<Self::Program, CompileError>;

    /// compiles every source and links them into the final program
    fn link_program(
        &mut self,
        sources: &BTreeMap<ShaderStage, ShaderSource>,
        language: SourceLanguage,
    ) -> Result<Self::Program, CompileError>;
}
