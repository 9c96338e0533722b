//! Shader reflection to descriptor reports
//!
//! The compiler links each stage on its own so push constants can be tagged
//! with their stage, then links the whole program. The report built from
//! those links sizes descriptor pools and push constant ranges for vulkan.

pub mod build_tasks;
pub mod descriptor_pool;
pub mod json;
pub mod push_constants;
pub mod reflection;
pub mod type_defs;

mod descriptor;
pub use descriptor::ShaderDescriptor;

mod stage;
pub use stage::ShaderStage;

pub use build_tasks::{ShaderArtifacts, build_shader_descriptor, write_shader_descriptor};
pub use descriptor_pool::{DescriptorKind, DescriptorPoolSizing};
pub use json::ShaderDescriptorJson;
pub use push_constants::{PushConstantPolicy, StageMask};
pub use reflection::{LinkedProgram, ReflectionSnapshot, ReflectionSource, ShaderCompiler};
