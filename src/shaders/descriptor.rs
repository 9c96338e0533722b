use std::collections::BTreeMap;

use log::*;

use super::ShaderStage;
use super::descriptor_pool::DescriptorPoolSizing;
use super::json::*;
use super::push_constants::{PushConstantPolicy, PushConstantTable, StageMask};
use super::reflection::{Qualifier, ReflectionSource};
use super::type_defs::attribute_type_code;

/// builds a descriptor report from reflection
///
/// push constants are harvested per stage first, then the linked program is
/// walked once, then `finish` hands back the report
pub struct ShaderDescriptor {
    vulkan_def: bool,
    variables: VariablesJson,
    brief: BriefJson,
    descriptor_pool: DescriptorPoolSizing,
    push_constants: PushConstantTable,
}

impl ShaderDescriptor {
    /// with `vulkan_def`, attribute types are written as vulkan formats
    pub fn new(vulkan_def: bool, push_constant_policy: PushConstantPolicy) -> Self {
        Self {
            vulkan_def,
            variables: VariablesJson::default(),
            brief: BriefJson::default(),
            descriptor_pool: DescriptorPoolSizing::default(),
            push_constants: PushConstantTable::new(push_constant_policy),
        }
    }

    pub fn descriptor_pool(&self) -> &DescriptorPoolSizing {
        &self.descriptor_pool
    }

    pub fn push_constants(&self) -> &PushConstantTable {
        &self.push_constants
    }

    /// collects the push constant blocks of a program linked from one stage
    pub fn build_push_constants(&mut self, program: &impl ReflectionSource, stage: ShaderStage) {
        for block in program.uniform_blocks() {
            if !block.qualifier.push_constant {
                continue;
            }

            let push_constant = PushConstantBlockJson {
                block_size: block.size,
                basic_type: block.basic_type.clone(),
                stage: StageMask::single(stage),
                layout: self.layout(&block.qualifier),
            };
            self.push_constants
                .insert_harvested(&block.name, push_constant);
        }

        // pool sizing only counts the cross-stage program
        self.descriptor_pool.reset();
    }

    /// walks the final linked program
    pub fn process_program(&mut self, program: &impl ReflectionSource) {
        self.write_attributes(program);
        self.write_uniform_blocks(program);
        self.write_uniform_variables(program);

        info!(
            "reflected {} attributes, {} uniform blocks, {} uniform variables",
            self.brief.attributes_count,
            self.brief.uniform_blocks_count,
            self.brief.uniform_variables_count
        );
    }

    /// assembles the report
    pub fn finish(self, spvs: BTreeMap<String, ShaderStage>) -> ShaderDescriptorJson {
        let mut variables = self.variables;
        variables.push_constant = self.push_constants.into_entries();

        ShaderDescriptorJson {
            variables,
            brief: self.brief,
            descriptor_pool: self.descriptor_pool,
            spvs,
        }
    }

    /// the present layout indices of a qualifier, counting its descriptor set
    fn layout(&mut self, qualifier: &Qualifier) -> Layout {
        if let Some(set) = qualifier.set {
            self.descriptor_pool.observe_set(set);
        }

        Layout::from(qualifier)
    }

    fn write_attributes(&mut self, program: &impl ReflectionSource) {
        let attributes = program.attributes();

        let mut attributes_json = BTreeMap::new();
        for attribute in attributes {
            let attribute_json = AttributeJson {
                type_code: attribute_type_code(self.vulkan_def, attribute.gl_type),
                basic_type: attribute.basic_type.clone(),
                vector_size: attribute.vector_size,
                layout: self.layout(&attribute.qualifier),
            };

            if attribute.qualifier.push_constant {
                debug!("attribute '{}' is a push constant", attribute.name);
                self.push_constants
                    .insert_walked(&attribute.name, PushConstantJson::Attribute(attribute_json));
            } else {
                attributes_json.insert(attribute.name.clone(), attribute_json);
            }
        }

        if !attributes.is_empty() {
            self.variables
                .attributes
                .get_or_insert_with(BTreeMap::new)
                .extend(attributes_json);
        }
        self.brief.attributes_count += attributes.len();
    }

    fn write_uniform_blocks(&mut self, program: &impl ReflectionSource) {
        let blocks = program.uniform_blocks();

        let mut blocks_json = BTreeMap::new();
        for block in blocks {
            self.descriptor_pool.accumulate(&block.basic_type, None);
            let layout = self.layout(&block.qualifier);

            if block.qualifier.push_constant {
                let push_constant = PushConstantBlockJson {
                    block_size: block.size,
                    basic_type: block.basic_type.clone(),
                    stage: StageMask::default(),
                    layout,
                };
                self.push_constants
                    .insert_walked(&block.name, PushConstantJson::Block(push_constant));
            } else {
                let block_json = UniformBlockJson {
                    block_size: block.size,
                    basic_type: block.basic_type.clone(),
                    layout,
                    offset: block.buffer_offset,
                };
                blocks_json.insert(block.name.clone(), block_json);
            }
        }

        if !blocks.is_empty() {
            self.variables
                .uniform_blocks
                .get_or_insert_with(BTreeMap::new)
                .extend(blocks_json);
        }
        self.brief.uniform_blocks_count += blocks.len();
    }

    fn write_uniform_variables(&mut self, program: &impl ReflectionSource) {
        let variables = program.uniform_variables();

        let mut variables_json = BTreeMap::new();
        for variable in variables {
            // block members are described by their block
            if variable.block_index.is_some() {
                continue;
            }

            self.descriptor_pool
                .accumulate(&variable.basic_type, variable.sampler.as_ref());

            let sampler = if variable.is_sampler() {
                variable.sampler
            } else {
                None
            };

            let variable_json = UniformVariableJson {
                basic_type: variable.basic_type.clone(),
                sampler,
                layout: self.layout(&variable.qualifier),
                offset: variable.buffer_offset,
            };
            variables_json.insert(variable.name.clone(), variable_json);
        }

        if !variables.is_empty() {
            self.variables
                .uniform_variables
                .get_or_insert_with(BTreeMap::new)
                .extend(variables_json);
        }
        self.brief.uniform_variables_count += variables.len();
    }
}
