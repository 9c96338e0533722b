use std::collections::BTreeMap;

use ash::vk;
use serde::{Deserialize, Serialize};

use super::reflection::Sampler;

/// the descriptor types a reflected program can require
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "snake_case")]
pub enum DescriptorKind {
    CombinedImageSampler,
    Sampler,
    UniformBuffer,
}

impl DescriptorKind {
    pub const ALL: [DescriptorKind; 3] = [
        Self::CombinedImageSampler,
        Self::Sampler,
        Self::UniformBuffer,
    ];

    pub fn to_vk(self) -> vk::DescriptorType {
        match self {
            Self::CombinedImageSampler => vk::DescriptorType::COMBINED_IMAGE_SAMPLER,
            Self::Sampler => vk::DescriptorType::SAMPLER,
            Self::UniformBuffer => vk::DescriptorType::UNIFORM_BUFFER,
        }
    }
}

/// capacity hints for a descriptor pool serving the reflected program
///
/// counts only ever grow within a run, one per visited resource
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct DescriptorPoolSizing {
    pub descriptors: BTreeMap<DescriptorKind, u32>,
    /// one more than the highest set index seen; set 0 always exists
    pub sets_count: u32,
}

impl Default for DescriptorPoolSizing {
    fn default() -> Self {
        Self {
            descriptors: DescriptorKind::ALL.into_iter().map(|kind| (kind, 0)).collect(),
            sets_count: 1,
        }
    }
}

impl DescriptorPoolSizing {
    /// counts one uniform block or uniform variable by its basic type label
    pub fn accumulate(&mut self, basic_type: &str, sampler: Option<&Sampler>) {
        let kind = if basic_type.contains("sampler") {
            if sampler.is_some_and(|sampler| sampler.combined) {
                DescriptorKind::CombinedImageSampler
            } else {
                DescriptorKind::Sampler
            }
        } else if basic_type == "block" {
            DescriptorKind::UniformBuffer
        } else {
            return;
        };

        *self.descriptors.entry(kind).or_default() += 1;
    }

    pub fn observe_set(&mut self, set: u32) {
        self.sets_count = self.sets_count.max(set.saturating_add(1));
    }

    pub fn count(&self, kind: DescriptorKind) -> u32 {
        self.descriptors.get(&kind).copied().unwrap_or(0)
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// pool sizes for `vk::DescriptorPoolCreateInfo`, leaving out unused types
    pub fn pool_sizes(&self) -> Vec<vk::DescriptorPoolSize> {
        self.descriptors
            .iter()
            .filter(|(_, count)| **count > 0)
            .map(|(kind, count)| {
                vk::DescriptorPoolSize::default()
                    .ty(kind.to_vk())
                    .descriptor_count(*count)
            })
            .collect()
    }
}
