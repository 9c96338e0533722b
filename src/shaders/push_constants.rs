use std::collections::{BTreeMap, BTreeSet};

use log::*;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use super::ShaderStage;
use super::json::{PushConstantBlockJson, PushConstantJson};

/// what happens when two stages declare a push constant block with the same name
#[derive(Debug, Serialize, Deserialize, Clone, Copy, Default, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum PushConstantPolicy {
    /// the later stage replaces the entry, keeping only its own stage
    #[default]
    Overwrite,
    /// the entry keeps every stage that declared it
    #[serde(rename = "merge")]
    MergeStages,
}

/// the stages a push constant range is visible to
///
/// serialized as a single stage name, or a list when shared between stages
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StageMask(BTreeSet<ShaderStage>);

impl StageMask {
    pub fn single(stage: ShaderStage) -> Self {
        Self(BTreeSet::from([stage]))
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn contains(&self, stage: ShaderStage) -> bool {
        self.0.contains(&stage)
    }

    pub fn stages(&self) -> impl Iterator<Item = ShaderStage> + '_ {
        self.0.iter().copied()
    }

    pub fn merge(&mut self, other: &StageMask) {
        self.0.extend(other.stages());
    }

    pub fn to_vk(&self) -> ash::vk::ShaderStageFlags {
        self.stages()
            .fold(ash::vk::ShaderStageFlags::empty(), |flags, stage| {
                flags | stage.to_vk()
            })
    }
}

impl Serialize for StageMask {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self.0.len() {
            1 => self.0.iter().next().serialize(serializer),
            _ => self.0.serialize(serializer),
        }
    }
}

impl<'de> Deserialize<'de> for StageMask {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum OneOrMany {
            One(ShaderStage),
            Many(BTreeSet<ShaderStage>),
        }

        Ok(match OneOrMany::deserialize(deserializer)? {
            OneOrMany::One(stage) => Self::single(stage),
            OneOrMany::Many(stages) => Self(stages),
        })
    }
}

/// push constant resources of the whole program, keyed by name
#[derive(Debug, Default)]
pub struct PushConstantTable {
    policy: PushConstantPolicy,
    entries: BTreeMap<String, PushConstantJson>,
}

impl PushConstantTable {
    pub fn new(policy: PushConstantPolicy) -> Self {
        Self {
            policy,
            entries: BTreeMap::new(),
        }
    }

    pub fn get(&self, name: &str) -> Option<&PushConstantJson> {
        self.entries.get(name)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// adds a block found while linking a single stage
    pub fn insert_harvested(&mut self, name: &str, mut block: PushConstantBlockJson) {
        if let Some(PushConstantJson::Block(existing)) = self.entries.get(name) {
            match self.policy {
                PushConstantPolicy::Overwrite => {
                    if existing.stage != block.stage {
                        warn!(
                            "push constant block '{name}' redeclared, {:?} replaces {:?}",
                            block.stage, existing.stage
                        );
                    }
                }
                PushConstantPolicy::MergeStages => {
                    block.stage.merge(&existing.stage);
                }
            }
        }

        debug!("push constant block '{name}' for {:?}", block.stage);
        self.entries
            .insert(name.to_string(), PushConstantJson::Block(block));
    }

    /// adds a push constant found by the cross-stage walk
    ///
    /// harvested entries win, since only they know their stage
    pub fn insert_walked(&mut self, name: &str, entry: PushConstantJson) {
        self.entries.entry(name.to_string()).or_insert(entry);
    }

    pub fn into_entries(self) -> BTreeMap<String, PushConstantJson> {
        self.entries
    }
}
