use std::collections::BTreeMap;
use std::path::Path;

use log::*;
use serde::{Deserialize, Serialize};

use super::*;
use crate::error::CompileStep;

/// reflection captured from a compiler run, stored as json
///
/// `stages` holds each stage linked on its own, `program` the cross-stage link
#[derive(Debug, Serialize, Deserialize, Default)]
pub struct ReflectionSnapshot {
    pub stages: BTreeMap<ShaderStage, ProgramReflection>,
    pub program: ProgramReflection,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub spirv: BTreeMap<ShaderStage, Vec<u32>>,
    /// the entry point each stage was captured with, when recorded
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub entry_points: BTreeMap<ShaderStage, String>,
}

#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq)]
pub struct ProgramReflection {
    #[serde(default)]
    pub attributes: Vec<Attribute>,
    #[serde(default)]
    pub uniform_blocks: Vec<UniformBlock>,
    #[serde(default)]
    pub uniform_variables: Vec<UniformVariable>,
}

impl ReflectionSource for ProgramReflection {
    fn attributes(&self) -> &[Attribute] {
        &self.attributes
    }

    fn uniform_blocks(&self) -> &[UniformBlock] {
        &self.uniform_blocks
    }

    fn uniform_variables(&self) -> &[UniformVariable] {
        &self.uniform_variables
    }
}

impl ReflectionSnapshot {
    pub fn from_path(path: &Path) -> Result<Self, CompileError> {
        let json = std::fs::read_to_string(path).map_err(|err| {
            CompileError::new(None, CompileStep::Reflection, format!("{}: {err}", path.display()))
        })?;
        Self::from_json(&json)
    }

    pub fn from_json(json: &str) -> Result<Self, CompileError> {
        serde_json::from_str(json)
            .map_err(|err| CompileError::new(None, CompileStep::Reflection, err.to_string()))
    }

    pub fn compiler(&self) -> SnapshotCompiler<'_> {
        SnapshotCompiler { snapshot: self }
    }
}

/// serves links out of a snapshot instead of compiling
pub struct SnapshotCompiler<'a> {
    snapshot: &'a ReflectionSnapshot,
}

pub struct SnapshotProgram<'a> {
    reflection: &'a ProgramReflection,
    spirv: &'a BTreeMap<ShaderStage, Vec<u32>>,
    stages: Vec<ShaderStage>,
}

impl SnapshotCompiler<'_> {
    fn check_stage(&self, stage: ShaderStage, source: &ShaderSource) -> Result<(), CompileError> {
        debug!("linking {stage} from {} ({})", source.path.display(), source.entry);

        if !self.snapshot.stages.contains_key(&stage) {
            return Err(CompileError::new(
                Some(stage),
                CompileStep::Link,
                "stage missing from snapshot",
            ));
        }

        match self.snapshot.entry_points.get(&stage) {
            Some(entry) if *entry != source.entry => Err(CompileError::new(
                Some(stage),
                CompileStep::Link,
                format!("entry point '{}' not found, snapshot has '{entry}'", source.entry),
            )),
            _ => Ok(()),
        }
    }
}

impl<'a> ShaderCompiler for SnapshotCompiler<'a> {
    type Program = SnapshotProgram<'a>;

    fn link_stage(
        &mut self,
        stage: ShaderStage,
        source: &ShaderSource,
        _language: SourceLanguage,
    ) -> Result<Self::Program, CompileError> {
        self.check_stage(stage, source)?;
        let snapshot = self.snapshot;

        Ok(SnapshotProgram {
            reflection: &snapshot.stages[&stage],
            spirv: &snapshot.spirv,
            stages: vec![stage],
        })
    }

    fn link_program(
        &mut self,
        sources: &BTreeMap<ShaderStage, ShaderSource>,
        _language: SourceLanguage,
    ) -> Result<Self::Program, CompileError> {
        for (&stage, source) in sources {
            self.check_stage(stage, source)?;
        }

        Ok(SnapshotProgram {
            reflection: &self.snapshot.program,
            spirv: &self.snapshot.spirv,
            stages: sources.keys().copied().collect(),
        })
    }
}

impl ReflectionSource for SnapshotProgram<'_> {
    fn attributes(&self) -> &[Attribute] {
        self.reflection.attributes()
    }

    fn uniform_blocks(&self) -> &[UniformBlock] {
        self.reflection.uniform_blocks()
    }

    fn uniform_variables(&self) -> &[UniformVariable] {
        self.reflection.uniform_variables()
    }
}

impl LinkedProgram for SnapshotProgram<'_> {
    fn spirv(&self, stage: ShaderStage) -> Result<Vec<u32>, CompileError> {
        if !self.stages.contains(&stage) {
            return Err(CompileError::new(
                Some(stage),
                CompileStep::CodeGen,
                "stage is not part of this program",
            ));
        }

        self.spirv.get(&stage).cloned().ok_or_else(|| {
            CompileError::new(Some(stage), CompileStep::CodeGen, "no spirv in snapshot")
        })
    }
}
