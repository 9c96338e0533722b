use std::collections::BTreeMap;
use std::path::Path;

use log::*;

use super::descriptor::ShaderDescriptor;
use super::json::ShaderDescriptorJson;
use super::reflection::{LinkedProgram, ShaderCompiler};
use crate::config::Config;
use crate::{Error, Result};

/// everything a run produces, before anything is written
pub struct ShaderArtifacts {
    pub descriptor: ShaderDescriptorJson,
    /// spirv artifact file name and its words, in stage order
    pub spirv: Vec<(String, Vec<u32>)>,
}

/// harvests push constants per stage, then reflects the linked program
pub fn build_shader_descriptor<C: ShaderCompiler>(
    compiler: &mut C,
    config: &Config,
) -> Result<ShaderArtifacts> {
    let stages = config.stages();
    let mut descriptor =
        ShaderDescriptor::new(config.remaps_attribute_types(), config.push_constant_policy);

    for (&stage, source) in &config.sources {
        // released at the end of each iteration, before the next link
        let stage_program = compiler.link_stage(stage, source, config.language)?;
        descriptor.build_push_constants(&stage_program, stage);
    }
    debug!(
        "harvested {} push constants from {} stages",
        descriptor.push_constants().len(),
        stages.len()
    );

    let program = compiler.link_program(&config.sources, config.language)?;
    descriptor.process_program(&program);

    let mut spvs = BTreeMap::new();
    let mut spirv = vec![];
    for &stage in &stages {
        let file_name = config.shader_bin_filename(stage);
        spirv.push((file_name.clone(), program.spirv(stage)?));
        spvs.insert(file_name, stage);
    }

    Ok(ShaderArtifacts {
        descriptor: descriptor.finish(spvs),
        spirv,
    })
}

/// writes each stage's spirv, then the descriptor report
pub fn write_shader_descriptor<C: ShaderCompiler>(compiler: &mut C, config: &Config) -> Result<()> {
    let ShaderArtifacts { descriptor, spirv } = build_shader_descriptor(compiler, config)?;

    for (file_name, words) in &spirv {
        let bytes: Vec<u8> = words.iter().flat_map(|word| word.to_le_bytes()).collect();
        write_artifact(Path::new(file_name), &bytes)?;
    }

    let json = descriptor.to_json_bytes()?;
    write_artifact(&config.descriptor_path, &json)?;
    info!("wrote {}", config.descriptor_path.display());

    Ok(())
}

fn write_artifact(path: &Path, bytes: &[u8]) -> Result<()> {
    let persist_error = |source| Error::Persist {
        path: path.to_path_buf(),
        source,
    };

    if let Some(parent) = path.parent().filter(|dir| !dir.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(persist_error)?;
    }
    std::fs::write(path, bytes).map_err(persist_error)?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;
    use std::path::PathBuf;
    use std::rc::Rc;

    use super::*;
    use crate::config::{ShaderSource, SourceLanguage};
    use crate::error::{CompileError, CompileStep};
    use crate::shaders::descriptor_pool::DescriptorKind;
    use crate::shaders::json::PushConstantJson;
    use crate::shaders::push_constants::StageMask;
    use crate::shaders::reflection::*;
    use crate::shaders::ShaderStage;
    use crate::util::manifest_path;
    use pretty_assertions::assert_eq;

    fn textured_quad() -> ReflectionSnapshot {
        let path = manifest_path(["shaders", "reflection", "textured_quad.json"]);
        ReflectionSnapshot::from_path(&path).unwrap()
    }

    fn config_in(dir: &Path, extra: &str) -> Config {
        let json = serde_json::json!({
            "sources": {
                "vertex": { "path": "quad.vert" },
                "fragment": { "path": "quad.frag", "entry": "fs_main" }
            },
            "vulkan_define": true,
            "spv": dir.join("quad.spv"),
            "descriptor": dir.join("quad.sd"),
        });
        let mut json = json.as_object().unwrap().clone();
        if !extra.is_empty() {
            let extra: serde_json::Value = serde_json::from_str(extra).unwrap();
            json.extend(extra.as_object().unwrap().clone());
        }

        let json = serde_json::Value::Object(json).to_string();
        Config::from_json(&json, Path::new("quad.json")).unwrap()
    }

    fn tmp_dir() -> PathBuf {
        let tmp_prefix = format!("shader-descriptor-test-{}", uuid::Uuid::new_v4());
        std::env::temp_dir().join(tmp_prefix)
    }

    #[test]
    fn textured_quad_report() {
        let snapshot = textured_quad();
        let dir = tmp_dir();
        let config = config_in(&dir, "");

        let artifacts = build_shader_descriptor(&mut snapshot.compiler(), &config).unwrap();
        let report = artifacts.descriptor;

        let pool = &report.descriptor_pool;
        assert_eq!(pool.sets_count, 2);
        assert_eq!(pool.count(DescriptorKind::CombinedImageSampler), 1);
        assert_eq!(pool.count(DescriptorKind::Sampler), 0);
        assert_eq!(pool.count(DescriptorKind::UniformBuffer), 3);

        let blocks = report.variables.uniform_blocks.unwrap();
        assert_eq!(blocks.keys().collect::<Vec<_>>(), vec!["Camera", "Material"]);

        let PushConstantJson::Block(push) = &report.variables.push_constant["Push"] else {
            panic!("push constant should be a block");
        };
        assert_eq!(push.block_size, 64);
        assert_eq!(push.stage, StageMask::single(ShaderStage::Vertex));

        let variables = report.variables.uniform_variables.unwrap();
        assert_eq!(variables.keys().collect::<Vec<_>>(), vec!["albedo"]);

        assert_eq!(report.brief.attributes_count, 2);
        assert_eq!(report.brief.uniform_blocks_count, 3);
        assert_eq!(report.brief.uniform_variables_count, 4);

        let vert = config.shader_bin_filename(ShaderStage::Vertex);
        let frag = config.shader_bin_filename(ShaderStage::Fragment);
        assert_eq!(report.spvs[&vert], ShaderStage::Vertex);
        assert_eq!(report.spvs[&frag], ShaderStage::Fragment);
        assert_eq!(artifacts.spirv[0], (vert, vec![119734787, 65536, 0, 1]));
    }

    #[test]
    fn shared_push_constant_policies() {
        let mut snapshot = textured_quad();
        let push = snapshot.stages[&ShaderStage::Vertex].uniform_blocks[1].clone();
        snapshot
            .stages
            .get_mut(&ShaderStage::Fragment)
            .unwrap()
            .uniform_blocks
            .push(push);

        let dir = tmp_dir();
        let push_stage = |config: &Config| {
            let artifacts = build_shader_descriptor(&mut snapshot.compiler(), config).unwrap();
            artifacts.descriptor.variables.push_constant["Push"]
                .stage()
                .cloned()
                .unwrap()
        };

        let overwritten = push_stage(&config_in(&dir, ""));
        assert_eq!(overwritten, StageMask::single(ShaderStage::Fragment));

        let merged = push_stage(&config_in(&dir, r#"{ "push_constant_stages": "merge" }"#));
        assert!(merged.contains(ShaderStage::Vertex));
        assert!(merged.contains(ShaderStage::Fragment));
    }

    #[test]
    fn writes_artifacts() {
        let snapshot = textured_quad();
        let dir = tmp_dir();
        let config = config_in(&dir, "");

        write_shader_descriptor(&mut snapshot.compiler(), &config).unwrap();

        let json = std::fs::read_to_string(&config.descriptor_path).unwrap();
        let report: ShaderDescriptorJson = serde_json::from_str(&json).unwrap();
        assert_eq!(report.descriptor_pool.sets_count, 2);
        assert!(json.starts_with("{\n    \"variables\""));

        let vert = std::fs::read(config.shader_bin_filename(ShaderStage::Vertex)).unwrap();
        assert_eq!(vert.len(), 16);
        assert_eq!(&vert[..4], &119734787u32.to_le_bytes());

        std::fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn unwritable_destination_is_a_persist_error() {
        let snapshot = textured_quad();
        let dir = tmp_dir();
        std::fs::create_dir_all(&dir).unwrap();
        let blocker = dir.join("blocker");
        std::fs::write(&blocker, b"").unwrap();

        let mut config = config_in(&dir, "");
        config.descriptor_path = blocker.join("quad.sd");

        let err = write_shader_descriptor(&mut snapshot.compiler(), &config).unwrap_err();
        assert!(matches!(err, Error::Persist { ref path, .. } if *path == config.descriptor_path));

        std::fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn link_failure_aborts_the_run() {
        let mut snapshot = textured_quad();
        snapshot.stages.remove(&ShaderStage::Fragment);
        let dir = tmp_dir();
        let config = config_in(&dir, "");

        let err = write_shader_descriptor(&mut snapshot.compiler(), &config).unwrap_err();
        let Error::Compiler(err) = err else {
            panic!("expected a compiler error");
        };
        assert_eq!(err.stage, Some(ShaderStage::Fragment));
        assert_eq!(err.step, CompileStep::Link);
        assert!(!config.descriptor_path.exists());
    }

    /// counts the programs alive at once
    struct TrackingCompiler {
        snapshot: ReflectionSnapshot,
        live: Rc<Cell<usize>>,
        peak: Rc<Cell<usize>>,
        fail_stage: Option<ShaderStage>,
        /// every (stage, path, entry, language) handed to a link
        linked: Vec<(ShaderStage, PathBuf, String, SourceLanguage)>,
    }

    struct TrackedProgram {
        reflection: ProgramReflection,
        live: Rc<Cell<usize>>,
    }

    impl TrackingCompiler {
        fn new(snapshot: ReflectionSnapshot) -> Self {
            Self {
                snapshot,
                live: Rc::new(Cell::new(0)),
                peak: Rc::new(Cell::new(0)),
                fail_stage: None,
                linked: vec![],
            }
        }

        fn record(&mut self, stage: ShaderStage, source: &ShaderSource, language: SourceLanguage) {
            self.linked
                .push((stage, source.path.clone(), source.entry.clone(), language));
        }

        fn track(&self, reflection: &ProgramReflection) -> TrackedProgram {
            self.live.set(self.live.get() + 1);
            self.peak.set(self.peak.get().max(self.live.get()));
            TrackedProgram {
                reflection: reflection.clone(),
                live: self.live.clone(),
            }
        }
    }

    impl Drop for TrackedProgram {
        fn drop(&mut self) {
            self.live.set(self.live.get() - 1);
        }
    }

    impl ReflectionSource for TrackedProgram {
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

    impl LinkedProgram for TrackedProgram {
        fn spirv(&self, _stage: ShaderStage) -> std::result::Result<Vec<u32>, CompileError> {
            Ok(vec![])
        }
    }

    impl ShaderCompiler for TrackingCompiler {
        type Program = TrackedProgram;

        fn link_stage(
            &mut self,
            stage: ShaderStage,
            source: &ShaderSource,
            language: SourceLanguage,
        ) -> std::result::Result<TrackedProgram, CompileError> {
            self.record(stage, source, language);
            if self.fail_stage == Some(stage) {
                return Err(CompileError::new(Some(stage), CompileStep::Link, "boom"));
            }
            Ok(self.track(&self.snapshot.stages[&stage]))
        }

        fn link_program(
            &mut self,
            sources: &BTreeMap<ShaderStage, ShaderSource>,
            language: SourceLanguage,
        ) -> std::result::Result<TrackedProgram, CompileError> {
            for (&stage, source) in sources {
                self.record(stage, source, language);
            }
            assert_eq!(self.live.get(), 0, "stage programs must be released first");
            Ok(self.track(&self.snapshot.program))
        }
    }

    #[test]
    fn stage_programs_are_released_before_the_final_link() {
        let mut compiler = TrackingCompiler::new(textured_quad());
        let config = config_in(&tmp_dir(), "");

        build_shader_descriptor(&mut compiler, &config).unwrap();

        assert_eq!(compiler.peak.get(), 1);
        assert_eq!(compiler.live.get(), 0);
    }

    #[test]
    fn compiler_receives_configured_sources() {
        let mut compiler = TrackingCompiler::new(textured_quad());
        let config = config_in(&tmp_dir(), "");

        build_shader_descriptor(&mut compiler, &config).unwrap();

        let vertex = (
            ShaderStage::Vertex,
            PathBuf::from("quad.vert"),
            "main".to_string(),
            SourceLanguage::Vulkan,
        );
        let fragment = (
            ShaderStage::Fragment,
            PathBuf::from("quad.frag"),
            "fs_main".to_string(),
            SourceLanguage::Vulkan,
        );
        // each stage on its own, then both for the final link
        assert_eq!(
            compiler.linked,
            vec![vertex.clone(), fragment.clone(), vertex, fragment]
        );
    }

    #[test]
    fn stage_programs_are_released_on_failure() {
        let mut compiler = TrackingCompiler::new(textured_quad());
        compiler.fail_stage = Some(ShaderStage::Fragment);
        let config = config_in(&tmp_dir(), "");

        let err = build_shader_descriptor(&mut compiler, &config).err().unwrap();

        assert!(matches!(err, Error::Compiler(_)));
        assert_eq!(compiler.live.get(), 0);
    }
}
