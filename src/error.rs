//! Error types for shader descriptor generation

use std::fmt;
use std::path::PathBuf;

use thiserror::Error;

use crate::shaders::ShaderStage;

/// The compiler step that failed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompileStep {
    Parse,
    Link,
    MapIo,
    Reflection,
    CodeGen,
}

impl fmt::Display for CompileStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let step = match self {
            Self::Parse => "parse",
            Self::Link => "link",
            Self::MapIo => "io mapping",
            Self::Reflection => "reflection",
            Self::CodeGen => "code generation",
        };
        f.write_str(step)
    }
}

/// A failure reported by the shader compiler
#[derive(Error, Debug)]
#[error("shader {step} failed{}: {log}", stage_suffix(.stage))]
pub struct CompileError {
    /// The stage being compiled, if the failure is specific to one
    pub stage: Option<ShaderStage>,
    /// Which compiler step failed
    pub step: CompileStep,
    /// The compiler's info log
    pub log: String,
}

impl CompileError {
    pub fn new(stage: Option<ShaderStage>, step: CompileStep, log: impl Into<String>) -> Self {
        Self {
            stage,
            step,
            log: log.into(),
        }
    }
}

fn stage_suffix(stage: &Option<ShaderStage>) -> String {
    match stage {
        Some(stage) => format!(" for {stage} stage"),
        None => String::new(),
    }
}

/// Error type for shader descriptor operations
#[derive(Error, Debug)]
pub enum Error {
    /// The shader is invalid: parsing, linking or reflection failed
    #[error(transparent)]
    Compiler(#[from] CompileError),

    /// A config names a stage that does not exist
    #[error("unknown shader stage: {0}")]
    UnknownStage(String),

    /// The config file could not be used
    #[error("invalid config {}: {reason}", .path.display())]
    Config {
        /// The config file path
        path: PathBuf,
        /// What was wrong with it
        reason: String,
    },

    /// An output artifact could not be written
    #[error("cannot persist artifact {}: {source}", .path.display())]
    Persist {
        /// The destination that failed
        path: PathBuf,
        /// The underlying IO error
        source: std::io::Error,
    },

    /// The descriptor report could not be encoded
    #[error("failed to serialize descriptor report: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Result type for shader descriptor operations
pub type Result<T> = std::result::Result<T, Error>;
