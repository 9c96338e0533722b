pub mod config;
pub mod error;
pub mod shaders;
pub mod util;

pub use config::Config;
pub use error::{CompileError, CompileStep, Error, Result};
pub use shaders::*;
