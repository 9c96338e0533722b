use std::path::PathBuf;

use clap::Parser;
use log::*;

use shader_descriptor::*;

/// Writes a descriptor report and spirv artifacts for a shader program
#[derive(Parser, Debug)]
#[command(name = "shader-descriptor", version)]
struct Args {
    /// The shader config json
    config: PathBuf,

    /// Reflection snapshot captured from the shader compiler
    #[arg(short, long)]
    reflection: PathBuf,
}

fn main() -> anyhow::Result<()> {
    pretty_env_logger::init();

    let args = Args::parse();

    let config = Config::from_path(&args.config)?;
    info!("{}: stages {:?}", args.config.display(), config.stages());

    let snapshot = ReflectionSnapshot::from_path(&args.reflection)?;
    write_shader_descriptor(&mut snapshot.compiler(), &config)?;

    Ok(())
}
