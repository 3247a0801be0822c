//! Command line driver for both build phases.
//!
//! Loads a program outline, runs the registration pipeline, and packages an
//! already-built executable when one is given.

use std::fs;
use std::io;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use lambdagen::{outline, pipeline, ArtifactPackager, GeneratorConfig};

#[derive(Parser, Debug)]
#[command(name = "lambdagen", version, about = "Register and package AWS Lambda handlers")]
struct Args {
    /// Program outline to process.
    outline: PathBuf,

    /// Compiled executable to package after analysis.
    #[arg(long)]
    executable: Option<PathBuf>,

    /// Write the rewritten source of every document to this file.
    #[arg(long)]
    emit: Option<PathBuf>,

    #[arg(long)]
    memory_size: Option<u32>,

    #[arg(long)]
    timeout: Option<u32>,

    /// Layer ARN used in the printed create command.
    #[arg(long)]
    layer: Option<String>,
}

fn main() -> ExitCode {
    env_logger::init();
    let args = Args::parse();

    match drive(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}

fn drive(args: &Args) -> Result<(), Box<dyn std::error::Error>> {
    let mut config = GeneratorConfig::default();
    if let Some(memory) = args.memory_size {
        config.packaging.memory_size = memory;
    }
    if let Some(timeout) = args.timeout {
        config.packaging.timeout = timeout;
    }
    if let Some(layer) = &args.layer {
        config.packaging.layer_arn = layer.clone();
    }

    let text = fs::read_to_string(&args.outline)?;
    let mut program = outline::parse_outline(&text)?;
    let analysis = pipeline::run(&mut program, &config.dispatcher)?;

    for diagnostic in analysis.diagnostics.iter() {
        eprintln!("{diagnostic}");
    }
    log::info!(
        "{} candidate(s), {} rejected, {} registered",
        analysis.stats.candidates,
        analysis.stats.rejected,
        analysis.stats.registered
    );

    if let Some(path) = &args.emit {
        let source: Vec<&str> = program.documents().map(|(_, d)| d.source.as_str()).collect();
        fs::write(path, source.join("\n"))?;
    }

    if let Some(executable) = &args.executable {
        let packager = ArtifactPackager::new(&config);
        let stdout = io::stdout();
        let mut out = stdout.lock();
        packager.package(executable, &program, &analysis.generated, &mut out)?;
    }
    Ok(())
}
