//! summed-area: compute a summed-area table on the CPU and the GPU, print
//! both, and check that they agree.
//!
//! ```bash
//! # Default input (data/square_10_x_10.txt), both engines
//! summed-area
//!
//! # Larger input, GPU only, with device diagnostics
//! summed-area -i data/random_64_x_48.txt --engine gpu --verbose
//! ```

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use summed_area::compare::{compare, speed_ratio};
use summed_area::config::{EngineSelection, RunConfig, DEFAULT_INPUT_FILE, DEFAULT_SHADER_DIR};
use summed_area::engine::{self, Engine, EngineRun};
use summed_area::parser::parse_file;
use summed_area::print::render_grid;
use summed_area::{CpuEngine, GpuDevice, GpuEngine};

/// Summed-area table benchmark: CPU reference vs. two-pass GPU compute
#[derive(Parser)]
#[command(name = "summed-area")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Input grid, one row per line
    #[arg(short, long, default_value = DEFAULT_INPUT_FILE)]
    input: PathBuf,

    /// Directory holding the sweep shaders
    #[arg(short, long, default_value = DEFAULT_SHADER_DIR)]
    shader_dir: PathBuf,

    /// Engines to run
    #[arg(short, long, value_enum, default_value = "both")]
    engine: EngineSelection,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,

    /// Suppress all output except errors
    #[arg(short, long)]
    quiet: bool,
}

impl Cli {
    fn into_config(self) -> RunConfig {
        RunConfig {
            input: self.input,
            shader_dir: self.shader_dir,
            engines: self.engine,
        }
    }
}

fn setup_logging(verbose: bool, quiet: bool) {
    let filter = if quiet {
        EnvFilter::new("error")
    } else if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("warn")
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .without_time()
        .init();
}

/// Runs the configured engines. `Ok(false)` means the outputs disagreed.
fn run(config: &RunConfig, quiet: bool) -> summed_area::Result<bool> {
    let input = parse_file(&config.input)?;
    if !quiet {
        println!("Input {}×{}:", input.width(), input.height());
        print!("{}", render_grid(&input));
    }

    // The device must outlive the engine borrowing it.
    let gpu = if config.engines.runs_gpu() {
        let gpu = GpuDevice::new()?;
        if !quiet {
            println!("GPU: {}", gpu.adapter_info);
        }
        Some(gpu)
    } else {
        None
    };

    let mut engines: Vec<Engine> = Vec::with_capacity(2);
    if config.engines.runs_cpu() {
        engines.push(CpuEngine::new().into());
    }
    if let Some(gpu) = &gpu {
        engines.push(GpuEngine::new(gpu, &config.shader_dir)?.into());
    }

    let mut runs: Vec<EngineRun> = Vec::with_capacity(engines.len());
    for e in &engines {
        let run = engine::run(e, &input)?;
        if !quiet {
            println!();
            println!("{} output ({:?}):", run.engine, run.elapsed);
            print!("{}", render_grid(&run.output));
        }
        runs.push(run);
    }

    if let [a, b] = runs.as_slice() {
        let verdict = compare(&a.output, &b.output);
        println!();
        println!("{} vs {}: {verdict}", a.engine, b.engine);
        if !verdict.is_equal() {
            return Ok(false);
        }
        println!("{}", speed_ratio(a.engine, a.elapsed, b.engine, b.elapsed));
    }
    Ok(true)
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    setup_logging(cli.verbose, cli.quiet);
    let quiet = cli.quiet;
    let config = cli.into_config();

    match run(&config, quiet) {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}
