//! docsplice: add generated docstrings to a Python source file.
//!
//! Reads one file, asks a text-completion service for a top-of-file
//! docstring and one docstring per function, and writes the file back out
//! with each docstring spliced in under its header:
//!
//! - **file mode** (default): `docsplice my_code.py` writes `documented/my_code.py`
//! - **console mode**: `docsplice --print my_code.py` writes to stdout
//!
//! Settings come from `config.json` (`{"api_key": "your_key"}`).

mod config;
mod provider;
mod scan;
mod sink;
mod splice;
mod trace;
mod writer;

use anyhow::{Context, Result};
use clap::{CommandFactory, Parser};
use std::fs;
use std::path::{Path, PathBuf};

use crate::config::Config;
use crate::sink::{ConsoleSink, FileSink, Sink};
use crate::trace::Trace;

#[derive(Parser)]
#[command(
    name = "docsplice",
    about = "Add generated docstrings to every function in a Python file"
)]
struct Cli {
    /// Python source file to document
    file: Option<PathBuf>,

    /// Configuration file holding the API key
    #[arg(short = 'c', long, default_value = "config.json")]
    config: PathBuf,

    /// Output directory (overrides `output_dir` from the config)
    #[arg(short = 'o', long)]
    output_dir: Option<PathBuf>,

    /// Print the result to stdout instead of writing a file
    #[arg(short = 'p', long)]
    print: bool,

    /// Use placeholder docstrings instead of calling the service
    #[arg(short = 'm', long)]
    mock: bool,

    /// Write a trace of every prompt and reply to this file
    #[arg(short = 'd', long)]
    debug: Option<PathBuf>,
}

impl Cli {
    /// Fold command-line overrides into the loaded configuration.
    fn apply(&self, config: &mut Config) {
        if self.print {
            config.print_to_console = true;
        }
        if self.mock {
            config.mock_calls = true;
        }
        if let Some(ref dir) = self.output_dir {
            config.output_dir = dir.clone();
        }
        if let Some(ref path) = self.debug {
            config.debug_log = Some(path.clone());
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Credentials are checked before anything else is touched
    let mut config = config::load(&cli.config)?;
    cli.apply(&mut config);

    let Some(ref input) = cli.file else {
        Cli::command().print_long_help()?;
        println!();
        return Ok(());
    };

    run(input, &config)
}

/// Document one file according to `config`.
fn run(input: &Path, config: &Config) -> Result<()> {
    let source = fs::read_to_string(input)
        .with_context(|| format!("failed to read {}", input.display()))?;

    let trace = match config.debug_log {
        Some(ref path) => Trace::to_file(path)?,
        None => Trace::disabled(),
    };
    let mut provider = provider::from_config(config, trace);

    if config.print_to_console {
        let mut sink = ConsoleSink::new();
        splice::splice(&source, provider.as_mut(), &mut sink)?;
        sink.finish()?;
        return Ok(());
    }

    let mut sink = FileSink::create_for(input, &config.output_dir)?;
    let report = splice::splice(&source, provider.as_mut(), &mut sink)?;
    sink.finish()?;
    eprintln!(
        "wrote {} ({} functions documented, {} -> {} lines)",
        sink.path().display(),
        report.functions,
        report.lines_in,
        report.lines_out
    );
    Ok(())
}
