//! Output sinks for emitted lines.

use anyhow::{Context, Result};
use std::fs::{self, File};
use std::io::{self, BufWriter, Stdout, Write};
use std::path::{Path, PathBuf};

/// Append-only line destination. Lines appear in call order.
pub trait Sink {
    fn write_line(&mut self, line: &str) -> Result<()>;

    /// Flush anything buffered. Dropping a sink also releases it, but only
    /// `finish` reports flush errors.
    fn finish(&mut self) -> Result<()> {
        Ok(())
    }
}

/// Writes to stdout.
pub struct ConsoleSink {
    out: BufWriter<Stdout>,
}

impl ConsoleSink {
    pub fn new() -> Self {
        Self {
            out: BufWriter::new(io::stdout()),
        }
    }
}

impl Sink for ConsoleSink {
    fn write_line(&mut self, line: &str) -> Result<()> {
        writeln!(self.out, "{}", line).context("failed to write to stdout")
    }

    fn finish(&mut self) -> Result<()> {
        self.out.flush().context("failed to flush stdout")
    }
}

/// Writes to a newly created file.
pub struct FileSink {
    path: PathBuf,
    out: BufWriter<File>,
}

impl FileSink {
    /// Create `dir/<file name of input>`, creating `dir` if needed.
    pub fn create_for(input: &Path, dir: &Path) -> Result<Self> {
        let name = input
            .file_name()
            .with_context(|| format!("input has no file name: {}", input.display()))?;
        fs::create_dir_all(dir)
            .with_context(|| format!("failed to create output directory: {}", dir.display()))?;
        let path = dir.join(name);
        let file = File::create(&path)
            .with_context(|| format!("failed to create {}", path.display()))?;
        Ok(Self {
            path,
            out: BufWriter::new(file),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Sink for FileSink {
    fn write_line(&mut self, line: &str) -> Result<()> {
        writeln!(self.out, "{}", line)
            .with_context(|| format!("failed to write {}", self.path.display()))
    }

    fn finish(&mut self) -> Result<()> {
        self.out
            .flush()
            .with_context(|| format!("failed to write {}", self.path.display()))
    }
}

/// In-memory sink, one entry per line.
impl Sink for Vec<String> {
    fn write_line(&mut self, line: &str) -> Result<()> {
        self.push(line.to_string());
        Ok(())
    }
}
