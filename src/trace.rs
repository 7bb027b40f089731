//! Optional debug trace of provider traffic.

use anyhow::{Context, Result};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

/// Debug trace sink. Disabled traces swallow every note.
#[derive(Default)]
pub struct Trace {
    out: Option<BufWriter<File>>,
}

impl Trace {
    pub fn disabled() -> Self {
        Self::default()
    }

    pub fn to_file(path: &Path) -> Result<Self> {
        let file = File::create(path)
            .with_context(|| format!("failed to create debug trace {}", path.display()))?;
        Ok(Self {
            out: Some(BufWriter::new(file)),
        })
    }

    pub fn note(&mut self, text: &str) -> Result<()> {
        if let Some(out) = self.out.as_mut() {
            writeln!(out, "{}", text).context("failed to write debug trace")?;
        }
        Ok(())
    }

    /// Separator between requests.
    pub fn rule(&mut self) -> Result<()> {
        self.note(&format!("\n{}", "_".repeat(70)))
    }
}
