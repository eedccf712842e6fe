//! Flat CSV log of per-tick statistics.
//!
//! One headerless row per tick: `lightPercent,darkPercent,temperature`.
//! Downstream plotting reads the columns by position, so the order and the
//! lack of a header are fixed.

use anyhow::{Context, Result};
use daisy_core::StepStatistics;
use std::fs::{File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::Path;
use tracing::info;

pub struct StatsLog<W: Write> {
    writer: W,
    rows: u64,
}

impl StatsLog<BufWriter<File>> {
    /// Create the log file if missing, truncating it unless `append` is set
    pub fn create(path: impl AsRef<Path>, append: bool) -> Result<Self> {
        let path = path.as_ref();
        let existed = path.exists();

        let mut options = OpenOptions::new();
        options.create(true);
        if append {
            options.append(true);
        } else {
            options.write(true).truncate(true);
        }

        let file = options
            .open(path)
            .with_context(|| format!("failed to open statistics log {}", path.display()))?;

        if !existed {
            info!(path = %path.display(), "New statistics log created");
        }

        Ok(Self::new(BufWriter::new(file)))
    }
}

impl<W: Write> StatsLog<W> {
    pub fn new(writer: W) -> Self {
        Self { writer, rows: 0 }
    }

    pub fn record(&mut self, stats: &StepStatistics) -> Result<()> {
        writeln!(self.writer, "{}", format_row(stats)).context("failed to write statistics row")?;
        self.rows += 1;
        Ok(())
    }

    pub fn flush(&mut self) -> Result<()> {
        self.writer.flush().context("failed to flush statistics log")
    }

    pub fn rows(&self) -> u64 {
        self.rows
    }

    pub fn into_inner(self) -> W {
        self.writer
    }
}

/// Format one log row
pub fn format_row(stats: &StepStatistics) -> String {
    format!("{},{},{}", stats.light_percent, stats.dark_percent, stats.temperature)
}
