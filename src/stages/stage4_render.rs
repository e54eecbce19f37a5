use std::io::BufWriter;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::ValueEnum;
use tracing::info;

use crate::io::{write_csv, write_json_lines};
use crate::models::ResolvedRecord;

/// Output table encoding
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Csv,
    /// One JSON object per line
    Jsonl,
}

/// Configuration for rendering
#[derive(Debug, Clone)]
pub struct RenderConfig {
    pub format: OutputFormat,
    /// Prefix CSV output with a UTF-8 byte-order mark
    pub byte_order_mark: bool,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            format: OutputFormat::Csv,
            byte_order_mark: true,
        }
    }
}

/// Result of rendering
#[derive(Debug)]
pub struct RenderResult {
    pub path: PathBuf,
    pub records_written: usize,
}

/// Write the full record table to `path` in one pass
pub fn execute_render(
    records: &[ResolvedRecord],
    path: &Path,
    config: &RenderConfig,
) -> Result<RenderResult> {
    info!("Writing {} records to {:?}", records.len(), path);

    let file = std::fs::File::create(path)
        .with_context(|| format!("Failed to create file: {:?}", path))?;
    let writer = BufWriter::new(file);

    match config.format {
        OutputFormat::Csv => write_csv(writer, records, config.byte_order_mark)?,
        OutputFormat::Jsonl => write_json_lines(writer, records)?,
    }

    Ok(RenderResult {
        path: path.to_path_buf(),
        records_written: records.len(),
    })
}
