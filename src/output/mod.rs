use serde::Serialize;
use std::fs::{self, File};
use std::io::{self, BufWriter, Write};
use std::path::PathBuf;

use crate::error::Result;

/// Writes a result collection as one JSON array
pub struct OutputHandler {
    format: OutputFormat,
    file_path: Option<PathBuf>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// Pretty-printed array
    Json,
    /// Single-line array
    Compact,
}

impl OutputFormat {
    pub fn from_str(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "compact" => OutputFormat::Compact,
            _ => OutputFormat::Json, // Default
        }
    }
}

impl OutputHandler {
    /// `None` writes to stdout
    pub fn new(format: OutputFormat, file_path: Option<PathBuf>) -> Self {
        OutputHandler { format, file_path }
    }

    /// Render `items` as a JSON array; empty input renders as `[]`
    pub fn render<T: Serialize>(&self, items: &[T]) -> Result<String> {
        let json = match self.format {
            OutputFormat::Json => serde_json::to_string_pretty(items)?,
            OutputFormat::Compact => serde_json::to_string(items)?,
        };
        Ok(json)
    }

    /// Write `items`, replacing any previous contents of the target file
    pub fn write_all<T: Serialize>(&self, items: &[T]) -> Result<()> {
        let json = self.render(items)?;
        match &self.file_path {
            Some(path) => {
                if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                    fs::create_dir_all(parent)?;
                }
                let mut writer = BufWriter::new(File::create(path)?);
                writer.write_all(json.as_bytes())?;
                writer.write_all(b"\n")?;
                writer.flush()?;
                log::info!("Wrote {} record(s) to {:?}", items.len(), path);
            }
            None => {
                let mut stdout = io::stdout().lock();
                stdout.write_all(json.as_bytes())?;
                stdout.write_all(b"\n")?;
                stdout.flush()?;
            }
        }
        Ok(())
    }
}
