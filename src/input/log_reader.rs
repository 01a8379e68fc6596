use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::PathBuf;

use crate::error::{AuditError, Result};

/// Reads a static, already-collected auth log from start to end
pub struct LogReader {
    file_path: PathBuf,
}

impl LogReader {
    pub fn new(file_path: PathBuf) -> Self {
        LogReader { file_path }
    }

    /// Read every line in file order, line endings stripped.
    ///
    /// Invalid UTF-8 is replaced rather than rejected so one bad byte cannot
    /// hide the rest of the log.
    pub fn read_lines(&self) -> Result<Vec<String>> {
        if !self.file_path.exists() {
            return Err(AuditError::InputNotFound(self.file_path.clone()));
        }

        let file = File::open(&self.file_path)?;
        let mut reader = BufReader::new(file);
        let mut lines = Vec::new();
        let mut buf = Vec::new();

        loop {
            buf.clear();
            let bytes_read = reader.read_until(b'\n', &mut buf)?;
            if bytes_read == 0 {
                break; // EOF
            }
            let line = String::from_utf8_lossy(&buf);
            lines.push(line.trim_end_matches(['\n', '\r']).to_string());
        }

        log::info!("Read {} line(s) from {:?}", lines.len(), self.file_path);
        Ok(lines)
    }
}
