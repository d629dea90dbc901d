//! File-based drip source.
//!
//! Tails an append-only drip log, one timestamp per line.

use std::fs::{self, File};
use std::io::{Read, Seek, SeekFrom};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use dripwatch_sdk::Timestamp;
use tracing::{debug, warn};

use super::{parse_drip_line, DripSource};

/// A drip source that tails an append-only log file.
///
/// A sensor relay appends one line per drip; this source remembers how far
/// it has read and only returns lines appended since the previous poll. A
/// trailing line without its newline is held back until it is complete.
///
/// If the file shrinks it is assumed to have been truncated or rotated, and
/// reading restarts from the beginning.
#[derive(Debug)]
pub struct FileSource {
    path: PathBuf,
    description: String,
    last_error: Option<String>,
    /// Bytes consumed so far
    offset: u64,
    /// Incomplete last line carried over to the next poll, undecoded
    partial: Vec<u8>,
    /// Complete lines consumed so far, for error messages
    line_number: usize,
}

impl FileSource {
    /// Create a new file source for the given path.
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        let path = path.as_ref().to_path_buf();
        let description = format!("file: {}", path.display());
        Self {
            path,
            description,
            last_error: None,
            offset: 0,
            partial: Vec::new(),
            line_number: 0,
        }
    }

    /// Returns the path being tailed.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Append everything written since the last poll to `partial`.
    fn read_appended(&mut self) -> std::io::Result<()> {
        let mut file = File::open(&self.path)?;
        let len = file.metadata()?.len();

        if len < self.offset {
            debug!(path = %self.path.display(), "Drip log truncated, restarting");
            self.offset = 0;
            self.partial.clear();
            self.line_number = 0;
        }

        file.seek(SeekFrom::Start(self.offset))?;
        let read = file.read_to_end(&mut self.partial)?;
        self.offset += read as u64;
        Ok(())
    }
}

impl DripSource for FileSource {
    fn poll(&mut self) -> Vec<Timestamp> {
        if let Err(e) = self.read_appended() {
            self.last_error = Some(format!("Read error: {}", e));
            return Vec::new();
        }
        self.last_error = None;

        // Everything up to the last newline is complete. Decoding only
        // complete lines keeps a multibyte character split across two
        // writes intact.
        let Some(end) = self.partial.iter().rposition(|&b| b == b'\n') else {
            return Vec::new();
        };
        let complete: Vec<u8> = self.partial.drain(..=end).collect();
        let complete = String::from_utf8_lossy(&complete);

        let mut drips = Vec::new();
        for line in complete.lines() {
            self.line_number += 1;
            match parse_drip_line(line) {
                Ok(Some(drip)) => drips.push(drip),
                Ok(None) => {}
                Err(e) => {
                    warn!(source = %self.description, line = self.line_number, error = %e, "Skipping malformed drip line");
                    self.last_error = Some(format!("Parse error on line {}: {}", self.line_number, e));
                }
            }
        }
        drips
    }

    fn description(&self) -> &str {
        &self.description
    }

    fn error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }
}

/// Load a complete drip log.
///
/// Unlike [`FileSource`], any malformed line is an error, reported with its
/// line number. A final line without a trailing newline is accepted.
pub fn load_drip_log<P: AsRef<Path>>(path: P) -> Result<Vec<Timestamp>> {
    let path = path.as_ref();
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read drip log {}", path.display()))?;

    let mut drips = Vec::new();
    for (index, line) in content.lines().enumerate() {
        let parsed = parse_drip_line(line)
            .with_context(|| format!("{}:{}: malformed drip line", path.display(), index + 1))?;
        drips.extend(parsed);
    }
    Ok(drips)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn secs(s: u64) -> Timestamp {
        Timestamp::from_secs(s)
    }

    #[test]
    fn test_file_source_new() {
        let source = FileSource::new("/tmp/drips.log");
        assert_eq!(source.path(), Path::new("/tmp/drips.log"));
        assert_eq!(source.description(), "file: /tmp/drips.log");
        assert!(source.error().is_none());
    }

    #[test]
    fn test_file_source_poll_reads_file() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "# bed 4").unwrap();
        writeln!(file, "1").unwrap();
        writeln!(file, "2.5").unwrap();
        writeln!(file).unwrap();
        writeln!(file, "4").unwrap();

        let mut source = FileSource::new(file.path());

        let drips = source.poll();
        assert_eq!(drips, vec![secs(1), Timestamp::from_millis(2500), secs(4)]);

        // Nothing appended, nothing returned
        assert!(source.poll().is_empty());
        assert!(source.error().is_none());
    }

    #[test]
    fn test_file_source_returns_only_appended_lines() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "1").unwrap();

        let mut source = FileSource::new(file.path());
        assert_eq!(source.poll(), vec![secs(1)]);

        writeln!(file, "2").unwrap();
        writeln!(file, "3").unwrap();
        file.flush().unwrap();

        assert_eq!(source.poll(), vec![secs(2), secs(3)]);
    }

    #[test]
    fn test_file_source_holds_incomplete_line() {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, "1\n2").unwrap();
        file.flush().unwrap();

        let mut source = FileSource::new(file.path());
        assert_eq!(source.poll(), vec![secs(1)]);

        // The writer finishes the line
        writeln!(file, "0").unwrap();
        file.flush().unwrap();
        assert_eq!(source.poll(), vec![secs(20)]);
    }

    #[test]
    fn test_file_source_keeps_split_multibyte_character() {
        let mut file = NamedTempFile::new().unwrap();
        // A relay that pads with a no-break space (0xC2 0xA0)
        let line = "\u{a0}5\n".as_bytes();

        // The writer flushes in the middle of the character
        file.write_all(&line[..1]).unwrap();
        file.flush().unwrap();
        let mut source = FileSource::new(file.path());
        assert!(source.poll().is_empty());

        file.write_all(&line[1..]).unwrap();
        file.flush().unwrap();

        // Decoded whole, the padding trims away and the drip counts
        assert_eq!(source.poll(), vec![secs(5)]);
        assert!(source.error().is_none());
    }

    #[test]
    fn test_file_source_skips_malformed_lines() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "1").unwrap();
        writeln!(file, "garbage").unwrap();
        writeln!(file, "3").unwrap();

        let mut source = FileSource::new(file.path());

        assert_eq!(source.poll(), vec![secs(1), secs(3)]);
        let err = source.error().unwrap();
        assert!(err.contains("Parse error on line 2"));

        // The error clears on the next clean poll
        writeln!(file, "4").unwrap();
        file.flush().unwrap();
        assert_eq!(source.poll(), vec![secs(4)]);
        assert!(source.error().is_none());
    }

    #[test]
    fn test_file_source_restarts_after_truncation() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "100").unwrap();
        writeln!(file, "101").unwrap();

        let mut source = FileSource::new(file.path());
        assert_eq!(source.poll().len(), 2);

        // Rotate: replace with a shorter log
        std::fs::write(file.path(), "7\n").unwrap();
        assert_eq!(source.poll(), vec![secs(7)]);
    }

    #[test]
    fn test_file_source_missing_file() {
        let mut source = FileSource::new("/nonexistent/path/drips.log");

        assert!(source.poll().is_empty());
        assert!(source.error().is_some());
        assert!(source.error().unwrap().contains("Read error"));
    }

    #[test]
    fn test_load_drip_log() {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, "# replay\n0\n3\n\n6").unwrap();
        file.flush().unwrap();

        let drips = load_drip_log(file.path()).unwrap();
        assert_eq!(drips, vec![secs(0), secs(3), secs(6)]);
    }

    #[test]
    fn test_load_drip_log_reports_line_number() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "0").unwrap();
        writeln!(file, "1").unwrap();
        writeln!(file, "two").unwrap();

        let err = load_drip_log(file.path()).unwrap_err();
        assert!(format!("{:#}", err).contains(":3: malformed drip line"));
    }

    #[test]
    fn test_load_drip_log_missing_file() {
        let err = load_drip_log("/nonexistent/drips.log").unwrap_err();
        assert!(err.to_string().contains("Failed to read drip log"));
    }
}
