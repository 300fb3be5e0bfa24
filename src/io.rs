use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::Path;

use crate::engine::Translation;
use crate::error::VmError;
use crate::translation::AccessKind;

/// One parsed trace reference.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TraceEntry {
    pub address: u32,
    pub kind: AccessKind,
}

/// Parse a whole trace file into memory.
///
/// Each line carries a decimal address, optionally followed by `R` or `W`.
/// A bare address counts as a read; blank lines are skipped.
pub fn read_trace<P: AsRef<Path>>(path: P) -> Result<Vec<TraceEntry>, VmError> {
    let file = File::open(path)?;

    let mut entries = Vec::new();
    for (idx, line) in BufReader::new(file).lines().enumerate() {
        let line = line?;
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }
        let entry = parse_line(trimmed).ok_or_else(|| VmError::MalformedTraceLine {
            line: idx + 1,
            content: trimmed.to_owned(),
        })?;
        entries.push(entry);
    }
    Ok(entries)
}

fn parse_line(line: &str) -> Option<TraceEntry> {
    // The marker may sit flush against the number, so split at the first
    // non-digit rather than on whitespace.
    let digits_end = line
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(line.len());
    let (number, rest) = line.split_at(digits_end);
    let address = number.parse().ok()?;

    let kind = match rest.trim() {
        "" | "R" | "r" => AccessKind::Read,
        "W" | "w" => AccessKind::Write,
        _ => return None,
    };

    Some(TraceEntry { address, kind })
}

/// Write the per-address report, one translated reference per line.
pub fn write_report<P: AsRef<Path>>(path: P, results: &[Translation]) -> Result<(), VmError> {
    let mut out = BufWriter::new(File::create(path)?);
    for t in results {
        writeln!(
            out,
            "Virtual address: {} Physical address: {} Value: {}",
            t.virtual_address, t.physical_address, t.value
        )?;
    }
    out.flush()?;
    Ok(())
}
