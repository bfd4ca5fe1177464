//! Velocity pick tables
//!
//! Whitespace-delimited text, one pick per line:
//!
//! ```text
//! Trace TWT VNMO
//! 1 0 1480
//! 1 1200 2400
//! ```
//!
//! The first line is always treated as a header and skipped.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use crate::error::{Error, Result};
use crate::pick::VelocityPick;

/// Read a pick table from a file
pub fn read_velocity_picks<P: AsRef<Path>>(path: P) -> Result<Vec<VelocityPick>> {
    let file = File::open(path.as_ref())?;
    read_velocity_picks_from(BufReader::new(file))
}

/// Read a pick table from any buffered reader
pub fn read_velocity_picks_from<R: BufRead>(reader: R) -> Result<Vec<VelocityPick>> {
    let mut picks = Vec::new();

    for (idx, line) in reader.lines().enumerate().skip(1) {
        let line = line?;
        let line_no = idx + 1;

        let mut fields = line.split_whitespace();
        let Some(first) = fields.next() else {
            continue;
        };

        let trace = parse_trace(first, line_no)?;
        let twt = parse_field(fields.next(), "TWT", line_no)?;
        let vnmo = parse_field(fields.next(), "VNMO", line_no)?;

        picks.push(VelocityPick { trace, twt, vnmo });
    }

    Ok(picks)
}

fn parse_trace(field: &str, line: usize) -> Result<u32> {
    if let Ok(trace) = field.parse::<u32>() {
        return Ok(trace);
    }

    // Integral floats such as "12.0" are accepted
    match field.parse::<f64>() {
        Ok(v) if v.fract() == 0.0 && (0.0..=u32::MAX as f64).contains(&v) => Ok(v as u32),
        _ => Err(Error::Parse {
            line,
            reason: format!("invalid trace number '{}'", field),
        }),
    }
}

fn parse_field(field: Option<&str>, name: &str, line: usize) -> Result<f64> {
    let field = field.ok_or_else(|| Error::Parse {
        line,
        reason: format!("missing {} column", name),
    })?;

    field.parse::<f64>().map_err(|_| Error::Parse {
        line,
        reason: format!("invalid {} value '{}'", name, field),
    })
}
