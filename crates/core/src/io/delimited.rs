//! Tab-delimited output

use std::io::{BufWriter, Write};

use crate::error::Result;
use crate::pick::CombinedRecord;
use crate::volume::VelocityVolume;

/// Header line of the combined table
pub const COMBINED_HEADER: &str = "Trace\tX\tY\tTWT\tVNMO";

/// Write joined records as a tab-delimited table with a header line.
pub fn write_combined<W: Write>(records: &[CombinedRecord], writer: W) -> Result<()> {
    let mut out = BufWriter::new(writer);
    writeln!(out, "{}", COMBINED_HEADER)?;
    for r in records {
        writeln!(out, "{}\t{}\t{}\t{}\t{}", r.trace, r.x, r.y, r.twt, r.vnmo)?;
    }
    out.flush()?;
    Ok(())
}

/// Write one `X\tY\tTWT\tVALUE` line per node, no header.
///
/// Every field is truncated toward zero to an integer. Rows follow the
/// volume's storage order. Returns the number of rows written.
pub fn write_volume<W: Write>(volume: &VelocityVolume, writer: W) -> Result<usize> {
    let mut out = BufWriter::new(writer);
    let mut rows = 0;
    for (x, y, t, v) in volume.iter_nodes() {
        writeln!(
            out,
            "{}\t{}\t{}\t{}",
            x.trunc() as i64,
            y.trunc() as i64,
            t.trunc() as i64,
            v.trunc() as i64
        )?;
        rows += 1;
    }
    out.flush()?;
    Ok(rows)
}
