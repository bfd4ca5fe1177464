//! Minimal SEG-Y reader for trace source coordinates.
//!
//! Only what is needed to locate traces is decoded: the binary file header
//! (sample count, sample format, extended header count) and, per trace, the
//! SourceX / SourceY words of the trace header. Trace samples are skipped.
//! Coordinates are returned raw; the coordinate scalar is not applied.

use std::fs::File;
use std::io::{self, BufReader, Read};
use std::path::Path;

use byteorder::{BigEndian, ByteOrder, LittleEndian};

use crate::error::{Error, Result};
use crate::pick::TracePosition;

pub const TEXTUAL_HEADER_LEN: usize = 3200;
pub const BINARY_HEADER_LEN: usize = 400;
pub const TRACE_HEADER_LEN: usize = 240;

/// Byte offsets inside the 400-byte binary header.
mod binary {
    pub const SAMPLES_PER_TRACE: usize = 20;
    pub const FORMAT_CODE: usize = 24;
    pub const EXTENDED_HEADERS: usize = 304;
}

/// Byte offsets inside the 240-byte trace header.
mod trace {
    pub const SOURCE_X: usize = 72;
    pub const SOURCE_Y: usize = 76;
    pub const SAMPLES: usize = 114;
}

/// Byte order of the SEG-Y file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SegyByteOrder {
    BigEndian,
    LittleEndian,
}

impl SegyByteOrder {
    fn read_i16(self, buf: &[u8]) -> i16 {
        match self {
            SegyByteOrder::BigEndian => BigEndian::read_i16(buf),
            SegyByteOrder::LittleEndian => LittleEndian::read_i16(buf),
        }
    }

    fn read_u16(self, buf: &[u8]) -> u16 {
        match self {
            SegyByteOrder::BigEndian => BigEndian::read_u16(buf),
            SegyByteOrder::LittleEndian => LittleEndian::read_u16(buf),
        }
    }

    fn read_i32(self, buf: &[u8]) -> i32 {
        match self {
            SegyByteOrder::BigEndian => BigEndian::read_i32(buf),
            SegyByteOrder::LittleEndian => LittleEndian::read_i32(buf),
        }
    }
}

/// Bytes per sample for a data sample format code.
fn sample_size(format_code: u16) -> Option<usize> {
    match format_code {
        1 => Some(4),  // IBM float
        2 => Some(4),  // int32
        3 => Some(2),  // int16
        4 => Some(4),  // fixed point with gain
        5 => Some(4),  // IEEE float
        6 => Some(8),  // IEEE double
        7 => Some(3),  // int24
        8 => Some(1),  // int8
        9 => Some(8),  // int64
        10 => Some(4), // uint32
        11 => Some(2), // uint16
        12 => Some(8), // uint64
        15 => Some(3), // uint24
        16 => Some(1), // uint8
        _ => None,
    }
}

/// Decoded fields of the binary file header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SegyHeader {
    pub byte_order: SegyByteOrder,
    pub format_code: u16,
    /// Samples per trace from the binary header (0 = per-trace value)
    pub samples_per_trace: u16,
    pub extended_headers: u16,
}

impl SegyHeader {
    /// Parse the 400-byte binary header, detecting byte order from the
    /// format code.
    pub fn parse(buf: &[u8]) -> Result<Self> {
        if buf.len() < BINARY_HEADER_LEN {
            return Err(Error::InvalidSegy {
                reason: "binary header too short".into(),
            });
        }

        let byte_order = [SegyByteOrder::BigEndian, SegyByteOrder::LittleEndian]
            .into_iter()
            .find(|order| sample_size(order.read_u16(&buf[binary::FORMAT_CODE..])).is_some())
            .ok_or_else(|| Error::InvalidSegy {
                reason: format!(
                    "unknown data sample format code {}",
                    BigEndian::read_u16(&buf[binary::FORMAT_CODE..])
                ),
            })?;

        let extended = byte_order.read_i16(&buf[binary::EXTENDED_HEADERS..]);
        if extended < 0 {
            return Err(Error::InvalidSegy {
                reason: format!(
                    "variable extended textual header count ({}) not supported",
                    extended
                ),
            });
        }

        Ok(Self {
            byte_order,
            format_code: byte_order.read_u16(&buf[binary::FORMAT_CODE..]),
            samples_per_trace: byte_order.read_u16(&buf[binary::SAMPLES_PER_TRACE..]),
            extended_headers: extended as u16,
        })
    }

    /// Bytes per trace sample
    pub fn sample_size(&self) -> usize {
        sample_size(self.format_code).unwrap_or(4)
    }
}

/// Binary header plus the position of every trace.
#[derive(Debug, Clone)]
pub struct SegySurvey {
    pub header: SegyHeader,
    pub positions: Vec<TracePosition>,
}

impl SegySurvey {
    pub fn trace_count(&self) -> usize {
        self.positions.len()
    }

    /// Planar extent as (min_x, min_y, max_x, max_y), `None` for no traces
    pub fn extent(&self) -> Option<(f64, f64, f64, f64)> {
        let first = self.positions.first()?;
        let init = (first.x, first.y, first.x, first.y);
        Some(self.positions.iter().fold(init, |(x0, y0, x1, y1), p| {
            (x0.min(p.x), y0.min(p.y), x1.max(p.x), y1.max(p.y))
        }))
    }
}

/// Read the trace positions of a SEG-Y file
pub fn read_trace_positions<P: AsRef<Path>>(path: P) -> Result<Vec<TracePosition>> {
    Ok(read_survey(path)?.positions)
}

/// Read the trace positions from any byte stream
pub fn read_trace_positions_from<R: Read>(reader: R) -> Result<Vec<TracePosition>> {
    Ok(read_survey_from(reader)?.positions)
}

/// Read header and trace positions of a SEG-Y file
pub fn read_survey<P: AsRef<Path>>(path: P) -> Result<SegySurvey> {
    let file = File::open(path.as_ref())?;
    read_survey_from(BufReader::new(file))
}

/// Read header and trace positions from any byte stream.
///
/// Traces are numbered from 1 in stream order. A clean end of stream between
/// traces terminates the read; a partial trace is an error.
pub fn read_survey_from<R: Read>(mut reader: R) -> Result<SegySurvey> {
    let mut textual = vec![0u8; TEXTUAL_HEADER_LEN];
    if read_full(&mut reader, &mut textual)? != TEXTUAL_HEADER_LEN {
        return Err(Error::InvalidSegy {
            reason: "file shorter than textual header".into(),
        });
    }

    let mut bin = [0u8; BINARY_HEADER_LEN];
    if read_full(&mut reader, &mut bin)? != BINARY_HEADER_LEN {
        return Err(Error::InvalidSegy {
            reason: "file shorter than binary header".into(),
        });
    }
    let header = SegyHeader::parse(&bin)?;

    let extended_len = header.extended_headers as u64 * TEXTUAL_HEADER_LEN as u64;
    if skip(&mut reader, extended_len)? != extended_len {
        return Err(Error::InvalidSegy {
            reason: "truncated extended textual headers".into(),
        });
    }

    let mut positions = Vec::new();
    let mut th = [0u8; TRACE_HEADER_LEN];
    loop {
        let trace_no = positions.len() as u32 + 1;
        match read_full(&mut reader, &mut th)? {
            0 => break,
            TRACE_HEADER_LEN => {}
            n => {
                return Err(Error::InvalidSegy {
                    reason: format!("trace {} header truncated at {} bytes", trace_no, n),
                })
            }
        }

        let order = header.byte_order;
        positions.push(TracePosition {
            trace: trace_no,
            x: order.read_i32(&th[trace::SOURCE_X..]) as f64,
            y: order.read_i32(&th[trace::SOURCE_Y..]) as f64,
        });

        let samples = match header.samples_per_trace {
            0 => order.read_u16(&th[trace::SAMPLES..]),
            n => n,
        };
        let body = samples as u64 * header.sample_size() as u64;
        if skip(&mut reader, body)? != body {
            return Err(Error::InvalidSegy {
                reason: format!("trace {} data truncated", trace_no),
            });
        }
    }

    Ok(SegySurvey { header, positions })
}

/// Fill `buf` as far as the stream allows, returning the bytes read.
fn read_full<R: Read>(reader: &mut R, buf: &mut [u8]) -> io::Result<usize> {
    let mut filled = 0;
    while filled < buf.len() {
        match reader.read(&mut buf[filled..]) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        }
    }
    Ok(filled)
}

fn skip<R: Read>(reader: &mut R, len: u64) -> io::Result<u64> {
    io::copy(&mut reader.by_ref().take(len), &mut io::sink())
}

#[cfg(test)]
mod tests {
    use super::*;
    use byteorder::WriteBytesExt;

    /// Build an in-memory SEG-Y with IEEE float samples.
    fn synthetic<B: ByteOrder>(coords: &[(i32, i32)], samples: u16, extended: i16) -> Vec<u8> {
        let mut out = vec![b' '; TEXTUAL_HEADER_LEN];

        let mut bin = [0u8; BINARY_HEADER_LEN];
        B::write_u16(&mut bin[binary::SAMPLES_PER_TRACE..], samples);
        B::write_u16(&mut bin[binary::FORMAT_CODE..], 5);
        B::write_i16(&mut bin[binary::EXTENDED_HEADERS..], extended);
        out.extend_from_slice(&bin);

        if extended > 0 {
            out.extend(std::iter::repeat(b' ').take(extended as usize * TEXTUAL_HEADER_LEN));
        }

        for &(x, y) in coords {
            let mut th = [0u8; TRACE_HEADER_LEN];
            B::write_i32(&mut th[trace::SOURCE_X..], x);
            B::write_i32(&mut th[trace::SOURCE_Y..], y);
            B::write_u16(&mut th[trace::SAMPLES..], samples);
            out.extend_from_slice(&th);
            for i in 0..samples {
                out.write_f32::<B>(i as f32).unwrap();
            }
        }
        out
    }

    const COORDS: [(i32, i32); 3] = [
        (500_000, 4_100_000),
        (500_025, 4_100_010),
        (499_990, 4_100_020),
    ];

    #[test]
    fn test_read_big_endian() {
        let data = synthetic::<BigEndian>(&COORDS, 8, 0);
        let survey = read_survey_from(data.as_slice()).unwrap();

        assert_eq!(survey.header.byte_order, SegyByteOrder::BigEndian);
        assert_eq!(survey.header.format_code, 5);
        assert_eq!(survey.trace_count(), 3);
        assert_eq!(
            survey.positions[1],
            TracePosition {
                trace: 2,
                x: 500_025.0,
                y: 4_100_010.0,
            }
        );
        assert_eq!(
            survey.extent(),
            Some((499_990.0, 4_100_000.0, 500_025.0, 4_100_020.0))
        );
    }

    #[test]
    fn test_read_little_endian() {
        let data = synthetic::<LittleEndian>(&COORDS, 4, 0);
        let survey = read_survey_from(data.as_slice()).unwrap();
        assert_eq!(survey.header.byte_order, SegyByteOrder::LittleEndian);
        assert_eq!(survey.positions[2].x, 499_990.0);
    }

    #[test]
    fn test_extended_headers_skipped() {
        let data = synthetic::<BigEndian>(&COORDS, 4, 2);
        let survey = read_survey_from(data.as_slice()).unwrap();
        assert_eq!(survey.header.extended_headers, 2);
        assert_eq!(survey.trace_count(), 3);
        assert_eq!(survey.positions[0].y, 4_100_000.0);
    }

    #[test]
    fn test_variable_extended_headers_rejected() {
        let data = synthetic::<BigEndian>(&COORDS, 4, -1);
        assert!(matches!(read_survey_from(data.as_slice()), Err(Error::InvalidSegy { .. })));
    }

    #[test]
    fn test_per_trace_sample_count() {
        // Binary header says 0 samples; each trace header carries 6
        let mut data = synthetic::<BigEndian>(&COORDS, 6, 0);
        let off = TEXTUAL_HEADER_LEN + binary::SAMPLES_PER_TRACE;
        BigEndian::write_u16(&mut data[off..], 0);

        let survey = read_survey_from(data.as_slice()).unwrap();
        assert_eq!(survey.header.samples_per_trace, 0);
        assert_eq!(survey.trace_count(), 3);
    }

    #[test]
    fn test_truncated_trace_rejected() {
        let mut data = synthetic::<BigEndian>(&COORDS, 4, 0);
        data.truncate(data.len() - 3);
        assert!(matches!(read_survey_from(data.as_slice()), Err(Error::InvalidSegy { .. })));

        let mut data = synthetic::<BigEndian>(&COORDS, 4, 0);
        data.extend_from_slice(&[0u8; 100]);
        assert!(matches!(read_survey_from(data.as_slice()), Err(Error::InvalidSegy { .. })));
    }

    #[test]
    fn test_unknown_format_rejected() {
        let mut data = synthetic::<BigEndian>(&COORDS, 4, 0);
        let off = TEXTUAL_HEADER_LEN + binary::FORMAT_CODE;
        data[off] = 0x7f;
        data[off + 1] = 0x7f;
        assert!(matches!(read_survey_from(data.as_slice()), Err(Error::InvalidSegy { .. })));
    }

    #[test]
    fn test_short_file_rejected() {
        let data = vec![0u8; 1000];
        assert!(matches!(read_survey_from(data.as_slice()), Err(Error::InvalidSegy { .. })));
    }

    #[test]
    fn test_trace_positions_numbered_in_file_order() {
        let data = synthetic::<LittleEndian>(&COORDS, 4, 1);
        let positions = read_trace_positions_from(data.as_slice()).unwrap();

        let traces: Vec<u32> = positions.iter().map(|p| p.trace).collect();
        assert_eq!(traces, vec![1, 2, 3]);
        assert_eq!(positions[2].y, 4_100_020.0);
    }

    #[test]
    fn test_trace_positions_from_path() {
        let path =
            std::env::temp_dir().join(format!("velgrid_positions_{}.sgy", std::process::id()));
        std::fs::write(&path, synthetic::<BigEndian>(&COORDS, 4, 0)).unwrap();
        let positions = read_trace_positions(&path);
        std::fs::remove_file(&path).unwrap();

        assert_eq!(positions.unwrap().len(), 3);
        assert!(read_trace_positions(&path).is_err());
    }

    #[test]
    fn test_no_traces() {
        let data = synthetic::<BigEndian>(&[], 4, 0);
        let survey = read_survey_from(data.as_slice()).unwrap();
        assert_eq!(survey.trace_count(), 0);
        assert_eq!(survey.extent(), None);
    }
}
