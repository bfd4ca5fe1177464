//! I/O for survey geometry, pick tables and delimited output
//!
//! - `segy`: trace source coordinates from SEG-Y trace headers
//! - `picks`: whitespace-delimited `Trace TWT VNMO` tables
//! - `delimited`: tab-delimited combined tables and interpolated volumes

mod delimited;
mod picks;
pub mod segy;

pub use delimited::{write_combined, write_volume, COMBINED_HEADER};
pub use picks::{read_velocity_picks, read_velocity_picks_from};
pub use segy::{
    read_survey, read_survey_from, read_trace_positions, read_trace_positions_from,
    SegyByteOrder, SegyHeader, SegySurvey,
};
