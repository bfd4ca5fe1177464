//! # velgrid Core
//!
//! Core types, errors and I/O for gridding seismic velocity picks.
//!
//! This crate provides:
//! - `Sample`: one scattered `(x, y, twt, value)` observation
//! - `LatticeSpec` / `LatticeAxes`: the regular 3D lattice and its realised axes
//! - `VelocityVolume`: the dense interpolated grid
//! - Trace position / velocity pick records and their join
//! - I/O for SEG-Y trace coordinates, pick tables and delimited output

pub mod error;
pub mod io;
pub mod lattice;
pub mod pick;
pub mod sample;
pub mod volume;

pub use error::{Error, Result};
pub use lattice::{build_lattice, Axis, LatticeAxes, LatticeSpec};
pub use pick::{
    join_coverage, join_on_trace, CombinedRecord, JoinCoverage, TracePosition, VelocityPick,
};
pub use sample::Sample;
pub use volume::{VelocityVolume, VolumeStatistics};

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::error::{Error, Result};
    pub use crate::lattice::{build_lattice, Axis, LatticeAxes, LatticeSpec};
    pub use crate::pick::{
        join_coverage, join_on_trace, CombinedRecord, JoinCoverage, TracePosition, VelocityPick,
    };
    pub use crate::sample::Sample;
    pub use crate::volume::{VelocityVolume, VolumeStatistics};
}
