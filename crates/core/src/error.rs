//! Error types for velgrid

use thiserror::Error;

use crate::lattice::Axis;

/// Main error type for velgrid operations
#[derive(Error, Debug)]
pub enum Error {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid lattice on {axis} axis: {reason}")]
    InvalidLattice { axis: Axis, reason: String },

    #[error("No samples to index")]
    EmptyPointCloud,

    #[error("Lattice too large: {reason}")]
    LatticeTooLarge { reason: String },

    #[error("Node ({ix}, {iy}, {it}) out of bounds in volume of size ({nx}, {ny}, {nt})")]
    NodeOutOfBounds {
        ix: usize,
        iy: usize,
        it: usize,
        nx: usize,
        ny: usize,
        nt: usize,
    },

    #[error("Volume size mismatch: expected {expected} values, got {actual}")]
    SizeMismatch { expected: usize, actual: usize },

    #[error("Invalid SEG-Y: {reason}")]
    InvalidSegy { reason: String },

    #[error("Parse error at line {line}: {reason}")]
    Parse { line: usize, reason: String },

    #[error("Invalid parameter: {name} = {value} ({reason})")]
    InvalidParameter {
        name: &'static str,
        value: String,
        reason: String,
    },

    #[error("{0}")]
    Other(String),
}

/// Result type alias for velgrid operations
pub type Result<T> = std::result::Result<T, Error>;
