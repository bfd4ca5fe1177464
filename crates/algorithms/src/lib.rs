//! # velgrid Algorithms
//!
//! Gridding algorithms for scattered seismic velocity picks.
//!
//! - **interpolation**: 3D k-d tree spatial index and nearest-neighbour
//!   interpolation of a point cloud onto a regular lattice

pub mod interpolation;
mod maybe_rayon;

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::interpolation::{
        index_points, interpolate, nearest_neighbor_3d, KdTree, NearestNeighborParams,
        NearestResult, SpatialIndex,
    };
    pub use velgrid_core::prelude::*;
}
