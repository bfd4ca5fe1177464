//! Spatial interpolation of scattered samples onto a regular 3D lattice
//!
//! - k-d tree: exact nearest-neighbour index over `(x, y, t)`
//! - Nearest Neighbor: each lattice node takes the value of the closest sample

pub mod kdtree;
mod nearest;

pub use kdtree::{KdTree, NearestResult};
pub use nearest::{
    index_points, interpolate, nearest_neighbor_3d, NearestNeighborParams, SpatialIndex,
};
pub use velgrid_core::Sample;
