//! Nearest Neighbor interpolation onto a 3D lattice
//!
//! Assigns each lattice node the value of the closest sample under plain
//! Euclidean distance in raw `(x, y, t)` units, producing a 3D Voronoi-like
//! tessellation of the input values. No axis is rescaled, so with x/y in
//! metres and t in milliseconds the larger-valued axis dominates.

use crate::maybe_rayon::*;
use velgrid_core::{build_lattice, Error, LatticeAxes, LatticeSpec, Result, VelocityVolume};

use super::kdtree::{KdTree, NearestResult};
use super::Sample;

/// Parameters for Nearest Neighbor interpolation
#[derive(Debug, Clone, Default)]
pub struct NearestNeighborParams {
    /// Refuse lattices with more nodes than this. `None` for no limit
    /// beyond what can be allocated.
    pub max_nodes: Option<usize>,
}

impl NearestNeighborParams {
    /// # Errors
    /// [`Error::InvalidParameter`] if `max_nodes` is zero, since every
    /// lattice has at least one node.
    pub fn validate(&self) -> Result<()> {
        if self.max_nodes == Some(0) {
            return Err(Error::InvalidParameter {
                name: "max_nodes",
                value: "0".to_string(),
                reason: "must be at least 1".to_string(),
            });
        }
        Ok(())
    }
}

/// A non-empty nearest-neighbor index over samples.
#[derive(Debug)]
pub struct SpatialIndex {
    tree: KdTree,
}

impl SpatialIndex {
    /// Number of indexed samples (always at least one)
    pub fn len(&self) -> usize {
        self.tree.len()
    }

    /// Always false; kept for API symmetry with `len`
    pub fn is_empty(&self) -> bool {
        false
    }

    pub fn tree(&self) -> &KdTree {
        &self.tree
    }

    /// Nearest sample to `q = [x, y, t]`; equidistant samples resolve to the
    /// lowest input index
    #[inline]
    pub fn nearest(&self, q: [f64; 3]) -> NearestResult {
        self.tree.search(q)
    }

    /// Value of the nearest sample to `q`
    #[inline]
    pub fn value_at(&self, q: [f64; 3]) -> f64 {
        self.nearest(q).sample.value
    }
}

/// Build a nearest-neighbor index over the `(x, y, t)` of `samples`.
///
/// # Errors
/// [`Error::EmptyPointCloud`] if `samples` is empty.
pub fn index_points(samples: &[Sample]) -> Result<SpatialIndex> {
    if samples.is_empty() {
        return Err(Error::EmptyPointCloud);
    }
    Ok(SpatialIndex {
        tree: KdTree::build(samples),
    })
}

/// Evaluate `index` at every node of `axes`.
///
/// Nodes are visited Y outermost, X in the middle and TWT innermost; the
/// returned volume stores them in that order. Rows of constant Y are
/// independent and may be computed in parallel; the result does not depend
/// on the thread count.
///
/// # Errors
/// [`Error::InvalidParameter`] if `params` is invalid,
/// [`Error::LatticeTooLarge`] if the node count exceeds `params.max_nodes`
/// or the output buffer cannot be allocated.
pub fn interpolate(
    index: &SpatialIndex,
    axes: &LatticeAxes,
    params: &NearestNeighborParams,
) -> Result<VelocityVolume> {
    params.validate()?;
    let n = axes.node_count()?;

    if let Some(max_nodes) = params.max_nodes {
        if n > max_nodes {
            return Err(Error::LatticeTooLarge {
                reason: format!("{} nodes exceeds the limit of {}", n, max_nodes),
            });
        }
    }

    let mut values: Vec<f64> = Vec::new();
    values.try_reserve_exact(n).map_err(|e| Error::LatticeTooLarge {
        reason: format!("cannot allocate {} nodes: {}", n, e),
    })?;
    values.resize(n, f64::NAN);

    let nt = axes.nt();
    let row_len = axes.nx() * nt;

    values
        .par_chunks_mut(row_len)
        .enumerate()
        .for_each(|(iy, row)| {
            let y = axes.ys()[iy];
            for (ix, &x) in axes.xs().iter().enumerate() {
                let col = &mut row[ix * nt..(ix + 1) * nt];
                for (cell, &t) in col.iter_mut().zip(axes.ts()) {
                    *cell = index.value_at([x, y, t]);
                }
            }
        });

    VelocityVolume::from_vec(axes.clone(), values)
}

/// Grid `samples` onto the lattice described by `spec`.
///
/// Equivalent to [`build_lattice`], [`index_points`] and [`interpolate`] in
/// sequence.
pub fn nearest_neighbor_3d(
    samples: &[Sample],
    spec: &LatticeSpec,
    params: &NearestNeighborParams,
) -> Result<VelocityVolume> {
    let axes = build_lattice(spec)?;
    let index = index_points(samples)?;
    interpolate(&index, &axes, params)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_points() -> Vec<Sample> {
        vec![
            Sample::new(2.0, 8.0, 0.0, 1500.0),  // near top-left, shallow
            Sample::new(8.0, 8.0, 0.0, 1600.0),  // near top-right, shallow
            Sample::new(2.0, 2.0, 10.0, 2500.0), // near bottom-left, deep
            Sample::new(8.0, 2.0, 10.0, 2600.0), // near bottom-right, deep
        ]
    }

    fn spec() -> LatticeSpec {
        LatticeSpec {
            x_min: 0.0,
            x_max: 10.0,
            x_step: 1.0,
            y_min: 0.0,
            y_max: 10.0,
            y_step: 1.0,
            t_min: 0.0,
            t_max: 10.0,
            t_step: 2.0,
        }
    }

    #[test]
    fn test_values_come_from_samples() {
        let pts = sample_points();
        let volume = nearest_neighbor_3d(&pts, &spec(), &Default::default()).unwrap();

        assert_eq!(volume.shape(), (11, 11, 6));
        for &v in volume.data().iter() {
            assert!(
                pts.iter().any(|p| p.value == v),
                "Unexpected value {}",
                v
            );
        }
    }

    #[test]
    fn test_voronoi_corners() {
        let volume = nearest_neighbor_3d(&sample_points(), &spec(), &Default::default()).unwrap();

        // (x=0, y=10, t=0) is closest to (2, 8, 0)
        assert_eq!(volume.get(0, 10, 0).unwrap(), 1500.0);
        // (x=10, y=0, t=10) is closest to (8, 2, 10)
        assert_eq!(volume.get(10, 0, 5).unwrap(), 2600.0);
    }

    #[test]
    fn test_matches_direct_queries() {
        let pts = sample_points();
        let axes = build_lattice(&spec()).unwrap();
        let index = index_points(&pts).unwrap();
        let volume = interpolate(&index, &axes, &Default::default()).unwrap();

        for (x, y, t, v) in volume.iter_nodes() {
            let best = pts
                .iter()
                .map(|p| (p.dist_sq(x, y, t), p.value))
                .fold((f64::INFINITY, f64::NAN), |a, b| if b.0 < a.0 { b } else { a });
            assert_eq!(v, best.1, "at ({}, {}, {})", x, y, t);
        }
    }

    #[test]
    fn test_single_sample_fills_volume() {
        let pts = vec![Sample::new(5.0, 5.0, 5.0, 99.0)];
        let volume = nearest_neighbor_3d(&pts, &spec(), &Default::default()).unwrap();
        assert!(volume.data().iter().all(|&v| v == 99.0));
    }

    #[test]
    fn test_two_sample_midpoint() {
        let pts = vec![
            Sample::new(0.0, 0.0, 0.0, 100.0),
            Sample::new(10.0, 0.0, 0.0, 200.0),
        ];
        let index = index_points(&pts).unwrap();
        assert_eq!(index.value_at([3.0, 0.0, 0.0]), 100.0);
        assert_eq!(index.value_at([7.0, 0.0, 0.0]), 200.0);
        assert_eq!(index.value_at([5.0, 0.0, 0.0]), 100.0);
    }

    #[test]
    fn test_idempotent() {
        let pts = sample_points();
        let axes = build_lattice(&spec()).unwrap();
        let index = index_points(&pts).unwrap();

        let a = interpolate(&index, &axes, &Default::default()).unwrap();
        let b = interpolate(&index, &axes, &Default::default()).unwrap();
        let bits = |v: &VelocityVolume| v.data().iter().map(|x| x.to_bits()).collect::<Vec<_>>();
        assert_eq!(bits(&a), bits(&b));
    }

    #[test]
    fn test_batch_query_matches_volume() {
        let pts = sample_points();
        let axes = build_lattice(&spec()).unwrap();
        let index = index_points(&pts).unwrap();
        let volume = interpolate(&index, &axes, &Default::default()).unwrap();

        let queries: Vec<[f64; 3]> = axes.nodes().collect();
        let batch = index.tree().nearest_batch(&queries);
        for (r, &v) in batch.iter().zip(volume.data().iter()) {
            assert_eq!(r.unwrap().sample.value, v);
        }
    }

    #[test]
    fn test_empty_point_cloud() {
        assert!(matches!(index_points(&[]), Err(Error::EmptyPointCloud)));
        assert!(matches!(
            nearest_neighbor_3d(&[], &spec(), &Default::default()),
            Err(Error::EmptyPointCloud)
        ));
    }

    #[test]
    fn test_invalid_lattice() {
        let pts = sample_points();
        let zero_step = LatticeSpec {
            x_step: 0.0,
            ..spec()
        };
        assert!(matches!(
            nearest_neighbor_3d(&pts, &zero_step, &Default::default()),
            Err(Error::InvalidLattice { .. })
        ));

        let inverted = LatticeSpec {
            x_min: 10.0,
            x_max: 0.0,
            ..spec()
        };
        assert!(matches!(
            nearest_neighbor_3d(&pts, &inverted, &Default::default()),
            Err(Error::InvalidLattice { .. })
        ));
    }

    #[test]
    fn test_max_nodes_limit() {
        let params = NearestNeighborParams {
            max_nodes: Some(100),
        };
        let result = nearest_neighbor_3d(&sample_points(), &spec(), &params);
        assert!(matches!(result, Err(Error::LatticeTooLarge { .. })));

        let params = NearestNeighborParams {
            max_nodes: Some(11 * 11 * 6),
        };
        assert!(nearest_neighbor_3d(&sample_points(), &spec(), &params).is_ok());
    }

    #[test]
    fn test_zero_max_nodes_rejected() {
        let params = NearestNeighborParams { max_nodes: Some(0) };
        assert!(matches!(
            nearest_neighbor_3d(&sample_points(), &spec(), &params),
            Err(Error::InvalidParameter {
                name: "max_nodes",
                ..
            })
        ));
        assert!(NearestNeighborParams::default().validate().is_ok());
    }

    #[cfg(feature = "parallel")]
    #[test]
    fn test_single_thread_matches_default_pool() {
        let pts: Vec<Sample> = (0..200)
            .map(|i| {
                let f = i as f64;
                Sample::new((f * 7.3) % 10.0, (f * 3.1) % 10.0, (f * 1.7) % 10.0, f)
            })
            .collect();
        let axes = build_lattice(&spec()).unwrap();
        let index = index_points(&pts).unwrap();
        let bits = |v: &VelocityVolume| v.data().iter().map(|x| x.to_bits()).collect::<Vec<_>>();

        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(1)
            .build()
            .unwrap();
        let single = pool
            .install(|| interpolate(&index, &axes, &Default::default()))
            .unwrap();
        let default = interpolate(&index, &axes, &Default::default()).unwrap();

        assert_eq!(bits(&single), bits(&default));
    }
}
