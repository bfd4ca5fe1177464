//! 3D k-d tree for spatial indexing
//!
//! Provides O(log n) exact nearest-neighbor queries over the `(x, y, t)`
//! coordinates of scattered samples, using plain squared Euclidean distance
//! in raw units.
//!
//! Ties are resolved by input position: among samples at exactly the same
//! distance, the one that came first in the slice passed to [`KdTree::build`]
//! wins. The answer is therefore independent of the tree layout.
//!
//! Reference:
//! Bentley, J.L. (1975). Multidimensional binary search trees used
//! for associative searching. CACM, 18(9).

use std::cmp::Ordering;

use crate::maybe_rayon::*;

use super::Sample;

const DIMS: usize = 3;

/// A 3D k-d tree for efficient spatial queries on samples.
#[derive(Debug)]
pub struct KdTree {
    nodes: Vec<KdNode>,
    /// Samples in input order; `index` in results refers to this order
    points: Vec<Sample>,
}

#[derive(Debug)]
struct KdNode {
    /// Index into `points`
    point_idx: usize,
    /// Split dimension: 0 = x, 1 = y, 2 = t
    split_dim: u8,
    left: Option<usize>,
    right: Option<usize>,
}

/// Result of a nearest-neighbor query
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NearestResult {
    pub sample: Sample,
    pub distance_sq: f64,
    /// Position of `sample` in the input slice
    pub index: usize,
}

impl KdTree {
    /// Build a k-d tree from samples.
    ///
    /// Construction is O(n log n) using median splits, cycling x, y, t.
    pub fn build(points: &[Sample]) -> Self {
        let stored_points: Vec<Sample> = points.to_vec();
        let mut indices: Vec<usize> = (0..points.len()).collect();
        let mut nodes = Vec::with_capacity(points.len());

        if !indices.is_empty() {
            build_recursive(&stored_points, &mut indices, 0, &mut nodes);
        }

        Self {
            nodes,
            points: stored_points,
        }
    }

    /// Number of points in the tree.
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Whether the tree is empty.
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Samples in input order.
    pub fn points(&self) -> &[Sample] {
        &self.points
    }

    /// Find the single nearest sample to `q = [x, y, t]`.
    ///
    /// Returns `None` if the tree is empty.
    /// Complexity: O(log n) average case.
    pub fn nearest(&self, q: [f64; 3]) -> Option<NearestResult> {
        if self.nodes.is_empty() {
            return None;
        }
        Some(self.search(q))
    }

    /// Answer many nearest-neighbor queries in one call.
    ///
    /// `results[i]` is the answer for `queries[i]`, identical to calling
    /// [`KdTree::nearest`] for each query.
    pub fn nearest_batch(&self, queries: &[[f64; 3]]) -> Vec<Option<NearestResult>> {
        queries.par_iter().map(|&q| self.nearest(q)).collect()
    }

    /// Nearest sample to `q`. The tree must be non-empty.
    pub(crate) fn search(&self, q: [f64; 3]) -> NearestResult {
        let mut best_dist_sq = f64::INFINITY;
        let mut best_idx = usize::MAX;

        self.nearest_recursive(0, &q, &mut best_dist_sq, &mut best_idx);

        // Only reachable with NaN coordinates
        if best_idx == usize::MAX {
            best_idx = self.nodes[0].point_idx;
            best_dist_sq = f64::NAN;
        }

        NearestResult {
            sample: self.points[best_idx],
            distance_sq: best_dist_sq,
            index: best_idx,
        }
    }

    fn nearest_recursive(
        &self,
        node_idx: usize,
        q: &[f64; 3],
        best_dist_sq: &mut f64,
        best_idx: &mut usize,
    ) {
        let node = &self.nodes[node_idx];
        let p = &self.points[node.point_idx];

        let d = [q[0] - p.x, q[1] - p.y, q[2] - p.t];
        let dist_sq = d[0] * d[0] + d[1] * d[1] + d[2] * d[2];

        if dist_sq < *best_dist_sq || (dist_sq == *best_dist_sq && node.point_idx < *best_idx) {
            *best_dist_sq = dist_sq;
            *best_idx = node.point_idx;
        }

        // Search the closer side first
        let diff = d[node.split_dim as usize];
        let (first, second) = if diff < 0.0 {
            (node.left, node.right)
        } else {
            (node.right, node.left)
        };

        if let Some(child) = first {
            self.nearest_recursive(child, q, best_dist_sq, best_idx);
        }

        // `<=` so equidistant samples with a lower index on the far side are found
        if diff * diff <= *best_dist_sq {
            if let Some(child) = second {
                self.nearest_recursive(child, q, best_dist_sq, best_idx);
            }
        }
    }
}

/// Total order on (coordinate, input index) along one dimension.
fn axis_order(points: &[Sample], dim: usize, a: usize, b: usize) -> Ordering {
    points[a]
        .coord(dim)
        .total_cmp(&points[b].coord(dim))
        .then(a.cmp(&b))
}

/// Recursively build the k-d tree in place over `indices`.
fn build_recursive(
    points: &[Sample],
    indices: &mut [usize],
    depth: usize,
    nodes: &mut Vec<KdNode>,
) -> usize {
    let dim = depth % DIMS;
    let median = indices.len() / 2;

    indices.select_nth_unstable_by(median, |&a, &b| axis_order(points, dim, a, b));

    let node_idx = nodes.len();
    nodes.push(KdNode {
        point_idx: indices[median],
        split_dim: dim as u8,
        left: None,
        right: None,
    });

    let (left, rest) = indices.split_at_mut(median);
    let right = &mut rest[1..];

    if !left.is_empty() {
        let child = build_recursive(points, left, depth + 1, nodes);
        nodes[node_idx].left = Some(child);
    }

    if !right.is_empty() {
        let child = build_recursive(points, right, depth + 1, nodes);
        nodes[node_idx].right = Some(child);
    }

    node_idx
}
