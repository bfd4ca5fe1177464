//! Dense interpolated velocity volume

use ndarray::{Array3, ArrayView3};

use crate::error::{Error, Result};
use crate::lattice::LatticeAxes;

/// A dense 3D grid of values aligned to a lattice.
///
/// Values are stored in an `Array3` of shape `(ny, nx, nt)`, so standard
/// (row-major) iteration visits Y outermost, X in the middle and TWT
/// innermost. Every node holds a value.
///
/// # Example
///
/// ```ignore
/// let axes = build_lattice(&spec)?;
/// let volume = VelocityVolume::filled(axes, 1500.0)?;
/// let v = volume.get(0, 0, 0)?;
/// ```
#[derive(Debug, Clone)]
pub struct VelocityVolume {
    axes: LatticeAxes,
    data: Array3<f64>,
}

impl VelocityVolume {
    /// Create a volume from values in storage order
    pub fn from_vec(axes: LatticeAxes, data: Vec<f64>) -> Result<Self> {
        let expected = axes.node_count()?;
        if data.len() != expected {
            return Err(Error::SizeMismatch {
                expected,
                actual: data.len(),
            });
        }

        let data = Array3::from_shape_vec(axes.shape(), data)
            .map_err(|e| Error::Other(e.to_string()))?;

        Ok(Self { axes, data })
    }

    /// Create a volume with every node set to `value`
    pub fn filled(axes: LatticeAxes, value: f64) -> Result<Self> {
        let n = axes.node_count()?;
        let mut data = Vec::new();
        data.try_reserve_exact(n).map_err(|e| Error::LatticeTooLarge {
            reason: format!("{} nodes: {}", n, e),
        })?;
        data.resize(n, value);
        Self::from_vec(axes, data)
    }

    // Dimensions

    pub fn axes(&self) -> &LatticeAxes {
        &self.axes
    }

    /// Dimensions as (ny, nx, nt)
    pub fn shape(&self) -> (usize, usize, usize) {
        self.data.dim()
    }

    /// Total number of nodes
    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    // Data access

    /// Value at node `(ix, iy, it)`
    pub fn get(&self, ix: usize, iy: usize, it: usize) -> Result<f64> {
        self.data
            .get((iy, ix, it))
            .copied()
            .ok_or(Error::NodeOutOfBounds {
                ix,
                iy,
                it,
                nx: self.axes.nx(),
                ny: self.axes.ny(),
                nt: self.axes.nt(),
            })
    }

    /// View of the underlying data, indexed `[iy, ix, it]`
    pub fn view(&self) -> ArrayView3<'_, f64> {
        self.data.view()
    }

    pub fn data(&self) -> &Array3<f64> {
        &self.data
    }

    pub fn into_array(self) -> Array3<f64> {
        self.data
    }

    /// `(x, y, t, value)` for every node in storage order
    pub fn iter_nodes(&self) -> impl Iterator<Item = (f64, f64, f64, f64)> + '_ {
        self.axes
            .nodes()
            .zip(self.data.iter())
            .map(|([x, y, t], &v)| (x, y, t, v))
    }

    // Statistics

    /// Min, max and mean over all finite values
    pub fn statistics(&self) -> VolumeStatistics {
        let mut min: Option<f64> = None;
        let mut max: Option<f64> = None;
        let mut sum = 0.0;
        let mut count = 0usize;

        for &value in self.data.iter() {
            if !value.is_finite() {
                continue;
            }
            min = Some(min.map_or(value, |m| m.min(value)));
            max = Some(max.map_or(value, |m| m.max(value)));
            sum += value;
            count += 1;
        }

        VolumeStatistics {
            min,
            max,
            mean: (count > 0).then(|| sum / count as f64),
            valid_count: count,
            non_finite_count: self.len() - count,
        }
    }
}

/// Basic statistics for a volume
#[derive(Debug, Clone)]
pub struct VolumeStatistics {
    pub min: Option<f64>,
    pub max: Option<f64>,
    pub mean: Option<f64>,
    pub valid_count: usize,
    pub non_finite_count: usize,
}
