//! Regular 3D lattice specification and axis generation
//!
//! A lattice is the Cartesian product of three independent arithmetic
//! sequences (X, Y, TWT). Each sequence starts at the axis minimum and
//! advances by the axis step until it first reaches or passes the maximum:
//!
//! ```text
//! 0..10 step 5  ->  [0, 5, 10]
//! 0..11 step 5  ->  [0, 5, 10, 15]
//! ```
//!
//! Node coordinates are computed as `min + i * step`, never accumulated.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Relative tolerance used to snap `(max - min) / step` onto an integer.
const STEP_SNAP_TOLERANCE: f64 = 1e-9;

/// Lattice axis identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Axis {
    X,
    Y,
    Twt,
}

impl fmt::Display for Axis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Axis::X => write!(f, "X"),
            Axis::Y => write!(f, "Y"),
            Axis::Twt => write!(f, "TWT"),
        }
    }
}

/// Bounds and step sizes of the output lattice.
///
/// X and Y are in survey units (metres), TWT in milliseconds.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LatticeSpec {
    pub x_min: f64,
    pub x_max: f64,
    pub x_step: f64,
    pub y_min: f64,
    pub y_max: f64,
    pub y_step: f64,
    pub t_min: f64,
    pub t_max: f64,
    pub t_step: f64,
}

impl LatticeSpec {
    /// `(min, max, step)` for one axis
    pub fn axis(&self, axis: Axis) -> (f64, f64, f64) {
        match axis {
            Axis::X => (self.x_min, self.x_max, self.x_step),
            Axis::Y => (self.y_min, self.y_max, self.y_step),
            Axis::Twt => (self.t_min, self.t_max, self.t_step),
        }
    }

    /// Check steps are positive and bounds are finite and ordered.
    pub fn validate(&self) -> Result<()> {
        for axis in [Axis::X, Axis::Y, Axis::Twt] {
            let (min, max, step) = self.axis(axis);
            validate_axis(axis, min, max, step)?;
        }
        Ok(())
    }
}

fn validate_axis(axis: Axis, min: f64, max: f64, step: f64) -> Result<()> {
    if !step.is_finite() || step <= 0.0 {
        return Err(Error::InvalidLattice {
            axis,
            reason: format!("step must be positive and finite, got {}", step),
        });
    }
    if !min.is_finite() || !max.is_finite() {
        return Err(Error::InvalidLattice {
            axis,
            reason: format!("bounds must be finite, got [{}, {}]", min, max),
        });
    }
    if max < min {
        return Err(Error::InvalidLattice {
            axis,
            reason: format!("max {} is below min {}", max, min),
        });
    }
    Ok(())
}

/// Number of coordinates on one axis under the "first value >= max" rule.
pub fn axis_len(axis: Axis, min: f64, max: f64, step: f64) -> Result<usize> {
    validate_axis(axis, min, max, step)?;

    let ratio = (max - min) / step;
    if !ratio.is_finite() {
        return Err(Error::LatticeTooLarge {
            reason: format!("{} axis span {} / step {} overflows", axis, max - min, step),
        });
    }

    let nearest = ratio.round();
    let intervals = if (ratio - nearest).abs() <= STEP_SNAP_TOLERANCE * nearest.max(1.0) {
        nearest
    } else {
        ratio.ceil()
    };

    // `usize::MAX as f64` rounds up, so compare with >=
    if intervals >= usize::MAX as f64 {
        return Err(Error::LatticeTooLarge {
            reason: format!("{} axis needs {} intervals", axis, intervals),
        });
    }

    (intervals as usize)
        .checked_add(1)
        .ok_or_else(|| Error::LatticeTooLarge {
            reason: format!("{} axis length overflows", axis),
        })
}

/// Generate the coordinates of one axis.
pub fn axis_coordinates(axis: Axis, min: f64, max: f64, step: f64) -> Result<Vec<f64>> {
    let n = axis_len(axis, min, max, step)?;

    let mut coords = Vec::new();
    coords.try_reserve_exact(n).map_err(|e| Error::LatticeTooLarge {
        reason: format!("{} axis of {} coordinates: {}", axis, n, e),
    })?;
    coords.extend((0..n).map(|i| min + i as f64 * step));

    Ok(coords)
}

/// The realised coordinate sequences of a lattice.
///
/// Nodes are ordered Y outermost, X in the middle and TWT innermost, so the
/// linear index of node `(iy, ix, it)` is `(iy * nx + ix) * nt + it`.
#[derive(Debug, Clone, PartialEq)]
pub struct LatticeAxes {
    xs: Vec<f64>,
    ys: Vec<f64>,
    ts: Vec<f64>,
}

impl LatticeAxes {
    /// Build axes from explicit coordinate sequences.
    ///
    /// Every axis must be non-empty and the node count must fit in `usize`.
    pub fn from_axes(xs: Vec<f64>, ys: Vec<f64>, ts: Vec<f64>) -> Result<Self> {
        for (axis, coords) in [(Axis::X, &xs), (Axis::Y, &ys), (Axis::Twt, &ts)] {
            if coords.is_empty() {
                return Err(Error::InvalidLattice {
                    axis,
                    reason: "axis has no coordinates".into(),
                });
            }
        }

        let axes = Self { xs, ys, ts };
        axes.node_count()?;
        Ok(axes)
    }

    pub fn xs(&self) -> &[f64] {
        &self.xs
    }

    pub fn ys(&self) -> &[f64] {
        &self.ys
    }

    pub fn ts(&self) -> &[f64] {
        &self.ts
    }

    pub fn nx(&self) -> usize {
        self.xs.len()
    }

    pub fn ny(&self) -> usize {
        self.ys.len()
    }

    pub fn nt(&self) -> usize {
        self.ts.len()
    }

    /// Dimensions in storage order: (ny, nx, nt)
    pub fn shape(&self) -> (usize, usize, usize) {
        (self.ny(), self.nx(), self.nt())
    }

    /// Total number of lattice nodes
    pub fn node_count(&self) -> Result<usize> {
        self.ny()
            .checked_mul(self.nx())
            .and_then(|n| n.checked_mul(self.nt()))
            .ok_or_else(|| Error::LatticeTooLarge {
                reason: format!(
                    "{} x {} x {} nodes overflows usize",
                    self.nx(),
                    self.ny(),
                    self.nt()
                ),
            })
    }

    /// Coordinates `[x, y, t]` of node `(iy, ix, it)`
    ///
    /// Panics if any index is out of range.
    #[inline]
    pub fn node(&self, iy: usize, ix: usize, it: usize) -> [f64; 3] {
        [self.xs[ix], self.ys[iy], self.ts[it]]
    }

    /// Linear (row-major) index of node `(iy, ix, it)`
    #[inline]
    pub fn linear_index(&self, iy: usize, ix: usize, it: usize) -> usize {
        (iy * self.nx() + ix) * self.nt() + it
    }

    /// All node coordinates in storage order
    pub fn nodes(&self) -> impl Iterator<Item = [f64; 3]> + '_ {
        self.ys.iter().flat_map(move |&y| {
            self.xs
                .iter()
                .flat_map(move |&x| self.ts.iter().map(move |&t| [x, y, t]))
        })
    }
}

/// Realise the three axis sequences of a lattice.
pub fn build_lattice(spec: &LatticeSpec) -> Result<LatticeAxes> {
    spec.validate()?;

    let xs = axis_coordinates(Axis::X, spec.x_min, spec.x_max, spec.x_step)?;
    let ys = axis_coordinates(Axis::Y, spec.y_min, spec.y_max, spec.y_step)?;
    let ts = axis_coordinates(Axis::Twt, spec.t_min, spec.t_max, spec.t_step)?;

    LatticeAxes::from_axes(xs, ys, ts)
}
