//! Scattered input observations

/// One scattered observation: a position in survey space and the value there.
///
/// `x`, `y` are planar survey coordinates (metres), `t` is two-way travel
/// time (milliseconds) and `value` is the field being gridded (VNMO, m/s).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sample {
    pub x: f64,
    pub y: f64,
    pub t: f64,
    pub value: f64,
}

impl Sample {
    pub fn new(x: f64, y: f64, t: f64, value: f64) -> Self {
        Self { x, y, t, value }
    }

    /// Coordinates as an `[x, y, t]` array
    #[inline]
    pub fn coords(&self) -> [f64; 3] {
        [self.x, self.y, self.t]
    }

    /// Coordinate along dimension `dim` (0 = x, 1 = y, 2 = t)
    #[inline]
    pub fn coord(&self, dim: usize) -> f64 {
        match dim {
            0 => self.x,
            1 => self.y,
            _ => self.t,
        }
    }

    /// Squared Euclidean distance in raw units (no axis scaling)
    #[inline]
    pub fn dist_sq(&self, qx: f64, qy: f64, qt: f64) -> f64 {
        let dx = self.x - qx;
        let dy = self.y - qy;
        let dt = self.t - qt;
        dx * dx + dy * dy + dt * dt
    }

    /// Euclidean distance in raw units
    #[inline]
    pub fn dist(&self, qx: f64, qy: f64, qt: f64) -> f64 {
        self.dist_sq(qx, qy, qt).sqrt()
    }
}
