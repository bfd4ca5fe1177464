//! Trace positions, velocity picks and their join into samples
//!
//! Positions come from the survey geometry (one per trace), picks from a
//! velocity analysis table (many per trace). Joining them on the trace
//! number gives the scattered point cloud the interpolator consumes.

use std::collections::{HashMap, HashSet};

use crate::sample::Sample;

/// Planar position of one seismic trace
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TracePosition {
    /// 1-based trace number in file order
    pub trace: u32,
    pub x: f64,
    pub y: f64,
}

/// One velocity pick: a (TWT, VNMO) pair on a trace
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VelocityPick {
    pub trace: u32,
    pub twt: f64,
    pub vnmo: f64,
}

/// A pick located in survey space
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CombinedRecord {
    pub trace: u32,
    pub x: f64,
    pub y: f64,
    pub twt: f64,
    pub vnmo: f64,
}

impl CombinedRecord {
    pub fn to_sample(&self) -> Sample {
        Sample::new(self.x, self.y, self.twt, self.vnmo)
    }
}

/// Inner join of trace positions and picks on the trace number.
///
/// Output follows the order of `positions`; picks on the same trace keep
/// their input order. Positions without picks and picks without a position
/// are dropped. If a trace number appears more than once in `positions`,
/// its picks are emitted once per occurrence.
pub fn join_on_trace(positions: &[TracePosition], picks: &[VelocityPick]) -> Vec<CombinedRecord> {
    let mut by_trace: HashMap<u32, Vec<&VelocityPick>> = HashMap::new();
    for pick in picks {
        by_trace.entry(pick.trace).or_default().push(pick);
    }

    positions
        .iter()
        .filter_map(|pos| by_trace.get(&pos.trace).map(|picks| (pos, picks)))
        .flat_map(|(pos, picks)| {
            picks.iter().map(move |pick| CombinedRecord {
                trace: pos.trace,
                x: pos.x,
                y: pos.y,
                twt: pick.twt,
                vnmo: pick.vnmo,
            })
        })
        .collect()
}

/// How well a pick table and a set of trace positions overlap
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct JoinCoverage {
    /// Picks whose trace number has no position
    pub unmatched_picks: usize,
    /// Distinct positioned trace numbers without any pick
    pub traces_without_picks: usize,
}

/// Count what [`join_on_trace`] drops on each side.
pub fn join_coverage(positions: &[TracePosition], picks: &[VelocityPick]) -> JoinCoverage {
    let positioned: HashSet<u32> = positions.iter().map(|p| p.trace).collect();
    let picked: HashSet<u32> = picks.iter().map(|p| p.trace).collect();

    JoinCoverage {
        unmatched_picks: picks
            .iter()
            .filter(|p| !positioned.contains(&p.trace))
            .count(),
        traces_without_picks: positioned.difference(&picked).count(),
    }
}
