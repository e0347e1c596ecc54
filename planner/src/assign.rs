//! Point-to-vehicle assignment policies for the task broker.
//!
//! A policy is a pure function of the point's arrival index, its location
//! and the number of configured vehicles. Ownership is decided once when a
//! point arrives and is never revisited.

use sarroute_structs::Point;
use serde::{Deserialize, Serialize};

pub trait Assigner {
    /// Index of the vehicle that owns the `n`-th received point, or `None`
    /// when there are no vehicles to choose from.
    fn assign(&self, n: usize, loc: &Point, num_vehicles: usize) -> Option<usize>;

    fn describe(&self) -> String;
}

pub type BoxedAssigner = Box<dyn Assigner + Send>;

/// Round-robin over the vehicle list.
#[derive(Debug, Clone, Copy, Default)]
pub struct Alternating;

impl Assigner for Alternating {
    fn assign(&self, n: usize, _loc: &Point, num_vehicles: usize) -> Option<usize> {
        (num_vehicles > 0).then(|| n % num_vehicles)
    }

    fn describe(&self) -> String {
        "Alternating".to_string()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Axis {
    #[default]
    X,
    Y,
}

/// Splits the plane at `boundary` along `axis`. Points below the boundary
/// go to the first vehicle, the rest to the second (or the first again if
/// it is alone).
#[derive(Debug, Clone, Copy)]
pub struct ByRegion {
    pub axis: Axis,
    pub boundary: f64,
}

impl ByRegion {
    pub const DEFAULT_BOUNDARY: f64 = 87.5;
}

impl Default for ByRegion {
    fn default() -> Self {
        Self {
            axis: Axis::X,
            boundary: Self::DEFAULT_BOUNDARY,
        }
    }
}

impl Assigner for ByRegion {
    fn assign(&self, _n: usize, loc: &Point, num_vehicles: usize) -> Option<usize> {
        if num_vehicles == 0 {
            return None;
        }
        let coord = match self.axis {
            Axis::X => loc.x,
            Axis::Y => loc.y,
        };
        if coord < self.boundary || num_vehicles == 1 {
            Some(0)
        } else {
            Some(1)
        }
    }

    fn describe(&self) -> String {
        format!("By Region ({:?} = {})", self.axis, self.boundary)
    }
}
