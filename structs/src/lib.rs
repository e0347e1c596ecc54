use serde::{Deserialize, Serialize};

pub mod error;
pub mod node_message;
pub mod plan;
pub mod report;
pub mod view;

pub use error::FormatError;

/// A position in the planar local frame, in meters.
#[derive(Clone, Copy, Serialize, Deserialize, Debug, PartialEq, Default)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn dist(&self, other: &Point) -> f64 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        (dx * dx + dy * dy).sqrt()
    }
}

/// A task point as reported by its originator. The id is the only
/// identity a point has; two reports with the same id are the same point
/// even if the coordinates differ.
#[derive(Clone, Serialize, Deserialize, Debug, PartialEq)]
pub struct VisitPoint {
    pub id: String,
    pub loc: Point,
}

impl VisitPoint {
    pub fn new(id: impl Into<String>, x: f64, y: f64) -> Self {
        Self {
            id: id.into(),
            loc: Point { x, y },
        }
    }
}

#[derive(Clone, Copy, Serialize, Deserialize, Debug, PartialEq, Eq, Hash)]
pub enum PointState {
    Pending,
    Visited,
    Removed,
}

impl PointState {
    pub fn is_pending(&self) -> bool {
        matches!(self, PointState::Pending)
    }
}
