use std::fmt;

use crate::Point;

/// A labelled marker for the shoreside viewer.
#[derive(Debug, Clone, PartialEq)]
pub struct ViewPoint {
    pub loc: Point,
    pub label: String,
    pub color: String,
    pub size: u32,
}

impl ViewPoint {
    pub fn new(loc: Point, label: impl Into<String>, color: impl Into<String>) -> Self {
        Self {
            loc,
            label: label.into(),
            color: color.into(),
            size: 4,
        }
    }
}

impl fmt::Display for ViewPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "x={},y={},label={},vertex_color={},vertex_size={}",
            self.loc.x, self.loc.y, self.label, self.color, self.size
        )
    }
}
