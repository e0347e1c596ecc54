use serde::{Deserialize, Serialize};

use crate::{FormatError, Point};

/// An ordered visiting sequence. A route carries no identity of its own;
/// the most recently published one replaces whatever came before.
#[derive(Debug, Clone, Default, PartialEq)]
#[derive(Serialize, Deserialize)]
pub struct Route {
    pub points: Vec<Point>,
    pub label: Option<String>,
    pub edge_color: Option<String>,
}

impl Route {
    pub fn new(points: Vec<Point>) -> Self {
        Self {
            points,
            ..Default::default()
        }
    }

    pub fn with_label(mut self, label: &str) -> Self {
        self.label = Some(label.to_string());
        self
    }

    pub fn with_edge_color(mut self, color: &str) -> Self {
        self.edge_color = Some(color.to_string());
        self
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Total travelled distance when starting at `start`.
    pub fn length_from(&self, start: Point) -> f64 {
        let mut cursor = start;
        let mut total = 0.0;
        for p in self.points.iter() {
            total += cursor.dist(p);
            cursor = *p;
        }
        total
    }

    /// Segment-list spec, e.g. `pts={3,0:0,4},label=Waypoints,edge_color=white`.
    pub fn to_spec(&self) -> String {
        let pts = self
            .points
            .iter()
            .map(|p| format!("{},{}", p.x, p.y))
            .collect::<Vec<_>>()
            .join(":");
        let mut spec = format!("pts={{{}}}", pts);
        if let Some(label) = &self.label {
            spec.push_str(",label=");
            spec.push_str(label);
        }
        if let Some(color) = &self.edge_color {
            spec.push_str(",edge_color=");
            spec.push_str(color);
        }
        spec
    }

    pub fn from_spec(spec: &str) -> Result<Self, FormatError> {
        let malformed = || FormatError::Malformed(spec.to_string());
        let body = spec.trim().strip_prefix("pts={").ok_or_else(malformed)?;
        let close = body.find('}').ok_or_else(malformed)?;
        let (pts, rest) = body.split_at(close);

        let mut points = Vec::new();
        for vertex in pts.split(':').filter(|v| !v.trim().is_empty()) {
            let (x, y) = vertex.split_once(',').ok_or_else(malformed)?;
            let coord = |field, v: &str| {
                v.trim().parse::<f64>().map_err(|_| FormatError::BadNumber {
                    field,
                    value: v.to_string(),
                })
            };
            points.push(Point {
                x: coord("x", x)?,
                y: coord("y", y)?,
            });
        }

        let mut route = Route::new(points);
        for param in rest[1..].split(',').map(str::trim).filter(|p| !p.is_empty()) {
            match param.split_once('=') {
                Some(("label", v)) => route.label = Some(v.to_string()),
                Some(("edge_color", v)) => route.edge_color = Some(v.to_string()),
                Some(_) => {}
                None => return Err(malformed()),
            }
        }
        Ok(route)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn spec_format() {
        let r = Route::new(vec![Point::new(1.0, 1.0), Point::new(3.0, 0.0), Point::new(0.0, 4.0)])
            .with_label("Waypoints")
            .with_edge_color("white");
        assert_eq!(r.to_spec(), "pts={1,1:3,0:0,4},label=Waypoints,edge_color=white");
        assert_eq!(Route::from_spec(&r.to_spec()).unwrap(), r);
    }

    #[test]
    fn fractional_and_negative_coordinates_survive() {
        let r = Route::new(vec![Point::new(-12.25, 0.1), Point::new(87.5, -175.0)]);
        assert_eq!(Route::from_spec(&r.to_spec()).unwrap(), r);
    }

    #[test]
    fn empty_route() {
        let r = Route::default();
        assert_eq!(r.to_spec(), "pts={}");
        assert!(Route::from_spec("pts={}").unwrap().is_empty());
    }

    #[test]
    fn malformed_specs() {
        assert!(Route::from_spec("points={1,2}").is_err());
        assert!(Route::from_spec("pts={1,2").is_err());
        assert!(Route::from_spec("pts={1;2}").is_err());
        assert!(Route::from_spec("pts={a,2}").is_err());
    }

    #[test]
    fn travelled_length() {
        let r = Route::new(vec![Point::new(3.0, 4.0), Point::new(3.0, 0.0)]);
        assert_eq!(r.length_from(Point::new(0.0, 0.0)), 9.0);
    }
}
