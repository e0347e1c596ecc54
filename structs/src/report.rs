//! Point reports as they travel on the `VISIT_POINT` and `SWIMMER_ALERT`
//! variables: either one of the two batch sentinels or a comma separated
//! `x=<num>,y=<num>,id=<token>` record. Field order is not significant.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::{FormatError, Point, VisitPoint};

pub const FIRST_POINT: &str = "firstpoint";
pub const LAST_POINT: &str = "lastpoint";

#[derive(Clone, Serialize, Deserialize, Debug, PartialEq)]
pub enum PointReport {
    FirstPoint,
    LastPoint,
    Point(VisitPoint),
}

impl FromStr for PointReport {
    type Err = FormatError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s == FIRST_POINT {
            return Ok(PointReport::FirstPoint);
        }
        if s == LAST_POINT {
            return Ok(PointReport::LastPoint);
        }

        let mut x = None;
        let mut y = None;
        let mut id = None;
        for part in s.split(',').map(str::trim) {
            if let Some(v) = part.strip_prefix("x=") {
                x = Some(parse_coord("x", v)?);
            } else if let Some(v) = part.strip_prefix("y=") {
                y = Some(parse_coord("y", v)?);
            } else if let Some(v) = part.strip_prefix("id=") {
                id = Some(v.trim().to_string());
            }
        }

        let missing = |field| FormatError::MissingField {
            field,
            input: s.to_string(),
        };
        let x = x.ok_or_else(|| missing("x"))?;
        let y = y.ok_or_else(|| missing("y"))?;
        let id = id.filter(|id| !id.is_empty()).ok_or_else(|| missing("id"))?;

        Ok(PointReport::Point(VisitPoint {
            id,
            loc: Point { x, y },
        }))
    }
}

impl fmt::Display for PointReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PointReport::FirstPoint => f.write_str(FIRST_POINT),
            PointReport::LastPoint => f.write_str(LAST_POINT),
            PointReport::Point(p) => write!(f, "x={},y={},id={}", p.loc.x, p.loc.y, p.id),
        }
    }
}

fn parse_coord(field: &'static str, value: &str) -> Result<f64, FormatError> {
    value
        .trim()
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .ok_or_else(|| FormatError::BadNumber {
            field,
            value: value.to_string(),
        })
}

/// Pulls the `id=<token>` field out of a free-form report such as the
/// `FOUND_SWIMMER` payload `id=12, finder=abe`.
pub fn extract_id(report: &str) -> Result<String, FormatError> {
    report
        .split(',')
        .map(str::trim)
        .find_map(|part| part.strip_prefix("id="))
        .map(|id| id.trim().to_string())
        .filter(|id| !id.is_empty())
        .ok_or_else(|| FormatError::MissingField {
            field: "id",
            input: report.to_string(),
        })
}
