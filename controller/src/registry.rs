use std::collections::HashMap;

use log::debug;
use sarroute_structs::{Point, PointState, VisitPoint};
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum RegistryError {
    #[error("duplicate point id '{0}'")]
    DuplicateId(String),

    #[error("unknown point id '{0}'")]
    UnknownId(String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct TrackedPoint {
    pub point: VisitPoint,
    pub state: PointState,
}

/// The set of points known in the current batch.
///
/// Entries are never deleted while the batch lasts: a visited or removed
/// point stays in the history so that a late duplicate report of the same
/// id is still recognised. Only [`PointRegistry::reset`] clears it.
#[derive(Debug, Default)]
pub struct PointRegistry {
    points: Vec<TrackedPoint>,
    by_id: HashMap<String, usize>,
}

impl PointRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reset(&mut self) {
        self.points.clear();
        self.by_id.clear();
    }

    pub fn add_point(&mut self, point: VisitPoint) -> Result<(), RegistryError> {
        if self.by_id.contains_key(&point.id) {
            return Err(RegistryError::DuplicateId(point.id));
        }
        debug!("registry: add {} at ({}, {})", point.id, point.loc.x, point.loc.y);
        self.by_id.insert(point.id.clone(), self.points.len());
        self.points.push(TrackedPoint {
            point,
            state: PointState::Pending,
        });
        Ok(())
    }

    /// Returns whether the point changed state. Visited and removed points
    /// stay as they are.
    pub fn mark_visited(&mut self, id: &str) -> Result<bool, RegistryError> {
        self.transition(id, PointState::Visited)
    }

    pub fn remove(&mut self, id: &str) -> Result<bool, RegistryError> {
        self.transition(id, PointState::Removed)
    }

    fn transition(&mut self, id: &str, to: PointState) -> Result<bool, RegistryError> {
        let idx = *self
            .by_id
            .get(id)
            .ok_or_else(|| RegistryError::UnknownId(id.to_string()))?;
        let entry = &mut self.points[idx];
        if !entry.state.is_pending() {
            return Ok(false);
        }
        debug!("registry: {} {:?} -> {:?}", id, entry.state, to);
        entry.state = to;
        Ok(true)
    }

    /// Marks every pending point within `radius` of `pos` as visited and
    /// returns their ids in registry order.
    pub fn check_proximity(&mut self, pos: Point, radius: f64) -> Vec<String> {
        let mut visited = Vec::new();
        for entry in self.points.iter_mut() {
            if entry.state.is_pending() && entry.point.loc.dist(&pos) <= radius {
                entry.state = PointState::Visited;
                visited.push(entry.point.id.clone());
            }
        }
        visited
    }

    /// Snapshot of the pending points in arrival order.
    pub fn pending_points(&self) -> Vec<VisitPoint> {
        self.points
            .iter()
            .filter(|e| e.state.is_pending())
            .map(|e| e.point.clone())
            .collect()
    }

    pub fn all_visited_or_removed(&self) -> bool {
        !self.points.iter().any(|e| e.state.is_pending())
    }

    pub fn state(&self, id: &str) -> Option<PointState> {
        self.by_id.get(id).map(|i| self.points[*i].state)
    }

    pub fn count(&self, state: PointState) -> usize {
        self.points.iter().filter(|e| e.state == state).count()
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}
