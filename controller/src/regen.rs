//! Decides when a vehicle's route is rebuilt.
//!
//! ```text
//!            firstpoint                lastpoint
//!   Idle ---------------> Collecting -----------> Ready <----+
//!    ^                                             |  ^      | rebuild
//!    |        all points visited / removed        |  |      |
//!    +--------------------------------------------+  +--- Stale
//!                                                add/remove
//! ```
//!
//! A visit alone never causes a rebuild. Rebuilds happen on the closing
//! sentinel, on an explicit regenerate request, or on the tick after the
//! point set changed membership.

use log::{debug, info, warn};
use sarroute_planner::build_tour;
use sarroute_structs::plan::Route;
use sarroute_structs::{Point, VisitPoint};

use crate::registry::PointRegistry;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegenState {
    Idle,
    Collecting,
    Ready,
    Stale,
}

/// Whether points are only accepted between the batch sentinels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BatchPolicy {
    /// `lastpoint` closes the batch; later points are ignored until the
    /// next `firstpoint`.
    Closed,
    /// Points are accepted at any time. An add while idle opens a new
    /// implicit batch.
    Open,
}

#[derive(Debug, Clone, PartialEq)]
pub enum RegenOutcome {
    RouteBuilt(Route),
    MissionComplete,
}

#[derive(Debug)]
pub struct RegenController {
    state: RegenState,
    policy: BatchPolicy,
    mission_complete: bool,
    visit_radius: f64,
    registry: PointRegistry,
    builds: usize,
}

impl RegenController {
    pub fn new(policy: BatchPolicy, visit_radius: f64) -> Self {
        Self {
            state: RegenState::Idle,
            policy,
            mission_complete: false,
            visit_radius,
            registry: PointRegistry::new(),
            builds: 0,
        }
    }

    pub fn state(&self) -> RegenState {
        self.state
    }

    pub fn mission_complete(&self) -> bool {
        self.mission_complete
    }

    pub fn registry(&self) -> &PointRegistry {
        &self.registry
    }

    /// Number of routes built since startup.
    pub fn builds(&self) -> usize {
        self.builds
    }

    pub fn first_point(&mut self) {
        if self.state != RegenState::Idle {
            info!("firstpoint in state {:?}, discarding current batch", self.state);
        } else {
            info!("firstpoint, collecting new batch");
        }
        self.registry.reset();
        self.mission_complete = false;
        self.state = RegenState::Collecting;
    }

    pub fn last_point(&mut self, pos: Point) -> Option<RegenOutcome> {
        if self.state != RegenState::Collecting {
            warn!("lastpoint in state {:?} ignored", self.state);
            return None;
        }
        info!("lastpoint, batch has {} points", self.registry.len());
        self.rebuild(pos)
    }

    /// Returns true when the point was added.
    pub fn add_point(&mut self, point: VisitPoint) -> bool {
        let accept = match (self.state, self.policy) {
            (RegenState::Collecting, _) => true,
            (_, BatchPolicy::Open) => true,
            (state, BatchPolicy::Closed) => {
                warn!("point {} outside an open batch (state {:?}) ignored", point.id, state);
                false
            }
        };
        if !accept {
            return false;
        }

        if let Err(e) = self.registry.add_point(point) {
            warn!("{}", e);
            return false;
        }

        match self.state {
            RegenState::Collecting | RegenState::Stale => {}
            RegenState::Ready => self.state = RegenState::Stale,
            RegenState::Idle => {
                if self.mission_complete {
                    info!("new point after mission complete, reopening");
                }
                self.mission_complete = false;
                self.state = RegenState::Stale;
            }
        }
        true
    }

    /// Returns true when a pending point was removed.
    pub fn remove_point(&mut self, id: &str) -> bool {
        match self.registry.remove(id) {
            Ok(true) => {
                info!("point {} removed", id);
                if self.state == RegenState::Ready {
                    self.state = RegenState::Stale;
                }
                true
            }
            Ok(false) => {
                debug!("point {} already visited or removed", id);
                false
            }
            Err(e) => {
                warn!("{}", e);
                false
            }
        }
    }

    pub fn regenerate(&mut self, pos: Point) -> Option<RegenOutcome> {
        match self.state {
            RegenState::Ready | RegenState::Stale => self.rebuild(pos),
            state => {
                debug!("regenerate request in state {:?} ignored", state);
                None
            }
        }
    }

    /// Periodic step: proximity check against `fix`, then a rebuild if the
    /// point set changed, or completion if nothing is left to visit.
    ///
    /// Without a position fix nothing is marked visited; a rebuild then
    /// starts from the origin.
    pub fn tick(&mut self, fix: Option<Point>) -> Option<RegenOutcome> {
        if self.state == RegenState::Idle {
            return None;
        }

        if let Some(pos) = fix {
            for id in self.registry.check_proximity(pos, self.visit_radius) {
                info!("visited point {} at ({:.1}, {:.1})", id, pos.x, pos.y);
            }
        }
        let pos = fix.unwrap_or_default();

        match self.state {
            RegenState::Stale => self.rebuild(pos),
            RegenState::Ready if self.registry.all_visited_or_removed() => self.complete(),
            _ => None,
        }
    }

    fn rebuild(&mut self, pos: Point) -> Option<RegenOutcome> {
        let pending = self.registry.pending_points();
        if pending.is_empty() {
            return self.complete();
        }
        let route = build_tour(pos, &pending);
        self.builds += 1;
        self.state = RegenState::Ready;
        info!(
            "route #{} over {} pending points, {:.1} m",
            self.builds,
            route.len(),
            route.length_from(pos)
        );
        Some(RegenOutcome::RouteBuilt(route))
    }

    fn complete(&mut self) -> Option<RegenOutcome> {
        self.state = RegenState::Idle;
        if self.mission_complete {
            return None;
        }
        self.mission_complete = true;
        info!(
            "mission complete: {} points, none pending",
            self.registry.len()
        );
        Some(RegenOutcome::MissionComplete)
    }
}
