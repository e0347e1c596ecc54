use log::{info, warn};
use sarroute_structs::Point;

/// Last known own-ship position. Staleness only produces warnings; the
/// last known position is used for routing regardless of its age.
#[derive(Debug, Default)]
pub struct NavState {
    pos: Point,
    last_update: Option<f64>,
    first_check: Option<f64>,
    stale: bool,
}

impl NavState {
    pub fn set_x(&mut self, x: f64, now: f64) {
        self.pos.x = x;
        self.touch(now);
    }

    pub fn set_y(&mut self, y: f64, now: f64) {
        self.pos.y = y;
        self.touch(now);
    }

    fn touch(&mut self, now: f64) {
        if self.stale {
            info!("position updates resumed at t={:.1}", now);
            self.stale = false;
        }
        self.last_update = Some(now);
    }

    pub fn position(&self) -> Point {
        self.pos
    }

    /// The position, once any update has been received.
    pub fn fix(&self) -> Option<Point> {
        self.last_update.map(|_| self.pos)
    }

    /// Returns true while no position update arrived in the last `max_age`
    /// seconds. Warns once per stale period.
    pub fn check_stale(&mut self, now: f64, max_age: f64) -> bool {
        let since = match self.last_update {
            Some(t) => t,
            None => *self.first_check.get_or_insert(now),
        };
        let stale = now - since > max_age;
        if stale && !self.stale {
            match self.last_update {
                Some(t) => warn!(
                    "no position update for {:.1}s, using last known ({}, {})",
                    now - t,
                    self.pos.x,
                    self.pos.y
                ),
                None => warn!("no position received after {:.1}s", now - since),
            }
        }
        self.stale = stale;
        stale
    }

    pub fn is_stale(&self) -> bool {
        self.stale
    }
}
