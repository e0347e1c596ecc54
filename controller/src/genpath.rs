//! Vehicle-side route generator. Collects its assigned points between
//! `firstpoint` and `lastpoint`, publishes a greedy visiting order, and
//! reports mission completion once every point has been passed.

use std::collections::VecDeque;

use log::{debug, warn};
use sarroute_structs::plan::Route;
use sarroute_structs::report::PointReport;

use crate::adapter::{Mail, Outbound, NAV_X, NAV_Y, VISIT_POINT};
use crate::config::GenPathConfig;
use crate::nav::NavState;
use crate::regen::{BatchPolicy, RegenController, RegenOutcome};
use crate::Role;

pub struct GenPath {
    config: GenPathConfig,
    regen: RegenController,
    nav: NavState,
    last_route: Option<Route>,
    outbox: VecDeque<Outbound>,
}

impl GenPath {
    pub fn new(config: GenPathConfig) -> Self {
        let regen = RegenController::new(BatchPolicy::Closed, config.visit_radius);
        Self {
            config,
            regen,
            nav: Default::default(),
            last_route: None,
            outbox: Default::default(),
        }
    }

    pub fn regen(&self) -> &RegenController {
        &self.regen
    }

    pub fn last_route(&self) -> Option<&Route> {
        self.last_route.as_ref()
    }

    fn publish(&mut self, outcome: Option<RegenOutcome>) {
        match outcome {
            Some(RegenOutcome::RouteBuilt(route)) => {
                let route = route.with_label("Waypoints");
                self.outbox.push_back(Outbound::WaypointUpdate {
                    var: self.config.updates_var.clone(),
                    route: route.clone(),
                });
                self.outbox.push_back(Outbound::ViewSegList(route.clone()));
                self.last_route = Some(route);
            }
            Some(RegenOutcome::MissionComplete) => {
                self.outbox.push_back(Outbound::MissionComplete(true));
            }
            None => {}
        }
    }
}

impl Role for GenPath {
    fn name(&self) -> &str {
        "genpath"
    }

    fn subscriptions(&self) -> Vec<String> {
        vec![
            VISIT_POINT.to_string(),
            NAV_X.to_string(),
            NAV_Y.to_string(),
            self.config.regenerate_var.clone(),
        ]
    }

    fn on_mail(&mut self, mail: Mail, now: f64) {
        match mail {
            Mail::VisitPoint(PointReport::FirstPoint) => self.regen.first_point(),
            Mail::VisitPoint(PointReport::LastPoint) => {
                let outcome = self.regen.last_point(self.nav.position());
                self.publish(outcome);
            }
            Mail::VisitPoint(PointReport::Point(point)) => {
                self.regen.add_point(point);
            }
            Mail::NavX(x) => self.nav.set_x(x, now),
            Mail::NavY(y) => self.nav.set_y(y, now),
            Mail::Regenerate { var, signal } => {
                if var == self.config.regenerate_var && signal.triggers() {
                    let outcome = self.regen.regenerate(self.nav.position());
                    self.publish(outcome);
                } else {
                    debug!("{} = {} ignored", var, signal.as_str());
                }
            }
            other => warn!("genpath: unhandled mail {}", other.var()),
        }
    }

    fn iterate(&mut self, now: f64) {
        self.nav.check_stale(now, self.config.nav_stale_secs);
        let outcome = self.regen.tick(self.nav.fix());
        self.publish(outcome);
    }

    fn next_outbound(&mut self) -> Option<Outbound> {
        self.outbox.pop_front()
    }
}
