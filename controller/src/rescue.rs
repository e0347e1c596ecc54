//! Rescue-side route generator. Swimmer alerts may arrive at any time,
//! confirmed finds drop out of the route, and every new route is also
//! relayed to the teammate vehicle.

use std::collections::VecDeque;

use log::{debug, info, warn};
use sarroute_structs::node_message::NodeMessage;
use sarroute_structs::plan::Route;

use crate::adapter::{Mail, Outbound, RegenerateSignal, FOUND_SWIMMER, NAV_X, NAV_Y, SWIMMER_ALERT};
use crate::config::RescueConfig;
use crate::nav::NavState;
use crate::regen::{BatchPolicy, RegenController, RegenOutcome};
use crate::Role;

pub struct Rescue {
    config: RescueConfig,
    regen: RegenController,
    nav: NavState,
    last_route: Option<Route>,
    outbox: VecDeque<Outbound>,
}

impl Rescue {
    pub fn new(config: RescueConfig) -> Self {
        let regen = RegenController::new(BatchPolicy::Open, config.visit_radius);
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

    fn status(&mut self, signal: RegenerateSignal) {
        self.outbox.push_back(Outbound::RegenerateStatus {
            var: self.config.regenerate_var.clone(),
            signal,
        });
    }

    fn publish(&mut self, outcome: Option<RegenOutcome>) {
        match outcome {
            Some(RegenOutcome::RouteBuilt(route)) => {
                let route = route.with_label("Waypoints").with_edge_color("white");
                self.outbox.push_back(Outbound::WaypointUpdate {
                    var: self.config.updates_var.clone(),
                    route: route.clone(),
                });
                self.outbox.push_back(Outbound::NodeMessage(NodeMessage {
                    src_node: self.config.host_name.clone(),
                    dest_node: self.config.dest_name.clone(),
                    var_name: self.config.updates_var.clone(),
                    string_val: route.to_spec(),
                }));
                self.outbox.push_back(Outbound::ViewSegList(route.clone()));
                self.status(RegenerateSignal::Regenerated);
                self.last_route = Some(route);
            }
            Some(RegenOutcome::MissionComplete) => {
                info!("all swimmers found or passed");
                self.outbox.push_back(Outbound::MissionComplete(true));
                self.status(RegenerateSignal::FinishedMission);
            }
            None => {}
        }
    }
}

impl Role for Rescue {
    fn name(&self) -> &str {
        "rescue"
    }

    fn subscriptions(&self) -> Vec<String> {
        vec![
            SWIMMER_ALERT.to_string(),
            FOUND_SWIMMER.to_string(),
            NAV_X.to_string(),
            NAV_Y.to_string(),
            self.config.regenerate_var.clone(),
        ]
    }

    fn on_mail(&mut self, mail: Mail, now: f64) {
        match mail {
            Mail::SwimmerAlert(point) => {
                if self.regen.add_point(point) {
                    debug!("{} swimmers tracked", self.regen.registry().len());
                }
            }
            Mail::FoundSwimmer(id) => {
                self.regen.remove_point(&id);
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
            other => warn!("rescue: unhandled mail {}", other.var()),
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

#[cfg(test)]
mod tests {
    use sarroute_structs::Point;

    use super::*;
    use crate::drain;
    use crate::regen::RegenState;

    fn feed(r: &mut Rescue, var: &str, payload: &str) {
        r.on_mail(Mail::parse(var, payload).unwrap(), 0.0);
    }

    #[test]
    fn alert_builds_and_relays_route() {
        let _ = env_logger::try_init();
        let mut r = Rescue::new(RescueConfig::default());
        feed(&mut r, "SWIMMER_ALERT", "x=10,y=0,id=1");
        feed(&mut r, "SWIMMER_ALERT", "x=5,y=0,id=2");
        assert!(drain(&mut r).is_empty());

        r.iterate(0.0);
        let out = drain(&mut r);
        let vars = out.iter().map(|o| o.var()).collect::<Vec<_>>();
        assert_eq!(
            vars,
            vec!["SURVEY_UPDATE", "NODE_MESSAGE_LOCAL", "VIEW_SEGLIST", "GENRESCUE_REGENERATE"]
        );
        assert_eq!(
            out[0].payload(),
            "points = pts={5,0:10,0},label=Waypoints,edge_color=white"
        );
        let relayed = NodeMessage::from_spec(&out[1].payload()).unwrap();
        assert_eq!(relayed.src_node, "abe");
        assert_eq!(relayed.dest_node, "ben");
        assert_eq!(relayed.var_name, "SURVEY_UPDATE");
        assert_eq!(
            Route::from_spec(&relayed.string_val).unwrap().points,
            vec![Point::new(5.0, 0.0), Point::new(10.0, 0.0)]
        );
        assert_eq!(out[3].payload(), "regenerated_already");

        r.iterate(1.0);
        assert!(drain(&mut r).is_empty());
    }

    #[test]
    fn found_swimmer_reroutes() {
        let mut r = Rescue::new(RescueConfig::default());
        feed(&mut r, "SWIMMER_ALERT", "x=10,y=0,id=1");
        feed(&mut r, "SWIMMER_ALERT", "x=5,y=0,id=2");
        r.iterate(0.0);
        drain(&mut r);

        feed(&mut r, "FOUND_SWIMMER", "id=2");
        assert_eq!(r.regen().state(), RegenState::Stale);
        r.iterate(1.0);
        drain(&mut r);
        assert_eq!(r.last_route().unwrap().points, vec![Point::new(10.0, 0.0)]);

        // Unknown and repeated finds change nothing.
        feed(&mut r, "FOUND_SWIMMER", "id=2");
        feed(&mut r, "FOUND_SWIMMER", "id=99");
        r.iterate(2.0);
        assert!(drain(&mut r).is_empty());
        assert_eq!(r.regen().builds(), 2);
    }

    #[test]
    fn completion_and_echo() {
        let mut r = Rescue::new(RescueConfig {
            visit_radius: 1.0,
            ..Default::default()
        });
        feed(&mut r, "SWIMMER_ALERT", "x=3,y=0,id=a");
        r.iterate(0.0);
        drain(&mut r);

        feed(&mut r, "NAV_X", "3");
        r.iterate(1.0);
        let out = drain(&mut r);
        assert_eq!(
            out,
            vec![
                Outbound::MissionComplete(true),
                Outbound::RegenerateStatus {
                    var: "GENRESCUE_REGENERATE".into(),
                    signal: RegenerateSignal::FinishedMission,
                },
            ]
        );

        // Our own status comes back over the bus while idle.
        feed(&mut r, "GENRESCUE_REGENERATE", "finished_mission");
        r.iterate(2.0);
        assert!(drain(&mut r).is_empty());
        assert!(r.regen().mission_complete());
    }

    #[test]
    fn late_alert_reopens_mission() {
        let mut r = Rescue::new(RescueConfig {
            visit_radius: 1.0,
            ..Default::default()
        });
        feed(&mut r, "NAV_X", "0");
        feed(&mut r, "SWIMMER_ALERT", "x=0,y=0,id=a");
        r.iterate(0.0);
        r.iterate(1.0);
        assert!(drain(&mut r).contains(&Outbound::MissionComplete(true)));

        feed(&mut r, "SWIMMER_ALERT", "x=0,y=0,id=a");
        assert_eq!(r.regen().state(), RegenState::Idle);

        feed(&mut r, "SWIMMER_ALERT", "x=20,y=0,id=b");
        assert!(!r.regen().mission_complete());
        r.iterate(2.0);
        assert_eq!(r.last_route().unwrap().points, vec![Point::new(20.0, 0.0)]);
    }

    #[test]
    fn regenerate_request_from_teammate_var_ignored() {
        let mut r = Rescue::new(RescueConfig::default());
        feed(&mut r, "SWIMMER_ALERT", "x=10,y=0,id=1");
        r.iterate(0.0);
        drain(&mut r);
        feed(&mut r, "GENPATH_REGENERATE", "true");
        assert!(drain(&mut r).is_empty());
        feed(&mut r, "GENRESCUE_REGENERATE", "regenerate_request");
        assert_eq!(drain(&mut r).len(), 4);
    }
}
