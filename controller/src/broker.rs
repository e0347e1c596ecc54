//! Shoreside task broker: hands each incoming point to exactly one
//! vehicle and frames every vehicle's stream with `firstpoint` and
//! `lastpoint`.
//!
//! The broker keeps forwarding points that arrive after `lastpoint` went
//! out. Vehicles running a closed batch will ignore them; vehicles running
//! an open batch pick them up.

use std::collections::{BTreeMap, VecDeque};

use log::{debug, info, warn};
use sarroute_planner::{Axis, BoxedAssigner};
use sarroute_structs::report::PointReport;
use sarroute_structs::view::ViewPoint;
use sarroute_structs::{Point, VisitPoint};

use crate::adapter::{Mail, Outbound, ShareRoute, VISIT_POINT};
use crate::config::BrokerConfig;
use crate::Role;

pub struct Broker {
    config: BrokerConfig,
    assigner: BoxedAssigner,
    queue: VecDeque<VisitPoint>,
    owned: BTreeMap<String, Vec<VisitPoint>>,
    points_received: usize,
    points_assigned: usize,
    first_point_sent: bool,
    last_point_sent: bool,
    input_closed: bool,
    warned_no_vehicles: bool,
    outbox: VecDeque<Outbound>,
}

impl Broker {
    pub fn new(config: BrokerConfig) -> Self {
        let config = config.normalized();
        let assigner = config.assigner();
        let mut broker = Self {
            config,
            assigner,
            queue: Default::default(),
            owned: Default::default(),
            points_received: 0,
            points_assigned: 0,
            first_point_sent: false,
            last_point_sent: false,
            input_closed: false,
            warned_no_vehicles: false,
            outbox: Default::default(),
        };

        if broker.config.vnames.is_empty() {
            warn!("no vehicle names configured, points will be queued");
        } else {
            info!("vehicles: {}", broker.config.vnames.join(", "));
        }
        info!("assignment method: {}", broker.assigner.describe());

        for vname in broker.config.vnames.clone() {
            broker.setup_sharing(&vname);
        }
        if broker.config.assign_by_region {
            broker.post_region_boundary();
        }
        broker
    }

    pub fn vehicles(&self) -> &[String] {
        &self.config.vnames
    }

    pub fn points_received(&self) -> usize {
        self.points_received
    }

    pub fn points_assigned(&self) -> usize {
        self.points_assigned
    }

    pub fn queued(&self) -> usize {
        self.queue.len()
    }

    pub fn first_point_sent(&self) -> bool {
        self.first_point_sent
    }

    pub fn last_point_sent(&self) -> bool {
        self.last_point_sent
    }

    /// Points owned by `vehicle` in the current batch, in assignment order.
    pub fn owned(&self, vehicle: &str) -> &[VisitPoint] {
        self.owned
            .get(&vehicle.to_uppercase())
            .map(|v| v.as_slice())
            .unwrap_or(&[])
    }

    pub fn owner_of(&self, id: &str) -> Option<&str> {
        self.owned
            .iter()
            .find(|(_, points)| points.iter().any(|p| p.id == id))
            .map(|(v, _)| v.as_str())
    }

    /// The vehicle the next assigned point would go to. Does not change
    /// any state.
    pub fn assign_point(&self, point: &VisitPoint) -> Option<&str> {
        let vnames = &self.config.vnames;
        self.assigner
            .assign(self.points_assigned, &point.loc, vnames.len())
            .map(|i| vnames[i].as_str())
    }

    pub fn add_vehicle(&mut self, name: &str) {
        let vname = name.trim().to_uppercase();
        if vname.is_empty() || self.config.vnames.contains(&vname) {
            warn!("vehicle '{}' not added", name);
            return;
        }
        info!("adding vehicle {}", vname);
        self.config.vnames.push(vname.clone());
        self.setup_sharing(&vname);

        // A vehicle joining mid-batch still gets a framed stream.
        if self.first_point_sent {
            self.owned.entry(vname.clone()).or_default();
            self.send(&vname, PointReport::FirstPoint);
            if self.last_point_sent {
                self.send(&vname, PointReport::LastPoint);
            }
        }
        self.process_queue();
    }

    pub fn handle_visit_point(&mut self, report: PointReport) {
        match report {
            PointReport::FirstPoint => {
                if self.input_closed || self.last_point_sent {
                    // The previous batch may still be waiting for its
                    // lastpoint; close it before the new one opens.
                    if self.first_point_sent && !self.last_point_sent {
                        self.send_last_point();
                    }
                    info!("firstpoint from source, starting a new batch");
                    self.first_point_sent = false;
                    self.last_point_sent = false;
                    self.input_closed = false;
                    self.owned.clear();
                } else {
                    debug!("firstpoint from source");
                }
            }
            PointReport::LastPoint => {
                info!("lastpoint from source, input closed");
                self.input_closed = true;
            }
            PointReport::Point(point) => {
                self.points_received += 1;
                if let Some(owner) = self.owner_of(&point.id) {
                    warn!("point {} already assigned to {}, dropped", point.id, owner);
                    return;
                }
                if self.queue.iter().any(|p| p.id == point.id) {
                    warn!("point {} already queued, dropped", point.id);
                    return;
                }
                self.queue.push_back(point);
                self.process_queue();
            }
        }
    }

    fn process_queue(&mut self) {
        if self.config.vnames.is_empty() {
            if !self.queue.is_empty() && !self.warned_no_vehicles {
                warn!("no vehicles configured, {} points waiting", self.queue.len());
                self.warned_no_vehicles = true;
            }
            return;
        }

        if !self.first_point_sent {
            for vname in self.config.vnames.clone() {
                self.send(&vname, PointReport::FirstPoint);
                self.owned.insert(vname, Vec::new());
            }
            self.first_point_sent = true;
            info!("sent firstpoint to all vehicles");
        }

        while let Some(point) = self.queue.pop_front() {
            let Some(vname) = self.assign_point(&point).map(str::to_string) else {
                self.queue.push_front(point);
                return;
            };
            let idx = self.config.vnames.iter().position(|v| *v == vname).unwrap_or(0);
            let color = self.config.color_for(idx, &vname);
            self.outbox.push_back(Outbound::ViewPoint(ViewPoint::new(
                point.loc,
                format!("visit_{}", point.id),
                color,
            )));

            info!("assigned point {} to {}", point.id, vname);
            self.send(&vname, PointReport::Point(point.clone()));
            self.owned.entry(vname).or_default().push(point);
            self.points_assigned += 1;
        }
    }

    fn send_last_point(&mut self) {
        for vname in self.config.vnames.clone() {
            self.send(&vname, PointReport::LastPoint);
        }
        self.last_point_sent = true;
        info!(
            "sent lastpoint to all vehicles ({} points assigned)",
            self.points_assigned
        );
    }

    fn send(&mut self, vehicle: &str, report: PointReport) {
        self.outbox.push_back(Outbound::VisitPointFor {
            vehicle: vehicle.to_string(),
            report,
        });
    }

    fn setup_sharing(&mut self, vname: &str) {
        let route = ShareRoute::visit_point_for(vname);
        info!("sharing for {}: {}", vname, route);
        self.outbox.push_back(Outbound::ShareConfig(route));
    }

    fn post_region_boundary(&mut self) {
        let b = self.config.region_boundary;
        let mut along = -175.0;
        while along <= -25.0 {
            let loc = match self.config.region_axis {
                Axis::X => Point::new(b, along),
                Axis::Y => Point::new(along, b),
            };
            self.outbox.push_back(Outbound::ViewPoint(ViewPoint::new(
                loc,
                format!("boundary_{}", along),
                "blue",
            )));
            along += 15.0;
        }
    }
}

impl Role for Broker {
    fn name(&self) -> &str {
        "broker"
    }

    fn subscriptions(&self) -> Vec<String> {
        vec![VISIT_POINT.to_string()]
    }

    fn on_mail(&mut self, mail: Mail, _now: f64) {
        match mail {
            Mail::VisitPoint(report) => self.handle_visit_point(report),
            other => warn!("broker: unhandled mail {}", other.var()),
        }
    }

    fn iterate(&mut self, _now: f64) {
        if self.queue.is_empty() && self.input_closed && self.first_point_sent && !self.last_point_sent {
            self.send_last_point();
        }
    }

    fn next_outbound(&mut self) -> Option<Outbound> {
        self.outbox.pop_front()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::drain;

    fn broker(vnames: &[&str], by_region: bool) -> Broker {
        let _ = env_logger::try_init();
        let mut b = Broker::new(BrokerConfig {
            vnames: vnames.iter().map(|v| v.to_string()).collect(),
            assign_by_region: by_region,
            ..Default::default()
        });
        drain(&mut b);
        b
    }

    fn forwarded(out: &[Outbound]) -> Vec<(String, String)> {
        out.iter()
            .filter_map(|o| match o {
                Outbound::VisitPointFor { vehicle, report } => {
                    Some((vehicle.clone(), report.to_string()))
                }
                _ => None,
            })
            .collect()
    }

    fn point(id: &str, x: f64, y: f64) -> PointReport {
        PointReport::Point(VisitPoint::new(id, x, y))
    }

    #[test]
    fn startup_registers_sharing() {
        let mut b = Broker::new(BrokerConfig {
            vnames: vec!["henry".into(), "gilda".into()],
            ..Default::default()
        });
        let out = drain(&mut b);
        assert_eq!(
            out,
            vec![
                Outbound::ShareConfig(ShareRoute::visit_point_for("HENRY")),
                Outbound::ShareConfig(ShareRoute::visit_point_for("GILDA")),
            ]
        );
    }

    #[test]
    fn region_mode_draws_boundary() {
        let mut b = Broker::new(BrokerConfig {
            vnames: vec!["A".into(), "B".into()],
            assign_by_region: true,
            ..Default::default()
        });
        let boundary = drain(&mut b)
            .into_iter()
            .filter(|o| matches!(o, Outbound::ViewPoint(vp) if vp.label.starts_with("boundary_")))
            .count();
        assert_eq!(boundary, 11);
    }

    #[test]
    fn alternating_with_sentinels() {
        let mut b = broker(&["A", "B"], false);
        b.on_mail(Mail::VisitPoint(PointReport::FirstPoint), 0.0);
        for i in 0..4 {
            b.on_mail(Mail::VisitPoint(point(&i.to_string(), i as f64, 0.0)), 0.0);
        }
        b.iterate(0.0);
        assert!(!b.last_point_sent());
        b.on_mail(Mail::VisitPoint(PointReport::LastPoint), 0.0);
        b.iterate(0.0);
        b.iterate(1.0);

        let fwd = forwarded(&drain(&mut b));
        let expected = [
            ("A", "firstpoint"),
            ("B", "firstpoint"),
            ("A", "x=0,y=0,id=0"),
            ("B", "x=1,y=0,id=1"),
            ("A", "x=2,y=0,id=2"),
            ("B", "x=3,y=0,id=3"),
            ("A", "lastpoint"),
            ("B", "lastpoint"),
        ]
        .map(|(v, p)| (v.to_string(), p.to_string()));
        assert_eq!(fwd, expected.to_vec());
        assert_eq!(b.owned("a").len(), 2);
        assert_eq!(b.owned("B").len(), 2);
        assert_eq!(b.points_assigned(), 4);
    }

    #[test]
    fn region_assignment() {
        let mut b = broker(&["WEST", "EAST"], true);
        assert_eq!(b.assign_point(&VisitPoint::new("w", 50.0, -100.0)), Some("WEST"));
        assert_eq!(b.assign_point(&VisitPoint::new("e", 100.0, -100.0)), Some("EAST"));
        b.handle_visit_point(point("w", 50.0, -100.0));
        b.handle_visit_point(point("e", 100.0, -100.0));
        b.handle_visit_point(point("w2", 10.0, -30.0));
        assert_eq!(b.owner_of("w"), Some("WEST"));
        assert_eq!(b.owner_of("e"), Some("EAST"));
        assert_eq!(b.owner_of("w2"), Some("WEST"));

        let colors = drain(&mut b)
            .into_iter()
            .filter_map(|o| match o {
                Outbound::ViewPoint(vp) => Some((vp.label, vp.color)),
                _ => None,
            })
            .collect::<Vec<_>>();
        assert_eq!(
            colors,
            vec![
                ("visit_w".to_string(), "yellow".to_string()),
                ("visit_e".to_string(), "red".to_string()),
                ("visit_w2".to_string(), "yellow".to_string()),
            ]
        );
    }

    #[test]
    fn region_with_single_vehicle() {
        let b = broker(&["SOLO"], true);
        assert_eq!(b.assign_point(&VisitPoint::new("e", 100.0, 0.0)), Some("SOLO"));
    }

    #[test]
    fn duplicates_keep_their_owner() {
        let mut b = broker(&["A", "B"], false);
        b.handle_visit_point(point("p", 1.0, 1.0));
        b.handle_visit_point(point("p", 1.0, 1.0));
        b.handle_visit_point(point("q", 2.0, 2.0));
        assert_eq!(b.owner_of("p"), Some("A"));
        assert_eq!(b.owner_of("q"), Some("B"));
        assert_eq!(b.points_received(), 3);
        assert_eq!(b.points_assigned(), 2);
    }

    #[test]
    fn late_points_after_lastpoint_are_forwarded() {
        let mut b = broker(&["A", "B"], false);
        b.handle_visit_point(point("1", 0.0, 0.0));
        b.handle_visit_point(PointReport::LastPoint);
        b.iterate(0.0);
        drain(&mut b);

        b.handle_visit_point(point("2", 0.0, 0.0));
        b.iterate(1.0);
        let fwd = forwarded(&drain(&mut b));
        assert_eq!(fwd, vec![("B".to_string(), "x=0,y=0,id=2".to_string())]);
    }

    #[test]
    fn lastpoint_sent_exactly_once() {
        let mut b = broker(&["A", "B"], false);
        b.handle_visit_point(point("1", 0.0, 0.0));
        b.handle_visit_point(PointReport::LastPoint);
        b.handle_visit_point(PointReport::LastPoint);
        for t in 0..5 {
            b.iterate(t as f64);
        }
        let lastpoints = forwarded(&drain(&mut b))
            .into_iter()
            .filter(|(_, p)| p == "lastpoint")
            .count();
        assert_eq!(lastpoints, 2);
    }

    #[test]
    fn new_batch_after_lastpoint() {
        let mut b = broker(&["A"], false);
        b.handle_visit_point(point("1", 0.0, 0.0));
        b.handle_visit_point(PointReport::LastPoint);
        b.iterate(0.0);
        drain(&mut b);

        b.handle_visit_point(PointReport::FirstPoint);
        b.handle_visit_point(point("1", 0.0, 0.0));
        let fwd = forwarded(&drain(&mut b));
        assert_eq!(
            fwd,
            vec![
                ("A".to_string(), "firstpoint".to_string()),
                ("A".to_string(), "x=0,y=0,id=1".to_string()),
            ]
        );
        assert!(!b.last_point_sent());
    }

    #[test]
    fn back_to_back_batches_within_one_tick() {
        let mut b = broker(&["A", "B"], false);
        b.handle_visit_point(PointReport::FirstPoint);
        b.handle_visit_point(point("1", 0.0, 0.0));
        b.handle_visit_point(PointReport::LastPoint);
        b.handle_visit_point(PointReport::FirstPoint);
        b.handle_visit_point(point("1", 5.0, 5.0));
        b.handle_visit_point(PointReport::LastPoint);
        b.iterate(0.0);
        b.iterate(1.0);

        let fwd = forwarded(&drain(&mut b));
        let pairs = |v: &[(&str, &str)]| {
            v.iter()
                .map(|(vehicle, report)| (vehicle.to_string(), report.to_string()))
                .collect::<Vec<_>>()
        };
        assert_eq!(
            fwd,
            pairs(&[
                ("A", "firstpoint"),
                ("B", "firstpoint"),
                ("A", "x=0,y=0,id=1"),
                ("A", "lastpoint"),
                ("B", "lastpoint"),
                ("A", "firstpoint"),
                ("B", "firstpoint"),
                ("B", "x=5,y=5,id=1"),
                ("A", "lastpoint"),
                ("B", "lastpoint"),
            ])
        );
        assert_eq!(b.owner_of("1"), Some("B"));
        assert_eq!(b.points_assigned(), 2);
    }

    #[test]
    fn queues_until_vehicles_exist() {
        let mut b = broker(&[], false);
        b.handle_visit_point(point("1", 0.0, 0.0));
        b.handle_visit_point(point("2", 5.0, 0.0));
        b.handle_visit_point(PointReport::LastPoint);
        b.iterate(0.0);
        assert_eq!(b.queued(), 2);
        assert!(forwarded(&drain(&mut b)).is_empty());

        b.add_vehicle("henry");
        b.iterate(1.0);
        let out = drain(&mut b);
        assert_eq!(out[0], Outbound::ShareConfig(ShareRoute::visit_point_for("HENRY")));
        let fwd = forwarded(&out);
        assert_eq!(fwd.len(), 4);
        assert_eq!(fwd[0].1, "firstpoint");
        assert_eq!(fwd[3].1, "lastpoint");
        assert_eq!(b.queued(), 0);
    }

    #[test]
    fn vehicle_joining_mid_batch_gets_firstpoint() {
        let mut b = broker(&["A"], false);
        b.handle_visit_point(point("1", 0.0, 0.0));
        drain(&mut b);
        b.add_vehicle("B");
        b.handle_visit_point(point("2", 0.0, 0.0));
        let fwd = forwarded(&drain(&mut b));
        assert_eq!(
            fwd,
            vec![
                ("B".to_string(), "firstpoint".to_string()),
                ("B".to_string(), "x=0,y=0,id=2".to_string()),
            ]
        );
    }
}
