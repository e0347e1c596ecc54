//! Topic naming and the forwarding rules that stand in for the shoreside
//! bridge: sharing routes registered by the broker, and node messages
//! addressed to another vehicle.

use log::{debug, info};
use sarroute_controller::adapter::ShareRoute;
use sarroute_controller::Outbound;

pub const TOPIC_ROOT: &str = "/sarroute";

pub fn topic(community: &str, var: &str) -> String {
    format!("{}/{}/{}", TOPIC_ROOT, community, var)
}

/// Splits `/sarroute/<community>/<var>` into its two parts.
pub fn split_topic(topic: &str) -> Option<(&str, &str)> {
    let rest = topic.strip_prefix(TOPIC_ROOT)?.strip_prefix('/')?;
    match rest.split_once('/') {
        Some((community, var)) if !community.is_empty() && !var.is_empty() => Some((community, var)),
        _ => None,
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Delivery {
    pub topic: String,
    pub payload: String,
}

/// Turns a role's outbound messages into MQTT deliveries for one community.
pub struct Bridge {
    community: String,
    shares: Vec<ShareRoute>,
}

impl Bridge {
    pub fn new(community: &str) -> Self {
        Self {
            community: community.to_string(),
            shares: Vec::new(),
        }
    }

    pub fn community(&self) -> &str {
        &self.community
    }

    pub fn shares(&self) -> &[ShareRoute] {
        &self.shares
    }

    pub fn deliveries(&mut self, out: &Outbound) -> Vec<Delivery> {
        let var = out.var();
        let payload = out.payload();
        let mut deliveries = vec![Delivery {
            topic: topic(&self.community, &var),
            payload: payload.clone(),
        }];

        match out {
            Outbound::ShareConfig(route) => {
                if !self.shares.contains(route) {
                    info!("share {}", route);
                    self.shares.push(route.clone());
                }
            }
            Outbound::NodeMessage(msg) => {
                debug!("relay {} to {}", msg.var_name, msg.dest_node);
                deliveries.push(Delivery {
                    topic: topic(&msg.dest_node, &msg.var_name),
                    payload: msg.string_val.clone(),
                });
            }
            _ => {}
        }

        for share in self.shares.iter().filter(|s| s.src_var == var) {
            deliveries.push(Delivery {
                topic: topic(&share.community, &share.dest_var),
                payload: payload.clone(),
            });
        }
        deliveries
    }
}

#[cfg(test)]
mod tests {
    use sarroute_structs::node_message::NodeMessage;
    use sarroute_structs::report::PointReport;
    use sarroute_structs::VisitPoint;

    use super::*;

    #[test]
    fn topics() {
        assert_eq!(topic("shoreside", "VISIT_POINT"), "/sarroute/shoreside/VISIT_POINT");
        assert_eq!(split_topic("/sarroute/HENRY/NAV_X"), Some(("HENRY", "NAV_X")));
        assert_eq!(split_topic("/sarroute/HENRY"), None);
        assert_eq!(split_topic("/other/HENRY/NAV_X"), None);
    }

    #[test]
    fn broker_points_reach_vehicle() {
        let mut bridge = Bridge::new("shoreside");
        let point = Outbound::VisitPointFor {
            vehicle: "HENRY".into(),
            report: PointReport::Point(VisitPoint::new("7", 1.0, 2.0)),
        };
        // Nothing is forwarded before the share is registered.
        assert_eq!(bridge.deliveries(&point).len(), 1);

        let share = Outbound::ShareConfig(ShareRoute::visit_point_for("HENRY"));
        bridge.deliveries(&share);
        bridge.deliveries(&share);
        assert_eq!(bridge.shares().len(), 1);

        let d = bridge.deliveries(&point);
        assert_eq!(
            d,
            vec![
                Delivery {
                    topic: "/sarroute/shoreside/VISIT_POINT_HENRY".into(),
                    payload: "x=1,y=2,id=7".into(),
                },
                Delivery {
                    topic: "/sarroute/HENRY/VISIT_POINT".into(),
                    payload: "x=1,y=2,id=7".into(),
                },
            ]
        );
    }

    #[test]
    fn node_message_relayed_to_teammate() {
        let mut bridge = Bridge::new("abe");
        let msg = Outbound::NodeMessage(NodeMessage {
            src_node: "abe".into(),
            dest_node: "ben".into(),
            var_name: "SURVEY_UPDATE".into(),
            string_val: "pts={1,1},label=Waypoints".into(),
        });
        let d = bridge.deliveries(&msg);
        assert_eq!(d.len(), 2);
        assert_eq!(d[0].topic, "/sarroute/abe/NODE_MESSAGE_LOCAL");
        assert_eq!(d[1].topic, "/sarroute/ben/SURVEY_UPDATE");
        assert_eq!(d[1].payload, "pts={1,1},label=Waypoints");
    }
}
