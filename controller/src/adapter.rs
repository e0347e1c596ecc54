//! Translation between bus variables and the typed messages the roles
//! handle. Inbound `(var, payload)` pairs become [`Mail`]; [`Outbound`]
//! values render back into `(var, payload)` pairs.

use std::fmt;
use std::str::FromStr;

use sarroute_structs::node_message::NodeMessage;
use sarroute_structs::plan::Route;
use sarroute_structs::report::{extract_id, PointReport};
use sarroute_structs::view::ViewPoint;
use sarroute_structs::{FormatError, VisitPoint};
use thiserror::Error;

pub const VISIT_POINT: &str = "VISIT_POINT";
pub const SWIMMER_ALERT: &str = "SWIMMER_ALERT";
pub const FOUND_SWIMMER: &str = "FOUND_SWIMMER";
pub const NAV_X: &str = "NAV_X";
pub const NAV_Y: &str = "NAV_Y";
pub const REGENERATE_SUFFIX: &str = "_REGENERATE";

pub const VIEW_POINT: &str = "VIEW_POINT";
pub const VIEW_SEGLIST: &str = "VIEW_SEGLIST";
pub const MISSION_COMPLETE: &str = "MISSION_COMPLETE";
pub const BROKER_CONFIG: &str = "USR_BROKER_CONFIG";
pub const NODE_MESSAGE_LOCAL: &str = "NODE_MESSAGE_LOCAL";

#[derive(Debug, Error)]
pub enum MailError {
    #[error("unknown variable '{0}'")]
    UnknownVar(String),

    #[error("bad {var} payload: {source}")]
    Format {
        var: String,
        #[source]
        source: FormatError,
    },

    #[error("bad {var} payload '{payload}'")]
    BadPayload { var: String, payload: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegenerateSignal {
    Request,
    FinishedMission,
    /// Acknowledgement posted after a rebuild. Never triggers one.
    Regenerated,
}

impl RegenerateSignal {
    pub fn triggers(&self) -> bool {
        matches!(self, RegenerateSignal::Request | RegenerateSignal::FinishedMission)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            RegenerateSignal::Request => "regenerate_request",
            RegenerateSignal::FinishedMission => "finished_mission",
            RegenerateSignal::Regenerated => "regenerated_already",
        }
    }
}

impl FromStr for RegenerateSignal {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "true" | "regenerate_request" => Ok(RegenerateSignal::Request),
            "finished_mission" => Ok(RegenerateSignal::FinishedMission),
            "regenerated_already" => Ok(RegenerateSignal::Regenerated),
            _ => Err(()),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Mail {
    VisitPoint(PointReport),
    SwimmerAlert(VisitPoint),
    FoundSwimmer(String),
    NavX(f64),
    NavY(f64),
    Regenerate { var: String, signal: RegenerateSignal },
}

impl Mail {
    pub fn parse(var: &str, payload: &str) -> Result<Mail, MailError> {
        let format_err = |source| MailError::Format {
            var: var.to_string(),
            source,
        };
        let bad_payload = || MailError::BadPayload {
            var: var.to_string(),
            payload: payload.to_string(),
        };

        match var {
            VISIT_POINT => payload.parse().map(Mail::VisitPoint).map_err(format_err),
            SWIMMER_ALERT => match payload.parse::<PointReport>().map_err(format_err)? {
                PointReport::Point(p) => Ok(Mail::SwimmerAlert(p)),
                _ => Err(bad_payload()),
            },
            FOUND_SWIMMER => extract_id(payload).map(Mail::FoundSwimmer).map_err(format_err),
            NAV_X | NAV_Y => {
                let v = payload
                    .trim()
                    .parse::<f64>()
                    .ok()
                    .filter(|v| v.is_finite())
                    .ok_or_else(bad_payload)?;
                Ok(if var == NAV_X { Mail::NavX(v) } else { Mail::NavY(v) })
            }
            _ if var.ends_with(REGENERATE_SUFFIX) => {
                let signal = payload.parse().map_err(|_| bad_payload())?;
                Ok(Mail::Regenerate {
                    var: var.to_string(),
                    signal,
                })
            }
            _ => Err(MailError::UnknownVar(var.to_string())),
        }
    }

    pub fn var(&self) -> &str {
        match self {
            Mail::VisitPoint(_) => VISIT_POINT,
            Mail::SwimmerAlert(_) => SWIMMER_ALERT,
            Mail::FoundSwimmer(_) => FOUND_SWIMMER,
            Mail::NavX(_) => NAV_X,
            Mail::NavY(_) => NAV_Y,
            Mail::Regenerate { var, .. } => var.as_str(),
        }
    }
}

/// A shoreside sharing rule: `src_var` posted on the shore is delivered to
/// `community` under the name `dest_var`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShareRoute {
    pub src_var: String,
    pub dest_var: String,
    pub community: String,
}

impl ShareRoute {
    pub fn visit_point_for(vehicle: &str) -> Self {
        Self {
            src_var: visit_point_var(vehicle),
            dest_var: VISIT_POINT.to_string(),
            community: vehicle.to_string(),
        }
    }
}

impl fmt::Display for ShareRoute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ROUTE = {},{},{}", self.src_var, self.dest_var, self.community)
    }
}

impl FromStr for ShareRoute {
    type Err = FormatError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let malformed = || FormatError::Malformed(s.to_string());
        let (key, value) = s.split_once('=').ok_or_else(malformed)?;
        if !key.trim().eq_ignore_ascii_case("route") {
            return Err(malformed());
        }
        let fields = value.split(',').map(str::trim).collect::<Vec<_>>();
        match fields.as_slice() {
            [src, dest, community] if !src.is_empty() && !dest.is_empty() && !community.is_empty() => {
                Ok(ShareRoute {
                    src_var: src.to_string(),
                    dest_var: dest.to_string(),
                    community: community.to_string(),
                })
            }
            _ => Err(malformed()),
        }
    }
}

pub fn visit_point_var(vehicle: &str) -> String {
    format!("{}_{}", VISIT_POINT, vehicle.to_uppercase())
}

#[derive(Debug, Clone, PartialEq)]
pub enum Outbound {
    WaypointUpdate { var: String, route: Route },
    ViewSegList(Route),
    ViewPoint(ViewPoint),
    MissionComplete(bool),
    RegenerateStatus { var: String, signal: RegenerateSignal },
    ShareConfig(ShareRoute),
    VisitPointFor { vehicle: String, report: PointReport },
    NodeMessage(NodeMessage),
}

impl Outbound {
    pub fn var(&self) -> String {
        match self {
            Outbound::WaypointUpdate { var, .. } | Outbound::RegenerateStatus { var, .. } => {
                var.clone()
            }
            Outbound::ViewSegList(_) => VIEW_SEGLIST.to_string(),
            Outbound::ViewPoint(_) => VIEW_POINT.to_string(),
            Outbound::MissionComplete(_) => MISSION_COMPLETE.to_string(),
            Outbound::ShareConfig(_) => BROKER_CONFIG.to_string(),
            Outbound::VisitPointFor { vehicle, .. } => visit_point_var(vehicle),
            Outbound::NodeMessage(_) => NODE_MESSAGE_LOCAL.to_string(),
        }
    }

    pub fn payload(&self) -> String {
        match self {
            Outbound::WaypointUpdate { route, .. } => format!("points = {}", route.to_spec()),
            Outbound::ViewSegList(route) => route.to_spec(),
            Outbound::ViewPoint(vp) => vp.to_string(),
            Outbound::MissionComplete(done) => done.to_string(),
            Outbound::RegenerateStatus { signal, .. } => signal.as_str().to_string(),
            Outbound::ShareConfig(route) => route.to_string(),
            Outbound::VisitPointFor { report, .. } => report.to_string(),
            Outbound::NodeMessage(msg) => msg.to_spec(),
        }
    }
}

/// Inverse of the `points = <spec>` waypoint update payload.
pub fn parse_waypoint_update(payload: &str) -> Result<Route, FormatError> {
    let spec = payload
        .trim()
        .strip_prefix("points")
        .map(str::trim_start)
        .and_then(|s| s.strip_prefix('='))
        .ok_or_else(|| FormatError::Malformed(payload.to_string()))?;
    Route::from_spec(spec.trim())
}
