use std::collections::BTreeMap;
use std::path::Path;

use sarroute_planner::{Alternating, Axis, BoxedAssigner, ByRegion};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read config: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid config: {0}")]
    Json(#[from] serde_json::Error),
}

/// Reads a role configuration from a JSON file. Missing fields take their
/// defaults; no file at all gives the default configuration.
pub fn load_config<T: DeserializeOwned + Default>(path: Option<&Path>) -> Result<T, ConfigError> {
    match path {
        Some(path) => Ok(serde_json::from_str(&std::fs::read_to_string(path)?)?),
        None => Ok(T::default()),
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BrokerConfig {
    pub vnames: Vec<String>,
    pub assign_by_region: bool,
    pub region_boundary: f64,
    pub region_axis: Axis,
    pub vehicle_colors: BTreeMap<String, String>,
}

impl Default for BrokerConfig {
    fn default() -> Self {
        let vehicle_colors = [("HENRY", "yellow"), ("GILDA", "red")]
            .into_iter()
            .map(|(v, c)| (v.to_string(), c.to_string()))
            .collect();
        Self {
            vnames: Vec::new(),
            assign_by_region: false,
            region_boundary: ByRegion::DEFAULT_BOUNDARY,
            region_axis: Axis::X,
            vehicle_colors,
        }
    }
}

impl BrokerConfig {
    /// Vehicle names are compared upper-case everywhere.
    pub fn normalized(mut self) -> Self {
        for v in self.vnames.iter_mut() {
            *v = v.trim().to_uppercase();
        }
        self.vnames.retain(|v| !v.is_empty());
        self.vehicle_colors = self
            .vehicle_colors
            .into_iter()
            .map(|(v, c)| (v.to_uppercase(), c))
            .collect();
        self
    }

    pub fn assigner(&self) -> BoxedAssigner {
        if self.assign_by_region {
            Box::new(ByRegion {
                axis: self.region_axis,
                boundary: self.region_boundary,
            })
        } else {
            Box::new(Alternating)
        }
    }

    pub fn color_for(&self, idx: usize, vehicle: &str) -> String {
        match self.vehicle_colors.get(vehicle) {
            Some(c) => c.clone(),
            None if idx == 0 => "yellow".to_string(),
            None => "red".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GenPathConfig {
    pub updates_var: String,
    pub regenerate_var: String,
    pub visit_radius: f64,
    pub nav_stale_secs: f64,
}

impl Default for GenPathConfig {
    fn default() -> Self {
        Self {
            updates_var: "WPT_UPDATE".to_string(),
            regenerate_var: "GENPATH_REGENERATE".to_string(),
            visit_radius: 5.0,
            nav_stale_secs: 10.0,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RescueConfig {
    pub host_name: String,
    pub dest_name: String,
    pub updates_var: String,
    pub regenerate_var: String,
    pub visit_radius: f64,
    pub nav_stale_secs: f64,
}

impl Default for RescueConfig {
    fn default() -> Self {
        Self {
            host_name: "abe".to_string(),
            dest_name: "ben".to_string(),
            updates_var: "SURVEY_UPDATE".to_string(),
            regenerate_var: "GENRESCUE_REGENERATE".to_string(),
            visit_radius: 5.0,
            nav_stale_secs: 10.0,
        }
    }
}
