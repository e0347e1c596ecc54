use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use log::info;
use paho_mqtt::Message;
use sarroute_controller::adapter::VISIT_POINT;
use sarroute_structs::report::PointReport;
use sarroute_structs::VisitPoint;
use sarroute_mqtt::{connect, topic};
use serde::Deserialize;

/// Publishes one batch of points to the broker
#[derive(Parser)]
#[command(version, about, long_about = None)]
struct Cli {
    /// JSON list of `{"id": .., "x": .., "y": ..}`
    points: PathBuf,

    #[arg(long, default_value = "mqtt://localhost:1883")]
    server: String,

    /// Community the broker runs in
    #[arg(long, default_value = "shoreside")]
    community: String,
}

#[derive(Deserialize)]
struct PointEntry {
    id: String,
    x: f64,
    y: f64,
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    let text = std::fs::read_to_string(&cli.points)
        .with_context(|| format!("reading {}", cli.points.display()))?;
    let entries: Vec<PointEntry> = serde_json::from_str(&text).context("parsing point list")?;

    let mut reports = vec![PointReport::FirstPoint];
    reports.extend(
        entries
            .into_iter()
            .map(|e| PointReport::Point(VisitPoint::new(e.id, e.x, e.y))),
    );
    reports.push(PointReport::LastPoint);

    let cli_mqtt = connect(&cli.server)?;
    let visit_topic = topic(&cli.community, VISIT_POINT);
    for report in reports.iter() {
        cli_mqtt.publish(Message::new(visit_topic.clone(), report.to_string(), 1))?;
    }
    info!("published {} points to {}", reports.len() - 2, visit_topic);
    cli_mqtt.disconnect(None)?;
    Ok(())
}
