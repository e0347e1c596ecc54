use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use sarroute_controller::{load_config, Rescue, RescueConfig};
use sarroute_mqtt::{run_role, BusArgs};

/// Rescue vehicle: routes through swimmer alerts and shares the route
/// with its teammate
#[derive(Parser)]
#[command(version, about, long_about = None)]
struct Cli {
    /// Rescue configuration (JSON)
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Bus community; defaults to the configured host name
    #[arg(long)]
    community: Option<String>,

    #[command(flatten)]
    bus: BusArgs,
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();
    let config: RescueConfig = load_config(cli.config.as_deref())?;
    let community = cli.community.unwrap_or_else(|| config.host_name.clone());
    let mut rescue = Rescue::new(config);
    run_role(&mut rescue, &community, &cli.bus)
}
