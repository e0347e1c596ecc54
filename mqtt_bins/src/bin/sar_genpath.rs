use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use sarroute_controller::{load_config, GenPath, GenPathConfig};
use sarroute_mqtt::{run_role, BusArgs};

/// Vehicle route generator for broker-assigned points
#[derive(Parser)]
#[command(version, about, long_about = None)]
struct Cli {
    /// Route generator configuration (JSON)
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Vehicle name, as known to the broker
    #[arg(long)]
    community: String,

    #[command(flatten)]
    bus: BusArgs,
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();
    let config: GenPathConfig = load_config(cli.config.as_deref())?;
    let mut genpath = GenPath::new(config);
    run_role(&mut genpath, &cli.community.to_uppercase(), &cli.bus)
}
