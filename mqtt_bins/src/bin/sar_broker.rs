use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use log::info;
use sarroute_controller::{load_config, Broker, BrokerConfig};
use sarroute_mqtt::{run_role, BusArgs};

/// Shoreside task broker: assigns incoming points to vehicles
#[derive(Parser)]
#[command(version, about, long_about = None)]
struct Cli {
    /// Broker configuration (JSON)
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Bus community the broker runs in
    #[arg(long, default_value = "shoreside")]
    community: String,

    /// Extra vehicle names, added to those in the config file
    #[arg(long = "vehicle", value_name = "NAME")]
    vehicles: Vec<String>,

    #[command(flatten)]
    bus: BusArgs,
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    let mut config: BrokerConfig = load_config(cli.config.as_deref())?;
    config.vnames.extend(cli.vehicles.iter().cloned());
    let config = config.normalized();
    info!("vehicles: {:?}", config.vnames);

    let mut broker = Broker::new(config);
    run_role(&mut broker, &cli.community, &cli.bus)
}
