use std::time::{Duration, Instant};

use anyhow::{bail, Context, Result};
use log::{debug, info, warn};
use paho_mqtt::Message;
use sarroute_controller::{Mail, Role};

use crate::bus::{split_topic, topic, Bridge};

/// Bus options shared by every role binary.
#[derive(clap::Args, Debug, Clone)]
pub struct BusArgs {
    /// MQTT server URI
    #[arg(long, default_value = "mqtt://localhost:1883")]
    pub server: String,

    /// Milliseconds between iterations
    #[arg(long, default_value_t = 250)]
    pub tick_ms: u64,
}

pub fn connect(server: &str) -> Result<paho_mqtt::Client> {
    let mqtt_opts = paho_mqtt::CreateOptionsBuilder::new()
        .server_uri(server)
        .finalize();
    let mqtt_cli = paho_mqtt::Client::new(mqtt_opts).context("creating mqtt client")?;
    let conn_opts = paho_mqtt::ConnectOptionsBuilder::new()
        .keep_alive_interval(Duration::from_secs(20))
        .finalize();
    mqtt_cli
        .connect(conn_opts)
        .with_context(|| format!("connecting to {}", server))?;
    Ok(mqtt_cli)
}

fn flush(cli: &paho_mqtt::Client, bridge: &mut Bridge, role: &mut dyn Role) -> Result<()> {
    while let Some(out) = role.next_outbound() {
        for d in bridge.deliveries(&out) {
            debug!("publish {} = {}", d.topic, d.payload);
            cli.publish(Message::new(d.topic, d.payload, 1))?;
        }
    }
    Ok(())
}

/// Drives `role` on the bus until the connection drops.
pub fn run_role(role: &mut dyn Role, community: &str, args: &BusArgs) -> Result<()> {
    let cli = connect(&args.server)?;
    for var in role.subscriptions() {
        cli.subscribe(&topic(community, &var), 1)?;
    }
    let rx = cli.start_consuming();
    let mut bridge = Bridge::new(community);

    let start = Instant::now();
    let tick = Duration::from_millis(args.tick_ms);
    info!("{} running as {} on {}", role.name(), community, args.server);

    loop {
        role.iterate(start.elapsed().as_secs_f64());
        flush(&cli, &mut bridge, role)?;

        let last_updated = Instant::now();
        loop {
            let timeout = tick.saturating_sub(last_updated.elapsed());
            match rx.recv_timeout(timeout) {
                Ok(None) => debug!("empty message"),
                Ok(Some(msg)) => {
                    let Some((_, var)) = split_topic(msg.topic()) else {
                        warn!("unexpected topic {}", msg.topic());
                        continue;
                    };
                    match Mail::parse(var, &msg.payload_str()) {
                        Ok(mail) => role.on_mail(mail, start.elapsed().as_secs_f64()),
                        Err(e) => warn!("dropped: {}", e),
                    }
                    flush(&cli, &mut bridge, role)?;
                }
                Err(e) => {
                    if e.is_disconnected() {
                        bail!("mqtt disconnected");
                    } else if e.is_timeout() {
                        break;
                    }
                }
            }
        }
    }
}
