pub mod adapter;
pub mod broker;
pub mod config;
pub mod genpath;
pub mod nav;
pub mod regen;
pub mod registry;
pub mod rescue;


pub use adapter::{Mail, MailError, Outbound};
pub use broker::Broker;
pub use config::{load_config, BrokerConfig, ConfigError, GenPathConfig, RescueConfig};
pub use genpath::GenPath;
pub use rescue::Rescue;

/// One protocol participant. A role is driven by a bus loop: each inbound
/// message is handed to `on_mail`, `iterate` runs on a fixed tick, and
/// whatever the role wants published is pulled with `next_outbound`.
pub trait Role {
    fn name(&self) -> &str;

    /// Bus variables this role consumes.
    fn subscriptions(&self) -> Vec<String>;

    fn on_mail(&mut self, mail: Mail, now: f64);

    fn iterate(&mut self, now: f64);

    fn next_outbound(&mut self) -> Option<Outbound>;
}

/// Takes every pending outbound message from `role`.
pub fn drain(role: &mut dyn Role) -> Vec<Outbound> {
    std::iter::from_fn(|| role.next_outbound()).collect()
}
