pub mod bus;
pub mod runner;

pub use bus::{split_topic, topic, Bridge, Delivery};
pub use runner::{connect, run_role, BusArgs};
