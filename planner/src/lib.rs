pub mod assign;
pub mod greedy;

pub use assign::{Alternating, Assigner, Axis, BoxedAssigner, ByRegion};
pub use greedy::build_tour;
