//! Test utilities: synthetic log-tree fixtures for the three sources.

mod fixtures;
mod world;

pub use fixtures::*;
pub use world::LogWorld;
