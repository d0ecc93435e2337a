pub mod aggregator;
pub mod common;
pub mod jupiter;
pub mod kamino;
pub mod symmetry;
pub mod wallet;
