pub mod client;

pub use client::JupiterClient;
