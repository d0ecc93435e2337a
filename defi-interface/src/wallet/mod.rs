pub mod client;

pub use client::WalletClient;
