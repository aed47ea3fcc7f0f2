//! Infrastructure layer: configuration, in-memory stores, outbound mail.

pub mod config;
pub mod mail;
pub mod store;

pub use config::{AppConfig, BootstrapRoot, ConfigError};
