//! Configuration module

#[allow(clippy::module_inception)]
pub mod config;

pub use config::{Config, RuntimeConfig, SalesforceSection, DEFAULT_API_VERSION, DEFAULT_LOGIN_URL};
