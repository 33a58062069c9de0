pub mod anchor;
pub mod config;
pub mod error;
pub mod templates;

pub use config::Config;
pub use error::ConfigError;
