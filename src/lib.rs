pub mod config;
pub mod envelope;
pub mod error;
pub mod level;
pub mod payload;
pub mod record;
pub mod sink;

#[cfg(feature = "amqp")]
pub mod amqp;

pub mod client;
pub mod env;
pub mod init;
pub mod memory;

#[cfg(test)]
mod capture;

pub use client::RabbitLogger;
pub use config::LoggerConfig;
pub use error::LoggerError;
pub use level::Severity;
pub use record::LogMessage;
