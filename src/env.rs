//! Environment variable names used by this crate for convenient
//! configuration of the logger from microservices.
//!
//! These are purely helpers; [`RabbitLogger`](crate::client::RabbitLogger)
//! itself never reads the environment.

use crate::config::LoggerConfig;

/// URI scheme, `amqp` or `amqps`.
pub const RABBIT_LOG_PROTOCOL_ENV: &str = "RABBIT_LOG_PROTOCOL";

/// IANA timezone name for envelope timestamps.
pub const RABBIT_LOG_TIMEZONE_ENV: &str = "RABBIT_LOG_TIMEZONE";

/// Broker host name.
pub const RABBIT_LOG_HOST_ENV: &str = "RABBIT_LOG_HOST";

/// Broker port.
pub const RABBIT_LOG_PORT_ENV: &str = "RABBIT_LOG_PORT";

/// Broker user name.
pub const RABBIT_LOG_USER_ENV: &str = "RABBIT_LOG_USER";

/// Broker password.
pub const RABBIT_LOG_PASSWORD_ENV: &str = "RABBIT_LOG_PASSWORD";

/// Virtual host.
pub const RABBIT_LOG_VHOST_ENV: &str = "RABBIT_LOG_VHOST";

/// Target queue name.
pub const RABBIT_LOG_QUEUE_ENV: &str = "RABBIT_LOG_QUEUE";

/// Deployment environment label.
pub const RABBIT_LOG_ENV_ENV: &str = "RABBIT_LOG_ENV";

/// Project label.
pub const RABBIT_LOG_PROJECT_ENV: &str = "RABBIT_LOG_PROJECT";

const DEFAULT_PORT: u16 = 5672;

/// Read an environment variable or fall back to a provided default.
pub fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

fn port_or_default(raw: &str) -> u16 {
    raw.trim().parse().unwrap_or(DEFAULT_PORT)
}

impl LoggerConfig {
    /// Build a config from the `RABBIT_LOG_*` variables.
    ///
    /// Missing connection settings fall back to a local RabbitMQ with the
    /// `guest` account; protocol and timezone are left blank so that
    /// [`LoggerConfig::with_defaults`] applies.
    pub fn from_env() -> Self {
        LoggerConfig {
            protocol: env_or(RABBIT_LOG_PROTOCOL_ENV, ""),
            timezone: env_or(RABBIT_LOG_TIMEZONE_ENV, ""),
            hostname: env_or(RABBIT_LOG_HOST_ENV, "localhost"),
            port: port_or_default(&env_or(RABBIT_LOG_PORT_ENV, "5672")),
            username: env_or(RABBIT_LOG_USER_ENV, "guest"),
            password: env_or(RABBIT_LOG_PASSWORD_ENV, "guest"),
            vhost: env_or(RABBIT_LOG_VHOST_ENV, "/"),
            queue: env_or(RABBIT_LOG_QUEUE_ENV, "log-queue"),
            env: env_or(RABBIT_LOG_ENV_ENV, ""),
            project_name: env_or(RABBIT_LOG_PROJECT_ENV, ""),
        }
    }
}
