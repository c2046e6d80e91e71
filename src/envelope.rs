use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use serde::Serialize;

use crate::config::LoggerConfig;
use crate::level::Severity;

/// Zone used when the configured timezone name cannot be resolved.
pub const FALLBACK_TIMEZONE: Tz = Tz::UTC;

/// Contextual fields attached to every published record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Envelope {
    /// `YYYY-MM-DD` in the configured zone.
    pub date: String,
    /// `YYYY-MM-DD HH:MM:SS` in the configured zone.
    pub date_time: String,
    /// Unix seconds.
    pub timestamp: i64,
    pub environment: String,
    pub project_name: String,
    pub log_level: &'static str,
}

impl Envelope {
    /// Build the envelope for a fixed instant.
    pub fn at(now: DateTime<Utc>, tz: &Tz, config: &LoggerConfig, level: Severity) -> Self {
        let local = now.with_timezone(tz);
        Envelope {
            date: local.format("%Y-%m-%d").to_string(),
            date_time: local.format("%Y-%m-%d %H:%M:%S").to_string(),
            timestamp: local.timestamp(),
            environment: config.env.clone(),
            project_name: config.project_name.clone(),
            log_level: level.as_str(),
        }
    }

    /// Build the envelope for the current wall-clock time.
    pub fn now(tz: &Tz, config: &LoggerConfig, level: Severity) -> Self {
        Self::at(Utc::now(), tz, config, level)
    }
}

/// Resolve an IANA zone name such as `Asia/Aqtau`.
///
/// Returns `None` for unknown names; callers fall back to
/// [`FALLBACK_TIMEZONE`].
pub fn resolve_timezone(name: &str) -> Option<Tz> {
    name.trim().parse::<Tz>().ok()
}
