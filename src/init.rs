use tracing::{Level, Subscriber};
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::fmt::{self, MakeWriter};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::Registry;

/// Console output for the logger's own diagnostics.
///
/// Published records never pass through here; this only controls where
/// connection messages and swallowed failures reported by
/// [`TracingDiagnostics`](crate::sink::TracingDiagnostics) end up.
///
/// **Fields**
/// - `max_level`: most verbose level printed. `DEBUG` also shows repeated
///   `release` calls.
/// - `ansi`: colored output.
/// - `with_target`: print the module path of each event.
#[derive(Clone, Debug)]
pub struct ConsoleConfig {
    pub max_level: Level,
    pub ansi: bool,
    pub with_target: bool,
}

impl Default for ConsoleConfig {
    fn default() -> Self {
        Self {
            max_level: Level::INFO,
            ansi: true,
            with_target: false,
        }
    }
}

/// Error returned when a global subscriber is already installed.
#[derive(thiserror::Error, Debug)]
#[error("failed to install console subscriber: {0}")]
pub struct InitError(#[from] tracing::subscriber::SetGlobalDefaultError);

/// Build the console subscriber without installing it.
///
/// `writer` receives the formatted lines; [`init_console_with_config`]
/// passes stdout.
pub fn console_subscriber<W>(config: &ConsoleConfig, writer: W) -> impl Subscriber + Send + Sync
where
    W: for<'w> MakeWriter<'w> + Send + Sync + 'static,
{
    let fmt_layer = fmt::layer()
        .with_writer(writer)
        .with_ansi(config.ansi)
        .with_target(config.with_target);
    Registry::default()
        .with(fmt_layer)
        .with(LevelFilter::from_level(config.max_level))
}

/// Install a global `fmt` subscriber configured by [`ConsoleConfig`].
///
/// Applications that already own a `tracing` subscriber should skip this
/// and let the logger's events flow into theirs.
pub fn init_console_with_config(config: ConsoleConfig) -> Result<(), InitError> {
    tracing::subscriber::set_global_default(console_subscriber(&config, std::io::stdout))?;
    Ok(())
}

/// Install the console subscriber with [`ConsoleConfig::default`].
pub fn init_console() -> Result<(), InitError> {
    init_console_with_config(ConsoleConfig::default())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capture::CapturedOutput;

    #[test]
    fn default_config_prints_info_and_hides_debug() {
        let output = CapturedOutput::default();
        let writer = output.clone();
        let config = ConsoleConfig {
            ansi: false,
            ..Default::default()
        };

        tracing::subscriber::with_default(console_subscriber(&config, move || writer.clone()), || {
            tracing::info!(queue = "log-queue", "connected");
            tracing::debug!("hidden detail");
        });

        let text = output.contents();
        assert!(text.contains("INFO"));
        assert!(text.contains("connected"));
        assert!(text.contains("queue=\"log-queue\""));
        assert!(!text.contains("hidden detail"));
        assert!(!text.contains("rabbit_log_sink::init"));
    }

    #[test]
    fn debug_level_and_target_are_configurable() {
        let output = CapturedOutput::default();
        let writer = output.clone();
        let config = ConsoleConfig {
            max_level: Level::DEBUG,
            ansi: false,
            with_target: true,
        };

        tracing::subscriber::with_default(console_subscriber(&config, move || writer.clone()), || {
            tracing::debug!("shown detail");
        });

        let text = output.contents();
        assert!(text.contains("shown detail"));
        assert!(text.contains("rabbit_log_sink::init"));
    }
}
