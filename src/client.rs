use crate::config::LoggerConfig;
use crate::envelope::{resolve_timezone, Envelope, FALLBACK_TIMEZONE};
use crate::error::LoggerError;
use crate::level::Severity;
use crate::payload;
use crate::record::LogMessage;
use crate::sink::{Diagnostic, DiagnosticKind, DiagnosticSink, Transport};
use chrono_tz::Tz;
use std::sync::Arc;
use tokio::sync::Mutex;

/// Structured logger that publishes JSON records to a RabbitMQ queue.
///
/// Each call merges an envelope (`date`, `dateTime`, `timestamp`,
/// `environment`, `projectName`, `logLevel`) with the caller's
/// [`LogMessage`] and publishes the result to [`LoggerConfig::queue`].
///
/// The severity helpers ([`info`](Self::info), [`error`](Self::error),
/// [`warning`](Self::warning), [`debug`](Self::debug)) never return an
/// error: failures go to the [`DiagnosticSink`] given at construction.
/// Use [`send`](Self::send) to observe them directly.
///
/// The transport sits behind an async mutex, so a logger shared through
/// `Arc` serializes concurrent publishes on its single channel. Call
/// [`release`](Self::release) before dropping it.
pub struct RabbitLogger {
    config: LoggerConfig,
    timezone: Tz,
    transport: Mutex<Option<Box<dyn Transport>>>,
    diagnostics: Arc<dyn DiagnosticSink>,
}

impl RabbitLogger {
    /// Connect to RabbitMQ, open a channel and declare the queue,
    /// reporting swallowed errors through `tracing`.
    ///
    /// **Returns**
    /// - A ready logger once the queue is declared.
    /// - [`LoggerError::Connect`], [`LoggerError::OpenChannel`] or
    ///   [`LoggerError::DeclareQueue`] naming the failed stage. Nothing is
    ///   left open on failure.
    #[cfg(feature = "amqp")]
    pub async fn connect(config: LoggerConfig) -> Result<Self, LoggerError> {
        Self::connect_with_diagnostics(config, Arc::new(crate::sink::TracingDiagnostics)).await
    }

    /// Same as [`connect`](Self::connect) with a custom diagnostic sink.
    #[cfg(feature = "amqp")]
    pub async fn connect_with_diagnostics(
        config: LoggerConfig,
        diagnostics: Arc<dyn DiagnosticSink>,
    ) -> Result<Self, LoggerError> {
        use crate::amqp::AmqpTransport;

        let config = config.with_defaults();
        let transport = AmqpTransport::open(&config.amqp_uri()).await?;
        Self::with_transport(config, Box::new(transport), diagnostics).await
    }

    /// Build a logger over an already-open transport.
    ///
    /// Applies config defaults, declares the queue and resolves the
    /// timezone. If the declare fails the transport is closed before the
    /// error is returned.
    pub async fn with_transport(
        config: LoggerConfig,
        transport: Box<dyn Transport>,
        diagnostics: Arc<dyn DiagnosticSink>,
    ) -> Result<Self, LoggerError> {
        let config = config.with_defaults();

        if let Err(source) = transport.declare_queue(&config.queue).await {
            close_transport(transport.as_ref(), diagnostics.as_ref()).await;
            return Err(LoggerError::DeclareQueue {
                queue: config.queue,
                source,
            });
        }

        let timezone = match resolve_timezone(&config.timezone) {
            Some(tz) => tz,
            None => {
                diagnostics.report(Diagnostic::new(
                    DiagnosticKind::TimezoneFallback,
                    format!("unknown timezone `{}`, falling back to UTC", config.timezone),
                ));
                FALLBACK_TIMEZONE
            }
        };

        tracing::info!(
            uri = %config.redacted_uri(),
            queue = %config.queue,
            "Connected to RabbitMQ (ClickHouse Logger)."
        );

        Ok(RabbitLogger {
            config,
            timezone,
            transport: Mutex::new(Some(transport)),
            diagnostics,
        })
    }

    /// Effective configuration, with defaults applied.
    pub fn config(&self) -> &LoggerConfig {
        &self.config
    }

    /// Zone used for envelope timestamps.
    pub fn timezone(&self) -> Tz {
        self.timezone
    }

    /// True once [`release`](Self::release) has run.
    pub async fn is_closed(&self) -> bool {
        self.transport.lock().await.is_none()
    }

    /// Build, merge and publish one record, returning any failure.
    ///
    /// **Returns**
    /// - `Ok(())` once the transport accepted the document.
    /// - [`LoggerError::Closed`] after [`release`](Self::release).
    /// - [`LoggerError::Serialize`] or [`LoggerError::Publish`] otherwise.
    pub async fn send(&self, level: Severity, record: &LogMessage) -> Result<(), LoggerError> {
        let guard = self.transport.lock().await;
        let transport = guard.as_deref().ok_or(LoggerError::Closed)?;

        let envelope = Envelope::now(&self.timezone, &self.config, level);
        let body = payload::encode(&envelope, record)?;

        transport
            .publish(&self.config.queue, &body)
            .await
            .map_err(LoggerError::Publish)
    }

    /// Publish with `level`, reporting failures instead of returning them.
    pub async fn log(&self, level: Severity, record: LogMessage) {
        if let Err(e) = self.send(level, &record).await {
            self.diagnostics.report(Diagnostic::new(
                DiagnosticKind::PublishFailed,
                format!("{level} log dropped: {e}"),
            ));
        }
    }

    /// Publish with `logLevel` `INFO`.
    pub async fn info(&self, record: LogMessage) {
        self.log(Severity::Info, record).await
    }

    /// Publish with `logLevel` `Error`.
    pub async fn error(&self, record: LogMessage) {
        self.log(Severity::Error, record).await
    }

    /// Publish with `logLevel` `Warning`.
    pub async fn warning(&self, record: LogMessage) {
        self.log(Severity::Warning, record).await
    }

    /// Publish with `logLevel` `DEBUG`.
    pub async fn debug(&self, record: LogMessage) {
        self.log(Severity::Debug, record).await
    }

    /// Close the channel, then the connection.
    ///
    /// Close failures are reported to the diagnostic sink. Waits for any
    /// in-flight publish. Calling it again is a no-op.
    pub async fn release(&self) {
        let transport = self.transport.lock().await.take();
        match transport {
            Some(transport) => close_transport(transport.as_ref(), self.diagnostics.as_ref()).await,
            None => self.diagnostics.report(Diagnostic::new(
                DiagnosticKind::AlreadyReleased,
                format!("release called again for queue `{}`", self.config.queue),
            )),
        }
    }
}

async fn close_transport(transport: &dyn Transport, diagnostics: &dyn DiagnosticSink) {
    if let Err(e) = transport.close_channel().await {
        diagnostics.report(Diagnostic::new(DiagnosticKind::ChannelCloseFailed, e.to_string()));
    }
    if let Err(e) = transport.close_connection().await {
        diagnostics.report(Diagnostic::new(DiagnosticKind::ConnectionCloseFailed, e.to_string()));
    }
}

impl Drop for RabbitLogger {
    fn drop(&mut self) {
        if self.transport.get_mut().is_some() {
            tracing::warn!(queue = %self.config.queue, "RabbitLogger dropped without release");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::{FailAt, MemoryDiagnostics, MemoryTransport};

    fn config() -> LoggerConfig {
        LoggerConfig {
            hostname: "localhost".to_string(),
            port: 5672,
            queue: "log-queue".to_string(),
            env: "development".to_string(),
            project_name: "ExampleProject".to_string(),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn applies_defaults_on_construction() {
        let logger = RabbitLogger::with_transport(
            config(),
            Box::new(MemoryTransport::new()),
            Arc::new(MemoryDiagnostics::new()),
        )
        .await
        .unwrap();

        assert_eq!(logger.config().protocol, "amqp");
        assert_eq!(logger.config().timezone, "Asia/Aqtau");
        assert_eq!(logger.timezone(), chrono_tz::Asia::Aqtau);
        logger.release().await;
    }

    #[tokio::test]
    async fn unknown_timezone_falls_back_to_utc() {
        let diagnostics = MemoryDiagnostics::new();
        let logger = RabbitLogger::with_transport(
            LoggerConfig {
                timezone: "Nowhere/Special".to_string(),
                ..config()
            },
            Box::new(MemoryTransport::new()),
            Arc::new(diagnostics.clone()),
        )
        .await
        .unwrap();

        assert_eq!(logger.timezone(), Tz::UTC);
        assert_eq!(diagnostics.kinds(), [DiagnosticKind::TimezoneFallback]);
        logger.release().await;
    }

    #[tokio::test]
    async fn declare_failure_closes_transport() {
        let transport = MemoryTransport::new().fail_at(FailAt::Declare);
        let result = RabbitLogger::with_transport(
            config(),
            Box::new(transport.clone()),
            Arc::new(MemoryDiagnostics::new()),
        )
        .await;

        match result {
            Err(LoggerError::DeclareQueue { queue, .. }) => assert_eq!(queue, "log-queue"),
            Err(other) => panic!("unexpected error: {other}"),
            Ok(_) => panic!("construction should fail"),
        }
        assert!(!transport.is_channel_open());
        assert!(!transport.is_connection_open());
    }

    #[tokio::test]
    async fn send_after_release_is_closed() {
        let logger = RabbitLogger::with_transport(
            config(),
            Box::new(MemoryTransport::new()),
            Arc::new(MemoryDiagnostics::new()),
        )
        .await
        .unwrap();

        logger.release().await;
        assert!(logger.is_closed().await);
        let err = logger
            .send(Severity::Info, &LogMessage::new("late"))
            .await
            .unwrap_err();
        assert!(matches!(err, LoggerError::Closed));
    }
}
