use crate::error::BoxError;
use async_trait::async_trait;
use std::fmt;

/// One open connection plus one channel to a message broker.
///
/// Implementations are responsible for moving encoded log documents to a
/// concrete broker (RabbitMQ via [`AmqpTransport`], an in-memory recorder
/// in tests, etc). [`RabbitLogger`] owns the transport exclusively and
/// never calls it concurrently.
///
/// [`AmqpTransport`]: crate::amqp::AmqpTransport
/// [`RabbitLogger`]: crate::client::RabbitLogger
#[async_trait]
pub trait Transport: Send + Sync {
    /// Declare `queue` as durable, non-exclusive and non-auto-delete with
    /// no extra arguments.
    ///
    /// Must succeed when the queue already exists with the same properties.
    async fn declare_queue(&self, queue: &str) -> Result<(), BoxError>;

    /// Publish one JSON document to `queue` through the default exchange.
    ///
    /// **Parameters**
    /// - `queue`: used as the routing key.
    /// - `body`: UTF-8 JSON, sent with content type `application/json`.
    ///
    /// **Returns**
    /// - `Ok(())` once the broker client accepted the frame. Delivery is
    ///   not confirmed.
    /// - `Err(..)` on transport failure.
    async fn publish(&self, queue: &str, body: &[u8]) -> Result<(), BoxError>;

    /// Close the channel. May fail if it is already closed.
    async fn close_channel(&self) -> Result<(), BoxError>;

    /// Close the connection. May fail if it is already closed.
    async fn close_connection(&self) -> Result<(), BoxError>;
}

/// What a [`Diagnostic`] reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiagnosticKind {
    /// A log call could not be serialized or published.
    PublishFailed,
    ChannelCloseFailed,
    ConnectionCloseFailed,
    /// The configured timezone was unknown and UTC is used instead.
    TimezoneFallback,
    /// `release` was called on a logger that is already closed.
    AlreadyReleased,
}

/// Local record of a failure the logger swallowed instead of returning.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    pub kind: DiagnosticKind,
    pub message: String,
}

impl Diagnostic {
    /// Diagnostic of `kind` with a human-readable message.
    pub fn new(kind: DiagnosticKind, message: impl Into<String>) -> Self {
        Diagnostic {
            kind,
            message: message.into(),
        }
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}: {}", self.kind, self.message)
    }
}

/// Receives errors that logging calls and `release` do not propagate.
///
/// Called inline on the logging path, so implementations must be cheap
/// and must not call back into the logger.
pub trait DiagnosticSink: Send + Sync {
    /// Record one diagnostic.
    fn report(&self, diagnostic: Diagnostic);
}

/// Default sink that forwards diagnostics to `tracing`.
#[derive(Clone, Copy, Debug, Default)]
pub struct TracingDiagnostics;

impl DiagnosticSink for TracingDiagnostics {
    fn report(&self, diagnostic: Diagnostic) {
        match diagnostic.kind {
            DiagnosticKind::PublishFailed => {
                tracing::error!(error = %diagnostic.message, "failed to send log to queue")
            }
            DiagnosticKind::ChannelCloseFailed => {
                tracing::error!(error = %diagnostic.message, "failed to close RabbitMQ channel")
            }
            DiagnosticKind::ConnectionCloseFailed => {
                tracing::error!(error = %diagnostic.message, "failed to close RabbitMQ connection")
            }
            DiagnosticKind::TimezoneFallback => {
                tracing::warn!(detail = %diagnostic.message, "unknown timezone, using UTC")
            }
            DiagnosticKind::AlreadyReleased => {
                tracing::debug!(detail = %diagnostic.message, "logger already released")
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capture::CapturedOutput;

    #[test]
    fn diagnostic_display_includes_kind() {
        let d = Diagnostic::new(DiagnosticKind::PublishFailed, "broker gone");
        assert_eq!(d.to_string(), "PublishFailed: broker gone");
    }

    #[test]
    fn tracing_sink_maps_kinds_to_levels() {
        let output = CapturedOutput::default();
        let writer = output.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_writer(move || writer.clone())
            .with_ansi(false)
            .with_max_level(tracing::Level::DEBUG)
            .finish();

        tracing::subscriber::with_default(subscriber, || {
            TracingDiagnostics.report(Diagnostic::new(DiagnosticKind::PublishFailed, "broker gone"));
            TracingDiagnostics.report(Diagnostic::new(DiagnosticKind::ChannelCloseFailed, "c1"));
            TracingDiagnostics.report(Diagnostic::new(DiagnosticKind::ConnectionCloseFailed, "c2"));
            TracingDiagnostics.report(Diagnostic::new(DiagnosticKind::TimezoneFallback, "Mars/Base"));
            TracingDiagnostics.report(Diagnostic::new(DiagnosticKind::AlreadyReleased, "again"));
        });

        let lines: Vec<String> = output.contents().lines().map(str::to_string).collect();
        assert_eq!(lines.len(), 5);
        let expect = [
            ("ERROR", "failed to send log to queue", "broker gone"),
            ("ERROR", "failed to close RabbitMQ channel", "c1"),
            ("ERROR", "failed to close RabbitMQ connection", "c2"),
            ("WARN", "unknown timezone, using UTC", "Mars/Base"),
            ("DEBUG", "logger already released", "again"),
        ];
        for (line, (level, text, detail)) in lines.iter().zip(expect) {
            assert!(line.contains(level), "{line}");
            assert!(line.contains(text), "{line}");
            assert!(line.contains(detail), "{line}");
        }
    }
}
