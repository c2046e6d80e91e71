use std::error::Error;

/// Error currency of [`Transport`](crate::sink::Transport) implementations.
pub type BoxError = Box<dyn Error + Send + Sync>;

/// Errors surfaced by [`RabbitLogger`](crate::client::RabbitLogger).
///
/// Construction errors name the stage that failed. Errors raised while
/// logging are only returned from [`RabbitLogger::send`]; the severity
/// helpers hand them to the diagnostic sink instead.
///
/// [`RabbitLogger::send`]: crate::client::RabbitLogger::send
#[derive(thiserror::Error, Debug)]
pub enum LoggerError {
    #[error("failed to connect to RabbitMQ: {0}")]
    Connect(#[source] BoxError),

    #[error("failed to open a channel: {0}")]
    OpenChannel(#[source] BoxError),

    #[error("failed to declare queue `{queue}`: {source}")]
    DeclareQueue {
        queue: String,
        #[source]
        source: BoxError,
    },

    #[error("failed to serialize log payload: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("failed to publish log to queue: {0}")]
    Publish(#[source] BoxError),

    #[error("logger has already been released")]
    Closed,
}

impl LoggerError {
    /// True for errors raised while opening the logger.
    pub fn is_setup(&self) -> bool {
        matches!(
            self,
            LoggerError::Connect(_) | LoggerError::OpenChannel(_) | LoggerError::DeclareQueue { .. }
        )
    }
}
