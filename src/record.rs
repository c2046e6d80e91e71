use serde::Serialize;

fn is_blank(value: &Option<String>) -> bool {
    value.as_deref().map_or(true, str::is_empty)
}

/// Caller-supplied part of a published log document.
///
/// `message` is always serialized. The optional fields are left out of the
/// JSON entirely when they are `None` or empty, never emitted as `null`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LogMessage {
    #[serde(skip_serializing_if = "is_blank")]
    pub action_name: Option<String>,
    #[serde(skip_serializing_if = "is_blank")]
    pub action_stage: Option<String>,
    #[serde(skip_serializing_if = "is_blank")]
    pub request_id: Option<String>,
    pub message: String,
    #[serde(skip_serializing_if = "is_blank")]
    pub transaction_id: Option<String>,
    #[serde(skip_serializing_if = "is_blank")]
    pub context: Option<String>,
    #[serde(skip_serializing_if = "is_blank")]
    pub response: Option<String>,
    #[serde(skip_serializing_if = "is_blank")]
    pub backtrace: Option<String>,
}

impl LogMessage {
    /// Record with only `message` set.
    pub fn new(message: impl Into<String>) -> Self {
        LogMessage {
            message: message.into(),
            ..Default::default()
        }
    }

    /// Set `actionName`.
    pub fn action_name(mut self, value: impl Into<String>) -> Self {
        self.action_name = Some(value.into());
        self
    }

    /// Set `actionStage`.
    pub fn action_stage(mut self, value: impl Into<String>) -> Self {
        self.action_stage = Some(value.into());
        self
    }

    /// Set `requestId`.
    pub fn request_id(mut self, value: impl Into<String>) -> Self {
        self.request_id = Some(value.into());
        self
    }

    /// Set `transactionId`.
    pub fn transaction_id(mut self, value: impl Into<String>) -> Self {
        self.transaction_id = Some(value.into());
        self
    }

    /// Set `context`.
    pub fn context(mut self, value: impl Into<String>) -> Self {
        self.context = Some(value.into());
        self
    }

    /// Set `response`.
    pub fn response(mut self, value: impl Into<String>) -> Self {
        self.response = Some(value.into());
        self
    }

    /// Set `backtrace`.
    pub fn backtrace(mut self, value: impl Into<String>) -> Self {
        self.backtrace = Some(value.into());
        self
    }
}
