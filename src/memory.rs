use crate::error::BoxError;
use crate::sink::{Diagnostic, DiagnosticKind, DiagnosticSink, Transport};
use async_trait::async_trait;
use std::collections::BTreeSet;
use std::sync::{Arc, Mutex, MutexGuard};

/// A message accepted by [`MemoryTransport`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Published {
    pub routing_key: String,
    pub body: Vec<u8>,
}

impl Published {
    /// Decode the body as a JSON value.
    pub fn json(&self) -> serde_json::Result<serde_json::Value> {
        serde_json::from_slice(&self.body)
    }
}

/// Stage at which [`MemoryTransport`] should fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailAt {
    Declare,
    Publish,
    CloseChannel,
    CloseConnection,
}

#[derive(Default)]
struct State {
    queues: BTreeSet<String>,
    declare_calls: usize,
    published: Vec<Published>,
    failures: Vec<FailAt>,
    channel_open: bool,
    connection_open: bool,
    close_order: Vec<&'static str>,
}

fn lock(state: &Mutex<State>) -> MutexGuard<'_, State> {
    state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// A transport that keeps everything in memory.
///
/// Useful for unit tests that want to inspect published documents
/// without a broker. Clones share state, so a test can keep one handle
/// while the logger owns the other. Closing twice fails, like a real
/// channel would.
#[derive(Clone)]
pub struct MemoryTransport {
    state: Arc<Mutex<State>>,
}

impl MemoryTransport {
    /// Open transport with no injected failures.
    pub fn new() -> Self {
        let state = State {
            channel_open: true,
            connection_open: true,
            ..Default::default()
        };
        MemoryTransport {
            state: Arc::new(Mutex::new(state)),
        }
    }

    /// Make every subsequent call at `stage` fail.
    pub fn fail_at(self, stage: FailAt) -> Self {
        lock(&self.state).failures.push(stage);
        self
    }

    /// Messages accepted so far, oldest first.
    pub fn published(&self) -> Vec<Published> {
        lock(&self.state).published.clone()
    }

    /// Distinct queue names declared successfully.
    pub fn declared_queues(&self) -> Vec<String> {
        lock(&self.state).queues.iter().cloned().collect()
    }

    /// Declare attempts, including failed ones.
    pub fn declare_calls(&self) -> usize {
        lock(&self.state).declare_calls
    }

    /// False after a successful channel close.
    pub fn is_channel_open(&self) -> bool {
        lock(&self.state).channel_open
    }

    /// False after a successful connection close.
    pub fn is_connection_open(&self) -> bool {
        lock(&self.state).connection_open
    }

    /// `"channel"` / `"connection"` in the order they were closed.
    pub fn close_order(&self) -> Vec<&'static str> {
        lock(&self.state).close_order.clone()
    }
}

impl Default for MemoryTransport {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Transport for MemoryTransport {
    async fn declare_queue(&self, queue: &str) -> Result<(), BoxError> {
        let mut state = lock(&self.state);
        state.declare_calls += 1;
        if state.failures.contains(&FailAt::Declare) {
            return Err(format!("PRECONDITION_FAILED - cannot declare queue '{queue}'").into());
        }
        state.queues.insert(queue.to_string());
        Ok(())
    }

    async fn publish(&self, queue: &str, body: &[u8]) -> Result<(), BoxError> {
        let mut state = lock(&self.state);
        if state.failures.contains(&FailAt::Publish) || !state.channel_open {
            return Err("channel is not open".into());
        }
        state.published.push(Published {
            routing_key: queue.to_string(),
            body: body.to_vec(),
        });
        Ok(())
    }

    async fn close_channel(&self) -> Result<(), BoxError> {
        let mut state = lock(&self.state);
        state.close_order.push("channel");
        if state.failures.contains(&FailAt::CloseChannel) {
            return Err("channel close timed out".into());
        }
        if !state.channel_open {
            return Err("channel already closed".into());
        }
        state.channel_open = false;
        Ok(())
    }

    async fn close_connection(&self) -> Result<(), BoxError> {
        let mut state = lock(&self.state);
        state.close_order.push("connection");
        if state.failures.contains(&FailAt::CloseConnection) {
            return Err("connection reset by peer".into());
        }
        if !state.connection_open {
            return Err("connection already closed".into());
        }
        state.connection_open = false;
        Ok(())
    }
}

/// A [`DiagnosticSink`] that keeps every report for later assertions.
#[derive(Clone, Default)]
pub struct MemoryDiagnostics {
    reports: Arc<Mutex<Vec<Diagnostic>>>,
}

impl MemoryDiagnostics {
    /// Empty sink.
    pub fn new() -> Self {
        Self::default()
    }

    /// Every report received, oldest first.
    pub fn reports(&self) -> Vec<Diagnostic> {
        self.reports
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    /// Kinds of [`reports`](Self::reports), in order.
    pub fn kinds(&self) -> Vec<DiagnosticKind> {
        self.reports().into_iter().map(|d| d.kind).collect()
    }
}

impl DiagnosticSink for MemoryDiagnostics {
    fn report(&self, diagnostic: Diagnostic) {
        self.reports
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push(diagnostic);
    }
}
