use std::fmt;

/// Severity attached to every published record as `logLevel`.
///
/// Downstream ClickHouse consumers match the wire labels literally, mixed
/// casing included.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Severity {
    Info,
    Error,
    Warning,
    Debug,
}

impl Severity {
    /// Every level, in helper order.
    pub const ALL: [Severity; 4] = [
        Severity::Info,
        Severity::Error,
        Severity::Warning,
        Severity::Debug,
    ];

    /// Label written to `logLevel`.
    pub fn as_str(self) -> &'static str {
        match self {
            Severity::Info => "INFO",
            Severity::Error => "Error",
            Severity::Warning => "Warning",
            Severity::Debug => "DEBUG",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wire_labels() {
        let labels: Vec<_> = Severity::ALL.iter().map(|s| s.to_string()).collect();
        assert_eq!(labels, ["INFO", "Error", "Warning", "DEBUG"]);
    }
}
