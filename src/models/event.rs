use serde::{Deserialize, Serialize};
use std::fmt;

use super::SyslogTimestamp;

/// Closed taxonomy of security events emitted by the classifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EventType {
    FailedLogin,
    InvalidUser,
    RootLogin,
    RootFailed,
    SuspiciousConnection,
}

impl EventType {
    pub fn as_str(&self) -> &'static str {
        match self {
            EventType::FailedLogin => "FAILED_LOGIN",
            EventType::InvalidUser => "INVALID_USER",
            EventType::RootLogin => "ROOT_LOGIN",
            EventType::RootFailed => "ROOT_FAILED",
            EventType::SuspiciousConnection => "SUSPICIOUS_CONNECTION",
        }
    }
}

impl fmt::Display for EventType {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One classified auth log line.
///
/// Identity is the full tuple: two events with equal fields are the same event.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SecurityEvent {
    /// "Mon D HH:MM:SS", day not zero-padded
    pub timestamp: String,
    pub event_type: EventType,
    pub username: String,
    pub source_ip: String,
}

impl SecurityEvent {
    pub fn new(
        timestamp: &SyslogTimestamp,
        event_type: EventType,
        username: &str,
        source_ip: &str,
    ) -> Self {
        SecurityEvent {
            timestamp: timestamp.to_string(),
            event_type,
            username: username.to_string(),
            source_ip: source_ip.to_string(),
        }
    }
}

/// Earliest qualifying brute-force window for one source address
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BruteForceFinding {
    pub source_ip: String,
    pub attempt_count: usize,
    pub first_attempt: String,
    pub last_attempt: String,
}
