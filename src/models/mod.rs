pub mod address;
pub mod event;
pub mod timestamp;

pub use address::{is_dotted_quad, DOTTED_QUAD_TOKEN};
pub use event::{BruteForceFinding, EventType, SecurityEvent};
pub use timestamp::SyslogTimestamp;

/// A recognised sshd line, split into header and message body
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedLine {
    pub timestamp: SyslogTimestamp,
    /// Header timestamp text exactly as it appeared in the log
    pub raw_timestamp: String,
    pub host: String,
    pub process_tag: String,
    /// Digits between the brackets, kept as text
    pub pid: Option<String>,
    pub message: String,
}
