pub mod config;
pub mod detection;
pub mod error;
pub mod input;
pub mod models;
pub mod output;
pub mod pipeline;

// Re-export commonly used types
pub use models::{BruteForceFinding, EventType, ParsedLine, SecurityEvent, SyslogTimestamp};
pub use detection::{BruteForceDetector, EventClassifier, WindowStatus};
pub use input::{LineParser, LogReader};
pub use error::{AuditError, Result};
pub use pipeline::{AnalysisReport, Analyzer};
