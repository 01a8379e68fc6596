//! Syslog header parser for sshd lines.
//!
//! `<Mon> <D> <HH:MM:SS> <host> <tag>[<pid>]: <message>`

use crate::models::{ParsedLine, SyslogTimestamp};
use regex::Regex;
use std::sync::LazyLock;

static RE_SYSLOG_HEADER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^(?P<ts>(?P<month>[A-Z][a-z]{2})\s+(?P<day>\d{1,2})\s+(?P<time>\d{2}:\d{2}:\d{2}))\s+(?P<host>\S+)\s+(?P<tag>[^\s\[\]:]+)(?:\[(?P<pid>[0-9]+)\])?:\s+(?P<msg>.*)$",
    )
    .expect("regex")
});

pub const SSH_DAEMON_TAG: &str = "sshd";

/// Turns raw auth log lines into [`ParsedLine`]s, rejecting everything that
/// is not an SSH daemon line.
#[derive(Debug, Clone)]
pub struct LineParser {
    daemon_tag: String,
}

impl LineParser {
    pub fn new() -> Self {
        Self::with_daemon_tag(SSH_DAEMON_TAG)
    }

    pub fn with_daemon_tag(tag: &str) -> Self {
        LineParser {
            daemon_tag: tag.to_string(),
        }
    }

    /// Parse one line. `None` means "not a recognised sshd line", which is a
    /// normal outcome rather than an error.
    pub fn parse_line(&self, line: &str) -> Option<ParsedLine> {
        let line = line.trim_end_matches(['\n', '\r']);
        let caps = RE_SYSLOG_HEADER.captures(line)?;

        let tag = caps.name("tag")?.as_str();
        if tag != self.daemon_tag {
            return None;
        }

        let timestamp = SyslogTimestamp::from_parts(
            caps.name("month")?.as_str(),
            caps.name("day")?.as_str(),
            caps.name("time")?.as_str(),
        )?;

        Some(ParsedLine {
            timestamp,
            raw_timestamp: caps.name("ts")?.as_str().to_string(),
            host: caps.name("host")?.as_str().to_string(),
            process_tag: tag.to_string(),
            pid: caps.name("pid").map(|m| m.as_str().to_string()),
            message: caps.name("msg")?.as_str().to_string(),
        })
    }

    /// Parse every line, keeping the recognised ones in input order
    pub fn parse_all<'a, I>(&self, lines: I) -> Vec<ParsedLine>
    where
        I: IntoIterator<Item = &'a str>,
    {
        lines
            .into_iter()
            .filter_map(|line| self.parse_line(line))
            .collect()
    }
}

impl Default for LineParser {
    fn default() -> Self {
        Self::new()
    }
}
