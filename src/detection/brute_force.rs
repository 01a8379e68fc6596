//! Brute-force window detection
//!
//! Tracks failed password attempts per source address and reports, for each
//! address, the earliest moment at which `attempt_threshold` attempts fit in a
//! span of at most `window_seconds`. An address is reported at most once.

use regex::Regex;
use std::collections::HashMap;
use std::sync::LazyLock;

use crate::models::{
    is_dotted_quad, BruteForceFinding, ParsedLine, SyslogTimestamp, DOTTED_QUAD_TOKEN,
};

pub const DEFAULT_WINDOW_SECONDS: i64 = 600;
pub const DEFAULT_ATTEMPT_THRESHOLD: usize = 5;

/// "Failed password for [invalid user ]<user> from <ip> ..."
static RE_FAILED_ATTEMPT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(r"Failed password for (?:invalid user )?\S+ from {DOTTED_QUAD_TOKEN}"))
        .expect("regex")
});

/// Source address of a failed password attempt, if the message is one and
/// carries a valid dotted quad
pub fn failed_attempt_ip(message: &str) -> Option<&str> {
    let ip = RE_FAILED_ATTEMPT.captures(message)?.get(1)?.as_str();
    is_dotted_quad(ip).then_some(ip)
}

/// Per-address detection state. `Reported` is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WindowStatus {
    #[default]
    Idle,
    Accumulating,
    Reported,
}

#[derive(Debug, Clone)]
struct AttemptRecord {
    at: i64,
    raw_timestamp: String,
}

/// Append-only attempt history for one address
#[derive(Debug, Clone, Default)]
struct IpAccumulator {
    attempts: Vec<AttemptRecord>,
    status: WindowStatus,
}

impl IpAccumulator {
    fn push(&mut self, at: i64, raw_timestamp: &str) {
        self.attempts.push(AttemptRecord {
            at,
            raw_timestamp: raw_timestamp.to_string(),
        });
    }

    /// Index of the earliest attempt still within `window_seconds` of the newest.
    /// An earlier attempt stamped after the newest one ends the scan.
    fn window_start(&self, window_seconds: i64) -> usize {
        let Some(newest) = self.attempts.last() else {
            return 0;
        };
        let mut start = self.attempts.len() - 1;
        while start > 0 {
            let delta = newest.at - self.attempts[start - 1].at;
            if !(0..=window_seconds).contains(&delta) {
                break;
            }
            start -= 1;
        }
        start
    }
}

/// Detects the earliest qualifying brute-force window per source address
pub struct BruteForceDetector {
    accumulators: HashMap<String, IpAccumulator>,
    /// In emission order
    findings: Vec<BruteForceFinding>,
    window_seconds: i64,
    attempt_threshold: usize,
}

impl BruteForceDetector {
    /// Create a detector with the default 10 minute / 5 attempt rule
    pub fn new() -> Self {
        Self::with_config(DEFAULT_WINDOW_SECONDS, DEFAULT_ATTEMPT_THRESHOLD)
    }

    pub fn with_config(window_seconds: i64, attempt_threshold: usize) -> Self {
        BruteForceDetector {
            accumulators: HashMap::new(),
            findings: Vec::new(),
            window_seconds: window_seconds.max(0),
            attempt_threshold: attempt_threshold.max(1),
        }
    }

    /// Feed one parsed line; anything but a failed password attempt with a
    /// valid address is ignored
    pub fn process(&mut self, line: &ParsedLine) -> Option<&BruteForceFinding> {
        let ip = failed_attempt_ip(&line.message)?;
        self.record_attempt(ip, &line.timestamp, &line.raw_timestamp)
    }

    /// Record one failed attempt. Returns the finding if this attempt is the
    /// one that first completes a qualifying window for `ip`.
    pub fn record_attempt(
        &mut self,
        ip: &str,
        timestamp: &SyslogTimestamp,
        raw_timestamp: &str,
    ) -> Option<&BruteForceFinding> {
        if !is_dotted_quad(ip) {
            return None;
        }

        let entry = self.accumulators.entry(ip.to_string()).or_default();
        entry.push(timestamp.seconds_since_year_start(), raw_timestamp);

        if entry.status == WindowStatus::Reported {
            return None;
        }

        let start = entry.window_start(self.window_seconds);
        let window_size = entry.attempts.len() - start;
        if window_size < self.attempt_threshold {
            entry.status = WindowStatus::Accumulating;
            return None;
        }

        entry.status = WindowStatus::Reported;
        let finding = BruteForceFinding {
            source_ip: ip.to_string(),
            attempt_count: window_size,
            first_attempt: entry.attempts[start].raw_timestamp.clone(),
            last_attempt: entry.attempts[entry.attempts.len() - 1].raw_timestamp.clone(),
        };
        log::warn!(
            "BRUTE FORCE DETECTED: {} made {} failed attempts between {} and {} (window: {}s)",
            finding.source_ip,
            finding.attempt_count,
            finding.first_attempt,
            finding.last_attempt,
            self.window_seconds
        );
        self.findings.push(finding);
        self.findings.last()
    }

    pub fn status(&self, ip: &str) -> WindowStatus {
        self.accumulators
            .get(ip)
            .map(|e| e.status)
            .unwrap_or_default()
    }

    /// Total attempts recorded for `ip`, including those after a finding
    pub fn attempt_count(&self, ip: &str) -> usize {
        self.accumulators
            .get(ip)
            .map(|e| e.attempts.len())
            .unwrap_or(0)
    }

    pub fn findings(&self) -> &[BruteForceFinding] {
        &self.findings
    }

    pub fn into_findings(self) -> Vec<BruteForceFinding> {
        self.findings
    }

    /// One full pass over `lines` with a fresh detector
    pub fn detect_all(
        lines: &[ParsedLine],
        window_seconds: i64,
        attempt_threshold: usize,
    ) -> Vec<BruteForceFinding> {
        let mut detector = Self::with_config(window_seconds, attempt_threshold);
        for line in lines {
            detector.process(line);
        }
        detector.into_findings()
    }
}

impl Default for BruteForceDetector {
    fn default() -> Self {
        Self::new()
    }
}
