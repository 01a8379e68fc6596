//! Single-pass analysis: read, parse, then classify and detect as two
//! independent passes over the same ordered parsed lines.

use std::path::Path;

use crate::config::{Config, DetectionConfig};
use crate::detection::{BruteForceDetector, EventClassifier};
use crate::error::Result;
use crate::input::{LineParser, LogReader};
use crate::models::{BruteForceFinding, ParsedLine, SecurityEvent};

/// Line counts for one run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LineStats {
    pub total_lines: usize,
    pub parsed_lines: usize,
}

/// Both result collections of one run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AnalysisReport {
    pub events: Vec<SecurityEvent>,
    pub findings: Vec<BruteForceFinding>,
    pub stats: LineStats,
}

pub struct Analyzer {
    parser: LineParser,
    detection: DetectionConfig,
}

impl Analyzer {
    pub fn new() -> Self {
        Self::from_config(&Config::default())
    }

    pub fn from_config(config: &Config) -> Self {
        Analyzer {
            parser: LineParser::with_daemon_tag(&config.input.daemon_tag),
            detection: config.detection.clone(),
        }
    }

    /// Parse all lines, keeping log order
    pub fn parse<S: AsRef<str>>(&self, lines: &[S]) -> Vec<ParsedLine> {
        self.parser.parse_all(lines.iter().map(|l| AsRef::<str>::as_ref(l)))
    }

    pub fn security_events(&self, parsed: &[ParsedLine]) -> Vec<SecurityEvent> {
        EventClassifier::classify_all(parsed, &self.detection.placeholder_username)
    }

    pub fn brute_force_findings(&self, parsed: &[ParsedLine]) -> Vec<BruteForceFinding> {
        BruteForceDetector::detect_all(
            parsed,
            self.detection.window_seconds,
            self.detection.attempt_threshold,
        )
    }

    pub fn analyze_lines<S: AsRef<str>>(&self, lines: &[S]) -> AnalysisReport {
        let parsed = self.parse(lines);
        let report = AnalysisReport {
            events: self.security_events(&parsed),
            findings: self.brute_force_findings(&parsed),
            stats: LineStats {
                total_lines: lines.len(),
                parsed_lines: parsed.len(),
            },
        };
        log::info!(
            "Analyzed {} line(s): {} sshd line(s), {} security event(s), {} brute-force finding(s)",
            report.stats.total_lines,
            report.stats.parsed_lines,
            report.events.len(),
            report.findings.len()
        );
        report
    }

    pub fn analyze_file(&self, path: &Path) -> Result<AnalysisReport> {
        let lines = LogReader::new(path.to_path_buf()).read_lines()?;
        Ok(self.analyze_lines(lines.as_slice()))
    }
}

impl Default for Analyzer {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::EventType;

    #[test]
    fn test_analyze_lines_runs_both_passes() {
        let lines = [
            "Jan 10 12:00:00 server sshd[1]: Failed password for root from 2.2.2.2",
            "Jan 10 12:01:00 server sshd[1]: Failed password for root from 2.2.2.2",
            "Jan 10 12:02:00 server sshd[1]: Failed password for root from 2.2.2.2",
            "Jan 10 12:02:30 server CRON[77]: pam_unix(cron:session): session opened",
            "Jan 10 12:03:00 server sshd[1]: Failed password for root from 2.2.2.2",
            "Jan 10 12:04:00 server sshd[1]: Failed password for root from 2.2.2.2",
            "Jan 10 12:04:00 server sshd[1]: Failed password for root from 2.2.2.2",
        ];

        let report = Analyzer::new().analyze_lines(&lines);
        assert_eq!(report.stats, LineStats { total_lines: 7, parsed_lines: 6 });
        // The duplicate last line is one event but still an attempt
        assert_eq!(report.events.len(), 5);
        assert!(report.events.iter().all(|e| e.event_type == EventType::RootFailed));
        assert_eq!(report.findings.len(), 1);
        assert_eq!(report.findings[0].last_attempt, "Jan 10 12:04:00");
    }

    #[test]
    fn test_comma_after_address_is_recovered() {
        let lines = [
            "Jan 10 12:00:00 server sshd[1]: Failed password for bob from 1.2.3.4, port 22",
            "Jan 10 12:00:05 server sshd[1]: Failed password for dave from 5.6.7.8 port 22 ssh2",
        ];
        let report = Analyzer::new().analyze_lines(&lines);
        let ips: Vec<&str> = report.events.iter().map(|e| e.source_ip.as_str()).collect();
        assert_eq!(ips, vec!["1.2.3.4", "5.6.7.8"]);
        assert_eq!(report.events[0].username, "bob");
    }

    #[test]
    fn test_config_thresholds_are_used() {
        let mut config = Config::default();
        config.detection.attempt_threshold = 2;
        config.detection.window_seconds = 30;

        let lines = [
            "Jan 10 12:00:00 server sshd[1]: Failed password for bob from 3.3.3.3",
            "Jan 10 12:00:45 server sshd[1]: Failed password for bob from 3.3.3.3",
            "Jan 10 12:01:00 server sshd[1]: Failed password for bob from 3.3.3.3",
        ];
        let report = Analyzer::from_config(&config).analyze_lines(&lines);
        assert_eq!(report.findings.len(), 1);
        assert_eq!(report.findings[0].first_attempt, "Jan 10 12:00:45");
        assert_eq!(report.findings[0].attempt_count, 2);
    }
}
