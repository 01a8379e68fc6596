//! Security event classification for sshd messages
//!
//! Each message is tested against an ordered rule table; the first rule that
//! matches decides the event type, so a line never yields two events.
//! Classified events are deduplicated on their full identity.

use regex::Regex;
use std::collections::HashSet;
use std::sync::LazyLock;

use crate::models::{is_dotted_quad, EventType, ParsedLine, SecurityEvent, DOTTED_QUAD_TOKEN};

pub const DEFAULT_PLACEHOLDER_USERNAME: &str = "unknown";

const ROOT: &str = "root";

// ---------------------------------------------------------------------------
// Message patterns
// ---------------------------------------------------------------------------

/// "Failed password for invalid user <user> from <ip> ..."
static RE_FAILED_INVALID_USER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(r"Failed password for invalid user (\S+) from {DOTTED_QUAD_TOKEN}"))
        .expect("regex")
});

/// "Invalid user <user> from <ip> [port <port>]"
static RE_INVALID_USER_NOTICE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(r"^Invalid user (\S+) from {DOTTED_QUAD_TOKEN}")).expect("regex")
});

/// "Failed password for [invalid user ]root from <ip> ..."
static RE_FAILED_ROOT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(r"Failed password for (?:invalid user )?root from {DOTTED_QUAD_TOKEN}"))
        .expect("regex")
});

/// "Failed password for <user> from <ip> ..."
static RE_FAILED_PASSWORD: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(r"Failed password for (\S+) from {DOTTED_QUAD_TOKEN}")).expect("regex")
});

/// "Accepted password for root from <ip>" (publickey is the same fact)
static RE_ACCEPTED_ROOT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(r"Accepted (?:password|publickey) for root from {DOTTED_QUAD_TOKEN}"))
        .expect("regex")
});

/// Connection-origin messages: (pattern, capture index of user, capture index of ip)
static RE_CONNECTION_ORIGIN: LazyLock<Vec<(Regex, Option<usize>, usize)>> = LazyLock::new(|| {
    vec![
        (
            Regex::new(&format!(r"^Connection from {DOTTED_QUAD_TOKEN} port [0-9]+")).expect("regex"),
            None,
            1,
        ),
        (
            Regex::new(&format!(r"^Accepted \S+ for (\S+) from {DOTTED_QUAD_TOKEN}")).expect("regex"),
            Some(1),
            2,
        ),
        (
            Regex::new(&format!(
                r"^Connection closed by (?:(?:authenticating|invalid) user (\S+) )?{DOTTED_QUAD_TOKEN} port [0-9]+"
            ))
            .expect("regex"),
            Some(1),
            2,
        ),
        (
            Regex::new(&format!(
                r"^Disconnected from (?:authenticating |invalid )?user (\S+) {DOTTED_QUAD_TOKEN} port [0-9]+"
            ))
            .expect("regex"),
            Some(1),
            2,
        ),
        (
            Regex::new(&format!(r"^Received disconnect from {DOTTED_QUAD_TOKEN} port [0-9]+"))
                .expect("regex"),
            None,
            1,
        ),
    ]
});

// ---------------------------------------------------------------------------
// Rule table
// ---------------------------------------------------------------------------

/// What a rule extracted from a message, before placeholder/dedup handling
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuleMatch<'a> {
    pub event_type: EventType,
    pub username: Option<&'a str>,
    pub source_ip: &'a str,
}

pub type Rule = for<'a> fn(&'a str) -> Option<RuleMatch<'a>>;

/// Evaluated top to bottom, first match wins.
pub const RULES: &[(&str, Rule)] = &[
    ("invalid_user", match_invalid_user),
    ("root_failed", match_root_failed),
    ("failed_login", match_failed_login),
    ("root_login", match_root_login),
    ("suspicious_connection", match_suspicious_connection),
];

fn valid_ip(candidate: &str) -> Option<&str> {
    is_dotted_quad(candidate).then_some(candidate)
}

fn match_invalid_user(message: &str) -> Option<RuleMatch<'_>> {
    let caps = RE_FAILED_INVALID_USER
        .captures(message)
        .or_else(|| RE_INVALID_USER_NOTICE.captures(message))?;
    let user = caps.get(1)?.as_str();
    // root is only ever reported as a root event
    if user == ROOT {
        return None;
    }
    Some(RuleMatch {
        event_type: EventType::InvalidUser,
        username: Some(user),
        source_ip: valid_ip(caps.get(2)?.as_str())?,
    })
}

fn match_root_failed(message: &str) -> Option<RuleMatch<'_>> {
    let caps = RE_FAILED_ROOT.captures(message)?;
    Some(RuleMatch {
        event_type: EventType::RootFailed,
        username: Some(ROOT),
        source_ip: valid_ip(caps.get(1)?.as_str())?,
    })
}

fn match_failed_login(message: &str) -> Option<RuleMatch<'_>> {
    let caps = RE_FAILED_PASSWORD.captures(message)?;
    let user = caps.get(1)?.as_str();
    if user == ROOT {
        return None;
    }
    Some(RuleMatch {
        event_type: EventType::FailedLogin,
        username: Some(user),
        source_ip: valid_ip(caps.get(2)?.as_str())?,
    })
}

fn match_root_login(message: &str) -> Option<RuleMatch<'_>> {
    let caps = RE_ACCEPTED_ROOT.captures(message)?;
    Some(RuleMatch {
        event_type: EventType::RootLogin,
        username: Some(ROOT),
        source_ip: valid_ip(caps.get(1)?.as_str())?,
    })
}

fn match_suspicious_connection(message: &str) -> Option<RuleMatch<'_>> {
    RE_CONNECTION_ORIGIN.iter().find_map(|(re, user_idx, ip_idx)| {
        let caps = re.captures(message)?;
        let ip = valid_ip(caps.get(*ip_idx)?.as_str())?;
        if !is_suspicious_ip(ip) {
            return None;
        }
        let username = (*user_idx)
            .and_then(|idx| caps.get(idx))
            .map(|m| m.as_str())
            .filter(|user| *user != ROOT);
        Some(RuleMatch {
            event_type: EventType::SuspiciousConnection,
            username,
            source_ip: ip,
        })
    })
}

/// Private-range prefixes `192.168.` / `10.`, or four identical digits in a row.
pub fn is_suspicious_ip(ip: &str) -> bool {
    if ip.starts_with("192.168.") || ip.starts_with("10.") {
        return true;
    }
    ip.as_bytes()
        .windows(4)
        .any(|w| w[0].is_ascii_digit() && w.iter().all(|b| *b == w[0]))
}

/// Run the rule table against one message
pub fn match_message(message: &str) -> Option<RuleMatch<'_>> {
    RULES.iter().find_map(|(_, rule)| rule(message))
}

// ---------------------------------------------------------------------------
// EventClassifier
// ---------------------------------------------------------------------------

/// Classifies parsed lines into deduplicated security events, in first-seen order
pub struct EventClassifier {
    placeholder_username: String,
    seen: HashSet<SecurityEvent>,
    events: Vec<SecurityEvent>,
}

impl EventClassifier {
    pub fn new() -> Self {
        Self::with_placeholder(DEFAULT_PLACEHOLDER_USERNAME)
    }

    /// Use `placeholder` for suspicious connections that name no user.
    /// An empty or `root` placeholder falls back to the default.
    pub fn with_placeholder(placeholder: &str) -> Self {
        let placeholder = placeholder.trim();
        let placeholder_username = if placeholder.is_empty() || placeholder == ROOT {
            DEFAULT_PLACEHOLDER_USERNAME.to_string()
        } else {
            placeholder.to_string()
        };
        EventClassifier {
            placeholder_username,
            seen: HashSet::new(),
            events: Vec::new(),
        }
    }

    /// Classify a line without recording it
    pub fn classify(&self, line: &ParsedLine) -> Option<SecurityEvent> {
        let matched = match_message(&line.message)?;
        let username = matched.username.unwrap_or(self.placeholder_username.as_str());
        if username.is_empty() {
            return None;
        }
        Some(SecurityEvent::new(
            &line.timestamp,
            matched.event_type,
            username,
            matched.source_ip,
        ))
    }

    /// Classify and record a line. Returns the event only if it was not
    /// already recorded.
    pub fn process(&mut self, line: &ParsedLine) -> Option<&SecurityEvent> {
        let event = self.classify(line)?;
        if !self.seen.insert(event.clone()) {
            return None;
        }
        self.events.push(event);
        self.events.last()
    }

    pub fn events(&self) -> &[SecurityEvent] {
        &self.events
    }

    pub fn into_events(self) -> Vec<SecurityEvent> {
        self.events
    }

    /// One full pass over `lines` with a fresh classifier
    pub fn classify_all(lines: &[ParsedLine], placeholder: &str) -> Vec<SecurityEvent> {
        let mut classifier = Self::with_placeholder(placeholder);
        for line in lines {
            classifier.process(line);
        }
        classifier.into_events()
    }
}

impl Default for EventClassifier {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::LineParser;

    fn line(text: &str) -> ParsedLine {
        LineParser::new().parse_line(text).expect("test line should parse")
    }

    fn classify(text: &str) -> Option<SecurityEvent> {
        EventClassifier::new().classify(&line(text))
    }

    #[test]
    fn test_invalid_user() {
        let event = classify("Jan 10 12:03:21 srv sshd[9]: Failed password for invalid user oracle from 203.0.113.5 port 22 ssh2").unwrap();
        assert_eq!(event.event_type, EventType::InvalidUser);
        assert_eq!(event.username, "oracle");
        assert_eq!(event.source_ip, "203.0.113.5");
        assert_eq!(event.timestamp, "Jan 10 12:03:21");
    }

    #[test]
    fn test_invalid_user_notice() {
        let event = classify("Jan 10 12:03:20 srv sshd[9]: Invalid user admin from 203.0.113.5 port 4242").unwrap();
        assert_eq!(event.event_type, EventType::InvalidUser);
        assert_eq!(event.username, "admin");
    }

    #[test]
    fn test_invalid_user_root_is_root_failed() {
        let event = classify("Jan 10 12:03:21 srv sshd[9]: Failed password for invalid user root from 8.8.4.4 port 22 ssh2").unwrap();
        assert_eq!(event.event_type, EventType::RootFailed);
        assert_eq!(event.username, "root");
    }

    #[test]
    fn test_root_failed() {
        let event = classify("Jan 10 12:00:01 server sshd[1]: Failed password for root from 1.2.3.4").unwrap();
        assert_eq!(event.event_type, EventType::RootFailed);
        assert_eq!(event.username, "root");
        assert_eq!(event.source_ip, "1.2.3.4");
    }

    #[test]
    fn test_failed_login_non_root() {
        let event = classify("Jan 10 12:00:01 server sshd[1]: Failed password for alice from 1.2.3.4 port 2222 ssh2").unwrap();
        assert_eq!(event.event_type, EventType::FailedLogin);
        assert_eq!(event.username, "alice");

        // a user whose name merely starts with "root"
        let event = classify("Jan 10 12:00:01 server sshd[1]: Failed password for rootkit from 1.2.3.4").unwrap();
        assert_eq!(event.event_type, EventType::FailedLogin);
        assert_eq!(event.username, "rootkit");
    }

    #[test]
    fn test_failed_login_on_private_ip_is_not_suspicious() {
        let event = classify("Jan 10 12:00:01 server sshd[1]: Failed password for bob from 192.168.1.9").unwrap();
        assert_eq!(event.event_type, EventType::FailedLogin);
    }

    #[test]
    fn test_root_login() {
        let event = classify("Jan 10 12:00:00 server sshd[1]: Accepted password for root from 1.1.1.1 port 50000 ssh2").unwrap();
        assert_eq!(event.event_type, EventType::RootLogin);
        assert_eq!(event.username, "root");

        let event = classify("Jan 10 12:00:00 server sshd[1]: Accepted publickey for root from 10.0.0.2 port 50000 ssh2").unwrap();
        assert_eq!(event.event_type, EventType::RootLogin);
    }

    #[test]
    fn test_accepted_non_root_public_ip_yields_nothing() {
        assert!(classify("Jan 10 12:00:00 server sshd[1]: Accepted password for alice from 8.8.8.8 port 50000 ssh2").is_none());
    }

    #[test]
    fn test_suspicious_connection_with_user() {
        let event = classify("Jan 10 12:00:00 server sshd[1]: Accepted password for alice from 192.168.1.50 port 50000 ssh2").unwrap();
        assert_eq!(event.event_type, EventType::SuspiciousConnection);
        assert_eq!(event.username, "alice");
        assert_eq!(event.source_ip, "192.168.1.50");
    }

    #[test]
    fn test_suspicious_connection_placeholder() {
        let event = classify("Jan 10 12:00:00 server sshd[1]: Connection from 10.0.0.7 port 50000 on 10.0.0.1 port 22").unwrap();
        assert_eq!(event.event_type, EventType::SuspiciousConnection);
        assert_eq!(event.username, DEFAULT_PLACEHOLDER_USERNAME);

        let classifier = EventClassifier::with_placeholder("n/a");
        let event = classifier
            .classify(&line("Jan 10 12:00:00 server sshd[1]: Connection from 10.0.0.7 port 50000"))
            .unwrap();
        assert_eq!(event.username, "n/a");
    }

    #[test]
    fn test_suspicious_connection_never_reports_root() {
        let event = classify("Jan 10 12:00:00 server sshd[1]: Connection closed by authenticating user root 10.10.10.10 port 22 [preauth]").unwrap();
        assert_eq!(event.event_type, EventType::SuspiciousConnection);
        assert_eq!(event.username, DEFAULT_PLACEHOLDER_USERNAME);

        let event = classify("Jan 10 12:00:00 server sshd[1]: Disconnected from invalid user guest 10.1.1.1 port 22 [preauth]").unwrap();
        assert_eq!(event.username, "guest");
    }

    #[test]
    fn test_suspicious_ip_heuristic() {
        assert!(is_suspicious_ip("192.168.0.1"));
        assert!(is_suspicious_ip("10.20.30.40"));
        assert!(!is_suspicious_ip("1.2.3.4"));
        assert!(!is_suspicious_ip("172.16.0.1"));
        assert!(!is_suspicious_ip("100.1.1.1"));
        assert!(!is_suspicious_ip("192.169.0.1"));
    }

    #[test]
    fn test_repeated_digit_runs_are_literal() {
        // The run must be four adjacent characters; dots break it.
        assert!(is_suspicious_ip("1111"));
        assert!(is_suspicious_ip("x.99999"));
        assert!(!is_suspicious_ip("111.1.2.3"));
        assert!(!is_suspicious_ip("44.44.4.4"));
        assert!(classify("Jan 10 12:00:00 server sshd[1]: Connection from 77.77.1.2 port 1234").is_none());
    }

    #[test]
    fn test_unrecoverable_ip_yields_nothing() {
        assert!(classify("Jan 10 12:01:00 server sshd[1]: Failed password for root").is_none());
        assert!(classify("Jan 10 12:02:00 server sshd[1]: Failed password for root from not_an_ip").is_none());
        assert!(classify("Jan 10 12:02:00 server sshd[1]: Failed password for root from 256.1.1.1").is_none());
        assert!(classify("Jan 10 12:02:00 server sshd[1]: Failed password for bob from 1.2.3").is_none());
        assert!(classify("Jan 10 12:02:00 server sshd[1]: Connection from 10.0.0.300 port 1").is_none());
    }

    #[test]
    fn test_address_followed_by_punctuation() {
        let event = classify("Jan 10 12:02:00 server sshd[1]: Failed password for bob from 1.2.3.4, port 22").unwrap();
        assert_eq!(event.event_type, EventType::FailedLogin);
        assert_eq!(event.source_ip, "1.2.3.4");

        let event = classify("Jan 10 12:02:00 server sshd[1]: Failed password for root from 1.2.3.4:22").unwrap();
        assert_eq!(event.event_type, EventType::RootFailed);
        assert_eq!(event.source_ip, "1.2.3.4");

        let event = classify("Jan 10 12:02:00 server sshd[1]: Invalid user admin from 5.6.7.8;").unwrap();
        assert_eq!(event.source_ip, "5.6.7.8");

        let event = classify("Jan 10 12:02:00 server sshd[1]: Accepted password for root from 9.9.9.9.").unwrap();
        assert_eq!(event.event_type, EventType::RootLogin);
        assert_eq!(event.source_ip, "9.9.9.9");
    }

    #[test]
    fn test_five_octet_address_yields_nothing() {
        assert!(classify("Jan 10 12:02:00 server sshd[1]: Failed password for bob from 1.2.3.4.5 port 22").is_none());
        assert!(classify("Jan 10 12:02:00 server sshd[1]: Failed password for root from 1.2.3.4.5, port 22").is_none());
        assert!(classify("Jan 10 12:02:00 server sshd[1]: Connection from 10.0.0.1.2 port 22").is_none());
        assert!(classify("Jan 10 12:02:00 server sshd[1]: Failed password for bob from 1.2.3.4x").is_none());
    }

    #[test]
    fn test_received_disconnect_from_suspicious_ip() {
        let event = classify("Jan 10 12:05:00 server sshd[1]: Received disconnect from 10.0.0.9 port 22:11: Bye Bye [preauth]").unwrap();
        assert_eq!(event.event_type, EventType::SuspiciousConnection);
        assert_eq!(event.username, DEFAULT_PLACEHOLDER_USERNAME);
        assert_eq!(event.source_ip, "10.0.0.9");

        assert!(classify("Jan 10 12:05:00 server sshd[1]: Received disconnect from 8.8.8.8 port 22:11: Bye Bye [preauth]").is_none());
    }

    #[test]
    fn test_empty_username_yields_nothing() {
        assert!(classify("Jan 10 12:02:00 server sshd[1]: Invalid user  from 1.2.3.4 port 22").is_none());
    }

    #[test]
    fn test_unrelated_message_yields_nothing() {
        assert!(classify("Jan 10 12:02:00 server sshd[1]: Server listening on 0.0.0.0 port 22.").is_none());
        assert!(classify("Jan 10 12:02:00 server sshd[1]: pam_unix(sshd:session): session opened for user bob").is_none());
    }

    #[test]
    fn test_rule_order() {
        let names: Vec<&str> = RULES.iter().map(|(name, _)| *name).collect();
        assert_eq!(
            names,
            vec!["invalid_user", "root_failed", "failed_login", "root_login", "suspicious_connection"]
        );
    }

    #[test]
    fn test_deduplicates_identical_events() {
        let text = "Jan 10 12:00:01 server sshd[1]: Failed password for root from 1.2.3.4";
        let other_pid = "Jan 10 12:00:01 server sshd[2]: Failed password for root from 1.2.3.4 port 9 ssh2";
        let later = "Jan 10 12:00:02 server sshd[1]: Failed password for root from 1.2.3.4";

        let mut classifier = EventClassifier::new();
        assert!(classifier.process(&line(text)).is_some());
        assert!(classifier.process(&line(text)).is_none());
        assert!(classifier.process(&line(other_pid)).is_none());
        assert!(classifier.process(&line(later)).is_some());
        assert_eq!(classifier.events().len(), 2);
        assert_eq!(classifier.events()[0].timestamp, "Jan 10 12:00:01");
        assert_eq!(classifier.events()[1].timestamp, "Jan 10 12:00:02");
    }

    #[test]
    fn test_classify_all_preserves_first_seen_order() {
        let lines = vec![
            line("Jan 10 12:00:05 server sshd[1]: Failed password for bob from 8.8.8.8"),
            line("Jan 10 12:00:01 server sshd[1]: Failed password for root from 8.8.8.8"),
            line("Jan 10 12:00:05 server sshd[1]: Failed password for bob from 8.8.8.8"),
        ];
        let events = EventClassifier::classify_all(&lines, DEFAULT_PLACEHOLDER_USERNAME);
        assert_eq!(events.len(), 2);
        assert_eq!(events[0].event_type, EventType::FailedLogin);
        assert_eq!(events[1].event_type, EventType::RootFailed);
    }
}
