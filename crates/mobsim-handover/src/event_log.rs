//! Handover event log.

use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::Path;

use lazy_static::lazy_static;
use log::warn;
use regex::Regex;

use crate::error::ReportError;

const HEADER: &str = "elapsed|position|event";

lazy_static! {
    static ref DESCRIPTION_RE: Regex = Regex::new(r"^handover from (\S+) to (\S+)$").unwrap();
}

/// Switch of the active link, recorded once and never changed.
#[derive(Clone, Debug, PartialEq)]
pub struct HandoverEvent {
    /// Step at which the handover happened.
    pub step: u64,
    /// Simulated time of the step.
    pub elapsed: f64,
    /// Station position at the step.
    pub position: f64,
    /// Previously active candidate.
    pub from: String,
    /// Newly active candidate.
    pub to: String,
}

impl HandoverEvent {
    /// Returns a human-readable description of the event.
    pub fn description(&self) -> String {
        format!("handover from {} to {}", self.from, self.to)
    }

    /// Returns the log file line: `<elapsed>|<position>|<description>`.
    pub fn to_line(&self) -> String {
        format!("{:.3}|{:.2}|{}", self.elapsed, self.position, self.description())
    }
}

/// Handover event read back from a log file.
#[derive(Clone, Debug, PartialEq)]
pub struct LoggedHandover {
    /// Simulated time of the handover.
    pub elapsed: f64,
    /// Station position (rounded to two decimals).
    pub position: f64,
    /// Previously active candidate.
    pub from: String,
    /// Newly active candidate.
    pub to: String,
}

/// Append-only log of handover events, optionally mirrored to a file as they happen.
pub struct EventLog {
    log_file: Option<File>,
    events: Vec<HandoverEvent>,
}

impl EventLog {
    /// Creates an in-memory log.
    pub fn new() -> Self {
        Self {
            log_file: None,
            events: Vec::new(),
        }
    }

    /// Creates a log that also writes every event to the specified file (truncated first).
    pub fn with_log_file(log_path: &Path) -> Result<Self, ReportError> {
        let mut log_file = OpenOptions::new()
            .create(true)
            .truncate(true)
            .write(true)
            .open(log_path)?;
        writeln!(log_file, "{}", HEADER)?;
        Ok(Self {
            log_file: Some(log_file),
            events: Vec::new(),
        })
    }

    /// Returns true if events are mirrored to a file.
    pub fn has_log_file(&self) -> bool {
        self.log_file.is_some()
    }

    /// Appends the event.
    ///
    /// The event is always kept in memory. The returned error only concerns the file mirror.
    pub fn append(&mut self, event: HandoverEvent) -> Result<(), ReportError> {
        let line = event.to_line();
        self.events.push(event);
        if let Some(log_file) = self.log_file.as_mut() {
            writeln!(log_file, "{}", line)?;
        }
        Ok(())
    }

    /// Returns all recorded events in order.
    pub fn events(&self) -> &[HandoverEvent] {
        &self.events
    }

    /// Returns the number of recorded events.
    pub fn len(&self) -> usize {
        self.events.len()
    }

    /// Returns true if no handover was recorded.
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Writes all recorded events to the specified file.
    pub fn write_to(&self, path: &Path) -> Result<(), ReportError> {
        let mut file = File::create(path)?;
        writeln!(file, "{}", HEADER)?;
        for event in &self.events {
            writeln!(file, "{}", event.to_line())?;
        }
        Ok(())
    }

    /// Reads events back from a log file.
    ///
    /// Returns `None` if the file is missing or unreadable, lacks the header line or holds a malformed line.
    /// A log with the header only yields an empty list.
    pub fn load(path: &Path) -> Option<Vec<LoggedHandover>> {
        let content = match std::fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) => {
                warn!("can't read event log {}: {}", path.display(), e);
                return None;
            }
        };
        let mut lines = content.lines().map(str::trim).filter(|l| !l.is_empty());
        if lines.next() != Some(HEADER) {
            warn!("event log {} has no header", path.display());
            return None;
        }
        let mut events = Vec::new();
        for line in lines {
            match parse_line(line) {
                Some(event) => events.push(event),
                None => {
                    warn!("malformed event log line in {}: {:?}", path.display(), line);
                    return None;
                }
            }
        }
        Some(events)
    }
}

impl Default for EventLog {
    fn default() -> Self {
        Self::new()
    }
}

fn parse_line(line: &str) -> Option<LoggedHandover> {
    let mut parts = line.splitn(3, '|');
    let elapsed = parts.next()?.trim().parse().ok()?;
    let position = parts.next()?.trim().parse().ok()?;
    let caps = DESCRIPTION_RE.captures(parts.next()?.trim())?;
    Some(LoggedHandover {
        elapsed,
        position,
        from: caps[1].to_string(),
        to: caps[2].to_string(),
    })
}
