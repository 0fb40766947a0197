//! Measurements with the system `ping` utility.

use std::process::Command;

use indexmap::IndexMap;
use lazy_static::lazy_static;
use regex::Regex;

use crate::link::LinkParams;
use crate::measurement::{Measurement, MeasurementSource, Probe};

lazy_static! {
    static ref LOSS_RE: Regex = Regex::new(r"(\d+(?:\.\d+)?)% packet loss").unwrap();
    static ref RTT_RE: Regex = Regex::new(r"min/avg/max(?:/mdev)? = [\d.]+/([\d.]+)/").unwrap();
}

/// Extracts average RTT and loss from the summary printed by `ping`.
///
/// Returns `None` unless both values are present.
pub fn parse_ping_output(output: &str) -> Option<Probe> {
    let loss_pct = LOSS_RE.captures(output)?.get(1)?.as_str().parse().ok()?;
    let rtt_ms = RTT_RE.captures(output)?.get(1)?.as_str().parse().ok()?;
    Some(Probe { rtt_ms, loss_pct })
}

/// Pings a per-candidate target address.
pub struct PingProbe {
    targets: IndexMap<String, String>,
    count: u32,
}

impl PingProbe {
    /// Creates a probe sending `count` echo requests to the target of each candidate.
    pub fn new(targets: IndexMap<String, String>, count: u32) -> Self {
        Self { targets, count }
    }
}

impl MeasurementSource for PingProbe {
    fn measure(&mut self, candidate: &str, _params: &LinkParams) -> Measurement {
        let target = match self.targets.get(candidate) {
            Some(target) => target,
            None => return Measurement::Unavailable(format!("no ping target for {}", candidate)),
        };
        let count = self.count.to_string();
        let output = match Command::new("ping")
            .args(["-c", count.as_str(), "-q", target.as_str()])
            .output()
        {
            Ok(output) => output,
            Err(e) => return Measurement::Unavailable(format!("can't run ping: {}", e)),
        };
        match parse_ping_output(&String::from_utf8_lossy(&output.stdout)) {
            Some(probe) => Measurement::Measured(probe),
            None => Measurement::Unavailable(format!("no ping summary for {}", target)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SUMMARY: &str = "\
PING 10.0.0.100 (10.0.0.100) 56(84) bytes of data.

--- 10.0.0.100 ping statistics ---
3 packets transmitted, 3 received, 0% packet loss, time 2003ms
rtt min/avg/max/mdev = 2.114/2.305/2.611/0.219 ms
";

    #[test]
    fn parses_summary() {
        assert_eq!(
            parse_ping_output(SUMMARY),
            Some(Probe {
                rtt_ms: 2.305,
                loss_pct: 0.
            })
        );
    }

    #[test]
    fn total_loss_has_no_rtt() {
        let output = "3 packets transmitted, 0 received, 100% packet loss, time 2040ms\n";
        assert_eq!(parse_ping_output(output), None);
    }

    #[test]
    fn garbage() {
        assert_eq!(parse_ping_output("ping: unknown host"), None);
    }

    #[test]
    fn missing_target_is_unavailable() {
        let mut probe = PingProbe::new(IndexMap::new(), 1);
        assert!(matches!(
            probe.measure("AP1", &LinkParams::new(1., 1., 0.)),
            Measurement::Unavailable(_)
        ));
    }
}
