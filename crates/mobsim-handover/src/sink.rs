//! Link parameter sinks: where the simulated link conditions are applied.

use std::process::Command;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::error::SinkError;
use crate::link::LinkParams;

/// Applies link parameters and routing decisions to an emulated network.
///
/// Failures are reported to the caller, which is expected to log them and carry on with the
/// previously applied parameters.
pub trait LinkParameterSink {
    /// Applies bandwidth, delay and loss to the link of the specified candidate.
    fn apply(&mut self, candidate: &str, params: &LinkParams) -> Result<(), SinkError>;

    /// Routes the station traffic through the specified candidate.
    fn activate(&mut self, _candidate: &str) -> Result<(), SinkError> {
        Ok(())
    }
}

/// Sink that accepts everything and does nothing, for pure-logic runs.
#[derive(Default)]
pub struct NullSink;

impl LinkParameterSink for NullSink {
    fn apply(&mut self, _candidate: &str, _params: &LinkParams) -> Result<(), SinkError> {
        Ok(())
    }
}

/// Network interface of the station facing one access point.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct NetemInterface {
    /// Interface name, e.g. `sta1-eth0`.
    pub device: String,
    /// Default gateway reachable through this interface.
    #[serde(default)]
    pub gateway: Option<String>,
}

/// Sink that shapes station interfaces with `tc netem` and switches the default route with `ip route`.
pub struct NetemSink {
    interfaces: IndexMap<String, NetemInterface>,
}

impl NetemSink {
    /// Creates a sink with specified candidate to interface mapping.
    pub fn new(interfaces: IndexMap<String, NetemInterface>) -> Self {
        Self { interfaces }
    }

    fn interface(&self, candidate: &str) -> Result<&NetemInterface, SinkError> {
        self.interfaces
            .get(candidate)
            .ok_or_else(|| SinkError::UnknownCandidate(candidate.to_string()))
    }
}

/// Returns `tc` arguments that set the netem qdisc of `device` to the specified parameters.
pub fn netem_args(device: &str, params: &LinkParams) -> Vec<String> {
    vec![
        "qdisc".to_string(),
        "change".to_string(),
        "dev".to_string(),
        device.to_string(),
        "root".to_string(),
        "netem".to_string(),
        "rate".to_string(),
        format!("{:.2}Mbit", params.bandwidth_mbps),
        "delay".to_string(),
        format!("{:.2}ms", params.delay_ms),
        "loss".to_string(),
        format!("{:.2}%", params.loss_pct),
    ]
}

/// Returns `ip` arguments that route the default traffic via `gateway` on `device`.
pub fn route_args(device: &str, gateway: &str) -> Vec<String> {
    ["route", "replace", "default", "via", gateway, "dev", device]
        .iter()
        .map(|s| s.to_string())
        .collect()
}

fn run(program: &str, args: &[String]) -> Result<(), SinkError> {
    let command = format!("{} {}", program, args.join(" "));
    let output = Command::new(program)
        .args(args)
        .output()
        .map_err(|source| SinkError::Spawn {
            command: command.clone(),
            source,
        })?;
    if !output.status.success() {
        return Err(SinkError::Failed {
            command,
            status: output.status.to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
        });
    }
    Ok(())
}

impl LinkParameterSink for NetemSink {
    fn apply(&mut self, candidate: &str, params: &LinkParams) -> Result<(), SinkError> {
        let interface = self.interface(candidate)?;
        run("tc", &netem_args(&interface.device, params))
    }

    fn activate(&mut self, candidate: &str) -> Result<(), SinkError> {
        let interface = self.interface(candidate)?;
        match &interface.gateway {
            Some(gateway) => run("ip", &route_args(&interface.device, gateway)),
            None => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn netem_command_line() {
        let args = netem_args("sta1-eth0", &LinkParams::new(20., 1.5, 0.));
        assert_eq!(
            args.join(" "),
            "qdisc change dev sta1-eth0 root netem rate 20.00Mbit delay 1.50ms loss 0.00%"
        );
    }

    #[test]
    fn route_command_line() {
        assert_eq!(
            route_args("sta1-eth1", "10.0.0.101").join(" "),
            "route replace default via 10.0.0.101 dev sta1-eth1"
        );
    }

    #[test]
    fn unknown_candidate_is_an_error() {
        let mut sink = NetemSink::new(IndexMap::new());
        let err = sink.apply("AP9", &LinkParams::new(1., 1., 1.)).unwrap_err();
        assert!(matches!(err, SinkError::UnknownCandidate(name) if name == "AP9"));
    }
}
