//! Metrics series: per-step snapshot of position, scores and the active link.

use std::path::Path;

use log::warn;

use crate::error::ReportError;
use crate::measurement::ProbeSample;

const SCORE_PREFIX: &str = "score_";

/// One row of the metrics series.
#[derive(Clone, Debug, PartialEq)]
pub struct MetricsRecord {
    /// Step index.
    pub step: u64,
    /// Simulated time of the step.
    pub elapsed: f64,
    /// Station position.
    pub position: f64,
    /// Score of every candidate, in declaration order.
    pub scores: Vec<f64>,
    /// Name of the active candidate after the handover decision.
    pub active: String,
    /// Probe of the active link, if measurements are enabled.
    pub probe: Option<ProbeSample>,
}

/// Ordered metrics series of one run.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct MetricsSeries {
    candidates: Vec<String>,
    records: Vec<MetricsRecord>,
}

impl MetricsSeries {
    /// Creates an empty series for the specified candidates.
    pub fn new(candidates: Vec<String>) -> Self {
        Self {
            candidates,
            records: Vec::new(),
        }
    }

    /// Returns candidate names in declaration order.
    pub fn candidates(&self) -> &[String] {
        &self.candidates
    }

    /// Appends a record.
    pub fn push(&mut self, record: MetricsRecord) {
        self.records.push(record);
    }

    /// Returns all records.
    pub fn records(&self) -> &[MetricsRecord] {
        &self.records
    }

    /// Returns the number of records.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Returns true if the series has no records.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Returns the score history of the named candidate.
    pub fn scores_of(&self, candidate: &str) -> Option<Vec<f64>> {
        let idx = self.candidates.iter().position(|c| c == candidate)?;
        Some(self.records.iter().map(|r| r.scores[idx]).collect())
    }

    fn header(&self) -> Vec<String> {
        let mut header = vec!["step".to_string(), "elapsed".to_string(), "position".to_string()];
        header.extend(self.candidates.iter().map(|c| format!("{}{}", SCORE_PREFIX, c)));
        header.extend(["active", "rtt_ms", "loss_pct", "synthetic"].iter().map(|s| s.to_string()));
        header
    }

    /// Writes the series as CSV.
    ///
    /// Columns: `step,elapsed,position,score_<candidate>...,active,rtt_ms,loss_pct,synthetic`;
    /// probe columns are empty when no probe was taken.
    pub fn write_csv(&self, path: &Path) -> Result<(), ReportError> {
        let mut writer = csv::Writer::from_path(path)?;
        writer.write_record(self.header())?;
        for r in &self.records {
            let mut row = vec![r.step.to_string(), format!("{:.3}", r.elapsed), format!("{:.4}", r.position)];
            row.extend(r.scores.iter().map(|s| format!("{:.4}", s)));
            row.push(r.active.clone());
            match r.probe {
                Some(p) => {
                    row.push(format!("{:.3}", p.rtt_ms));
                    row.push(format!("{:.3}", p.loss_pct));
                    row.push(p.synthetic.to_string());
                }
                None => row.extend(["", "", ""].iter().map(|s| s.to_string())),
            }
            writer.write_record(&row)?;
        }
        writer.flush()?;
        Ok(())
    }

    /// Reads a series written by [`write_csv`](Self::write_csv).
    ///
    /// A missing, unreadable or malformed file is treated as containing no data and yields an empty series.
    pub fn load_csv(path: &Path) -> Self {
        match read_csv(path) {
            Some(series) => series,
            None => {
                warn!("no usable metrics in {}", path.display());
                Self::default()
            }
        }
    }
}

fn read_csv(path: &Path) -> Option<MetricsSeries> {
    let mut reader = csv::Reader::from_path(path).ok()?;
    let header = reader.headers().ok()?.clone();
    let candidates: Vec<String> = header
        .iter()
        .filter_map(|h| h.strip_prefix(SCORE_PREFIX).map(|s| s.to_string()))
        .collect();
    let n = candidates.len();
    if header.len() != n + 7 {
        return None;
    }
    let mut series = MetricsSeries::new(candidates);
    for row in reader.records() {
        let row = row.ok()?;
        let field = |i: usize| row.get(i).map(str::trim);
        let mut scores = Vec::with_capacity(n);
        for i in 0..n {
            scores.push(field(3 + i)?.parse().ok()?);
        }
        let probe = match (field(n + 4)?, field(n + 5)?, field(n + 6)?) {
            ("", "", "") => None,
            (rtt, loss, synthetic) => Some(ProbeSample {
                rtt_ms: rtt.parse().ok()?,
                loss_pct: loss.parse().ok()?,
                synthetic: synthetic.parse().ok()?,
            }),
        };
        series.push(MetricsRecord {
            step: field(0)?.parse().ok()?,
            elapsed: field(1)?.parse().ok()?,
            position: field(2)?.parse().ok()?,
            scores,
            active: field(n + 3)?.to_string(),
            probe,
        });
    }
    Some(series)
}
