mod common;

use std::fs;

use tempfile::tempdir;

use mobsim_handover::{EmulatedProbe, EventLog, HandoverSimulation, MetricsSeries};

use common::{assert_float_eq, preset};

#[test]
fn event_log_file_is_written_during_the_run() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("handover_events.txt");
    let event_log = EventLog::with_log_file(&path).unwrap();
    assert!(event_log.has_log_file());
    let report = HandoverSimulation::new(&preset("three-ap-corridor"))
        .unwrap()
        .with_event_log(event_log)
        .run();
    assert_eq!(report.events.len(), 2);

    let content = fs::read_to_string(&path).unwrap();
    let lines: Vec<&str> = content.lines().collect();
    assert_eq!(
        lines,
        vec![
            "elapsed|position|event",
            "11.000|51.33|handover from AP1 to AP2",
            "22.000|102.67|handover from AP2 to AP3",
        ]
    );

    let loaded = EventLog::load(&path).unwrap();
    assert_eq!(loaded.len(), 2);
    assert_eq!(loaded[1].from, "AP2");
    assert_eq!(loaded[1].to, "AP3");
    assert_float_eq(loaded[1].elapsed, 22., 1e-9);
    assert_float_eq(loaded[1].position, 102.67, 1e-9);
}

#[test]
fn event_log_is_written_after_the_run() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("events.txt");
    let mut sim = HandoverSimulation::new(&preset("two-ap-linear")).unwrap();
    while sim.step() {}
    let mut event_log = EventLog::new();
    for event in sim.events() {
        event_log.append(event.clone()).unwrap();
    }
    event_log.write_to(&path).unwrap();

    let loaded = EventLog::load(&path).unwrap();
    assert_eq!(loaded.len(), 1);
    assert_float_eq(loaded[0].position, 0.55, 1e-9);
    assert_eq!(loaded[0].from, "AP1");
}

#[test]
fn unreadable_event_logs_have_no_data() {
    let dir = tempdir().unwrap();
    assert!(EventLog::load(&dir.path().join("missing.txt")).is_none());

    let path = dir.path().join("broken.txt");
    fs::write(&path, "elapsed|position|event\n11.000|0.55|handover from AP1 to AP2\n12.0|oops\n").unwrap();
    assert!(EventLog::load(&path).is_none());

    fs::write(&path, "").unwrap();
    assert!(EventLog::load(&path).is_none());

    fs::write(&path, "11.000|0.55|handover from AP1 to AP2\n").unwrap();
    assert!(EventLog::load(&path).is_none());
}

#[test]
fn event_log_without_handovers_is_empty() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("events.txt");
    EventLog::new().write_to(&path).unwrap();
    assert_eq!(EventLog::load(&path), Some(Vec::new()));
}

#[test]
fn metrics_csv_round_trip() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("metrics.csv");
    let report = HandoverSimulation::new(&preset("two-ap-linear"))
        .unwrap()
        .with_measurement(EmulatedProbe)
        .run();
    report.metrics.write_csv(&path).unwrap();

    let header = fs::read_to_string(&path).unwrap().lines().next().unwrap().to_string();
    assert_eq!(header, "step,elapsed,position,score_AP1,score_AP2,active,rtt_ms,loss_pct,synthetic");

    let loaded = MetricsSeries::load_csv(&path);
    assert_eq!(loaded.len(), 21);
    assert_eq!(loaded.candidates(), report.metrics.candidates());
    for (read, written) in loaded.records().iter().zip(report.metrics.records()) {
        assert_eq!(read.step, written.step);
        assert_eq!(read.active, written.active);
        assert_float_eq(read.position, written.position, 1e-4);
        for (a, b) in read.scores.iter().zip(&written.scores) {
            assert_float_eq(*a, *b, 1e-4);
        }
        let (read_probe, written_probe) = (read.probe.unwrap(), written.probe.unwrap());
        assert_float_eq(read_probe.rtt_ms, written_probe.rtt_ms, 1e-3);
        assert_eq!(read_probe.synthetic, written_probe.synthetic);
    }
}

#[test]
fn metrics_without_probes_leave_columns_empty() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("metrics.csv");
    let report = HandoverSimulation::new(&preset("degrading-ap")).unwrap().run();
    report.metrics.write_csv(&path).unwrap();
    let content = fs::read_to_string(&path).unwrap();
    assert!(content.lines().nth(1).unwrap().ends_with(",AP1,,,"));

    let loaded = MetricsSeries::load_csv(&path);
    assert_eq!(loaded.len(), 16);
    assert!(loaded.records().iter().all(|r| r.probe.is_none()));
}

#[test]
fn malformed_metrics_have_no_data() {
    let dir = tempdir().unwrap();
    assert!(MetricsSeries::load_csv(&dir.path().join("missing.csv")).is_empty());

    let path = dir.path().join("short.csv");
    fs::write(&path, "step,elapsed\n1,2\n").unwrap();
    assert!(MetricsSeries::load_csv(&path).is_empty());

    fs::write(
        &path,
        "step,elapsed,position,score_AP1,score_AP2,active,rtt_ms,loss_pct,synthetic\n0,0.000,0.0000,abc,1,AP1,,,\n",
    )
    .unwrap();
    assert!(MetricsSeries::load_csv(&path).is_empty());
}
