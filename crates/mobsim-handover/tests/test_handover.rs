mod common;

use rstest::rstest;

use mobsim_handover::{
    ConfigError, HandoverController, HandoverSimulation, InitialSelection, LinkParams, PositionMapping, ScenarioConfig,
    Transition,
};

use common::{assert_float_eq, preset, two_ap_linear_with_loss_weight};

#[rstest]
#[case(64., None)]
#[case(65., None)]
#[case(65.01, Some(Transition { from: 0, to: 1 }))]
fn challenger_must_exceed_margin(#[case] challenger: f64, #[case] expected: Option<Transition>) {
    let mut controller = HandoverController::new(15., 0);
    assert_eq!(controller.evaluate(0, &[50., challenger]), expected);
}

#[test]
fn step_is_evaluated_once() {
    let mut controller = HandoverController::new(15., 0);
    assert_eq!(controller.evaluate(5, &[50., 70.]), Some(Transition { from: 0, to: 1 }));
    assert_eq!(controller.evaluate(5, &[50., 70.]), None);
    assert_eq!(controller.evaluate(5, &[90., 10.]), None);
    assert_eq!(controller.active(), 1);
    assert_eq!(controller.evaluate(6, &[90., 10.]), Some(Transition { from: 1, to: 0 }));
}

#[test]
fn later_better_challenger_does_not_preempt_first_qualifying() {
    let mut controller = HandoverController::new(15., 0);
    assert_eq!(
        controller.evaluate(0, &[10., 26., 90.]),
        Some(Transition { from: 0, to: 1 })
    );
}

#[test]
fn two_ap_walk_hands_over_once() {
    let report = HandoverSimulation::new(&preset("two-ap-linear")).unwrap().run();
    assert_eq!(report.metrics.len(), 21);
    assert_eq!(report.events.len(), 1);
    let event = &report.events[0];
    assert_eq!(event.step, 11);
    assert_float_eq(event.position, 0.55, 1e-9);
    assert_float_eq(event.elapsed, 11., 1e-9);
    assert_eq!(event.description(), "handover from AP1 to AP2");
    for record in report.metrics.records() {
        let expected = if record.step < 11 { "AP1" } else { "AP2" };
        assert_eq!(record.active, expected, "step {}", record.step);
    }
}

#[test]
fn scores_of_the_two_ap_walk() {
    let report = HandoverSimulation::new(&preset("two-ap-linear")).unwrap().run();
    let ap1 = report.metrics.scores_of("AP1").unwrap();
    let ap2 = report.metrics.scores_of("AP2").unwrap();
    assert_float_eq(ap1[0], 99., 1e-9);
    assert_float_eq(ap2[0], -170., 1e-9);
    assert_float_eq(ap1[10], ap2[10], 1e-9);
    assert_float_eq(ap1[11], -48.95, 1e-9);
    assert_float_eq(ap2[11], -22.05, 1e-9);
    assert!(report.metrics.scores_of("AP3").is_none());
}

#[rstest]
#[case(5., 11)]
#[case(1., 13)]
fn loss_weight_moves_the_handover(#[case] loss_weight: f64, #[case] step: u64) {
    let report = HandoverSimulation::new(&two_ap_linear_with_loss_weight(loss_weight)).unwrap().run();
    let steps: Vec<u64> = report.events.iter().map(|e| e.step).collect();
    assert_eq!(steps, vec![step]);
}

#[test]
fn events_never_repeat() {
    let mut sim = HandoverSimulation::new(&preset("three-ap-corridor")).unwrap();
    while sim.step() {}
    assert!(!sim.step());
    let events = sim.events();
    for pair in events.windows(2) {
        assert!(pair[0].step < pair[1].step);
        assert_eq!(pair[0].to, pair[1].from);
    }
    for event in events {
        assert_ne!(event.from, event.to);
    }
}

#[test]
fn corridor_walk_visits_every_access_point() {
    let report = HandoverSimulation::new(&preset("three-ap-corridor")).unwrap().run();
    let transitions: Vec<(u64, &str, &str)> = report
        .events
        .iter()
        .map(|e| (e.step, e.from.as_str(), e.to.as_str()))
        .collect();
    assert_eq!(transitions, vec![(11, "AP1", "AP2"), (22, "AP2", "AP3")]);
    assert_eq!(report.metrics.len(), 31);
    assert_eq!(report.metrics.records().last().unwrap().active, "AP3");
}

#[test]
fn degrading_ap_settles_after_handover() {
    let report = HandoverSimulation::new(&preset("degrading-ap")).unwrap().run();
    assert_eq!(report.events.len(), 1);
    assert_eq!(report.events[0].step, 10);
    assert_eq!(report.metrics.len(), 16);
    assert_eq!(report.metrics.records().last().unwrap().step, 15);
}

#[test]
fn without_settle_window_the_walk_completes() {
    let mut config = preset("degrading-ap");
    config.settle_steps = None;
    let mut sim = HandoverSimulation::new(&config).unwrap();
    while sim.step() {
        assert!(!sim.is_settled());
    }
    assert_eq!(sim.metrics().len(), 21);
    assert_eq!(sim.first_handover_step(), Some(10));
}

#[test]
fn named_initial_link_is_reconsidered_at_step_zero() {
    let mut config = preset("two-ap-linear");
    config.initial = InitialSelection::Named("AP2".to_string());
    let report = HandoverSimulation::new(&config).unwrap().run();
    let transitions: Vec<(u64, &str)> = report.events.iter().map(|e| (e.step, e.to.as_str())).collect();
    assert_eq!(transitions, vec![(0, "AP1"), (11, "AP2")]);
}

#[test]
fn recorded_walk_replays_identically() {
    let mut config = preset("two-ap-linear");
    config.positions = PositionMapping::Recorded {
        positions: (0..=20).map(|s| s as f64 / 20.).collect(),
    };
    config.validate().unwrap();
    let first = HandoverSimulation::new(&config).unwrap().run();
    let second = HandoverSimulation::new(&config).unwrap().run();
    assert_eq!(first.events, second.events);
    assert_eq!(first.metrics, second.metrics);

    let linear = HandoverSimulation::new(&preset("two-ap-linear")).unwrap().run();
    assert_eq!(first.events, linear.events);
}

#[test]
fn stepping_reports_progress() {
    let mut sim = HandoverSimulation::new(&preset("two-ap-linear")).unwrap();
    assert_eq!(sim.active(), "AP1");
    for _ in 0..12 {
        assert!(sim.step());
    }
    assert_eq!(sim.current_step(), 12);
    assert_eq!(sim.active(), "AP2");
    assert_eq!(sim.events().len(), 1);
    assert!(!sim.is_finished());
}

#[test]
fn closure_scoring_drives_the_walk() {
    let report = HandoverSimulation::new(&preset("two-ap-linear"))
        .unwrap()
        .with_scoring(|params: &LinkParams| params.bandwidth_mbps)
        .run();
    let transitions: Vec<(u64, &str, &str)> = report
        .events
        .iter()
        .map(|e| (e.step, e.from.as_str(), e.to.as_str()))
        .collect();
    assert_eq!(transitions, vec![(18, "AP1", "AP2")]);
    assert_float_eq(report.metrics.scores_of("AP1").unwrap()[0], 20., 1e-9);
    assert_float_eq(report.metrics.scores_of("AP2").unwrap()[18], 18.1, 1e-9);
}

#[test]
fn replaced_scoring_chooses_the_initial_link_again() {
    let sim = HandoverSimulation::new(&preset("two-ap-linear")).unwrap();
    assert_eq!(sim.active(), "AP1");
    let sim = sim.with_scoring(|params: &LinkParams| -params.bandwidth_mbps);
    assert_eq!(sim.active(), "AP2");
    assert_float_eq(sim.candidates()[1].score(), -1., 1e-9);

    let report = sim.run();
    let transitions: Vec<(u64, &str, &str)> = report
        .events
        .iter()
        .map(|e| (e.step, e.from.as_str(), e.to.as_str()))
        .collect();
    assert_eq!(transitions, vec![(18, "AP2", "AP1")]);
}

#[test]
fn scenario_without_candidates_is_rejected() {
    let result = HandoverSimulation::new(&ScenarioConfig::default());
    assert!(matches!(result, Err(ConfigError::Invalid(_))));
}

#[test]
fn unknown_initial_link_is_rejected() {
    let mut config = preset("two-ap-linear");
    config.initial = InitialSelection::Named("AP9".to_string());
    let result = HandoverSimulation::new(&config);
    assert!(matches!(result, Err(ConfigError::Invalid(msg)) if msg.contains("AP9")));
}
