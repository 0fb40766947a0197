mod common;

use approx::assert_abs_diff_eq;
use rstest::rstest;

use mobsim_handover::models::{DistanceCurve, DistanceModel, LinearModel, Ramp};
use mobsim_handover::{LinkParams, QualityModel};

use common::{assert_float_eq, preset};

#[rstest]
#[case(-0.5, 0.)]
#[case(-100., 0.)]
#[case(1.5, 1.)]
#[case(42., 1.)]
fn linear_models_clamp_position(#[case] position: f64, #[case] edge: f64) {
    for candidate in preset("two-ap-linear").build_candidates() {
        assert_eq!(
            candidate.model().evaluate(position),
            candidate.model().evaluate(edge),
            "{} at {}",
            candidate.name(),
            position
        );
    }
}

#[test]
fn bandwidth_is_monotonic_along_the_walk() {
    let candidates = preset("two-ap-linear").build_candidates();
    let bandwidth = |idx: usize, step: u32| candidates[idx].model().evaluate(step as f64 / 20.).bandwidth_mbps;
    for step in 1..=20 {
        assert!(bandwidth(0, step) <= bandwidth(0, step - 1));
        assert!(bandwidth(1, step) >= bandwidth(1, step - 1));
    }
    assert_eq!(bandwidth(0, 0), 20.);
    assert_eq!(bandwidth(0, 20), 1.);
    assert_eq!(bandwidth(1, 20), 20.);
}

#[test]
fn linear_values_are_clamped_not_rescaled() {
    let model = LinearModel::new(Ramp::new(5., -5.), Ramp::new(-10., 10.), Ramp::new(0., 120.))
        .with_bandwidth_floor(1.)
        .with_loss_cap(99.);
    assert_eq!(model.evaluate(1.), LinkParams::new(1., 10., 99.));
    assert_eq!(model.evaluate(0.), LinkParams::new(5., 0., 0.));
    let mid = model.evaluate(0.5);
    assert_float_eq(mid.bandwidth_mbps, 1., 1e-12);
    assert_float_eq(mid.loss_pct, 60., 1e-12);
}

#[test]
fn linear_distance_is_measured_from_the_best_end() {
    let model = LinearModel::new(Ramp::new(20., 1.), Ramp::new(1., 20.), Ramp::new(0., 50.));
    assert_float_eq(model.distance(0.25), 0.25, 1e-12);
    assert_float_eq(model.mirrored().distance(0.25), 0.75, 1e-12);
    assert_float_eq(model.distance(3.), 1., 1e-12);
}

#[rstest]
#[case(20., 5., 0.)]
#[case(30., 15., 2.)]
#[case(-30., 55., 10.)]
#[case(200., 100., 20.)]
fn distance_model_curves(#[case] position: f64, #[case] delay: f64, #[case] loss: f64) {
    let model = DistanceModel::new(
        20.,
        DistanceCurve::constant(20.),
        DistanceCurve::new(5., 1., 5., 100.),
        DistanceCurve::new(0., 0.2, 0., 20.),
    );
    let params = model.evaluate(position);
    assert_abs_diff_eq!(params.bandwidth_mbps, 20.);
    assert_abs_diff_eq!(params.delay_ms, delay, epsilon = 1e-9);
    assert_abs_diff_eq!(params.loss_pct, loss, epsilon = 1e-9);
    assert_abs_diff_eq!(model.distance(position), (position - 20.).abs());
}
