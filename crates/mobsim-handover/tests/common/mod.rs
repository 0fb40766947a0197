#![allow(dead_code)]

use mobsim_handover::{ScenarioConfig, ScoringConfig};

pub fn assert_float_eq(x: f64, y: f64, eps: f64) {
    assert!((x - y).abs() < eps, "Values do not match: {:.15} vs {:.15}", x, y);
}

pub fn preset(name: &str) -> ScenarioConfig {
    ScenarioConfig::preset(name).unwrap()
}

pub fn two_ap_linear_with_loss_weight(loss_weight: f64) -> ScenarioConfig {
    let mut config = preset("two-ap-linear");
    config.scoring = ScoringConfig::DelayLoss { loss_weight };
    config
}
