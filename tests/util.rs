#![allow(dead_code)]

use checkout_sim::{ClassId, ClassWeights, VariateSource};
use std::collections::VecDeque;

/// Check whether two floats have a relative difference of at most 5e-5 times the smaller value.
#[macro_export]
macro_rules! assert_floats_near_equal {
    ($val1:expr, $val2:expr, $msg:expr) => {{
        let a: f64 = $val1;
        let b: f64 = $val2;
        let diff = (a - b).abs();
        let relative_diff = if a.abs() < b.abs() { diff / a.abs() } else { diff / b.abs() };
        assert!(diff == 0.0 || relative_diff < 0.00005, "{}: {} vs {}", $msg, a, b);
    }};
}

/// Which kind of draw a [`ScriptedVariates`] handed out.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Draw {
    Exponential,
    Uniform,
    Categorical,
}

/// Replays fixed draws in order, recording the kind of every draw requested.
///
/// Panics if the simulation asks for more draws of some kind than were scripted, which doubles as a check that the
/// simulation draws exactly what a scenario expects.
#[derive(Debug, Default)]
pub struct ScriptedVariates {
    exponentials: VecDeque<f64>,
    uniforms: VecDeque<f64>,
    classes: VecDeque<ClassId>,
    pub log: Vec<Draw>,
}

impl ScriptedVariates {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn exponentials(mut self, draws: impl IntoIterator<Item = f64>) -> Self {
        self.exponentials.extend(draws);
        self
    }

    pub fn uniforms(mut self, draws: impl IntoIterator<Item = f64>) -> Self {
        self.uniforms.extend(draws);
        self
    }

    pub fn classes(mut self, draws: impl IntoIterator<Item = ClassId>) -> Self {
        self.classes.extend(draws);
        self
    }

    /// Whether every scripted draw has been consumed.
    pub fn is_spent(&self) -> bool {
        self.exponentials.is_empty() && self.uniforms.is_empty() && self.classes.is_empty()
    }
}

impl VariateSource for ScriptedVariates {
    fn exponential(&mut self, _mean: f64) -> f64 {
        self.log.push(Draw::Exponential);
        self.exponentials.pop_front().expect("ran out of scripted exponential draws")
    }

    fn uniform(&mut self, _low: f64, _high: f64) -> f64 {
        self.log.push(Draw::Uniform);
        self.uniforms.pop_front().expect("ran out of scripted uniform draws")
    }

    fn categorical(&mut self, _weights: &ClassWeights) -> ClassId {
        self.log.push(Draw::Categorical);
        self.classes.pop_front().expect("ran out of scripted class draws")
    }
}
