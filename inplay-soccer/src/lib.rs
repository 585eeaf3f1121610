//! In-play football probabilities: goal expectations from live match statistics, a Dixon-Coles
//! corrected scoregrid, the markets derived from it, optional calibration and confidence-gated tips.

pub mod calibration;
pub mod domain;
pub mod history;
pub mod intensity;
pub mod market;
pub mod model;
pub mod print;
pub mod scoregrid;
pub mod tips;

#[doc = include_str!("../../README.md")]
#[cfg(doc)]
fn readme() {}
