//! Numeric building blocks for in-play scoring models: bounded arithmetic, recursively-constructed
//! Poisson series, dense matrices, probability slice utilities and binomial confidence intervals.

pub mod file;
pub mod interval;
pub mod linear;
pub mod numeric;
pub mod poisson;
pub mod probs;

#[doc = include_str!("../../README.md")]
#[cfg(doc)]
fn readme() {}
