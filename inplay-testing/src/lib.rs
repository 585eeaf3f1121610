//! Testing helpers.

use assert_float_eq::*;

pub fn assert_slice_f64_near(expected: &[f64], actual: &[f64], distance: u32) {
    assert_eq!(
        expected.len(),
        actual.len(),
        "lengths do not match: {} ≠ {}",
        expected.len(),
        actual.len()
    );
    for (index, &expected) in expected.iter().enumerate() {
        let actual = actual[index];
        if actual != expected {
            assert_f64_near!(expected, actual, distance);
        }
    }
}

pub fn assert_slice_f64_relative(expected: &[f64], actual: &[f64], epsilon: f64) {
    assert_eq!(
        expected.len(),
        actual.len(),
        "lengths do not match: {} ≠ {}",
        expected.len(),
        actual.len()
    );
    for (index, &expected) in expected.iter().enumerate() {
        let actual = actual[index];
        if actual != expected {
            assert_float_relative_eq!(expected, actual, epsilon);
        }
    }
}

/// Asserts that the elements of `probs` add up to 1 within `epsilon`.
pub fn assert_sums_to_one(probs: &[f64], epsilon: f64) {
    let sum: f64 = probs.iter().sum();
    assert!(
        (sum - 1.0).abs() <= epsilon,
        "probabilities sum to {sum}, expected 1 ± {epsilon}"
    );
}

/// Asserts that every element of `probs` is a finite value in \[0, 1\].
pub fn assert_unit_interval(probs: &[f64]) {
    for (index, &prob) in probs.iter().enumerate() {
        assert!(
            prob.is_finite() && (0.0..=1.0).contains(&prob),
            "element {index} is {prob}, outside [0, 1]"
        );
    }
}
