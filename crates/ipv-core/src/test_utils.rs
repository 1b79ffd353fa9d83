/// Default tolerance for floating-point comparisons
pub const DEFAULT_TOLERANCE: f64 = 1e-10;

/// Assert that two floating-point numbers are approximately equal
pub fn assert_approx_eq(actual: f64, expected: f64, tolerance: f64) {
  assert!(
    (actual - expected).abs() < tolerance,
    "Values not approximately equal:\n  actual:   {}\n  expected: {}\n  diff:     {}\n  tolerance: {}",
    actual,
    expected,
    (actual - expected).abs(),
    tolerance
  );
}

/// Assert that two values agree within a relative tolerance.
///
/// Money amounts in this workspace run from single dollars to hundreds of billions,
/// so absolute tolerances are only useful near zero.
pub fn assert_relative_eq(actual: f64, expected: f64, relative: f64) {
  let scale = expected.abs().max(1.0);
  assert!(
    (actual - expected).abs() <= relative * scale,
    "Values not relatively equal:\n  actual:   {}\n  expected: {}\n  rel diff: {}\n  tolerance: {}",
    actual,
    expected,
    (actual - expected).abs() / scale,
    relative
  );
}

/// Assert that a floating-point value is approximately zero
pub fn assert_approx_zero(value: f64) {
  assert_approx_eq(value, 0.0, DEFAULT_TOLERANCE);
}
