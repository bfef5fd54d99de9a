//! Estimated one-rep max ("strength index") for a single set.

/// Estimate a one-rep max from a weight/reps observation.
///
/// - `reps == 1` returns `weight` unchanged (the set already is a single).
/// - `reps == 0` returns `0.0`: no completed rep, no strength evidence.
/// - otherwise `weight * (1 + reps / 30)`, rounded to the nearest integer
///   with ties away from zero.
///
/// Inputs must be finite and non-negative; callers validate upstream.
pub fn estimate(weight: f64, reps: u32) -> f64 {
    match reps {
        0 => 0.0,
        1 => weight,
        r => (weight * (1.0 + f64::from(r) / 30.0)).round(),
    }
}
