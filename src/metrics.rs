//! Discrete error measures between sampled solutions.

use crate::error::{Error, Result};

pub use crate::util::algebraic_convergence_rate;

fn check_shape(approx: &[Vec<f64>], reference: &[Vec<f64>]) -> Result<()> {
  let shape = |s: &[Vec<f64>]| (s.len(), s.first().map_or(0, |row| row.len()));
  let mismatch = approx.len() != reference.len()
    || approx
      .iter()
      .zip(reference)
      .any(|(a, r)| a.len() != r.len());
  if mismatch {
    return Err(Error::ShapeMismatch {
      expected: shape(reference),
      actual: shape(approx),
    });
  }
  Ok(())
}

fn diff_and_ref_sqr<'a>(
  approx: impl IntoIterator<Item = &'a f64>,
  reference: impl IntoIterator<Item = &'a f64>,
) -> (f64, f64) {
  approx
    .into_iter()
    .zip(reference)
    .fold((0.0, 0.0), |(diff, norm), (a, r)| {
      (diff + (a - r).powi(2), norm + r.powi(2))
    })
}

fn rel_or_abs(diff_sqr: f64, ref_sqr: f64) -> f64 {
  if ref_sqr > 0.0 {
    (diff_sqr / ref_sqr).sqrt()
  } else {
    diff_sqr.sqrt()
  }
}

/// $norm(a - r)_2 / norm(r)_2$ over all samples of all times.
///
/// Falls back to the absolute error for a vanishing reference.
pub fn relative_l2(approx: &[Vec<f64>], reference: &[Vec<f64>]) -> Result<f64> {
  check_shape(approx, reference)?;
  let (diff_sqr, ref_sqr) = diff_and_ref_sqr(approx.iter().flatten(), reference.iter().flatten());
  Ok(rel_or_abs(diff_sqr, ref_sqr))
}

/// Relative $L^2$ error of every time step on its own.
pub fn relative_l2_per_step(approx: &[Vec<f64>], reference: &[Vec<f64>]) -> Result<Vec<f64>> {
  check_shape(approx, reference)?;
  Ok(
    approx
      .iter()
      .zip(reference)
      .map(|(a, r)| {
        let (diff_sqr, ref_sqr) = diff_and_ref_sqr(a, r);
        rel_or_abs(diff_sqr, ref_sqr)
      })
      .collect(),
  )
}
