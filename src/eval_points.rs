//! Evaluation points and times at which solutions are sampled.
//!
//! The file layout keeps every dataset under the key `"0"`:
//! `{ "mesh_coord": { "0": [[x, y], ...] }, "dt_coord": { "0": [[t], ...] } }`

use crate::error::{Error, Result};

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

const DATASET_KEY: &str = "0";
const MAX_TIME_STEPS: usize = 100_000_000;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EvalPointsFile {
  pub mesh_coord: IndexMap<String, Vec<Vec<f64>>>,
  pub dt_coord: IndexMap<String, Vec<Vec<f64>>>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct EvalPoints {
  coords: Vec<Vec<f64>>,
  times: Vec<f64>,
}

impl EvalPoints {
  pub fn new(coords: Vec<Vec<f64>>, times: Vec<f64>) -> Result<Self> {
    let Some(first) = coords.first() else {
      return Err(Error::MalformedEvalPoints("no evaluation coordinates".into()));
    };
    let dim = first.len();
    if dim == 0 {
      return Err(Error::MalformedEvalPoints("empty coordinate".into()));
    }
    if let Some(i) = coords.iter().position(|c| c.len() != dim) {
      return Err(Error::MalformedEvalPoints(format!(
        "coordinate {i} has {} components, expected {dim}",
        coords[i].len()
      )));
    }
    if times.is_empty() {
      return Err(Error::MalformedEvalPoints("no evaluation times".into()));
    }
    Ok(Self { coords, times })
  }

  /// Tensor grid over the unit square and uniform times in $[0, t_"final"]$.
  ///
  /// Points run x-major: the outer loop is over x, the inner one over y.
  pub fn generate_grid(nx: usize, ny: usize, dt: f64, tfinal: f64) -> Result<Self> {
    if nx == 0 || ny == 0 {
      return Err(Error::MalformedEvalPoints(
        "grid needs at least one cell per axis".into(),
      ));
    }
    if !(dt > 0.0 && tfinal >= 0.0 && dt.is_finite() && tfinal.is_finite()) {
      return Err(Error::MalformedEvalPoints(format!(
        "invalid time grid dt={dt}, tfinal={tfinal}"
      )));
    }
    // Truncate, but don't lose the last time to rounding of `tfinal / dt`.
    let nsteps = ((tfinal / dt) * (1.0 + 1e-12)).floor();
    if nsteps > MAX_TIME_STEPS as f64 {
      return Err(Error::MalformedEvalPoints(format!(
        "time grid dt={dt}, tfinal={tfinal} has more than {MAX_TIME_STEPS} steps"
      )));
    }

    let dx = 1.0 / nx as f64;
    let dy = 1.0 / ny as f64;
    let coords = (0..=nx)
      .flat_map(|i| (0..=ny).map(move |j| vec![i as f64 * dx, j as f64 * dy]))
      .collect();

    let nt = nsteps as usize + 1;
    let times = (0..nt).map(|k| k as f64 * dt).collect();

    Self::new(coords, times)
  }

  pub fn coords(&self) -> &[Vec<f64>] {
    &self.coords
  }
  pub fn times(&self) -> &[f64] {
    &self.times
  }
  pub fn npoints(&self) -> usize {
    self.coords.len()
  }
  pub fn ntimes(&self) -> usize {
    self.times.len()
  }
  pub fn dim(&self) -> usize {
    self.coords[0].len()
  }
}

impl TryFrom<EvalPointsFile> for EvalPoints {
  type Error = Error;
  fn try_from(mut file: EvalPointsFile) -> Result<Self> {
    let coords = file
      .mesh_coord
      .swap_remove(DATASET_KEY)
      .ok_or_else(|| Error::MalformedEvalPoints("missing `mesh_coord.0`".into()))?;
    let dt_coords = file
      .dt_coord
      .swap_remove(DATASET_KEY)
      .ok_or_else(|| Error::MalformedEvalPoints("missing `dt_coord.0`".into()))?;

    let times = dt_coords
      .into_iter()
      .enumerate()
      .map(|(k, t)| match t.as_slice() {
        &[t] => Ok(t),
        _ => Err(Error::MalformedEvalPoints(format!(
          "time entry {k} must hold exactly one value, got {}",
          t.len()
        ))),
      })
      .collect::<Result<_>>()?;

    Self::new(coords, times)
  }
}

impl From<&EvalPoints> for EvalPointsFile {
  fn from(points: &EvalPoints) -> Self {
    let dt_coords = points.times.iter().map(|&t| vec![t]).collect();
    Self {
      mesh_coord: IndexMap::from([(DATASET_KEY.to_string(), points.coords.clone())]),
      dt_coord: IndexMap::from([(DATASET_KEY.to_string(), dt_coords)]),
    }
  }
}

#[cfg(test)]
mod test {
  use super::*;

  #[test]
  fn grid_layout() {
    let points = EvalPoints::generate_grid(2, 4, 0.25, 1.0).unwrap();
    assert_eq!(points.npoints(), 15);
    assert_eq!(points.coords()[0], vec![0.0, 0.0]);
    assert_eq!(points.coords()[1], vec![0.0, 0.25]);
    assert_eq!(points.coords()[5], vec![0.5, 0.0]);
    assert_eq!(points.coords()[14], vec![1.0, 1.0]);
    assert_eq!(points.times(), &[0.0, 0.25, 0.5, 0.75, 1.0]);
  }

  #[test]
  fn default_grid_size() {
    let points = EvalPoints::generate_grid(60, 60, 1e-2, 1.0).unwrap();
    assert_eq!(points.npoints(), 61 * 61);
    assert_eq!(points.ntimes(), 101);
    assert!((points.times()[100] - 1.0).abs() < 1e-12);
  }

  #[test]
  fn times_stay_within_tfinal() {
    let points = EvalPoints::generate_grid(2, 2, 0.4, 1.0).unwrap();
    assert_eq!(points.times(), &[0.0, 0.4, 0.8]);

    let points = EvalPoints::generate_grid(2, 2, 0.1, 0.3).unwrap();
    assert_eq!(points.ntimes(), 4);

    for (dt, tfinal) in [(1e-2, f64::INFINITY), (f64::NAN, 1.0), (1e-12, 1.0), (0.0, 1.0)] {
      assert!(matches!(
        EvalPoints::generate_grid(2, 2, dt, tfinal),
        Err(Error::MalformedEvalPoints(_))
      ));
    }
  }

  #[test]
  fn parse_reference_layout() {
    let json = r#"{
      "mesh_coord": { "0": [[0.0, 0.0], [0.5, 1.0]] },
      "dt_coord": { "0": [[0.0], [0.1]] }
    }"#;
    let file: EvalPointsFile = serde_json::from_str(json).unwrap();
    let points = EvalPoints::try_from(file).unwrap();
    assert_eq!(points.coords(), &[vec![0.0, 0.0], vec![0.5, 1.0]]);
    assert_eq!(points.times(), &[0.0, 0.1]);
  }

  #[test]
  fn malformed_files_are_rejected() {
    let missing_key = r#"{ "mesh_coord": { "1": [[0.0, 0.0]] }, "dt_coord": { "0": [[0.0]] } }"#;
    let ragged = r#"{ "mesh_coord": { "0": [[0.0, 0.0], [1.0]] }, "dt_coord": { "0": [[0.0]] } }"#;
    let bad_time = r#"{ "mesh_coord": { "0": [[0.0, 0.0]] }, "dt_coord": { "0": [[0.0, 1.0]] } }"#;
    for json in [missing_key, ragged, bad_time] {
      let file: EvalPointsFile = serde_json::from_str(json).unwrap();
      assert!(matches!(
        EvalPoints::try_from(file),
        Err(Error::MalformedEvalPoints(_))
      ));
    }
  }
}
