pub mod vtk;

use crate::{
  error::{Error, Result},
  eval_points::{EvalPoints, EvalPointsFile},
};

use indexmap::IndexMap;
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use std::{
  fs::File,
  io::{BufReader, BufWriter, Write},
  path::Path,
};

pub fn read_json<T: DeserializeOwned>(path: impl AsRef<Path>) -> Result<T> {
  let path = path.as_ref();
  let file = File::open(path).map_err(Error::file(path))?;
  Ok(serde_json::from_reader(BufReader::new(file))?)
}

pub fn write_json<T: Serialize + ?Sized>(path: impl AsRef<Path>, value: &T, pretty: bool) -> Result<()> {
  let path = path.as_ref();
  if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
    std::fs::create_dir_all(parent).map_err(Error::file(parent))?;
  }
  let file = File::create(path).map_err(Error::file(path))?;
  let mut writer = BufWriter::new(file);
  if pretty {
    serde_json::to_writer_pretty(&mut writer, value)?;
  } else {
    serde_json::to_writer(&mut writer, value)?;
  }
  writer.flush().map_err(Error::file(path))?;
  Ok(())
}

pub fn read_eval_points(path: impl AsRef<Path>) -> Result<EvalPoints> {
  let file: EvalPointsFile = read_json(path)?;
  EvalPoints::try_from(file)
}

pub fn write_eval_points(path: impl AsRef<Path>, points: &EvalPoints) -> Result<()> {
  write_json(path, &EvalPointsFile::from(points), true)
}

/// Solution samples, shape `(ntimes, npoints)`.
pub fn read_solutions(path: impl AsRef<Path>) -> Result<Vec<Vec<f64>>> {
  let solutions: Vec<Vec<f64>> = read_json(path)?;
  if let Some(first) = solutions.first() {
    if let Some(i) = solutions.iter().position(|s| s.len() != first.len()) {
      return Err(Error::MalformedResults(format!(
        "solutions row {i} has {} values, row 0 has {}",
        solutions[i].len(),
        first.len()
      )));
    }
  }
  Ok(solutions)
}

pub fn write_solutions(path: impl AsRef<Path>, solutions: &[Vec<f64>]) -> Result<()> {
  write_json(path, solutions, false)
}

/// Accuracy and cost of the FEM solutions over a range of mesh resolutions.
///
/// The maps are keyed by the stringified index into `mesh_nums`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FemResults {
  pub mesh_nums: Vec<usize>,
  pub l2_rel: IndexMap<String, f64>,
  pub times_solve: IndexMap<String, f64>,
  pub times_eval: IndexMap<String, f64>,
}

impl FemResults {
  pub fn push(&mut self, mesh_num: usize, l2_rel: f64, time_solve: f64, time_eval: f64) {
    let key = self.mesh_nums.len().to_string();
    self.mesh_nums.push(mesh_num);
    self.l2_rel.insert(key.clone(), l2_rel);
    self.times_solve.insert(key.clone(), time_solve);
    self.times_eval.insert(key, time_eval);
  }
}

/// Accuracy and cost of the PINN models, keyed by model index.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PinnResults {
  pub arch: IndexMap<String, String>,
  pub times_total: IndexMap<String, f64>,
  pub times_eval: IndexMap<String, f64>,
  pub l2_rel: IndexMap<String, f64>,
}

pub fn read_fem_results(path: impl AsRef<Path>) -> Result<FemResults> {
  read_json(path)
}
pub fn write_fem_results(path: impl AsRef<Path>, results: &FemResults) -> Result<()> {
  write_json(path, results, true)
}
pub fn read_pinn_results(path: impl AsRef<Path>) -> Result<PinnResults> {
  read_json(path)
}
