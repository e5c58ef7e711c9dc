//! Experiment configuration, loaded from a TOML file.
//!
//! Every field is optional. The defaults reproduce the reference ground-truth run.

use crate::{
  error::{Error, Result},
  problems::heat::HeatSolverConfig,
};

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct HeatbenchConfig {
  pub mesh: MeshConfig,
  pub solver: HeatSolverConfig,
  pub output: OutputConfig,
  pub study: StudyConfig,
  pub compare: CompareConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct MeshConfig {
  /// Cells per axis of the unit square.
  pub ns: usize,
}
impl Default for MeshConfig {
  fn default() -> Self {
    Self { ns: 100 }
  }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct OutputConfig {
  pub eval_points: PathBuf,
  pub solutions: PathBuf,
  pub vtk_dir: PathBuf,
  pub write_vtk: bool,
  pub vtk_interval: usize,
}
impl Default for OutputConfig {
  fn default() -> Self {
    Self {
      eval_points: PathBuf::from("2D_Transient_Heat_eval_points.json"),
      solutions: PathBuf::from("2D_Transient_Heat_eval_solutions.json"),
      vtk_dir: PathBuf::from("vtu"),
      write_vtk: true,
      vtk_interval: 1,
    }
  }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct StudyConfig {
  pub mesh_nums: Vec<usize>,
  /// Ground-truth samples the study is measured against.
  pub truth: PathBuf,
  pub results: PathBuf,
}
impl Default for StudyConfig {
  fn default() -> Self {
    Self {
      mesh_nums: vec![10, 20, 40, 80],
      truth: PathBuf::from("2D_Transient_Heat_eval_solutions.json"),
      results: PathBuf::from("FEM_results.json"),
    }
  }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CompareConfig {
  pub pinns: PathBuf,
  pub fem: PathBuf,
  pub out: PathBuf,
}
impl Default for CompareConfig {
  fn default() -> Self {
    Self {
      pinns: PathBuf::from("PINNs_evaluation.json"),
      fem: PathBuf::from("FEM_results.json"),
      out: PathBuf::from("time_error.csv"),
    }
  }
}

impl HeatbenchConfig {
  pub fn from_toml_str(s: &str) -> Result<Self> {
    Ok(toml::from_str(s)?)
  }

  pub fn load(path: impl AsRef<Path>) -> Result<Self> {
    let path = path.as_ref();
    let contents = std::fs::read_to_string(path).map_err(Error::file(path))?;
    let config = Self::from_toml_str(&contents)?;
    tracing::info!("loaded config from {}", path.display());
    Ok(config)
  }

  /// Loads the file if given, the defaults otherwise.
  pub fn load_or_default(path: Option<&Path>) -> Result<Self> {
    path.map_or_else(|| Ok(Self::default()), Self::load)
  }
}
