use std::path::PathBuf;

use thiserror::Error;

pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, Error)]
pub enum Error {
  #[error("io error: {0}")]
  Io(#[from] std::io::Error),
  #[error("failed to access `{path}`: {source}")]
  File {
    path: PathBuf,
    #[source]
    source: std::io::Error,
  },
  #[error("json error: {0}")]
  Json(#[from] serde_json::Error),
  #[error("csv error: {0}")]
  Csv(#[from] csv::Error),
  #[error("config error: {0}")]
  Config(#[from] toml::de::Error),
  #[error("vtk export failed: {0}")]
  Vtk(String),

  #[error("invalid mesh: {0}")]
  InvalidMesh(String),
  #[error("cell {icell} is degenerate (volume {vol:e})")]
  DegenerateCell { icell: usize, vol: f64 },
  #[error("point {point:?} lies outside of the mesh")]
  PointOutsideMesh { point: Vec<f64> },

  #[error("invalid problem: {0}")]
  InvalidProblem(String),
  #[error("sparse factorization failed: {0}")]
  Factorization(String),
  #[error("invalid time sequence: {0}")]
  InvalidTimes(String),
  #[error(
    "newton solver did not converge at step {step} after {niters} iterations (residual {residual:.3e})"
  )]
  NewtonDiverged {
    step: usize,
    niters: usize,
    residual: f64,
  },

  #[error("malformed evaluation points: {0}")]
  MalformedEvalPoints(String),
  #[error("malformed results: {0}")]
  MalformedResults(String),
  #[error("shape mismatch: expected {expected:?}, got {actual:?}")]
  ShapeMismatch {
    expected: (usize, usize),
    actual: (usize, usize),
  },
}

impl Error {
  pub fn file(path: impl Into<PathBuf>) -> impl FnOnce(std::io::Error) -> Self {
    let path = path.into();
    move |source| Self::File { path, source }
  }
}
