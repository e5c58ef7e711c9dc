//! Accuracy and cost of the FEM solution over a sequence of mesh resolutions.

use crate::{
  error::Result,
  eval_points::EvalPoints,
  fe::{EvaluationStencil, FeFunction, PointLocator},
  io::FemResults,
  mesh::cartesian::CartesianMeshInfo,
  metrics::{relative_l2, relative_l2_per_step},
  problems::heat::{sample_solution, HeatProblem, HeatSolver, HeatSolverConfig},
};

use std::time::Instant;
use tracing::{debug, info};

#[derive(Debug, Clone, PartialEq)]
pub struct StudyEntry {
  pub mesh_num: usize,
  pub mesh_width: f64,
  pub l2_rel: f64,
  /// Assembly and time stepping, in seconds.
  pub time_solve: f64,
  /// Point location and sampling of all steps, in seconds.
  pub time_eval: f64,
}

/// Solves on the $n times n$ unit square mesh for every `n` in `mesh_nums`
/// and measures the samples against the reference samples.
pub fn run_fem_study<P>(
  mesh_nums: &[usize],
  points: &EvalPoints,
  reference: &[Vec<f64>],
  solver_config: &HeatSolverConfig,
  make_problem: P,
) -> Result<(FemResults, Vec<StudyEntry>)>
where
  P: Fn() -> HeatProblem,
{
  let mut results = FemResults::default();
  let mut entries: Vec<StudyEntry> = Vec::with_capacity(mesh_nums.len());

  for &mesh_num in mesh_nums {
    info!("solving on {mesh_num}x{mesh_num} mesh");

    let solve_start = Instant::now();
    let mesh = CartesianMeshInfo::new_unit(2, mesh_num).compute_mesh()?;
    let mut solver = HeatSolver::new(&mesh, make_problem(), solver_config.clone())?;
    let solution = solver.solve(
      points.times(),
      &mut |_: usize, _: f64, _: &FeFunction| -> Result<()> { Ok(()) },
    )?;
    let time_solve = solve_start.elapsed().as_secs_f64();

    let eval_start = Instant::now();
    let locator = PointLocator::new(&mesh);
    let stencil = EvaluationStencil::new(&mesh, &locator, points.coords())?;
    let samples = sample_solution(&solution, &stencil);
    let time_eval = eval_start.elapsed().as_secs_f64();

    let l2_rel = relative_l2(&samples, reference)?;
    let step_errors = relative_l2_per_step(&samples, reference)?;
    let worst = step_errors.iter().copied().fold(0.0, f64::max);
    debug!("n={mesh_num}: worst per step L2 rel {worst:.3e}");
    results.push(mesh_num, l2_rel, time_solve, time_eval);
    entries.push(StudyEntry {
      mesh_num,
      mesh_width: mesh.mesh_width_max(),
      l2_rel,
      time_solve,
      time_eval,
    });
  }

  log_study(&entries);
  Ok((results, entries))
}

/// Observed order of convergence between two refinements.
pub fn observed_rate(prev: &StudyEntry, next: &StudyEntry) -> f64 {
  (prev.l2_rel / next.l2_rel).ln() / (prev.mesh_width / next.mesh_width).ln()
}

pub fn log_study(entries: &[StudyEntry]) {
  let seperator = "-".repeat(70);
  info!("{seperator}");
  info!(
    "| {:>5} | {:>10} | {:>9} | {:>6} | {:>11} | {:>11} |",
    "n", "mesh width", "L2 rel", "rate", "solve [s]", "eval [s]"
  );
  info!("{seperator}");
  for (i, entry) in entries.iter().enumerate() {
    let rate = match i {
      0 => f64::NAN,
      _ => observed_rate(&entries[i - 1], entry),
    };
    info!(
      "| {:>5} | {:>10.3e} | {:>9.3e} | {:>6.2} | {:>11.4} | {:>11.4} |",
      entry.mesh_num, entry.mesh_width, entry.l2_rel, rate, entry.time_solve, entry.time_eval
    );
  }
  info!("{seperator}");
}

#[cfg(test)]
mod test {
  use super::*;

  #[test]
  fn rate_of_quadratic_convergence() {
    let coarse = StudyEntry {
      mesh_num: 10,
      mesh_width: 0.2,
      l2_rel: 0.04,
      time_solve: 0.0,
      time_eval: 0.0,
    };
    let fine = StudyEntry {
      mesh_num: 20,
      mesh_width: 0.1,
      l2_rel: 0.01,
      ..coarse.clone()
    };
    assert!((observed_rate(&coarse, &fine) - 2.0).abs() < 1e-12);
  }
}
