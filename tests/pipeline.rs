//! Ground truth, mesh study and comparison, run through the file formats.

use heatbench::{
  compare,
  eval_points::EvalPoints,
  fe::{EvaluationStencil, PointLocator},
  io::{self, PinnResults},
  mesh::cartesian::CartesianMeshInfo,
  problems::heat::{HeatProblem, HeatSolver, HeatSolverConfig, SamplingObserver},
  study,
};

#[test]
fn ground_truth_study_compare() {
  let dir = tempfile::tempdir().unwrap();
  let points_path = dir.path().join("eval_points.json");
  let truth_path = dir.path().join("eval_solutions.json");
  let results_path = dir.path().join("FEM_results.json");
  let pinns_path = dir.path().join("PINNs_evaluation.json");
  let table_path = dir.path().join("time_error.csv");

  let points = EvalPoints::generate_grid(8, 8, 0.05, 0.2).unwrap();
  io::write_eval_points(&points_path, &points).unwrap();
  let points = io::read_eval_points(&points_path).unwrap();
  assert_eq!(points.npoints(), 81);
  assert_eq!(points.ntimes(), 5);

  // Ground truth on a fine mesh.
  let mesh = CartesianMeshInfo::new_unit(2, 32).compute_mesh().unwrap();
  let locator = PointLocator::new(&mesh);
  let stencil = EvaluationStencil::new(&mesh, &locator, points.coords()).unwrap();
  let mut solver =
    HeatSolver::new(&mesh, HeatProblem::gaussian_pulse(), HeatSolverConfig::default()).unwrap();
  let mut sampler = SamplingObserver::new(&stencil);
  solver.solve(points.times(), &mut sampler).unwrap();
  io::write_solutions(&truth_path, sampler.samples()).unwrap();

  let truth = io::read_solutions(&truth_path).unwrap();
  assert_eq!(truth.len(), points.ntimes());
  assert!(truth.iter().all(|row| row.len() == points.npoints()));

  // Study on coarser meshes.
  let (results, entries) = study::run_fem_study(
    &[4, 8, 16],
    &points,
    &truth,
    &HeatSolverConfig::default(),
    HeatProblem::gaussian_pulse,
  )
  .unwrap();
  assert_eq!(results.mesh_nums, vec![4, 8, 16]);
  assert!(entries.windows(2).all(|w| w[1].l2_rel < w[0].l2_rel));
  assert!(entries.iter().all(|e| e.time_solve >= 0.0 && e.time_eval >= 0.0));
  io::write_fem_results(&results_path, &results).unwrap();

  // Comparison against PINN results.
  let pinns = serde_json::json!({
    "arch": { "0": "[3, 20, 20, 1]" },
    "times_total": { "0": 42.0 },
    "times_eval": { "0": 0.01 },
    "l2_rel": { "0": 0.05 },
  });
  std::fs::write(&pinns_path, pinns.to_string()).unwrap();

  let pinns: PinnResults = io::read_pinn_results(&pinns_path).unwrap();
  let fem = io::read_fem_results(&results_path).unwrap();
  assert_eq!(fem.mesh_nums, results.mesh_nums);
  assert_eq!(fem.l2_rel.len(), 3);

  let rows = compare::comparison_rows(&pinns, &fem).unwrap();
  compare::save_comparison_csv(&table_path, &rows).unwrap();

  let table = std::fs::read_to_string(&table_path).unwrap();
  let lines: Vec<_> = table.lines().collect();
  assert_eq!(lines.len(), 1 + 1 + 3);
  assert!(lines[1].starts_with("PINNs,\"[3, 20, 20, 1]\",0.05,42.0,0.01"));
  assert!(lines[4].starts_with("FEM,16x16,"));
}
