use heatbench::{
  assemble,
  fe::{self, FeFunction},
  geometry::CoordRef,
  mesh::cartesian::CartesianMeshInfo,
  operators::ScalarMassElmat,
  problems::poisson::solve_poisson,
  util::algebraic_convergence_rate,
};

use std::f64::consts::PI;

fn sine_mode(x: CoordRef) -> f64 {
  (PI * x[0]).sin() * (PI * x[1]).sin()
}

#[test]
fn manufactured_solution_converges() {
  let mut errors = Vec::new();
  for n in [4, 8, 16, 32] {
    let mesh = CartesianMeshInfo::new_unit(2, n).compute_mesh().unwrap();
    let load = fe::interpolate(&mesh, |x| 2.0 * PI * PI * sine_mode(x)).into_coeffs();
    let solution = solve_poisson(&mesh, &load, |_| 0.0).unwrap();

    let exact = fe::interpolate(&mesh, sine_mode);
    let diff = FeFunction::new(solution.coeffs() - exact.coeffs());
    let mass = assemble::assemble_galmat(&mesh, ScalarMassElmat).to_nalgebra_csr();
    errors.push(fe::l2_norm(&diff, &mass));
  }

  println!("errors: {errors:?}");
  for pair in errors.windows(2) {
    let rate = algebraic_convergence_rate(pair[1], pair[0]);
    assert!(rate > 1.7, "convergence rate {rate} too low");
  }
}

fn affine(x: CoordRef) -> f64 {
  1.0 + 2.0 * x[0] - x[1]
}

#[test]
fn affine_boundary_data_is_reproduced() {
  let mesh = CartesianMeshInfo::new_unit(2, 6).compute_mesh().unwrap();
  let load = fe::interpolate(&mesh, |_| 0.0).into_coeffs();
  let solution = solve_poisson(&mesh, &load, |ivertex| affine(mesh.coord(ivertex))).unwrap();

  let expected = fe::interpolate(&mesh, affine);
  let diff = (solution.coeffs() - expected.coeffs()).amax();
  assert!(diff < 1e-12, "max nodal error {diff}");
}
