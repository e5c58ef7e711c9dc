//! Module for the Poisson Equation, the prototypical ellipitic PDE.

use crate::{
  assemble,
  error::Result,
  fe::FeFunction,
  linalg::{faer::FaerCholesky, nalgebra::Vector},
  mesh::SimplicialMesh,
  operators::{DofIdx, LaplaceElmat, SourceElvec},
};

/// Solves $-Delta u = f$ with $u = g$ on the boundary.
///
/// The load is given by its nodal values, the boundary data per boundary vertex.
pub fn solve_poisson<F>(
  mesh: &SimplicialMesh,
  load_data: &Vector,
  boundary_data: F,
) -> Result<FeFunction>
where
  F: Fn(DofIdx) -> f64,
{
  let mut galmat = assemble::assemble_galmat(mesh, LaplaceElmat);
  let mut galvec = assemble::assemble_galvec(mesh, SourceElvec::new(load_data));

  assemble::enforce_dirichlet_bc(mesh, boundary_data, &mut galmat, &mut galvec);

  let galmat = galmat.to_nalgebra_csr();
  let galsol = FaerCholesky::new(galmat)?.solve(&galvec);
  Ok(FeFunction::new(galsol))
}
