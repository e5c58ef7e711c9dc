pub mod locate;

pub use locate::{EvaluationStencil, PointLocator};

use crate::{
  geometry::CoordRef,
  linalg::nalgebra::{quadratic_form_sparse, CsrMatrix, Vector},
  mesh::SimplicialMesh,
  operators::DofIdx,
};

use std::ops::Index;

/// Element of the scalar Lagrangian P1 space, given by its vertex coefficents.
#[derive(Debug, Clone, PartialEq)]
pub struct FeFunction {
  coeffs: Vector,
}

impl FeFunction {
  pub fn new(coeffs: Vector) -> Self {
    Self { coeffs }
  }
  pub fn zeros(ndofs: usize) -> Self {
    Self::new(Vector::zeros(ndofs))
  }

  pub fn ndofs(&self) -> usize {
    self.coeffs.len()
  }
  pub fn coeffs(&self) -> &Vector {
    &self.coeffs
  }
  pub fn into_coeffs(self) -> Vector {
    self.coeffs
  }
}

impl Index<DofIdx> for FeFunction {
  type Output = f64;
  fn index(&self, idof: DofIdx) -> &Self::Output {
    &self.coeffs[idof]
  }
}

impl From<Vector> for FeFunction {
  fn from(coeffs: Vector) -> Self {
    Self::new(coeffs)
  }
}

/// Nodal interpolation of a pointwise function.
pub fn interpolate<F>(mesh: &SimplicialMesh, f: F) -> FeFunction
where
  F: Fn(CoordRef) -> f64,
{
  FeFunction::new(Vector::from_iterator(
    mesh.nvertices(),
    mesh.coord_iter().map(f),
  ))
}

/// $norm(u)_(L^2) = sqrt(u^T M u)$ for the Galerkin mass matrix $M$.
pub fn l2_norm(fe: &FeFunction, mass: &CsrMatrix) -> f64 {
  quadratic_form_sparse(mass, fe.coeffs()).max(0.0).sqrt()
}

/// Evaluates the FE function at a single point.
pub fn evaluate(
  fe: &FeFunction,
  mesh: &SimplicialMesh,
  locator: &PointLocator,
  point: CoordRef,
) -> crate::Result<f64> {
  let (icell, bary) = locator.locate(mesh, point)?;
  Ok(
    mesh.cells()[icell]
      .iter()
      .zip(bary.iter())
      .map(|(&ivertex, &b)| b * fe[ivertex])
      .sum(),
  )
}

/// Evaluates the FE function at many points.
///
/// When the same points are sampled repeatedly, build an [`EvaluationStencil`] once instead.
pub fn evaluate_many(
  fe: &FeFunction,
  mesh: &SimplicialMesh,
  locator: &PointLocator,
  points: &[Vec<f64>],
) -> crate::Result<Vec<f64>> {
  let stencil = EvaluationStencil::new(mesh, locator, points)?;
  Ok(stencil.evaluate(fe))
}
