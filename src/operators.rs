//! Element matrix and element vector providers for scalar Lagrangian P1 elements.

use crate::{linalg::nalgebra::Vector, mesh::CellRef};

pub type DofIdx = usize;

pub type ElMat = na::DMatrix<f64>;
pub trait ElMatProvider: Sync {
  fn eval(&self, cell: CellRef) -> ElMat;
}

pub type ElVec = na::DVector<f64>;
pub trait ElVecProvider: Sync {
  fn eval(&self, cell: CellRef) -> ElVec;
}

/// Exact Element Matrix Provider for the (negative) Laplacian.
///
/// $A = [(nabla lambda_j, nabla lambda_i)_(L^2(K))]_(i,j)$
pub struct LaplaceElmat;
impl ElMatProvider for LaplaceElmat {
  fn eval(&self, cell: CellRef) -> ElMat {
    let difbarys = cell.geometry.difbarys();
    cell.geometry.vol() * difbarys.transpose() * difbarys
  }
}

/// Exact Element Matrix Provider for scalar mass bilinear form.
pub struct ScalarMassElmat;
impl ElMatProvider for ScalarMassElmat {
  fn eval(&self, cell: CellRef) -> ElMat {
    let ndofs = cell.vertices.len();
    let dim = cell.geometry.dim();
    let v = cell.geometry.vol() / ((dim + 1) * (dim + 2)) as f64;
    let mut elmat = ElMat::from_element(ndofs, ndofs, v);
    elmat.fill_diagonal(2.0 * v);
    elmat
  }
}

/// Approximated Element Matrix Provider for scalar mass bilinear form,
/// obtained through trapezoidal quadrature rule.
pub struct ScalarLumpedMassElmat;
impl ElMatProvider for ScalarLumpedMassElmat {
  fn eval(&self, cell: CellRef) -> ElMat {
    let n = cell.vertices.len();
    let v = cell.geometry.vol() / n as f64;
    ElMat::from_diagonal_element(n, n, v)
  }
}

/// Element Vector Provider for a source given by its nodal values.
///
/// Integrates the P1 interpolant of the source exactly,
/// i.e. applies the element mass matrix to the local nodal values.
pub struct SourceElvec<'a> {
  dof_data: &'a Vector,
}
impl<'a> SourceElvec<'a> {
  pub fn new(dof_data: &'a Vector) -> Self {
    Self { dof_data }
  }
}
impl ElVecProvider for SourceElvec<'_> {
  fn eval(&self, cell: CellRef) -> ElVec {
    let local = local_dof_data(self.dof_data, cell.vertices);
    ScalarMassElmat.eval(cell) * local
  }
}

/// Element Vector Provider for a source given by its nodal values.
///
/// Computed using trapezoidal quadrature rule.
/// Exact for constant source.
pub struct LumpedSourceElvec<'a> {
  dof_data: &'a Vector,
}
impl<'a> LumpedSourceElvec<'a> {
  pub fn new(dof_data: &'a Vector) -> Self {
    Self { dof_data }
  }
}
impl ElVecProvider for LumpedSourceElvec<'_> {
  fn eval(&self, cell: CellRef) -> ElVec {
    let nverts = cell.vertices.len();
    cell.geometry.vol() / nverts as f64 * local_dof_data(self.dof_data, cell.vertices)
  }
}

fn local_dof_data(dof_data: &Vector, vertices: &[DofIdx]) -> Vector {
  Vector::from_iterator(vertices.len(), vertices.iter().map(|&iv| dof_data[iv]))
}
