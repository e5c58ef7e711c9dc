//! Affine geometry of a single simplex embedded in $RR^d$.

use crate::{
  linalg::nalgebra::{Matrix, Vector},
  util::factorial,
  Dim,
};

pub type Coord = Vector;
pub type CoordRef<'a> = na::DVectorView<'a, f64>;

/// Volume of the reference simplex.
pub fn refsimp_vol(dim: Dim) -> f64 {
  (factorial(dim) as f64).recip()
}

/// The constant exterior drivatives of the reference barycentric coordinate
/// functions, given in the 1-form standard basis.
pub fn ref_difbarys(n: Dim) -> Matrix {
  let mut ref_difbarys = Matrix::zeros(n, n + 1);
  for i in 0..n {
    ref_difbarys[(i, 0)] = -1.0;
    ref_difbarys[(i, i + 1)] = 1.0;
  }
  ref_difbarys
}

/// Barycentric coordinates from the local coordinates of the reference simplex.
pub fn local2bary(local: &Vector) -> Vector {
  let mut bary = Vector::zeros(local.len() + 1);
  bary[0] = 1.0 - local.sum();
  bary.rows_mut(1, local.len()).copy_from(local);
  bary
}

/// Full-dimensional simplex, vertex coordinates are the columns.
#[derive(Debug, Clone)]
pub struct SimplexCoords {
  vertices: Matrix,
  det: f64,
  inv_linear_transform: Matrix,
}

impl SimplexCoords {
  /// Returns `None` for degenerate simplicies.
  pub fn new(vertices: Matrix) -> Option<Self> {
    assert!(vertices.ncols() == vertices.nrows() + 1);
    let linear = spanning_vectors(&vertices);
    let det = linear.determinant();
    let scale = linear.column_iter().map(|c| c.norm()).fold(0.0, f64::max);
    if det.abs() <= 1e-12 * scale.powi(linear.ncols() as i32) {
      return None;
    }
    let inv_linear_transform = linear.try_inverse()?;
    Some(Self {
      vertices,
      det,
      inv_linear_transform,
    })
  }
  pub fn standard(dim: Dim) -> Self {
    let mut vertices = Matrix::zeros(dim, dim + 1);
    for i in 0..dim {
      vertices[(i, i + 1)] = 1.0;
    }
    Self {
      vertices,
      det: 1.0,
      inv_linear_transform: Matrix::identity(dim, dim),
    }
  }

  pub fn dim(&self) -> Dim {
    self.vertices.nrows()
  }
  pub fn nvertices(&self) -> usize {
    self.vertices.ncols()
  }
  pub fn vertices(&self) -> &Matrix {
    &self.vertices
  }
  pub fn coord(&self, ivertex: usize) -> CoordRef {
    self.vertices.column(ivertex)
  }
  pub fn base_vertex(&self) -> CoordRef {
    self.coord(0)
  }

  pub fn spanning_vectors(&self) -> Matrix {
    spanning_vectors(&self.vertices)
  }
  pub fn det(&self) -> f64 {
    self.det
  }
  pub fn vol(&self) -> f64 {
    refsimp_vol(self.dim()) * self.det.abs()
  }

  /// Gradients of the barycentric coordinate functions as columns.
  ///
  /// $nabla lambda = J^(-T) nabla_"ref" lambda$
  pub fn difbarys(&self) -> Matrix {
    self.inv_linear_transform.transpose() * ref_difbarys(self.dim())
  }

  pub fn global2local(&self, global: CoordRef) -> Coord {
    &self.inv_linear_transform * (global - self.base_vertex())
  }
  pub fn global2bary(&self, global: CoordRef) -> Coord {
    local2bary(&self.global2local(global))
  }
  pub fn bary2global(&self, bary: &Vector) -> Coord {
    &self.vertices * bary
  }

  pub fn bbox(&self) -> (Coord, Coord) {
    let min = Vector::from_iterator(self.dim(), self.vertices.row_iter().map(|r| r.min()));
    let max = Vector::from_iterator(self.dim(), self.vertices.row_iter().map(|r| r.max()));
    (min, max)
  }

  pub fn edge_lengths(&self) -> impl Iterator<Item = f64> + '_ {
    let n = self.nvertices();
    (0..n)
      .flat_map(move |i| (i + 1..n).map(move |j| (i, j)))
      .map(|(i, j)| (self.coord(j) - self.coord(i)).norm())
  }
}

pub(crate) fn spanning_vectors(vertices: &Matrix) -> Matrix {
  let v0 = vertices.column(0);
  let mut mat = Matrix::zeros(vertices.nrows(), vertices.ncols() - 1);
  for (i, vi) in vertices.column_iter().skip(1).enumerate() {
    mat.set_column(i, &(vi - v0));
  }
  mat
}

#[cfg(test)]
mod test {
  use super::*;

  use approx::assert_relative_eq;

  fn triangle() -> SimplexCoords {
    SimplexCoords::new(na::dmatrix![
      1.0, 3.0, 1.0;
      1.0, 1.0, 2.0
    ])
    .unwrap()
  }

  #[test]
  fn volume_and_difbarys() {
    let simp = triangle();
    assert_relative_eq!(simp.vol(), 1.0);

    let difbarys = simp.difbarys();
    #[rustfmt::skip]
    let expected = na::dmatrix![
      -0.5, 0.5, 0.0;
      -1.0, 0.0, 1.0
    ];
    assert_relative_eq!(difbarys, expected, epsilon = 1e-14);

    // barycentric gradients sum to zero
    for row in difbarys.row_iter() {
      assert_relative_eq!(row.sum(), 0.0, epsilon = 1e-14);
    }
  }

  #[test]
  fn bary_roundtrip() {
    let simp = triangle();
    let x = na::dvector![2.0, 1.25];
    let bary = simp.global2bary(x.as_view());
    assert_relative_eq!(bary.sum(), 1.0, epsilon = 1e-14);
    assert!(bary.iter().all(|&b| b >= 0.0));
    assert_relative_eq!(simp.bary2global(&bary), x, epsilon = 1e-14);

    let vertex_bary = simp.global2bary(simp.coord(2));
    assert_relative_eq!(vertex_bary, na::dvector![0.0, 0.0, 1.0], epsilon = 1e-14);
  }

  #[test]
  fn degenerate_is_rejected() {
    let flat = na::dmatrix![
      0.0, 1.0, 2.0;
      0.0, 1.0, 2.0
    ];
    assert!(SimplexCoords::new(flat).is_none());
    let (min, max) = triangle().bbox();
    assert_eq!(min, na::dvector![1.0, 1.0]);
    assert_eq!(max, na::dvector![3.0, 2.0]);
  }
}
