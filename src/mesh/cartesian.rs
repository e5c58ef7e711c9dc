use super::{Simplex, SimplicialMesh};
use crate::{
  error::{Error, Result},
  linalg::nalgebra::{Matrix, Vector},
  util::factorial,
  Dim, VertexIdx,
};

use itertools::Itertools;

/// converts linear index to cartesian index
///
/// converts linear index in 0..dim_len^d to cartesian index in (0)^d..(dim_len)^d
pub fn linear_index2cartesian_index(
  mut lin_idx: usize,
  dim_len: usize,
  dim: usize,
) -> Vector<usize> {
  let mut cart_idx = Vector::zeros(dim);
  for icomp in 0..dim {
    cart_idx[icomp] = lin_idx % dim_len;
    lin_idx /= dim_len;
  }
  cart_idx
}

/// converts cartesian index to linear index
///
/// converts cartesian index in (0)^d..(dim_len)^d to linear index in 0..dim_len^d
pub fn cartesian_index2linear_index(cart_idx: &Vector<usize>, dim_len: usize) -> usize {
  let dim = cart_idx.len();
  let mut lin_idx = 0;
  for icomp in (0..dim).rev() {
    lin_idx *= dim_len;
    lin_idx += cart_idx[icomp];
  }
  lin_idx
}

#[derive(Debug, Clone)]
pub struct Rect {
  min: Vector,
  max: Vector,
}

impl Rect {
  pub fn new_min_max(min: Vector, max: Vector) -> Result<Self> {
    if min.len() != max.len() {
      return Err(Error::InvalidMesh(format!(
        "box corners of dimension {} and {}",
        min.len(),
        max.len()
      )));
    }
    if !min.iter().zip(max.iter()).all(|(a, b)| a < b) {
      return Err(Error::InvalidMesh(format!(
        "empty box [{min:?}, {max:?}]",
        min = min.as_slice(),
        max = max.as_slice()
      )));
    }
    Ok(Self { min, max })
  }
  pub fn new_unit_cube(dim: Dim) -> Self {
    let min = Vector::zeros(dim);
    let max = Vector::from_element(dim, 1.0);
    Self { min, max }
  }

  pub fn dim(&self) -> usize {
    self.min.len()
  }
  pub fn min(&self) -> &Vector {
    &self.min
  }
  pub fn max(&self) -> &Vector {
    &self.max
  }
  pub fn side_lengths(&self) -> Vector {
    &self.max - &self.min
  }
}

/// Tensor-product mesh of a box, each cube split into $d!$ simplicies.
///
/// The unit square with `ncells_axis = n` gives the usual $n times n$ "right"
/// triangulation, where every square is cut along its $(0,0) -> (1,1)$ diagonal.
#[derive(Debug, Clone)]
pub struct CartesianMeshInfo {
  rect: Rect,
  ncells_axis: usize,
}
// constructors
impl CartesianMeshInfo {
  pub fn new_min_max(min: Vector, max: Vector, ncells_axis: usize) -> Result<Self> {
    let rect = Rect::new_min_max(min, max)?;
    Ok(Self { rect, ncells_axis })
  }
  /// Validated on [`CartesianMeshInfo::compute_mesh`].
  pub fn new_unit(dim: Dim, ncells_axis: usize) -> Self {
    let rect = Rect::new_unit_cube(dim);
    Self { rect, ncells_axis }
  }
}
// getters
impl CartesianMeshInfo {
  pub fn rect(&self) -> &Rect {
    &self.rect
  }
  pub fn dim(&self) -> usize {
    self.rect.dim()
  }
  pub fn ncells_axis(&self) -> usize {
    self.ncells_axis
  }
  pub fn nvertices_axis(&self) -> usize {
    self.ncells_axis + 1
  }
  pub fn nboxes(&self) -> usize {
    self.ncells_axis.pow(self.dim() as u32)
  }
  pub fn nvertices(&self) -> usize {
    self.nvertices_axis().pow(self.dim() as u32)
  }
  pub fn vertex_cart_idx(&self, ivertex: VertexIdx) -> Vector<usize> {
    linear_index2cartesian_index(ivertex, self.nvertices_axis(), self.dim())
  }
  pub fn vertex_pos(&self, ivertex: VertexIdx) -> Vector {
    (self.vertex_cart_idx(ivertex).cast::<f64>() / self.ncells_axis as f64)
      .component_mul(&self.rect.side_lengths())
      + self.rect.min()
  }

  pub fn is_vertex_on_boundary(&self, ivertex: VertexIdx) -> bool {
    self
      .vertex_cart_idx(ivertex)
      .iter()
      .any(|&c| c == 0 || c == self.ncells_axis)
  }

  pub fn boundary_vertices(&self) -> Vec<VertexIdx> {
    (0..self.nvertices())
      .filter(|&ivertex| self.is_vertex_on_boundary(ivertex))
      .collect()
  }
}

impl CartesianMeshInfo {
  pub fn compute_mesh(&self) -> Result<SimplicialMesh> {
    if self.ncells_axis == 0 || self.dim() == 0 {
      return Err(Error::InvalidMesh(format!(
        "need at least one cell per axis in at least one dimension, got {} cells in dimension {}",
        self.ncells_axis,
        self.dim()
      )));
    }
    SimplicialMesh::new(self.compute_vertex_coords(), self.compute_cells())
  }

  pub fn compute_vertex_coords(&self) -> Matrix {
    let mut coords = Matrix::zeros(self.dim(), self.nvertices());
    for (ivertex, mut coord) in coords.column_iter_mut().enumerate() {
      coord.copy_from(&self.vertex_pos(ivertex));
    }
    coords
  }

  pub fn compute_cells(&self) -> Vec<Simplex> {
    let dim = self.dim();
    let nboxes = self.nboxes();
    let mut simplicies = Vec::with_capacity(factorial(dim) * nboxes);

    for ibox in 0..nboxes {
      let vertex_icart_origin = linear_index2cartesian_index(ibox, self.ncells_axis, dim);
      let ivertex_origin = cartesian_index2linear_index(&vertex_icart_origin, self.nvertices_axis());

      // Each permutation of the basis directions gives rise to one simplex,
      // obtained by walking from the box origin along the permuted axes.
      let box_simplicies = (0..dim).permutations(dim).map(|basisdirs| {
        let mut simplex = vec![ivertex_origin];
        let mut vertex_icart = vertex_icart_origin.clone();
        for &basisdir in &basisdirs {
          vertex_icart[basisdir] += 1;
          simplex.push(cartesian_index2linear_index(
            &vertex_icart,
            self.nvertices_axis(),
          ));
        }
        debug_assert!(simplex.windows(2).all(|w| w[0] < w[1]));
        simplex
      });
      simplicies.extend(box_simplicies);
    }

    simplicies
  }
}

#[cfg(test)]
mod test {
  use super::CartesianMeshInfo;
  use crate::{error::Error, linalg::nalgebra::Matrix};

  #[test]
  fn unit_cube_mesh() {
    let info = CartesianMeshInfo::new_unit(3, 1);
    let coords = info.compute_vertex_coords();

    #[rustfmt::skip]
    let expected_coords = Matrix::from_column_slice(3, 8, &[
      0., 0., 0.,
      1., 0., 0.,
      0., 1., 0.,
      1., 1., 0.,
      0., 0., 1.,
      1., 0., 1.,
      0., 1., 1.,
      1., 1., 1.,
    ]);
    assert_eq!(coords, expected_coords);

    let expected_cells = vec![
      vec![0, 1, 3, 7],
      vec![0, 1, 5, 7],
      vec![0, 2, 3, 7],
      vec![0, 2, 6, 7],
      vec![0, 4, 5, 7],
      vec![0, 4, 6, 7],
    ];
    assert_eq!(info.compute_cells(), expected_cells);

    let mesh = info.compute_mesh().unwrap();
    assert!((mesh.vol() - 1.0).abs() < 1e-14);
  }

  #[test]
  fn unit_square_mesh() {
    let info = CartesianMeshInfo::new_unit(2, 2);
    let mesh = info.compute_mesh().unwrap();

    #[rustfmt::skip]
    let expected_coords = Matrix::from_column_slice(2, 9, &[
      0.0, 0.0,
      0.5, 0.0,
      1.0, 0.0,
      0.0, 0.5,
      0.5, 0.5,
      1.0, 0.5,
      0.0, 1.0,
      0.5, 1.0,
      1.0, 1.0,
    ]);
    assert_eq!(*mesh.coords(), expected_coords);

    let expected_simplicies = vec![
      vec![0, 1, 4],
      vec![0, 3, 4],
      vec![1, 2, 5],
      vec![1, 4, 5],
      vec![3, 4, 7],
      vec![3, 6, 7],
      vec![4, 5, 8],
      vec![4, 7, 8],
    ];
    assert_eq!(mesh.cells(), expected_simplicies.as_slice());
  }

  #[test]
  fn boundary_matches_topology() {
    for ncells_axis in [1, 3, 6] {
      let info = CartesianMeshInfo::new_unit(2, ncells_axis);
      let mesh = info.compute_mesh().unwrap();
      assert_eq!(mesh.boundary_vertices(), info.boundary_vertices());
      assert_eq!(info.boundary_vertices().len(), 4 * ncells_axis);
    }
  }

  #[test]
  fn scaled_box() {
    let info =
      CartesianMeshInfo::new_min_max(na::dvector![-1.0, 0.0], na::dvector![1.0, 4.0], 4).unwrap();
    let mesh = info.compute_mesh().unwrap();
    assert!((mesh.vol() - 8.0).abs() < 1e-12);
    assert_eq!(mesh.coord(mesh.nvertices() - 1), na::dvector![1.0, 4.0]);
  }

  #[test]
  fn invalid_boxes_are_rejected() {
    assert!(matches!(
      CartesianMeshInfo::new_unit(2, 0).compute_mesh(),
      Err(Error::InvalidMesh(_))
    ));
    assert!(matches!(
      CartesianMeshInfo::new_unit(0, 4).compute_mesh(),
      Err(Error::InvalidMesh(_))
    ));
    assert!(matches!(
      CartesianMeshInfo::new_min_max(na::dvector![0.0, 1.0], na::dvector![1.0, 1.0], 2),
      Err(Error::InvalidMesh(_))
    ));
    assert!(matches!(
      CartesianMeshInfo::new_min_max(na::dvector![0.0], na::dvector![1.0, 1.0], 2),
      Err(Error::InvalidMesh(_))
    ));
    assert!(matches!(
      CartesianMeshInfo::new_min_max(na::dvector![0.0, 0.0], na::dvector![1.0, 1.0], 0)
        .unwrap()
        .compute_mesh(),
      Err(Error::InvalidMesh(_))
    ));
  }
}
