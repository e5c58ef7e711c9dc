pub mod cartesian;

use crate::{
  error::{Error, Result},
  geometry::{spanning_vectors, CoordRef, SimplexCoords},
  linalg::nalgebra::Matrix,
  CellIdx, Dim, VertexIdx,
};

use itertools::Itertools;
use std::collections::HashMap;

/// Vertex indices of a simplex, sorted increasingly.
pub type Simplex = Vec<VertexIdx>;

/// Coordinate simplicial mesh of full dimension.
///
/// Vertex coordinates are stored column-wise.
#[derive(Debug, Clone)]
pub struct SimplicialMesh {
  coords: Matrix,
  cells: Vec<Simplex>,
  cell_coords: Vec<SimplexCoords>,
}

#[derive(Debug, Clone, Copy)]
pub struct CellRef<'a> {
  pub icell: CellIdx,
  pub vertices: &'a [VertexIdx],
  pub geometry: &'a SimplexCoords,
}

impl SimplicialMesh {
  pub fn new(coords: Matrix, mut cells: Vec<Simplex>) -> Result<Self> {
    let dim = coords.nrows();
    let nvertices = coords.ncols();
    if dim == 0 {
      return Err(Error::InvalidMesh("zero-dimensional mesh".into()));
    }

    for (icell, cell) in cells.iter_mut().enumerate() {
      if cell.len() != dim + 1 {
        return Err(Error::InvalidMesh(format!(
          "cell {icell} has {} vertices, expected {}",
          cell.len(),
          dim + 1
        )));
      }
      if let Some(&v) = cell.iter().find(|&&v| v >= nvertices) {
        return Err(Error::InvalidMesh(format!(
          "cell {icell} references vertex {v}, but there are only {nvertices}"
        )));
      }
      cell.sort_unstable();
      if !cell.iter().all_unique() {
        return Err(Error::InvalidMesh(format!("cell {icell} has repeated vertices")));
      }
    }

    let cell_coords = cells
      .iter()
      .enumerate()
      .map(|(icell, cell)| {
        let vertices = simplex_vertex_coords(&coords, cell);
        SimplexCoords::new(vertices.clone()).ok_or_else(|| Error::DegenerateCell {
          icell,
          vol: spanning_vol(&vertices),
        })
      })
      .collect::<Result<_>>()?;

    Ok(Self {
      coords,
      cells,
      cell_coords,
    })
  }

  pub fn dim(&self) -> Dim {
    self.coords.nrows()
  }
  pub fn nvertices(&self) -> usize {
    self.coords.ncols()
  }
  pub fn ncells(&self) -> usize {
    self.cells.len()
  }

  pub fn coords(&self) -> &Matrix {
    &self.coords
  }
  pub fn coord(&self, ivertex: VertexIdx) -> CoordRef {
    self.coords.column(ivertex)
  }
  pub fn coord_iter(&self) -> impl Iterator<Item = CoordRef> + '_ {
    self.coords.column_iter()
  }

  pub fn cells(&self) -> &[Simplex] {
    &self.cells
  }
  pub fn cell(&self, icell: CellIdx) -> CellRef {
    CellRef {
      icell,
      vertices: &self.cells[icell],
      geometry: &self.cell_coords[icell],
    }
  }
  pub fn cell_iter(&self) -> impl ExactSizeIterator<Item = CellRef> + '_ {
    (0..self.ncells()).map(|icell| self.cell(icell))
  }
  pub fn cell_coords(&self, icell: CellIdx) -> &SimplexCoords {
    &self.cell_coords[icell]
  }

  /// Facets that are the face of exactly one cell.
  pub fn boundary_facets(&self) -> Vec<Simplex> {
    let mut facet_counts: HashMap<Simplex, usize> = HashMap::new();
    for cell in &self.cells {
      for facet in cell.iter().copied().combinations(self.dim()) {
        *facet_counts.entry(facet).or_default() += 1;
      }
    }
    facet_counts
      .into_iter()
      .filter(|&(_, count)| count == 1)
      .map(|(facet, _)| facet)
      .sorted()
      .collect()
  }

  /// The vertices that lie on the boundary of the mesh. Sorted.
  pub fn boundary_vertices(&self) -> Vec<VertexIdx> {
    self
      .boundary_facets()
      .into_iter()
      .flatten()
      .sorted_unstable()
      .dedup()
      .collect()
  }

  pub fn mesh_width_max(&self) -> f64 {
    self
      .cell_coords
      .iter()
      .flat_map(|c| c.edge_lengths())
      .fold(0.0, f64::max)
  }

  pub fn vol(&self) -> f64 {
    self.cell_coords.iter().map(|c| c.vol()).sum()
  }
}

fn simplex_vertex_coords(coords: &Matrix, simplex: &[VertexIdx]) -> Matrix {
  let mut vert_coords = Matrix::zeros(coords.nrows(), simplex.len());
  for (i, &v) in simplex.iter().enumerate() {
    vert_coords.set_column(i, &coords.column(v));
  }
  vert_coords
}

fn spanning_vol(vertices: &Matrix) -> f64 {
  let span = spanning_vectors(vertices);
  if span.is_square() {
    span.determinant().abs()
  } else {
    0.0
  }
}
