//! Point location on simplicial meshes.

use super::FeFunction;
use crate::{
  error::{Error, Result},
  geometry::CoordRef,
  linalg::nalgebra::Vector,
  mesh::SimplicialMesh,
  CellIdx, VertexIdx,
};

use rayon::prelude::*;

/// Barycentric coordinates above this (negative) value count as inside.
pub const INSIDE_TOL: f64 = 1e-10;

/// Uniform bucket grid over the cell bounding boxes.
#[derive(Debug, Clone)]
pub struct PointLocator {
  min: Vector,
  bin_size: Vector,
  nbins_axis: usize,
  bins: Vec<Vec<CellIdx>>,
}

impl PointLocator {
  pub fn new(mesh: &SimplicialMesh) -> Self {
    let dim = mesh.dim();
    let coords = mesh.coords();
    let min = Vector::from_iterator(dim, coords.row_iter().map(|r| r.min()));
    let max = Vector::from_iterator(dim, coords.row_iter().map(|r| r.max()));

    let nbins_axis = ((mesh.ncells() as f64).powf((dim as f64).recip()).ceil() as usize).max(1);
    let bin_size = (&max - &min).map(|l| (l / nbins_axis as f64).max(f64::MIN_POSITIVE));

    let mut locator = Self {
      min,
      bin_size,
      nbins_axis,
      bins: vec![Vec::new(); nbins_axis.pow(dim as u32)],
    };

    for cell in mesh.cell_iter() {
      let (cell_min, cell_max) = cell.geometry.bbox();
      let lo = locator.bin_cart_idx(cell_min.iter().map(|x| x - INSIDE_TOL));
      let hi = locator.bin_cart_idx(cell_max.iter().map(|x| x + INSIDE_TOL));
      for ibin in locator.bin_range(&lo, &hi) {
        locator.bins[ibin].push(cell.icell);
      }
    }

    tracing::debug!(
      "built point locator with {} bins for {} cells",
      locator.bins.len(),
      mesh.ncells()
    );
    locator
  }

  fn dim(&self) -> usize {
    self.min.len()
  }

  fn bin_cart_idx(&self, point: impl Iterator<Item = f64>) -> Vec<usize> {
    point
      .enumerate()
      .map(|(i, x)| {
        let rel = ((x - self.min[i]) / self.bin_size[i]).floor();
        rel.clamp(0.0, (self.nbins_axis - 1) as f64) as usize
      })
      .collect()
  }

  fn bin_linear_idx(&self, cart: &[usize]) -> usize {
    cart
      .iter()
      .rev()
      .fold(0, |lin, &c| lin * self.nbins_axis + c)
  }

  /// All bins in the cartesian range `lo..=hi`.
  fn bin_range(&self, lo: &[usize], hi: &[usize]) -> Vec<usize> {
    let mut bins = vec![Vec::new()];
    for (&l, &h) in lo.iter().zip(hi) {
      bins = bins
        .into_iter()
        .flat_map(|prefix: Vec<usize>| {
          (l..=h).map(move |c| {
            let mut idx = prefix.clone();
            idx.push(c);
            idx
          })
        })
        .collect();
    }
    bins.iter().map(|cart| self.bin_linear_idx(cart)).collect()
  }

  fn is_in_bbox(&self, point: CoordRef) -> bool {
    (0..self.dim()).all(|i| {
      let rel = point[i] - self.min[i];
      rel >= -INSIDE_TOL && rel <= self.bin_size[i] * self.nbins_axis as f64 + INSIDE_TOL
    })
  }

  /// Finds the cell containing the point and the barycentric coordinates within it.
  ///
  /// Points on shared faces are attributed to the candidate cell
  /// in which the point lies deepest.
  pub fn locate(&self, mesh: &SimplicialMesh, point: CoordRef) -> Result<(CellIdx, Vector)> {
    let outside = || Error::PointOutsideMesh {
      point: point.iter().copied().collect(),
    };
    if point.len() != self.dim() || !self.is_in_bbox(point) {
      return Err(outside());
    }

    let ibin = self.bin_linear_idx(&self.bin_cart_idx(point.iter().copied()));
    let mut best: Option<(CellIdx, Vector, f64)> = None;
    for &icell in &self.bins[ibin] {
      let bary = mesh.cell_coords(icell).global2bary(point);
      let depth = bary.min();
      if best.as_ref().map_or(true, |(_, _, best_depth)| depth > *best_depth) {
        best = Some((icell, bary, depth));
      }
    }

    match best {
      Some((icell, bary, depth)) if depth >= -INSIDE_TOL => Ok((icell, bary)),
      _ => Err(outside()),
    }
  }
}

/// Precomputed point locations, for repeated evaluation at fixed points.
#[derive(Debug, Clone)]
pub struct EvaluationStencil {
  entries: Vec<(Vec<VertexIdx>, Vector)>,
}

impl EvaluationStencil {
  pub fn new(mesh: &SimplicialMesh, locator: &PointLocator, points: &[Vec<f64>]) -> Result<Self> {
    let entries = points
      .par_iter()
      .map(|point| {
        let point = Vector::from_column_slice(point);
        let (icell, bary) = locator.locate(mesh, point.as_view())?;
        Ok((mesh.cells()[icell].clone(), bary))
      })
      .collect::<Result<_>>()?;
    Ok(Self { entries })
  }

  pub fn npoints(&self) -> usize {
    self.entries.len()
  }

  pub fn evaluate(&self, fe: &FeFunction) -> Vec<f64> {
    self
      .entries
      .iter()
      .map(|(vertices, bary)| {
        vertices
          .iter()
          .zip(bary.iter())
          .map(|(&ivertex, &b)| b * fe[ivertex])
          .sum()
      })
      .collect()
  }
}
