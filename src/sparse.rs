use crate::linalg::nalgebra::{CooMatrix, CsrMatrix, Matrix};

/// Galerkin matrix in triplet (COO) form.
///
/// Duplicate entries are summed up on conversion.
#[derive(Default, Debug, Clone)]
pub struct SparseMatrix {
  nrows: usize,
  ncols: usize,
  triplets: Vec<(usize, usize, f64)>,
}

impl SparseMatrix {
  pub fn zeros(nrows: usize, ncols: usize) -> Self {
    Self::new(nrows, ncols, Vec::new())
  }
  pub fn new(nrows: usize, ncols: usize, triplets: Vec<(usize, usize, f64)>) -> Self {
    assert!(triplets.iter().all(|&(r, c, _)| r < nrows && c < ncols));
    Self {
      nrows,
      ncols,
      triplets,
    }
  }

  pub fn nrows(&self) -> usize {
    self.nrows
  }
  pub fn ncols(&self) -> usize {
    self.ncols
  }
  pub fn triplets(&self) -> &[(usize, usize, f64)] {
    &self.triplets
  }
  pub fn nnz(&self) -> usize {
    self.triplets.len()
  }

  pub fn push(&mut self, r: usize, c: usize, v: f64) {
    assert!(r < self.nrows() && c < self.ncols());
    if v != 0.0 {
      self.triplets.push((r, c, v));
    }
  }

  pub fn set_zero<F>(&mut self, predicate: F)
  where
    F: Fn(usize, usize) -> bool,
  {
    self.triplets.retain(|&(r, c, _)| !predicate(r, c));
  }

  /// $alpha A + beta B$
  pub fn lincomb(alpha: f64, a: &Self, beta: f64, b: &Self) -> Self {
    assert!(a.nrows == b.nrows && a.ncols == b.ncols);
    let triplets = a
      .triplets
      .iter()
      .map(|&(r, c, v)| (r, c, alpha * v))
      .chain(b.triplets.iter().map(|&(r, c, v)| (r, c, beta * v)))
      .filter(|&(_, _, v)| v != 0.0)
      .collect();
    Self::new(a.nrows, a.ncols, triplets)
  }

  pub fn to_nalgebra_coo(&self) -> CooMatrix {
    let mut coo = CooMatrix::new(self.nrows, self.ncols);
    for &(r, c, v) in &self.triplets {
      coo.push(r, c, v);
    }
    coo
  }

  pub fn to_nalgebra_csr(&self) -> CsrMatrix {
    (&self.to_nalgebra_coo()).into()
  }

  pub fn to_nalgebra_dense(&self) -> Matrix {
    (&self.to_nalgebra_coo()).into()
  }

  pub fn transpose(&self) -> SparseMatrix {
    let triplets = self.triplets.iter().map(|&(r, c, v)| (c, r, v)).collect();
    Self::new(self.ncols, self.nrows, triplets)
  }
}
