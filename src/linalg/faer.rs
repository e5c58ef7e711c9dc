use faer::linalg::solvers::Solve;

use super::nalgebra::{CsrMatrix, Vector};
use crate::error::{Error, Result};

type SparseMatrixFaer = faer::sparse::SparseRowMat<usize, f64>;

pub fn nalgebra2faer(m: CsrMatrix) -> SparseMatrixFaer {
  let nrows = m.nrows();
  let ncols = m.ncols();
  let (row_ptrs, col_indices, values) = m.disassemble();

  let symbolic =
    faer::sparse::SymbolicSparseRowMat::new_checked(nrows, ncols, row_ptrs, None, col_indices);
  faer::sparse::SparseRowMat::new(symbolic, values)
}

/// Sparse Cholesky factorization of a symmetric positive definite matrix.
pub struct FaerCholesky {
  raw: faer::sparse::linalg::solvers::Llt<usize, f64>,
  ndofs: usize,
}
impl FaerCholesky {
  pub fn new(a: CsrMatrix) -> Result<Self> {
    if a.nrows() != a.ncols() {
      return Err(Error::Factorization(format!(
        "matrix is not square ({}x{})",
        a.nrows(),
        a.ncols()
      )));
    }
    let ndofs = a.nrows();
    let raw = nalgebra2faer(a)
      .sp_cholesky(faer::Side::Upper)
      .map_err(|err| Error::Factorization(format!("{err:?}")))?;
    Ok(Self { raw, ndofs })
  }

  pub fn ndofs(&self) -> usize {
    self.ndofs
  }

  pub fn solve(&self, b: &Vector) -> Vector {
    assert_eq!(b.nrows(), self.ndofs);
    let b = faer::Col::from_fn(b.nrows(), |i| b[i]);
    let x = self.raw.solve(b);
    Vector::from_iterator(x.nrows(), x.iter().copied())
  }
}

#[cfg(test)]
mod test {
  use super::*;
  use crate::linalg::nalgebra::CooMatrix;

  use approx::assert_relative_eq;

  #[test]
  fn solve_tridiagonal() {
    let n = 5;
    let mut coo = CooMatrix::new(n, n);
    for i in 0..n {
      coo.push(i, i, 2.0);
      if i + 1 < n {
        coo.push(i, i + 1, -1.0);
        coo.push(i + 1, i, -1.0);
      }
    }
    let a = CsrMatrix::from(&coo);
    let x_exact = Vector::from_fn(n, |i, _| (i + 1) as f64);
    let b = &a * &x_exact;

    let chol = FaerCholesky::new(a).unwrap();
    let x = chol.solve(&b);
    assert_relative_eq!(x, x_exact, epsilon = 1e-12);
  }

  #[test]
  fn indefinite_matrix_is_rejected() {
    let coo = CooMatrix::try_from_triplets(2, 2, vec![0, 1], vec![0, 1], vec![1.0, -1.0]).unwrap();
    assert!(FaerCholesky::new(CsrMatrix::from(&coo)).is_err());
  }
}
