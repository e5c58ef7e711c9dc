pub type Vector<T = f64> = na::DVector<T>;
pub type Matrix<T = f64> = na::DMatrix<T>;
pub type CooMatrix<T = f64> = nas::CooMatrix<T>;
pub type CsrMatrix<T = f64> = nas::CsrMatrix<T>;

pub fn bilinear_form(mat: &CsrMatrix, u: &Vector, v: &Vector) -> f64 {
  (mat * u).dot(v)
}
pub fn quadratic_form_sparse(mat: &CsrMatrix, u: &Vector) -> f64 {
  bilinear_form(mat, u, u)
}

/// Euclidean norm restricted to the rows not flagged.
pub fn masked_norm(v: &Vector, masked: &[bool]) -> f64 {
  v.iter()
    .zip(masked)
    .filter(|&(_, &m)| !m)
    .map(|(x, _)| x * x)
    .sum::<f64>()
    .sqrt()
}

pub trait DMatrixExt {
  fn is_spd(&self) -> bool;
}
impl DMatrixExt for Matrix {
  fn is_spd(&self) -> bool {
    self.is_square() && *self == self.transpose() && na::Cholesky::new(self.clone()).is_some()
  }
}

#[cfg(test)]
mod test {
  use super::*;

  #[test]
  fn quadratic_form_of_identity() {
    let coo = CooMatrix::try_from_triplets(3, 3, vec![0, 1, 2], vec![0, 1, 2], vec![1.0; 3])
      .unwrap();
    let csr = CsrMatrix::from(&coo);
    let u = Vector::from_vec(vec![1.0, 2.0, 2.0]);
    assert_eq!(quadratic_form_sparse(&csr, &u), 9.0);
    assert_eq!(masked_norm(&u, &[false, true, false]), 5.0f64.sqrt());
  }
}
