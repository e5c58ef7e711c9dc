use crate::{
  linalg::nalgebra::Vector,
  mesh::SimplicialMesh,
  operators::{DofIdx, ElMatProvider, ElVecProvider},
  sparse::SparseMatrix,
  util,
};

use rayon::prelude::*;

pub type GalMat = SparseMatrix;
pub type GalVec = Vector;

/// Assembly algorithm for the Galerkin Matrix.
pub fn assemble_galmat(mesh: &SimplicialMesh, elmat: impl ElMatProvider) -> GalMat {
  let ndofs = mesh.nvertices();

  let triplets: Vec<(usize, usize, f64)> = (0..mesh.ncells())
    .into_par_iter()
    .flat_map_iter(|icell| {
      let cell = mesh.cell(icell);
      let elmat = elmat.eval(cell);

      let mut local_triplets = Vec::with_capacity(elmat.len());
      for (ilocal, &iglobal) in cell.vertices.iter().enumerate() {
        for (jlocal, &jglobal) in cell.vertices.iter().enumerate() {
          let val = elmat[(ilocal, jlocal)];
          if val != 0.0 {
            local_triplets.push((iglobal, jglobal, val));
          }
        }
      }
      local_triplets
    })
    .collect();

  GalMat::new(ndofs, ndofs, triplets)
}

/// Assembly algorithm for the Galerkin Vector.
pub fn assemble_galvec(mesh: &SimplicialMesh, elvec: impl ElVecProvider) -> GalVec {
  let entries: Vec<(usize, f64)> = (0..mesh.ncells())
    .into_par_iter()
    .flat_map_iter(|icell| {
      let cell = mesh.cell(icell);
      let elvec = elvec.eval(cell);
      cell
        .vertices
        .iter()
        .copied()
        .zip(elvec.iter().copied())
        .filter(|&(_, v)| v != 0.0)
        .collect::<Vec<_>>()
    })
    .collect();

  let mut galvec = GalVec::zeros(mesh.nvertices());
  for (irow, val) in entries {
    galvec[irow] += val;
  }
  galvec
}

pub fn enforce_homogeneous_dirichlet_bc(
  mesh: &SimplicialMesh,
  galmat: &mut GalMat,
  galvec: &mut GalVec,
) {
  fix_dofs_zero(&mesh.boundary_vertices(), galmat, galvec);
}

pub fn enforce_dirichlet_bc<F>(
  mesh: &SimplicialMesh,
  boundary_coeff_map: F,
  galmat: &mut GalMat,
  galvec: &mut GalVec,
) where
  F: Fn(DofIdx) -> f64,
{
  let dof_coeffs: Vec<_> = mesh
    .boundary_vertices()
    .into_iter()
    .map(|idof| (idof, boundary_coeff_map(idof)))
    .collect();

  fix_dofs_coeff(&dof_coeffs, galmat, galvec);
}

pub fn fix_dofs_zero(dofs: &[DofIdx], galmat: &mut GalMat, galvec: &mut GalVec) {
  let ndofs = galmat.nrows();
  let dof_flags = util::indicies_to_flags(dofs, ndofs);
  galmat.set_zero(|i, j| dof_flags[i] || dof_flags[j]);
  for &idof in dofs {
    galmat.push(idof, idof, 1.0);
    galvec[idof] = 0.0;
  }
}

/// Fix DOFs of FE solution.
///
/// Modifies supplied galerkin matrix and galerkin vector,
/// such that the FE solution has the given coefficents on the dofs.
/// The symmetry (and definiteness) of the matrix is preserved.
/// $mat(A_0, 0; 0, I) vec(mu_0, mu_diff) = vec(phi - A_(0 diff) gamma, gamma)$
pub fn fix_dofs_coeff(dof_coeffs: &[(DofIdx, f64)], galmat: &mut GalMat, galvec: &mut GalVec) {
  let ndofs = galmat.nrows();

  let dof_coeffs_opt = util::sparse_to_dense_data(dof_coeffs.to_vec(), ndofs);
  let dof_coeffs_zeroed =
    Vector::from_iterator(ndofs, dof_coeffs_opt.iter().map(|v| v.unwrap_or(0.0)));

  // Modify galvec.
  let galmat_csr = galmat.to_nalgebra_csr();
  *galvec -= &galmat_csr * &dof_coeffs_zeroed;

  // Set galvec to prescribed coefficents.
  dof_coeffs.iter().for_each(|&(i, v)| galvec[i] = v);

  // Set entires zero that share a (row or column) index with a fixed dof.
  galmat.set_zero(|r, c| dof_coeffs_opt[r].is_some() || dof_coeffs_opt[c].is_some());

  // Set galmat diagonal for dofs to one.
  for &(i, _) in dof_coeffs {
    galmat.push(i, i, 1.0);
  }
}
