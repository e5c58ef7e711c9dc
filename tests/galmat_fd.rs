extern crate nalgebra as na;

use heatbench::{assemble, mesh::cartesian::CartesianMeshInfo, operators::LaplaceElmat};

/// Finite difference Laplacian on the vertex grid, without the $h^(-2)$ scaling.
///
/// An edge along one axis that lies on the boundary in another axis
/// is weighted by $1/2$ per such axis.
fn fd_laplacian(info: &CartesianMeshInfo) -> na::DMatrix<f64> {
  let nvertices = info.nvertices();
  let ncells_axis = info.ncells_axis();
  let stride = |axis: usize| info.nvertices_axis().pow(axis as u32);

  let mut laplacian = na::DMatrix::zeros(nvertices, nvertices);
  for ivertex in 0..nvertices {
    let cart = info.vertex_cart_idx(ivertex);
    for axis in 0..info.dim() {
      let weight: f64 = (0..info.dim())
        .filter(|&other| other != axis)
        .map(|other| match cart[other] == 0 || cart[other] == ncells_axis {
          true => 0.5,
          false => 1.0,
        })
        .product();

      let mut neighbors = Vec::new();
      if cart[axis] > 0 {
        neighbors.push(ivertex - stride(axis));
      }
      if cart[axis] < ncells_axis {
        neighbors.push(ivertex + stride(axis));
      }
      for jvertex in neighbors {
        laplacian[(ivertex, ivertex)] += weight;
        laplacian[(ivertex, jvertex)] -= weight;
      }
    }
  }
  laplacian
}

#[test]
fn fe_vs_fd() {
  for dim in 1..=2 {
    for ncells_axis in 1..=4 {
      let info = CartesianMeshInfo::new_unit(dim, ncells_axis);
      let mesh = info.compute_mesh().unwrap();
      let mesh_width = (ncells_axis as f64).recip();

      let fe_laplacian = assemble::assemble_galmat(&mesh, LaplaceElmat).to_nalgebra_dense();
      let fd_laplacian = mesh_width.powi(dim as i32 - 2) * fd_laplacian(&info);

      let diff = &fe_laplacian - &fd_laplacian;
      if diff.norm() > 1e-12 {
        println!("FE:\n{fe_laplacian:.3}");
        println!("FD:\n{fd_laplacian:.3}");
        panic!("FE and FD disagree in d={dim} with n={ncells_axis}");
      }
    }
  }
}

/// Away from the boundary the P1 stiffness matrix is the $2d+1$ point stencil.
#[test]
fn interior_stencil() {
  for dim in 2..=3 {
    let ncells_axis = 3;
    let info = CartesianMeshInfo::new_unit(dim, ncells_axis);
    let mesh = info.compute_mesh().unwrap();
    let mesh_width = (ncells_axis as f64).recip();

    let fe_laplacian = assemble::assemble_galmat(&mesh, LaplaceElmat).to_nalgebra_dense();
    let fd_laplacian = mesh_width.powi(dim as i32 - 2) * fd_laplacian(&info);

    let interior: Vec<_> = (0..mesh.nvertices())
      .filter(|&i| !info.is_vertex_on_boundary(i))
      .collect();
    assert_eq!(interior.len(), (ncells_axis - 1).pow(dim as u32));
    for ivertex in interior {
      let diff = fe_laplacian.row(ivertex) - fd_laplacian.row(ivertex);
      assert!(diff.norm() < 1e-12, "row {ivertex} differs in d={dim}");
      let diag = 2.0 * dim as f64 * mesh_width.powi(dim as i32 - 2);
      assert!((fe_laplacian[(ivertex, ivertex)] - diag).abs() < 1e-12);
    }
  }
}

/// The mesh width drops out of the 2D stiffness matrix.
#[test]
fn stiffness_is_scale_invariant_in_2d() {
  let unit = CartesianMeshInfo::new_unit(2, 3).compute_mesh().unwrap();
  let stretched =
    CartesianMeshInfo::new_min_max(na::dvector![0.0, 0.0], na::dvector![5.0, 5.0], 3)
      .unwrap()
      .compute_mesh()
      .unwrap();

  let a = assemble::assemble_galmat(&unit, LaplaceElmat).to_nalgebra_dense();
  let b = assemble::assemble_galmat(&stretched, LaplaceElmat).to_nalgebra_dense();
  assert!((a - b).norm() < 1e-12);
}
