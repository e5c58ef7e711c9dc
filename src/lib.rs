extern crate nalgebra as na;
extern crate nalgebra_sparse as nas;

pub mod assemble;
pub mod compare;
pub mod config;
pub mod error;
pub mod eval_points;
pub mod fe;
pub mod geometry;
pub mod io;
pub mod linalg;
pub mod mesh;
pub mod metrics;
pub mod operators;
pub mod problems;
pub mod sparse;
pub mod study;
pub mod util;

pub use error::{Error, Result};

pub type Dim = usize;
pub type VertexIdx = usize;
pub type CellIdx = usize;
