pub mod faer;
pub mod nalgebra;
