pub mod heat;
pub mod poisson;
