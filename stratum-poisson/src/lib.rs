//! This crate solves the Poisson equation for the electrostatic potential in a layered structure
//!
//! In one dimension, with a permittivity varying along the growth axis, the Poisson equation is
//!
//! $ \mathrm{d} / \mathrm{d} z \left( \epsilon \mathrm{d} \phi / \mathrm{d} z \right) = - \rho $
//!
//! The equation is discretised on the vertices of a uniform [`Mesh1d`](stratum_mesher::Mesh1d),
//! with the permittivity evaluated at the half-points between vertices. The assembled operator is
//! symmetric and positive definite once the boundary conditions are imposed, so it is stored as a
//! sparse matrix and solved through a sparse Cholesky decomposition.
//!
//! Three boundary regimes are supported, see [`BoundaryCondition`]. The electric field is derived
//! from a solved potential by [`extract_field`].
#![warn(missing_docs)]

mod boundary;
mod error;
mod field;
mod operator;
mod postprocess;
mod solve;
mod source;

pub use boundary::{voltage_drop_from_field, BoundaryCondition};
pub use error::PoissonError;
pub use field::{extract_field, PotentialConvention};
pub use postprocess::PostProcess;
pub use solve::{PoissonSolution, PoissonSolver};
