//! # Error
//! The failure modes of the Poisson solver

use miette::Diagnostic;

#[derive(thiserror::Error, Debug, Diagnostic)]
/// Errors raised while assembling or solving the Poisson problem
pub enum PoissonError {
    /// The permittivity and charge profiles do not sample the same vertices
    #[error("permittivity profile has {permittivity} samples but the charge profile has {charge}")]
    #[diagnostic(
        code(stratum::poisson::length_mismatch),
        help("both profiles must be sampled on the same mesh")
    )]
    LengthMismatch {
        /// The length of the permittivity profile
        permittivity: usize,
        /// The length of the charge profile
        charge: usize,
    },
    /// The operator could not be Cholesky factorised
    #[error("the Poisson operator is not positive definite")]
    #[diagnostic(
        code(stratum::poisson::factorisation),
        help("the permittivity must be strictly positive at every sample")
    )]
    Factorisation,
    /// The sparse operator could not be constructed
    #[error("failed to construct the sparse operator: {0}")]
    #[diagnostic(code(stratum::poisson::csr))]
    Csr(String),
    #[error(transparent)]
    /// The solution could not be attached to the mesh
    Mesh(#[from] stratum_mesher::MeshError),
}
