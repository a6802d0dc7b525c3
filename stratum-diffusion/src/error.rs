//! # Error
//! The failure modes of the diffusion solver

use miette::Diagnostic;
use nalgebra::RealField;

#[derive(thiserror::Error, Debug, Diagnostic)]
/// Errors raised while stepping a concentration profile
pub enum DiffusionError<T: RealField + Send + Sync> {
    /// The explicit scheme diverges for time steps above `dz^2 / (2 max(D))`
    #[error(
        "time step {time_step} s exceeds the stability bound {bound} s for a maximum diffusion coefficient of {max_coefficient} m^2/s"
    )]
    #[diagnostic(
        code(stratum::diffusion::unstable),
        help("choose a smaller time step, or sample the structure on a coarser mesh")
    )]
    Unstable {
        /// The requested time step
        time_step: T,
        /// The largest stable time step
        bound: T,
        /// The largest diffusion coefficient in the structure
        max_coefficient: T,
    },
    /// The time step must be positive and the end time must not be negative
    #[error("invalid time discretisation: time step {time_step} s, end time {end_time} s")]
    #[diagnostic(
        code(stratum::diffusion::time_loop),
        help("supply a finite, positive time step and a finite, non-negative end time")
    )]
    InvalidTimeLoop {
        /// The requested time step
        time_step: T,
        /// The requested end time
        end_time: T,
    },
    /// An array that must line up with the concentration profile has the wrong length
    #[error("expected {expected} diffusion coefficients to match the concentration profile, found {found}")]
    #[diagnostic(code(stratum::diffusion::length_mismatch))]
    LengthMismatch {
        /// The number of samples in the concentration profile
        expected: usize,
        /// The number of samples supplied
        found: usize,
    },
    #[error(transparent)]
    /// The concentration profile could not be updated
    Mesh(#[from] stratum_mesher::MeshError),
}
