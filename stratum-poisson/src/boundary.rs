//! # Boundary
//! The electrostatic regimes at the ends of the structure
use nalgebra::RealField;
use stratum_mesher::Mesh1d;

/// How the potential is constrained at the two ends of the structure
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum BoundaryCondition<T> {
    /// The electric field vanishes at both ends. Any net charge is compensated by a uniform
    /// background so the problem has a solution, and the potential is fixed at zero at the first
    /// sample
    ZeroField,
    /// The potential is zero at the first sample and `voltage_drop` at the last
    Dirichlet {
        /// The potential difference across the structure in volts
        voltage_drop: T,
    },
    /// A zero field solution, optionally topped up by a linear potential so the total drop across
    /// the structure equals `voltage_drop`
    Mixed {
        /// The total potential difference across the structure in volts
        voltage_drop: Option<T>,
    },
}

impl<T> BoundaryCondition<T> {
    /// A short name for logging
    pub fn name(&self) -> &'static str {
        match self {
            BoundaryCondition::ZeroField => "zero-field",
            BoundaryCondition::Dirichlet { .. } => "dirichlet",
            BoundaryCondition::Mixed { .. } => "mixed",
        }
    }
}

/// The voltage dropped across the full span of `mesh` by a uniform `field`
///
/// The span is measured between the first and last samples, so a field in V/m gives a drop in V.
pub fn voltage_drop_from_field<T: Copy + RealField>(field: T, mesh: &Mesh1d<T>) -> T {
    field * mesh.span()
}
