//! Diffusion coefficient policies
//!
//! The coefficient entering each explicit step can be fixed for the whole run or recomputed
//! from the state of the system before every step. The policy is chosen once, before the time
//! loop starts, and each variant carries exactly the parameters it needs.

use crate::DiffusionError;
use nalgebra::{DVector, RealField};
use stratum_mesher::Profile;

/// A per-vertex update rule for a diffusion coefficient evolving in time
///
/// Implementors receive the vertex position, the coefficient at that vertex from the previous
/// step, the local concentration and the elapsed time, and return the new coefficient. This is
/// the extension point for physical models of time-dependent diffusion, closures of the same
/// shape implement it directly.
pub trait CoefficientUpdate<T> {
    /// Compute the coefficient for the step ending at `time`
    fn update(&self, position: T, current: T, concentration: T, time: T) -> T;
}

impl<T, F> CoefficientUpdate<T> for F
where
    F: Fn(T, T, T, T) -> T,
{
    fn update(&self, position: T, current: T, concentration: T, time: T) -> T {
        self(position, current, concentration, time)
    }
}

/// Exponential relaxation of the coefficient towards an equilibrium value
///
/// Models the decay of an enhanced diffusivity during an anneal: on every step of length
/// `time_step` the excess over `equilibrium` shrinks by `exp(-time_step / time_constant)`.
#[derive(Clone, Copy, Debug)]
pub struct Relaxation<T> {
    equilibrium: T,
    decay: T,
}

impl<T: Copy + RealField> Relaxation<T> {
    /// Relaxation towards `equilibrium` with time constant `time_constant`, advanced in
    /// increments of `time_step`
    pub fn new(equilibrium: T, time_constant: T, time_step: T) -> Self {
        Self {
            equilibrium,
            decay: (-time_step / time_constant).exp(),
        }
    }
}

impl<T: Copy + RealField> CoefficientUpdate<T> for Relaxation<T> {
    fn update(&self, _position: T, current: T, _concentration: T, _time: T) -> T {
        self.equilibrium + (current - self.equilibrium) * self.decay
    }
}

/// How the diffusion coefficient is obtained for each step
pub enum CoefficientPolicy<T: RealField> {
    /// The same coefficient at every vertex and every step
    Constant(T),
    /// A coefficient profile supplied once and held fixed
    External(DVector<T>),
    /// `D = factor * n^2`, recomputed from the concentration before every step
    ConcentrationDependent {
        /// The proportionality constant
        factor: T,
    },
    /// A static Gaussian distribution in depth, `D = magnitude * exp(-((z - centre) / width)^2 / 2)`
    DepthDependent {
        /// Peak value of the distribution
        magnitude: T,
        /// Position of the peak
        centre: T,
        /// Standard deviation of the distribution
        width: T,
    },
    /// Starts from `initial` and passes every vertex through `update` before each step
    TimeEvolving {
        /// The coefficient profile at `t = 0`
        initial: DVector<T>,
        /// The per-vertex evolution rule
        update: Box<dyn CoefficientUpdate<T>>,
    },
}

impl<T> CoefficientPolicy<T>
where
    T: Copy + RealField,
{
    /// A short name for the policy, used in logs
    pub fn name(&self) -> &'static str {
        match self {
            CoefficientPolicy::Constant(_) => "constant",
            CoefficientPolicy::External(_) => "external",
            CoefficientPolicy::ConcentrationDependent { .. } => "concentration-dependent",
            CoefficientPolicy::DepthDependent { .. } => "depth-dependent",
            CoefficientPolicy::TimeEvolving { .. } => "time-evolving",
        }
    }

    /// The coefficient profile at the start of the run
    pub fn initialise(&self, concentration: &Profile<T>) -> Result<DVector<T>, DiffusionError<T>> {
        let nz = concentration.len();
        let coefficient = match self {
            CoefficientPolicy::Constant(value) => DVector::from_element(nz, *value),
            CoefficientPolicy::External(values)
            | CoefficientPolicy::TimeEvolving {
                initial: values, ..
            } => {
                if values.len() != nz {
                    return Err(DiffusionError::LengthMismatch {
                        expected: nz,
                        found: values.len(),
                    });
                }
                values.clone()
            }
            CoefficientPolicy::ConcentrationDependent { factor } => {
                concentration.values().map(|n| *factor * n.powi(2))
            }
            CoefficientPolicy::DepthDependent {
                magnitude,
                centre,
                width,
            } => {
                let two = T::one() + T::one();
                DVector::from_iterator(
                    nz,
                    concentration.mesh().vertices().iter().map(|vertex| {
                        *magnitude * (-((vertex.x - *centre) / *width).powi(2) / two).exp()
                    }),
                )
            }
        };
        Ok(coefficient)
    }

    /// Bring `coefficient` up to date for the step ending at `time`
    ///
    /// Policies fixed for the whole run leave the array alone.
    pub fn refresh(&self, coefficient: &mut DVector<T>, concentration: &Profile<T>, time: T) {
        match self {
            CoefficientPolicy::Constant(_)
            | CoefficientPolicy::External(_)
            | CoefficientPolicy::DepthDependent { .. } => {}
            CoefficientPolicy::ConcentrationDependent { factor } => {
                for (d, n) in coefficient.iter_mut().zip(concentration.values().iter()) {
                    *d = *factor * n.powi(2);
                }
            }
            CoefficientPolicy::TimeEvolving { update, .. } => {
                for ((d, n), vertex) in coefficient
                    .iter_mut()
                    .zip(concentration.values().iter())
                    .zip(concentration.mesh().vertices().iter())
                {
                    *d = update.update(vertex.x, *d, *n, time);
                }
            }
        }
    }
}
