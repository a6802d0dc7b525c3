//! Explicit finite difference solution of the generalised diffusion equation
//!
//! The concentration `n(z, t)` of a diffusant in a layered structure obeys
//!
//! $ \partial n / \partial t = \partial / \partial z \left( D \partial n / \partial z \right) $
//!
//! for a diffusion coefficient `D(z, t, n)` which may vary with position, time and the local
//! concentration. This crate advances a sampled concentration profile through time with an
//! explicit centred-difference scheme:
//!
//! - [`step`] carries out a single explicit update, refusing time steps beyond the stability
//!   bound of the scheme,
//! - [`CoefficientPolicy`] supplies the diffusion coefficient for each step,
//! - [`DiffusionSimulation`] strings the two together in a sequential time loop.
#![warn(missing_docs)]

mod coefficient;
mod error;
mod simulation;
mod stepper;

pub use coefficient::{CoefficientPolicy, CoefficientUpdate, Relaxation};
pub use error::DiffusionError;
pub use simulation::{DiffusionSimulation, DiffusionSimulationBuilder, DiffusionState, TimeLoop};
pub use stepper::{stability_bound, step};
