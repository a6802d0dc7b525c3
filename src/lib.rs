// Copyright 2022 Chris Gubbin
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://apache.org/licenses/LICENSE-2.0> or the MIT license <LICENSE-MIT or
// http://opensource.org/licenses/MIT>, at your option. This file may not be
// copied, modified, or distributed except according to those terms.

//! Stratum simulates dopant redistribution and electrostatics in layered semiconductor structures
//!
//! # Overview
//! Stratum works on quantities sampled along the growth axis of a heterostructure and provides two
//! calculations:
//!
//! - `diffuse` advances a dopant concentration profile through an anneal by explicitly integrating
//!   the generalised diffusion equation, with a diffusion coefficient which may be constant, read
//!   from file, or depend on the concentration, the depth or the elapsed time,
//! - `poisson` solves the Poisson equation for the electrostatic potential generated by a charge
//!   density in a structure with a spatially varying permittivity, and derives the electric field.
//!
//! # Usage
//! Stratum is distributed as a binary crate, and is intended to be run from the command line. Inputs
//! and outputs are plain text column tables, with the position in metres in the first column. The
//! calculation is configured in a `.toml` file:
//!
//! ```toml
//! [diffusion]
//! time_step = 0.01
//! end_time = 10.0
//! mode = "depth-dependent"
//!
//! [diffusion.distribution]
//! magnitude = 10.0
//! centre = 1800.0
//! width = 600.0
//! ```
//!
//! and any setting can be overridden on the command line, for example
//! `stratum --config anneal.toml diffuse --time 20`.

#![warn(missing_docs)]

/// The command line global application, tracing and configuration
pub mod app;

/// Physical constants
pub mod constants;

/// Error handling
mod error;

/// Reading and writing sampled profiles as column tables
pub mod table;

pub use error::TableError;
