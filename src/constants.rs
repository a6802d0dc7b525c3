// Copyright 2022 Chris Gubbin
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://apache.org/licenses/LICENSE-2.0> or the MIT license <LICENSE-MIT or
// http://opensource.org/licenses/MIT>, at your option. This file may not be
// copied, modified, or distributed except according to those terms.

//! # Constants
//!
//! Defines physical constants and unit conversions used by the application. The solver crates
//! work in SI units throughout, conversions happen when the configuration is read.

/// Single electron charge in C
pub const ELECTRON_CHARGE: f64 = 1.60217662e-19;
/// Permitivitty of free space in F / m
pub const EPSILON_0: f64 = 8.85418782e-12;
/// Square Angstrom in square metres
pub const SQUARE_ANGSTROM: f64 = 1e-20;
/// Angstrom in metres
pub const ANGSTROM: f64 = 1e-10;
/// kV / cm in V / m
pub const KILOVOLT_PER_CENTIMETRE: f64 = 1e5;
/// meV in eV
pub const MILLI: f64 = 1e-3;
