//! # Calculations
//!
//! Delegated functions from `App` to run the diffusion and Poisson calculations. Each reads its
//! input tables, converts the configured quantities to SI units, runs the solver and writes the
//! output tables, returning the paths written.

use super::configuration::{
    BoundaryMode, DiffusionConfiguration, DiffusionMode, PoissonConfiguration,
};
use crate::{
    constants::{ANGSTROM, ELECTRON_CHARGE, KILOVOLT_PER_CENTIMETRE, MILLI, SQUARE_ANGSTROM},
    table::{read_profile, write_profile},
    TableError,
};
use color_eyre::eyre::WrapErr;
use nalgebra::{DVector, RealField};
use std::{
    fmt::LowerExp,
    path::{Path, PathBuf},
};
use stratum_diffusion::{CoefficientPolicy, DiffusionSimulationBuilder, Relaxation, TimeLoop};
use stratum_mesher::{Mesh1d, Profile};
use stratum_poisson::{
    extract_field, voltage_drop_from_field, BoundaryCondition, PoissonSolver, PostProcess,
    PotentialConvention,
};

/// Anneal the initial concentration profile and write the final profile
pub fn run_diffusion<T>(
    config: &DiffusionConfiguration<T>,
    output_directory: &Path,
) -> color_eyre::Result<Vec<PathBuf>>
where
    T: Copy + RealField + LowerExp,
{
    let initial: Profile<T> = read_profile(&config.files.initial).wrap_err_with(|| {
        format!(
            "failed to read the initial concentration from {}",
            config.files.initial.display()
        )
    })?;
    let policy = coefficient_policy(config, &initial)?;
    let time_loop = TimeLoop {
        time_step: config.time_step,
        end_time: config.end_time,
    };

    let initial_dose = initial.integrate();
    let state = DiffusionSimulationBuilder::new()
        .with_policy(&policy)
        .with_time_loop(&time_loop)
        .build()
        .run(initial)
        .wrap_err("the diffusion calculation failed")?;
    tracing::info!(
        "Annealed for {} s in {} steps, dose {} -> {}",
        state.time,
        state.steps,
        initial_dose,
        state.concentration.integrate()
    );

    let output = output_directory.join(&config.files.output);
    write_profile(&output, &state.concentration)
        .wrap_err_with(|| format!("failed to write {}", output.display()))?;
    Ok(vec![output])
}

fn coefficient_policy<T>(
    config: &DiffusionConfiguration<T>,
    concentration: &Profile<T>,
) -> color_eyre::Result<CoefficientPolicy<T>>
where
    T: Copy + RealField,
{
    let square_angstrom: T = nalgebra::convert(SQUARE_ANGSTROM);
    let angstrom: T = nalgebra::convert(ANGSTROM);

    let policy = match config.mode {
        DiffusionMode::Constant => {
            CoefficientPolicy::Constant(config.coefficient * square_angstrom)
        }
        DiffusionMode::File => CoefficientPolicy::External(read_coefficient(
            &config.files.coefficient,
            concentration,
        )?),
        DiffusionMode::ConcentrationDependent => CoefficientPolicy::ConcentrationDependent {
            factor: config.concentration_factor * square_angstrom,
        },
        DiffusionMode::DepthDependent => CoefficientPolicy::DepthDependent {
            magnitude: config.distribution.magnitude * square_angstrom,
            centre: config.distribution.centre * angstrom,
            width: config.distribution.width * angstrom,
        },
        DiffusionMode::Time => CoefficientPolicy::TimeEvolving {
            initial: read_coefficient(&config.files.coefficient, concentration)?,
            update: Box::new(Relaxation::new(
                config.relaxation.equilibrium * square_angstrom,
                config.relaxation.time_constant,
                config.time_step,
            )),
        },
    };
    Ok(policy)
}

fn read_coefficient<T>(path: &Path, concentration: &Profile<T>) -> color_eyre::Result<DVector<T>>
where
    T: Copy + RealField,
{
    let coefficient: Profile<T> = read_profile(path).wrap_err_with(|| {
        format!(
            "failed to read the diffusion coefficient from {}",
            path.display()
        )
    })?;
    if !coefficient.mesh().is_aligned_with(concentration.mesh()) {
        tracing::warn!(
            "{} does not sample the same positions as the concentration",
            path.display()
        );
    }
    Ok(coefficient.into_parts().1)
}

/// Solve for the potential and field of the configured structure and write them out
pub fn run_poisson<T>(
    config: &PoissonConfiguration<T>,
    output_directory: &Path,
) -> color_eyre::Result<Vec<PathBuf>>
where
    T: Copy + RealField + LowerExp,
{
    let electron_charge: T = nalgebra::convert(ELECTRON_CHARGE);

    let permittivity: Profile<T> = read_profile(&config.files.permittivity).wrap_err_with(|| {
        format!(
            "failed to read the permittivity from {}",
            config.files.permittivity.display()
        )
    })?;
    let charge_density = charge_density(config, &permittivity)?;
    let boundary = boundary_condition(config, permittivity.mesh());

    let steps = PostProcess {
        centred: config.centred,
        invert: config.invert,
        offset: config
            .offset
            .map(|offset| offset * nalgebra::convert::<f64, T>(MILLI)),
    };
    let solution = PoissonSolver::new(&permittivity)
        .solve(&charge_density, &boundary)
        .wrap_err("the Poisson calculation failed")?
        .post_process(&steps);

    let convention = if config.invert {
        PotentialConvention::CarrierEnergy
    } else {
        PotentialConvention::Absolute
    };
    let field = extract_field(&solution.potential, convention);

    let mut energy = solution.potential;
    energy
        .values_mut()
        .iter_mut()
        .for_each(|value| *value *= electron_charge);

    let total = match &config.files.band_edge_potential {
        Some(path) => {
            let baseline: Profile<T> = read_profile(path).wrap_err_with(|| {
                format!("failed to read the band edge from {}", path.display())
            })?;
            add_baseline(&energy, &baseline)?
        }
        None => energy.clone(),
    };

    let mut written = Vec::with_capacity(3);
    for (name, profile) in [
        (&config.files.poisson_potential, &energy),
        (&config.files.field, &field),
        (&config.files.total_potential, &total),
    ] {
        let output = output_directory.join(name);
        write_profile(&output, profile)
            .wrap_err_with(|| format!("failed to write {}", output.display()))?;
        written.push(output);
    }
    Ok(written)
}

/// The charge density in C / m^3, from a carrier number density table
fn charge_density<T>(
    config: &PoissonConfiguration<T>,
    permittivity: &Profile<T>,
) -> color_eyre::Result<Profile<T>>
where
    T: Copy + RealField,
{
    if config.uncharged {
        return Ok(Profile::from_element(permittivity.mesh().clone(), T::zero()));
    }

    let mut charge: Profile<T> = read_profile(&config.files.charge).wrap_err_with(|| {
        format!(
            "failed to read the charge density from {}",
            config.files.charge.display()
        )
    })?;
    if !charge.mesh().is_aligned_with(permittivity.mesh()) {
        tracing::warn!(
            "{} does not sample the same positions as the permittivity",
            config.files.charge.display()
        );
    }

    let electron_charge: T = nalgebra::convert(ELECTRON_CHARGE);
    let carrier_charge = if config.ptype {
        -electron_charge
    } else {
        electron_charge
    };
    charge
        .values_mut()
        .iter_mut()
        .for_each(|density| *density *= carrier_charge);
    Ok(charge)
}

/// The boundary regime for the configured mode
///
/// A known field fixes the potential at both ends unless the mixed mode is selected, and
/// pinned ends without a field fall back to zero field boundaries.
fn boundary_condition<T>(config: &PoissonConfiguration<T>, mesh: &Mesh1d<T>) -> BoundaryCondition<T>
where
    T: Copy + RealField,
{
    let kilovolt_per_centimetre: T = nalgebra::convert(KILOVOLT_PER_CENTIMETRE);
    let voltage_drop = config
        .field
        .map(|field| voltage_drop_from_field(field * kilovolt_per_centimetre, mesh));

    match (config.boundary, voltage_drop) {
        (BoundaryMode::ZeroField | BoundaryMode::Dirichlet, Some(voltage_drop)) => {
            tracing::info!("Applying a {}V drop across the structure", voltage_drop);
            BoundaryCondition::Dirichlet { voltage_drop }
        }
        (BoundaryMode::ZeroField, None) => BoundaryCondition::ZeroField,
        (BoundaryMode::Dirichlet, None) => {
            tracing::info!("No applied field, solving with zero field boundaries");
            BoundaryCondition::ZeroField
        }
        (BoundaryMode::Mixed, voltage_drop) => BoundaryCondition::Mixed { voltage_drop },
    }
}

fn add_baseline<T>(profile: &Profile<T>, baseline: &Profile<T>) -> Result<Profile<T>, TableError>
where
    T: Copy + RealField,
{
    if baseline.len() != profile.len() {
        return Err(TableError::BaselineMismatch {
            expected: profile.len(),
            found: baseline.len(),
        });
    }
    Ok(Profile::new(
        profile.mesh().clone(),
        profile.values() + baseline.values(),
    )?)
}
