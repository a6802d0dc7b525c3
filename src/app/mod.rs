//! This module governs the high-level implementation of the application
//!
//! The command line is parsed with `clap`, the configuration is resolved and overridden by any
//! flags passed, telemetry is initialised and control is handed to one of the calculations.
mod calculations;
mod configuration;
mod telemetry;

pub use calculations::{run_diffusion, run_poisson};
pub use configuration::{
    BoundaryMode, Configuration, DiffusionConfiguration, DiffusionFiles, DiffusionMode,
    DistributionConfiguration, PoissonConfiguration, PoissonFiles, RelaxationConfiguration,
};

use clap::{ArgEnum, Args, Parser, Subcommand};
use color_eyre::eyre::WrapErr;
use nalgebra::RealField;
use serde::de::DeserializeOwned;
use std::{fmt::LowerExp, path::PathBuf};

#[derive(Parser)]
#[clap(author, version, about, long_about = None)]
struct App {
    /// The verbosity of the console and file logs, overridden by `RUST_LOG`
    #[clap(arg_enum, short, long, default_value = "info")]
    log_level: LogLevel,
    /// A configuration file, taking priority over the `.config` directory
    #[clap(short, long)]
    config: Option<PathBuf>,
    #[clap(subcommand)]
    calculation: Calculation,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, ArgEnum)]
enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

impl std::fmt::Display for LogLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let level = match self {
            LogLevel::Trace => "trace",
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warn => "warn",
            LogLevel::Error => "error",
        };
        write!(f, "{}", level)
    }
}

#[derive(Subcommand)]
enum Calculation {
    /// Anneal a dopant profile
    Diffuse(DiffuseArgs),
    /// Solve for the electrostatic potential and field
    Poisson(PoissonArgs),
}

#[derive(Args)]
struct DiffuseArgs {
    /// The time step in seconds
    #[clap(long)]
    dt: Option<f64>,
    /// The duration of the anneal in seconds
    #[clap(long)]
    time: Option<f64>,
    /// The diffusion coefficient in square Angstrom per second, for the constant mode
    #[clap(long)]
    coeff: Option<f64>,
    /// Where the diffusion coefficient comes from
    #[clap(arg_enum, long)]
    mode: Option<DiffusionMode>,
}

#[derive(Args)]
struct PoissonArgs {
    /// The electrostatic boundary conditions
    #[clap(arg_enum, long)]
    boundary: Option<BoundaryMode>,
    /// The applied field in kV/cm
    #[clap(long, allow_hyphen_values = true)]
    field: Option<f64>,
    /// The potential at the origin in meV
    #[clap(long, allow_hyphen_values = true)]
    offset: Option<f64>,
    /// Ignore the charge table
    #[clap(long)]
    uncharged: bool,
    /// Centre the potential about the midpoint of the applied drop
    #[clap(long)]
    centred: bool,
    /// The charge table holds acceptors
    #[clap(long)]
    ptype: bool,
}

impl DiffuseArgs {
    fn apply<T: Copy + RealField>(&self, config: &mut DiffusionConfiguration<T>) {
        if let Some(dt) = self.dt {
            config.time_step = nalgebra::convert(dt);
        }
        if let Some(time) = self.time {
            config.end_time = nalgebra::convert(time);
        }
        if let Some(coeff) = self.coeff {
            config.coefficient = nalgebra::convert(coeff);
        }
        if let Some(mode) = self.mode {
            config.mode = mode;
        }
    }
}

impl PoissonArgs {
    fn apply<T: Copy + RealField>(&self, config: &mut PoissonConfiguration<T>) {
        if let Some(boundary) = self.boundary {
            config.boundary = boundary;
        }
        if let Some(field) = self.field {
            config.field = Some(nalgebra::convert(field));
        }
        if let Some(offset) = self.offset {
            config.offset = Some(nalgebra::convert(offset));
        }
        // Flags can only switch these on
        config.uncharged |= self.uncharged;
        config.centred |= self.centred;
        config.ptype |= self.ptype;
    }
}

/// Parse the command line, resolve the configuration and run the requested calculation
pub fn run<T>() -> color_eyre::Result<()>
where
    T: Copy + DeserializeOwned + RealField + LowerExp,
{
    let cli = App::parse();

    let mut config: Configuration<T> = Configuration::build(cli.config.as_deref())?;
    match &cli.calculation {
        Calculation::Diffuse(args) => args.apply(&mut config.diffusion),
        Calculation::Poisson(args) => args.apply(&mut config.poisson),
    }

    std::fs::create_dir_all(&config.output_directory).wrap_err_with(|| {
        format!(
            "failed to create the output directory {}",
            config.output_directory.display()
        )
    })?;

    let (subscriber, _guard) = telemetry::get_subscriber(cli.log_level, &config.output_directory);
    telemetry::init_subscriber(subscriber)?;

    let term = console::Term::stdout();
    let written = match cli.calculation {
        Calculation::Diffuse(_) => run_diffusion(&config.diffusion, &config.output_directory)?,
        Calculation::Poisson(_) => run_poisson(&config.poisson, &config.output_directory)?,
    };
    for path in written {
        term.write_line(&format!("wrote {}", path.display()))?;
    }

    Ok(())
}
