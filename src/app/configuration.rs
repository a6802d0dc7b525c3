//! # Configuration
//! The layered settings for a run
//!
//! Settings are resolved from, in increasing priority: the built-in defaults,
//! `.config/default.toml`, `.config/{RUN_MODE}.toml`, a file passed on the command line, and
//! finally the command line flags themselves.
use clap::ArgEnum;
use color_eyre::eyre::eyre;
use config::{Config, File};
use nalgebra::RealField;
use serde::{de::DeserializeOwned, Deserialize};
use std::{
    env,
    path::{Path, PathBuf},
};

#[derive(Debug, Deserialize)]
#[serde(default, bound(deserialize = "T: Copy + RealField + Deserialize<'de>"))]
/// All the settings for a run
pub struct Configuration<T> {
    /// The directory output tables and the log file are written to
    pub output_directory: PathBuf,
    /// Settings for the `diffuse` calculation
    pub diffusion: DiffusionConfiguration<T>,
    /// Settings for the `poisson` calculation
    pub poisson: PoissonConfiguration<T>,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ArgEnum, Deserialize)]
#[serde(rename_all = "kebab-case")]
/// How the diffusion coefficient is obtained
pub enum DiffusionMode {
    /// A single value everywhere
    Constant,
    /// Read from the coefficient table
    File,
    /// Proportional to the square of the local concentration
    ConcentrationDependent,
    /// A Gaussian distribution in depth
    DepthDependent,
    /// Read from the coefficient table and relaxed towards equilibrium as the anneal proceeds
    Time,
}

#[derive(Debug, Deserialize)]
#[serde(default, bound(deserialize = "T: Copy + RealField + Deserialize<'de>"))]
/// Settings for the `diffuse` calculation. Coefficients are in square Angstrom per second and
/// lengths in Angstrom
pub struct DiffusionConfiguration<T> {
    /// The time step in seconds
    pub time_step: T,
    /// The duration of the anneal in seconds
    pub end_time: T,
    /// Where the diffusion coefficient comes from
    pub mode: DiffusionMode,
    /// The coefficient in constant mode
    pub coefficient: T,
    /// The proportionality constant in concentration dependent mode
    pub concentration_factor: T,
    /// The Gaussian in depth dependent mode
    pub distribution: DistributionConfiguration<T>,
    /// The relaxation model in time mode
    pub relaxation: RelaxationConfiguration<T>,
    /// Input and output tables
    pub files: DiffusionFiles,
}

#[derive(Debug, Deserialize)]
#[serde(default, bound(deserialize = "T: Copy + RealField + Deserialize<'de>"))]
/// A Gaussian distribution of the diffusion coefficient in depth
pub struct DistributionConfiguration<T> {
    /// The peak coefficient
    pub magnitude: T,
    /// The depth of the peak
    pub centre: T,
    /// The standard deviation
    pub width: T,
}

#[derive(Debug, Deserialize)]
#[serde(default, bound(deserialize = "T: Copy + RealField + Deserialize<'de>"))]
/// Exponential relaxation of the diffusion coefficient
pub struct RelaxationConfiguration<T> {
    /// The coefficient the profile relaxes towards
    pub equilibrium: T,
    /// The relaxation time in seconds
    pub time_constant: T,
}

#[derive(Debug, Deserialize)]
#[serde(default)]
/// Tables used by the `diffuse` calculation
pub struct DiffusionFiles {
    /// The concentration at the start of the anneal
    pub initial: PathBuf,
    /// The diffusion coefficient, for the file and time modes
    pub coefficient: PathBuf,
    /// The concentration at the end of the anneal, written to the output directory
    pub output: PathBuf,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ArgEnum, Deserialize)]
#[serde(rename_all = "kebab-case")]
/// The electrostatic boundary conditions at the ends of the structure
pub enum BoundaryMode {
    /// No field at either end, unless an applied field is given
    ZeroField,
    /// A fixed potential difference across the structure, set by the applied field
    Dirichlet,
    /// A zero field solution topped up to the drop set by the applied field
    Mixed,
}

#[derive(Debug, Deserialize)]
#[serde(default, bound(deserialize = "T: Copy + RealField + Deserialize<'de>"))]
/// Settings for the `poisson` calculation
pub struct PoissonConfiguration<T> {
    /// The boundary conditions
    pub boundary: BoundaryMode,
    /// Ignore the charge table and solve for an uncharged structure
    pub uncharged: bool,
    /// Centre the potential about the midpoint of the applied drop
    pub centred: bool,
    /// The charge table holds acceptors, which carry a negative charge
    pub ptype: bool,
    /// Report the potential as an electron energy
    pub invert: bool,
    /// The applied field in kV/cm
    pub field: Option<T>,
    /// The potential at the origin in meV
    pub offset: Option<T>,
    /// Input and output tables
    pub files: PoissonFiles,
}

#[derive(Debug, Deserialize)]
#[serde(default)]
/// Tables used by the `poisson` calculation
pub struct PoissonFiles {
    /// The static permittivity, which also defines the mesh
    pub permittivity: PathBuf,
    /// The charge carrier number density
    pub charge: PathBuf,
    /// The solved potential energy, written to the output directory
    pub poisson_potential: PathBuf,
    /// The total potential energy, written to the output directory
    pub total_potential: PathBuf,
    /// The electric field, written to the output directory
    pub field: PathBuf,
    /// A band edge profile added to the solved potential to give the total potential
    pub band_edge_potential: Option<PathBuf>,
}

impl<T: Copy + RealField> Default for Configuration<T> {
    fn default() -> Self {
        Self {
            output_directory: PathBuf::from("."),
            diffusion: DiffusionConfiguration::default(),
            poisson: PoissonConfiguration::default(),
        }
    }
}

impl<T: Copy + RealField> Default for DiffusionConfiguration<T> {
    fn default() -> Self {
        Self {
            time_step: nalgebra::convert(0.01),
            end_time: T::one(),
            mode: DiffusionMode::Constant,
            coefficient: T::one(),
            concentration_factor: T::one(),
            distribution: DistributionConfiguration::default(),
            relaxation: RelaxationConfiguration::default(),
            files: DiffusionFiles::default(),
        }
    }
}

impl<T: Copy + RealField> Default for DistributionConfiguration<T> {
    fn default() -> Self {
        Self {
            magnitude: nalgebra::convert(10.),
            centre: nalgebra::convert(1800.),
            width: nalgebra::convert(600.),
        }
    }
}

impl<T: Copy + RealField> Default for RelaxationConfiguration<T> {
    fn default() -> Self {
        Self {
            equilibrium: T::one(),
            time_constant: T::one(),
        }
    }
}

impl Default for DiffusionFiles {
    fn default() -> Self {
        Self {
            initial: PathBuf::from("x.r"),
            coefficient: PathBuf::from("D.r"),
            output: PathBuf::from("X.r"),
        }
    }
}

impl<T: Copy + RealField> Default for PoissonConfiguration<T> {
    fn default() -> Self {
        Self {
            boundary: BoundaryMode::ZeroField,
            uncharged: false,
            centred: false,
            ptype: false,
            invert: true,
            field: None,
            offset: None,
            files: PoissonFiles::default(),
        }
    }
}

impl Default for PoissonFiles {
    fn default() -> Self {
        Self {
            permittivity: PathBuf::from("eps_dc.r"),
            charge: PathBuf::from("cd.r"),
            poisson_potential: PathBuf::from("v_p.r"),
            total_potential: PathBuf::from("v.r"),
            field: PathBuf::from("field.r"),
            band_edge_potential: None,
        }
    }
}

impl<T: Copy + DeserializeOwned + RealField> Configuration<T> {
    /// Resolve the configuration files, with `file` taking priority over the `.config` directory
    pub fn build(file: Option<&Path>) -> color_eyre::Result<Self> {
        let run_mode = env::var("RUN_MODE").unwrap_or_else(|_| "development".into());

        let mut builder = Config::builder()
            // The default settings for the simulation which we use in the general case
            .add_source(File::with_name(".config/default").required(false))
            // The override settings which may be set by the user, optional
            .add_source(File::with_name(&format!(".config/{}", run_mode)).required(false));
        if let Some(file) = file {
            builder = builder.add_source(File::from(file));
        }
        let s = builder.build()?;

        s.try_deserialize()
            .map_err(|e| eyre!(format!("Failed to deserialize the config file: {:?}", e)))
    }

    /// Parse a configuration from TOML text layered over the built-in defaults
    pub fn from_toml(contents: &str) -> color_eyre::Result<Self> {
        let s = Config::builder()
            .add_source(File::from_str(contents, config::FileFormat::Toml))
            .build()?;
        s.try_deserialize()
            .map_err(|e| eyre!(format!("Failed to deserialize the config file: {:?}", e)))
    }
}

#[cfg(test)]
mod test {
    use super::{BoundaryMode, Configuration, DiffusionMode};
    use std::path::PathBuf;

    #[test]
    fn empty_configuration_takes_the_defaults() {
        let config: Configuration<f64> = Configuration::from_toml("").unwrap();
        assert_eq!(config.output_directory, PathBuf::from("."));
        assert_eq!(config.diffusion.mode, DiffusionMode::Constant);
        assert_eq!(config.diffusion.time_step, 0.01);
        assert_eq!(config.diffusion.distribution.centre, 1800.);
        assert_eq!(config.diffusion.files.output, PathBuf::from("X.r"));
        assert_eq!(config.poisson.boundary, BoundaryMode::ZeroField);
        assert!(config.poisson.invert);
        assert!(config.poisson.field.is_none());
        assert!(config.poisson.files.band_edge_potential.is_none());
    }

    #[test]
    fn nested_tables_override_single_keys() {
        let contents = r#"
            output_directory = "results"

            [diffusion]
            mode = "depth-dependent"
            end_time = 20.0

            [diffusion.distribution]
            width = 300.0

            [poisson]
            boundary = "mixed"
            field = 10.0

            [poisson.files]
            band_edge_potential = "v_b.r"
        "#;
        let config: Configuration<f64> = Configuration::from_toml(contents).unwrap();
        assert_eq!(config.output_directory, PathBuf::from("results"));
        assert_eq!(config.diffusion.mode, DiffusionMode::DepthDependent);
        assert_eq!(config.diffusion.end_time, 20.);
        assert_eq!(config.diffusion.time_step, 0.01);
        assert_eq!(config.diffusion.distribution.width, 300.);
        assert_eq!(config.diffusion.distribution.magnitude, 10.);
        assert_eq!(config.poisson.boundary, BoundaryMode::Mixed);
        assert_eq!(config.poisson.field, Some(10.));
        assert_eq!(
            config.poisson.files.band_edge_potential,
            Some(PathBuf::from("v_b.r"))
        );
        assert_eq!(config.poisson.files.charge, PathBuf::from("cd.r"));
    }

    #[test]
    fn unknown_modes_are_rejected() {
        let result = Configuration::<f64>::from_toml("[diffusion]\nmode = \"sideways\"\n");
        assert!(result.is_err());
        let result = Configuration::<f64>::from_toml("[poisson]\nboundary = \"periodic\"\n");
        assert!(result.is_err());
    }
}
