//! # Solve
//! Factorisation and solution of the assembled Poisson problem
use crate::{
    operator::{Closure, OperatorAssemblerBuilder},
    source::SourceAssemblerBuilder,
    BoundaryCondition, PoissonError, PostProcess,
};
use nalgebra::{DVector, RealField};
use nalgebra_sparse::{factorization::CscCholesky, CsrMatrix};
use stratum_mesher::{Mesh1d, Profile};

/// Solves the Poisson equation for a fixed permittivity profile
pub struct PoissonSolver<'a, T: RealField> {
    permittivity: &'a Profile<T>,
}

/// The potential found by [`PoissonSolver::solve`]
#[derive(Clone, Debug)]
pub struct PoissonSolution<T: RealField> {
    /// The electrostatic potential in volts
    pub potential: Profile<T>,
    /// The potential difference imposed on top of the charge driven solution, if any. For a
    /// Dirichlet problem this is the full drop, for a mixed problem only the linear top up.
    pub applied_drop: Option<T>,
}

impl<'a, T> PoissonSolver<'a, T>
where
    T: Copy + RealField,
{
    /// A solver for a structure with the given permittivity
    pub fn new(permittivity: &'a Profile<T>) -> Self {
        Self { permittivity }
    }

    fn mesh(&self) -> &Mesh1d<T> {
        self.permittivity.mesh()
    }

    /// Find the potential generated by `charge_density` under `boundary`
    #[tracing::instrument(name = "Poisson", level = "info", skip_all, fields(boundary = boundary.name()))]
    pub fn solve(
        &self,
        charge_density: &Profile<T>,
        boundary: &BoundaryCondition<T>,
    ) -> Result<PoissonSolution<T>, PoissonError> {
        if charge_density.len() != self.permittivity.len() {
            return Err(PoissonError::LengthMismatch {
                permittivity: self.permittivity.len(),
                charge: charge_density.len(),
            });
        }
        let charge = charge_density.values();

        let (potential, applied_drop) = match *boundary {
            BoundaryCondition::ZeroField => (self.solve_zero_field(charge)?, None),
            BoundaryCondition::Dirichlet { voltage_drop } => {
                (self.solve_dirichlet(charge, voltage_drop)?, Some(voltage_drop))
            }
            BoundaryCondition::Mixed { voltage_drop } => {
                let potential = self.solve_zero_field(charge)?;
                match voltage_drop {
                    Some(voltage_drop) => {
                        let n = potential.len();
                        let remaining = voltage_drop - (potential[n - 1] - potential[0]);
                        tracing::debug!("Topping up the zero field drop by {}V", remaining);
                        (potential + self.laplace(remaining)?, Some(remaining))
                    }
                    None => (potential, None),
                }
            }
        };

        tracing::info!(
            "Potential spans {} to {}",
            potential.min(),
            potential.max()
        );

        Ok(PoissonSolution {
            potential: Profile::new(self.mesh().clone(), potential)?,
            applied_drop,
        })
    }

    fn assemble_operator(&self, closure: Closure) -> Result<CsrMatrix<T>, PoissonError> {
        OperatorAssemblerBuilder::new()
            .with_mesh(self.mesh())
            .with_permittivity(self.permittivity.values())
            .build()
            .assemble_matrix(closure)
    }

    fn factorise_and_solve(
        &self,
        operator: CsrMatrix<T>,
        source: &DVector<T>,
    ) -> Result<DVector<T>, PoissonError> {
        let operator = operator.transpose().transpose_as_csc();
        let factorisation =
            CscCholesky::factor(&operator).map_err(|_| PoissonError::Factorisation)?;
        Ok(factorisation.solve(source).column(0).into_owned())
    }

    fn solve_zero_field(&self, charge_density: &DVector<T>) -> Result<DVector<T>, PoissonError> {
        let source = SourceAssemblerBuilder::new()
            .with_mesh(self.mesh())
            .with_permittivity(self.permittivity.values())
            .with_charge_density(charge_density)
            .build()
            .assemble_neumann();
        self.factorise_and_solve(self.assemble_operator(Closure::Neumann)?, &source)
    }

    fn solve_dirichlet(
        &self,
        charge_density: &DVector<T>,
        voltage_drop: T,
    ) -> Result<DVector<T>, PoissonError> {
        let source = SourceAssemblerBuilder::new()
            .with_mesh(self.mesh())
            .with_permittivity(self.permittivity.values())
            .with_charge_density(charge_density)
            .build()
            .assemble_dirichlet(voltage_drop);
        self.factorise_and_solve(self.assemble_operator(Closure::Dirichlet)?, &source)
    }

    /// The charge free potential running from zero at the first sample to `voltage_drop` at
    /// the last
    pub fn solve_laplace(&self, voltage_drop: T) -> Result<Profile<T>, PoissonError> {
        Ok(Profile::new(self.mesh().clone(), self.laplace(voltage_drop)?)?)
    }

    fn laplace(&self, voltage_drop: T) -> Result<DVector<T>, PoissonError> {
        let uncharged = DVector::zeros(self.permittivity.len());
        self.solve_dirichlet(&uncharged, voltage_drop)
    }
}

impl<T> PoissonSolution<T>
where
    T: Copy + RealField,
{
    /// Apply the adjustments in `steps`, in order
    pub fn post_process(mut self, steps: &PostProcess<T>) -> Self {
        let two = T::one() + T::one();
        let origin = self.potential.mesh().index_nearest(T::zero());
        let values = self.potential.values_mut();

        if steps.centred {
            if let Some(drop) = self.applied_drop {
                values.iter_mut().for_each(|value| *value -= drop / two);
            }
        }
        if steps.invert {
            values.iter_mut().for_each(|value| *value = -*value);
        }
        if let Some(offset) = steps.offset {
            let shift = offset - values[origin];
            values.iter_mut().for_each(|value| *value += shift);
        }
        self
    }
}

#[cfg(test)]
mod test {
    use super::PoissonSolver;
    use crate::{extract_field, BoundaryCondition, PoissonError, PostProcess, PotentialConvention};
    use approx::assert_relative_eq;
    use proptest::prelude::*;
    use rand::Rng;
    use stratum_mesher::{create_line_segment_mesh_1d, Profile};

    const EPSILON_0: f64 = 8.854_187_812_8e-12;

    fn uniform_permittivity(num_points: usize) -> Profile<f64> {
        let mesh = create_line_segment_mesh_1d(1e-9, num_points, 0.).unwrap();
        Profile::from_element(mesh, 12.9 * EPSILON_0)
    }

    #[test]
    fn uncharged_zero_field_potential_is_flat() {
        let permittivity = uniform_permittivity(64);
        let charge = Profile::from_element(permittivity.mesh().clone(), 0.);
        let solution = PoissonSolver::new(&permittivity)
            .solve(&charge, &BoundaryCondition::ZeroField)
            .unwrap();
        assert!(solution.applied_drop.is_none());
        for value in solution.potential.values().iter() {
            assert_relative_eq!(*value, 0., epsilon = 1e-12);
        }
    }

    #[test]
    fn uncharged_dirichlet_potential_is_linear() {
        let permittivity = uniform_permittivity(101);
        let charge = Profile::from_element(permittivity.mesh().clone(), 0.);
        let solution = PoissonSolver::new(&permittivity)
            .solve(&charge, &BoundaryCondition::Dirichlet { voltage_drop: 0.1 })
            .unwrap();
        let values = solution.potential.values();
        assert_relative_eq!(values[0], 0., epsilon = 1e-12);
        assert_relative_eq!(values[100], 0.1, max_relative = 1e-9);
        assert_relative_eq!(values[50], 0.05, max_relative = 1e-9);

        let field = extract_field(&solution.potential, PotentialConvention::Absolute);
        for value in field.values().iter().skip(1).take(99) {
            assert_relative_eq!(*value, -0.1 / 100e-9, max_relative = 1e-6);
        }
    }

    #[test]
    fn dirichlet_drop_is_independent_of_the_permittivity() {
        let mut rng = rand::thread_rng();
        let mesh = create_line_segment_mesh_1d(1e-9, 40, 0.).unwrap();
        let permittivity =
            Profile::from_fn(mesh.clone(), |_| EPSILON_0 * (10. + 5. * rng.gen::<f64>()));
        let charge = Profile::from_fn(mesh, |_| 1e6 * (rng.gen::<f64>() - 0.5));
        let solution = PoissonSolver::new(&permittivity)
            .solve(&charge, &BoundaryCondition::Dirichlet { voltage_drop: -0.3 })
            .unwrap();
        let values = solution.potential.values();
        assert_relative_eq!(values[39] - values[0], -0.3, max_relative = 1e-9);
    }

    #[test]
    fn point_charge_gives_symmetric_potential() {
        let permittivity = uniform_permittivity(101);
        let charge = Profile::from_fn(permittivity.mesh().clone(), |z| {
            if (z - 50e-9).abs() < 1e-12 {
                1e7
            } else {
                0.
            }
        });
        let solution = PoissonSolver::new(&permittivity)
            .solve(&charge, &BoundaryCondition::ZeroField)
            .unwrap();
        let values = solution.potential.values();
        for i in 0..50 {
            assert_relative_eq!(values[i], values[100 - i], epsilon = 1e-10);
        }
        // A positive charge is a maximum of the potential
        assert!(values[50] > values[0]);
    }

    #[test]
    fn laplace_solution_is_piecewise_linear_in_layered_permittivity() {
        // Two layers, the second twice as polarisable: the displacement is continuous so the
        // field in the second layer is half that in the first
        let mesh = create_line_segment_mesh_1d(1e-9, 41, 0.).unwrap();
        let permittivity = Profile::from_fn(mesh, |z| {
            if z < 19.5e-9 {
                EPSILON_0
            } else {
                2. * EPSILON_0
            }
        });
        let potential = PoissonSolver::new(&permittivity).solve_laplace(0.3).unwrap();
        let field = extract_field(&potential, PotentialConvention::Absolute);
        let values = potential.values();
        assert_relative_eq!(values[0], 0., epsilon = 1e-12);
        assert_relative_eq!(values[40], 0.3, max_relative = 1e-9);
        assert_relative_eq!(field.values()[5], 2. * field.values()[35], max_relative = 1e-6);
    }

    #[test]
    fn mixed_without_a_drop_matches_zero_field() {
        let mut rng = rand::thread_rng();
        let permittivity = uniform_permittivity(30);
        let charge = Profile::from_fn(permittivity.mesh().clone(), |_| rng.gen::<f64>());
        let solver = PoissonSolver::new(&permittivity);
        let zero_field = solver.solve(&charge, &BoundaryCondition::ZeroField).unwrap();
        let mixed = solver
            .solve(&charge, &BoundaryCondition::Mixed { voltage_drop: None })
            .unwrap();
        assert_relative_eq!(zero_field.potential.values(), mixed.potential.values());
        assert!(mixed.applied_drop.is_none());
    }

    #[test]
    fn mixed_with_a_drop_reaches_the_requested_drop() {
        let permittivity = uniform_permittivity(81);
        let charge = Profile::from_fn(permittivity.mesh().clone(), |z| {
            1e6 * (-((z - 20e-9) / 5e-9).powi(2)).exp()
        });
        let solution = PoissonSolver::new(&permittivity)
            .solve(&charge, &BoundaryCondition::Mixed { voltage_drop: Some(0.2) })
            .unwrap();
        let values = solution.potential.values();
        assert_relative_eq!(values[80] - values[0], 0.2, max_relative = 1e-9);
        assert!(solution.applied_drop.is_some());
    }

    #[test]
    fn mixed_centring_subtracts_half_the_top_up() {
        let permittivity = uniform_permittivity(81);
        let charge = Profile::from_fn(permittivity.mesh().clone(), |z| {
            1e6 * (-((z - 20e-9) / 5e-9).powi(2)).exp()
        });
        let solver = PoissonSolver::new(&permittivity);
        let zero_field = solver.solve(&charge, &BoundaryCondition::ZeroField).unwrap();
        let intrinsic = zero_field.potential.values()[80] - zero_field.potential.values()[0];
        let remaining = 0.2 - intrinsic;

        let solution = solver
            .solve(&charge, &BoundaryCondition::Mixed { voltage_drop: Some(0.2) })
            .unwrap();
        assert_relative_eq!(solution.applied_drop.unwrap(), remaining, max_relative = 1e-9);

        let centred = solution.clone().post_process(&PostProcess {
            centred: true,
            invert: false,
            offset: None,
        });
        for (raw, shifted) in solution
            .potential
            .values()
            .iter()
            .zip(centred.potential.values().iter())
        {
            assert_relative_eq!(*shifted, *raw - remaining / 2., epsilon = 1e-12);
        }
    }

    #[test]
    fn misaligned_charge_is_rejected() {
        let permittivity = uniform_permittivity(10);
        let charge = Profile::from_element(create_line_segment_mesh_1d(1e-9, 9, 0.).unwrap(), 0.);
        let result =
            PoissonSolver::new(&permittivity).solve(&charge, &BoundaryCondition::ZeroField);
        assert!(matches!(
            result,
            Err(PoissonError::LengthMismatch {
                permittivity: 10,
                charge: 9
            })
        ));
    }

    #[test]
    fn non_positive_permittivity_fails_to_factorise() {
        let mesh = create_line_segment_mesh_1d(1e-9, 10, 0.).unwrap();
        let permittivity = Profile::from_element(mesh, -1.);
        let charge = Profile::from_element(permittivity.mesh().clone(), 0.);
        let result = PoissonSolver::new(&permittivity)
            .solve(&charge, &BoundaryCondition::Dirichlet { voltage_drop: 1. });
        assert!(matches!(result, Err(PoissonError::Factorisation)));
    }

    #[test]
    fn post_processing_centres_inverts_then_offsets() {
        let permittivity = uniform_permittivity(11);
        let charge = Profile::from_element(permittivity.mesh().clone(), 0.);
        let solution = PoissonSolver::new(&permittivity)
            .solve(&charge, &BoundaryCondition::Dirichlet { voltage_drop: 1. })
            .unwrap();

        let centred = solution.clone().post_process(&PostProcess {
            centred: true,
            invert: true,
            offset: None,
        });
        assert_relative_eq!(centred.potential.values()[0], 0.5, epsilon = 1e-12);
        assert_relative_eq!(centred.potential.values()[10], -0.5, epsilon = 1e-12);

        let offset = solution.post_process(&PostProcess {
            centred: true,
            invert: true,
            offset: Some(0.1),
        });
        assert_relative_eq!(offset.potential.values()[0], 0.1, epsilon = 1e-12);
        assert_relative_eq!(offset.potential.values()[10], -0.9, epsilon = 1e-12);
    }

    #[test]
    fn centring_is_skipped_without_an_applied_drop() {
        let permittivity = uniform_permittivity(11);
        let charge = Profile::from_element(permittivity.mesh().clone(), 0.);
        let solution = PoissonSolver::new(&permittivity)
            .solve(&charge, &BoundaryCondition::ZeroField)
            .unwrap()
            .post_process(&PostProcess {
                centred: true,
                invert: false,
                offset: None,
            });
        assert!(solution.potential.values().iter().all(|v| v.abs() < 1e-12));
    }

    proptest! {
        #[test]
        fn dirichlet_endpoints_are_pinned(drop in -2f64..2f64, num_points in 3usize..60) {
            let permittivity = uniform_permittivity(num_points);
            let charge = Profile::from_element(permittivity.mesh().clone(), 1e5);
            let solution = PoissonSolver::new(&permittivity)
                .solve(&charge, &BoundaryCondition::Dirichlet { voltage_drop: drop })
                .unwrap();
            let values = solution.potential.values();
            prop_assert!(values[0].abs() < 1e-12);
            prop_assert!((values[num_points - 1] - drop).abs() < 1e-9);
        }
    }
}
