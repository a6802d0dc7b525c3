//! The sequential time loop
//!
//! Each step depends on the fully committed result of the previous one, so the loop is a
//! strict chain: refresh the coefficient, take one explicit step, commit the new profile.

use crate::{step, CoefficientPolicy, DiffusionError};
use nalgebra::{DVector, RealField};
use std::marker::PhantomData;
use stratum_mesher::Profile;

/// The time discretisation of a run
#[derive(Clone, Copy, Debug)]
pub struct TimeLoop<T> {
    /// The fixed increment between steps
    pub time_step: T,
    /// The time at which the run stops
    pub end_time: T,
}

impl<T: Copy + RealField> TimeLoop<T> {
    /// Check the time step is finite and positive, and the end time finite and non-negative
    pub fn validate(&self) -> Result<(), DiffusionError<T>> {
        let valid = self.time_step.is_finite()
            && self.end_time.is_finite()
            && self.time_step > T::zero()
            && self.end_time >= T::zero();
        if valid {
            Ok(())
        } else {
            Err(DiffusionError::InvalidTimeLoop {
                time_step: self.time_step,
                end_time: self.end_time,
            })
        }
    }

    /// The number of whole steps `dt, 2 dt, ...` which fit before the end time
    ///
    /// A small allowance absorbs the rounding in `end_time / time_step`, so a run to `t = 1 s`
    /// with `dt = 1 ms` takes 1000 steps.
    pub fn number_of_steps(&self) -> usize {
        if self.time_step <= T::zero() || self.end_time < self.time_step {
            return 0;
        }
        let ratio = self.end_time / self.time_step + nalgebra::convert(1e-9);
        nalgebra::try_convert::<T, f64>(ratio.floor())
            .map(|steps| steps as usize)
            .unwrap_or(0)
    }

    /// The elapsed time at the end of step `step_index`, counting from one
    pub fn time_at(&self, step_index: usize) -> T {
        let index: T = nalgebra::convert(step_index as f64);
        index * self.time_step
    }
}

/// A snapshot of the diffusing system
#[derive(Clone, Debug)]
pub struct DiffusionState<T: RealField> {
    /// The concentration profile
    pub concentration: Profile<T>,
    /// The diffusion coefficient used for the most recent step
    pub coefficient: DVector<T>,
    /// The elapsed time
    pub time: T,
    /// The number of steps taken
    pub steps: usize,
}

/// Builder for a [`DiffusionSimulation`]
pub struct DiffusionSimulationBuilder<T, RefPolicy, RefTimeLoop> {
    policy: RefPolicy,
    time_loop: RefTimeLoop,
    marker: PhantomData<T>,
}

impl<T> DiffusionSimulationBuilder<T, (), ()> {
    /// Initialise an empty builder
    pub fn new() -> Self {
        Self {
            policy: (),
            time_loop: (),
            marker: PhantomData,
        }
    }
}

impl<T> Default for DiffusionSimulationBuilder<T, (), ()> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T, RefPolicy, RefTimeLoop> DiffusionSimulationBuilder<T, RefPolicy, RefTimeLoop> {
    /// Attach the coefficient policy
    pub fn with_policy<Policy>(
        self,
        policy: &Policy,
    ) -> DiffusionSimulationBuilder<T, &Policy, RefTimeLoop> {
        DiffusionSimulationBuilder {
            policy,
            time_loop: self.time_loop,
            marker: PhantomData,
        }
    }

    /// Attach the time discretisation
    pub fn with_time_loop<Loop>(
        self,
        time_loop: &Loop,
    ) -> DiffusionSimulationBuilder<T, RefPolicy, &Loop> {
        DiffusionSimulationBuilder {
            policy: self.policy,
            time_loop,
            marker: PhantomData,
        }
    }
}

impl<'a, T: RealField>
    DiffusionSimulationBuilder<T, &'a CoefficientPolicy<T>, &'a TimeLoop<T>>
{
    /// Finish the builder
    pub fn build(self) -> DiffusionSimulation<'a, T> {
        DiffusionSimulation {
            policy: self.policy,
            time_loop: self.time_loop,
        }
    }
}

/// Advances a concentration profile from `t = 0` to the end of the [`TimeLoop`]
pub struct DiffusionSimulation<'a, T: RealField> {
    policy: &'a CoefficientPolicy<T>,
    time_loop: &'a TimeLoop<T>,
}

impl<T> DiffusionSimulation<'_, T>
where
    T: Copy + RealField,
{
    /// Run the time loop from `initial`, returning the state after the last step
    ///
    /// An invalid time discretisation is rejected before any work is done. The first failing
    /// step, typically a stability violation, terminates the run.
    #[tracing::instrument(name = "Diffusion", level = "info", skip_all, fields(policy = self.policy.name()))]
    pub fn run(&self, initial: Profile<T>) -> Result<DiffusionState<T>, DiffusionError<T>> {
        self.time_loop.validate()?;
        let coefficient = self.policy.initialise(&initial)?;
        let mut state = DiffusionState {
            concentration: initial,
            coefficient,
            time: T::zero(),
            steps: 0,
        };

        let number_of_steps = self.time_loop.number_of_steps();
        tracing::info!(
            "Stepping {} increments of {} s",
            number_of_steps,
            self.time_loop.time_step
        );
        for step_index in 1..=number_of_steps {
            let time = self.time_loop.time_at(step_index);
            self.policy
                .refresh(&mut state.coefficient, &state.concentration, time);
            let next = step(
                &state.concentration,
                &state.coefficient,
                self.time_loop.time_step,
            )?;
            state.concentration.replace_values(next)?;
            state.time = time;
            state.steps = step_index;
            tracing::trace!("t = {}: peak concentration {}", time, state.concentration.max());
        }

        Ok(state)
    }
}

#[cfg(test)]
mod test {
    use super::{DiffusionSimulationBuilder, TimeLoop};
    use crate::{CoefficientPolicy, DiffusionError};
    use approx::assert_relative_eq;
    use nalgebra::DVector;
    use stratum_mesher::{create_line_segment_mesh_1d, Profile};

    fn spike() -> Profile<f64> {
        let mesh = create_line_segment_mesh_1d(1e-9, 41, 0.).unwrap();
        let mut values = DVector::zeros(41);
        values[20] = 1.;
        Profile::new(mesh, values).unwrap()
    }

    #[test]
    fn step_count_absorbs_rounding() {
        let time_loop = TimeLoop {
            time_step: 0.001,
            end_time: 1.,
        };
        assert_eq!(time_loop.number_of_steps(), 1000);
        let time_loop = TimeLoop {
            time_step: 0.3,
            end_time: 1.,
        };
        assert_eq!(time_loop.number_of_steps(), 3);
        let time_loop = TimeLoop {
            time_step: 2.,
            end_time: 1.,
        };
        assert_eq!(time_loop.number_of_steps(), 0);
    }

    #[test]
    fn non_positive_or_non_finite_time_steps_are_rejected() {
        let policy = CoefficientPolicy::Constant(1e-19);
        for (time_step, end_time) in [
            (0., 1.),
            (-1e-3, 1.),
            (f64::NAN, 1.),
            (1e-3, f64::INFINITY),
            (1e-3, -1.),
        ] {
            let time_loop = TimeLoop {
                time_step,
                end_time,
            };
            let simulation = DiffusionSimulationBuilder::new()
                .with_policy(&policy)
                .with_time_loop(&time_loop)
                .build();
            assert!(matches!(
                simulation.run(spike()),
                Err(DiffusionError::InvalidTimeLoop { .. })
            ));
        }
        let time_loop = TimeLoop {
            time_step: 1e-3,
            end_time: 0.,
        };
        assert!(time_loop.validate().is_ok());
    }

    #[test]
    fn run_reaches_the_end_time() {
        let policy = CoefficientPolicy::Constant(1e-19);
        let time_loop = TimeLoop {
            time_step: 0.01,
            end_time: 1.,
        };
        let simulation = DiffusionSimulationBuilder::new()
            .with_policy(&policy)
            .with_time_loop(&time_loop)
            .build();
        let initial = spike();
        let state = simulation.run(initial.clone()).unwrap();
        assert_eq!(state.steps, 100);
        assert_relative_eq!(state.time, 1.);
        assert!(state.concentration.max() < initial.max());
        assert_relative_eq!(
            state.concentration.integrate(),
            initial.integrate(),
            max_relative = 1e-10
        );
    }

    #[test]
    fn unstable_run_fails_on_the_first_step() {
        let policy = CoefficientPolicy::Constant(1e-15);
        let time_loop = TimeLoop {
            time_step: 1.,
            end_time: 10.,
        };
        let simulation = DiffusionSimulationBuilder::new()
            .with_policy(&policy)
            .with_time_loop(&time_loop)
            .build();
        assert!(matches!(
            simulation.run(spike()),
            Err(DiffusionError::Unstable { .. })
        ));
    }

    #[test]
    fn time_evolving_policy_sees_the_step_end_times() {
        let policy = CoefficientPolicy::TimeEvolving {
            initial: DVector::zeros(41),
            update: Box::new(|_z: f64, _d: f64, _n: f64, t: f64| t * 1e-20),
        };
        let time_loop = TimeLoop {
            time_step: 0.5,
            end_time: 2.,
        };
        let simulation = DiffusionSimulationBuilder::new()
            .with_policy(&policy)
            .with_time_loop(&time_loop)
            .build();
        let state = simulation.run(spike()).unwrap();
        assert_eq!(state.steps, 4);
        assert_relative_eq!(state.coefficient[0], 2e-20);
    }
}
