//! # Post-processing
//! Adjustments applied to a solved potential before it is reported
use nalgebra::RealField;

/// The sequence of adjustments applied by [`PoissonSolution::post_process`](crate::PoissonSolution::post_process)
///
/// The steps run in a fixed order: centring, then inversion, then the offset.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PostProcess<T> {
    /// Subtract half the applied drop so the potential runs from `-V/2` to `V/2`
    pub centred: bool,
    /// Flip the sign of the potential, to report it as a contribution to the electron energy
    pub invert: bool,
    /// Shift the potential so the sample nearest the origin takes this value
    pub offset: Option<T>,
}

impl<T: Copy + RealField> Default for PostProcess<T> {
    fn default() -> Self {
        Self {
            centred: false,
            invert: true,
            offset: None,
        }
    }
}
