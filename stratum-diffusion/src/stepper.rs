//! The explicit centred-difference update for a single time increment

use crate::DiffusionError;
use itertools::izip;
use nalgebra::{DVector, RealField};
use stratum_mesher::Profile;

/// The largest stable time step for the explicit scheme, `dz^2 / (2 max(D))`
///
/// There is no bound when the coefficient vanishes everywhere, in which case `None` is returned.
pub fn stability_bound<T>(spacing: T, coefficient: &DVector<T>) -> Option<T>
where
    T: Copy + RealField,
{
    let max_coefficient = coefficient.max();
    if max_coefficient <= T::zero() {
        return None;
    }
    Some(spacing.powi(2) / ((T::one() + T::one()) * max_coefficient))
}

/// Projects the concentration profile a time `delta_t` into the future
///
/// The update is the product-rule expansion of `d/dz (D dn/dz)` on the interior vertices,
/// reading only the current profile and writing into a new buffer. The edge vertices copy
/// their inward neighbour, a closed system from which no diffusant escapes.
///
/// Fails before computing anything if `delta_t` exceeds [`stability_bound`] or if the
/// coefficient array does not line up with the profile.
pub fn step<T>(
    concentration: &Profile<T>,
    coefficient: &DVector<T>,
    delta_t: T,
) -> Result<DVector<T>, DiffusionError<T>>
where
    T: Copy + RealField,
{
    let n = concentration.values();
    let nz = n.len();
    if coefficient.len() != nz {
        return Err(DiffusionError::LengthMismatch {
            expected: nz,
            found: coefficient.len(),
        });
    }

    let dz = concentration.mesh().spacing();
    if let Some(bound) = stability_bound(dz, coefficient) {
        if delta_t > bound {
            return Err(DiffusionError::Unstable {
                time_step: delta_t,
                bound,
                max_coefficient: coefficient.max(),
            });
        }
    }

    let two = T::one() + T::one();
    let dz_squared = dz.powi(2);
    let two_dz_squared = (two * dz).powi(2);

    let mut n_new = DVector::zeros(nz);
    for (next, window, d) in izip!(
        n_new.as_mut_slice()[1..nz - 1].iter_mut(),
        n.as_slice().windows(3),
        coefficient.as_slice().windows(3)
    ) {
        *next = window[1]
            + delta_t
                * ((d[2] - d[0]) * (window[2] - window[0]) / two_dz_squared
                    + d[1] * (window[2] - two * window[1] + window[0]) / dz_squared);
    }

    // Closed-system boundaries
    n_new[0] = n_new[1];
    n_new[nz - 1] = n_new[nz - 2];

    Ok(n_new)
}
