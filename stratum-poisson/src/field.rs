//! # Field
//! The electric field derived from a solved potential
use nalgebra::RealField;
use stratum_mesher::Profile;

/// The sign convention of the potential the field is derived from
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PotentialConvention {
    /// The electrostatic potential itself, for which `F = -dphi/dz`
    Absolute,
    /// A potential inverted to act as an electron energy, for which `F = dphi/dz`
    CarrierEnergy,
}

/// Take the centred difference of `potential` at each interior sample
///
/// The end samples have no centred difference and are set to zero.
pub fn extract_field<T: Copy + RealField>(
    potential: &Profile<T>,
    convention: PotentialConvention,
) -> Profile<T> {
    let values = potential.values();
    let two = T::one() + T::one();
    let denominator = two * potential.mesh().spacing();
    let sign = match convention {
        PotentialConvention::Absolute => -T::one(),
        PotentialConvention::CarrierEnergy => T::one(),
    };

    let mut field = Profile::from_element(potential.mesh().clone(), T::zero());
    let samples = field.values_mut();
    for (i, window) in values.as_slice().windows(3).enumerate() {
        samples[i + 1] = sign * (window[2] - window[0]) / denominator;
    }
    field
}

#[cfg(test)]
mod test {
    use super::{extract_field, PotentialConvention};
    use approx::assert_relative_eq;
    use stratum_mesher::{create_line_segment_mesh_1d, Profile};

    #[test]
    fn linear_potential_has_uniform_field() {
        let mesh = create_line_segment_mesh_1d(1e-9f64, 50, 0.).unwrap();
        let potential = Profile::from_fn(mesh, |z| 2e5 * z + 0.3);

        let field = extract_field(&potential, PotentialConvention::Absolute);
        assert_relative_eq!(field.values()[0], 0.);
        assert_relative_eq!(field.values()[49], 0.);
        for value in field.values().iter().skip(1).take(48) {
            assert_relative_eq!(*value, -2e5, max_relative = 1e-8);
        }

        let field = extract_field(&potential, PotentialConvention::CarrierEnergy);
        assert_relative_eq!(field.values()[25], 2e5, max_relative = 1e-8);
    }

    #[test]
    fn end_samples_carry_no_field() {
        let mesh = create_line_segment_mesh_1d(1f64, 3, 0.).unwrap();
        let potential = Profile::from_fn(mesh, |z| z * z);
        let field = extract_field(&potential, PotentialConvention::Absolute);
        assert_eq!(field.values()[0], 0.);
        assert_eq!(field.values()[2], 0.);
        assert_relative_eq!(field.values()[1], -2.);
    }
}
