use approx::assert_relative_eq;
use std::path::Path;
use stratum::{
    app::{run_poisson, BoundaryMode, PoissonConfiguration},
    constants::{ELECTRON_CHARGE, EPSILON_0},
    table::{read_profile, write_profile},
};
use stratum_mesher::{create_line_segment_mesh_1d, Profile};

const NUM_POINTS: usize = 101;
const SPACING: f64 = 1e-9;

/// Write a uniform GaAs permittivity and a charge spike at the central sample
fn write_structure(directory: &Path) -> PoissonConfiguration<f64> {
    let mesh = create_line_segment_mesh_1d(SPACING, NUM_POINTS, 0.).unwrap();
    let permittivity = Profile::from_element(mesh.clone(), 12.9 * EPSILON_0);
    let centre = mesh.midpoint_index();
    let mut charge = Profile::from_element(mesh, 0.);
    charge.values_mut()[centre] = 1e25;

    let mut config = PoissonConfiguration::<f64>::default();
    config.files.permittivity = directory.join("eps_dc.r");
    config.files.charge = directory.join("cd.r");
    write_profile(&config.files.permittivity, &permittivity).unwrap();
    write_profile(&config.files.charge, &charge).unwrap();
    config
}

#[test]
fn central_point_charge_is_symmetric() {
    let directory = tempfile::tempdir().unwrap();
    let config = write_structure(directory.path());

    let written = run_poisson(&config, directory.path()).unwrap();
    assert_eq!(written.len(), 3);

    let potential: Profile<f64> = read_profile(&directory.path().join("v_p.r")).unwrap();
    let field: Profile<f64> = read_profile(&directory.path().join("field.r")).unwrap();
    let total: Profile<f64> = read_profile(&directory.path().join("v.r")).unwrap();

    let scale = potential.values().amax();
    let field_scale = field.values().amax();
    assert!(scale > 0.);
    for i in 0..NUM_POINTS / 2 {
        let j = NUM_POINTS - 1 - i;
        assert_relative_eq!(
            potential.values()[i],
            potential.values()[j],
            epsilon = 1e-9 * scale
        );
        assert_relative_eq!(field.values()[i], -field.values()[j], epsilon = 1e-9 * field_scale);
    }
    // Inverted, a positive charge is a minimum of the electron energy
    assert!(potential.values()[NUM_POINTS / 2] < potential.values()[0]);
    assert_eq!(total.values(), potential.values());
}

#[test]
fn applied_field_sets_the_energy_drop() {
    let directory = tempfile::tempdir().unwrap();
    let mut config = write_structure(directory.path());
    config.boundary = BoundaryMode::Dirichlet;
    config.uncharged = true;
    config.centred = true;
    // 10 kV/cm over 100 nm is 100 mV
    config.field = Some(10.);

    run_poisson(&config, directory.path()).unwrap();
    let potential: Profile<f64> = read_profile(&directory.path().join("v_p.r")).unwrap();
    let values = potential.values();
    let drop = 0.1 * ELECTRON_CHARGE;
    assert_relative_eq!(values[0], drop / 2., max_relative = 1e-9);
    assert_relative_eq!(values[NUM_POINTS - 1], -drop / 2., max_relative = 1e-9);

    let field: Profile<f64> = read_profile(&directory.path().join("field.r")).unwrap();
    assert_eq!(field.values()[0], 0.);
    for value in field.values().iter().skip(1).take(NUM_POINTS - 2) {
        assert_relative_eq!(value.abs(), 1e6, max_relative = 1e-6);
    }
}

#[test]
fn a_field_pins_both_ends_in_the_default_mode() {
    let directory = tempfile::tempdir().unwrap();
    let mut config = write_structure(directory.path());
    config.uncharged = true;
    config.field = Some(10.);

    run_poisson(&config, directory.path()).unwrap();
    let potential: Profile<f64> = read_profile(&directory.path().join("v_p.r")).unwrap();
    let values = potential.values();
    assert_relative_eq!(values[0], 0., epsilon = 1e-30);
    assert_relative_eq!(
        values[NUM_POINTS - 1],
        -0.1 * ELECTRON_CHARGE,
        max_relative = 1e-9
    );
}

#[test]
fn band_edge_is_added_to_the_total_potential() {
    let directory = tempfile::tempdir().unwrap();
    let mut config = write_structure(directory.path());
    config.uncharged = true;
    config.offset = Some(100.);

    let baseline_path = directory.path().join("v_b.r");
    let mesh = create_line_segment_mesh_1d(SPACING, NUM_POINTS, 0.).unwrap();
    write_profile(&baseline_path, &Profile::from_element(mesh, 1e-20)).unwrap();
    config.files.band_edge_potential = Some(baseline_path);

    run_poisson(&config, directory.path()).unwrap();
    let potential: Profile<f64> = read_profile(&directory.path().join("v_p.r")).unwrap();
    let total: Profile<f64> = read_profile(&directory.path().join("v.r")).unwrap();
    // An uncharged structure with zero field boundaries is flat at the offset, 100 meV
    for (v_p, v) in potential.values().iter().zip(total.values().iter()) {
        assert_relative_eq!(*v_p, 0.1 * ELECTRON_CHARGE, max_relative = 1e-9);
        assert_relative_eq!(*v, *v_p + 1e-20, max_relative = 1e-9);
    }
}

#[test]
fn misaligned_charge_table_is_an_error() {
    let directory = tempfile::tempdir().unwrap();
    let config = write_structure(directory.path());
    let short = create_line_segment_mesh_1d(SPACING, NUM_POINTS - 1, 0.).unwrap();
    write_profile(&config.files.charge, &Profile::from_element(short, 0.)).unwrap();

    assert!(run_poisson(&config, directory.path()).is_err());
    assert!(!directory.path().join("v_p.r").exists());
}
