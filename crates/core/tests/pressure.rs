//! Site pressure handed to the kernel
mod common;

use approx::assert_relative_eq;
use common::{hourly_schedule, RecordingKernel};
use snowgrid_core::physics::SEA_LEVEL;
use snowgrid_core::{
    site_pressure, ColumnState, ForcingSample, GridDriver, PrecipitationInput,
    ReferenceAtmosphere, SiteParameters,
};

#[test]
fn test_pressure_strictly_decreases_with_elevation() {
    let mut previous = site_pressure(0.0).unwrap();
    for step in 1..=80 {
        let pressure = site_pressure(f64::from(step) * 50.0).unwrap();
        assert!(pressure < previous, "no decrease at {} m", step * 50);
        previous = pressure;
    }
}

#[test]
fn test_sea_level_column_gets_sea_level_pressure() {
    let elevations = [0.0, 1500.0, 3000.0];
    let mut columns: Vec<ColumnState> =
        elevations.iter().map(|&e| ColumnState::new(e, 0.01)).collect();
    let forcing = vec![ForcingSample::default(); 3];
    let precip = vec![PrecipitationInput::default(); 3];
    let driver = GridDriver::new(RecordingKernel::default(), 2).unwrap();

    driver
        .run_step(
            &mut columns,
            &forcing,
            &forcing,
            &precip,
            &SiteParameters::default(),
            &hourly_schedule(),
        )
        .unwrap();

    let calls = driver.kernel().sorted_calls();
    assert_eq!(calls[0].2, SEA_LEVEL);
    assert_eq!(calls[1].2, site_pressure(1500.0).unwrap());
    assert!(calls[2].2 < calls[1].2);
}

#[test]
fn test_driver_uses_configured_atmosphere() {
    let warm = ReferenceAtmosphere {
        standard_temperature: 303.0,
        ..ReferenceAtmosphere::STANDARD
    };
    let mut columns = vec![ColumnState::new(2000.0, 0.01)];
    let forcing = vec![ForcingSample::default()];
    let precip = vec![PrecipitationInput::default()];
    let driver = GridDriver::new(RecordingKernel::default(), 1)
        .unwrap()
        .with_atmosphere(warm);

    driver
        .run_step(
            &mut columns,
            &forcing,
            &forcing,
            &precip,
            &SiteParameters::default(),
            &hourly_schedule(),
        )
        .unwrap();

    let pressure = driver.kernel().sorted_calls()[0].2;
    assert_relative_eq!(pressure, warm.pressure_at(2000.0).unwrap());
    assert!(pressure > site_pressure(2000.0).unwrap());
}
