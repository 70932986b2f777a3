//! Shared fixtures for the integration tests: log capture, mock kernels and
//! grid builders.
#![allow(dead_code)]

use snowgrid_core::physics::{cold_content, FREEZE};
use snowgrid_core::solver::{KernelError, KernelStep, PhysicsKernel};
use snowgrid_core::{
    initialize_layers, ColumnState, ForcingSample, OutputMode, PrecipitationInput, SiteParameters,
    TimestepSchedule,
};
use std::collections::HashSet;
use std::sync::Mutex;

#[ctor::ctor]
fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

pub fn hourly_schedule() -> TimestepSchedule {
    TimestepSchedule::from_data_minutes(60.0, OutputMode::Data).unwrap()
}

/// Active column with `depth` m of snow at 300 kg/m³, split into layers
pub fn snowy_column(elevation: f64, depth: f64) -> ColumnState {
    let mut column =
        ColumnState::new(elevation, 0.005).with_bulk_snow(depth, 300.0, 268.0, 266.0, 267.0, 0.1);
    initialize_layers(&mut column, &SiteParameters::default(), &hourly_schedule()).unwrap();
    column
}

pub fn forcing(air_temp: f64) -> ForcingSample {
    ForcingSample {
        incoming_longwave: 250.0,
        air_temp,
        vapor_pressure: 400.0,
        wind_speed: 2.5,
        ground_temp: 272.0,
        net_solar: 120.0,
    }
}

pub fn snowfall(precip_mass: f64) -> PrecipitationInput {
    PrecipitationInput {
        precip_mass,
        percent_snow: 1.0,
        rho_snow: 100.0,
        precip_temp: 270.0,
    }
}

/// Bit patterns of every field, for exact comparison even through NaN
pub fn column_bits(c: &ColumnState) -> Vec<u64> {
    vec![
        u64::from(c.is_active()),
        c.elevation.to_bits(),
        c.z_0.to_bits(),
        c.z_s_0.to_bits(),
        c.z_s_l.to_bits(),
        c.z_s.to_bits(),
        c.rho.to_bits(),
        c.t_s_0.to_bits(),
        c.t_s_l.to_bits(),
        c.t_s.to_bits(),
        c.h2o_sat.to_bits(),
        c.h2o.to_bits(),
        c.h2o_max.to_bits(),
        u64::from(c.layer_count),
        c.cc_s_0.to_bits(),
        c.cc_s_l.to_bits(),
        c.cc_s.to_bits(),
        c.m_s_0.to_bits(),
        c.m_s_l.to_bits(),
        c.m_s.to_bits(),
        c.current_time.to_bits(),
        c.time_since_out.to_bits(),
    ]
}

/// Deterministic stand-in for a real energy-balance kernel
///
/// Adds falling snow to the surface layer and compacts both layers a little.
/// The surface temperature relaxes toward the mean air temperature and the
/// average temperature follows the layers. Liquid water capacity scales with
/// air pressure. Output depends only on the column and its step record.
pub struct SettlingKernel;

impl PhysicsKernel for SettlingKernel {
    fn advance(&self, column: &mut ColumnState, step: &KernelStep<'_>) -> Result<(), KernelError> {
        let dt = step.schedule.data_time_step();

        if step.precip_now && step.precip.rho_snow > 0.0 {
            let snow = step.precip.snow_mass();
            column.m_s_0 += snow;
            column.z_s_0 += snow / step.precip.rho_snow;
        }

        let compaction = 1.0 - 2.0e-6 * dt;
        column.z_s_0 *= compaction;
        column.z_s_l *= compaction;

        column.layer_count = if column.z_s_l > 0.0 {
            2
        } else if column.z_s_0 > 0.0 {
            1
        } else {
            0
        };

        let mean_air = 0.5 * (step.forcing.start.air_temp + step.forcing.end.air_temp);
        if column.layer_count > 0 {
            column.t_s_0 = (0.5 * (column.t_s_0 + mean_air)).min(FREEZE);
        }
        column.cc_s_0 = cold_content(column.t_s_0, column.m_s_0);

        column.recompute_totals();
        match column.layer_count {
            0 => {}
            1 => column.t_s = column.t_s_0,
            _ => {
                column.t_s = (column.t_s_0 * column.m_s_0 + column.t_s_l * column.m_s_l)
                    / column.m_s;
            }
        }
        column.rho = if column.z_s > 0.0 {
            column.m_s / column.z_s
        } else {
            0.0
        };
        column.h2o_max = column.z_s * step.air_pressure * 1.0e-4;
        column.time_since_out += dt;
        Ok(())
    }
}

/// Fails on chosen columns after scribbling over them
pub struct FailingKernel {
    pub fail_on: HashSet<usize>,
}

impl FailingKernel {
    pub fn new(indices: &[usize]) -> Self {
        Self {
            fail_on: indices.iter().copied().collect(),
        }
    }
}

impl PhysicsKernel for FailingKernel {
    fn advance(&self, column: &mut ColumnState, step: &KernelStep<'_>) -> Result<(), KernelError> {
        if self.fail_on.contains(&step.index) {
            column.z_s_0 = f64::NAN;
            column.time_since_out = -1.0;
            return Err(KernelError::Code(-1));
        }
        SettlingKernel.advance(column, step)
    }
}

/// Records every step record it receives
#[derive(Default)]
pub struct RecordingKernel {
    pub calls: Mutex<Vec<(usize, bool, f64)>>,
}

impl RecordingKernel {
    /// Recorded `(index, precip_now, air_pressure)` triples sorted by index
    pub fn sorted_calls(&self) -> Vec<(usize, bool, f64)> {
        let mut calls = self.calls.lock().unwrap().clone();
        calls.sort_by_key(|call| call.0);
        calls
    }
}

impl PhysicsKernel for RecordingKernel {
    fn advance(&self, _: &mut ColumnState, step: &KernelStep<'_>) -> Result<(), KernelError> {
        self.calls
            .lock()
            .unwrap()
            .push((step.index, step.precip_now, step.air_pressure));
        Ok(())
    }
}
