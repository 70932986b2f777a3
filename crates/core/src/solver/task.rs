//! One column's share of a grid pass
//!
//! A task owns the only mutable borrow of its column for the length of the
//! pass. The kernel runs on a private copy; the stored column is written once,
//! at the end, and only if everything succeeded.

use super::result::ColumnOutcome;
use super::r#trait::{KernelStep, PhysicsKernel};
use crate::config::{SiteParameters, TimestepSchedule};
use crate::core_types::{ColumnState, ForcingPair, PrecipitationInput};
use crate::error::ColumnError;
use crate::physics::ReferenceAtmosphere;

/// Read-only configuration shared by every task of a pass
#[derive(Debug, Clone, Copy)]
pub(crate) struct PassContext<'a> {
    pub params: &'a SiteParameters,
    pub schedule: &'a TimestepSchedule,
    pub atmosphere: &'a ReferenceAtmosphere,
}

/// An active column and its inputs for this pass
pub(crate) struct ColumnUpdateTask<'a> {
    pub index: usize,
    pub state: &'a mut ColumnState,
    pub forcing: ForcingPair,
    pub precip: PrecipitationInput,
}

impl ColumnUpdateTask<'_> {
    pub fn run<K: PhysicsKernel + ?Sized>(self, kernel: &K, ctx: &PassContext<'_>) -> ColumnOutcome {
        let index = self.index;
        match self.advance(kernel, ctx) {
            Ok(()) => ColumnOutcome::success(index),
            Err(error) => ColumnOutcome::failed(index, error),
        }
    }

    fn advance<K: PhysicsKernel + ?Sized>(
        self,
        kernel: &K,
        ctx: &PassContext<'_>,
    ) -> Result<(), ColumnError> {
        // 1. Derived inputs
        let precip_now = self.precip.precip_now();
        let air_pressure = ctx.atmosphere.pressure_at(self.state.elevation)?;

        // 2. The kernel needs a layer decomposition to start from
        self.state
            .check_layers()
            .map_err(ColumnError::Uninitialized)?;

        // 3. Integrate a private copy
        let mut working = *self.state;
        let step = KernelStep {
            index: self.index,
            forcing: self.forcing,
            precip: self.precip,
            precip_now,
            air_pressure,
            params: ctx.params,
            schedule: ctx.schedule,
        };
        kernel.advance(&mut working, &step)?;

        working
            .check_layers()
            .map_err(ColumnError::InconsistentLayers)?;

        // 4. Commit
        self.state.absorb(&working);
        self.state.recompute_totals();
        self.state.current_time += ctx.schedule.data_time_step();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::OutputMode;
    use crate::error::LayerError;
    use crate::physics::site_pressure;
    use crate::solver::KernelError;
    use std::sync::Mutex;

    struct Recorder(Mutex<Vec<(usize, f64, bool)>>);

    impl PhysicsKernel for Recorder {
        fn advance(&self, column: &mut ColumnState, step: &KernelStep<'_>) -> Result<(), KernelError> {
            self.0
                .lock()
                .unwrap()
                .push((step.index, step.air_pressure, step.precip_now));
            column.time_since_out += step.schedule.data_time_step();
            column.elevation = 0.0;
            column.current_time = -1.0;
            Ok(())
        }
    }

    struct Scrambler;

    impl PhysicsKernel for Scrambler {
        fn advance(&self, column: &mut ColumnState, _: &KernelStep<'_>) -> Result<(), KernelError> {
            column.z_s_0 = 0.5;
            column.layer_count = 1;
            Ok(())
        }
    }

    fn context_parts() -> (SiteParameters, TimestepSchedule, ReferenceAtmosphere) {
        (
            SiteParameters::default(),
            TimestepSchedule::from_data_minutes(60.0, OutputMode::Data).unwrap(),
            ReferenceAtmosphere::STANDARD,
        )
    }

    fn task(state: &mut ColumnState, precip_mass: f64) -> ColumnUpdateTask<'_> {
        ColumnUpdateTask {
            index: 7,
            state,
            forcing: ForcingPair::default(),
            precip: PrecipitationInput {
                precip_mass,
                ..Default::default()
            },
        }
    }

    #[test]
    fn test_kernel_sees_derived_inputs_and_driver_fields_survive() {
        let (params, schedule, atmosphere) = context_parts();
        let ctx = PassContext {
            params: &params,
            schedule: &schedule,
            atmosphere: &atmosphere,
        };
        let kernel = Recorder(Mutex::new(Vec::new()));
        let mut column = ColumnState::new(1200.0, 0.01);
        column.current_time = 3600.0;

        let outcome = task(&mut column, 2.5).run(&kernel, &ctx);

        assert!(outcome.is_success());
        let calls = kernel.0.lock().unwrap();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0], (7, site_pressure(1200.0).unwrap(), true));
        assert_eq!(column.elevation, 1200.0);
        assert_eq!(column.current_time, 7200.0);
        assert_eq!(column.time_since_out, 3600.0);
    }

    #[test]
    fn test_pressure_failure_skips_kernel() {
        let (params, schedule, atmosphere) = context_parts();
        let ctx = PassContext {
            params: &params,
            schedule: &schedule,
            atmosphere: &atmosphere,
        };
        let kernel = Recorder(Mutex::new(Vec::new()));
        let mut column = ColumnState::new(-10.0, 0.01);
        let before = column;

        let outcome = task(&mut column, 0.0).run(&kernel, &ctx);

        assert!(matches!(outcome.error(), Some(ColumnError::Pressure(_))));
        assert!(kernel.0.lock().unwrap().is_empty());
        assert_eq!(column, before);
    }

    #[test]
    fn test_inconsistent_kernel_output_is_discarded() {
        let (params, schedule, atmosphere) = context_parts();
        let ctx = PassContext {
            params: &params,
            schedule: &schedule,
            atmosphere: &atmosphere,
        };
        let mut column = ColumnState::new(500.0, 0.01);
        let before = column;

        let outcome = task(&mut column, 0.0).run(&Scrambler, &ctx);

        assert!(matches!(
            outcome.error(),
            Some(ColumnError::InconsistentLayers(LayerError::TotalMismatch { .. }))
        ));
        assert_eq!(column, before);
    }
}
