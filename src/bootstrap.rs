use log::*;

use crate::config::BridgeSettings;
use crate::error::BridgeError;
use crate::reference::reset_local_reference;
use crate::services::{wait_for_service, ReferenceService, SimulatorService};
use crate::sync::StateSynchronizer;
use crate::telemetry::{TelemetrySource, TelemetryState};
use crate::transforms::TransformSource;

/// Everything the bridge talks to, acquired once at startup
pub struct Bridge {
    pub settings: BridgeSettings,
    pub simulator: Box<dyn SimulatorService>,
    pub flight_control: Box<dyn ReferenceService>,
    pub transforms: Box<dyn TransformSource>,
    pub telemetry: Box<dyn TelemetrySource>,
}

impl Bridge {
    /// Bring the bridge up in order:
    ///
    /// 1. wait for the simulator's model state service
    /// 2. wait (bounded, advisory) for the model's readiness transform
    /// 3. subscribe to telemetry
    /// 4. optionally reset the local position reference, failure is fatal
    ///
    /// and hand back the synchronizer ready to run.
    pub fn start(self) -> Result<StateSynchronizer, BridgeError> {
        let Bridge {
            settings,
            mut simulator,
            mut flight_control,
            transforms,
            mut telemetry,
        } = self;

        wait_for_service(
            simulator.as_mut(),
            settings.service_wait_timeout,
            settings.service_poll_interval,
        )?;

        info!("Simulator drone model is set to {}", settings.model_name);
        info!("drone reference frame is set to {}", settings.reference_frame);
        info!("set_local_pose is set to {}", settings.set_local_pose);

        match transforms.wait_for_transform(
            &settings.model_frame(),
            &settings.readiness_frame,
            settings.transform_timeout,
        ) {
            Ok(()) => info!("TF transforms ready"),
            Err(err) => error!("{}", err),
        }

        let state = TelemetryState::new();
        telemetry.subscribe(state.clone())?;

        if settings.set_local_pose {
            wait_for_service(
                flight_control.as_mut(),
                settings.service_wait_timeout,
                settings.service_poll_interval,
            )?;
            if !reset_local_reference(flight_control.as_mut())? {
                return Err(BridgeError::ReferenceRejected);
            }
            info!("Local reference was set.");
        }

        info!("Bridge between flight controller and simulator is established");
        Ok(StateSynchronizer::new(&settings, simulator, state))
    }
}
