use log::*;
use std::thread;
use std::time::{Duration, Instant};

use crate::config::BridgeSettings;
use crate::error::BridgeError;
use crate::frames::{Pose, Velocity};
use crate::services::{proto, SimulatorService};
use crate::telemetry::{TelemetrySnapshot, TelemetryState};

impl From<Pose> for proto::Pose {
    fn from(pose: Pose) -> Self {
        proto::Pose {
            position: Some(proto::Point {
                x: pose.position.x,
                y: pose.position.y,
                z: pose.position.z,
            }),
            orientation: Some(proto::Quaternion {
                x: pose.orientation.i,
                y: pose.orientation.j,
                z: pose.orientation.k,
                w: pose.orientation.w,
            }),
        }
    }
}

impl From<Velocity> for proto::Twist {
    fn from(velocity: Velocity) -> Self {
        proto::Twist {
            linear: Some(proto::Vector3 {
                x: velocity.linear.x,
                y: velocity.linear.y,
                z: velocity.linear.z,
            }),
            angular: Some(proto::Vector3 {
                x: velocity.angular.x,
                y: velocity.angular.y,
                z: velocity.angular.z,
            }),
        }
    }
}

/// Fixed rate sleeper that keeps tick boundaries aligned to the start time
pub struct Rate {
    period: Duration,
    next: Instant,
}

impl Rate {
    pub fn new(hz: f64) -> Self {
        Self {
            period: Duration::from_secs_f64(1. / hz),
            next: Instant::now(),
        }
    }

    pub fn sleep(&mut self) {
        self.next += self.period;
        let now = Instant::now();
        if self.next > now {
            thread::sleep(self.next - now);
        } else if now - self.next > self.period {
            // fell more than a cycle behind, don't try to catch up
            self.next = now;
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum TickOutcome {
    Updated,
    Rejected(String),
    CallFailed,
}

pub struct StateSynchronizer {
    model_name: String,
    reference_frame: String,
    rate_hz: f64,
    simulator: Box<dyn SimulatorService>,
    state: TelemetryState,
}

impl StateSynchronizer {
    pub fn new(
        settings: &BridgeSettings,
        simulator: Box<dyn SimulatorService>,
        state: TelemetryState,
    ) -> Self {
        Self {
            model_name: settings.model_name.clone(),
            reference_frame: settings.reference_frame.clone(),
            rate_hz: settings.rate_hz,
            simulator,
            state,
        }
    }

    pub fn model_state(&self, snapshot: TelemetrySnapshot) -> proto::ModelState {
        proto::ModelState {
            model_name: self.model_name.clone(),
            pose: Some(snapshot.pose.into()),
            twist: Some(snapshot.velocity.into()),
            reference_frame: self.reference_frame.clone(),
        }
    }

    /// One update attempt.
    ///
    /// Only a vanished simulator service is an error, failed calls are
    /// reported through the outcome and retried on the next tick.
    pub fn tick(&mut self) -> Result<TickOutcome, BridgeError> {
        if !self.simulator.exists() {
            return Err(BridgeError::ServiceLost(self.simulator.name().to_owned()));
        }
        let model_state = self.model_state(self.state.snapshot());
        match self.simulator.set_model_state(model_state) {
            Ok(response) if response.success => Ok(TickOutcome::Updated),
            Ok(response) => {
                error!("Could not update {} model states", self.model_name);
                error!(
                    "status: {}, message {}",
                    response.success, response.status_message
                );
                Ok(TickOutcome::Rejected(response.status_message))
            }
            Err(err) => {
                error!("Could not update {} model states: {}", self.model_name, err);
                Ok(TickOutcome::CallFailed)
            }
        }
    }

    /// Runs until the simulator service disappears
    pub fn run(&mut self) -> Result<(), BridgeError> {
        let mut rate = Rate::new(self.rate_hz);
        loop {
            self.tick()?;
            rate.sleep();
        }
    }
}
