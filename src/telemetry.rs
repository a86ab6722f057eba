use log::*;
use std::sync::{Arc, Mutex, MutexGuard};

use crate::data::{self, PointStamped, QuaternionStamped, Vector3Stamped};
use crate::error::BridgeError;
use crate::frames::{self, Pose, Velocity};
use crate::mqtt::{self, MqttSettings};

/// Latest converted pose and velocity.
///
/// Fields are written by different telemetry topics and may come from
/// different sample times.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct TelemetrySnapshot {
    pub pose: Pose,
    pub velocity: Velocity,
}

/// Shared handle to the snapshot, cloned into every producer
#[derive(Debug, Clone, Default)]
pub struct TelemetryState {
    snapshot: Arc<Mutex<TelemetrySnapshot>>,
}

impl TelemetryState {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, TelemetrySnapshot> {
        // a panicking writer can't leave the snapshot half written
        self.snapshot
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// There is no angular rate source, so every attitude update zeroes it
    pub fn apply_attitude(&self, sample: &QuaternionStamped) {
        let orientation = frames::convert_orientation(&sample.quaternion);
        let mut snapshot = self.lock();
        snapshot.pose.orientation = orientation;
        snapshot.velocity.angular.fill(0.);
    }

    pub fn apply_velocity(&self, sample: &Vector3Stamped) {
        let linear = frames::convert_velocity(&sample.vector);
        self.lock().velocity.linear = linear;
    }

    pub fn apply_position(&self, sample: &PointStamped) {
        let position = frames::convert_position(&sample.point);
        self.lock().pose.position = position;
    }

    pub fn snapshot(&self) -> TelemetrySnapshot {
        *self.lock()
    }

    #[cfg(test)]
    pub(crate) fn set_angular(&self, angular: nalgebra::Vector3<f64>) {
        self.lock().velocity.angular = angular;
    }
}

#[derive(Debug, Clone)]
pub struct TelemetryTopics {
    pub attitude: String,
    pub velocity: String,
    pub local_position: String,
}

impl Default for TelemetryTopics {
    fn default() -> Self {
        Self {
            attitude: String::from("dji_sdk/attitude"),
            velocity: String::from("dji_sdk/velocity"),
            local_position: String::from("dji_sdk/local_position"),
        }
    }
}

impl TelemetryTopics {
    fn all(&self) -> Vec<String> {
        vec![
            self.attitude.clone(),
            self.velocity.clone(),
            self.local_position.clone(),
        ]
    }

    /// Decode a payload received on `topic` and write it into `state`.
    ///
    /// Returns `Ok(false)` for topics that aren't telemetry.
    pub fn dispatch(
        &self,
        state: &TelemetryState,
        topic: &str,
        payload: &[u8],
    ) -> Result<bool, BridgeError> {
        if topic == self.attitude {
            state.apply_attitude(&data::deserialize(payload)?);
        } else if topic == self.velocity {
            state.apply_velocity(&data::deserialize(payload)?);
        } else if topic == self.local_position {
            state.apply_position(&data::deserialize(payload)?);
        } else {
            return Ok(false);
        }
        Ok(true)
    }
}

pub trait TelemetrySource {
    /// Start delivering samples into `state`. Returns once subscribed,
    /// delivery continues in the background for the life of the process.
    fn subscribe(&mut self, state: TelemetryState) -> Result<(), BridgeError>;
}

pub struct MqttTelemetry {
    settings: MqttSettings,
    topics: TelemetryTopics,
}

impl MqttTelemetry {
    pub fn new(settings: MqttSettings, topics: TelemetryTopics) -> Self {
        Self { settings, topics }
    }
}

impl TelemetrySource for MqttTelemetry {
    fn subscribe(&mut self, state: TelemetryState) -> Result<(), BridgeError> {
        let topics = self.topics.clone();
        mqtt::spawn_subscriber(
            &self.settings,
            "telemetry",
            &topics.all(),
            move |topic, payload| {
                if let Err(error) = topics.dispatch(&state, topic, payload) {
                    warn!("Dropping sample on {}: {}", topic, error);
                }
            },
        )
    }
}
