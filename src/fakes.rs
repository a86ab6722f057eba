//! In-process stand-ins for the simulator, flight controller and transports

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use crate::error::BridgeError;
use crate::services::{proto, ReferenceService, ServiceProbe, SimulatorService};
use crate::telemetry::{TelemetrySource, TelemetryState, TelemetryTopics};
use crate::transforms::TransformSource;

/// Ordered record of calls made across all fakes
#[derive(Clone, Default)]
pub struct Journal(Arc<Mutex<Vec<String>>>);

impl Journal {
    pub fn record(&self, entry: &str) {
        self.0.lock().unwrap().push(entry.to_owned());
    }

    pub fn entries(&self) -> Vec<String> {
        self.0.lock().unwrap().clone()
    }
}

pub enum Failure {
    Transport,
    Rejected(String),
}

#[derive(Default)]
struct SimulatorInner {
    reachable_polls: Option<usize>,
    polls: usize,
    failures: VecDeque<Failure>,
    requests: Vec<proto::ModelState>,
}

#[derive(Clone, Default)]
pub struct FakeSimulator {
    inner: Arc<Mutex<SimulatorInner>>,
    journal: Journal,
}

impl FakeSimulator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_journal(journal: &Journal) -> Self {
        Self {
            journal: journal.clone(),
            ..Self::default()
        }
    }

    /// Only the first `polls` reachability checks succeed
    pub fn available_for(&self, polls: usize) {
        self.inner.lock().unwrap().reachable_polls = Some(polls);
    }

    pub fn fail_next(&self, failure: Failure) {
        self.inner.lock().unwrap().failures.push_back(failure);
    }

    pub fn requests(&self) -> Vec<proto::ModelState> {
        self.inner.lock().unwrap().requests.clone()
    }

    pub fn polls(&self) -> usize {
        self.inner.lock().unwrap().polls
    }
}

impl ServiceProbe for FakeSimulator {
    fn name(&self) -> &str {
        "fake_simulator"
    }

    fn exists(&mut self) -> bool {
        self.journal.record("simulator.exists");
        let mut inner = self.inner.lock().unwrap();
        inner.polls += 1;
        match inner.reachable_polls {
            Some(limit) => inner.polls <= limit,
            None => true,
        }
    }
}

impl SimulatorService for FakeSimulator {
    fn set_model_state(
        &mut self,
        model_state: proto::ModelState,
    ) -> Result<proto::SetModelStateResponse, BridgeError> {
        self.journal.record("simulator.set_model_state");
        let mut inner = self.inner.lock().unwrap();
        inner.requests.push(model_state);
        match inner.failures.pop_front() {
            Some(Failure::Transport) => Err(BridgeError::Status(tonic::Status::unavailable(
                "connection reset",
            ))),
            Some(Failure::Rejected(message)) => Ok(proto::SetModelStateResponse {
                success: false,
                status_message: message,
            }),
            None => Ok(proto::SetModelStateResponse {
                success: true,
                status_message: String::from("SetModelState: set model state done"),
            }),
        }
    }
}

#[derive(Clone)]
pub struct FakeFlightControl {
    result: bool,
    unreachable_call: bool,
    calls: Arc<Mutex<usize>>,
    journal: Journal,
}

impl FakeFlightControl {
    pub fn new(result: bool) -> Self {
        Self::with_journal(result, &Journal::default())
    }

    pub fn with_journal(result: bool, journal: &Journal) -> Self {
        Self {
            result,
            unreachable_call: false,
            calls: Arc::new(Mutex::new(0)),
            journal: journal.clone(),
        }
    }

    /// The reset call fails in transport instead of answering
    pub fn failing_call(journal: &Journal) -> Self {
        Self {
            unreachable_call: true,
            ..Self::with_journal(true, journal)
        }
    }

    pub fn calls(&self) -> usize {
        *self.calls.lock().unwrap()
    }
}

impl ServiceProbe for FakeFlightControl {
    fn name(&self) -> &str {
        "fake_flight_control"
    }

    fn exists(&mut self) -> bool {
        self.journal.record("flight_control.exists");
        true
    }
}

impl ReferenceService for FakeFlightControl {
    fn set_local_pos_ref(&mut self) -> Result<bool, BridgeError> {
        self.journal.record("flight_control.set_local_pos_ref");
        *self.calls.lock().unwrap() += 1;
        if self.unreachable_call {
            return Err(BridgeError::Status(tonic::Status::unavailable(
                "flight controller went away",
            )));
        }
        Ok(self.result)
    }
}

pub struct FakeTransforms {
    pub ready: bool,
    pub journal: Journal,
}

impl TransformSource for FakeTransforms {
    fn wait_for_transform(
        &self,
        target: &str,
        source: &str,
        timeout: Duration,
    ) -> Result<(), BridgeError> {
        self.journal
            .record(&format!("transform {} {}", target, source));
        if self.ready {
            Ok(())
        } else {
            Err(BridgeError::TransformTimeout {
                target: target.to_owned(),
                source_frame: source.to_owned(),
                timeout,
            })
        }
    }
}

/// Delivers a fixed list of `(topic, payload)` samples as soon as subscribed
pub struct FakeTelemetry {
    pub samples: Vec<(String, Vec<u8>)>,
    pub journal: Journal,
}

impl TelemetrySource for FakeTelemetry {
    fn subscribe(&mut self, state: TelemetryState) -> Result<(), BridgeError> {
        self.journal.record("telemetry.subscribe");
        let topics = TelemetryTopics::default();
        for (topic, payload) in &self.samples {
            topics.dispatch(&state, topic, payload)?;
        }
        Ok(())
    }
}
