//! Readiness signal from the transform tree.
//!
//! Some external localization chain publishes parent/child frame pairs. The
//! bridge only cares whether the model's frame has been connected to the
//! readiness frame, never about the transform values.

use log::*;
use std::collections::HashMap;
use std::sync::{Arc, Condvar, Mutex, MutexGuard};
use std::time::{Duration, Instant};

use crate::data::{self, TransformStamped};
use crate::error::BridgeError;
use crate::mqtt::{self, MqttSettings};

pub trait TransformSource {
    fn wait_for_transform(
        &self,
        target: &str,
        source: &str,
        timeout: Duration,
    ) -> Result<(), BridgeError>;
}

#[derive(Default)]
struct Tree {
    /// child frame -> parent frame
    parents: HashMap<String, String>,
}

impl Tree {
    fn root_of<'a>(&'a self, frame: &'a str) -> &'a str {
        let mut current = frame;
        // bounded so a cycle in published data can't hang us
        for _ in 0..=self.parents.len() {
            match self.parents.get(current) {
                Some(parent) => current = parent,
                None => break,
            }
        }
        current
    }

    fn is_known(&self, frame: &str) -> bool {
        self.parents.contains_key(frame) || self.parents.values().any(|p| p == frame)
    }

    fn can_transform(&self, target: &str, source: &str) -> bool {
        if target == source {
            return self.is_known(target);
        }
        self.is_known(target)
            && self.is_known(source)
            && self.root_of(target) == self.root_of(source)
    }
}

#[derive(Clone, Default)]
pub struct TransformBuffer {
    inner: Arc<(Mutex<Tree>, Condvar)>,
}

impl TransformBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, Tree> {
        self.inner
            .0
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn insert(&self, parent: &str, child: &str) {
        self.lock()
            .parents
            .insert(child.to_owned(), parent.to_owned());
        self.inner.1.notify_all();
    }

    pub fn can_transform(&self, target: &str, source: &str) -> bool {
        self.lock().can_transform(target, source)
    }

    /// Feed the buffer from `topic` in the background
    pub fn listen(&self, settings: &MqttSettings, topic: &str) -> Result<(), BridgeError> {
        let buffer = self.clone();
        mqtt::spawn_subscriber(
            settings,
            "tf",
            &[topic.to_owned()],
            move |topic, payload| match data::deserialize::<TransformStamped>(payload) {
                Ok(transform) => {
                    buffer.insert(&transform.header.frame_id, &transform.child_frame_id)
                }
                Err(error) => warn!("Dropping transform on {}: {}", topic, error),
            },
        )
    }
}

impl TransformSource for TransformBuffer {
    fn wait_for_transform(
        &self,
        target: &str,
        source: &str,
        timeout: Duration,
    ) -> Result<(), BridgeError> {
        let deadline = Instant::now() + timeout;
        let mut tree = self.lock();
        while !tree.can_transform(target, source) {
            let now = Instant::now();
            if now >= deadline {
                return Err(BridgeError::TransformTimeout {
                    target: target.to_owned(),
                    source_frame: source.to_owned(),
                    timeout,
                });
            }
            tree = self
                .inner
                .1
                .wait_timeout(tree, deadline - now)
                .unwrap_or_else(|poisoned| poisoned.into_inner())
                .0;
        }
        Ok(())
    }
}
