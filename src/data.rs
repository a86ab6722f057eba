use serde::de::DeserializeOwned;
use serde::Deserialize;

use crate::error::BridgeError;

#[derive(Deserialize, Debug, Clone, Default)]
pub struct Header {
    #[serde(default)]
    pub stamp: f64,
    #[serde(default)]
    pub frame_id: String,
}

#[derive(Deserialize, Debug, Clone, Copy)]
pub struct Vector {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

#[derive(Deserialize, Debug, Clone, Copy)]
pub struct Quaternion {
    pub x: f64,
    pub y: f64,
    pub z: f64,
    pub w: f64,
}

/// Attitude sample as published on the attitude topic
#[derive(Deserialize, Debug, Clone)]
pub struct QuaternionStamped {
    #[serde(default)]
    pub header: Header,
    pub quaternion: Quaternion,
}

#[derive(Deserialize, Debug, Clone)]
pub struct Vector3Stamped {
    #[serde(default)]
    pub header: Header,
    pub vector: Vector,
}

#[derive(Deserialize, Debug, Clone)]
pub struct PointStamped {
    #[serde(default)]
    pub header: Header,
    pub point: Vector,
}

/// Only the frame relationship is used, the transform itself is ignored
#[derive(Deserialize, Debug, Clone)]
pub struct TransformStamped {
    pub header: Header,
    pub child_frame_id: String,
}

pub fn deserialize<T: DeserializeOwned>(data: &[u8]) -> Result<T, BridgeError> {
    Ok(serde_json::from_slice::<T>(data)?)
}
