use std::time::Duration;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum BridgeError {
    #[error("failed to decode telemetry payload")]
    Decode(#[from] serde_json::Error),
    #[error("MQTT error: {0}")]
    Mqtt(String),
    #[error("gRPC transport error")]
    Transport(#[from] tonic::transport::Error),
    #[error("gRPC call failed")]
    Status(#[from] tonic::Status),
    #[error("failed to start async runtime")]
    Runtime(#[from] std::io::Error),
    #[error("service {service} did not become available within {timeout:?}")]
    ServiceWaitTimeout { service: String, timeout: Duration },
    #[error("no transform between {target} and {source_frame} after {timeout:?}")]
    TransformTimeout {
        target: String,
        source_frame: String,
        timeout: Duration,
    },
    #[error("GPS health insufficient - No local frame reference for height")]
    ReferenceRejected,
    #[error("{0} service is not available")]
    ServiceLost(String),
}
