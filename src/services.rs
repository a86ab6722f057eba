use log::*;
use std::net::{SocketAddr, TcpStream};
use std::thread;
use std::time::{Duration, Instant};
use tokio::runtime::Runtime;
use tonic::transport::Channel;
use tonic::Request;

use crate::error::BridgeError;

pub mod proto {
    tonic::include_proto!("sim_bridge");
}

use proto::flight_control_client::FlightControlClient;
use proto::simulator_client::SimulatorClient;

const PROBE_TIMEOUT: Duration = Duration::from_millis(100);

pub trait ServiceProbe {
    fn name(&self) -> &str;
    fn exists(&mut self) -> bool;
}

pub trait SimulatorService: ServiceProbe {
    fn set_model_state(
        &mut self,
        model_state: proto::ModelState,
    ) -> Result<proto::SetModelStateResponse, BridgeError>;
}

pub trait ReferenceService: ServiceProbe {
    fn set_local_pos_ref(&mut self) -> Result<bool, BridgeError>;
}

/// Poll `service` until it exists. `None` waits forever.
pub fn wait_for_service<S: ServiceProbe + ?Sized>(
    service: &mut S,
    timeout: Option<Duration>,
    poll_interval: Duration,
) -> Result<(), BridgeError> {
    let start = Instant::now();
    let mut announced = false;
    while !service.exists() {
        if let Some(timeout) = timeout {
            if start.elapsed() >= timeout {
                return Err(BridgeError::ServiceWaitTimeout {
                    service: service.name().to_owned(),
                    timeout,
                });
            }
        }
        if !announced {
            info!("Waiting for service {}", service.name());
            announced = true;
        }
        thread::sleep(poll_interval);
    }
    debug!("Service {} is available", service.name());
    Ok(())
}

/// Reachability is a fresh TCP connect, independent of any cached gRPC
/// channel. Called every tick this opens and closes one connection per tick
/// next to the long lived channel; a broken channel still shows up as a
/// failed call and gets rebuilt on the next one.
fn probe(address: &SocketAddr) -> bool {
    TcpStream::connect_timeout(address, PROBE_TIMEOUT).is_ok()
}

/// Blocking wrapper around the simulator's gRPC service.
///
/// The channel is created on first use and kept while calls succeed, a
/// failed call drops it so the next one reconnects.
pub struct GrpcSimulator {
    address: SocketAddr,
    name: String,
    runtime: Runtime,
    client: Option<SimulatorClient<Channel>>,
}

impl GrpcSimulator {
    pub fn new(address: SocketAddr) -> Result<Self, BridgeError> {
        Ok(Self {
            address,
            name: format!("simulator/set_model_state@{}", address),
            runtime: Runtime::new()?,
            client: None,
        })
    }
}

impl ServiceProbe for GrpcSimulator {
    fn name(&self) -> &str {
        &self.name
    }

    fn exists(&mut self) -> bool {
        probe(&self.address)
    }
}

impl SimulatorService for GrpcSimulator {
    fn set_model_state(
        &mut self,
        model_state: proto::ModelState,
    ) -> Result<proto::SetModelStateResponse, BridgeError> {
        let address = format!("http://{}", self.address);
        let client = &mut self.client;
        self.runtime.block_on(async move {
            let mut connected = match client.take() {
                Some(connected) => connected,
                None => SimulatorClient::connect(address).await?,
            };
            let request = Request::new(proto::SetModelStateRequest {
                model_state: Some(model_state),
            });
            let response = connected.set_model_state(request).await?.into_inner();
            *client = Some(connected);
            Ok::<_, BridgeError>(response)
        })
    }
}

pub struct GrpcFlightControl {
    address: SocketAddr,
    name: String,
    runtime: Runtime,
}

impl GrpcFlightControl {
    pub fn new(address: SocketAddr) -> Result<Self, BridgeError> {
        Ok(Self {
            address,
            name: format!("flight_control/set_local_pos_ref@{}", address),
            runtime: Runtime::new()?,
        })
    }
}

impl ServiceProbe for GrpcFlightControl {
    fn name(&self) -> &str {
        &self.name
    }

    fn exists(&mut self) -> bool {
        probe(&self.address)
    }
}

impl ReferenceService for GrpcFlightControl {
    fn set_local_pos_ref(&mut self) -> Result<bool, BridgeError> {
        let address = format!("http://{}", self.address);
        self.runtime.block_on(async move {
            let mut client = FlightControlClient::connect(address).await?;
            let response = client
                .set_local_pos_ref(Request::new(proto::SetLocalPosRefRequest {}))
                .await?;
            Ok::<_, BridgeError>(response.into_inner().result)
        })
    }
}
