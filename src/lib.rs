pub mod bootstrap;
pub mod config;
pub mod data;
pub mod error;
pub mod frames;
pub mod mqtt;
pub mod reference;
pub mod services;
pub mod sync;
pub mod telemetry;
pub mod transforms;

#[cfg(test)]
mod fakes;
