use anyhow::{Context, Result};
use clap::Parser;
use log::*;
use simplelog::{Config as LogConfig, LevelFilter, TermLogger, TerminalMode};

use sim_bridge::bootstrap::Bridge;
use sim_bridge::config::Config;
use sim_bridge::services::{GrpcFlightControl, GrpcSimulator};
use sim_bridge::telemetry::MqttTelemetry;
use sim_bridge::transforms::TransformBuffer;

fn run(config: Config) -> Result<()> {
    let transforms = TransformBuffer::new();
    if let Err(err) = transforms.listen(&config.mqtt(), &config.tf_topic) {
        // readiness is advisory, bootstrap will time out waiting for it
        error!("Failed to subscribe to transforms: {}", err);
    }

    let bridge = Bridge {
        settings: config.settings(),
        simulator: Box::new(GrpcSimulator::new(config.simulator_addr)?),
        flight_control: Box::new(GrpcFlightControl::new(config.flight_control_addr)?),
        transforms: Box::new(transforms),
        telemetry: Box::new(MqttTelemetry::new(config.mqtt(), config.topics())),
    };

    let mut synchronizer = bridge.start().context("Bridge startup failed")?;
    synchronizer.run().context("Bridge stopped")?;
    Ok(())
}

fn main() {
    let config = Config::parse();
    let level = if config.verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    };
    if TermLogger::init(level, LogConfig::default(), TerminalMode::Mixed).is_err() {
        eprintln!("Failed to initialize logger");
    }

    if let Err(err) = run(config) {
        error!("{:#}", err);
        std::process::exit(1);
    }
}
