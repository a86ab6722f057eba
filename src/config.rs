use clap::Parser;
use std::net::SocketAddr;
use std::time::Duration;

use crate::mqtt::MqttSettings;
use crate::telemetry::TelemetryTopics;

fn parse_rate(value: &str) -> Result<f64, String> {
    let hz: f64 = value.parse().map_err(|_| format!("{} is not a number", value))?;
    // the period has to be a representable duration too
    if hz.is_finite() && hz > 0. && Duration::try_from_secs_f64(1. / hz).is_ok() {
        Ok(hz)
    } else {
        Err(format!("rate must be a positive finite number of Hz, got {}", value))
    }
}

fn parse_seconds(value: &str) -> Result<f64, String> {
    let secs: f64 = value.parse().map_err(|_| format!("{} is not a number", value))?;
    if secs >= 0. && Duration::try_from_secs_f64(secs).is_ok() {
        Ok(secs)
    } else {
        Err(format!("{} is not a valid number of seconds", value))
    }
}

/// Bridge flight controller telemetry into simulator model state
#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
pub struct Config {
    /// Simulator model to drive
    #[arg(long, default_value = "dji_drone")]
    pub drone_model: String,

    /// Reference frame the model state is expressed in
    #[arg(long, default_value = "world")]
    pub reference_frame: String,

    /// Reset the flight controller's local position reference before bridging.
    /// Disable when another node sets the reference.
    #[arg(long, default_value_t = true, action = clap::ArgAction::Set, value_name = "BOOL")]
    pub set_local_pose: bool,

    #[arg(long, default_value = "localhost")]
    pub mqtt_host: String,

    #[arg(long, default_value_t = 1883)]
    pub mqtt_port: u16,

    #[arg(long, default_value = "dji_sdk/attitude")]
    pub attitude_topic: String,

    #[arg(long, default_value = "dji_sdk/velocity")]
    pub velocity_topic: String,

    #[arg(long, default_value = "dji_sdk/local_position")]
    pub local_position_topic: String,

    /// Topic carrying transform frame pairs
    #[arg(long, default_value = "tf")]
    pub tf_topic: String,

    /// Simulator gRPC endpoint
    #[arg(long, default_value = "127.0.0.1:50051", value_name = "HOST:PORT")]
    pub simulator_addr: SocketAddr,

    /// Flight controller gRPC endpoint
    #[arg(long, default_value = "127.0.0.1:50052", value_name = "HOST:PORT")]
    pub flight_control_addr: SocketAddr,

    /// Model state updates per second
    #[arg(long, default_value_t = 50.0, value_parser = parse_rate)]
    pub rate: f64,

    /// Frame whose transform to the model signals that localization is up
    #[arg(long, default_value = "led_link")]
    pub readiness_frame: String,

    /// Seconds to wait for the readiness transform
    #[arg(long, default_value_t = 100.0, value_name = "SECONDS", value_parser = parse_seconds)]
    pub transform_timeout: f64,

    /// Seconds to wait for services at startup, waits forever when unset
    #[arg(long, value_name = "SECONDS", value_parser = parse_seconds)]
    pub service_wait_timeout: Option<f64>,

    #[arg(short, long)]
    pub verbose: bool,
}

impl Config {
    pub fn settings(&self) -> BridgeSettings {
        BridgeSettings {
            model_name: self.drone_model.clone(),
            reference_frame: self.reference_frame.clone(),
            set_local_pose: self.set_local_pose,
            rate_hz: self.rate,
            readiness_frame: self.readiness_frame.clone(),
            transform_timeout: Duration::from_secs_f64(self.transform_timeout),
            service_wait_timeout: self
                .service_wait_timeout
                .map(Duration::from_secs_f64),
            ..BridgeSettings::default()
        }
    }

    pub fn mqtt(&self) -> MqttSettings {
        MqttSettings {
            host: self.mqtt_host.clone(),
            port: self.mqtt_port,
            client_prefix: format!("sim_bridge_{}", self.drone_model),
        }
    }

    pub fn topics(&self) -> TelemetryTopics {
        TelemetryTopics {
            attitude: self.attitude_topic.clone(),
            velocity: self.velocity_topic.clone(),
            local_position: self.local_position_topic.clone(),
        }
    }
}

/// Runtime settings shared by bootstrap and the synchronizer
#[derive(Debug, Clone)]
pub struct BridgeSettings {
    pub model_name: String,
    pub reference_frame: String,
    pub set_local_pose: bool,
    pub rate_hz: f64,
    pub readiness_frame: String,
    pub transform_timeout: Duration,
    pub service_wait_timeout: Option<Duration>,
    pub service_poll_interval: Duration,
}

impl Default for BridgeSettings {
    fn default() -> Self {
        Self {
            model_name: String::from("dji_drone"),
            reference_frame: String::from("world"),
            set_local_pose: true,
            rate_hz: 50.0,
            readiness_frame: String::from("led_link"),
            transform_timeout: Duration::from_secs(100),
            service_wait_timeout: None,
            service_poll_interval: Duration::from_millis(100),
        }
    }
}

impl BridgeSettings {
    pub fn model_frame(&self) -> String {
        format!("{}_base_link", self.model_name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::parse_from(["sim_bridge"]);
        let settings = config.settings();
        assert_eq!(settings.model_name, "dji_drone");
        assert_eq!(settings.reference_frame, "world");
        assert!(settings.set_local_pose);
        assert_eq!(settings.rate_hz, 50.0);
        assert_eq!(settings.transform_timeout, Duration::from_secs(100));
        assert_eq!(settings.service_wait_timeout, None);
        assert_eq!(settings.model_frame(), "dji_drone_base_link");
        assert_eq!(config.topics().attitude, "dji_sdk/attitude");
    }

    #[test]
    fn test_overrides() {
        let config = Config::parse_from([
            "sim_bridge",
            "--drone-model",
            "m100",
            "--reference-frame",
            "map",
            "--set-local-pose",
            "false",
            "--service-wait-timeout",
            "2.5",
            "--simulator-addr",
            "10.0.0.2:6000",
        ]);
        let settings = config.settings();
        assert_eq!(settings.model_name, "m100");
        assert_eq!(settings.model_frame(), "m100_base_link");
        assert_eq!(settings.reference_frame, "map");
        assert!(!settings.set_local_pose);
        assert_eq!(
            settings.service_wait_timeout,
            Some(Duration::from_millis(2500))
        );
        assert_eq!(config.simulator_addr.port(), 6000);
    }

    #[test]
    fn test_rejects_unusable_rate() {
        for rate in ["0", "-5", "inf", "NaN", "1e-320", "fast"] {
            let result = Config::try_parse_from(["sim_bridge", "--rate", rate]);
            assert!(result.is_err(), "rate {} was accepted", rate);
        }
        let config = Config::try_parse_from(["sim_bridge", "--rate", "12.5"]).unwrap();
        assert_eq!(config.settings().rate_hz, 12.5);
    }

    #[test]
    fn test_rejects_unusable_timeouts() {
        for secs in ["-1", "inf", "1e300", "NaN"] {
            assert!(
                Config::try_parse_from(["sim_bridge", "--transform-timeout", secs]).is_err(),
                "transform timeout {} was accepted",
                secs
            );
            assert!(
                Config::try_parse_from(["sim_bridge", "--service-wait-timeout", secs]).is_err(),
                "service wait timeout {} was accepted",
                secs
            );
        }
        let config = Config::try_parse_from(["sim_bridge", "--transform-timeout", "0"]).unwrap();
        assert_eq!(config.settings().transform_timeout, Duration::from_secs(0));
    }

    #[test]
    fn test_mqtt_client_ids_follow_model() {
        let m100 = Config::parse_from(["sim_bridge", "--drone-model", "m100"]).mqtt();
        let m600 = Config::parse_from(["sim_bridge", "--drone-model", "m600"]).mqtt();
        assert_eq!(m100.client_id("tf"), "sim_bridge_m100_tf");
        assert_ne!(m100.client_id("telemetry"), m600.client_id("telemetry"));
    }
}
