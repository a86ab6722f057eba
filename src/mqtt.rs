use log::*;
use rumqtt::{MqttClient, MqttOptions, Notification, QoS, ReconnectOptions};
use std::thread;

use crate::error::BridgeError;

#[derive(Debug, Clone)]
pub struct MqttSettings {
    pub host: String,
    pub port: u16,
    /// Prepended to every client id, must be unique per bridge on a broker
    pub client_prefix: String,
}

impl Default for MqttSettings {
    fn default() -> Self {
        Self {
            host: String::from("localhost"),
            port: 1883,
            client_prefix: String::from("sim_bridge"),
        }
    }
}

impl MqttSettings {
    pub fn client_id(&self, role: &str) -> String {
        format!("{}_{}", self.client_prefix, role)
    }
}

/// Connect, subscribe to `topics` and hand every publish to `handler` on a
/// single dispatch thread. The client lives as long as that thread.
pub fn spawn_subscriber<F>(
    settings: &MqttSettings,
    role: &str,
    topics: &[String],
    mut handler: F,
) -> Result<(), BridgeError>
where
    F: FnMut(&str, &[u8]) + Send + 'static,
{
    let client_id = settings.client_id(role);
    let mqtt_options = MqttOptions::new(client_id.as_str(), settings.host.as_str(), settings.port)
        .set_reconnect_opts(ReconnectOptions::Always(5));
    let (mut mqtt_client, notifications) = MqttClient::start(mqtt_options)
        .map_err(|error| BridgeError::Mqtt(format!("{:?}", error)))?;
    info!("Connected to MQTT as {}", client_id);

    for topic_name in topics {
        mqtt_client
            .subscribe(topic_name.to_owned(), QoS::AtMostOnce)
            .map_err(|error| BridgeError::Mqtt(format!("{:?}", error)))?;
        trace!("Subscribing to {}", topic_name);
    }

    thread::spawn(move || {
        let _mqtt_client = mqtt_client;
        for notification in notifications {
            if let Notification::Publish(message) = notification {
                handler(message.topic_name.as_str(), message.payload.as_slice());
            }
        }
        warn!("MQTT notification stream closed");
    });
    Ok(())
}
