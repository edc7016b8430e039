mod client;
mod gateway;

use tokio::sync::mpsc::Sender;

pub(crate) use super::error::FrameworkError;
pub(crate) use super::types::*;
use client::Client;
use gateway::Gateway;

/// The HTTP client and gateway shard for a single bot token.
#[derive(Clone)]
pub struct Bot {
    gateway: Gateway,
    client: Client,
}

impl Bot {
    pub fn new(discord_token: &str) -> Self {
        Self {
            gateway: Gateway::new(discord_token),
            client: Client::new(discord_token),
        }
    }

    pub fn start(&self, events: Sender<GatewayEvent>) {
        self.gateway.start_listening(events)
    }

    pub fn client(&self) -> &Client {
        &self.client
    }
}
