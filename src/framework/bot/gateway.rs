use std::sync::Arc;
use tokio::sync::mpsc::Sender;
use tokio::sync::Mutex;
use tracing::{debug, warn};
use twilight_gateway::{Event, Intents, Shard, ShardId};

use super::GatewayEvent;

#[derive(Clone)]
pub struct Gateway {
    shard: Arc<Mutex<Shard>>,
}

impl Gateway {
    pub fn new(discord_token: &str) -> Self {
        let intents = Intents::GUILDS
            | Intents::GUILD_MESSAGES
            | Intents::GUILD_MESSAGE_REACTIONS
            | Intents::DIRECT_MESSAGES
            | Intents::DIRECT_MESSAGE_REACTIONS
            | Intents::MESSAGE_CONTENT;

        Self {
            shard: Arc::new(Mutex::new(Shard::new(
                ShardId::ONE,
                discord_token.to_string(),
                intents,
            ))),
        }
    }

    pub fn start_listening(&self, events: Sender<GatewayEvent>) {
        let shard = self.shard.clone();

        tokio::spawn(async move {
            loop {
                let next_event = { shard.lock().await.next_event().await };

                let forwarded = match next_event {
                    Err(source) => {
                        let fatal = source.is_fatal();
                        warn!(fatal, "Gateway receive error: {}", source);

                        if events.send(GatewayEvent::Error(source.to_string())).await.is_err() {
                            break;
                        }

                        if fatal {
                            let _ = events.send(GatewayEvent::Closed).await;
                            break;
                        }

                        continue;
                    },
                    Ok(Event::Ready(ready)) => {
                        debug!("Gateway ready for {}#{}", ready.user.name, ready.user.discriminator);
                        GatewayEvent::Connected(ready.user.id, ready.user.name.clone())
                    },
                    Ok(event) => GatewayEvent::Event(event),
                };

                if events.send(forwarded).await.is_err() {
                    debug!("Framework dispatcher has already closed, stopping gateway listener");
                    break;
                }
            }
        });
    }
}
