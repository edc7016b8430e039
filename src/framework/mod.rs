use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc::{channel, Receiver};
use tokio::sync::{Mutex, RwLock};
use tokio::task::JoinHandle;
use tracing::{error, info};
use twilight_gateway::Event;
use twilight_http::request::channel::reaction::RequestReactionType;
use twilight_model::channel::message::ReactionType;
use twilight_model::gateway::GatewayReaction;

use crate::config::Config;

mod bot;
mod error;
mod hooks;
mod messages;
mod reaction;
mod scheduler;
mod types;
mod utilities;

use bot::Bot;
pub use error::FrameworkError;
pub use hooks::EventHooks;
pub use reaction::{emoji_name, MessageBody, ReactionDecision, ReactionEvent, ReactionHandler, ReactionMessage, ReactionRegistry};
pub use scheduler::{ScheduledTask, Scheduler};
pub use types::*;
pub use utilities::{display_name, display_name_without_emotes, truncate_content, MESSAGE_CONTENT_LIMIT};

const GATEWAY_CHANNEL_CAPACITY: usize = 100;

/// Convenience layer over a twilight HTTP client and gateway shard.
#[derive(Clone)]
pub struct Framework {
    bot: Bot,
    reactions: Arc<Mutex<ReactionRegistry>>,
    scheduler: Scheduler,
    hooks: EventHooks,
    connected: Arc<AtomicBool>,
    current_user: Arc<RwLock<Option<UserId>>>,
    timed_message_delay: Duration,
}

impl Framework {
    pub fn new(config: &Config) -> Result<Self, FrameworkError> {
        if config.discord_token.trim().is_empty() {
            error!("Missing Discord token");
            return Err(FrameworkError::MissingToken)
        }

        Ok(Self {
            bot: Bot::new(&config.discord_token),
            reactions: Arc::new(Mutex::new(ReactionRegistry::new())),
            scheduler: Scheduler::new(),
            hooks: EventHooks::new(),
            connected: Arc::new(AtomicBool::new(false)),
            current_user: Arc::new(RwLock::new(None)),
            timed_message_delay: config.timed_message_delay(),
        })
    }

    pub fn start(&self) -> JoinHandle<()> {
        info!("Discord bot is starting");

        let (tx, rx) = channel::<GatewayEvent>(GATEWAY_CHANNEL_CAPACITY);
        self.bot.start(tx);

        self.clone().start_dispatch_task(rx)
    }

    pub fn is_connected(&self) -> bool {
        self.connected.load(Ordering::SeqCst)
    }

    pub async fn current_user_id(&self) -> Option<UserId> {
        *self.current_user.read().await
    }

    pub fn hooks(&self) -> &EventHooks {
        &self.hooks
    }

    pub fn scheduler(&self) -> &Scheduler {
        &self.scheduler
    }

    pub fn reactions(&self) -> &Arc<Mutex<ReactionRegistry>> {
        &self.reactions
    }

    pub async fn subscribe(&self, capacity: usize) -> Receiver<FrameworkEvent> {
        self.hooks.subscribe(capacity).await
    }

    fn ensure_connected(&self) -> Result<(), FrameworkError> {
        if self.is_connected() {
            Ok(())
        } else {
            Err(FrameworkError::NotConnected)
        }
    }

    async fn output(&self, kind: OutputKind, message: String) {
        match kind {
            OutputKind::Info => info!("{}", message),
            OutputKind::Error => error!("{}", message),
        }

        self.hooks.trigger(FrameworkEvent::Output { kind, message }).await;
    }

    /// Logs a failed request and notifies hook subscribers, then hands the error back.
    async fn report(&self, context: &str, err: FrameworkError) -> FrameworkError {
        self.output(OutputKind::Error, format!("{}, error: {}", context, err)).await;

        if err.is_missing_permissions() {
            self.output(OutputKind::Error, format!("{}: the bot is missing permissions", context)).await;
        }

        self.hooks
            .trigger(FrameworkEvent::MessageError {
                message: format!("{}: {}", context, err),
                status: err.status(),
            })
            .await;

        err
    }

    async fn checked<T>(&self, context: &str, result: Result<T, FrameworkError>) -> Result<T, FrameworkError> {
        match result {
            Ok(value) => Ok(value),
            Err(err) => Err(self.report(context, err).await),
        }
    }

    fn start_dispatch_task(self, mut events: Receiver<GatewayEvent>) -> JoinHandle<()> {
        tokio::spawn(async move {
            while let Some(event) = events.recv().await {
                match event {
                    GatewayEvent::Connected(user_id, name) => {
                        *self.current_user.write().await = Some(user_id);
                        self.connected.store(true, Ordering::SeqCst);
                        self.output(OutputKind::Info, format!("Discord bot has been fully started as {}", name)).await;
                        self.hooks.trigger(FrameworkEvent::Connected { user_id }).await;
                    },
                    GatewayEvent::Error(message) => {
                        self.output(OutputKind::Error, format!("Gateway ran into an error: {}", message)).await;
                    },
                    GatewayEvent::Closed => {
                        self.connected.store(false, Ordering::SeqCst);
                        self.scheduler.shutdown();
                        self.output(OutputKind::Error, "Gateway connection closed".to_string()).await;
                        self.hooks.trigger(FrameworkEvent::GatewayClosed).await;
                        break;
                    },
                    GatewayEvent::Event(event) => {
                        self.handle_event(&event).await;
                        self.hooks.trigger(FrameworkEvent::Gateway(Box::new(event))).await;
                    },
                }
            }
        })
    }

    async fn handle_event(&self, event: &Event) {
        match event {
            Event::ReactionAdd(reaction_add) => {
                if let Err(err) = self.on_reaction_add(&reaction_add.0).await {
                    self.output(OutputKind::Error, format!("Error while processing reaction add: {}", err)).await;
                }
            },
            Event::ReactionRemove(reaction_remove) => {
                self.on_reaction_remove(&reaction_remove.0).await;
            },
            Event::MessageDelete(message_delete) => {
                self.reactions.lock().await.untrack(message_delete.id);
            },
            Event::MessageDeleteBulk(message_delete_bulk) => {
                self.reactions.lock().await.untrack_many(&message_delete_bulk.ids);
            },
            _ => (),
        }
    }

    async fn is_bot_reaction(&self, reaction: &GatewayReaction) -> bool {
        let from_bot_member = reaction
            .member
            .as_ref()
            .map_or(false, |member| member.user.bot);

        from_bot_member || self.current_user_id().await == Some(reaction.user_id)
    }

    async fn on_reaction_add(&self, reaction: &GatewayReaction) -> Result<(), FrameworkError> {
        if self.is_bot_reaction(reaction).await {
            return Ok(())
        }

        let decision = { self.reactions.lock().await.decide(reaction.message_id, &reaction.emoji) };

        match decision {
            ReactionDecision::Untracked => Ok(()),
            ReactionDecision::Accept(message) => {
                self.clear_user_reactions(reaction.channel_id, reaction.message_id, message.reactions(), reaction.user_id)
                    .await?;
                message.on_add_reaction(&reaction_event(reaction));
                Ok(())
            },
            ReactionDecision::Reject => {
                let react = request_reaction_type(&reaction.emoji);
                self.bot
                    .client()
                    .remove_reaction(reaction.channel_id, reaction.message_id, &react, reaction.user_id)
                    .await
            },
        }
    }

    async fn on_reaction_remove(&self, reaction: &GatewayReaction) {
        if self.is_bot_reaction(reaction).await {
            return
        }

        let decision = { self.reactions.lock().await.decide(reaction.message_id, &reaction.emoji) };

        if let ReactionDecision::Accept(message) = decision {
            message.on_remove_reaction(&reaction_event(reaction));
        }
    }
}

fn reaction_event(reaction: &GatewayReaction) -> ReactionEvent {
    ReactionEvent {
        channel_id: reaction.channel_id,
        message_id: reaction.message_id,
        user_id: reaction.user_id,
        guild_id: reaction.guild_id,
        emoji: emoji_name(&reaction.emoji),
    }
}

fn request_reaction_type(emoji: &ReactionType) -> RequestReactionType<'_> {
    match emoji {
        ReactionType::Unicode { name } => RequestReactionType::Unicode { name: name.as_str() },
        ReactionType::Custom { id, name, .. } => RequestReactionType::Custom {
            id: *id,
            name: name.as_deref(),
        },
    }
}
