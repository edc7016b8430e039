use std::num::NonZeroUsize;
use std::sync::Arc;
use lru::LruCache;
use tokio::sync::Mutex;
use twilight_http::client::Client as TwiClient;
use twilight_http::request::channel::reaction::RequestReactionType;
use twilight_http::request::AuditLogReason;
use twilight_model::channel::message::embed::Embed;
use twilight_model::channel::Channel;
use twilight_model::guild::{Member, Role};
use twilight_model::user::User;

use super::*;

const CHANNEL_NAME_CACHE_SIZE: usize = 100;

#[derive(Clone)]
pub struct Client {
    client: Arc<TwiClient>,
    channel_names: Arc<Mutex<LruCache<ChannelId, String>>>,
}

impl Client {
    pub fn new(discord_token: &str) -> Self {
        let cache_size = NonZeroUsize::new(CHANNEL_NAME_CACHE_SIZE).unwrap_or(NonZeroUsize::MIN);

        Self {
            client: Arc::new(TwiClient::new(discord_token.to_string())),
            channel_names: Arc::new(Mutex::new(LruCache::new(cache_size))),
        }
    }

    pub async fn create_message(&self, channel_id: ChannelId, content: &str) -> Result<TwiMessage, FrameworkError> {
        let message = self.client
            .create_message(channel_id)
            .content(content)?
            .await?
            .model()
            .await?;

        Ok(message)
    }

    pub async fn create_embed_message(&self, channel_id: ChannelId, embed: &Embed) -> Result<TwiMessage, FrameworkError> {
        let embeds = [embed.clone()];
        let message = self.client
            .create_message(channel_id)
            .embeds(&embeds)?
            .await?
            .model()
            .await?;

        Ok(message)
    }

    pub async fn update_message(&self, channel_id: ChannelId, message_id: MessageId, content: &str) -> Result<TwiMessage, FrameworkError> {
        let message = self.client
            .update_message(channel_id, message_id)
            .content(Some(content))?
            .await?
            .model()
            .await?;

        Ok(message)
    }

    pub async fn update_embed_message(&self, channel_id: ChannelId, message_id: MessageId, embed: &Embed) -> Result<TwiMessage, FrameworkError> {
        let embeds = [embed.clone()];
        let message = self.client
            .update_message(channel_id, message_id)
            .embeds(Some(embeds.as_slice()))?
            .await?
            .model()
            .await?;

        Ok(message)
    }

    pub async fn delete_message(&self, channel_id: ChannelId, message_id: MessageId, reason: &str) -> Result<(), FrameworkError> {
        self.client
            .delete_message(channel_id, message_id)
            .reason(reason)?
            .await?;

        Ok(())
    }

    pub async fn fetch_message(&self, channel_id: ChannelId, message_id: MessageId) -> Result<TwiMessage, FrameworkError> {
        let message = self.client
            .message(channel_id, message_id)
            .await?
            .model()
            .await?;

        Ok(message)
    }

    /// Up to `limit` messages, newest first, optionally strictly older than `before`.
    pub async fn channel_messages(&self, channel_id: ChannelId, before: Option<MessageId>, limit: u16) -> Result<Vec<TwiMessage>, FrameworkError> {
        let request = self.client.channel_messages(channel_id);

        let messages = match before {
            Some(before) => request.before(before).limit(limit)?.await?.models().await?,
            None => request.limit(limit)?.await?.models().await?,
        };

        Ok(messages)
    }

    pub async fn fetch_channel(&self, channel_id: ChannelId) -> Result<Channel, FrameworkError> {
        let channel = self.client.channel(channel_id).await?.model().await?;

        if let Some(name) = &channel.name {
            self.channel_names.lock().await.put(channel_id, name.clone());
        }

        Ok(channel)
    }

    /// Name used in log lines. Falls back to the ID when the channel can't be fetched or has no name.
    pub async fn channel_name(&self, channel_id: ChannelId) -> String {
        if let Some(name) = self.channel_names.lock().await.get(&channel_id) {
            return name.clone()
        }

        match self.fetch_channel(channel_id).await {
            Ok(Channel { name: Some(name), .. }) => name,
            _ => channel_id.to_string(),
        }
    }

    pub async fn private_channel(&self, user_id: UserId) -> Result<ChannelId, FrameworkError> {
        let channel = self.client
            .create_private_channel(user_id)
            .await?
            .model()
            .await?;

        Ok(channel.id)
    }

    pub async fn fetch_user(&self, user_id: UserId) -> Result<User, FrameworkError> {
        Ok(self.client.user(user_id).await?.model().await?)
    }

    pub async fn fetch_member(&self, guild_id: GuildId, user_id: UserId) -> Result<Member, FrameworkError> {
        Ok(self.client.guild_member(guild_id, user_id).await?.model().await?)
    }

    pub async fn fetch_roles(&self, guild_id: GuildId) -> Result<Vec<Role>, FrameworkError> {
        Ok(self.client.roles(guild_id).await?.models().await?)
    }

    pub async fn react_message(&self, channel_id: ChannelId, message_id: MessageId, react: &'_ RequestReactionType<'_>) -> Result<(), FrameworkError> {
        self.client.create_reaction(channel_id, message_id, react).await?;

        Ok(())
    }

    pub async fn remove_reaction(&self, channel_id: ChannelId, message_id: MessageId, react: &'_ RequestReactionType<'_>, user_id: UserId) -> Result<(), FrameworkError> {
        self.client.delete_reaction(channel_id, message_id, react, user_id).await?;

        Ok(())
    }
}
