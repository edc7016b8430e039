use std::time::Duration;
use futures::future::join_all;
use twilight_http::request::channel::reaction::RequestReactionType;
use twilight_model::channel::message::embed::Embed;

use super::*;

const TIMED_DELETE_REASON: &str = "Timed Message Delete";
const PURGE_REASON: &str = "Channel purge";
const PURGE_PAGE_SIZE: u16 = 100;

impl Framework {
    pub async fn send_message(&self, channel_id: ChannelId, content: &str) -> Result<TwiMessage, FrameworkError> {
        self.ensure_connected()?;
        let content = truncate_content(content);
        let channel_name = self.bot.client().channel_name(channel_id).await;

        self.output(OutputKind::Info, format!("Attempting to send message to channel {}: {}", channel_name, content)).await;

        let result = self.bot.client().create_message(channel_id, &content).await;
        self.checked("Message could not be sent", result).await
    }

    pub async fn send_private_message(&self, user_id: UserId, content: &str) -> Result<TwiMessage, FrameworkError> {
        self.ensure_connected()?;
        let content = truncate_content(content);

        self.output(OutputKind::Info, format!("Attempting to send private message to user {}: {}", user_id, content)).await;

        let result = match self.bot.client().private_channel(user_id).await {
            Ok(channel_id) => self.bot.client().create_message(channel_id, &content).await,
            Err(err) => Err(err),
        };

        let context = format!("Private message to user {} could not be sent", user_id);
        self.checked(&context, result).await
    }

    pub async fn send_embedded_message(&self, channel_id: ChannelId, embed: &Embed) -> Result<TwiMessage, FrameworkError> {
        self.ensure_connected()?;
        let channel_name = self.bot.client().channel_name(channel_id).await;

        self.output(OutputKind::Info, format!("Attempting to send embedded message to channel {}", channel_name)).await;

        let result = self.bot.client().create_embed_message(channel_id, embed).await;
        self.checked("Embedded message could not be sent", result).await
    }

    /// Sends the message, adds its reactions in order and starts routing reactions to its handler.
    pub async fn send_reaction_message(&self, channel_id: ChannelId, reaction_message: ReactionMessage) -> Result<TwiMessage, FrameworkError> {
        let message = match reaction_message.body() {
            MessageBody::Text(content) => self.send_message(channel_id, content).await?,
            MessageBody::Embed(embed) => self.send_embedded_message(channel_id, embed).await?,
        };

        for reaction in reaction_message.reactions() {
            let react = RequestReactionType::Unicode { name: reaction.as_str() };
            let result = self.bot.client().react_message(channel_id, message.id, &react).await;
            self.checked(&format!("Reaction {} could not be added", reaction), result).await?;
        }

        self.reactions.lock().await.track(channel_id, message.id, reaction_message);

        Ok(message)
    }

    pub async fn send_timed_message(&self, channel_id: ChannelId, content: &str) -> Result<TwiMessage, FrameworkError> {
        self.send_timed_message_after(channel_id, content, self.timed_message_delay).await
    }

    pub async fn send_timed_message_after(&self, channel_id: ChannelId, content: &str, delay: Duration) -> Result<TwiMessage, FrameworkError> {
        let message = self.send_message(channel_id, content).await?;
        self.schedule_deletion(&message, delay);
        Ok(message)
    }

    pub async fn send_timed_embedded_message(&self, channel_id: ChannelId, embed: &Embed, delay: Duration) -> Result<TwiMessage, FrameworkError> {
        let message = self.send_embedded_message(channel_id, embed).await?;
        self.schedule_deletion(&message, delay);
        Ok(message)
    }

    pub async fn send_timed_reaction_message(&self, channel_id: ChannelId, reaction_message: ReactionMessage, delay: Duration) -> Result<TwiMessage, FrameworkError> {
        let message = self.send_reaction_message(channel_id, reaction_message).await?;
        self.schedule_deletion(&message, delay);
        Ok(message)
    }

    fn schedule_deletion(&self, message: &TwiMessage, delay: Duration) -> ScheduledTask {
        let framework = self.clone();
        let channel_id = message.channel_id;
        let message_id = message.id;

        self.scheduler.schedule(delay, async move {
            // Failures are already reported through the hooks.
            let _ = framework.delete_message(channel_id, message_id, TIMED_DELETE_REASON).await;
        })
    }

    pub async fn edit_message(&self, channel_id: ChannelId, message_id: MessageId, content: &str) -> Result<TwiMessage, FrameworkError> {
        self.ensure_connected()?;
        let content = truncate_content(content);
        let channel_name = self.bot.client().channel_name(channel_id).await;

        self.output(OutputKind::Info, format!("Attempting to edit message {} in {}: {}", message_id, channel_name, content)).await;

        let result = self.bot.client().update_message(channel_id, message_id, &content).await;
        self.checked("Message could not be edited", result).await
    }

    pub async fn edit_embedded_message(&self, channel_id: ChannelId, message_id: MessageId, embed: &Embed) -> Result<TwiMessage, FrameworkError> {
        self.ensure_connected()?;
        let channel_name = self.bot.client().channel_name(channel_id).await;

        self.output(OutputKind::Info, format!("Attempting to edit embedded message {} in {}", message_id, channel_name)).await;

        let result = self.bot.client().update_embed_message(channel_id, message_id, embed).await;
        self.checked("Embedded message could not be edited", result).await
    }

    pub async fn delete_message(&self, channel_id: ChannelId, message_id: MessageId, reason: &str) -> Result<(), FrameworkError> {
        self.ensure_connected()?;
        let channel_name = self.bot.client().channel_name(channel_id).await;

        self.output(OutputKind::Info, format!("Deleting message with id {} from {}", message_id, channel_name)).await;

        let result = self.bot.client().delete_message(channel_id, message_id, reason).await;

        if result.is_err() {
            self.output(OutputKind::Error, format!("Unable to delete a message in {}, please check the log for details", channel_name)).await;
        }

        self.checked("Message could not be deleted", result).await?;
        self.reactions.lock().await.untrack(message_id);

        Ok(())
    }

    /// Deletes each message, returning how many were actually removed.
    pub async fn delete_messages(&self, channel_id: ChannelId, message_ids: &[MessageId], reason: &str) -> Result<usize, FrameworkError> {
        self.ensure_connected()?;
        let channel_name = self.bot.client().channel_name(channel_id).await;

        self.reactions.lock().await.untrack_many(message_ids);
        self.output(OutputKind::Info, format!("Deleting {} messages from {}", message_ids.len(), channel_name)).await;

        Ok(self.delete_batch(channel_id, message_ids, reason).await)
    }

    /// Deletes every message in the channel, newest first.
    pub async fn purge_channel(&self, channel_id: ChannelId) -> Result<usize, FrameworkError> {
        self.ensure_connected()?;
        let channel_name = self.bot.client().channel_name(channel_id).await;

        self.output(OutputKind::Info, format!("Attempting to purge all messages in {}", channel_name)).await;

        let mut before = None;
        let mut deleted = 0;

        loop {
            let result = self.bot.client().channel_messages(channel_id, before, PURGE_PAGE_SIZE).await;
            let page = self.checked(&format!("Could not list messages in {}", channel_name), result).await?;

            let ids: Vec<MessageId> = page.iter().map(|message| message.id).collect();
            let Some(oldest) = ids.last().copied() else {
                break;
            };

            deleted += self.delete_batch(channel_id, &ids, PURGE_REASON).await;

            if ids.len() < PURGE_PAGE_SIZE as usize {
                break;
            }

            before = Some(oldest);
        }

        self.reactions.lock().await.untrack_channel(channel_id);
        self.output(OutputKind::Info, format!("Purged {} messages from {}", deleted, channel_name)).await;

        Ok(deleted)
    }

    async fn delete_batch(&self, channel_id: ChannelId, message_ids: &[MessageId], reason: &str) -> usize {
        let client = self.bot.client();
        let results = join_all(message_ids.iter().map(|message_id| {
            client.delete_message(channel_id, *message_id, reason)
        }))
        .await;

        let mut deleted = 0;

        for result in results {
            if self.checked("Message could not be deleted", result).await.is_ok() {
                deleted += 1;
            }
        }

        deleted
    }

    /// Removes every listed reaction the user has placed on the message.
    pub async fn clear_user_reactions(&self, channel_id: ChannelId, message_id: MessageId, reactions: &[String], user_id: UserId) -> Result<(), FrameworkError> {
        self.ensure_connected()?;

        self.output(OutputKind::Info, format!("Attempting to clear reactions of user {} on message {}", user_id, message_id)).await;

        for reaction in reactions {
            let react = RequestReactionType::Unicode { name: reaction.as_str() };
            let result = self.bot.client().remove_reaction(channel_id, message_id, &react, user_id).await;
            self.checked(&format!("Reaction {} could not be removed", reaction), result).await?;
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use twilight_model::id::Id;
    use twilight_util::builder::embed::EmbedBuilder;

    struct Silent;

    impl ReactionHandler for Silent {}

    fn framework() -> Framework {
        Framework::new(&Config::load(r#"discord_token = "token""#).unwrap()).unwrap()
    }

    #[tokio::test]
    async fn disconnected_sends_do_not_track_or_schedule() {
        let framework = framework();
        let message = ReactionMessage::text("poll", vec!["👍".to_string()], Vec::new(), Silent);

        let result = framework.send_timed_reaction_message(Id::new(1), message, Duration::from_secs(5)).await;

        assert!(matches!(result, Err(FrameworkError::NotConnected)));
        assert!(framework.reactions().lock().await.is_empty());
        assert_eq!(framework.scheduler().pending(), 0);
    }

    #[tokio::test]
    async fn every_operation_checks_the_connection() {
        let framework = framework();
        let embed = EmbedBuilder::new().title("t").build();
        let channel = Id::new(1);
        let message = Id::new(2);

        assert!(matches!(framework.send_private_message(Id::new(3), "hi").await, Err(FrameworkError::NotConnected)));
        assert!(matches!(framework.send_embedded_message(channel, &embed).await, Err(FrameworkError::NotConnected)));
        assert!(matches!(framework.edit_message(channel, message, "x").await, Err(FrameworkError::NotConnected)));
        assert!(matches!(framework.edit_embedded_message(channel, message, &embed).await, Err(FrameworkError::NotConnected)));
        assert!(matches!(framework.delete_messages(channel, &[message], "x").await, Err(FrameworkError::NotConnected)));
        assert!(matches!(framework.purge_channel(channel).await, Err(FrameworkError::NotConnected)));
        assert!(matches!(
            framework.clear_user_reactions(channel, message, &["👍".to_string()], Id::new(3)).await,
            Err(FrameworkError::NotConnected)
        ));
        assert!(matches!(framework.role_id_by_name(Id::new(4), "mods").await, Err(FrameworkError::NotConnected)));
        assert!(matches!(framework.member(Id::new(4), Id::new(3)).await, Err(FrameworkError::NotConnected)));
    }
}
