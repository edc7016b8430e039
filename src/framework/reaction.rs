use std::collections::HashMap;
use std::sync::Arc;
use twilight_model::channel::message::embed::Embed;
use twilight_model::channel::message::ReactionType;

use super::{ChannelId, GuildId, MessageId, UserId};

/// Callbacks for reactions on a tracked message. Both default to doing nothing.
pub trait ReactionHandler: Send + Sync {
    fn on_add_reaction(&self, _event: &ReactionEvent, _data: &[String]) {}

    fn on_remove_reaction(&self, _event: &ReactionEvent, _data: &[String]) {}
}

#[derive(Clone, Debug, PartialEq)]
pub struct ReactionEvent {
    pub channel_id: ChannelId,
    pub message_id: MessageId,
    pub user_id: UserId,
    pub guild_id: Option<GuildId>,
    pub emoji: String,
}

#[derive(Clone, Debug)]
pub enum MessageBody {
    Text(String),
    Embed(Embed),
}

/// A message whose listed reactions drive a handler once it has been sent.
#[derive(Clone)]
pub struct ReactionMessage {
    body: MessageBody,
    reactions: Vec<String>,
    data: Vec<String>,
    handler: Arc<dyn ReactionHandler>,
}

impl ReactionMessage {
    pub fn text(
        content: impl Into<String>,
        reactions: Vec<String>,
        data: Vec<String>,
        handler: impl ReactionHandler + 'static,
    ) -> Self {
        Self {
            body: MessageBody::Text(content.into()),
            reactions,
            data,
            handler: Arc::new(handler),
        }
    }

    pub fn embedded(
        embed: Embed,
        reactions: Vec<String>,
        data: Vec<String>,
        handler: impl ReactionHandler + 'static,
    ) -> Self {
        Self {
            body: MessageBody::Embed(embed),
            reactions,
            data,
            handler: Arc::new(handler),
        }
    }

    pub fn body(&self) -> &MessageBody {
        &self.body
    }

    pub fn reactions(&self) -> &[String] {
        &self.reactions
    }

    pub fn data(&self) -> &[String] {
        &self.data
    }

    pub fn accepts(&self, emoji: &str) -> bool {
        self.reactions.iter().any(|reaction| reaction == emoji)
    }

    pub fn on_add_reaction(&self, event: &ReactionEvent) {
        self.handler.on_add_reaction(event, &self.data);
    }

    pub fn on_remove_reaction(&self, event: &ReactionEvent) {
        self.handler.on_remove_reaction(event, &self.data);
    }
}

pub enum ReactionDecision {
    Untracked,
    Accept(Arc<ReactionMessage>),
    Reject,
}

struct TrackedMessage {
    channel_id: ChannelId,
    message: Arc<ReactionMessage>,
}

#[derive(Default)]
pub struct ReactionRegistry {
    messages: HashMap<MessageId, TrackedMessage>,
}

impl ReactionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn track(&mut self, channel_id: ChannelId, message_id: MessageId, message: ReactionMessage) {
        self.messages.insert(message_id, TrackedMessage {
            channel_id,
            message: Arc::new(message),
        });
    }

    pub fn get(&self, message_id: MessageId) -> Option<Arc<ReactionMessage>> {
        self.messages.get(&message_id).map(|tracked| tracked.message.clone())
    }

    pub fn contains(&self, message_id: MessageId) -> bool {
        self.messages.contains_key(&message_id)
    }

    pub fn untrack(&mut self, message_id: MessageId) -> bool {
        self.messages.remove(&message_id).is_some()
    }

    pub fn untrack_many(&mut self, message_ids: &[MessageId]) -> usize {
        message_ids.iter().filter(|message_id| self.untrack(**message_id)).count()
    }

    pub fn untrack_channel(&mut self, channel_id: ChannelId) -> usize {
        let before = self.messages.len();
        self.messages.retain(|_, tracked| tracked.channel_id != channel_id);
        before - self.messages.len()
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn decide(&self, message_id: MessageId, emoji: &ReactionType) -> ReactionDecision {
        let tracked = match self.messages.get(&message_id) {
            Some(tracked) => tracked,
            None => return ReactionDecision::Untracked,
        };

        match emoji {
            ReactionType::Unicode { name } if tracked.message.accepts(name) => {
                ReactionDecision::Accept(tracked.message.clone())
            },
            _ => ReactionDecision::Reject,
        }
    }
}

pub fn emoji_name(emoji: &ReactionType) -> String {
    match emoji {
        ReactionType::Unicode { name } => name.clone(),
        ReactionType::Custom { name, id, .. } => match name {
            Some(name) => format!("{}:{}", name, id),
            None => id.to_string(),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;
    use twilight_model::id::Id;
    use twilight_util::builder::embed::EmbedBuilder;

    #[derive(Default)]
    struct Recorder {
        added: Mutex<Vec<(String, Vec<String>)>>,
        removed: Mutex<Vec<String>>,
    }

    impl ReactionHandler for Arc<Recorder> {
        fn on_add_reaction(&self, event: &ReactionEvent, data: &[String]) {
            self.added.lock().unwrap().push((event.emoji.clone(), data.to_vec()));
        }

        fn on_remove_reaction(&self, event: &ReactionEvent, _data: &[String]) {
            self.removed.lock().unwrap().push(event.emoji.clone());
        }
    }

    struct Silent;

    impl ReactionHandler for Silent {}

    fn unicode(name: &str) -> ReactionType {
        ReactionType::Unicode { name: name.to_string() }
    }

    fn poll(handler: impl ReactionHandler + 'static) -> ReactionMessage {
        ReactionMessage::text(
            "Pick one",
            vec!["👍".to_string(), "👎".to_string()],
            vec!["poll-1".to_string()],
            handler,
        )
    }

    fn event(emoji: &str) -> ReactionEvent {
        ReactionEvent {
            channel_id: Id::new(1),
            message_id: Id::new(2),
            user_id: Id::new(3),
            guild_id: None,
            emoji: emoji.to_string(),
        }
    }

    #[test]
    fn untracked_message_is_ignored() {
        let registry = ReactionRegistry::new();
        assert!(matches!(registry.decide(Id::new(2), &unicode("👍")), ReactionDecision::Untracked));
    }

    #[test]
    fn listed_reaction_is_accepted_and_reaches_handler() {
        let recorder = Arc::new(Recorder::default());
        let mut registry = ReactionRegistry::new();
        registry.track(Id::new(1), Id::new(2), poll(recorder.clone()));

        match registry.decide(Id::new(2), &unicode("👎")) {
            ReactionDecision::Accept(message) => {
                assert_eq!(message.reactions(), ["👍", "👎"]);
                message.on_add_reaction(&event("👎"));
                message.on_remove_reaction(&event("👎"));
            },
            _ => panic!("expected accept"),
        }

        assert_eq!(
            *recorder.added.lock().unwrap(),
            vec![("👎".to_string(), vec!["poll-1".to_string()])]
        );
        assert_eq!(*recorder.removed.lock().unwrap(), vec!["👎".to_string()]);
    }

    #[test]
    fn unlisted_and_custom_reactions_are_rejected() {
        let mut registry = ReactionRegistry::new();
        registry.track(Id::new(1), Id::new(2), poll(Silent));

        assert!(matches!(registry.decide(Id::new(2), &unicode("🎉")), ReactionDecision::Reject));

        let custom = ReactionType::Custom {
            animated: false,
            id: Id::new(99),
            name: Some("👍".to_string()),
        };
        assert!(matches!(registry.decide(Id::new(2), &custom), ReactionDecision::Reject));
    }

    #[test]
    fn untracking_by_id_and_channel() {
        let mut registry = ReactionRegistry::new();
        registry.track(Id::new(1), Id::new(10), poll(Silent));
        registry.track(Id::new(1), Id::new(11), poll(Silent));
        registry.track(Id::new(5), Id::new(12), poll(Silent));
        assert_eq!(registry.len(), 3);

        assert!(registry.untrack(Id::new(10)));
        assert!(!registry.untrack(Id::new(10)));
        assert!(!registry.contains(Id::new(10)));

        assert_eq!(registry.untrack_channel(Id::new(1)), 1);
        assert_eq!(registry.untrack_many(&[Id::new(12), Id::new(13)]), 1);
        assert!(registry.is_empty());
    }

    #[test]
    fn embedded_messages_share_the_registry() {
        let embed = EmbedBuilder::new().title("Vote").description("Pick one").build();
        let message = ReactionMessage::embedded(embed, vec!["✅".to_string()], Vec::new(), Silent);

        let mut registry = ReactionRegistry::new();
        registry.track(Id::new(1), Id::new(2), message);

        let tracked = registry.get(Id::new(2)).unwrap();
        assert!(matches!(tracked.body(), MessageBody::Embed(embed) if embed.title.as_deref() == Some("Vote")));
        assert!(matches!(registry.decide(Id::new(2), &unicode("✅")), ReactionDecision::Accept(_)));
    }

    #[test]
    fn retracking_replaces_previous_entry() {
        let mut registry = ReactionRegistry::new();
        registry.track(Id::new(1), Id::new(2), poll(Silent));
        registry.track(
            Id::new(1),
            Id::new(2),
            ReactionMessage::text("Again", vec!["✅".to_string()], Vec::new(), Silent),
        );

        assert_eq!(registry.len(), 1);
        assert!(matches!(registry.decide(Id::new(2), &unicode("👍")), ReactionDecision::Reject));
    }

    #[test]
    fn emoji_names() {
        assert_eq!(emoji_name(&unicode("👍")), "👍");
        assert_eq!(
            emoji_name(&ReactionType::Custom { animated: false, id: Id::new(7), name: Some("blob".into()) }),
            "blob:7"
        );
    }
}
