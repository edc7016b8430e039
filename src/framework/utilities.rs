use std::borrow::Cow;
use std::sync::LazyLock;
use regex::Regex;
use twilight_model::channel::Channel;
use twilight_model::guild::Member;
use twilight_model::user::User;

use super::{ChannelId, Framework, FrameworkError, GuildId, MessageId, RoleId, TwiMessage, UserId};

/// Discord rejects message content longer than this many characters.
pub const MESSAGE_CONTENT_LIMIT: usize = 2000;

static EMOTE_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"[^a-zA-Z0-9_]").unwrap()
});

pub fn truncate_content(content: &str) -> Cow<'_, str> {
    match content.char_indices().nth(MESSAGE_CONTENT_LIMIT) {
        Some((cut, _)) => Cow::Owned(content[..cut].to_string()),
        None => Cow::Borrowed(content),
    }
}

/// Guild nickname if set, otherwise the account name.
pub fn display_name(member: &Member) -> &str {
    member.nick.as_deref().unwrap_or(member.user.name.as_str())
}

pub fn display_name_without_emotes(member: &Member) -> String {
    strip_emotes(display_name(member))
}

fn strip_emotes(name: &str) -> String {
    EMOTE_REGEX.replace_all(name, "").into_owned()
}

fn find_role_id<'a>(roles: impl IntoIterator<Item = (RoleId, &'a str)>, name: &str) -> Option<RoleId> {
    roles
        .into_iter()
        .find(|(_, role_name)| role_name.to_lowercase() == name.to_lowercase())
        .map(|(id, _)| id)
}

impl Framework {
    pub async fn channel(&self, channel_id: ChannelId) -> Result<Channel, FrameworkError> {
        self.ensure_connected()?;
        self.bot.client().fetch_channel(channel_id).await
    }

    pub async fn message(&self, channel_id: ChannelId, message_id: MessageId) -> Result<TwiMessage, FrameworkError> {
        self.ensure_connected()?;
        self.bot.client().fetch_message(channel_id, message_id).await
    }

    pub async fn user(&self, user_id: UserId) -> Result<User, FrameworkError> {
        self.ensure_connected()?;
        self.bot.client().fetch_user(user_id).await
    }

    pub async fn member(&self, guild_id: GuildId, user_id: UserId) -> Result<Member, FrameworkError> {
        self.ensure_connected()?;

        match self.bot.client().fetch_member(guild_id, user_id).await {
            Err(err) if err.is_unknown_member() => Err(FrameworkError::MemberNotInGuild { guild_id, user_id }),
            result => result,
        }
    }

    pub async fn role_id_by_name(&self, guild_id: GuildId, name: &str) -> Result<RoleId, FrameworkError> {
        self.ensure_connected()?;
        let roles = self.bot.client().fetch_roles(guild_id).await?;

        find_role_id(roles.iter().map(|role| (role.id, role.name.as_str())), name)
            .ok_or_else(|| FrameworkError::RoleNotFound(name.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use twilight_model::id::Id;

    #[test]
    fn short_content_is_untouched() {
        assert!(matches!(truncate_content("hello"), Cow::Borrowed("hello")));
    }

    #[test]
    fn long_content_is_cut_at_the_limit() {
        let content = "a".repeat(MESSAGE_CONTENT_LIMIT + 50);
        assert_eq!(truncate_content(&content).len(), MESSAGE_CONTENT_LIMIT);

        let exact = "b".repeat(MESSAGE_CONTENT_LIMIT);
        assert!(matches!(truncate_content(&exact), Cow::Borrowed(_)));
    }

    #[test]
    fn truncation_counts_characters_not_bytes() {
        let content = "é".repeat(MESSAGE_CONTENT_LIMIT + 1);
        let truncated = truncate_content(&content);

        assert_eq!(truncated.chars().count(), MESSAGE_CONTENT_LIMIT);
        assert!(truncated.chars().all(|c| c == 'é'));
    }

    #[test]
    fn strips_emotes_and_punctuation() {
        assert_eq!(strip_emotes("🔥 Cool_Name 99!"), "Cool_Name99");
        assert_eq!(strip_emotes("🎉🎉"), "");
    }

    #[test]
    fn finds_roles_case_insensitively() {
        let roles = [(Id::new(1), "Moderators"), (Id::new(2), "Members")];

        assert_eq!(find_role_id(roles, "moderators"), Some(Id::new(1)));
        assert_eq!(find_role_id(roles, "MEMBERS"), Some(Id::new(2)));
        assert_eq!(find_role_id(roles, "admins"), None);
    }
}
