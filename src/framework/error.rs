use thiserror::Error;
use twilight_http::api_error::ApiError;
use twilight_http::error::ErrorType;

use super::{GuildId, UserId};

// Discord JSON error code for "Missing Permissions":
// https://discord.com/developers/docs/topics/opcodes-and-status-codes#json-json-error-codes
const MISSING_PERMISSIONS: u64 = 50013;
const UNKNOWN_MEMBER: u64 = 10007;

#[derive(Debug, Error)]
pub enum FrameworkError {
    #[error("client is not connected")]
    NotConnected,
    #[error("missing Discord token")]
    MissingToken,
    #[error("request failed: {0}")]
    Http(#[from] twilight_http::error::Error),
    #[error("could not deserialize response: {0}")]
    ResponseDeserialization(#[from] twilight_http::response::DeserializeBodyError),
    #[error("invalid message: {0}")]
    MessageValidation(#[from] twilight_validate::message::MessageValidationError),
    #[error("invalid request: {0}")]
    RequestValidation(#[from] twilight_validate::request::ValidationError),
    #[error("no role named {0}")]
    RoleNotFound(String),
    #[error("user {user_id} is not a member of guild {guild_id}")]
    MemberNotInGuild { guild_id: GuildId, user_id: UserId },
}

impl FrameworkError {
    pub fn status(&self) -> Option<u16> {
        match self {
            FrameworkError::Http(err) => match err.kind() {
                ErrorType::Response { status, .. } => Some(status.get()),
                _ => None,
            },
            _ => None,
        }
    }

    pub fn is_missing_permissions(&self) -> bool {
        self.api_code() == Some(MISSING_PERMISSIONS)
    }

    pub fn is_unknown_member(&self) -> bool {
        self.api_code() == Some(UNKNOWN_MEMBER)
    }

    fn api_code(&self) -> Option<u64> {
        match self {
            FrameworkError::Http(err) => match err.kind() {
                ErrorType::Response { error: ApiError::General(general), .. } => Some(general.code),
                _ => None,
            },
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn non_http_errors_have_no_status() {
        assert_eq!(FrameworkError::NotConnected.status(), None);
        assert_eq!(FrameworkError::RoleNotFound("mods".into()).status(), None);
        assert!(!FrameworkError::NotConnected.is_missing_permissions());
        assert!(!FrameworkError::NotConnected.is_unknown_member());
    }

    #[test]
    fn messages_name_the_failure() {
        assert_eq!(FrameworkError::NotConnected.to_string(), "client is not connected");
        assert_eq!(FrameworkError::RoleNotFound("mods".into()).to_string(), "no role named mods");

        let not_member = FrameworkError::MemberNotInGuild {
            guild_id: twilight_model::id::Id::new(7),
            user_id: twilight_model::id::Id::new(9),
        };
        assert_eq!(not_member.to_string(), "user 9 is not a member of guild 7");
        assert_eq!(not_member.status(), None);
    }
}
