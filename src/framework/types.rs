pub use twilight_model::channel::Message as TwiMessage;
use twilight_gateway::Event;
use twilight_model::id::marker::{ChannelMarker, GuildMarker, MessageMarker, RoleMarker, UserMarker};
use twilight_model::id::Id;

pub type MessageId = Id<MessageMarker>;
pub type ChannelId = Id<ChannelMarker>;
pub type UserId = Id<UserMarker>;
pub type GuildId = Id<GuildMarker>;
pub type RoleId = Id<RoleMarker>;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum OutputKind {
    Info,
    Error,
}

/// Emitted by the gateway task towards the framework's dispatch loop.
pub enum GatewayEvent {
    Connected(UserId, String),
    Error(String),
    Closed,
    Event(Event),
}

/// Delivered to every hook subscriber.
#[derive(Clone, Debug)]
pub enum FrameworkEvent {
    Output {
        kind: OutputKind,
        message: String,
    },
    Connected {
        user_id: UserId,
    },
    MessageError {
        message: String,
        status: Option<u16>,
    },
    GatewayClosed,
    Gateway(Box<Event>),
}
