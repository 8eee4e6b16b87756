pub mod content;
pub mod event;
pub mod event_auth;
pub mod id;
pub mod power_levels;
pub mod room;
pub mod stream_token;
pub mod user;

pub use content::{Content, MemberContent, event_type};
pub use event::{Event, IndexedEvent, Message, PresenceEvent, State, Timestamp, TypingEvent};
pub use id::{Domain, EventId, Id, RoomAliasId, RoomId, Sigil, UserId};
pub use power_levels::PowerLevelsContent;
pub use room::{JoinRule, Membership, RoomDescription, Visibility};
pub use stream_token::StreamToken;
pub use user::{Presence, User, UserProfile, UserStatus};
