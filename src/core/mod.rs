pub mod args;
pub mod config;
pub mod error;
pub mod matrix;
pub mod server;
pub mod utils;

pub use ::http;
pub use ::tracing;
pub use args::Args;
pub use config::Config;
pub use error::{Error, ErrorKind, Result};
pub use matrix::{
	Content, Event, EventId, Id, JoinRule, Membership, Message, PowerLevelsContent, RoomAliasId,
	RoomId, State, StreamToken, UserId, Visibility,
};
pub use palaver_macros::implement;
pub use server::Server;

pub use crate as palaver_core;
