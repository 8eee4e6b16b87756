#![allow(refining_impl_trait)]

mod once_services;
mod service;
pub mod services;

pub mod globals;
pub mod membership;
pub mod presence;
pub mod rooms;
pub mod sync;
pub mod tokens;
pub mod users;

pub(crate) use once_services::OnceServices;
pub(crate) use service::{Args, Service};

pub use crate::services::Services;
