pub mod client;
pub mod router;

pub use router::build;

pub(crate) use self::router::{Sender, State};
