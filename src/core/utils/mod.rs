pub mod rand;
pub mod time;

pub use self::{rand::random_string, time::millis_since_unix_epoch};
