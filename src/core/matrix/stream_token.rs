use std::{fmt, str::FromStr};

use serde::{Deserialize, Deserializer, Serialize, Serializer, de};

use crate::{Err, Error, Result};

/// Composite cursor across the three event streams, string form
/// `s<messages>_<presence>_<typing>`.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct StreamToken {
	pub messages: u64,
	pub presence: u64,
	pub typing: u64,
}

impl StreamToken {
	#[must_use]
	pub const fn new(messages: u64, presence: u64, typing: u64) -> Self {
		Self { messages, presence, typing }
	}
}

impl fmt::Display for StreamToken {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "s{}_{}_{}", self.messages, self.presence, self.typing)
	}
}

impl FromStr for StreamToken {
	type Err = Error;

	fn from_str(s: &str) -> Result<Self> {
		let Some(rest) = s.strip_prefix('s') else {
			return Err!(Request(BadQuery("stream token '{s}' should start with 's'")));
		};

		let mut parts = rest.splitn(3, '_').map(|part| {
			part.parse::<u64>()
				.map_err(|e| crate::err!(Request(BadQuery("invalid stream token '{s}': {e}"))))
		});

		let (Some(messages), Some(presence), Some(typing)) =
			(parts.next(), parts.next(), parts.next())
		else {
			return Err!(Request(BadQuery(
				"stream token '{s}' should have three '_'-separated indices"
			)));
		};

		Ok(Self::new(messages?, presence?, typing?))
	}
}

impl Serialize for StreamToken {
	fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
		serializer.collect_str(self)
	}
}

impl<'de> Deserialize<'de> for StreamToken {
	fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
		let s = std::borrow::Cow::<'de, str>::deserialize(deserializer)?;
		s.parse().map_err(de::Error::custom)
	}
}
