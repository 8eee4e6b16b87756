//! Identifier model. Every named entity is a `(sigil, localpart, domain)`
//! triple with the canonical string form `<sigil><localpart>:<domain>`.

use std::{
	fmt,
	sync::{Arc, OnceLock, RwLock},
};

use serde::{Deserialize, Deserializer, Serialize, Serializer, de};

use crate::{Err, Result};

/// Interned domain name. Domains recur across every identifier in the hot
/// maps, so they are compared as table indices rather than strings. The
/// table only ever grows; entries are leaked once and live for the process.
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct Domain(u32);

fn domain_table() -> &'static RwLock<Vec<&'static str>> {
	static DOMAINS: OnceLock<RwLock<Vec<&'static str>>> = OnceLock::new();
	DOMAINS.get_or_init(|| RwLock::new(Vec::new()))
}

impl Domain {
	#[must_use]
	pub fn intern(name: &str) -> Self {
		let mut table = domain_table().write().expect("locked for writing");
		if let Some(index) = table.iter().position(|entry| *entry == name) {
			return Self(u32::try_from(index).expect("domain table index fits u32"));
		}

		table.push(Box::leak(Box::<str>::from(name)));
		Self(u32::try_from(table.len() - 1).expect("domain table index fits u32"))
	}

	#[must_use]
	pub fn as_str(self) -> &'static str {
		domain_table().read().expect("locked")[self.0 as usize]
	}
}

impl fmt::Display for Domain {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { write!(f, "{}", self.as_str()) }
}

/// The leading character distinguishing the identifier class.
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub enum Sigil {
	User,
	Room,
	Event,
	Alias,
}

impl Sigil {
	#[must_use]
	pub fn as_char(self) -> char {
		match self {
			| Self::User => '@',
			| Self::Room => '!',
			| Self::Event => '$',
			| Self::Alias => '#',
		}
	}
}

/// Untyped identifier. The typed wrappers below are the public surface;
/// `Id` itself is the key type of the generic relation maps where user,
/// room, event and alias ids mix.
#[derive(Clone, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct Id {
	sigil: Sigil,
	localpart: Arc<str>,
	domain: Domain,
}

impl Id {
	/// Constructing an empty identifier is a programming error.
	#[must_use]
	pub fn new(sigil: Sigil, localpart: &str, domain: &str) -> Self {
		assert!(
			!localpart.is_empty() && !domain.is_empty(),
			"tried to construct an empty identifier"
		);

		Self {
			sigil,
			localpart: localpart.into(),
			domain: Domain::intern(domain),
		}
	}

	pub fn parse(s: &str, sigil: Sigil) -> Result<Self> {
		let Some(rest) = s.strip_prefix(sigil.as_char()) else {
			return Err!(Request(BadParam(
				"identifier '{s}' should start with '{}'",
				sigil.as_char()
			)));
		};

		let Some((localpart, domain)) = rest.split_once(':') else {
			return Err!(Request(BadParam("identifier '{s}' should contain a ':'")));
		};

		if domain.contains(':') {
			return Err!(Request(BadParam("identifier '{s}' should contain exactly one ':'")));
		}

		if localpart.is_empty() {
			return Err!(Request(BadParam("identifier '{s}' is missing its localpart")));
		}

		if domain.is_empty() {
			return Err!(Request(BadParam("identifier '{s}' is missing its domain")));
		}

		Ok(Self::new(sigil, localpart, domain))
	}

	#[inline]
	#[must_use]
	pub fn sigil(&self) -> Sigil { self.sigil }

	#[inline]
	#[must_use]
	pub fn localpart(&self) -> &str { &self.localpart }

	#[inline]
	#[must_use]
	pub fn domain(&self) -> Domain { self.domain }
}

impl fmt::Display for Id {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{}{}:{}", self.sigil.as_char(), self.localpart, self.domain)
	}
}

macro_rules! typed_id {
	($name:ident, $sigil:ident) => {
		#[derive(Clone, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
		pub struct $name(Id);

		impl $name {
			#[must_use]
			pub fn new(localpart: &str, domain: &str) -> Self {
				Self(Id::new(Sigil::$sigil, localpart, domain))
			}

			pub fn parse(s: &str) -> Result<Self> { Id::parse(s, Sigil::$sigil).map(Self) }

			#[inline]
			#[must_use]
			pub fn localpart(&self) -> &str { self.0.localpart() }

			#[inline]
			#[must_use]
			pub fn domain(&self) -> Domain { self.0.domain() }
		}

		impl From<$name> for Id {
			#[inline]
			fn from(id: $name) -> Self { id.0 }
		}

		impl From<&$name> for Id {
			#[inline]
			fn from(id: &$name) -> Self { id.0.clone() }
		}

		impl TryFrom<Id> for $name {
			type Error = crate::Error;

			fn try_from(id: Id) -> Result<Self> {
				match id.sigil() {
					| Sigil::$sigil => Ok(Self(id)),
					| sigil => Err!(Request(BadParam(
						"identifier '{id}' has sigil '{}', expected '{}'",
						sigil.as_char(),
						Sigil::$sigil.as_char()
					))),
				}
			}
		}

		impl AsRef<Id> for $name {
			#[inline]
			fn as_ref(&self) -> &Id { &self.0 }
		}

		impl fmt::Display for $name {
			fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { self.0.fmt(f) }
		}

		impl Serialize for $name {
			fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
				serializer.collect_str(self)
			}
		}

		impl<'de> Deserialize<'de> for $name {
			fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
				let s = std::borrow::Cow::<'de, str>::deserialize(deserializer)?;
				Self::parse(&s).map_err(de::Error::custom)
			}
		}
	};
}

typed_id!(UserId, User);
typed_id!(RoomId, Room);
typed_id!(EventId, Event);
typed_id!(RoomAliasId, Alias);

#[cfg(test)]
mod tests {
	use super::{Domain, EventId, RoomAliasId, RoomId, UserId};

	#[test]
	fn round_trips() {
		for s in ["@alice:example.org", "!abc123:example.org", "$ev:host", "#lobby:example.org"] {
			match s.chars().next().unwrap() {
				| '@' => assert_eq!(UserId::parse(s).unwrap().to_string(), s),
				| '!' => assert_eq!(RoomId::parse(s).unwrap().to_string(), s),
				| '$' => assert_eq!(EventId::parse(s).unwrap().to_string(), s),
				| '#' => assert_eq!(RoomAliasId::parse(s).unwrap().to_string(), s),
				| _ => unreachable!(),
			}
		}
	}

	#[test]
	fn rejects_malformed() {
		assert!(UserId::parse("!alice:example.org").is_err());
		assert!(UserId::parse("@alice").is_err());
		assert!(UserId::parse("@alice:").is_err());
		assert!(UserId::parse("@:example.org").is_err());
		assert!(UserId::parse("@alice:exa:mple.org").is_err());
		assert!(UserId::parse("").is_err());
	}

	#[test]
	fn domains_intern_to_the_same_index() {
		let a = UserId::parse("@alice:example.org").unwrap();
		let b = RoomId::parse("!roomroom:example.org").unwrap();
		assert_eq!(a.domain(), b.domain());
		assert_eq!(a.domain(), Domain::intern("example.org"));
		assert_eq!(a.domain().as_str(), "example.org");
	}

	#[test]
	fn equality_needs_all_components() {
		let a = UserId::parse("@alice:example.org").unwrap();
		assert_ne!(a, UserId::parse("@alice:example.com").unwrap());
		assert_ne!(a, UserId::parse("@bob:example.org").unwrap());
		assert_eq!(a, UserId::new("alice", "example.org"));
	}

	#[test]
	fn json_form_is_the_quoted_canonical_string() {
		let id = UserId::parse("@alice:example.org").unwrap();
		let json = serde_json::to_string(&id).unwrap();
		assert_eq!(json, "\"@alice:example.org\"");
		assert_eq!(serde_json::from_str::<UserId>(&json).unwrap(), id);
	}
}
