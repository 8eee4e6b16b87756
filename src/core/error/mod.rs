mod err;
mod response;

use std::borrow::Cow;

use http::StatusCode;

pub type Result<T = (), E = Error> = std::result::Result<T, E>;

#[derive(thiserror::Error)]
pub enum Error {
	// std
	#[error(transparent)]
	Fmt(#[from] std::fmt::Error),
	#[error(transparent)]
	FromUtf8(#[from] std::string::FromUtf8Error),
	#[error("I/O error: {0}")]
	Io(#[from] std::io::Error),
	#[error(transparent)]
	ParseInt(#[from] std::num::ParseIntError),
	#[error(transparent)]
	Utf8(#[from] std::str::Utf8Error),

	// third-party
	#[error(transparent)]
	Clap(#[from] clap::error::Error),
	#[error(transparent)]
	Figment(#[from] figment::error::Error),
	#[error(transparent)]
	Http(#[from] http::Error),
	#[error("Join error: {0}")]
	JoinError(#[from] tokio::task::JoinError),
	#[error(transparent)]
	Json(#[from] serde_json::Error),
	#[error("Mutex poisoned: {0}")]
	Poison(Cow<'static, str>),

	// palaver
	#[error("There was a problem with the '{0}' directive in your configuration: {1}")]
	Config(&'static str, Cow<'static, str>),
	#[error("{1}")]
	Request(ErrorKind, Cow<'static, str>),

	// unique / untyped
	#[error("{0}")]
	Err(Cow<'static, str>),
}

/// The client-facing error taxonomy. Every kind maps onto one `errcode`
/// string and one HTTP status.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ErrorKind {
	Unrecognized,
	NotFound,
	UserInUse,
	RoomInUse,
	Forbidden,
	MissingToken,
	UnknownToken,
	BadJson,
	NotJson,
	BadParam,
	BadQuery,
	ServerError,
}

impl ErrorKind {
	#[must_use]
	pub fn errcode(&self) -> &'static str {
		match self {
			| Self::Unrecognized => "M_UNRECOGNIZED",
			| Self::NotFound => "NOT_FOUND",
			| Self::UserInUse => "M_USER_IN_USE",
			| Self::RoomInUse => "M_ROOM_IN_USE",
			| Self::Forbidden => "M_FORBIDDEN",
			| Self::MissingToken => "M_MISSING_TOKEN",
			| Self::UnknownToken => "M_UNKNOWN_TOKEN",
			| Self::BadJson => "M_BAD_JSON",
			| Self::NotJson => "M_NOT_JSON",
			| Self::BadParam => "M_BAD_PARAM",
			| Self::BadQuery => "M_BAD_QUERY",
			| Self::ServerError => "M_SERVER_ERROR",
		}
	}

	#[must_use]
	pub fn status_code(&self) -> StatusCode {
		match self {
			| Self::Unrecognized | Self::NotFound => StatusCode::NOT_FOUND,
			| Self::Forbidden | Self::MissingToken | Self::UnknownToken => StatusCode::FORBIDDEN,
			| Self::ServerError => StatusCode::INTERNAL_SERVER_ERROR,
			| _ => StatusCode::BAD_REQUEST,
		}
	}
}

impl Error {
	/// Generate the error message string.
	#[must_use]
	pub fn message(&self) -> String { format!("{self}") }

	/// Returns the error kind; anything that is not a policy rejection is an
	/// internal error from the client's point of view.
	#[inline]
	#[must_use]
	pub fn kind(&self) -> ErrorKind {
		match self {
			| Self::Request(kind, ..) => *kind,
			| _ => ErrorKind::ServerError,
		}
	}

	/// Returns the HTTP status code for the error variant.
	#[must_use]
	pub fn status_code(&self) -> StatusCode { self.kind().status_code() }

	#[inline]
	#[must_use]
	pub fn is_not_found(&self) -> bool { self.status_code() == StatusCode::NOT_FOUND }
}

impl std::fmt::Debug for Error {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		write!(f, "{}", self.message())
	}
}

impl<T> From<std::sync::PoisonError<T>> for Error {
	#[cold]
	#[inline(never)]
	fn from(e: std::sync::PoisonError<T>) -> Self { Self::Poison(e.to_string().into()) }
}
