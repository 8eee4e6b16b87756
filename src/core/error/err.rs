//! Error construction macros. `err!` builds an [`Error`](super::Error),
//! `Err!` wraps it for direct return from a `Result` function.
//!
//! ```ignore
//! return Err!(Request(Forbidden("cannot ban self")));
//! let e = err!(Request(NotFound("room '{room_id}' doesn't exist")));
//! return Err!(Config("port", "{port} is out of range"));
//! ```

#[macro_export]
macro_rules! err {
	(Request($kind:ident($($args:tt)+))) => {
		$crate::error::Error::Request(
			$crate::error::ErrorKind::$kind,
			::std::format!($($args)+).into(),
		)
	};

	(Config($item:literal, $($args:tt)+)) => {
		$crate::error::Error::Config($item, ::std::format!($($args)+).into())
	};

	($($args:tt)+) => {
		$crate::error::Error::Err(::std::format!($($args)+).into())
	};
}

#[macro_export]
macro_rules! Err {
	($($args:tt)*) => {
		Err($crate::err!($($args)*))
	};
}
