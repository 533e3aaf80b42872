//! Caller identity derived from a verified credential.

// std
use std::borrow::Borrow;
// self
use crate::_prelude::*;

const SUBJECT_MAX_LEN: usize = 128;

/// Error returned when subject validation fails.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, ThisError)]
pub enum SubjectError {
	/// The subject was empty or whitespace.
	#[error("Subject identifier cannot be empty.")]
	Empty,
	/// The subject contains whitespace characters.
	#[error("Subject identifier contains whitespace.")]
	ContainsWhitespace,
	/// The subject exceeded the allowed character count.
	#[error("Subject identifier exceeds {max} characters.")]
	TooLong {
		/// Maximum permitted character count.
		max: usize,
	},
}

/// Validated subject identifier issued by the identity provider.
#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Subject(String);
impl Subject {
	/// Creates a new subject after validation.
	pub fn new(value: impl AsRef<str>) -> Result<Self, SubjectError> {
		let view = value.as_ref();

		if view.trim().is_empty() {
			return Err(SubjectError::Empty);
		}
		if view.chars().any(char::is_whitespace) {
			return Err(SubjectError::ContainsWhitespace);
		}
		if view.chars().count() > SUBJECT_MAX_LEN {
			return Err(SubjectError::TooLong { max: SUBJECT_MAX_LEN });
		}

		Ok(Self(view.to_owned()))
	}
}
impl AsRef<str> for Subject {
	fn as_ref(&self) -> &str {
		&self.0
	}
}
impl Borrow<str> for Subject {
	fn borrow(&self) -> &str {
		&self.0
	}
}
impl From<Subject> for String {
	fn from(value: Subject) -> Self {
		value.0
	}
}
impl TryFrom<String> for Subject {
	type Error = SubjectError;

	fn try_from(value: String) -> Result<Self, Self::Error> {
		Self::new(&value)
	}
}
impl Debug for Subject {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		write!(f, "Subject({})", self.0)
	}
}
impl Display for Subject {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(&self.0)
	}
}

/// Identity derived fresh from one verified credential.
///
/// The gate never caches identities across requests; if an embedder wants identity
/// caching it owns that layer (and its invalidation story) itself.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
	/// Subject the provider attested.
	pub subject: Subject,
	/// Instant the credential was issued.
	pub issued_at: OffsetDateTime,
	/// Instant the credential expires.
	pub expires_at: OffsetDateTime,
}
impl Identity {
	/// Whether the identity's credential is expired at `now`.
	pub fn is_expired_at(&self, now: OffsetDateTime) -> bool {
		self.expires_at <= now
	}
}
