//! Redacted bearer credential wrapper, header extraction, and shape validation.

// crates.io
use base64::{Engine, engine::general_purpose::URL_SAFE_NO_PAD};
use sha2::{Digest, Sha256};
// self
use crate::_prelude::*;

/// Opaque bearer credential (access or refresh) scoped to a single request.
///
/// Formatters redact the value so credentials cannot leak through logs or panic
/// messages; access the raw string only through [`expose`](Self::expose), and prefer
/// [`fingerprint`](Self::fingerprint) wherever a trace needs to correlate requests.
/// The gate never persists a credential.
#[derive(Clone, PartialEq, Eq)]
pub struct Credential(String);
impl Credential {
	/// Wraps a credential string.
	pub fn new(value: impl Into<String>) -> Self {
		Self(value.into())
	}

	/// Extracts the bearer credential from a raw `Authorization` header value.
	///
	/// An absent or blank header yields [`AuthError::MissingCredential`]; a present
	/// header without the `Bearer <token>` form yields
	/// [`AuthError::MalformedCredential`]. The scheme comparison is case-insensitive.
	pub fn from_authorization(header: Option<&str>) -> Result<Self, AuthError> {
		let raw = header
			.map(str::trim)
			.filter(|value| !value.is_empty())
			.ok_or(AuthError::MissingCredential)?;
		let (scheme, token) =
			raw.split_once(char::is_whitespace).ok_or(AuthError::MalformedCredential)?;

		if !scheme.eq_ignore_ascii_case("bearer") {
			return Err(AuthError::MalformedCredential);
		}

		let token = token.trim();

		if token.is_empty() {
			return Err(AuthError::MalformedCredential);
		}

		Ok(Self(token.into()))
	}

	/// Returns the inner credential value. Callers must avoid logging this string.
	pub fn expose(&self) -> &str {
		&self.0
	}

	/// Validates the compact-JWS shape: three non-empty base64url segments.
	///
	/// The gate checks shape only; signature and expiry judgments belong to the
	/// identity provider. Running the check before any provider call lets garbage
	/// input fail fast without spending a network round-trip.
	pub fn ensure_token_shape(&self) -> Result<(), AuthError> {
		let mut segments = 0;

		for segment in self.0.split('.') {
			if segment.is_empty() || URL_SAFE_NO_PAD.decode(segment).is_err() {
				return Err(AuthError::MalformedCredential);
			}

			segments += 1;
		}
		if segments != 3 {
			return Err(AuthError::MalformedCredential);
		}

		Ok(())
	}

	/// Short hex SHA-256 digest of the credential, safe to put in traces.
	pub fn fingerprint(&self) -> String {
		use std::fmt::Write;

		let digest = Sha256::digest(self.0.as_bytes());
		let mut hex = String::with_capacity(16);

		for byte in digest.iter().take(8) {
			let _ = write!(hex, "{byte:02x}");
		}

		hex
	}
}
impl AsRef<str> for Credential {
	fn as_ref(&self) -> &str {
		self.expose()
	}
}
impl Debug for Credential {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_tuple("Credential").field(&"<redacted>").finish()
	}
}
impl Display for Credential {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str("<redacted>")
	}
}

/// Freshly rotated credential pair returned by a refresh exchange.
#[derive(Clone, Debug)]
pub struct CredentialPair {
	/// New access credential.
	pub access: Credential,
	/// New refresh credential replacing the one that was exchanged.
	pub refresh: Credential,
}
