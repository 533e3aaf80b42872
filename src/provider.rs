//! External identity provider capability.
//!
//! The provider is the gate's only upstream dependency, so it is specified as a trait
//! rather than a concrete client: production code wires in the reqwest-backed
//! [`HttpIdentityProvider`], tests substitute a scripted double. Implementations are
//! shared behind `Arc<dyn IdentityProvider>` and must never log the credentials they
//! are handed.

#[cfg(feature = "reqwest")] pub mod http;
#[cfg(feature = "reqwest")] pub use http::HttpIdentityProvider;

// self
use crate::{
	_prelude::*,
	auth::{Credential, CredentialPair, Identity},
};

/// Boxed future returned by [`IdentityProvider`] operations.
pub type ProviderFuture<'a, T> =
	Pin<Box<dyn Future<Output = Result<T, AuthError>> + 'a + Send>>;

/// Capability contract for the external identity provider.
pub trait IdentityProvider
where
	Self: Send + Sync,
{
	/// Validates an access credential and returns the attested identity.
	///
	/// Rejections map to [`AuthError::InvalidSignature`] or
	/// [`AuthError::ExpiredCredential`]; transport failures map to
	/// [`AuthError::ProviderUnavailable`] and are never conflated with rejection.
	fn verify<'a>(&'a self, credential: &'a Credential) -> ProviderFuture<'a, Identity>;

	/// Exchanges a refresh credential for a freshly rotated pair.
	///
	/// A structurally valid but rejected credential maps to
	/// [`AuthError::InvalidCredential`].
	fn exchange<'a>(&'a self, refresh: &'a Credential) -> ProviderFuture<'a, CredentialPair>;
}

/// Verify and exchange endpoints of one identity provider deployment.
#[derive(Clone, Debug)]
pub struct ProviderEndpoints {
	/// Endpoint receiving access-credential verification calls.
	pub verify: Url,
	/// Endpoint receiving refresh-exchange calls.
	pub exchange: Url,
}
impl ProviderEndpoints {
	/// Creates the endpoint pair.
	pub fn new(verify: Url, exchange: Url) -> Self {
		Self { verify, exchange }
	}
}

/// Parses a JSON payload, reporting the failing path on malformed documents.
pub(crate) fn parse_json<'a, T>(
	bytes: &'a [u8],
) -> Result<T, serde_path_to_error::Error<serde_json::Error>>
where
	T: Deserialize<'a>,
{
	let mut deserializer = serde_json::Deserializer::from_slice(bytes);

	serde_path_to_error::deserialize(&mut deserializer)
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[derive(Debug, Deserialize)]
	struct Sample {
		value: u32,
	}

	#[test]
	fn parse_json_reports_the_failing_path() {
		assert_eq!(
			parse_json::<Sample>(br#"{"value": 7}"#)
				.expect("Well-formed payload should parse.")
				.value,
			7,
		);

		let err = parse_json::<Sample>(br#"{"value": "seven"}"#)
			.expect_err("Mistyped payload should fail.");

		assert_eq!(err.path().to_string(), "value");
	}
}
