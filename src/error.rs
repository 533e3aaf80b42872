//! Gate-level error types shared across the limiter, verifier, and pipeline.

// self
use crate::_prelude::*;

/// Gate-wide result type alias returning [`Error`] by default.
pub type Result<T, E = Error> = std::result::Result<T, E>;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Canonical gate error exposed by public APIs.
#[derive(Debug, ThisError)]
pub enum Error {
	/// Authentication or refresh-exchange failure.
	#[error(transparent)]
	Auth(#[from] AuthError),
	/// Local configuration problem.
	#[error(transparent)]
	Config(#[from] ConfigError),
}

/// Authentication and credential-exchange failures, scoped to a single request.
///
/// Every variant maps to a rejection for exactly one request; nothing here is fatal to
/// the process. See [`Rejection`](crate::response::Rejection) for the wire mapping,
/// which deliberately collapses verification failures into one generic message.
#[derive(Debug, ThisError)]
pub enum AuthError {
	/// No credential was supplied in the `Authorization` header.
	#[error("Authorization credential is missing.")]
	MissingCredential,
	/// Credential is present but not in the expected bearer-token shape.
	#[error("Credential is not a well-formed bearer token.")]
	MalformedCredential,
	/// Identity provider rejected the credential's signature.
	#[error("Credential signature was rejected by the identity provider.")]
	InvalidSignature,
	/// Credential is past its expiry instant.
	#[error("Credential is expired.")]
	ExpiredCredential,
	/// Refresh credential was structurally valid but rejected (revoked, expired, or
	/// issued for a different audience).
	#[error("Refresh credential was rejected by the identity provider.")]
	InvalidCredential,
	/// Provider call itself failed (network, timeout, or upstream 5xx); safe to retry
	/// with backoff and never reported as an authentication failure.
	#[error("Identity provider is unavailable.")]
	ProviderUnavailable {
		/// Underlying transport or upstream failure, when one was observed.
		#[source]
		source: Option<BoxError>,
		/// Retry-After hint from the provider, if supplied.
		retry_after: Option<Duration>,
	},
}
impl AuthError {
	/// Wraps an upstream failure as [`AuthError::ProviderUnavailable`].
	pub fn unavailable(src: impl 'static + Send + Sync + StdError) -> Self {
		Self::ProviderUnavailable { source: Some(Box::new(src)), retry_after: None }
	}

	/// Provider unavailability without an underlying error (e.g. a bare 503).
	pub fn unavailable_with_hint(retry_after: Option<Duration>) -> Self {
		Self::ProviderUnavailable { source: None, retry_after }
	}

	/// Whether the pipeline may retry the failing operation.
	pub fn is_retryable(&self) -> bool {
		matches!(self, Self::ProviderUnavailable { .. })
	}
}

/// Configuration failures raised while assembling the gate at startup.
#[derive(Debug, ThisError)]
pub enum ConfigError {
	/// A required environment variable was missing or empty.
	#[error("Environment variable `{name}` is required but was not set.")]
	MissingVariable {
		/// Name of the missing variable.
		name: &'static str,
	},
	/// A numeric environment variable could not be parsed.
	#[error("Environment variable `{name}` is not a valid integer.")]
	InvalidInteger {
		/// Name of the malformed variable.
		name: &'static str,
		/// Underlying parsing failure.
		#[source]
		source: std::num::ParseIntError,
	},
	/// HTTP client could not be constructed.
	#[error("HTTP client could not be constructed.")]
	HttpClientBuild {
		/// Underlying transport builder failure.
		#[source]
		source: BoxError,
	},
}
impl ConfigError {
	/// Wraps a transport's builder failure inside [`ConfigError`].
	pub fn http_client_build(src: impl 'static + Send + Sync + StdError) -> Self {
		Self::HttpClientBuild { source: Box::new(src) }
	}
}
#[cfg(feature = "reqwest")]
impl From<ReqwestError> for ConfigError {
	fn from(e: ReqwestError) -> Self {
		Self::http_client_build(e)
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn only_provider_unavailability_is_retryable() {
		assert!(AuthError::unavailable_with_hint(None).is_retryable());
		assert!(!AuthError::MissingCredential.is_retryable());
		assert!(!AuthError::ExpiredCredential.is_retryable());
		assert!(!AuthError::InvalidCredential.is_retryable());
	}

	#[test]
	fn unavailable_preserves_source_chain() {
		let err = AuthError::unavailable(std::io::Error::other("connection reset"));

		assert!(StdError::source(&err).is_some());
	}
}
