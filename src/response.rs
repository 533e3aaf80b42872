//! Wire-level rejection payloads.
//!
//! The gate does not speak HTTP itself; it hands the embedding server a
//! [`Rejection`] carrying the status code and the exact JSON body to render.
//! Authentication failures deliberately collapse into one generic message so the
//! response cannot be used as an oracle for which check failed; only the missing-
//! credential case gets its own wording, since a caller that sent nothing learns
//! nothing new from being told so.

// self
use crate::_prelude::*;

/// Body text for rate-limit rejections.
pub const RATE_LIMITED_MESSAGE: &str = "Too many requests, please try again later.";
/// Body text when no credential accompanied the request.
pub const MISSING_CREDENTIAL_MESSAGE: &str = "Authentication credential is missing.";
/// Generic body text for every credential-verification failure.
pub const INVALID_CREDENTIAL_MESSAGE: &str = "Invalid or expired credential.";
/// Body text when the identity provider stayed unreachable through all retries.
pub const PROVIDER_UNAVAILABLE_MESSAGE: &str = "Authentication is temporarily unavailable.";

/// Rejection produced by the gate for one request.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Rejection {
	status: u16,
	message: &'static str,
	retry_after_secs: Option<u64>,
}
impl Rejection {
	/// Rate-limit rejection with the computed retry hint.
	pub fn rate_limited(retry_after_secs: u64) -> Self {
		Self { status: 429, message: RATE_LIMITED_MESSAGE, retry_after_secs: Some(retry_after_secs) }
	}

	/// Maps an authentication failure onto its wire form.
	pub fn from_auth_error(err: &AuthError) -> Self {
		match err {
			AuthError::MissingCredential =>
				Self { status: 401, message: MISSING_CREDENTIAL_MESSAGE, retry_after_secs: None },
			AuthError::MalformedCredential
			| AuthError::InvalidSignature
			| AuthError::ExpiredCredential
			| AuthError::InvalidCredential =>
				Self { status: 401, message: INVALID_CREDENTIAL_MESSAGE, retry_after_secs: None },
			AuthError::ProviderUnavailable { .. } =>
				Self { status: 503, message: PROVIDER_UNAVAILABLE_MESSAGE, retry_after_secs: None },
		}
	}

	/// HTTP status code to respond with.
	pub fn status(&self) -> u16 {
		self.status
	}

	/// Human-readable rejection message.
	pub fn message(&self) -> &'static str {
		self.message
	}

	/// Retry hint in whole seconds, present on rate-limit rejections.
	pub fn retry_after_secs(&self) -> Option<u64> {
		self.retry_after_secs
	}

	/// Exact JSON body for the response.
	pub fn body(&self) -> serde_json::Value {
		match self.retry_after_secs {
			Some(retry_after) => serde_json::to_value(RateLimitBody {
				status_code: self.status,
				message: self.message,
				retry_after,
			}),
			None => serde_json::to_value(MessageBody { message: self.message }),
		}
		.unwrap_or_default()
	}
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct RateLimitBody {
	status_code: u16,
	message: &'static str,
	retry_after: u64,
}

#[derive(Serialize)]
struct MessageBody {
	message: &'static str,
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn rate_limit_body_matches_the_wire_contract() {
		let rejection = Rejection::rate_limited(60);

		assert_eq!(rejection.status(), 429);
		assert_eq!(
			rejection.body(),
			serde_json::json!({
				"statusCode": 429,
				"message": "Too many requests, please try again later.",
				"retryAfter": 60,
			}),
		);
	}

	#[test]
	fn auth_failures_share_one_generic_body() {
		for err in [
			AuthError::MalformedCredential,
			AuthError::InvalidSignature,
			AuthError::ExpiredCredential,
			AuthError::InvalidCredential,
		] {
			let rejection = Rejection::from_auth_error(&err);

			assert_eq!(rejection.status(), 401);
			assert_eq!(
				rejection.body(),
				serde_json::json!({ "message": "Invalid or expired credential." }),
			);
		}
	}

	#[test]
	fn missing_credential_has_its_own_message() {
		let rejection = Rejection::from_auth_error(&AuthError::MissingCredential);

		assert_eq!(rejection.status(), 401);
		assert_eq!(
			rejection.body(),
			serde_json::json!({ "message": "Authentication credential is missing." }),
		);
	}

	#[test]
	fn provider_unavailability_is_a_503_not_a_401() {
		let rejection = Rejection::from_auth_error(&AuthError::unavailable_with_hint(None));

		assert_eq!(rejection.status(), 503);
		assert_eq!(rejection.retry_after_secs(), None);
	}
}
