//! Reqwest-backed [`IdentityProvider`] implementation.
//!
//! Credential calls never follow redirects, matching the posture that verification and
//! exchange endpoints answer directly instead of delegating to another URI. The gate
//! authenticates itself to the provider with the configured signing secrets (access
//! secret on verify calls, refresh secret on exchange calls), sent as a bearer header.

// crates.io
use reqwest::{
	StatusCode, redirect::Policy,
	header::{AUTHORIZATION, CONTENT_TYPE, HeaderMap, RETRY_AFTER},
};
use time::format_description::well_known::Rfc2822;
// self
use crate::{
	_prelude::*,
	auth::{Credential, CredentialPair, Identity, Subject},
	provider::{IdentityProvider, ProviderEndpoints, ProviderFuture, parse_json},
};

/// Identity provider reached over HTTPS with reqwest.
#[derive(Clone)]
pub struct HttpIdentityProvider {
	client: ReqwestClient,
	endpoints: ProviderEndpoints,
	access_secret: Credential,
	refresh_secret: Credential,
}
impl HttpIdentityProvider {
	/// Builds a provider with its own non-redirecting reqwest client.
	pub fn new(
		endpoints: ProviderEndpoints,
		access_secret: Credential,
		refresh_secret: Credential,
	) -> Result<Self, ConfigError> {
		let client = ReqwestClient::builder().redirect(Policy::none()).build()?;

		Ok(Self::with_client(client, endpoints, access_secret, refresh_secret))
	}

	/// Wraps an existing reqwest client.
	///
	/// Configure the client to disable redirect following; credential material must not
	/// be replayed to arbitrary `Location` targets.
	pub fn with_client(
		client: ReqwestClient,
		endpoints: ProviderEndpoints,
		access_secret: Credential,
		refresh_secret: Credential,
	) -> Self {
		Self { client, endpoints, access_secret, refresh_secret }
	}

	async fn call(
		&self,
		endpoint: &Url,
		gate_secret: &Credential,
		credential: &Credential,
	) -> Result<(StatusCode, Option<Duration>, Vec<u8>), AuthError> {
		let body = serde_json::to_vec(&CredentialBody { token: credential.expose() })
			.map_err(AuthError::unavailable)?;
		let response = self
			.client
			.post(endpoint.clone())
			.header(AUTHORIZATION, format!("Bearer {}", gate_secret.expose()))
			.header(CONTENT_TYPE, "application/json")
			.body(body)
			.send()
			.await
			.map_err(AuthError::unavailable)?;
		let status = response.status();
		let retry_after = parse_retry_after(response.headers());
		let bytes = response.bytes().await.map_err(AuthError::unavailable)?;

		Ok((status, retry_after, bytes.to_vec()))
	}
}
impl IdentityProvider for HttpIdentityProvider {
	fn verify<'a>(&'a self, credential: &'a Credential) -> ProviderFuture<'a, Identity> {
		Box::pin(async move {
			let (status, retry_after, bytes) =
				self.call(&self.endpoints.verify, &self.access_secret, credential).await?;

			if status.is_success() {
				let payload = parse_json::<VerifyPayload>(&bytes).map_err(AuthError::unavailable)?;

				return identity_from(payload);
			}
			if is_rejection(status) {
				return Err(classify_verify_rejection(&bytes));
			}

			Err(AuthError::ProviderUnavailable { source: None, retry_after })
		})
	}

	fn exchange<'a>(&'a self, refresh: &'a Credential) -> ProviderFuture<'a, CredentialPair> {
		Box::pin(async move {
			let (status, retry_after, bytes) =
				self.call(&self.endpoints.exchange, &self.refresh_secret, refresh).await?;

			if status.is_success() {
				let payload =
					parse_json::<ExchangePayload>(&bytes).map_err(AuthError::unavailable)?;

				return Ok(CredentialPair {
					access: Credential::new(payload.access_token),
					refresh: Credential::new(payload.refresh_token),
				});
			}
			if is_rejection(status) {
				return Err(AuthError::InvalidCredential);
			}

			Err(AuthError::ProviderUnavailable { source: None, retry_after })
		})
	}
}
impl Debug for HttpIdentityProvider {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("HttpIdentityProvider").field("endpoints", &self.endpoints).finish()
	}
}

#[derive(Serialize)]
struct CredentialBody<'a> {
	token: &'a str,
}

#[derive(Deserialize)]
struct VerifyPayload {
	sub: String,
	iat: i64,
	exp: i64,
}

#[derive(Deserialize)]
struct ExchangePayload {
	access_token: String,
	refresh_token: String,
}

#[derive(Default, Deserialize)]
struct RejectionPayload {
	#[serde(default)]
	error: Option<String>,
}

/// Client errors are rejections of the credential; 429 and 5xx are provider trouble.
fn is_rejection(status: StatusCode) -> bool {
	status.is_client_error() && status != StatusCode::TOO_MANY_REQUESTS
}

fn classify_verify_rejection(bytes: &[u8]) -> AuthError {
	let payload = parse_json::<RejectionPayload>(bytes).unwrap_or_default();

	match payload.error.as_deref() {
		Some(reason) if reason.contains("expired") => AuthError::ExpiredCredential,
		_ => AuthError::InvalidSignature,
	}
}

fn identity_from(payload: VerifyPayload) -> Result<Identity, AuthError> {
	let subject = Subject::new(payload.sub).map_err(AuthError::unavailable)?;
	let issued_at =
		OffsetDateTime::from_unix_timestamp(payload.iat).map_err(AuthError::unavailable)?;
	let expires_at =
		OffsetDateTime::from_unix_timestamp(payload.exp).map_err(AuthError::unavailable)?;

	Ok(Identity { subject, issued_at, expires_at })
}

fn parse_retry_after(headers: &HeaderMap) -> Option<Duration> {
	let value = headers.get(RETRY_AFTER)?;
	let raw = value.to_str().ok()?.trim();

	if let Ok(secs) = raw.parse::<u64>() {
		return Some(Duration::from_secs(secs));
	}
	if let Ok(moment) = OffsetDateTime::parse(raw, &Rfc2822) {
		let delta = moment - OffsetDateTime::now_utc();

		if delta.is_positive() {
			return Some(Duration::from_secs(delta.whole_seconds() as u64));
		}
	}

	None
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn rejection_classification_prefers_expiry() {
		assert!(matches!(
			classify_verify_rejection(br#"{"error": "token expired"}"#),
			AuthError::ExpiredCredential,
		));
		assert!(matches!(
			classify_verify_rejection(br#"{"error": "bad signature"}"#),
			AuthError::InvalidSignature,
		));
		assert!(matches!(classify_verify_rejection(b"not json"), AuthError::InvalidSignature));
	}

	#[test]
	fn too_many_requests_is_not_a_rejection() {
		assert!(is_rejection(StatusCode::UNAUTHORIZED));
		assert!(is_rejection(StatusCode::FORBIDDEN));
		assert!(!is_rejection(StatusCode::TOO_MANY_REQUESTS));
		assert!(!is_rejection(StatusCode::SERVICE_UNAVAILABLE));
	}

	#[test]
	fn retry_after_parses_seconds_and_ignores_past_dates() {
		let mut headers = HeaderMap::new();

		headers.insert(RETRY_AFTER, "120".parse().expect("Header value should parse."));

		assert_eq!(parse_retry_after(&headers), Some(Duration::from_secs(120)));

		headers.insert(
			RETRY_AFTER,
			"Fri, 21 Nov 1997 09:55:06 -0600".parse().expect("Header value should parse."),
		);

		assert_eq!(parse_retry_after(&headers), None);
	}

	#[test]
	fn identity_conversion_validates_the_subject() {
		let err = identity_from(VerifyPayload { sub: " ".into(), iat: 0, exp: 60 })
			.expect_err("Blank subject should be a provider fault.");

		assert!(matches!(err, AuthError::ProviderUnavailable { .. }));

		let identity = identity_from(VerifyPayload { sub: "user-42".into(), iat: 0, exp: 60 })
			.expect("Valid payload should convert.");

		assert_eq!(identity.subject.as_ref(), "user-42");
		assert_eq!(identity.expires_at - identity.issued_at, time::Duration::seconds(60));
	}
}
