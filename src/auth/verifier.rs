//! Bearer-credential verification against the identity provider.

// self
use crate::{
	_prelude::*,
	auth::{Credential, Identity},
	obs::{self, GateStage, StageOutcome, StageSpan},
	provider::IdentityProvider,
};

/// Validates access credentials and surfaces the attested identity.
///
/// Header extraction and the compact-JWS shape check run locally so garbage input
/// fails before a single provider round-trip; only well-shaped credentials reach
/// [`IdentityProvider::verify`].
#[derive(Clone)]
pub struct TokenVerifier {
	provider: Arc<dyn IdentityProvider>,
}
impl TokenVerifier {
	/// Creates a verifier backed by the provided capability.
	pub fn new(provider: Arc<dyn IdentityProvider>) -> Self {
		Self { provider }
	}

	/// Verifies the credential carried by a raw `Authorization` header value.
	pub async fn verify_header(&self, authorization: Option<&str>) -> Result<Identity, AuthError> {
		let credential = Credential::from_authorization(authorization)?;

		self.verify(&credential).await
	}

	/// Verifies an already-extracted credential.
	pub async fn verify(&self, credential: &Credential) -> Result<Identity, AuthError> {
		const STAGE: GateStage = GateStage::Verify;

		let span = StageSpan::new(STAGE, credential.fingerprint());

		obs::record_stage_outcome(STAGE, StageOutcome::Attempt);

		let result = span
			.instrument(async move {
				credential.ensure_token_shape()?;

				self.provider.verify(credential).await
			})
			.await;

		match &result {
			Ok(_) => obs::record_stage_outcome(STAGE, StageOutcome::Success),
			Err(_) => obs::record_stage_outcome(STAGE, StageOutcome::Failure),
		}

		result
	}
}
impl Debug for TokenVerifier {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str("TokenVerifier(..)")
	}
}
