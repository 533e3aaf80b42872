//! Refresh-credential exchange for rotated credential pairs.

// self
use crate::{
	_prelude::*,
	auth::{Credential, CredentialPair},
	obs::{self, GateStage, StageOutcome, StageSpan},
	provider::IdentityProvider,
};

/// Exchanges a refresh credential for a freshly rotated access/refresh pair.
///
/// The raw credential value never reaches logs or storage; spans carry only the
/// SHA-256 fingerprint.
#[derive(Clone)]
pub struct RefreshExchanger {
	provider: Arc<dyn IdentityProvider>,
}
impl RefreshExchanger {
	/// Creates an exchanger backed by the provided capability.
	pub fn new(provider: Arc<dyn IdentityProvider>) -> Self {
		Self { provider }
	}

	/// Exchanges `refresh` for a new credential pair.
	///
	/// A non-token-shaped input fails fast with [`AuthError::MalformedCredential`] and
	/// performs no provider call. Provider rejections of well-shaped credentials are
	/// normalized to [`AuthError::InvalidCredential`] regardless of how the provider
	/// phrased them; unavailability passes through untouched so callers can retry.
	pub async fn exchange(&self, refresh: &Credential) -> Result<CredentialPair, AuthError> {
		const STAGE: GateStage = GateStage::Exchange;

		let span = StageSpan::new(STAGE, refresh.fingerprint());

		obs::record_stage_outcome(STAGE, StageOutcome::Attempt);

		let result = span
			.instrument(async move {
				refresh.ensure_token_shape()?;

				self.provider.exchange(refresh).await.map_err(|err| match err {
					AuthError::InvalidSignature
					| AuthError::ExpiredCredential
					| AuthError::MissingCredential
					| AuthError::MalformedCredential => AuthError::InvalidCredential,
					other => other,
				})
			})
			.await;

		match &result {
			Ok(_) => obs::record_stage_outcome(STAGE, StageOutcome::Success),
			Err(_) => obs::record_stage_outcome(STAGE, StageOutcome::Failure),
		}

		result
	}
}
impl Debug for RefreshExchanger {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str("RefreshExchanger(..)")
	}
}
