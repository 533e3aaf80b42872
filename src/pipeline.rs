//! Per-request admission orchestration.
//!
//! The stage order is load-bearing: the client key is derived and the limiter
//! consulted before any credential work, so an unauthenticated flood can never force
//! calls to the identity provider; the provider is the scarcer, slower resource and
//! the limiter exists to shield it. A request moves
//! `Received → KeyIdentified → RateChecked → [AuthChecked] → Forwarded | Rejected`,
//! and a rate-limit denial is authoritative for that instant (no in-pipeline retry).

// crates.io
use rand::Rng;
// self
use crate::{
	_prelude::*,
	auth::{Credential, Identity, TokenVerifier},
	limit::{LimiterVerdict, SlidingWindowLimiter},
	obs::{self, GateStage, StageOutcome},
	provider::IdentityProvider,
	request::GateRequest,
	response::Rejection,
};

/// Authentication requirement declared by the matched route.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RoutePolicy {
	/// No credential required; the provider is never contacted.
	Public,
	/// A valid bearer credential is required to pass.
	Protected,
}

/// Terminal decision for one request.
///
/// Produced once per request, consumed by the response layer, then discarded; the
/// pipeline holds no per-request state afterwards.
#[derive(Clone, Debug)]
pub enum AdmissionDecision {
	/// Forward to the route handler, with identity attached when auth ran.
	Forwarded {
		/// Identity attested by the provider, present on protected routes.
		identity: Option<Identity>,
	},
	/// Reject with the contained wire payload.
	Rejected(Rejection),
}
impl AdmissionDecision {
	/// Whether the request may proceed to its handler.
	pub fn is_allowed(&self) -> bool {
		matches!(self, Self::Forwarded { .. })
	}

	/// Attested identity, when authentication ran and succeeded.
	pub fn identity(&self) -> Option<&Identity> {
		match self {
			Self::Forwarded { identity } => identity.as_ref(),
			Self::Rejected(_) => None,
		}
	}

	/// Rejection payload, when the request was denied.
	pub fn rejection(&self) -> Option<&Rejection> {
		match self {
			Self::Forwarded { .. } => None,
			Self::Rejected(rejection) => Some(rejection),
		}
	}
}

/// Bounded retry/backoff policy applied to provider unavailability.
///
/// Only [`AuthError::ProviderUnavailable`] is retried; rejections are final on first
/// sight. Backoff doubles per attempt with uniform jitter, and honors a provider
/// Retry-After hint when one was supplied (capped at `max_backoff`).
#[derive(Clone, Copy, Debug)]
pub struct RetryPolicy {
	/// Retries after the initial attempt.
	pub max_retries: u32,
	/// Backoff before the first retry.
	pub base_backoff: Duration,
	/// Upper bound for any single backoff sleep.
	pub max_backoff: Duration,
}
impl RetryPolicy {
	/// Disables retrying entirely.
	pub const NONE: Self =
		Self { max_retries: 0, base_backoff: Duration::ZERO, max_backoff: Duration::ZERO };

	/// Overrides the retry count.
	pub fn with_max_retries(mut self, max_retries: u32) -> Self {
		self.max_retries = max_retries;

		self
	}

	/// Overrides the base backoff.
	pub fn with_base_backoff(mut self, base_backoff: Duration) -> Self {
		self.base_backoff = base_backoff;

		self
	}

	fn delay(&self, attempt: u32, hint: Option<Duration>) -> Duration {
		let exponential = self.base_backoff.saturating_mul(1 << attempt.min(16));
		let jitter_ms = exponential.as_millis() as u64 / 2;
		let jittered = if jitter_ms == 0 {
			exponential
		} else {
			exponential + Duration::from_millis(rand::rng().random_range(0..=jitter_ms))
		};

		hint.unwrap_or(jittered).min(self.max_backoff)
	}
}
impl Default for RetryPolicy {
	fn default() -> Self {
		Self {
			max_retries: 2,
			base_backoff: Duration::from_millis(100),
			max_backoff: Duration::from_secs(2),
		}
	}
}

/// Orchestrates identification, rate limiting, and authentication per request.
///
/// The pipeline borrows its collaborators by handle; limiter state is explicitly owned
/// and injectable rather than ambient, so embedders control its lifetime and tests can
/// build isolated instances.
#[derive(Clone, Debug)]
pub struct AdmissionPipeline {
	limiter: Arc<SlidingWindowLimiter>,
	verifier: TokenVerifier,
	retry: RetryPolicy,
}
impl AdmissionPipeline {
	/// Creates a pipeline over the provided limiter and identity provider.
	pub fn new(limiter: Arc<SlidingWindowLimiter>, provider: Arc<dyn IdentityProvider>) -> Self {
		Self { limiter, verifier: TokenVerifier::new(provider), retry: RetryPolicy::default() }
	}

	/// Overrides the provider retry policy.
	pub fn with_retry_policy(mut self, retry: RetryPolicy) -> Self {
		self.retry = retry;

		self
	}

	/// Shared handle to the pipeline's limiter.
	pub fn limiter(&self) -> &Arc<SlidingWindowLimiter> {
		&self.limiter
	}

	/// Runs the admission stages for one request.
	///
	/// The limiter's shard guard is released before any credential work, so a slow
	/// provider round-trip never blocks admission checks for other requests, and an
	/// aborted caller cannot leave a window half-mutated.
	pub async fn admit(&self, request: &GateRequest, route: RoutePolicy) -> AdmissionDecision {
		let key = request.client_key();

		obs::record_stage_outcome(GateStage::RateLimit, StageOutcome::Attempt);

		match self.limiter.check(&key) {
			LimiterVerdict::Admit => {
				obs::record_stage_outcome(GateStage::RateLimit, StageOutcome::Success);
			},
			LimiterVerdict::Throttle { retry_after_secs } => {
				obs::record_stage_outcome(GateStage::RateLimit, StageOutcome::Failure);

				return AdmissionDecision::Rejected(Rejection::rate_limited(retry_after_secs));
			},
		}
		match route {
			RoutePolicy::Public => AdmissionDecision::Forwarded { identity: None },
			RoutePolicy::Protected =>
				match self.verify_with_retry(request.authorization.as_deref()).await {
					Ok(identity) => AdmissionDecision::Forwarded { identity: Some(identity) },
					Err(err) => AdmissionDecision::Rejected(Rejection::from_auth_error(&err)),
				},
		}
	}

	async fn verify_with_retry(&self, authorization: Option<&str>) -> Result<Identity, AuthError> {
		// Extraction and shape failures are deterministic; only provider
		// unavailability earns a retry.
		let credential = Credential::from_authorization(authorization)?;
		let mut attempt = 0;

		loop {
			match self.verifier.verify(&credential).await {
				Err(AuthError::ProviderUnavailable { retry_after, .. })
					if attempt < self.retry.max_retries =>
				{
					let delay = self.retry.delay(attempt, retry_after);

					attempt += 1;

					tokio::time::sleep(delay).await;
				},
				other => return other,
			}
		}
	}
}
