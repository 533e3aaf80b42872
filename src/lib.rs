//! Request-admission gate for HTTP services - bearer-token authentication and
//! per-client sliding-window rate limiting in one embeddable crate.
//!
//! The gate sits inline in a server's request path and produces one
//! [`AdmissionDecision`](pipeline::AdmissionDecision) per request: identify the caller,
//! consult the sliding-window limiter, then (for protected routes) verify the bearer
//! credential against an external identity provider. The crate owns no HTTP framework;
//! embedders populate a [`GateRequest`](request::GateRequest) from their transport and
//! render [`Rejection`](response::Rejection) payloads back out.

#![deny(clippy::all, missing_docs, unused_crate_dependencies)]

pub mod auth;
pub mod clock;
pub mod config;
pub mod error;
pub mod limit;
pub mod obs;
pub mod pipeline;
pub mod provider;
pub mod request;
pub mod response;
#[cfg(any(test, feature = "test"))]
pub mod _preludet {
	//! Convenience re-exports and helpers for integration tests; enabled via `cfg(test)` or the
	//! `test` crate feature.

	pub use crate::_prelude::*;

	// std
	use std::sync::atomic::{AtomicUsize, Ordering};
	// self
	use crate::{
		auth::{Credential, CredentialPair, Identity, Subject},
		provider::{IdentityProvider, ProviderFuture},
	};

	/// Provider double that replays scripted outcomes and counts upstream calls.
	///
	/// Each `verify`/`exchange` call pops the next scripted result; running out of script
	/// is a test bug and panics. Call counters let tests assert how many provider
	/// round-trips a flow performed (e.g. zero for a rate-limited request).
	#[derive(Debug, Default)]
	pub struct ScriptedProvider {
		verify_script: Mutex<VecDeque<Result<Identity, AuthError>>>,
		exchange_script: Mutex<VecDeque<Result<CredentialPair, AuthError>>>,
		verify_calls: AtomicUsize,
		exchange_calls: AtomicUsize,
	}
	impl ScriptedProvider {
		/// Queues the next outcome for a `verify` call.
		pub fn push_verify(&self, outcome: Result<Identity, AuthError>) {
			self.verify_script.lock().push_back(outcome);
		}

		/// Queues the next outcome for an `exchange` call.
		pub fn push_exchange(&self, outcome: Result<CredentialPair, AuthError>) {
			self.exchange_script.lock().push_back(outcome);
		}

		/// Number of `verify` calls the provider has served.
		pub fn verify_calls(&self) -> usize {
			self.verify_calls.load(Ordering::SeqCst)
		}

		/// Number of `exchange` calls the provider has served.
		pub fn exchange_calls(&self) -> usize {
			self.exchange_calls.load(Ordering::SeqCst)
		}
	}
	impl IdentityProvider for ScriptedProvider {
		fn verify<'a>(&'a self, _credential: &'a Credential) -> ProviderFuture<'a, Identity> {
			Box::pin(async move {
				self.verify_calls.fetch_add(1, Ordering::SeqCst);

				self.verify_script
					.lock()
					.pop_front()
					.expect("ScriptedProvider ran out of scripted verify outcomes.")
			})
		}

		fn exchange<'a>(&'a self, _refresh: &'a Credential) -> ProviderFuture<'a, CredentialPair> {
			Box::pin(async move {
				self.exchange_calls.fetch_add(1, Ordering::SeqCst);

				self.exchange_script
					.lock()
					.pop_front()
					.expect("ScriptedProvider ran out of scripted exchange outcomes.")
			})
		}
	}

	/// Builds an identity fixture valid for one hour around now.
	pub fn test_identity(subject: &str) -> Identity {
		let now = OffsetDateTime::now_utc();

		Identity {
			subject: Subject::new(subject).expect("Test subject should be valid."),
			issued_at: now,
			expires_at: now + time::Duration::hours(1),
		}
	}

	/// Well-shaped compact-JWS bearer token usable wherever shape checks must pass.
	pub fn test_token() -> Credential {
		Credential::new("eyJhbGciOiJIUzI1NiJ9.eyJzdWIiOiIxIn0.c2ln")
	}
}

mod _prelude {
	pub use std::{
		collections::VecDeque,
		error::Error as StdError,
		fmt::{Debug, Display, Formatter, Result as FmtResult},
		future::Future,
		pin::Pin,
		sync::Arc,
		time::{Duration, Instant},
	};

	pub use parking_lot::Mutex;
	#[cfg(feature = "reqwest")]
	pub use reqwest::{Client as ReqwestClient, Error as ReqwestError};
	pub use serde::{Deserialize, Serialize};
	pub use thiserror::Error as ThisError;
	pub use time::OffsetDateTime;
	pub use url::Url;

	pub use crate::error::{AuthError, ConfigError, Error, Result};
}

#[cfg(feature = "reqwest")] pub use reqwest;
pub use url;
#[cfg(test)] use {httpmock as _, tokio as _};
