//! Environment-style gate configuration.
//!
//! The two signing secrets are hard startup requirements: [`GateConfig::from_env`]
//! fails when either is absent, and embedders are expected to propagate that failure
//! instead of serving unauthenticated traffic. Limiter knobs fall back to defaults
//! when unset, but a present-and-malformed value is an error rather than a silent
//! default.

// self
use crate::{_prelude::*, auth::Credential};

/// Environment variable holding the rolling window length in milliseconds.
pub const WINDOW_MS_VAR: &str = "RATE_LIMIT_WINDOW_MS";
/// Environment variable holding the per-window request capacity.
pub const MAX_REQUESTS_VAR: &str = "RATE_LIMIT_MAX_REQUESTS";
/// Environment variable holding the access-credential signing secret.
pub const ACCESS_SECRET_VAR: &str = "ACCESS_TOKEN_SECRET";
/// Environment variable holding the refresh-credential signing secret.
pub const REFRESH_SECRET_VAR: &str = "REFRESH_TOKEN_SECRET";

/// Assembled gate configuration.
///
/// Secrets are stored as [`Credential`] so a `Debug`-formatted config never leaks
/// them.
#[derive(Clone, Debug)]
pub struct GateConfig {
	/// Rolling window length for the limiter.
	pub window: Duration,
	/// Requests admitted per window per client key.
	pub capacity: usize,
	/// Secret authenticating the gate on verification calls.
	pub access_secret: Credential,
	/// Secret authenticating the gate on exchange calls.
	pub refresh_secret: Credential,
}
impl GateConfig {
	/// Default rolling window length (60 000 ms).
	pub const DEFAULT_WINDOW: Duration = Duration::from_millis(60_000);
	/// Default per-window capacity.
	pub const DEFAULT_CAPACITY: usize = 100;

	/// Builds a config with default limiter knobs and the provided secrets.
	pub fn new(access_secret: Credential, refresh_secret: Credential) -> Self {
		Self {
			window: Self::DEFAULT_WINDOW,
			capacity: Self::DEFAULT_CAPACITY,
			access_secret,
			refresh_secret,
		}
	}

	/// Overrides the rolling window length.
	pub fn with_window(mut self, window: Duration) -> Self {
		self.window = window;

		self
	}

	/// Overrides the per-window capacity.
	pub fn with_capacity(mut self, capacity: usize) -> Self {
		self.capacity = capacity;

		self
	}

	/// Reads the configuration from process environment variables.
	pub fn from_env() -> Result<Self, ConfigError> {
		Self::from_lookup(|name| std::env::var(name).ok())
	}

	/// Reads the configuration through an injectable variable lookup.
	pub fn from_lookup(
		lookup: impl Fn(&str) -> Option<String>,
	) -> Result<Self, ConfigError> {
		let access_secret = require(&lookup, ACCESS_SECRET_VAR)?;
		let refresh_secret = require(&lookup, REFRESH_SECRET_VAR)?;
		let window = match parse_integer::<u64>(&lookup, WINDOW_MS_VAR)? {
			Some(ms) => Duration::from_millis(ms),
			None => Self::DEFAULT_WINDOW,
		};
		let capacity =
			parse_integer::<usize>(&lookup, MAX_REQUESTS_VAR)?.unwrap_or(Self::DEFAULT_CAPACITY);

		Ok(Self { window, capacity, access_secret, refresh_secret })
	}
}

fn require(
	lookup: &impl Fn(&str) -> Option<String>,
	name: &'static str,
) -> Result<Credential, ConfigError> {
	lookup(name)
		.map(|value| value.trim().to_owned())
		.filter(|value| !value.is_empty())
		.map(Credential::new)
		.ok_or(ConfigError::MissingVariable { name })
}

fn parse_integer<T>(
	lookup: &impl Fn(&str) -> Option<String>,
	name: &'static str,
) -> Result<Option<T>, ConfigError>
where
	T: std::str::FromStr<Err = std::num::ParseIntError>,
{
	lookup(name)
		.map(|value| value.trim().parse().map_err(|source| ConfigError::InvalidInteger { name, source }))
		.transpose()
}
