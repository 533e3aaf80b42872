//! Monotonic clock capability used by the sliding-window limiter.
//!
//! The limiter never reads wall time directly; it asks an injected [`Clock`] so window
//! expiry is testable without sleeping. [`SystemClock`] is the production
//! implementation, [`ManualClock`] the controllable one.

// self
use crate::_prelude::*;

/// Monotonic time source consulted once per admission check.
pub trait Clock
where
	Self: Send + Sync,
{
	/// Returns the current instant.
	fn now(&self) -> Instant;
}

/// Production clock backed by [`Instant::now`].
#[derive(Clone, Copy, Debug, Default)]
pub struct SystemClock;
impl Clock for SystemClock {
	fn now(&self) -> Instant {
		Instant::now()
	}
}

/// Controllable clock that only moves when advanced explicitly.
///
/// Intended for tests and simulations that need to age rate-limit windows without
/// real waiting.
#[derive(Debug)]
pub struct ManualClock {
	epoch: Instant,
	offset: Mutex<Duration>,
}
impl ManualClock {
	/// Creates a clock frozen at the current instant.
	pub fn new() -> Self {
		Self { epoch: Instant::now(), offset: Mutex::new(Duration::ZERO) }
	}

	/// Moves the clock forward by `delta`.
	pub fn advance(&self, delta: Duration) {
		*self.offset.lock() += delta;
	}
}
impl Default for ManualClock {
	fn default() -> Self {
		Self::new()
	}
}
impl Clock for ManualClock {
	fn now(&self) -> Instant {
		self.epoch + *self.offset.lock()
	}
}
