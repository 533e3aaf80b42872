//! Per-client sliding-window rate limiting.
//!
//! The limiter keeps a sliding log of admitted request instants per
//! [`ClientKey`] and evaluates capacity over a continuously moving interval, so
//! a burst straddling a window boundary can never see double capacity the way
//! fixed buckets allow. The cost is O(window-entries) memory per active key,
//! which is why idle-key eviction ([`SlidingWindowLimiter::evict_idle`] and
//! [`Sweeper`]) is part of the contract rather than polish.

mod window;

pub mod sweeper;

pub use sweeper::Sweeper;

// crates.io
use dashmap::DashMap;
// self
use crate::{_prelude::*, clock::Clock, limit::window::Window, request::ClientKey};

/// Outcome of one admission check.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LimiterVerdict {
	/// The request fits inside the window and was recorded.
	Admit,
	/// The window is full; the request was not recorded.
	Throttle {
		/// Whole seconds until the oldest in-window hit ages out, always ≥ 1.
		retry_after_secs: u64,
	},
}
impl LimiterVerdict {
	/// Whether the verdict admits the request.
	pub fn is_admit(&self) -> bool {
		matches!(self, Self::Admit)
	}
}

/// Sliding-log rate limiter keyed by client.
///
/// The key→window map is sharded ([`DashMap`]), so checks for different keys
/// proceed in parallel while prune-and-append for one key executes atomically
/// under its shard guard; concurrent requests can never both observe the last
/// free slot. The guard is synchronous and never held across an `.await`.
///
/// State is local to one process. Behind a load balancer each instance
/// enforces its own window, so the effective global limit scales with instance
/// count; deployments needing a shared budget must put a shared counter store
/// in front, which is outside this crate's scope.
pub struct SlidingWindowLimiter {
	windows: DashMap<ClientKey, Window>,
	window: Duration,
	capacity: usize,
	clock: Arc<dyn Clock>,
}
impl SlidingWindowLimiter {
	/// Default rolling window length.
	pub const DEFAULT_WINDOW: Duration = Duration::from_secs(60);
	/// Default number of requests admitted per window.
	pub const DEFAULT_CAPACITY: usize = 100;

	/// Creates a limiter with the provided window and capacity.
	pub fn new(window: Duration, capacity: usize, clock: Arc<dyn Clock>) -> Self {
		Self { windows: DashMap::new(), window, capacity, clock }
	}

	/// Creates a limiter with the crate defaults (60 s window, 100 requests).
	pub fn with_defaults(clock: Arc<dyn Clock>) -> Self {
		Self::new(Self::DEFAULT_WINDOW, Self::DEFAULT_CAPACITY, clock)
	}

	/// Checks and records one request for `key`.
	///
	/// Prune, capacity evaluation, and append happen as one atomic unit per key.
	/// A throttled request leaves the stored log untouched, so rejection is
	/// idempotent and a denied caller never extends another caller's wait.
	pub fn check(&self, key: &ClientKey) -> LimiterVerdict {
		let mut window = self.windows.entry(key.clone()).or_default();
		// Sampled under the shard guard so each key's log stays ascending in
		// lock-acquisition order; an instant taken before the guard could land
		// behind a newer hit and then never age out.
		let now = self.clock.now();

		if let Some(horizon) = now.checked_sub(self.window) {
			window.prune(horizon);
		}
		if window.len() >= self.capacity {
			let oldest = window.oldest().unwrap_or(now);

			return LimiterVerdict::Throttle {
				retry_after_secs: retry_after_secs(self.window, now - oldest),
			};
		}

		window.push(now);

		LimiterVerdict::Admit
	}

	/// Removes every key whose entire window has aged out.
	///
	/// Returns the number of evicted keys. Call this periodically (see
	/// [`Sweeper`]) so rotating client addresses cannot grow the map without
	/// bound.
	pub fn evict_idle(&self) -> usize {
		let Some(horizon) = self.clock.now().checked_sub(self.window) else {
			return 0;
		};
		let before = self.windows.len();

		self.windows.retain(|_, window| window.newest().is_some_and(|hit| hit >= horizon));

		before - self.windows.len()
	}

	/// Number of keys currently tracked, including idle ones awaiting eviction.
	pub fn tracked_keys(&self) -> usize {
		self.windows.len()
	}

	/// Number of stored hits for `key` as of the last check, without mutating state.
	pub fn tracked_hits(&self, key: &ClientKey) -> usize {
		self.windows.get(key).map(|window| window.len()).unwrap_or(0)
	}

	/// The configured window length.
	pub fn window(&self) -> Duration {
		self.window
	}

	/// The configured per-window capacity.
	pub fn capacity(&self) -> usize {
		self.capacity
	}
}
impl Debug for SlidingWindowLimiter {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("SlidingWindowLimiter")
			.field("window", &self.window)
			.field("capacity", &self.capacity)
			.field("tracked_keys", &self.windows.len())
			.finish()
	}
}

/// Whole seconds until the oldest in-window hit leaves the window, clamped to ≥ 1.
fn retry_after_secs(window: Duration, oldest_age: Duration) -> u64 {
	let remaining = window.saturating_sub(oldest_age);

	(remaining.as_millis().div_ceil(1_000) as u64).max(1)
}

#[cfg(test)]
mod tests {
	// self
	use super::*;
	use crate::clock::ManualClock;

	fn limiter(window_secs: u64, capacity: usize) -> (SlidingWindowLimiter, Arc<ManualClock>) {
		let clock = Arc::new(ManualClock::new());

		(SlidingWindowLimiter::new(Duration::from_secs(window_secs), capacity, clock.clone()), clock)
	}

	#[test]
	fn admits_until_capacity_then_throttles() {
		let (limiter, _) = limiter(60, 3);
		let key = ClientKey::new("1.2.3.4");

		for _ in 0..3 {
			assert!(limiter.check(&key).is_admit());
		}

		let verdict = limiter.check(&key);

		assert!(matches!(verdict, LimiterVerdict::Throttle { retry_after_secs } if retry_after_secs > 0));
	}

	#[test]
	fn throttled_request_does_not_mutate_the_log() {
		let (limiter, _) = limiter(60, 2);
		let key = ClientKey::new("1.2.3.4");

		limiter.check(&key);
		limiter.check(&key);

		assert_eq!(limiter.tracked_hits(&key), 2);
		assert!(!limiter.check(&key).is_admit());
		assert_eq!(limiter.tracked_hits(&key), 2);
	}

	#[test]
	fn idle_key_is_admitted_after_the_window_passes() {
		let (limiter, clock) = limiter(60, 1);
		let key = ClientKey::new("1.2.3.4");

		assert!(limiter.check(&key).is_admit());
		assert!(!limiter.check(&key).is_admit());

		clock.advance(Duration::from_secs(61));

		assert!(limiter.check(&key).is_admit());
	}

	#[test]
	fn retry_hint_tracks_the_oldest_hit() {
		let (limiter, clock) = limiter(60, 1);
		let key = ClientKey::new("1.2.3.4");

		limiter.check(&key);
		clock.advance(Duration::from_secs(20));

		let LimiterVerdict::Throttle { retry_after_secs } = limiter.check(&key) else {
			panic!("Full window should throttle.");
		};

		assert_eq!(retry_after_secs, 40);
	}

	#[test]
	fn retry_hint_is_never_zero() {
		assert_eq!(retry_after_secs(Duration::from_secs(60), Duration::from_secs(60)), 1);
		assert_eq!(retry_after_secs(Duration::from_secs(60), Duration::from_secs(90)), 1);
	}

	#[test]
	fn keys_do_not_share_windows() {
		let (limiter, _) = limiter(60, 1);

		assert!(limiter.check(&ClientKey::new("a")).is_admit());
		assert!(limiter.check(&ClientKey::new("b")).is_admit());
		assert!(!limiter.check(&ClientKey::new("a")).is_admit());
	}

	#[test]
	fn evict_idle_drops_aged_out_keys_only() {
		let (limiter, clock) = limiter(60, 5);
		let stale = ClientKey::new("stale");
		let fresh = ClientKey::new("fresh");

		limiter.check(&stale);
		clock.advance(Duration::from_secs(45));
		limiter.check(&fresh);
		clock.advance(Duration::from_secs(30));

		assert_eq!(limiter.evict_idle(), 1);
		assert_eq!(limiter.tracked_keys(), 1);
		assert_eq!(limiter.tracked_hits(&stale), 0);
	}

	#[test]
	fn contended_appends_follow_lock_order() {
		// The clock hands out a strictly later instant on every call. Because
		// sampling happens under the shard guard, each key's log must come out
		// ascending no matter which thread wins the guard first; a stale hit can
		// then never hide behind a newer front and dodge pruning.
		use std::{
			sync::{
				Barrier,
				atomic::{AtomicU32, Ordering},
			},
			thread,
		};

		struct StepClock {
			epoch: Instant,
			ticks: AtomicU32,
		}
		impl Clock for StepClock {
			fn now(&self) -> Instant {
				self.epoch + Duration::from_secs(30) * self.ticks.fetch_add(1, Ordering::SeqCst)
			}
		}

		let limiter = Arc::new(SlidingWindowLimiter::new(
			Duration::from_secs(60),
			2,
			Arc::new(StepClock { epoch: Instant::now(), ticks: AtomicU32::new(0) }),
		));
		let key = ClientKey::new("1.2.3.4");
		let barrier = Arc::new(Barrier::new(2));
		let handles: Vec<_> = (0..2)
			.map(|_| {
				let limiter = limiter.clone();
				let key = key.clone();
				let barrier = barrier.clone();

				thread::spawn(move || {
					barrier.wait();

					limiter.check(&key).is_admit()
				})
			})
			.collect();

		for handle in handles {
			assert!(handle.join().expect("Limiter thread should not panic."));
		}

		// Hits landed at t=0s and t=30s in some thread order. At t=60s both are
		// still in-window; at t=90s the older one has aged out and must free its
		// slot even when its thread lost the race for the guard.
		assert!(!limiter.check(&key).is_admit());
		assert!(limiter.check(&key).is_admit());
		assert_eq!(limiter.tracked_hits(&key), 2);
	}

	#[test]
	fn concurrent_checks_never_overshoot_capacity() {
		// 8 threads race 25 checks each against capacity 100; exactly 100 may win.
		use std::{sync::Barrier, thread};

		let limiter = Arc::new(SlidingWindowLimiter::new(
			Duration::from_secs(60),
			100,
			Arc::new(crate::clock::SystemClock),
		));
		let key = ClientKey::new("1.2.3.4");
		let barrier = Arc::new(Barrier::new(8));
		let mut handles = Vec::new();

		for _ in 0..8 {
			let limiter = limiter.clone();
			let key = key.clone();
			let barrier = barrier.clone();

			handles.push(thread::spawn(move || {
				barrier.wait();

				(0..25).filter(|_| limiter.check(&key).is_admit()).count()
			}));
		}

		let admitted: usize =
			handles.into_iter().map(|h| h.join().expect("Limiter thread should not panic.")).sum();

		assert_eq!(admitted, 100);
		assert_eq!(limiter.tracked_hits(&key), 100);
	}
}
