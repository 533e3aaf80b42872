//! Background eviction of idle limiter keys.

// self
use crate::{_prelude::*, limit::SlidingWindowLimiter};

/// Handle for a background task that periodically evicts idle limiter keys.
///
/// Dropping the handle aborts the task. Spawning requires an ambient tokio
/// runtime; embedders that prefer their own scheduling can skip the sweeper and
/// call [`SlidingWindowLimiter::evict_idle`] directly.
#[derive(Debug)]
pub struct Sweeper {
	task: tokio::task::JoinHandle<()>,
}
impl Sweeper {
	/// Spawns a sweeper that evicts idle keys every `every`.
	pub fn spawn(limiter: Arc<SlidingWindowLimiter>, every: Duration) -> Self {
		let task = tokio::spawn(async move {
			let mut ticks = tokio::time::interval(every);

			// The first tick fires immediately; sweeping an empty map is harmless.
			loop {
				ticks.tick().await;

				let evicted = limiter.evict_idle();

				crate::obs::record_sweep(evicted);
			}
		});

		Self { task }
	}

	/// Stops the background task.
	pub fn stop(self) {
		self.task.abort();
	}
}
impl Drop for Sweeper {
	fn drop(&mut self) {
		self.task.abort();
	}
}
