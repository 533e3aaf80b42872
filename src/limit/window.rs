//! Per-key sliding-log state.

// self
use crate::_prelude::*;

/// Ordered request timestamps for one client key, ascending.
///
/// Invariant after a prune: every stored instant lies within `[now - window, now]`,
/// and once evaluated the log never exceeds the configured capacity.
#[derive(Clone, Debug, Default)]
pub(crate) struct Window {
	hits: VecDeque<Instant>,
}
impl Window {
	/// Drops every hit strictly older than `horizon`.
	pub(crate) fn prune(&mut self, horizon: Instant) {
		while self.hits.front().is_some_and(|&hit| hit < horizon) {
			self.hits.pop_front();
		}
	}

	/// Records an admitted hit; `now` must not precede the newest stored hit.
	pub(crate) fn push(&mut self, now: Instant) {
		self.hits.push_back(now);
	}

	pub(crate) fn len(&self) -> usize {
		self.hits.len()
	}

	pub(crate) fn oldest(&self) -> Option<Instant> {
		self.hits.front().copied()
	}

	pub(crate) fn newest(&self) -> Option<Instant> {
		self.hits.back().copied()
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn prune_drops_only_aged_hits() {
		let epoch = Instant::now();
		let mut window = Window::default();

		window.push(epoch);
		window.push(epoch + Duration::from_secs(10));
		window.push(epoch + Duration::from_secs(20));
		window.prune(epoch + Duration::from_secs(10));

		// Hits exactly at the horizon survive; only strictly older ones go.
		assert_eq!(window.len(), 2);
		assert_eq!(window.oldest(), Some(epoch + Duration::from_secs(10)));
		assert_eq!(window.newest(), Some(epoch + Duration::from_secs(20)));
	}

	#[test]
	fn prune_can_empty_the_log() {
		let epoch = Instant::now();
		let mut window = Window::default();

		window.push(epoch);
		window.prune(epoch + Duration::from_secs(1));

		assert_eq!(window.len(), 0);
		assert_eq!(window.oldest(), None);
	}
}
