// std
use std::{
	sync::{Arc, Barrier},
	thread,
	time::Duration,
};
// self
use admission_gate::{
	clock::{ManualClock, SystemClock},
	limit::{LimiterVerdict, SlidingWindowLimiter},
	request::ClientKey,
};

fn manual_limiter(window: Duration, capacity: usize) -> (SlidingWindowLimiter, Arc<ManualClock>) {
	let clock = Arc::new(ManualClock::new());

	(SlidingWindowLimiter::new(window, capacity, clock.clone()), clock)
}

#[test]
fn hundred_per_minute_scenario() {
	// The reference scenario: 100 requests inside one second all pass, the 101st is
	// denied with a hint tracking the oldest hit, and the key recovers after 61
	// simulated seconds.
	let (limiter, clock) = manual_limiter(Duration::from_millis(60_000), 100);
	let key = ClientKey::new("1.2.3.4");

	for _ in 0..100 {
		assert!(limiter.check(&key).is_admit());

		clock.advance(Duration::from_millis(10));
	}

	let LimiterVerdict::Throttle { retry_after_secs } = limiter.check(&key) else {
		panic!("Request 101 should be throttled.");
	};

	// The oldest hit is one second old by now, so 59 whole seconds remain.
	assert_eq!(retry_after_secs, 59);

	clock.advance(Duration::from_secs(61));

	assert!(limiter.check(&key).is_admit());
}

#[test]
fn denial_is_idempotent_across_repeats() {
	let (limiter, _) = manual_limiter(Duration::from_secs(60), 10);
	let key = ClientKey::new("198.51.100.7");

	for _ in 0..10 {
		assert!(limiter.check(&key).is_admit());
	}
	for _ in 0..50 {
		assert!(!limiter.check(&key).is_admit());
	}

	// Fifty denials recorded nothing; the window still holds exactly capacity hits.
	assert_eq!(limiter.tracked_hits(&key), 10);
}

#[test]
fn partial_expiry_frees_exactly_the_aged_slots() {
	let (limiter, clock) = manual_limiter(Duration::from_secs(60), 3);
	let key = ClientKey::new("203.0.113.1");

	limiter.check(&key);
	clock.advance(Duration::from_secs(30));
	limiter.check(&key);
	limiter.check(&key);

	assert!(!limiter.check(&key).is_admit());

	// The first hit ages out at t=60; two younger hits remain, one slot opens.
	clock.advance(Duration::from_secs(31));

	assert!(limiter.check(&key).is_admit());
	assert!(!limiter.check(&key).is_admit());
}

#[test]
fn concurrent_burst_admits_exactly_capacity() {
	const CAPACITY: usize = 100;
	const THREADS: usize = 10;
	const PER_THREAD: usize = 13; // 130 attempts against 100 slots.

	let limiter = Arc::new(SlidingWindowLimiter::new(
		Duration::from_secs(60),
		CAPACITY,
		Arc::new(SystemClock),
	));
	let key = ClientKey::new("1.2.3.4");
	let barrier = Arc::new(Barrier::new(THREADS));
	let handles: Vec<_> = (0..THREADS)
		.map(|_| {
			let limiter = limiter.clone();
			let key = key.clone();
			let barrier = barrier.clone();

			thread::spawn(move || {
				barrier.wait();

				(0..PER_THREAD).filter(|_| limiter.check(&key).is_admit()).count()
			})
		})
		.collect();
	let admitted: usize =
		handles.into_iter().map(|h| h.join().expect("Limiter thread should not panic.")).sum();

	assert_eq!(admitted, CAPACITY);
	assert_eq!(limiter.tracked_hits(&key), CAPACITY);
}

#[test]
fn eviction_prunes_churned_keys_but_spares_active_ones() {
	let (limiter, clock) = manual_limiter(Duration::from_secs(60), 100);

	// A churning population: 500 keys that each show up once and disappear.
	for i in 0..500 {
		limiter.check(&ClientKey::new(format!("10.0.{}.{}", i / 256, i % 256)));
	}

	clock.advance(Duration::from_secs(45));
	limiter.check(&ClientKey::new("active"));
	clock.advance(Duration::from_secs(30));

	assert_eq!(limiter.tracked_keys(), 501);
	assert_eq!(limiter.evict_idle(), 500);
	assert_eq!(limiter.tracked_keys(), 1);

	// The surviving key still carries its in-window hit.
	assert_eq!(limiter.tracked_hits(&ClientKey::new("active")), 1);
}
