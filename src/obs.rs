//! Optional observability helpers for gate stages.
//!
//! # Feature Flags
//!
//! - Enable `tracing` to emit structured spans named `admission_gate.stage` with the
//!   `stage` and `fingerprint` fields. Spans carry credential fingerprints only, never
//!   raw credential material.
//! - Enable `metrics` to increment the `admission_gate_stage_total` counter for every
//!   attempt/success/failure, labeled by `stage` + `outcome`, plus the
//!   `admission_gate_evicted_keys_total` counter fed by the limiter sweeper.

mod metrics;
mod tracing;

pub use metrics::*;
pub use tracing::*;

// self
use crate::_prelude::*;

/// Pipeline stages observed by the gate.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum GateStage {
	/// Sliding-window limiter check.
	RateLimit,
	/// Access-credential verification.
	Verify,
	/// Refresh-credential exchange.
	Exchange,
}
impl GateStage {
	/// Returns a stable label suitable for span or metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			GateStage::RateLimit => "rate_limit",
			GateStage::Verify => "verify",
			GateStage::Exchange => "exchange",
		}
	}
}
impl Display for GateStage {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// Outcome labels recorded for each attempt.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum StageOutcome {
	/// Entry to a gate stage.
	Attempt,
	/// Successful completion.
	Success,
	/// Failure propagated back to the caller.
	Failure,
}
impl StageOutcome {
	/// Returns a stable label suitable for span or metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			StageOutcome::Attempt => "attempt",
			StageOutcome::Success => "success",
			StageOutcome::Failure => "failure",
		}
	}
}
impl Display for StageOutcome {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}
