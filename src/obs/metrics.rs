// self
use crate::obs::{GateStage, StageOutcome};

/// Records a stage outcome via the global metrics recorder (when enabled).
pub fn record_stage_outcome(stage: GateStage, outcome: StageOutcome) {
	#[cfg(feature = "metrics")]
	{
		metrics::counter!(
			"admission_gate_stage_total",
			"stage" => stage.as_str(),
			"outcome" => outcome.as_str()
		)
		.increment(1);
	}

	#[cfg(not(feature = "metrics"))]
	{
		let _ = (stage, outcome);
	}
}

/// Records the number of limiter keys removed by an eviction sweep.
pub fn record_sweep(evicted: usize) {
	#[cfg(feature = "metrics")]
	{
		metrics::counter!("admission_gate_evicted_keys_total").increment(evicted as u64);
	}

	#[cfg(not(feature = "metrics"))]
	{
		let _ = evicted;
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn recorders_noop_without_metrics() {
		record_stage_outcome(GateStage::RateLimit, StageOutcome::Failure);
		record_sweep(0);
	}
}
