//! Token usage and cost tracking for a generation run.

use crate::provider::{Generation, TextGenerator};

/// Running usage tracker during generation.
#[derive(Debug, Default)]
pub struct UsageTracker {
    pub calls: usize,
    pub prompt_tokens: u64,
    pub completion_tokens: u64,
    input_rate: f64,
    output_rate: f64,
}

impl UsageTracker {
    pub fn new(generator: &dyn TextGenerator) -> Self {
        Self {
            input_rate: generator.cost_per_mtok_input(),
            output_rate: generator.cost_per_mtok_output(),
            ..Self::default()
        }
    }

    /// Record one completed call.
    pub fn record(&mut self, generation: &Generation) {
        self.calls += 1;
        if let Some(t) = generation.prompt_tokens {
            self.prompt_tokens += t;
        }
        if let Some(t) = generation.completion_tokens {
            self.completion_tokens += t;
        }
    }

    /// Record a call whose response could not be decoded. It still counts as a
    /// call, but reports no usage.
    pub fn record_failed(&mut self) {
        self.calls += 1;
    }

    /// Current total cost in USD.
    pub fn total_cost_usd(&self) -> f64 {
        (self.prompt_tokens as f64 / 1_000_000.0) * self.input_rate
            + (self.completion_tokens as f64 / 1_000_000.0) * self.output_rate
    }
}
