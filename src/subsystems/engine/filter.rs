//! Slow low-pass filtering shared by the engine's sensor front-ends

/// Time after which the previous sample no longer seeds the filter (ms)
pub(crate) const SAMPLE_STALE_MS: u64 = 5000;

/// Very slow first-order low-pass filter
///
/// `y <- 0.1*y + 0.9*x` per sample. The first sample, or a sample arriving
/// after a stale gap, bypasses the filter entirely so the output never
/// blends across an outage.
#[derive(Debug, Default)]
pub(crate) struct SlowLowPass {
    value: f32,
    last_sample_ms: u64,
}

impl SlowLowPass {
    pub(crate) const fn new() -> Self {
        Self {
            value: 0.0,
            last_sample_ms: 0,
        }
    }

    /// Fold in a sample taken at `now_ms`, returning the filtered value
    pub(crate) fn apply(&mut self, sample: f32, now_ms: u64) -> f32 {
        if self.last_sample_ms == 0
            || now_ms.saturating_sub(self.last_sample_ms) > SAMPLE_STALE_MS
        {
            // first or stale sample, jump to it immediately
            self.value = sample;
        } else {
            self.value = 0.1 * self.value + 0.9 * sample;
        }
        self.last_sample_ms = now_ms;
        self.value
    }

    /// Last filtered value
    pub(crate) fn value(&self) -> f32 {
        self.value
    }

    /// Whether a sample landed within the staleness window
    pub(crate) fn healthy(&self, now_ms: u64) -> bool {
        self.last_sample_ms != 0
            && now_ms.saturating_sub(self.last_sample_ms) <= SAMPLE_STALE_MS
    }

    /// Forget all samples
    pub(crate) fn reset(&mut self) {
        self.value = 0.0;
        self.last_sample_ms = 0;
    }
}
