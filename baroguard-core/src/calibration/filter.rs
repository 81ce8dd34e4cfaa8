//! Single-pole low-pass filter
//!
//! ```text
//! alpha = dt / (tau + dt)
//! y    += alpha × (x - y)
//! ```
//!
//! The sample interval is fixed when the filter is configured; the
//! reference stream runs at a steady rate so a per-sample `dt` is not
//! needed.

/// Exponential smoothing filter with a configured time constant
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct LowPassFilter {
    alpha: f32,
    time_constant_s: f32,
    state: f32,
}

impl LowPassFilter {
    /// Unconfigured filter, alpha 0
    pub const fn new() -> Self {
        Self { alpha: 0.0, time_constant_s: 0.0, state: 0.0 }
    }

    /// Configure from the sample interval and time constant (seconds)
    ///
    /// Non-positive inputs leave the previous coefficient in place.
    pub fn set_parameters(&mut self, sample_interval_s: f32, time_constant_s: f32) {
        if sample_interval_s > 0.0 && time_constant_s > 0.0 {
            self.alpha = sample_interval_s / (time_constant_s + sample_interval_s);
            self.time_constant_s = time_constant_s;
        }
    }

    /// Jump the output to `value`
    pub fn reset(&mut self, value: f32) {
        self.state = value;
    }

    /// Feed one sample and return the filtered value
    pub fn update(&mut self, sample: f32) -> f32 {
        self.state += self.alpha * (sample - self.state);
        self.state
    }

    /// Current output
    pub fn state(&self) -> f32 {
        self.state
    }

    /// Smoothing coefficient
    pub fn alpha(&self) -> f32 {
        self.alpha
    }

    /// Configured time constant (s)
    pub fn time_constant(&self) -> f32 {
        self.time_constant_s
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn converges_to_step() {
        let mut lpf = LowPassFilter::new();
        lpf.set_parameters(0.2, 2.0);
        lpf.reset(0.0);

        for _ in 0..200 {
            lpf.update(10.0);
        }
        assert!((lpf.state() - 10.0).abs() < 1e-3);
    }

    #[test]
    fn one_time_constant_reaches_63_percent() {
        let mut lpf = LowPassFilter::new();
        lpf.set_parameters(0.01, 2.0);
        lpf.reset(0.0);

        for _ in 0..200 {
            lpf.update(1.0);
        }
        assert!((lpf.state() - 0.632).abs() < 0.01);
    }

    #[test]
    fn invalid_parameters_are_ignored() {
        let mut lpf = LowPassFilter::new();
        lpf.set_parameters(0.1, 1.0);
        let alpha = lpf.alpha();
        lpf.set_parameters(0.0, 1.0);
        assert_eq!(lpf.alpha(), alpha);
        assert_eq!(lpf.time_constant(), 1.0);
    }
}
