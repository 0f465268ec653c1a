//! Filter timing instrumentation
//!
//! Purely observational: a [`TimingSink`] receives per-sample and per-frame
//! durations and never influences the filter output.

use std::time::Duration;

use chrono::Utc;
use rolling_stats::Stats;
use serde::Serialize;

use crate::constants::TIMING_WARMUP_SAMPLES;

/// Receiver of filter timing measurements
pub trait TimingSink: Send {
    /// Whether durations should be measured at all
    fn enabled(&self) -> bool {
        true
    }

    /// Time taken to compute one output sample
    fn record_sample(&mut self, elapsed: Duration);

    /// Time taken to process one whole frame
    fn record_frame(&mut self, elapsed: Duration);

    /// Summary of the measurements so far
    fn report(&self) -> Option<TimingReport> {
        None
    }
}

/// Timing sink that measures nothing
pub struct NoTiming;

impl TimingSink for NoTiming {
    fn enabled(&self) -> bool {
        false
    }

    fn record_sample(&mut self, _elapsed: Duration) {}

    fn record_frame(&mut self, _elapsed: Duration) {}
}

/// Average filter timing, serialized as the per-stage performance report
#[derive(Debug, Clone, Serialize)]
pub struct TimingReport {
    pub generated_at: String,
    pub samples_measured: usize,
    pub frames_measured: usize,
    /// Mean time per output sample in nanoseconds
    pub filter_time: f64,
    /// Mean time per filter tap in nanoseconds
    pub tap_time: f64,
    pub filter_time_std_dev: f64,
    pub filter_time_min: f64,
    pub filter_time_max: f64,
    /// Mean time per frame in nanoseconds
    #[serde(skip_serializing_if = "Option::is_none")]
    pub frame_time: Option<f64>,
}

/// Rolling statistics of filter execution time
///
/// The first `warmup` sample timings are discarded so the averages reflect
/// steady-state behavior rather than cold caches.
pub struct FilterTimer {
    tap_count: usize,
    warmup_remaining: u64,
    sample_stats: Stats<f64>,
    frame_stats: Stats<f64>,
}

impl FilterTimer {
    pub fn new(tap_count: usize) -> Self {
        Self::with_warmup(tap_count, TIMING_WARMUP_SAMPLES)
    }

    pub fn with_warmup(tap_count: usize, warmup: u64) -> Self {
        Self {
            tap_count,
            warmup_remaining: warmup,
            sample_stats: Stats::new(),
            frame_stats: Stats::new(),
        }
    }

    pub fn samples_measured(&self) -> usize {
        self.sample_stats.count
    }
}

impl TimingSink for FilterTimer {
    fn record_sample(&mut self, elapsed: Duration) {
        if self.warmup_remaining > 0 {
            self.warmup_remaining -= 1;
            return;
        }
        self.sample_stats.update(elapsed.as_nanos() as f64);
    }

    fn record_frame(&mut self, elapsed: Duration) {
        if self.warmup_remaining == 0 {
            self.frame_stats.update(elapsed.as_nanos() as f64);
        }
    }

    fn report(&self) -> Option<TimingReport> {
        if self.sample_stats.count == 0 {
            return None;
        }
        let frame_time = (self.frame_stats.count > 0).then_some(self.frame_stats.mean);
        Some(TimingReport {
            generated_at: Utc::now().format("%Y-%m-%dT%H:%M:%S%.3fZ").to_string(),
            samples_measured: self.sample_stats.count,
            frames_measured: self.frame_stats.count,
            filter_time: self.sample_stats.mean,
            tap_time: self.sample_stats.mean / self.tap_count.max(1) as f64,
            filter_time_std_dev: self.sample_stats.std_dev,
            filter_time_min: self.sample_stats.min,
            filter_time_max: self.sample_stats.max,
            frame_time,
        })
    }
}
