/// Periodic documents-in-collection refresh with an hourly rate estimate.
///
/// Each tick reads `[secondary, primary]`. Both values are displayed as-is;
/// the rate is the change in `primary` since the previous tick, scaled from
/// one interval up to one hour. No rate is shown until a positive previous
/// sample exists, so the first tick never reports a delta against zero.
use serde::Serialize;

use crate::client::{CounterValue, DocsReading};

/// Reference polling interval.
pub const DEFAULT_INTERVAL_MS: u64 = 30_000;

const HOUR_MS: u64 = 3_600_000;

/// The previous primary reading. Zero means "no prior sample".
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RateSample {
    prev: u64,
}

impl RateSample {
    pub fn prev(&self) -> u64 {
        self.prev
    }

    /// Record `current` and return the per-hour rate if a prior sample existed.
    pub fn observe(&mut self, current: u64, interval_ms: u64) -> Option<i64> {
        let rate = (self.prev > 0).then(|| hourly_rate(self.prev, current, interval_ms));
        self.prev = current;
        rate
    }
}

/// Scale the per-interval delta to a per-hour estimate.
///
/// Integer arithmetic when the interval divides an hour (30 s gives ×120);
/// otherwise the product is rounded to the nearest integer. Decreasing
/// counters yield negative rates. Rates beyond the `i64` range saturate.
pub fn hourly_rate(prev: u64, current: u64, interval_ms: u64) -> i64 {
    let delta = i128::from(current) - i128::from(prev);
    let interval_ms = interval_ms.max(1);
    let rate = if HOUR_MS % interval_ms == 0 {
        delta * i128::from(HOUR_MS / interval_ms)
    } else {
        (delta as f64 * HOUR_MS as f64 / interval_ms as f64).round() as i128
    };
    rate.clamp(i128::from(i64::MIN), i128::from(i64::MAX)) as i64
}

/// The displayed fields of the metric widget.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct MetricFields {
    pub docs_in_collection: Option<u64>,
    pub secondary: Option<CounterValue>,
    pub rate_per_hour: Option<i64>,
}

/// The metric refresher widget state.
#[derive(Debug, Clone)]
pub struct MetricRefresher {
    interval_ms: u64,
    sample: RateSample,
    fields: MetricFields,
    ticks: u64,
}

impl MetricRefresher {
    pub fn new(interval_ms: u64) -> Self {
        Self {
            interval_ms: interval_ms.max(1),
            sample: RateSample::default(),
            fields: MetricFields::default(),
            ticks: 0,
        }
    }

    pub fn interval_ms(&self) -> u64 {
        self.interval_ms
    }

    pub fn sample(&self) -> RateSample {
        self.sample
    }

    pub fn fields(&self) -> &MetricFields {
        &self.fields
    }

    /// Readings applied so far.
    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    /// Apply one reading. Returns the rate when one was derived.
    ///
    /// Both counters are updated unconditionally. A tick without a rate keeps
    /// the previously displayed rate.
    pub fn apply(&mut self, reading: DocsReading) -> Option<i64> {
        self.ticks += 1;
        self.fields.docs_in_collection = Some(reading.primary);
        self.fields.secondary = Some(reading.secondary);

        let rate = self.sample.observe(reading.primary, self.interval_ms);
        if rate.is_some() {
            self.fields.rate_per_hour = rate;
        }
        rate
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn reading(secondary: u64, primary: u64) -> DocsReading {
        DocsReading {
            secondary: CounterValue::Number(secondary.into()),
            primary,
        }
    }

    #[test]
    fn first_tick_has_no_rate() {
        let mut refresher = MetricRefresher::new(30_000);
        assert_eq!(refresher.apply(reading(1, 50)), None);
        assert_eq!(refresher.sample().prev(), 50);
        assert_eq!(refresher.fields().docs_in_collection, Some(50));
        assert_eq!(refresher.fields().rate_per_hour, None);
    }

    #[test]
    fn second_tick_scales_delta_to_hour() {
        let mut refresher = MetricRefresher::new(30_000);
        refresher.apply(reading(1, 50));
        assert_eq!(refresher.apply(reading(2, 65)), Some(1800));
        assert_eq!(refresher.fields().rate_per_hour, Some(1800));
        assert_eq!(refresher.fields().secondary.as_ref().unwrap().to_string(), "2");
    }

    #[test]
    fn decreasing_counter_gives_negative_rate() {
        let mut sample = RateSample::default();
        sample.observe(100, 30_000);
        assert_eq!(sample.observe(90, 30_000), Some(-1200));
        assert_eq!(sample.prev(), 90);
    }

    #[test]
    fn huge_counters_saturate_instead_of_overflowing() {
        let mut sample = RateSample::default();
        sample.observe(1, 30_000);
        assert_eq!(sample.observe(100_000_000_000_000_000, 30_000), Some(i64::MAX));
        assert_eq!(sample.observe(1, 30_000), Some(i64::MIN));

        assert_eq!(hourly_rate(1, u64::MAX, 30_000), i64::MAX);
        assert_eq!(hourly_rate(u64::MAX, u64::MAX - 2, 30_000), -240);
        assert_eq!(hourly_rate(1, u64::MAX, 7_000), i64::MAX);
    }

    #[test]
    fn zero_reading_resets_to_no_sample() {
        let mut sample = RateSample::default();
        sample.observe(40, 30_000);
        assert_eq!(sample.observe(0, 30_000), Some(-4800));
        // prev is 0 again, so the next tick has nothing to compare against
        assert_eq!(sample.observe(10, 30_000), None);
    }

    #[test]
    fn rate_for_other_intervals() {
        assert_eq!(hourly_rate(100, 110, 60_000), 600);
        assert_eq!(hourly_rate(100, 110, 3_600_000), 10);
        // 7 s does not divide an hour: 10 * 3600000 / 7000 = 5142.857...
        assert_eq!(hourly_rate(100, 110, 7_000), 5143);
    }

    #[test]
    fn tick_without_rate_keeps_displayed_rate() {
        let mut refresher = MetricRefresher::new(30_000);
        refresher.apply(reading(0, 10));
        refresher.apply(reading(0, 20));
        assert_eq!(refresher.fields().rate_per_hour, Some(1200));

        refresher.apply(reading(0, 0));
        refresher.apply(reading(0, 5));
        assert_eq!(refresher.fields().rate_per_hour, Some(-2400));
        assert_eq!(refresher.ticks(), 4);
    }
}
