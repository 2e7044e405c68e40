use std::collections::VecDeque;
use std::time::{Duration, Instant};

pub const DEFAULT_TICK_PERIOD: Duration = Duration::from_millis(20);

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct TickResult {
    pub due: bool,
    /// Whole periods that elapsed since the previous due tick
    pub periods_elapsed: u32,
    /// Periods beyond the first; these are counted, never replayed
    pub periods_missed: u32,
}

/// Fixed-period clock for the update loop.
///
/// Unlike a render clock it never catches up: however late a tick is, it
/// fires once and the skipped periods are added to [`Self::missed_count`].
#[derive(Debug)]
pub struct TickClock {
    period: Duration,
    tick_count: u64,
    missed_count: u64,
    last_tick: Instant,
    accumulator: Duration,
    tick_intervals: VecDeque<Duration>,
    since_last_due: Duration,
    max_intervals: usize,
}

impl TickClock {
    pub fn new(period: Duration) -> Self {
        Self::with_start(period, Instant::now())
    }

    pub fn with_start(period: Duration, now: Instant) -> Self {
        Self {
            period: Self::clamp(period),
            tick_count: 0,
            missed_count: 0,
            last_tick: now,
            accumulator: Duration::ZERO,
            tick_intervals: VecDeque::new(),
            since_last_due: Duration::ZERO,
            max_intervals: 50,
        }
    }

    pub fn period(&self) -> Duration {
        self.period
    }

    pub fn set_period(&mut self, period: Duration) {
        self.period = Self::clamp(period);
    }

    pub fn tick_count(&self) -> u64 {
        self.tick_count
    }

    pub fn missed_count(&self) -> u64 {
        self.missed_count
    }

    pub fn next_deadline(&self) -> Instant {
        let remaining = self
            .period
            .checked_sub(self.accumulator)
            .unwrap_or_default();
        self.last_tick + remaining
    }

    /// Due ticks per second over the recent window
    pub fn average_rate(&self) -> f64 {
        if self.tick_intervals.is_empty() {
            return 0.0;
        }

        let sum: Duration = self.tick_intervals.iter().copied().sum();
        let avg = sum / self.tick_intervals.len() as u32;

        if avg.is_zero() {
            return 0.0;
        }

        1.0 / avg.as_secs_f64()
    }

    pub fn tick(&mut self, now: Instant) -> TickResult {
        let elapsed = now.saturating_duration_since(self.last_tick);
        self.last_tick = now;
        self.accumulator += elapsed;
        self.since_last_due += elapsed;

        if self.accumulator < self.period {
            return TickResult::default();
        }

        let periods = (self.accumulator.as_nanos() / self.period.as_nanos())
            .min(u32::MAX as u128) as u32;
        self.accumulator = Duration::from_nanos(
            (self.accumulator.as_nanos() % self.period.as_nanos()) as u64,
        );

        let missed = periods.saturating_sub(1);
        self.tick_count += 1;
        self.missed_count += missed as u64;

        let interval = std::mem::take(&mut self.since_last_due);
        self.record_interval(interval);

        TickResult {
            due: true,
            periods_elapsed: periods,
            periods_missed: missed,
        }
    }

    fn clamp(period: Duration) -> Duration {
        period.max(Duration::from_millis(1))
    }

    fn record_interval(&mut self, interval: Duration) {
        self.tick_intervals.push_back(interval);
        if self.tick_intervals.len() > self.max_intervals {
            self.tick_intervals.pop_front();
        }
    }
}

impl Default for TickClock {
    fn default() -> Self {
        Self::new(DEFAULT_TICK_PERIOD)
    }
}
