use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use super::{TabRegistry, TickClock, TickResult};
use crate::core::prelude::*;

/// Calls [`TabRegistry::update_all`] once per due tick until stopped.
///
/// The driver itself lives on the thread that owns the bindings. Only the
/// stop flag may be handed to other threads.
#[derive(Debug)]
pub struct PeriodicDriver {
    clock: TickClock,
    stop: Arc<AtomicBool>,
    overruns: u64,
}

impl PeriodicDriver {
    pub fn new(period: Duration) -> Self {
        Self::with_clock(TickClock::new(period))
    }

    pub fn with_clock(clock: TickClock) -> Self {
        Self {
            clock,
            stop: Arc::new(AtomicBool::new(false)),
            overruns: 0,
        }
    }

    pub fn clock(&self) -> &TickClock {
        &self.clock
    }

    /// Number of ticks whose updates took longer than one period
    pub fn overruns(&self) -> u64 {
        self.overruns
    }

    pub fn stop_handle(&self) -> Arc<AtomicBool> {
        self.stop.clone()
    }

    pub fn stop(&self) {
        self.stop.store(true, Ordering::SeqCst);
    }

    pub fn is_stopped(&self) -> bool {
        self.stop.load(Ordering::SeqCst)
    }

    /// Single step: updates the registry if a tick is due at `now`
    pub fn tick(
        &mut self,
        registry: &mut TabRegistry,
        now: Instant,
    ) -> TickResult {
        let result = self.clock.tick(now);
        if !result.due {
            return result;
        }

        if result.periods_missed > 0 {
            warn!(
                "update loop fell behind by {} period(s) of {:?}",
                result.periods_missed,
                self.clock.period()
            );
        }

        let started = Instant::now();
        registry.update_all();
        let took = started.elapsed();

        if took > self.clock.period() {
            self.overruns += 1;
            warn!(
                "tick {} took {:?}; period is {:?}",
                self.clock.tick_count(),
                took,
                self.clock.period()
            );
        }

        result
    }

    /// Runs until the stop flag is set
    pub fn run(&mut self, registry: &mut TabRegistry) {
        info!("driver started; period {:?}", self.clock.period());
        while !self.is_stopped() {
            self.step(registry);
        }
        info!(
            "driver stopped after {} ticks ({} missed periods, {:.1} Hz)",
            self.clock.tick_count(),
            self.clock.missed_count(),
            self.clock.average_rate()
        );
    }

    /// Runs until `ticks` due ticks have fired or the stop flag is set.
    /// Returns the number of ticks that fired.
    pub fn run_for(&mut self, registry: &mut TabRegistry, ticks: u64) -> u64 {
        let mut fired = 0;
        while fired < ticks && !self.is_stopped() {
            if self.step(registry).due {
                fired += 1;
            }
        }
        debug!("ran {} of {} ticks", fired, ticks);
        fired
    }

    fn step(&mut self, registry: &mut TabRegistry) -> TickResult {
        let deadline = self.clock.next_deadline();
        let now = Instant::now();
        if deadline > now {
            thread::sleep(deadline - now);
        }
        self.tick(registry, Instant::now())
    }
}
