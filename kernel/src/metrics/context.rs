//! The [`MetricsContext`] capability and its two implementations.

use std::collections::HashMap;
use std::sync::atomic::AtomicU64;
use std::sync::{Arc, Mutex, MutexGuard};

use tracing::{debug, warn};

use super::{Counter, TimeUnit, Timer, TimerState, Unit};

/// Creates the [`Counter`]s and [`Timer`]s an operation records into.
///
/// Factory calls are idempotent by name: asking twice for the same name returns handles to the same
/// accumulator. Engines that do not want telemetry pass a [`NoopMetricsContext`].
pub trait MetricsContext: Send + Sync + std::fmt::Debug {
    /// Get or create the counter called `name`.
    fn counter(&self, name: &str, unit: Unit) -> Counter;

    /// Get or create the timer called `name`.
    fn timer(&self, name: &str, unit: TimeUnit) -> Timer;
}

#[derive(Debug, Default)]
struct Registry {
    counters: HashMap<Arc<str>, (Unit, Arc<AtomicU64>)>,
    timers: HashMap<Arc<str>, (TimeUnit, Arc<TimerState>)>,
}

/// A [`MetricsContext`] backed by atomic accumulators.
///
/// The first registration of a name fixes its unit; a later request for the same name with a
/// different unit gets the existing accumulator (and its original unit) back.
#[derive(Debug, Default)]
pub struct DefaultMetricsContext {
    registry: Mutex<Registry>,
}

impl DefaultMetricsContext {
    pub fn new() -> Self {
        Self::default()
    }

    fn registry(&self) -> MutexGuard<'_, Registry> {
        // the registry only holds maps of Arcs, so a panic elsewhere cannot leave it inconsistent
        self.registry
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl MetricsContext for DefaultMetricsContext {
    fn counter(&self, name: &str, unit: Unit) -> Counter {
        let mut registry = self.registry();
        if let Some((key, (registered, total))) = registry.counters.get_key_value(name) {
            if *registered != unit {
                warn!(
                    "Counter {name} is registered as {registered}, ignoring requested unit {unit}"
                );
            }
            return Counter::new(key.clone(), *registered, total.clone());
        }
        debug!("Registering counter {name} ({unit})");
        let key: Arc<str> = name.into();
        let total = Arc::new(AtomicU64::new(0));
        registry
            .counters
            .insert(key.clone(), (unit, total.clone()));
        Counter::new(key, unit, total)
    }

    fn timer(&self, name: &str, unit: TimeUnit) -> Timer {
        let mut registry = self.registry();
        if let Some((key, (registered, state))) = registry.timers.get_key_value(name) {
            if *registered != unit {
                warn!("Timer {name} is registered as {registered}, ignoring requested unit {unit}");
            }
            return Timer::new(key.clone(), *registered, state.clone());
        }
        debug!("Registering timer {name} ({unit})");
        let key: Arc<str> = name.into();
        let state = Arc::new(TimerState::default());
        registry.timers.insert(key.clone(), (unit, state.clone()));
        Timer::new(key, unit, state)
    }
}

/// A [`MetricsContext`] whose counters and timers drop every update and always read as zero.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopMetricsContext;

impl MetricsContext for NoopMetricsContext {
    fn counter(&self, _name: &str, unit: Unit) -> Counter {
        Counter::noop(unit)
    }

    fn timer(&self, _name: &str, unit: TimeUnit) -> Timer {
        Timer::noop(unit)
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;

    #[test]
    fn counters_are_idempotent_by_name() {
        let context = DefaultMetricsContext::new();
        context.counter("files", Unit::Count).increment(2);
        context.counter("files", Unit::Count).increment(3);
        context.counter("other", Unit::Count).increment(7);
        assert_eq!(context.counter("files", Unit::Count).value(), 5);
        assert_eq!(context.counter("other", Unit::Count).value(), 7);
    }

    #[test_log::test]
    fn first_registration_fixes_the_unit() {
        let context = DefaultMetricsContext::new();
        context.counter("size", Unit::Bytes).increment(10);
        let again = context.counter("size", Unit::Count);
        assert_eq!(again.unit(), Unit::Bytes);
        assert_eq!(again.value(), 10);

        context.timer("t", TimeUnit::Milliseconds);
        assert_eq!(
            context.timer("t", TimeUnit::Seconds).unit(),
            TimeUnit::Milliseconds
        );
    }

    #[test]
    fn timers_are_idempotent_by_name() {
        let context = DefaultMetricsContext::new();
        context.timer("t", TimeUnit::Nanoseconds).record(1, TimeUnit::Seconds);
        context
            .timer("t", TimeUnit::Nanoseconds)
            .record_duration(Duration::from_secs(2));
        let timer = context.timer("t", TimeUnit::Nanoseconds);
        assert_eq!(timer.count(), 2);
        assert_eq!(timer.total_duration(), Duration::from_secs(3));
    }

    #[test]
    fn counters_and_timers_have_separate_namespaces() {
        let context = DefaultMetricsContext::new();
        context.counter("x", Unit::Count).increment(1);
        assert_eq!(context.timer("x", TimeUnit::Nanoseconds).count(), 0);
    }

    #[test]
    fn noop_context_hands_out_noop_handles() {
        let context = NoopMetricsContext;
        let counter = context.counter("files", Unit::Count);
        counter.increment(5);
        assert!(counter.is_noop());
        assert_eq!(context.counter("files", Unit::Count).value(), 0);

        let timer = context.timer("t", TimeUnit::Nanoseconds);
        timer.record(1, TimeUnit::Days);
        assert!(timer.is_noop());
        assert_eq!(timer.result(), None);
    }

    #[test]
    fn context_can_be_shared_as_trait_object() {
        let context: Arc<dyn MetricsContext> = Arc::new(DefaultMetricsContext::new());
        std::thread::scope(|s| {
            for _ in 0..4 {
                let context = context.clone();
                s.spawn(move || context.counter("shared", Unit::Count).increment(1));
            }
        });
        assert_eq!(context.counter("shared", Unit::Count).value(), 4);
    }
}
