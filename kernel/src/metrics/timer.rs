//! Timers that accumulate elapsed-duration samples, normalized to nanoseconds.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use serde::ser::SerializeMap as _;
use serde::{Serialize, Serializer};
use serde_json::{Map, Value};
use strum::{AsRefStr, Display as StrumDisplay, EnumString};

use crate::json::{as_object, get_string, get_unsigned_long};
use crate::{Error, KernelResult};

const COUNT: &str = "count";
const TIME_UNIT: &str = "time-unit";
const TOTAL_DURATION: &str = "total-duration";

/// The unit a duration sample is expressed in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumString, StrumDisplay, AsRefStr)]
#[strum(serialize_all = "lowercase")]
pub enum TimeUnit {
    Nanoseconds,
    Microseconds,
    Milliseconds,
    Seconds,
    Minutes,
    Hours,
    Days,
}

impl TimeUnit {
    const fn nanos_per_unit(self) -> u64 {
        match self {
            TimeUnit::Nanoseconds => 1,
            TimeUnit::Microseconds => 1_000,
            TimeUnit::Milliseconds => 1_000_000,
            TimeUnit::Seconds => 1_000_000_000,
            TimeUnit::Minutes => 60 * 1_000_000_000,
            TimeUnit::Hours => 60 * 60 * 1_000_000_000,
            TimeUnit::Days => 24 * 60 * 60 * 1_000_000_000,
        }
    }

    /// Convert `amount` of this unit to nanoseconds, saturating at `u64::MAX`.
    pub fn to_nanos(self, amount: u64) -> u64 {
        amount.saturating_mul(self.nanos_per_unit())
    }
}

fn duration_nanos(duration: Duration) -> u64 {
    u64::try_from(duration.as_nanos()).unwrap_or(u64::MAX)
}

#[derive(Debug, Default)]
pub(crate) struct TimerState {
    count: AtomicU64,
    total_nanos: AtomicU64,
}

/// A handle to a named accumulator of duration samples.
///
/// Every sample bumps the sample count by one and adds its length, converted to nanoseconds, to the
/// running total. Like [`Counter`](super::Counter), clones share state and a no-op timer has none.
#[derive(Debug, Clone)]
pub struct Timer {
    name: Option<Arc<str>>,
    unit: TimeUnit,
    state: Option<Arc<TimerState>>,
}

impl Timer {
    pub(crate) fn new(name: Arc<str>, unit: TimeUnit, state: Arc<TimerState>) -> Self {
        Self {
            name: Some(name),
            unit,
            state: Some(state),
        }
    }

    /// A timer that discards every sample.
    pub fn noop(unit: TimeUnit) -> Self {
        Self {
            name: None,
            unit,
            state: None,
        }
    }

    /// The registered name. No-op handles are anonymous, so creating them never allocates.
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// The unit this timer was registered with. Recorded totals are always kept in nanoseconds.
    pub fn unit(&self) -> TimeUnit {
        self.unit
    }

    pub fn is_noop(&self) -> bool {
        self.state.is_none()
    }

    /// Record one sample of `amount` in `unit`.
    pub fn record(&self, amount: u64, unit: TimeUnit) {
        self.record_nanos(unit.to_nanos(amount));
    }

    /// Record one sample.
    pub fn record_duration(&self, duration: Duration) {
        self.record_nanos(duration_nanos(duration));
    }

    fn record_nanos(&self, nanos: u64) {
        let Some(state) = &self.state else {
            return;
        };
        state.count.fetch_add(1, Ordering::Relaxed);
        // the closure never returns None, so this cannot fail
        let _ = state
            .total_nanos
            .fetch_update(Ordering::Relaxed, Ordering::Relaxed, |total| {
                Some(total.saturating_add(nanos))
            });
    }

    /// Run `f` and record how long it took.
    pub fn time<T>(&self, f: impl FnOnce() -> T) -> T {
        let timed = self.start();
        let result = f();
        timed.stop();
        result
    }

    /// Start measuring a sample. The sample is recorded when the returned guard is stopped or
    /// dropped, whichever comes first.
    pub fn start(&self) -> Timed {
        Timed {
            timer: self.clone(),
            started: Instant::now(),
            recorded: false,
        }
    }

    /// The number of samples recorded so far.
    pub fn count(&self) -> u64 {
        self.state
            .as_ref()
            .map_or(0, |state| state.count.load(Ordering::Relaxed))
    }

    /// The sum of all samples recorded so far.
    pub fn total_duration(&self) -> Duration {
        self.state.as_ref().map_or(Duration::ZERO, |state| {
            Duration::from_nanos(state.total_nanos.load(Ordering::Relaxed))
        })
    }

    /// Snapshot this timer, or `None` if no sample was ever recorded.
    ///
    /// The count and total are read separately, so a sample recorded concurrently with the snapshot
    /// may be reflected in one but not the other.
    pub fn result(&self) -> Option<TimerResult> {
        match self.count() {
            0 => None,
            count => Some(TimerResult::new(count, self.total_duration())),
        }
    }
}

/// An in-flight sample started with [`Timer::start`].
#[derive(Debug)]
#[must_use = "a Timed records its sample when it is stopped or dropped"]
pub struct Timed {
    timer: Timer,
    started: Instant,
    recorded: bool,
}

impl Timed {
    /// Record the elapsed time since [`Timer::start`].
    pub fn stop(mut self) {
        self.record();
    }

    fn record(&mut self) {
        if !self.recorded {
            self.recorded = true;
            self.timer.record_duration(self.started.elapsed());
        }
    }
}

impl Drop for Timed {
    fn drop(&mut self) {
        self.record();
    }
}

/// An immutable snapshot of a [`Timer`]. On the wire the total is always in nanoseconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimerResult {
    count: u64,
    total_duration: Duration,
}

impl TimerResult {
    pub fn new(count: u64, total_duration: Duration) -> Self {
        Self {
            count,
            total_duration,
        }
    }

    pub fn count(&self) -> u64 {
        self.count
    }

    pub fn total_duration(&self) -> Duration {
        self.total_duration
    }

    /// Decode the timer stored under `property` in `node`. Any [`TimeUnit`] is accepted on read and
    /// normalized to nanoseconds.
    ///
    /// Returns `None` when the key is absent or when the entry has no samples.
    pub(crate) fn from_json_field(
        property: &str,
        node: &Map<String, Value>,
    ) -> KernelResult<Option<Self>> {
        let Some(entry) = node.get(property) else {
            return Ok(None);
        };
        let timer = as_object("timer", entry)?;
        let count = get_unsigned_long(COUNT, timer)?;
        let unit = get_string(TIME_UNIT, timer)?;
        let unit: TimeUnit = unit
            .to_ascii_lowercase()
            .parse()
            .map_err(|_| Error::generic(format!("Invalid time unit: {unit}")))?;
        let total = get_unsigned_long(TOTAL_DURATION, timer)?;
        let total_duration = Duration::from_nanos(unit.to_nanos(total));
        Ok((count > 0).then(|| Self::new(count, total_duration)))
    }
}

impl Serialize for TimerResult {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(3))?;
        map.serialize_entry(COUNT, &self.count)?;
        map.serialize_entry(TIME_UNIT, TimeUnit::Nanoseconds.as_ref())?;
        map.serialize_entry(TOTAL_DURATION, &duration_nanos(self.total_duration))?;
        map.end()
    }
}
