//! Monotonic, unit-tagged counters.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use serde::ser::SerializeMap as _;
use serde::{Serialize, Serializer};
use serde_json::{Map, Value};
use strum::{AsRefStr, Display as StrumDisplay, EnumString};

use crate::json::{as_object, get_string, get_unsigned_long};
use crate::{Error, KernelResult};

const UNIT: &str = "unit";
const VALUE: &str = "value";

/// The unit of the quantity a [`Counter`] accumulates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumString, StrumDisplay, AsRefStr)]
#[strum(serialize_all = "lowercase")]
pub enum Unit {
    /// A plain number of things (files, manifests, rows).
    Count,
    /// A size in bytes.
    Bytes,
}

/// A handle to a named 64-bit accumulator.
///
/// Handles are cheap to clone and every clone updates the same underlying total, so a counter can
/// be handed to several scan threads at once. A counter created by
/// [`NoopMetricsContext`](super::NoopMetricsContext) has no storage at all: increments are dropped
/// and its value is always zero.
#[derive(Debug, Clone)]
pub struct Counter {
    name: Option<Arc<str>>,
    unit: Unit,
    total: Option<Arc<AtomicU64>>,
}

impl Counter {
    pub(crate) fn new(name: Arc<str>, unit: Unit, total: Arc<AtomicU64>) -> Self {
        Self {
            name: Some(name),
            unit,
            total: Some(total),
        }
    }

    /// A counter that discards every update.
    pub fn noop(unit: Unit) -> Self {
        Self {
            name: None,
            unit,
            total: None,
        }
    }

    /// The registered name. No-op handles are anonymous, so creating them never allocates.
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn unit(&self) -> Unit {
        self.unit
    }

    pub fn is_noop(&self) -> bool {
        self.total.is_none()
    }

    /// Add `amount` to the running total. The total saturates at `u64::MAX`.
    pub fn increment(&self, amount: u64) {
        if let Some(total) = &self.total {
            // the closure never returns None, so this cannot fail
            let _ = total.fetch_update(Ordering::Relaxed, Ordering::Relaxed, |current| {
                Some(current.saturating_add(amount))
            });
        }
    }

    /// The current total. Always zero for a no-op counter.
    pub fn value(&self) -> u64 {
        self.total
            .as_ref()
            .map_or(0, |total| total.load(Ordering::Relaxed))
    }

    /// Snapshot this counter, or `None` if it was never incremented.
    pub fn result(&self) -> Option<CounterResult> {
        match self.value() {
            0 => None,
            value => Some(CounterResult::new(self.unit, value)),
        }
    }
}

/// An immutable snapshot of a [`Counter`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CounterResult {
    unit: Unit,
    value: u64,
}

impl CounterResult {
    pub fn new(unit: Unit, value: u64) -> Self {
        Self { unit, value }
    }

    pub fn unit(&self) -> Unit {
        self.unit
    }

    pub fn value(&self) -> u64 {
        self.value
    }

    /// Decode the counter stored under `property` in `node`.
    ///
    /// Returns `None` when the key is absent, or when the entry records a value of zero: a counter
    /// that never moved is indistinguishable from one that was never recorded.
    pub(crate) fn from_json_field(
        property: &str,
        node: &Map<String, Value>,
    ) -> KernelResult<Option<Self>> {
        let Some(entry) = node.get(property) else {
            return Ok(None);
        };
        let counter = as_object("counter", entry)?;
        let unit = get_string(UNIT, counter)?;
        let unit: Unit = unit
            .to_ascii_lowercase()
            .parse()
            .map_err(|_| Error::generic(format!("Invalid unit: {unit}")))?;
        let value = get_unsigned_long(VALUE, counter)?;
        Ok((value > 0).then(|| Self::new(unit, value)))
    }
}

impl Serialize for CounterResult {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(2))?;
        map.serialize_entry(UNIT, self.unit.as_ref())?;
        map.serialize_entry(VALUE, &self.value)?;
        map.end()
    }
}
