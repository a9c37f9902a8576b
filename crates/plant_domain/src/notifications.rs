use std::sync::atomic::{AtomicU64, Ordering};

use anyhow::Result;
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::plant::{RepeatEvery, WaterFrequency};

/// Source of "now". Injected so tests can pin the clock and make scheduling
/// deterministic.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Opaque token identifying an armed reminder.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(transparent)]
pub struct NotificationHandle(String);

impl NotificationHandle {
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArmedReminder {
    pub fire_at: DateTime<Utc>,
    pub handle: NotificationHandle,
}

/// Platform-specific reminder adapters implement this trait.
pub trait NotificationScheduler: Send + Sync {
    /// Compute the next reminder instant from a watering frequency and arm it.
    fn schedule_next(&self, frequency: &WaterFrequency) -> Result<ArmedReminder>;

    /// Arm a reminder at an explicit instant.
    fn schedule_at(&self, fire_at: DateTime<Utc>) -> Result<NotificationHandle>;

    /// Best-effort disarm of a previously armed reminder.
    fn cancel(&self, handle: &NotificationHandle) -> Result<()>;
}

/// An armed trigger is never closer than a minute out.
const MIN_TRIGGER_SECONDS: i64 = 60;

/// In-process scheduler with the reminder cadence of the mobile app: weekly
/// plants come due every `7 / times` days (at least one), daily plants once
/// a day. Handles come from a process-local counter.
pub struct IntervalScheduler {
    clock: Box<dyn Clock>,
    next_handle: AtomicU64,
}

impl IntervalScheduler {
    pub fn new(clock: Box<dyn Clock>) -> Self {
        Self {
            clock,
            next_handle: AtomicU64::new(0),
        }
    }

    fn arm(&self, fire_at: DateTime<Utc>) -> NotificationHandle {
        let earliest = self.clock.now() + Duration::seconds(MIN_TRIGGER_SECONDS);
        let trigger = fire_at.max(earliest);
        let seq = self.next_handle.fetch_add(1, Ordering::Relaxed);
        let handle = NotificationHandle::new(format!("reminder-{seq}"));
        debug!(requested = %fire_at, effective = %trigger, handle = handle.as_str(), "armed watering reminder");
        handle
    }
}

impl Default for IntervalScheduler {
    fn default() -> Self {
        Self::new(Box::new(SystemClock))
    }
}

impl NotificationScheduler for IntervalScheduler {
    fn schedule_next(&self, frequency: &WaterFrequency) -> Result<ArmedReminder> {
        let days = match frequency.repeat_every {
            RepeatEvery::Week => i64::from((7 / frequency.times.max(1)).max(1)),
            RepeatEvery::Day => 1,
        };
        let fire_at = self.clock.now() + Duration::days(days);
        let handle = self.arm(fire_at);
        Ok(ArmedReminder { fire_at, handle })
    }

    fn schedule_at(&self, fire_at: DateTime<Utc>) -> Result<NotificationHandle> {
        Ok(self.arm(fire_at))
    }

    fn cancel(&self, handle: &NotificationHandle) -> Result<()> {
        debug!(handle = handle.as_str(), "disarmed watering reminder");
        Ok(())
    }
}
