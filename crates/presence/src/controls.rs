//! Debug control plane shared between the poll loop and the HTTP layer.
//!
//! Toggles are infrequent, so relaxed atomics are enough; the schedule
//! override lives in a single atomic so force-open/force-closed stay
//! mutually exclusive and clearing resets both in one store.

use std::sync::atomic::{AtomicBool, AtomicU8, Ordering};

/// Manual override of the business-hours schedule.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScheduleOverride {
    None,
    ForceOpen,
    ForceClosed,
}

const OVERRIDE_NONE: u8 = 0;
const OVERRIDE_FORCE_OPEN: u8 = 1;
const OVERRIDE_FORCE_CLOSED: u8 = 2;

/// Shared mutable debug flags.
///
/// Always present; with no routes toggling it the struct is inert and the
/// poller behaves as in production.
#[derive(Debug, Default)]
pub struct PollerControls {
    pause: AtomicBool,
    fail_next: AtomicBool,
    schedule_override: AtomicU8,
}

impl PollerControls {
    pub fn new() -> Self {
        Self::default()
    }

    /// Skip polling until resumed.
    pub fn pause(&self) {
        self.pause.store(true, Ordering::Relaxed);
    }

    pub fn resume(&self) {
        self.pause.store(false, Ordering::Relaxed);
    }

    pub fn is_paused(&self) -> bool {
        self.pause.load(Ordering::Relaxed)
    }

    /// Make the next presence request fail with a 503.
    pub fn arm_fail_next(&self) {
        self.fail_next.store(true, Ordering::Relaxed);
    }

    /// Consume the one-shot fail flag; true at most once per arming.
    pub fn take_fail_next(&self) -> bool {
        self.fail_next.swap(false, Ordering::Relaxed)
    }

    /// Treat the schedule as open regardless of the table.
    pub fn force_open(&self) {
        self.schedule_override
            .store(OVERRIDE_FORCE_OPEN, Ordering::Relaxed);
    }

    /// Treat the schedule as closed; wins over a previous force-open.
    pub fn force_closed(&self) {
        self.schedule_override
            .store(OVERRIDE_FORCE_CLOSED, Ordering::Relaxed);
    }

    /// Drop any manual schedule override.
    pub fn clear_override(&self) {
        self.schedule_override.store(OVERRIDE_NONE, Ordering::Relaxed);
    }

    pub fn schedule_override(&self) -> ScheduleOverride {
        match self.schedule_override.load(Ordering::Relaxed) {
            OVERRIDE_FORCE_OPEN => ScheduleOverride::ForceOpen,
            OVERRIDE_FORCE_CLOSED => ScheduleOverride::ForceClosed,
            _ => ScheduleOverride::None,
        }
    }
}
