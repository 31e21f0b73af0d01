//! Presence engine: cache, business-hours schedule, poll loop, and the
//! debug control plane.
//!
//! One background [`Poller`] task owns all cache writes; any number of
//! request handlers read consistent [`common::PresenceSnapshot`]s through
//! [`PresenceCache::snapshot`].

pub mod cache;
pub mod controls;
pub mod poller;
pub mod schedule;

pub use cache::PresenceCache;
pub use controls::{PollerControls, ScheduleOverride};
pub use poller::{Poller, PollerState, StaffSource};
pub use schedule::BusinessHours;
