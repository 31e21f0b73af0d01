//! Background poll loop.
//!
//! Exactly one poller task runs for the process lifetime. Each tick walks
//! the same ladder: pause check, schedule check, fetch. Transitions are
//! logged only on the edge into a state, not on every cycle spent in it.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use common::{Employee, Error};
use onlocation_client::OnLocationClient;
use tracing::{info, warn};

use crate::cache::PresenceCache;
use crate::controls::PollerControls;
use crate::schedule::BusinessHours;

/// Source of staff lists, a seam for substituting the upstream client.
pub trait StaffSource: Send + Sync {
    /// Fetch the current staff list; one attempt, no internal retry.
    fn fetch_staff(&self) -> impl Future<Output = Result<Vec<Employee>, Error>> + Send;
}

impl StaffSource for OnLocationClient {
    fn fetch_staff(&self) -> impl Future<Output = Result<Vec<Employee>, Error>> + Send {
        OnLocationClient::fetch_staff(self)
    }
}

/// Poll loop states.
///
/// `Starting` is the implicit initial state with no prior edge, so the very
/// first cycle always logs whichever state it lands in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollerState {
    Starting,
    Paused,
    Closed,
    Active,
}

/// The background refresh driver.
pub struct Poller<S> {
    source: S,
    cache: Arc<PresenceCache>,
    hours: BusinessHours,
    controls: Arc<PollerControls>,
    interval: Duration,
    state: PollerState,
}

impl<S: StaffSource> Poller<S> {
    pub fn new(
        source: S,
        cache: Arc<PresenceCache>,
        hours: BusinessHours,
        controls: Arc<PollerControls>,
        interval: Duration,
    ) -> Self {
        Self {
            source,
            cache,
            hours,
            controls,
            interval,
            state: PollerState::Starting,
        }
    }

    /// Run forever at a constant cadence. Fetch failures never break the
    /// loop; they are logged and retried on the next tick.
    pub async fn run(mut self) {
        let mut ticker = tokio::time::interval(self.interval);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

        loop {
            ticker.tick().await;
            self.cycle(Utc::now()).await;
        }
    }

    /// One iteration of the state machine.
    pub async fn cycle(&mut self, now: DateTime<Utc>) {
        if self.controls.is_paused() {
            if self.state != PollerState::Paused {
                info!("Poller paused by debug control — skipping polls");
                self.state = PollerState::Paused;
            }
            return;
        }

        if !self.hours.is_open(now, &self.controls) {
            if self.state != PollerState::Closed {
                info!("Outside business hours — clearing presence list");
                self.cache.write_forced_empty().await;
                self.state = PollerState::Closed;
            }
            return;
        }

        if self.state != PollerState::Active {
            info!("Inside business hours — polling staff presence");
            self.state = PollerState::Active;
        }

        match self.source.fetch_staff().await {
            Ok(employees) => {
                let total = employees.len();
                let onsite = employees.iter().filter(|e| e.is_onsite()).count();
                self.cache.write_success(employees, now).await;
                info!("Polled OK — {} employees ({} onsite)", total, onsite);
            }
            Err(e) => {
                // Last-known-good data keeps being served; staleness
                // surfaces on its own once the threshold elapses.
                warn!("Staff poll failed — serving last known data: {}", e);
            }
        }
    }

    pub fn state(&self) -> PollerState {
        self.state
    }
}
