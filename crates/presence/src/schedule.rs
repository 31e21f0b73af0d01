//! Business-hours schedule evaluator.

use std::collections::HashMap;

use chrono::{DateTime, Datelike, FixedOffset, Timelike, Utc, Weekday};
use common::config::ScheduleConfig;
use common::Error;

use crate::controls::{PollerControls, ScheduleOverride};

/// Weekday open/close table evaluated in a fixed local timezone.
///
/// Windows are half-open at hour granularity: `open <= hour < close`.
/// A weekday with no entry is closed all day.
#[derive(Debug, Clone)]
pub struct BusinessHours {
    tz: FixedOffset,
    hours: HashMap<Weekday, (u32, u32)>,
}

impl BusinessHours {
    /// Build the table from config, validating keys, windows, and offset.
    pub fn from_config(cfg: &ScheduleConfig) -> Result<Self, Error> {
        let tz = cfg
            .utc_offset_hours
            .checked_mul(3600)
            .and_then(FixedOffset::east_opt)
            .ok_or_else(|| {
                Error::Config(format!(
                    "schedule.utc_offset_hours {} is out of range",
                    cfg.utc_offset_hours
                ))
            })?;

        let mut hours = HashMap::new();
        for (day, &[open, close]) in &cfg.hours {
            let weekday = parse_weekday(day)?;
            if open >= close || close > 24 {
                return Err(Error::Config(format!(
                    "schedule.hours.{}: invalid window [{}, {})",
                    day, open, close
                )));
            }
            hours.insert(weekday, (open, close));
        }

        Ok(Self { tz, hours })
    }

    /// Whether the board is open at `now`.
    ///
    /// Manual overrides win over the table; force-closed wins over
    /// force-open. Pure read of immutable state plus the override atomics.
    pub fn is_open(&self, now: DateTime<Utc>, controls: &PollerControls) -> bool {
        match controls.schedule_override() {
            ScheduleOverride::ForceClosed => return false,
            ScheduleOverride::ForceOpen => return true,
            ScheduleOverride::None => {}
        }

        let local = now.with_timezone(&self.tz);
        match self.hours.get(&local.weekday()) {
            Some(&(open, close)) => {
                let hour = local.hour();
                open <= hour && hour < close
            }
            None => false,
        }
    }
}

fn parse_weekday(day: &str) -> Result<Weekday, Error> {
    match day.to_ascii_lowercase().as_str() {
        "mon" | "monday" => Ok(Weekday::Mon),
        "tue" | "tuesday" => Ok(Weekday::Tue),
        "wed" | "wednesday" => Ok(Weekday::Wed),
        "thu" | "thursday" => Ok(Weekday::Thu),
        "fri" | "friday" => Ok(Weekday::Fri),
        "sat" | "saturday" => Ok(Weekday::Sat),
        "sun" | "sunday" => Ok(Weekday::Sun),
        other => Err(Error::Config(format!(
            "schedule.hours: unknown weekday key '{}'",
            other
        ))),
    }
}
