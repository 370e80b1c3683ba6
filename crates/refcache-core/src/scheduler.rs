//! Refresh scheduler
//!
//! A recurring daily trigger that forces a live refresh and re-persist
//! (`engine.initialize(force = true)`). At most one active trigger per
//! engine instance: starting a new schedule implicitly stops the previous
//! one, and `stop` is idempotent.

use crate::engine::CacheEngine;
use crate::{Error, Result};
use chrono::{DateTime, NaiveTime, Utc};
use parking_lot::Mutex;
use std::sync::Arc;
use tokio::sync::oneshot;
use tracing::{error, info};

/// A daily wall-clock trigger in a fixed (UTC) zone, parsed from `HH:MM`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScheduleSpec {
    hour: u32,
    minute: u32,
}

impl ScheduleSpec {
    /// Parse an `HH:MM` schedule expression
    pub fn parse(expr: &str) -> Result<Self> {
        let expr = expr.trim();
        let invalid =
            || Error::scheduler(format!("invalid schedule expression '{}', expected HH:MM", expr));

        let (hour, minute) = expr.split_once(':').ok_or_else(invalid)?;
        let hour: u32 = hour.parse().map_err(|_| invalid())?;
        let minute: u32 = minute.parse().map_err(|_| invalid())?;
        if hour > 23 || minute > 59 {
            return Err(invalid());
        }
        Ok(Self { hour, minute })
    }

    /// The next occurrence of this trigger strictly after `now`
    pub fn next_after(&self, now: DateTime<Utc>) -> DateTime<Utc> {
        // Bounds validated in parse(), so this can't fail
        let time = NaiveTime::from_hms_opt(self.hour, self.minute, 0).unwrap();
        let today = now.date_naive().and_time(time).and_utc();
        if today > now {
            today
        } else {
            (now.date_naive() + chrono::Days::new(1)).and_time(time).and_utc()
        }
    }
}

/// Background task that forces a live cache refresh on a daily schedule
pub struct RefreshScheduler {
    engine: Arc<CacheEngine>,
    /// Shutdown signal for the active job, if any
    shutdown_tx: Mutex<Option<oneshot::Sender<()>>>,
}

impl RefreshScheduler {
    /// Create a scheduler for the given engine
    pub fn new(engine: Arc<CacheEngine>) -> Self {
        Self {
            engine,
            shutdown_tx: Mutex::new(None),
        }
    }

    /// Whether a recurring job is currently active
    pub fn is_running(&self) -> bool {
        self.shutdown_tx.lock().is_some()
    }

    /// Start the recurring refresh job.
    ///
    /// An invalid schedule expression is logged and the scheduler simply
    /// does not start (returns false); it is never fatal to the engine.
    /// Starting replaces any previously active job.
    pub fn start(&self, schedule: &str) -> bool {
        let spec = match ScheduleSpec::parse(schedule) {
            Ok(spec) => spec,
            Err(err) => {
                error!(%err, "refresh scheduler not started");
                return false;
            }
        };

        // At most one active trigger per engine instance
        self.stop();

        let (shutdown_tx, mut shutdown_rx) = oneshot::channel();
        *self.shutdown_tx.lock() = Some(shutdown_tx);

        let engine = Arc::clone(&self.engine);
        tokio::spawn(async move {
            loop {
                let now = Utc::now();
                let next = spec.next_after(now);
                let wait = (next - now).to_std().unwrap_or_default();
                info!(at = %next, "next scheduled cache refresh");

                tokio::select! {
                    _ = tokio::time::sleep(wait) => {
                        info!("running scheduled cache refresh");
                        if let Err(err) = engine.initialize(true).await {
                            error!(%err, "scheduled cache refresh failed");
                        }
                    }
                    _ = &mut shutdown_rx => {
                        info!("refresh scheduler stopped");
                        return;
                    }
                }
            }
        });

        info!(schedule, "cache refresh scheduler started");
        true
    }

    /// Stop the recurring job. Idempotent; a no-op when nothing is running.
    pub fn stop(&self) {
        if let Some(tx) = self.shutdown_tx.lock().take() {
            let _ = tx.send(());
        }
    }
}

impl Drop for RefreshScheduler {
    fn drop(&mut self) {
        self.stop();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_parse_valid_expressions() {
        assert_eq!(
            ScheduleSpec::parse("02:00").unwrap(),
            ScheduleSpec { hour: 2, minute: 0 }
        );
        assert_eq!(
            ScheduleSpec::parse(" 23:59 ").unwrap(),
            ScheduleSpec { hour: 23, minute: 59 }
        );
    }

    #[test]
    fn test_parse_invalid_expressions() {
        for expr in ["", "0200", "24:00", "02:60", "ab:cd", "2", "02:00:00"] {
            assert!(ScheduleSpec::parse(expr).is_err(), "accepted '{}'", expr);
        }
    }

    #[test]
    fn test_next_after_later_today() {
        let spec = ScheduleSpec::parse("02:00").unwrap();
        let now = Utc.with_ymd_and_hms(2026, 3, 1, 1, 30, 0).unwrap();
        assert_eq!(
            spec.next_after(now),
            Utc.with_ymd_and_hms(2026, 3, 1, 2, 0, 0).unwrap()
        );
    }

    #[test]
    fn test_next_after_rolls_to_tomorrow() {
        let spec = ScheduleSpec::parse("02:00").unwrap();
        let now = Utc.with_ymd_and_hms(2026, 3, 1, 2, 0, 0).unwrap();
        assert_eq!(
            spec.next_after(now),
            Utc.with_ymd_and_hms(2026, 3, 2, 2, 0, 0).unwrap()
        );
    }
}
