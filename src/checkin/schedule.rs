//! Daily timer. Fires the coordinator's send once per 24 hours at a fixed
//! UTC time-of-day, survives failed fires, and answers "when is the next
//! one" for the diagnostic command.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use chrono::{DateTime, Days, NaiveTime, TimeZone, Utc};
use tracing::{error, info, instrument};

use super::coordinator::{CheckinResult, Coordinator};

pub struct Scheduler {
    fire_time: NaiveTime,
    coordinator: Arc<Coordinator>,
    running: AtomicBool,
}

impl Scheduler {
    pub fn new(fire_time: NaiveTime, coordinator: Arc<Coordinator>) -> Self {
        Self {
            fire_time,
            coordinator,
            running: AtomicBool::new(false),
        }
    }

    pub fn fire_time(&self) -> NaiveTime {
        self.fire_time
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    /// The next scheduled fire after `now`. Time-of-day comparison only: a
    /// fire time of 07:00:00 checked at 07:00:01 has already passed for the
    /// day, so the next fire is tomorrow.
    pub fn next_fire_time(&self, now: DateTime<Utc>) -> DateTime<Utc> {
        let date = if now.time() > self.fire_time {
            now.date_naive() + Days::new(1)
        } else {
            now.date_naive()
        };

        Utc.from_utc_datetime(&date.and_time(self.fire_time))
    }

    /// Spawns the daily loop. Idempotent; calling on an already-running
    /// scheduler is a no-op.
    pub fn start(self: &Arc<Self>) {
        if self.running.swap(true, Ordering::SeqCst) {
            info!("daily check-in task is already running");
            return;
        }

        info!(fire_time = %self.fire_time, "daily check-in task initiated");

        let scheduler = Arc::clone(self);
        tokio::spawn(async move {
            scheduler.run_loop().await;
        });
    }

    /// Runs the send immediately, outside the schedule. The timer task is
    /// untouched; its next fire stays where it was.
    #[instrument(skip(self))]
    pub async fn invoke_now(&self) -> CheckinResult<()> {
        self.coordinator.send_daily_check_in().await
    }

    async fn run_loop(&self) {
        loop {
            let now = Utc::now();
            let next = self.next_fire_time(now);
            let wait = (next - now).to_std().unwrap_or(Duration::ZERO);

            info!(next_fire = %next, wait_secs = wait.as_secs(), "sleeping until next fire");
            tokio::time::sleep(wait).await;

            if let Err(e) = self.coordinator.send_daily_check_in().await {
                // One failed fire never stops the cadence.
                error!(error = %e, "scheduled check-in failed");
            }

            // Step past the fire second so the recompute lands on tomorrow.
            tokio::time::sleep(Duration::from_secs(1)).await;
        }
    }
}
