use std::time::Duration;

use chrono::{Local, NaiveDateTime};
use log::debug;
use tokio::sync::watch;
use tokio::task::JoinHandle;

/// Shown once the deadline has passed.
pub const CLOSED_LABEL: &str = "Голосование завершено";

/// Source of the current local time.
pub trait Clock {
    fn now(&self) -> NaiveDateTime;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> NaiveDateTime {
        Local::now().naive_local()
    }
}

#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub NaiveDateTime);

impl Clock for FixedClock {
    fn now(&self) -> NaiveDateTime {
        self.0
    }
}

/// The time left until `deadline`, as whole days, hours and minutes
/// (`"3д 4ч 15м"`), or `CLOSED_LABEL` once `now` has reached it.
pub fn remaining(now: NaiveDateTime, deadline: NaiveDateTime) -> String {
    if deadline <= now {
        return CLOSED_LABEL.to_string();
    }
    let diff = deadline - now;
    format!(
        "{}д {}ч {}м",
        diff.num_days(),
        diff.num_hours() % 24,
        diff.num_minutes() % 60
    )
}

/// A periodic task publishing the countdown string.
///
/// The task lives as long as this handle: `stop` or dropping the ticker
/// cancels it. It only produces text and has no effect on the ballot.
pub struct CountdownTicker {
    handle: JoinHandle<()>,
}

impl CountdownTicker {
    /// Starts ticking on the current tokio runtime. The receiver holds the
    /// latest string; the first one is computed immediately.
    pub fn start<C>(
        deadline: NaiveDateTime,
        period: Duration,
        clock: C,
    ) -> (CountdownTicker, watch::Receiver<String>)
    where
        C: Clock + Send + 'static,
    {
        let (tx, rx) = watch::channel(remaining(clock.now(), deadline));
        let handle = tokio::spawn(async move {
            let mut interval = tokio::time::interval(period);
            loop {
                interval.tick().await;
                let text = remaining(clock.now(), deadline);
                if tx.send(text).is_err() {
                    debug!("CountdownTicker: no receiver left, stopping");
                    break;
                }
            }
        });
        (CountdownTicker { handle }, rx)
    }

    pub fn stop(self) {
        self.handle.abort();
    }

    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }
}

impl Drop for CountdownTicker {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn dt(y: i32, mo: u32, d: u32, h: u32, mi: u32, s: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, mo, d)
            .unwrap()
            .and_hms_opt(h, mi, s)
            .unwrap()
    }

    #[test]
    fn less_than_a_minute_left() {
        assert_eq!(
            remaining(dt(2024, 12, 31, 23, 59, 0), dt(2024, 12, 31, 23, 59, 59)),
            "0д 0ч 0м"
        );
    }

    #[test]
    fn after_the_deadline() {
        assert_eq!(
            remaining(dt(2025, 1, 1, 0, 0, 0), dt(2024, 12, 31, 23, 59, 59)),
            CLOSED_LABEL
        );
        // Exactly at the deadline is closed too.
        assert_eq!(
            remaining(dt(2024, 12, 31, 23, 59, 59), dt(2024, 12, 31, 23, 59, 59)),
            CLOSED_LABEL
        );
    }

    #[test]
    fn days_hours_minutes() {
        assert_eq!(
            remaining(dt(2024, 12, 28, 19, 44, 30), dt(2024, 12, 31, 23, 59, 59)),
            "3д 4ч 15м"
        );
        assert_eq!(
            remaining(dt(2024, 1, 1, 0, 0, 0), dt(2024, 12, 31, 23, 59, 59)),
            "365д 23ч 59м"
        );
    }

    #[tokio::test]
    async fn ticker_publishes_and_stops() {
        let deadline = dt(2024, 12, 31, 23, 59, 59);
        let clock = FixedClock(dt(2024, 12, 31, 22, 0, 0));
        let (ticker, mut rx) = CountdownTicker::start(deadline, Duration::from_millis(5), clock);
        assert_eq!(*rx.borrow(), "0д 1ч 59м");
        tokio::time::timeout(Duration::from_secs(5), rx.changed())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(*rx.borrow_and_update(), "0д 1ч 59м");

        ticker.stop();
        // Once the task is gone the sender is dropped and the channel closes.
        let closed = tokio::time::timeout(Duration::from_secs(5), async {
            while rx.changed().await.is_ok() {}
        })
        .await;
        assert!(closed.is_ok());
    }

    #[tokio::test]
    async fn ticker_ends_without_receivers() {
        let deadline = dt(2024, 12, 31, 23, 59, 59);
        let (ticker, rx) = CountdownTicker::start(
            deadline,
            Duration::from_millis(1),
            FixedClock(deadline),
        );
        assert_eq!(*rx.borrow(), CLOSED_LABEL);
        drop(rx);
        tokio::time::timeout(Duration::from_secs(5), async {
            while !ticker.is_finished() {
                tokio::time::sleep(Duration::from_millis(1)).await;
            }
        })
        .await
        .unwrap();
    }
}
