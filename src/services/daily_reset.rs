// src/services/daily_reset.rs

use chrono::{DateTime, Days, Utc};
use tokio::task::JoinHandle;

use crate::store::SharedStore;

/// Time left until the next UTC midnight strictly after `now`.
pub fn duration_until_next_midnight(now: DateTime<Utc>) -> std::time::Duration {
    let next = now
        .date_naive()
        .checked_add_days(Days::new(1))
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|dt| dt.and_utc());

    match next {
        Some(next) => (next - now)
            .to_std()
            .unwrap_or(std::time::Duration::from_secs(1)),
        None => std::time::Duration::from_secs(24 * 60 * 60),
    }
}

/// Zeroes every player's daily attempt count at each UTC midnight.
pub fn spawn(store: SharedStore) -> JoinHandle<()> {
    tokio::spawn(async move {
        loop {
            let wait = duration_until_next_midnight(Utc::now());
            tracing::debug!(seconds = wait.as_secs(), "Next daily reset scheduled");
            tokio::time::sleep(wait).await;

            match store.reset_daily_counts().await {
                Ok(rows) => tracing::info!(profiles = rows, "Daily attempt counts reset"),
                Err(e) => tracing::error!("Daily reset failed: {}", e),
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn counts_down_to_the_next_midnight() {
        let now = Utc.with_ymd_and_hms(2024, 4, 1, 23, 30, 0).unwrap();
        assert_eq!(duration_until_next_midnight(now).as_secs(), 30 * 60);
    }

    #[test]
    fn exactly_midnight_waits_a_full_day() {
        let now = Utc.with_ymd_and_hms(2024, 4, 1, 0, 0, 0).unwrap();
        assert_eq!(duration_until_next_midnight(now).as_secs(), 24 * 60 * 60);
    }
}
