use chrono::{DateTime, Utc};
use std::time::Duration;

/// Publication-time range an article must fall in to be posted
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CandidateWindow {
    pub from: DateTime<Utc>,
    pub to: DateTime<Utc>,
}

impl CandidateWindow {
    /// `[now - lookback, now]`
    pub fn ending_at(now: DateTime<Utc>, lookback: Duration) -> Self {
        let lookback = chrono::Duration::from_std(lookback)
            .unwrap_or_else(|_| chrono::Duration::days(36_500));

        Self {
            from: now - lookback,
            to: now,
        }
    }

    pub fn contains(&self, published_at: DateTime<Utc>) -> bool {
        published_at >= self.from && published_at <= self.to
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_window_bounds_are_inclusive() {
        let t0 = Utc.with_ymd_and_hms(2025, 1, 6, 10, 0, 0).unwrap();
        let window = CandidateWindow::ending_at(t0 + chrono::Duration::seconds(120), Duration::from_secs(120));

        assert!(window.contains(t0));
        assert!(window.contains(t0 + chrono::Duration::seconds(120)));
        assert!(!window.contains(t0 - chrono::Duration::seconds(1)));
        assert!(!window.contains(t0 + chrono::Duration::seconds(121)));
    }
}
