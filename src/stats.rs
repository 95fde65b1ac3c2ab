use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Running evaluation counters for one rule
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UsageStats {
    pub total_evaluations: u64,
    pub true_results: u64,
    pub false_results: u64,
    /// Mean evaluation time in microseconds
    pub average_micros: f64,
    pub last_evaluated: Option<DateTime<Utc>>,
}

impl UsageStats {
    pub fn record(&mut self, result: bool, elapsed: Duration) {
        self.total_evaluations += 1;
        let n = self.total_evaluations as f64;
        let micros = elapsed.as_secs_f64() * 1_000_000.0;
        self.average_micros += (micros - self.average_micros) / n;

        if result {
            self.true_results += 1;
        } else {
            self.false_results += 1;
        }
        self.last_evaluated = Some(Utc::now());
    }

    /// Share of evaluations that came out true, 0 before the first one
    pub fn success_rate(&self) -> f64 {
        if self.total_evaluations == 0 {
            0.0
        } else {
            self.true_results as f64 / self.total_evaluations as f64
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_stats() {
        let stats = UsageStats::default();
        assert_eq!(stats.success_rate(), 0.0);
        assert!(stats.last_evaluated.is_none());
    }

    #[test]
    fn test_running_average_and_counts() {
        let mut stats = UsageStats::default();
        stats.record(true, Duration::from_micros(10));
        stats.record(false, Duration::from_micros(30));
        stats.record(true, Duration::from_micros(20));

        assert_eq!(stats.total_evaluations, 3);
        assert_eq!(stats.true_results, 2);
        assert_eq!(stats.false_results, 1);
        assert!((stats.average_micros - 20.0).abs() < 1e-9);
        assert!((stats.success_rate() - 2.0 / 3.0).abs() < 1e-12);
        assert!(stats.last_evaluated.is_some());
    }
}
