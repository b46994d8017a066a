use std::time::Duration;

/// Process-lifetime timing aggregate
///
/// Mutated once per completed entity by the run loop; never persisted, so a
/// restart begins a fresh average.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RunStats {
    total_elapsed: f64,
    processed_count: u64,
}

impl RunStats {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records one entity's elapsed time and returns the new rolling average
    pub fn record(&mut self, elapsed: Duration) -> f64 {
        self.total_elapsed += elapsed.as_secs_f64();
        self.processed_count += 1;
        self.average()
    }

    /// Mean seconds per entity, 0.0 before the first entity
    pub fn average(&self) -> f64 {
        if self.processed_count == 0 {
            0.0
        } else {
            self.total_elapsed / self.processed_count as f64
        }
    }

    pub fn total_elapsed(&self) -> f64 {
        self.total_elapsed
    }

    pub fn processed_count(&self) -> u64 {
        self.processed_count
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_average() {
        assert_eq!(RunStats::new().average(), 0.0);
    }

    #[test]
    fn test_rolling_average() {
        let mut stats = RunStats::new();
        assert_eq!(stats.record(Duration::from_secs(2)), 2.0);
        assert_eq!(stats.record(Duration::from_secs(4)), 3.0);
        assert_eq!(stats.record(Duration::from_millis(0)), 2.0);
        assert_eq!(stats.processed_count(), 3);
        assert_eq!(stats.total_elapsed(), 6.0);
    }
}
