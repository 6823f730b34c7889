/// Byte totals across every item started since the active set last drained.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AggregateCounters {
    pub received_bytes: u64,
    pub completed_bytes: u64,
    pub total_bytes: u64,
}

#[derive(Debug, Default)]
pub struct ProgressAccumulator {
    counters: AggregateCounters,
}

impl ProgressAccumulator {
    pub fn counters(&self) -> AggregateCounters {
        self.counters
    }

    /// Aggregate fraction, `None` while no expected bytes are known.
    pub fn fraction(&self) -> Option<f64> {
        fraction(self.counters.received_bytes, self.counters.total_bytes)
    }

    pub fn add_total(&mut self, bytes: u64) {
        self.counters.total_bytes = self.counters.total_bytes.saturating_add(bytes);
    }

    /// Swaps an item's previously counted total for its current one.
    pub fn retotal(&mut self, counted: u64, current: u64) {
        self.counters.total_bytes = self
            .counters
            .total_bytes
            .saturating_sub(counted)
            .saturating_add(current);
    }

    /// `received = completed + Σ active received`. Each entry is `(received, total)`;
    /// an item never contributes more than its known total.
    pub fn recompute(&mut self, active: impl IntoIterator<Item = (u64, u64)>) {
        self.counters.received_bytes = active
            .into_iter()
            .map(|(received, total)| received.min(total))
            .fold(self.counters.completed_bytes, u64::saturating_add);
    }

    pub fn complete(&mut self, item_total: u64) {
        self.counters.completed_bytes = self.counters.completed_bytes.saturating_add(item_total);
    }

    pub fn reset(&mut self) {
        self.counters = AggregateCounters::default();
    }
}

/// `received / total`, `None` when the total is unknown.
pub fn fraction(received: u64, total: u64) -> Option<f64> {
    if total == 0 {
        None
    } else {
        Some(received as f64 / total as f64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_received_includes_completed_bytes() {
        let mut progress = ProgressAccumulator::default();
        progress.add_total(1000);
        progress.add_total(500);
        progress.complete(1000);
        progress.recompute([(200, 500)]);

        assert_eq!(
            progress.counters(),
            AggregateCounters {
                received_bytes: 1200,
                completed_bytes: 1000,
                total_bytes: 1500,
            }
        );
        assert_eq!(progress.fraction(), Some(0.8));
    }

    #[test]
    fn test_overreporting_item_is_clamped_to_its_total() {
        let mut progress = ProgressAccumulator::default();
        progress.add_total(100);
        progress.recompute([(150, 100), (40, 0)]);
        assert_eq!(progress.counters().received_bytes, 100);
    }

    #[test]
    fn test_retotal_and_reset() {
        let mut progress = ProgressAccumulator::default();
        progress.add_total(0);
        assert_eq!(progress.fraction(), None);

        progress.retotal(0, 2048);
        assert_eq!(progress.counters().total_bytes, 2048);

        progress.reset();
        assert_eq!(progress.counters(), AggregateCounters::default());
    }
}
