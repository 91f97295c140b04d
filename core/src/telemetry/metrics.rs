use std::sync::Mutex;

/// Counters accumulated while merging one day of instrument files.
pub struct MergeMetrics {
    inner: Mutex<Counters>,
}

struct Counters {
    merged: usize,
    skipped: usize,
}

impl MergeMetrics {
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(Counters {
                merged: 0,
                skipped: 0,
            }),
        }
    }

    pub fn record_merged(&self) {
        if let Ok(mut counters) = self.inner.lock() {
            counters.merged += 1;
        }
    }

    pub fn record_skipped(&self) {
        if let Ok(mut counters) = self.inner.lock() {
            counters.skipped += 1;
        }
    }

    pub fn snapshot(&self) -> (usize, usize) {
        if let Ok(counters) = self.inner.lock() {
            (counters.merged, counters.skipped)
        } else {
            (0, 0)
        }
    }
}

impl Default for MergeMetrics {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counters_accumulate() {
        let metrics = MergeMetrics::new();
        metrics.record_merged();
        metrics.record_merged();
        metrics.record_skipped();
        assert_eq!(metrics.snapshot(), (2, 1));
    }
}
