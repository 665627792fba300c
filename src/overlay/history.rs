/// Rolling window of recent frame times (seconds), oldest first.
///
/// Backed by a fixed ring so recording never allocates after creation.
pub struct FrameHistory {
    samples: Vec<f64>,
    head: usize,
    len: usize,
}

/// Summary of the samples currently in a [`FrameHistory`].
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct FrameStats {
    pub avg: f64,
    pub min: f64,
    pub max: f64,
    pub fps: f64,
}

impl FrameHistory {
    pub fn new(capacity: usize) -> Self {
        Self {
            samples: vec![0.0; capacity.max(1)],
            head: 0,
            len: 0,
        }
    }

    pub fn record(&mut self, dt: f64) {
        let cap = self.samples.len();
        self.samples[self.head] = dt;
        self.head = (self.head + 1) % cap;
        self.len = (self.len + 1).min(cap);
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn iter(&self) -> impl Iterator<Item = f64> + '_ {
        let cap = self.samples.len();
        let start = (self.head + cap - self.len) % cap;
        (0..self.len).map(move |i| self.samples[(start + i) % cap])
    }

    pub fn stats(&self) -> FrameStats {
        if self.is_empty() {
            return FrameStats::default();
        }
        let (sum, min, max) = self
            .iter()
            .fold((0.0, f64::MAX, 0.0f64), |(s, lo, hi), t| (s + t, lo.min(t), hi.max(t)));
        let avg = sum / self.len() as f64;
        FrameStats {
            avg,
            min,
            max,
            fps: if avg > 0.0 { 1.0 / avg } else { 0.0 },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keeps_newest_samples_in_order() {
        let mut h = FrameHistory::new(3);
        for t in [1.0, 2.0, 3.0, 4.0, 5.0] {
            h.record(t);
        }
        assert_eq!(h.len(), 3);
        assert_eq!(h.iter().collect::<Vec<_>>(), vec![3.0, 4.0, 5.0]);
    }

    #[test]
    fn stats_over_window() {
        let mut h = FrameHistory::new(8);
        assert_eq!(h.stats(), FrameStats::default());
        h.record(0.010);
        h.record(0.030);
        let s = h.stats();
        assert!((s.avg - 0.020).abs() < 1e-12);
        assert_eq!(s.min, 0.010);
        assert_eq!(s.max, 0.030);
        assert!((s.fps - 50.0).abs() < 1e-9);
    }
}
