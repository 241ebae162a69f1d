use crate::domain::chart::SurfaceSize;

/// Trailing-edge debounce for container resize bursts.
///
/// `observe` records the newest size and pushes the deadline out; `take_ready` releases the
/// size once the container has been quiet for `delay_ms`. Empty sizes and repeats of the last
/// released size are swallowed.
#[derive(Debug, Clone)]
pub struct ResizeDebouncer {
    delay_ms: f64,
    pending: Option<(SurfaceSize, f64)>,
    last_released: Option<SurfaceSize>,
}

impl ResizeDebouncer {
    pub fn new(delay_ms: u32) -> Self {
        Self {
            delay_ms: f64::from(delay_ms),
            pending: None,
            last_released: None,
        }
    }

    pub fn observe(&mut self, size: SurfaceSize, now_ms: f64) {
        self.pending = Some((size, now_ms + self.delay_ms));
    }

    pub fn take_ready(&mut self, now_ms: f64) -> Option<SurfaceSize> {
        let (size, deadline) = self.pending?;
        if now_ms < deadline {
            return None;
        }
        self.pending = None;
        if size.is_empty() || self.last_released == Some(size) {
            return None;
        }
        self.last_released = Some(size);
        Some(size)
    }

    /// Milliseconds until the pending size may be released, if any.
    pub fn remaining_ms(&self, now_ms: f64) -> Option<f64> {
        self.pending.map(|(_, deadline)| (deadline - now_ms).max(0.0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn burst_collapses_to_last_size() {
        let mut d = ResizeDebouncer::new(150);
        d.observe(SurfaceSize::new(800, 400), 0.0);
        d.observe(SurfaceSize::new(810, 400), 50.0);
        d.observe(SurfaceSize::new(820, 400), 100.0);

        assert_eq!(d.take_ready(200.0), None);
        assert_eq!(d.take_ready(250.0), Some(SurfaceSize::new(820, 400)));
        assert_eq!(d.take_ready(400.0), None);
    }

    #[test]
    fn repeated_and_empty_sizes_are_dropped() {
        let mut d = ResizeDebouncer::new(10);
        d.observe(SurfaceSize::new(500, 300), 0.0);
        assert!(d.take_ready(10.0).is_some());

        d.observe(SurfaceSize::new(500, 300), 20.0);
        assert_eq!(d.take_ready(40.0), None);

        d.observe(SurfaceSize::new(0, 300), 50.0);
        assert_eq!(d.take_ready(70.0), None);
    }

    #[test]
    fn remaining_time_counts_down() {
        let mut d = ResizeDebouncer::new(100);
        assert_eq!(d.remaining_ms(0.0), None);
        d.observe(SurfaceSize::new(1, 1), 0.0);
        assert_eq!(d.remaining_ms(40.0), Some(60.0));
        assert_eq!(d.remaining_ms(140.0), Some(0.0));
    }
}
