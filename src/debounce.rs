use std::time::{Duration, Instant};

/// Cancellable coalescing timer. Each `schedule` replaces the pending value
/// and restarts the idle period; `poll` releases the latest value once the
/// period has elapsed. Rapid slider drags thus collapse to one reload.
#[derive(Debug)]
pub struct Debouncer<T> {
    delay: Duration,
    pending: Option<(T, Instant)>,
}

impl<T> Debouncer<T> {
    pub fn new(delay: Duration) -> Self {
        Debouncer {
            delay,
            pending: None,
        }
    }

    pub fn schedule(&mut self, value: T, now: Instant) {
        self.pending = Some((value, now + self.delay));
    }

    pub fn cancel(&mut self) -> Option<T> {
        self.pending.take().map(|(value, _)| value)
    }

    pub fn poll(&mut self, now: Instant) -> Option<T> {
        match &self.pending {
            Some((_, deadline)) if *deadline <= now => self.pending.take().map(|(v, _)| v),
            _ => None,
        }
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    pub fn next_deadline(&self) -> Option<Instant> {
        self.pending.as_ref().map(|(_, deadline)| *deadline)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn releases_only_after_the_idle_period() {
        let mut debouncer = Debouncer::new(Duration::from_millis(50));
        let start = Instant::now();

        debouncer.schedule(7u32, start);
        assert_eq!(debouncer.poll(start), None);
        assert_eq!(debouncer.poll(start + Duration::from_millis(49)), None);
        assert_eq!(debouncer.poll(start + Duration::from_millis(50)), Some(7));
        assert!(!debouncer.is_pending());
    }

    #[test]
    fn rapid_schedules_collapse_to_the_last_value() {
        let mut debouncer = Debouncer::new(Duration::from_millis(50));
        let start = Instant::now();

        debouncer.schedule(1u32, start);
        debouncer.schedule(2u32, start + Duration::from_millis(10));
        debouncer.schedule(3u32, start + Duration::from_millis(20));

        // The first deadline has passed, but scheduling restarted the timer
        assert_eq!(debouncer.poll(start + Duration::from_millis(60)), None);
        assert_eq!(debouncer.poll(start + Duration::from_millis(70)), Some(3));
    }

    #[test]
    fn cancel_returns_the_pending_value() {
        let mut debouncer = Debouncer::new(Duration::from_millis(50));
        let start = Instant::now();

        assert_eq!(debouncer.cancel(), None);
        debouncer.schedule("reload", start);
        assert_eq!(debouncer.cancel(), Some("reload"));
        assert_eq!(debouncer.poll(start + Duration::from_secs(1)), None);
    }
}
