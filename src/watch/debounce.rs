use std::time::{Duration, Instant};

use super::event::ChangeEvent;

pub const DEBOUNCE_MS: u64 = 100;

/// Pure debouncer: a single pending timer per watcher.
///
/// Every armed event replaces the pending one and restarts the delay, so a
/// burst resolves to its last event.
#[derive(Debug)]
pub struct Debouncer {
    delay: Duration,
    pending: Option<Pending>,
}

#[derive(Debug)]
struct Pending {
    event: ChangeEvent,
    deadline: Instant,
}

impl Debouncer {
    pub const fn new(delay: Duration) -> Self {
        Self {
            delay,
            pending: None,
        }
    }

    pub fn arm(&mut self, event: ChangeEvent, now: Instant) {
        self.pending = Some(Pending {
            event,
            deadline: now + self.delay,
        });
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.pending.as_ref().map(|p| p.deadline)
    }

    /// Take the pending event once its deadline has passed.
    pub fn take_if_due(&mut self, now: Instant) -> Option<ChangeEvent> {
        if self.deadline()? > now {
            return None;
        }
        self.pending.take().map(|p| p.event)
    }

    /// Drop the pending event without firing.
    pub fn cancel(&mut self) -> Option<ChangeEvent> {
        self.pending.take().map(|p| p.event)
    }
}

impl Default for Debouncer {
    fn default() -> Self {
        Self::new(Duration::from_millis(DEBOUNCE_MS))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::watch::event::Op;

    fn write(path: &str) -> ChangeEvent {
        ChangeEvent::new(path, Op::Write)
    }

    #[test]
    fn test_debouncer_empty() {
        let mut debouncer = Debouncer::default();
        assert!(debouncer.deadline().is_none());
        assert!(debouncer.take_if_due(Instant::now()).is_none());
    }

    #[test]
    fn test_not_due_before_delay() {
        let mut debouncer = Debouncer::default();
        let start = Instant::now();
        debouncer.arm(write("/a.mjml"), start);

        assert_eq!(
            debouncer.deadline(),
            Some(start + Duration::from_millis(DEBOUNCE_MS))
        );
        assert!(debouncer.take_if_due(start + Duration::from_millis(50)).is_none());
        assert!(debouncer.deadline().is_some());
    }

    #[test]
    fn test_last_event_wins_and_restarts_timer() {
        let mut debouncer = Debouncer::default();
        let start = Instant::now();
        debouncer.arm(write("/a.mjml"), start);
        debouncer.arm(write("/b.mjml"), start + Duration::from_millis(80));

        assert!(debouncer.take_if_due(start + Duration::from_millis(120)).is_none());

        let fired = debouncer.take_if_due(start + Duration::from_millis(180));
        assert_eq!(fired, Some(write("/b.mjml")));
        assert!(debouncer.deadline().is_none());
    }

    #[test]
    fn test_cancel() {
        let mut debouncer = Debouncer::default();
        let start = Instant::now();
        debouncer.arm(write("/a.mjml"), start);

        assert_eq!(debouncer.cancel(), Some(write("/a.mjml")));
        assert!(debouncer.take_if_due(start + Duration::from_secs(1)).is_none());
    }
}
