use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Semaphore;
use tokio::time::Instant;

/// Tracks the politeness state of one domain
///
/// The semaphore caps concurrent requests to the domain; `next_slot`
/// spaces request starts by at least the configured delay.
#[derive(Debug, Clone)]
pub struct DomainState {
    /// Permits for concurrent requests to this domain
    pub permits: Arc<Semaphore>,

    /// Earliest instant the next request may start
    pub next_slot: Option<Instant>,

    /// Number of requests started against this domain
    pub request_count: u64,
}

impl DomainState {
    /// Creates a new DomainState allowing `max_concurrent` parallel requests
    pub fn new(max_concurrent: usize) -> Self {
        Self {
            permits: Arc::new(Semaphore::new(max_concurrent.max(1))),
            next_slot: None,
            request_count: 0,
        }
    }

    /// Claims the next request slot and returns how long to wait for it
    ///
    /// The following slot is pushed `delay` past the claimed one, so
    /// concurrent callers queue up behind each other instead of firing
    /// together once the current wait expires.
    pub fn reserve_slot(&mut self, now: Instant, delay: Duration) -> Duration {
        let start = match self.next_slot {
            Some(slot) if slot > now => slot,
            _ => now,
        };

        self.next_slot = Some(start + delay);
        self.request_count += 1;
        start - now
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_domain_has_no_slot() {
        let state = DomainState::new(2);
        assert!(state.next_slot.is_none());
        assert_eq!(state.request_count, 0);
        assert_eq!(state.permits.available_permits(), 2);
    }

    #[test]
    fn test_zero_concurrency_clamped_to_one() {
        let state = DomainState::new(0);
        assert_eq!(state.permits.available_permits(), 1);
    }

    #[test]
    fn test_first_reservation_is_immediate() {
        let mut state = DomainState::new(1);
        let now = Instant::now();

        let wait = state.reserve_slot(now, Duration::from_millis(500));

        assert_eq!(wait, Duration::ZERO);
        assert_eq!(state.request_count, 1);
        assert_eq!(state.next_slot, Some(now + Duration::from_millis(500)));
    }

    #[test]
    fn test_reservations_are_spaced_by_delay() {
        let mut state = DomainState::new(2);
        let now = Instant::now();
        let delay = Duration::from_millis(500);

        assert_eq!(state.reserve_slot(now, delay), Duration::ZERO);
        assert_eq!(state.reserve_slot(now, delay), delay);
        assert_eq!(state.reserve_slot(now, delay), delay * 2);
        assert_eq!(state.request_count, 3);
    }

    #[test]
    fn test_partial_wait_and_expired_slot() {
        let mut state = DomainState::new(1);
        let now = Instant::now();
        let delay = Duration::from_millis(1000);
        state.reserve_slot(now, delay);

        let later = now + Duration::from_millis(400);
        assert_eq!(state.reserve_slot(later, delay), Duration::from_millis(600));

        // Next slot is now + 2000ms; arriving after it waits for nothing
        let after = now + Duration::from_millis(2500);
        assert_eq!(state.reserve_slot(after, delay), Duration::ZERO);
    }
}
