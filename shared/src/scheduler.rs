use crate::{ReplicationError, Seconds, config};

/// Fixed-cadence send gate for the authority.
///
/// Polled once per host tick; answers whether a snapshot is due. Scheduling is drift-free:
/// the next deadline advances from the previous *deadline*, not from the moment the poll
/// happened, so a 60 Hz sampler ticked by an uneven frame loop still averages 60 sends/s.
/// A host that stalls for a whole period or longer is resynchronised instead of emitting a
/// burst of catch-up snapshots.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SendScheduler {
    period: Seconds,
    next_send: Option<Seconds>,
}

impl SendScheduler {
    pub fn new(sends_per_second: u32) -> Result<Self, ReplicationError> {
        config::validate_send_rate(sends_per_second)?;
        Ok(Self {
            period: config::send_period(sends_per_second),
            next_send: None,
        })
    }

    /// Rebuild a scheduler from a persisted deadline (hosts that keep state in tables).
    pub fn resume(
        sends_per_second: u32,
        next_send: Option<Seconds>,
    ) -> Result<Self, ReplicationError> {
        let mut scheduler = Self::new(sends_per_second)?;
        scheduler.next_send = next_send;
        Ok(scheduler)
    }

    pub fn period(&self) -> Seconds {
        self.period
    }

    /// Deadline of the next send, `None` until the first send happened.
    pub fn next_send(&self) -> Option<Seconds> {
        self.next_send
    }

    /// Returns `true` exactly when a snapshot should be emitted at `now`.
    ///
    /// The very first poll always sends.
    ///
    /// Deadlines stay on the `k / sends_per_second` grid, so the guarantee is about windows,
    /// not gaps: any window of length `W` sees at most `ceil(W * n) + 1` sends. A poll that
    /// lands late in a period can be followed by one right at the next deadline, so two sends
    /// may be closer together than one period.
    pub fn poll(&mut self, now: Seconds) -> bool {
        let scheduled = match self.next_send {
            None => now,
            Some(deadline) if now >= deadline => deadline,
            Some(_) => return false,
        };

        let mut next = scheduled + self.period;
        if next <= now {
            next = now + self.period;
        }
        self.next_send = Some(next);
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const RATE: u32 = 60;
    const PERIOD: f64 = 1.0 / 60.0;

    #[test]
    fn first_poll_sends_immediately() {
        let mut scheduler = SendScheduler::new(RATE).unwrap();

        assert!(scheduler.poll(3.0));
        assert!((scheduler.next_send().unwrap() - (3.0 + PERIOD)).abs() < 1.0e-12);
    }

    #[test]
    fn does_not_send_twice_within_one_period() {
        let mut scheduler = SendScheduler::new(RATE).unwrap();

        assert!(scheduler.poll(0.0));
        assert!(!scheduler.poll(0.0));
        assert!(!scheduler.poll(PERIOD * 0.5));
        assert!(!scheduler.poll(PERIOD * 0.999));
        assert!(scheduler.poll(PERIOD));
    }

    #[test]
    fn deadline_advances_from_schedule_not_from_late_poll() {
        let mut scheduler = SendScheduler::new(RATE).unwrap();

        assert!(scheduler.poll(0.0));
        // Polled 30% of a period late.
        assert!(scheduler.poll(PERIOD * 1.3));
        assert!((scheduler.next_send().unwrap() - PERIOD * 2.0).abs() < 1.0e-12);
    }

    #[test]
    fn late_poll_can_be_followed_by_a_send_at_the_next_deadline() {
        let mut scheduler = SendScheduler::new(RATE).unwrap();

        assert!(scheduler.poll(0.0));
        assert!(scheduler.poll(PERIOD * 1.9));
        // Back on the grid: the next deadline is 2P, only 0.1P after the late send.
        assert!(scheduler.poll(PERIOD * 2.0));
        assert!(!scheduler.poll(PERIOD * 2.5));

        // Three sends in [0, 2P]: within ceil(2P * n) + 1.
        let bound = (PERIOD * 2.0 * RATE as f64).ceil() as usize + 1;
        assert!(3 <= bound);
    }

    #[test]
    fn long_stall_resynchronises_without_burst() {
        let mut scheduler = SendScheduler::new(RATE).unwrap();

        assert!(scheduler.poll(0.0));
        assert!(scheduler.poll(1.0));
        assert!(!scheduler.poll(1.0 + PERIOD * 0.5));
        assert!((scheduler.next_send().unwrap() - (1.0 + PERIOD)).abs() < 1.0e-12);
    }

    #[test]
    fn zero_rate_is_rejected() {
        assert_eq!(
            SendScheduler::new(0),
            Err(ReplicationError::InvalidSendRate(0))
        );
    }

    #[test]
    fn resumed_scheduler_honours_persisted_deadline() {
        let mut scheduler = SendScheduler::resume(RATE, Some(2.0)).unwrap();

        assert!(!scheduler.poll(1.99));
        assert!(scheduler.poll(2.0));
    }

    #[test]
    fn window_never_exceeds_rate_bound() {
        for rate in [1u32, 7, 30, 60, 144] {
            let mut scheduler = SendScheduler::new(rate).unwrap();
            let mut sends = Vec::new();

            // Uneven frame loop: frame times cycle through 1ms..16ms.
            let mut now = 0.0;
            for frame in 0..20_000u32 {
                now += 0.001 * (1 + frame % 16) as f64;
                if scheduler.poll(now) {
                    sends.push(now);
                }
            }

            let window = 0.5;
            let bound = (window * rate as f64).ceil() as usize + 1;
            for (i, &start) in sends.iter().enumerate() {
                let in_window = sends[i..].iter().take_while(|&&t| t < start + window).count();
                assert!(
                    in_window <= bound,
                    "rate {rate}: {in_window} sends in a {window}s window (bound {bound})"
                );
            }
        }
    }
}
