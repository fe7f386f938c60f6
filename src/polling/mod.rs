//! Fixed-interval cooperative loop for waits with no single completion event

use std::time::Duration;

use tokio::time::{MissedTickBehavior, interval};

/// What one polling iteration decided
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Poll {
    Continue,
    Done,
}

/// Evaluate `step` immediately and then once per `tick` until it returns
/// [`Poll::Done`]. Returns the number of iterations that ran.
pub async fn poll_until<F>(tick: Duration, mut step: F) -> u64
where
    F: FnMut() -> Poll,
{
    let mut ticker = interval(tick);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    let mut iterations = 0;
    loop {
        ticker.tick().await;
        iterations += 1;
        if step() == Poll::Done {
            return iterations;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn test_stops_when_predicate_holds() {
        let mut remaining = 3;
        let runs = poll_until(Duration::from_millis(50), || {
            remaining -= 1;
            if remaining == 0 { Poll::Done } else { Poll::Continue }
        })
        .await;
        assert_eq!(runs, 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_ticks_are_spaced() {
        let start = tokio::time::Instant::now();
        let mut n = 0;
        poll_until(Duration::from_millis(50), || {
            n += 1;
            if n == 5 { Poll::Done } else { Poll::Continue }
        })
        .await;
        // first tick is immediate
        assert_eq!(start.elapsed(), Duration::from_millis(200));
    }
}
