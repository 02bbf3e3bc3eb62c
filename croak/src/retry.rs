use embedded_time::duration::Milliseconds;
use embedded_time::Instant;
use rand::{Rng, SeedableRng};

use crate::time::{Clock, Millis};

/// A non-blocking retry timer that lives alongside some operation to
/// retry.
///
/// It does not _contain_ the work to be done; the owner asks it
/// "what should I do now?" and reacts.
///
/// The schedule is the confirmable-message transmission schedule from
/// RFC7252: an initial delay drawn uniformly from the strategy's range,
/// doubling after every attempt. The timer compares against total time
/// elapsed since it was created, so attempt `n` becomes due at
/// `init * 2^(n-1)` after the first send.
#[derive(Debug, Clone, Copy)]
pub struct RetryTimer<C: Clock> {
  start: Instant<C>,
  init: Millis,
  attempts: Attempts,
  max_attempts: Attempts,
}

/// A number of attempts
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Attempts(pub u16);

/// Result of [`RetryTimer::what_should_i_do`].
///
/// This tells you if a retry should be attempted or not.
#[derive(PartialEq, Eq, Debug, Clone, Copy)]
pub enum YouShould {
  /// Attempts have been exhausted and the work that is
  /// being retried should be considered poisoned.
  Cry,
  /// A retry should be performed
  Retry,
}

/// The jittered-exponential retry schedule: the initial delay is drawn
/// uniformly from `[init_min, init_max]` and doubles after every failed
/// attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Strategy {
  /// Minimum (inclusive) delay for the second attempt
  pub init_min: Millis,
  /// Maximum (inclusive) delay for the second attempt
  pub init_max: Millis,
}

impl<C: Clock> RetryTimer<C> {
  /// Create a new retrier.
  ///
  /// The first attempt is expected to have just happened; `max_attempts`
  /// counts it, so `Attempts(5)` means "4 retries after the initial try."
  pub fn new(start: Instant<C>, strategy: Strategy, max_attempts: Attempts) -> Self {
    let Strategy { init_min, init_max } = strategy;

    let init = if init_max.0 <= init_min.0 {
      init_min
    } else {
      let millis = Millis::try_from(start.duration_since_epoch()).map(|Milliseconds(ms)| ms)
                                                                 .unwrap_or(0);
      let mut rand = rand_chacha::ChaCha8Rng::seed_from_u64(millis);
      Milliseconds(rand.gen_range(init_min.0..=init_max.0))
    };

    Self { start,
           init,
           max_attempts,
           attempts: Attempts(1) }
  }

  /// When the thing we keep trying fails, invoke this to
  /// tell the retrytimer "it failed again! what do I do??"
  ///
  /// Returns `nb::Error::WouldBlock` when we have not yet
  /// waited the appropriate amount of time, including the final
  /// doubled window before giving up entirely.
  pub fn what_should_i_do(&mut self,
                          now: Instant<C>)
                          -> nb::Result<YouShould, core::convert::Infallible> {
    let elapsed = now.checked_duration_since(&self.start)
                     .and_then(|passed| Millis::try_from(passed).ok())
                     .unwrap_or(Milliseconds(0));

    if !self.is_ready(elapsed, self.attempts.0) {
      Err(nb::Error::WouldBlock)
    } else if self.attempts >= self.max_attempts {
      Ok(YouShould::Cry)
    } else {
      self.attempts.0 += 1;
      Ok(YouShould::Retry)
    }
  }

  /// Check if an appropriate amount of time has passed for attempt
  /// number `attempts + 1`
  pub fn is_ready(&self, Milliseconds(time_passed): Millis, attempts: u16) -> bool {
    if attempts == 0 {
      return true;
    }

    time_passed >= Self::total_delay(self.init, attempts)
  }

  /// Given the initial delay and number of attempts that have been
  /// performed, yields the total elapsed time at which the next attempt
  /// is due.
  fn total_delay(Milliseconds(init): Millis, attempt: u16) -> u64 {
    // | attempt | due at           |
    // | 1       | init             |
    // | 2       | init * 2         |
    // | 3       | init * 4         |
    // | ...     | ...              |
    // | n       | init * 2^(n-1)   |
    init.saturating_mul(2u64.saturating_pow((attempt - 1) as u32))
  }
}

#[cfg(test)]
mod test {
  use core::cell::Cell;

  use embedded_time::rate::Fraction;
  use embedded_time::Clock;

  use super::*;

  pub struct FakeClock(Cell<u64>);

  impl FakeClock {
    pub fn new() -> Self {
      Self(Cell::new(0))
    }

    pub fn set(&self, millis: u64) {
      self.0.set(millis);
    }
  }

  impl embedded_time::Clock for FakeClock {
    type T = u64;

    const SCALING_FACTOR: Fraction = Fraction::new(1, 1000);

    fn try_now(&self) -> Result<Instant<Self>, embedded_time::clock::Error> {
      Ok(Instant::new(self.0.get()))
    }
  }

  #[test]
  fn exponential_retrier() {
    let clock = FakeClock::new();
    let now = || clock.try_now().unwrap();
    let mut retry = RetryTimer::new(now(),
                                    Strategy { init_min: Milliseconds(1000),
                                               init_max: Milliseconds(1000) },
                                    Attempts(6));

    // attempt 1 happens before asking what_should_i_do

    clock.set(999);
    assert_eq!(retry.what_should_i_do(now()).unwrap_err(),
               nb::Error::WouldBlock);

    clock.set(1000);
    assert_eq!(retry.what_should_i_do(now()).unwrap(), YouShould::Retry);
    // Fails again (attempt 2)

    clock.set(1999);
    assert_eq!(retry.what_should_i_do(now()).unwrap_err(),
               nb::Error::WouldBlock);

    clock.set(2000);
    assert_eq!(retry.what_should_i_do(now()).unwrap(), YouShould::Retry);
    // Fails again (attempt 3)

    clock.set(3999);
    assert_eq!(retry.what_should_i_do(now()).unwrap_err(),
               nb::Error::WouldBlock);

    clock.set(4000);
    assert_eq!(retry.what_should_i_do(now()).unwrap(), YouShould::Retry);

    clock.set(8000);
    assert_eq!(retry.what_should_i_do(now()).unwrap(), YouShould::Retry);

    clock.set(16_000);
    assert_eq!(retry.what_should_i_do(now()).unwrap(), YouShould::Retry);
    // attempt 6 of 6: one final full window before giving up

    clock.set(31_999);
    assert_eq!(retry.what_should_i_do(now()).unwrap_err(),
               nb::Error::WouldBlock);

    clock.set(32_000);
    assert_eq!(retry.what_should_i_do(now()).unwrap(), YouShould::Cry);
  }

  #[test]
  fn jittered_initial_delay_is_in_range() {
    let clock = FakeClock::new();
    clock.set(12_345);
    let now = clock.try_now().unwrap();
    let strategy = Strategy { init_min: Milliseconds(2000),
                              init_max: Milliseconds(3000) };

    let retry = RetryTimer::new(now, strategy, Attempts(5));

    // too early for any draw in [2000, 3000]
    assert!(!retry.is_ready(Milliseconds(1999), 1));
    // late enough for every draw
    assert!(retry.is_ready(Milliseconds(3000), 1));
  }

  #[test]
  fn delay_calculation() {
    let clock = FakeClock::new();
    let retry = RetryTimer::new(clock.try_now().unwrap(),
                                Strategy { init_min: Milliseconds(100),
                                           init_max: Milliseconds(100) },
                                Attempts(5));

    assert!(retry.is_ready(Milliseconds(100), 1));
    assert!(!retry.is_ready(Milliseconds(199), 2));
    assert!(retry.is_ready(Milliseconds(200), 2));
    assert!(retry.is_ready(Milliseconds(400), 3));
  }
}
