//! `Scheduler` type class - timed suspension.

use std::time::Duration;

use crate::typeclass::Kind;

/// A carrier that can pause for a duration.
///
/// The clock itself belongs to the carrier: [`IO`](super::IO) blocks the
/// current thread, `AsyncIO` waits on the tokio timer.
pub trait Scheduler: Kind {
    /// Completes with `()` once `duration` has elapsed.
    fn sleep(duration: Duration) -> Self::Of<()>;
}
