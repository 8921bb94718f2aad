//! `MonadDefer` - the complete contract for running suspended programs.

use super::bracket::Bracket;
use super::defer::Defer;
use super::error::EffectError;
use super::error_channel::ErrorChannel;
use super::scheduler::Scheduler;
use crate::typeclass::Monad;

/// `Monad + ErrorChannel<EffectError> + Defer + Bracket + Scheduler`.
///
/// Implemented automatically for every carrier that has all five
/// capabilities. Generic effect code should ask for `MonadDefer` rather than
/// spelling out the parts.
///
/// # Examples
///
/// ```rust
/// use purefx::effect::{EffectError, IO, IOKind, MonadDefer};
///
/// fn checked_div<M: MonadDefer>(numerator: i32, denominator: i32) -> M::Of<i32> {
///     if denominator == 0 {
///         M::raise("division by zero")
///     } else {
///         M::delay(move || numerator / denominator)
///     }
/// }
///
/// assert_eq!(checked_div::<IOKind>(6, 3).run_unsafe(), Ok(2));
/// assert_eq!(
///     checked_div::<IOKind>(1, 0).run_unsafe(),
///     Err(EffectError::raised("division by zero"))
/// );
/// ```
pub trait MonadDefer: Monad + ErrorChannel<EffectError> + Defer + Bracket + Scheduler {
    /// A computation producing `thunk()` when run.
    fn delay<A, T>(thunk: T) -> Self::Of<A>
    where
        A: Send + 'static,
        T: FnOnce() -> A + Send + 'static,
    {
        Self::defer(move || Self::pure(thunk()))
    }

    /// Fails with [`EffectError::Raised`].
    fn raise<A>(message: impl Into<String>) -> Self::Of<A>
    where
        A: Send + 'static,
    {
        Self::raise_error(EffectError::raised(message))
    }
}

impl<F> MonadDefer for F where F: Monad + ErrorChannel<EffectError> + Defer + Bracket + Scheduler {}
