//! `Bracket` type class - acquire, use, release.
//!
//! # Guarantees
//!
//! For `bracket(acquire, use_resource, release)`:
//!
//! - if `acquire` fails, neither `use_resource` nor `release` runs;
//! - otherwise `release` runs exactly once, after `use_resource` finished,
//!   failed, panicked, or was cancelled, and before the outcome is returned;
//! - if `use_resource` failed, its error is the outcome, even when `release`
//!   fails too;
//! - if `use_resource` succeeded and `release` failed, the release error is
//!   the outcome.

use tracing::warn;

use super::error::EffectError;
use crate::typeclass::Monad;

/// A carrier with safe resource handling.
///
/// The resource is handed to both `use_resource` and `release`, hence
/// `R: Clone`; resources are usually handles (`Arc`, ids, connections).
///
/// # Examples
///
/// ```rust
/// use std::sync::Arc;
/// use std::sync::atomic::{AtomicI32, Ordering};
///
/// use purefx::effect::{Bracket, EffectError, IO, IOKind};
///
/// let open = Arc::new(AtomicI32::new(0));
/// let counter = Arc::clone(&open);
///
/// let io: IO<i32> = IOKind::bracket(
///     IO::new(move || {
///         counter.fetch_add(1, Ordering::SeqCst);
///         counter
///     }),
///     |_| IO::fail(EffectError::raised("query failed")),
///     |counter| IO::new(move || {
///         counter.fetch_sub(1, Ordering::SeqCst);
///     }),
/// );
///
/// assert_eq!(io.run_unsafe(), Err(EffectError::raised("query failed")));
/// assert_eq!(open.load(Ordering::SeqCst), 0);
/// ```
pub trait Bracket: Monad {
    /// Acquires a resource, uses it, and always releases it.
    fn bracket<R, B, U, L>(acquire: Self::Of<R>, use_resource: U, release: L) -> Self::Of<B>
    where
        R: Clone + Send + 'static,
        B: Send + 'static,
        U: FnOnce(R) -> Self::Of<B> + Send + 'static,
        L: FnOnce(R) -> Self::Of<()> + Send + 'static;

    /// Runs `finalizer` after `fa`, however `fa` ends.
    fn guarantee<A>(fa: Self::Of<A>, finalizer: Self::Of<()>) -> Self::Of<A>
    where
        A: Send + 'static,
    {
        Self::bracket(Self::pure(()), move |()| fa, move |()| finalizer)
    }
}

/// Combines the outcome of `use` with the outcome of `release`.
pub(crate) fn settle<A>(
    outcome: Result<A, EffectError>,
    released: Result<(), EffectError>,
) -> Result<A, EffectError> {
    match (outcome, released) {
        (Ok(value), Ok(())) => Ok(value),
        (Ok(_), Err(release_error)) => Err(release_error),
        (Err(error), Ok(())) => Err(error),
        (Err(error), Err(release_error)) => {
            warn!(%error, %release_error, "release failed after use failed; keeping the use error");
            Err(error)
        }
    }
}
