//! `ErrorChannel` type class - raising and handling errors in a carrier.
//!
//! # Laws
//!
//! ## Raise Handle Law
//!
//! ```text
//! handle_error_with(raise_error(e), handler) == handler(e)
//! ```
//!
//! ## Handle Pure Law
//!
//! ```text
//! handle_error_with(pure(a), handler) == pure(a)
//! ```
//!
//! ## Raise Short-Circuit Law
//!
//! ```text
//! flat_map(raise_error(e), f) == raise_error(e)
//! ```
//!
//! ## Unmatched Errors Are Re-raised
//!
//! ```text
//! recover_with(raise_error(e), |_| None) == raise_error(e)
//! ```
//!
//! # Examples
//!
//! ```rust
//! use purefx::effect::ErrorChannel;
//! use purefx::typeclass::ResultKind;
//!
//! type Checked = ResultKind<String>;
//!
//! let failed: Result<i32, String> = Checked::raise_error("missing".to_string());
//! let recovered = Checked::handle_error(failed, |error| error.len() as i32);
//! assert_eq!(recovered, Ok(7));
//! ```

use crate::control::Either;
use crate::typeclass::{Monad, OptionKind, ResultKind};

/// A carrier that can fail with `E` and recover from it.
pub trait ErrorChannel<E: Send + 'static>: Monad {
    /// A computation that fails with `error`.
    fn raise_error<A>(error: E) -> Self::Of<A>
    where
        A: Send + 'static;

    /// Replaces a failure of `fa` with the computation returned by `handler`.
    fn handle_error_with<A, H>(fa: Self::Of<A>, handler: H) -> Self::Of<A>
    where
        A: Send + 'static,
        H: FnOnce(E) -> Self::Of<A> + Send + 'static;

    /// Replaces a failure of `fa` with the value returned by `handler`.
    fn handle_error<A, H>(fa: Self::Of<A>, handler: H) -> Self::Of<A>
    where
        A: Send + 'static,
        H: FnOnce(E) -> A + Send + 'static,
    {
        Self::handle_error_with(fa, move |error| Self::pure(handler(error)))
    }

    /// Exposes the outcome of `fa` as a value; never fails with `E`.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use purefx::control::Either;
    /// use purefx::effect::ErrorChannel;
    /// use purefx::typeclass::ResultKind;
    ///
    /// let outcome = ResultKind::<&str>::attempt(Err::<i32, _>("nope"));
    /// assert_eq!(outcome, Ok(Either::Left("nope")));
    /// ```
    fn attempt<A>(fa: Self::Of<A>) -> Self::Of<Either<E, A>>
    where
        A: Send + 'static,
    {
        Self::handle_error_with(
            Self::map(fa, |value: A| Either::<E, A>::Right(value)),
            |error| Self::pure(Either::Left(error)),
        )
    }

    /// Recovers with a partial handler; errors it does not match are re-raised.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use purefx::effect::ErrorChannel;
    /// use purefx::typeclass::ResultKind;
    ///
    /// type Http = ResultKind<u16>;
    ///
    /// let not_found = Http::recover_with(Err::<&str, _>(404), |code| (*code == 404).then(|| Ok("default")));
    /// assert_eq!(not_found, Ok("default"));
    ///
    /// let server_error = Http::recover_with(Err::<&str, _>(500), |code| (*code == 404).then(|| Ok("default")));
    /// assert_eq!(server_error, Err(500));
    /// ```
    fn recover_with<A, P>(fa: Self::Of<A>, partial: P) -> Self::Of<A>
    where
        A: Send + 'static,
        P: FnOnce(&E) -> Option<Self::Of<A>> + Send + 'static,
    {
        Self::handle_error_with(fa, move |error| match partial(&error) {
            Some(recovered) => recovered,
            None => Self::raise_error(error),
        })
    }

    /// Like [`ErrorChannel::recover_with`] with a handler returning a value.
    fn recover<A, P>(fa: Self::Of<A>, partial: P) -> Self::Of<A>
    where
        A: Send + 'static,
        P: FnOnce(&E) -> Option<A> + Send + 'static,
    {
        Self::recover_with(fa, move |error| partial(error).map(Self::pure))
    }

    /// Lifts an `Either`, `Left` becoming a raised error.
    fn from_either<A>(either: Either<E, A>) -> Self::Of<A>
    where
        A: Send + 'static,
    {
        match either {
            Either::Left(error) => Self::raise_error(error),
            Either::Right(value) => Self::pure(value),
        }
    }

    /// Folds failure and success into one value.
    fn redeem<A, B, R, M>(fa: Self::Of<A>, recover: R, map: M) -> Self::Of<B>
    where
        A: Send + 'static,
        B: Send + 'static,
        R: FnOnce(E) -> B + Send + 'static,
        M: FnOnce(A) -> B + Send + 'static,
    {
        Self::map(Self::attempt(fa), move |outcome: Either<E, A>| {
            outcome.fold(recover, map)
        })
    }

    /// Fails with `error()` when the produced value does not satisfy `predicate`.
    fn ensure<A, P, X>(fa: Self::Of<A>, predicate: P, error: X) -> Self::Of<A>
    where
        A: Send + 'static,
        P: FnOnce(&A) -> bool + Send + 'static,
        X: FnOnce() -> E + Send + 'static,
    {
        Self::flat_map(fa, move |value| {
            if predicate(&value) {
                Self::pure(value)
            } else {
                Self::raise_error(error())
            }
        })
    }
}

// =============================================================================
// Standard Library Implementations
// =============================================================================

impl ErrorChannel<()> for OptionKind {
    #[inline]
    fn raise_error<A: Send + 'static>((): ()) -> Option<A> {
        None
    }

    fn handle_error_with<A, H>(fa: Option<A>, handler: H) -> Option<A>
    where
        A: Send + 'static,
        H: FnOnce(()) -> Option<A> + Send + 'static,
    {
        fa.or_else(|| handler(()))
    }
}

impl<E: Send + 'static> ErrorChannel<E> for ResultKind<E> {
    #[inline]
    fn raise_error<A: Send + 'static>(error: E) -> Result<A, E> {
        Err(error)
    }

    fn handle_error_with<A, H>(fa: Result<A, E>, handler: H) -> Result<A, E>
    where
        A: Send + 'static,
        H: FnOnce(E) -> Result<A, E> + Send + 'static,
    {
        fa.or_else(handler)
    }
}
