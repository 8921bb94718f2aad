//! IO - deferred synchronous side effects.
//!
//! `IO<A>` describes a computation that may perform side effects and then
//! yields `A` or fails with an [`EffectError`]. Nothing runs until
//! [`IO::run_unsafe`] is called, which should happen at the program's edge.
//!
//! Panics raised while an `IO` runs are caught and surface as
//! [`EffectError::Panicked`] through the error channel.
//!
//! # Stack safety
//!
//! `IO::flat_map` nests closures: running a chain of a few hundred thousand
//! directly composed `flat_map`s recurses that deep. [`IO::suspend`] (and so
//! `IOKind::defer`) runs the supplied action from inside its own, so a
//! recursion that re-enters `suspend` at every step uses native stack in the
//! same way. Long or unbounded chains should be written as a
//! [`Program`](crate::control::Program) and folded into [`IOKind`], whose
//! `tail_rec_m` is a plain loop.
//!
//! # Examples
//!
//! ```rust
//! use purefx::effect::IO;
//! use std::sync::Arc;
//! use std::sync::atomic::{AtomicBool, Ordering};
//!
//! let executed = Arc::new(AtomicBool::new(false));
//! let flag = Arc::clone(&executed);
//!
//! let io = IO::new(move || {
//!     flag.store(true, Ordering::SeqCst);
//!     10
//! })
//! .fmap(|x| x * 2)
//! .flat_map(|x| IO::pure(x + 1));
//!
//! assert!(!executed.load(Ordering::SeqCst));
//! assert_eq!(io.run_unsafe(), Ok(21));
//! assert!(executed.load(Ordering::SeqCst));
//! ```

use std::fmt;
use std::time::Duration;

use tracing::debug;

use super::bracket::{Bracket, settle};
use super::defer::Defer;
use super::error::{EffectError, catch_panic};
use super::error_channel::ErrorChannel;
use super::scheduler::Scheduler;
use crate::control::Either;
use crate::typeclass::{Functor, Kind, Monad};

/// A deferred synchronous computation producing `A`.
///
/// # Monad Laws
///
/// 1. **Left Identity**: `IO::pure(a).flat_map(f) == f(a)`
/// 2. **Right Identity**: `m.flat_map(IO::pure) == m`
/// 3. **Associativity**: `m.flat_map(f).flat_map(g) == m.flat_map(|x| f(x).flat_map(g))`
pub struct IO<A> {
    run_io: Box<dyn FnOnce() -> Result<A, EffectError> + Send>,
}

impl<A: Send + 'static> IO<A> {
    /// Wraps a side-effecting closure.
    pub fn new<F>(action: F) -> Self
    where
        F: FnOnce() -> A + Send + 'static,
    {
        Self::try_new(move || Ok(action()))
    }

    /// Wraps a closure that may fail.
    pub fn try_new<F>(action: F) -> Self
    where
        F: FnOnce() -> Result<A, EffectError> + Send + 'static,
    {
        Self {
            run_io: Box::new(move || catch_panic(action)),
        }
    }

    /// An action that yields `value` without side effects.
    pub fn pure(value: A) -> Self {
        Self {
            run_io: Box::new(move || Ok(value)),
        }
    }

    /// An action that fails with `error`.
    pub fn fail(error: EffectError) -> Self {
        Self {
            run_io: Box::new(move || Err(error)),
        }
    }

    /// Builds the action with `supplier` only when it runs.
    ///
    /// The built action runs nested inside this one; see the module's notes
    /// on stack safety.
    pub fn suspend<F>(supplier: F) -> Self
    where
        F: FnOnce() -> Self + Send + 'static,
    {
        Self::try_new(move || supplier().run_unsafe())
    }

    /// Runs the action.
    ///
    /// # Errors
    ///
    /// Returns the error the action raised, or [`EffectError::Panicked`] if
    /// it panicked.
    pub fn run_unsafe(self) -> Result<A, EffectError> {
        (self.run_io)()
    }

    /// Transforms the result.
    pub fn fmap<B, F>(self, function: F) -> IO<B>
    where
        B: Send + 'static,
        F: FnOnce(A) -> B + Send + 'static,
    {
        IO::try_new(move || self.run_unsafe().map(function))
    }

    /// Continues with an action that depends on the result.
    pub fn flat_map<B, F>(self, function: F) -> IO<B>
    where
        B: Send + 'static,
        F: FnOnce(A) -> IO<B> + Send + 'static,
    {
        IO::try_new(move || function(self.run_unsafe()?).run_unsafe())
    }

    /// Alias for [`IO::flat_map`].
    pub fn and_then<B, F>(self, function: F) -> IO<B>
    where
        B: Send + 'static,
        F: FnOnce(A) -> IO<B> + Send + 'static,
    {
        self.flat_map(function)
    }

    /// Runs `next` after this action, discarding this result.
    pub fn then<B: Send + 'static>(self, next: IO<B>) -> IO<B> {
        self.flat_map(move |_| next)
    }

    /// Runs both actions in order and combines their results.
    pub fn map2<B, C, F>(self, other: IO<B>, function: F) -> IO<C>
    where
        B: Send + 'static,
        C: Send + 'static,
        F: FnOnce(A, B) -> C + Send + 'static,
    {
        self.flat_map(move |first| other.fmap(move |second| function(first, second)))
    }

    /// Runs both actions in order and pairs their results.
    pub fn product<B: Send + 'static>(self, other: IO<B>) -> IO<(A, B)> {
        self.map2(other, |first, second| (first, second))
    }

    /// Recovers from a failure with the action returned by `handler`.
    pub fn handle_error_with<H>(self, handler: H) -> Self
    where
        H: FnOnce(EffectError) -> Self + Send + 'static,
    {
        Self::try_new(move || match self.run_unsafe() {
            Ok(value) => Ok(value),
            Err(error) => handler(error).run_unsafe(),
        })
    }

    /// Exposes the outcome as a value.
    pub fn attempt(self) -> IO<Either<EffectError, A>> {
        IO::try_new(move || Ok(Either::from(self.run_unsafe())))
    }

    /// Acquires a resource, uses it, and always releases it.
    ///
    /// See [`Bracket`] for the ordering and error-precedence rules. A panic in
    /// `use_resource` counts as a failure of use; `release` still runs.
    pub fn bracket<R, U, L>(acquire: IO<R>, use_resource: U, release: L) -> Self
    where
        R: Clone + Send + 'static,
        U: FnOnce(R) -> Self + Send + 'static,
        L: FnOnce(R) -> IO<()> + Send + 'static,
    {
        Self::try_new(move || {
            let resource = acquire.run_unsafe()?;
            debug!("resource acquired");
            let handle = resource.clone();
            let outcome = catch_panic(move || use_resource(handle).run_unsafe());
            let released = catch_panic(move || release(resource).run_unsafe());
            debug!(use_failed = outcome.is_err(), release_failed = released.is_err(), "resource released");
            settle(outcome, released)
        })
    }
}

impl IO<()> {
    /// Blocks the running thread for `duration`.
    pub fn sleep(duration: Duration) -> Self {
        Self::new(move || std::thread::sleep(duration))
    }
}

impl<A> fmt::Debug for IO<A> {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str("IO(<deferred>)")
    }
}

// =============================================================================
// Capability Instances
// =============================================================================

/// Witness for [`IO`].
#[derive(Debug, Clone, Copy, Default)]
pub struct IOKind;

impl Kind for IOKind {
    type Of<T: Send + 'static> = IO<T>;
}

impl Functor for IOKind {
    fn map<A, B, F>(fa: IO<A>, function: F) -> IO<B>
    where
        A: Send + 'static,
        B: Send + 'static,
        F: FnOnce(A) -> B + Send + 'static,
    {
        fa.fmap(function)
    }
}

impl Monad for IOKind {
    fn pure<A: Send + 'static>(value: A) -> IO<A> {
        IO::pure(value)
    }

    fn flat_map<A, B, F>(fa: IO<A>, function: F) -> IO<B>
    where
        A: Send + 'static,
        B: Send + 'static,
        F: FnOnce(A) -> IO<B> + Send + 'static,
    {
        fa.flat_map(function)
    }

    fn tail_rec_m<S, B, F>(initial: S, mut step: F) -> IO<B>
    where
        S: Send + 'static,
        B: Send + 'static,
        F: FnMut(S) -> IO<Either<S, B>> + Send + 'static,
    {
        IO::try_new(move || {
            let mut state = initial;
            loop {
                match step(state).run_unsafe()? {
                    Either::Left(next) => state = next,
                    Either::Right(result) => return Ok(result),
                }
            }
        })
    }
}

impl ErrorChannel<EffectError> for IOKind {
    fn raise_error<A: Send + 'static>(error: EffectError) -> IO<A> {
        IO::fail(error)
    }

    fn handle_error_with<A, H>(fa: IO<A>, handler: H) -> IO<A>
    where
        A: Send + 'static,
        H: FnOnce(EffectError) -> IO<A> + Send + 'static,
    {
        fa.handle_error_with(handler)
    }
}

impl Defer for IOKind {
    fn defer<A, S>(supplier: S) -> IO<A>
    where
        A: Send + 'static,
        S: FnOnce() -> IO<A> + Send + 'static,
    {
        IO::suspend(supplier)
    }
}

impl Bracket for IOKind {
    fn bracket<R, B, U, L>(acquire: IO<R>, use_resource: U, release: L) -> IO<B>
    where
        R: Clone + Send + 'static,
        B: Send + 'static,
        U: FnOnce(R) -> IO<B> + Send + 'static,
        L: FnOnce(R) -> IO<()> + Send + 'static,
    {
        IO::bracket(acquire, use_resource, release)
    }
}

impl Scheduler for IOKind {
    fn sleep(duration: Duration) -> IO<()> {
        IO::sleep(duration)
    }
}
