//! Trampoline for stack-safe recursion.
//!
//! A [`Trampoline`] is a [`Program`] whose only effect is a deferred
//! computation ([`Thunk`]). Running it folds the program into
//! [`Identity`], forcing each thunk in turn, so recursion depth is bounded by
//! the heap rather than the call stack. This holds for `flat_map` chains of any
//! shape, including left-nested ones built in a loop.
//!
//! # Examples
//!
//! ```rust
//! use purefx::control::Trampoline;
//!
//! fn is_even(n: u64) -> Trampoline<bool> {
//!     if n == 0 {
//!         Trampoline::done(true)
//!     } else {
//!         Trampoline::suspend(move || is_odd(n - 1))
//!     }
//! }
//!
//! fn is_odd(n: u64) -> Trampoline<bool> {
//!     if n == 0 {
//!         Trampoline::done(false)
//!     } else {
//!         Trampoline::suspend(move || is_even(n - 1))
//!     }
//! }
//!
//! assert!(is_even(1_000_000).run());
//! ```

use std::fmt;

use super::program::{Interpreter, Program};
use super::Either;
use crate::typeclass::{Functor, Identity, IdentityKind, Kind};

/// A deferred computation producing `A`.
pub struct Thunk<A>(Box<dyn FnOnce() -> A + Send>);

impl<A> Thunk<A> {
    /// Wraps `computation` without running it.
    pub fn new<C>(computation: C) -> Self
    where
        C: FnOnce() -> A + Send + 'static,
    {
        Self(Box::new(computation))
    }

    /// Runs the computation.
    pub fn force(self) -> A {
        (self.0)()
    }
}

impl<A> fmt::Debug for Thunk<A> {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str("Thunk(<deferred>)")
    }
}

/// Witness for [`Thunk`].
#[derive(Debug, Clone, Copy, Default)]
pub struct ThunkKind;

impl Kind for ThunkKind {
    type Of<T: Send + 'static> = Thunk<T>;
}

impl Functor for ThunkKind {
    fn map<A, B, F>(fa: Thunk<A>, function: F) -> Thunk<B>
    where
        A: Send + 'static,
        B: Send + 'static,
        F: FnOnce(A) -> B + Send + 'static,
    {
        Thunk::new(move || function(fa.force()))
    }
}

/// Forces each thunk as the program reaches it.
struct Force;

impl Interpreter<ThunkKind, IdentityKind> for Force {
    #[inline]
    fn apply<T: Send + 'static>(&mut self, effect: Thunk<T>) -> Identity<T> {
        Identity(effect.force())
    }
}

/// A stack-safe recursive computation producing `A`.
pub struct Trampoline<A: Send + 'static>(Program<ThunkKind, A>);

impl<A: Send + 'static> Trampoline<A> {
    /// A finished computation.
    #[inline]
    pub fn done(value: A) -> Self {
        Self(Program::pure(value))
    }

    /// Alias for [`Trampoline::done`].
    #[inline]
    pub fn pure(value: A) -> Self {
        Self::done(value)
    }

    /// Continues with the trampoline produced by `thunk`, once run.
    pub fn suspend<F>(thunk: F) -> Self
    where
        F: FnOnce() -> Self + Send + 'static,
    {
        Self(Program::<ThunkKind, Self>::lift(Thunk::new(thunk)).flat_map(|next: Self| next.0))
    }

    /// A computation that produces the value of `thunk` when run.
    pub fn delay<F>(thunk: F) -> Self
    where
        F: FnOnce() -> A + Send + 'static,
    {
        Self(Program::<ThunkKind, A>::lift(Thunk::new(thunk)))
    }

    /// Runs the computation to completion in constant stack.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use purefx::control::Trampoline;
    ///
    /// let mut sum = Trampoline::done(0_u64);
    /// for index in 1..=100_000_u64 {
    ///     sum = sum.map(move |total| total + index);
    /// }
    /// assert_eq!(sum.run(), 5_000_050_000);
    /// ```
    pub fn run(self) -> A {
        self.0.fold_map::<IdentityKind, _>(Force).into_inner()
    }

    /// Advances to the next deferred step.
    ///
    /// Returns `Right(value)` when finished, otherwise `Left(thunk)` where
    /// forcing `thunk` yields the rest of the computation.
    pub fn resume(self) -> Either<Thunk<Self>, A> {
        match self.0.resume() {
            Either::Left(thunk) => Either::Left(ThunkKind::map(thunk, Self)),
            Either::Right(value) => Either::Right(value),
        }
    }

    /// Transforms the result.
    pub fn map<B, F>(self, function: F) -> Trampoline<B>
    where
        B: Send + 'static,
        F: FnOnce(A) -> B + Send + 'static,
    {
        Trampoline(self.0.map(function))
    }

    /// Continues with a computation that depends on the result.
    pub fn flat_map<B, F>(self, function: F) -> Trampoline<B>
    where
        B: Send + 'static,
        F: FnOnce(A) -> Trampoline<B> + Send + 'static,
    {
        Trampoline(self.0.flat_map(move |value| function(value).0))
    }

    /// Alias for [`Trampoline::flat_map`].
    pub fn and_then<B, F>(self, function: F) -> Trampoline<B>
    where
        B: Send + 'static,
        F: FnOnce(A) -> Trampoline<B> + Send + 'static,
    {
        self.flat_map(function)
    }

    /// Runs `next` after this computation, discarding this result.
    pub fn then<B: Send + 'static>(self, next: Trampoline<B>) -> Trampoline<B> {
        Trampoline(self.0.and_then(next.0))
    }
}

impl<A: Send + 'static> fmt::Debug for Trampoline<A> {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.debug_tuple("Trampoline").field(&self.0).finish()
    }
}
