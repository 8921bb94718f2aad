//! Monad type class - sequencing computations within a carrier.
//!
//! # Laws
//!
//! ## Left Identity Law
//!
//! ```text
//! M::flat_map(M::pure(a), f) == f(a)
//! ```
//!
//! ## Right Identity Law
//!
//! ```text
//! M::flat_map(m, M::pure) == m
//! ```
//!
//! ## Associativity Law
//!
//! ```text
//! M::flat_map(M::flat_map(m, f), g) == M::flat_map(m, |x| M::flat_map(f(x), g))
//! ```
//!
//! # Stack safety
//!
//! [`Monad::tail_rec_m`] is the primitive that makes
//! [`Program::fold_map`](crate::control::Program::fold_map) stack safe. Every
//! implementation must iterate its step function without growing the native
//! call stack, however many iterations occur. An implementation that recurses
//! instead voids the stack-safety guarantee of every program folded into it.
//!
//! # Examples
//!
//! ```rust
//! use purefx::control::Either;
//! use purefx::typeclass::{Monad, OptionKind};
//!
//! let halved = OptionKind::flat_map(Some(8), |n: i32| if n % 2 == 0 { Some(n / 2) } else { None });
//! assert_eq!(halved, Some(4));
//!
//! // Count down from one million without recursion.
//! let done = OptionKind::tail_rec_m(1_000_000_u32, |n| {
//!     Some(if n == 0 { Either::Right("done") } else { Either::Left(n - 1) })
//! });
//! assert_eq!(done, Some("done"));
//! ```

use super::functor::Functor;
use super::higher::{OptionKind, ResultKind};
use super::identity::{Identity, IdentityKind};
use crate::control::Either;

/// A carrier that can sequence dependent computations.
pub trait Monad: Functor {
    /// Lifts a value into the carrier.
    fn pure<A>(value: A) -> Self::Of<A>
    where
        A: Send + 'static;

    /// Sequences `fa` with a computation that depends on its result.
    fn flat_map<A, B, F>(fa: Self::Of<A>, function: F) -> Self::Of<B>
    where
        A: Send + 'static,
        B: Send + 'static,
        F: FnOnce(A) -> Self::Of<B> + Send + 'static;

    /// Repeats `step` until it yields `Right`, starting from `initial`.
    ///
    /// `Left(next)` feeds `next` into another iteration; `Right(result)` ends
    /// the loop. Implementations must run in constant native stack for any
    /// number of iterations.
    fn tail_rec_m<S, B, F>(initial: S, step: F) -> Self::Of<B>
    where
        S: Send + 'static,
        B: Send + 'static,
        F: FnMut(S) -> Self::Of<Either<S, B>> + Send + 'static;

    /// Runs `fa`, discards its value, then runs `next`.
    fn then<A, B>(fa: Self::Of<A>, next: Self::Of<B>) -> Self::Of<B>
    where
        A: Send + 'static,
        B: Send + 'static,
    {
        Self::flat_map(fa, move |_| next)
    }

    /// Combines two computations sequentially, left to right.
    fn map2<A, B, C, F>(fa: Self::Of<A>, fb: Self::Of<B>, function: F) -> Self::Of<C>
    where
        A: Send + 'static,
        B: Send + 'static,
        C: Send + 'static,
        F: FnOnce(A, B) -> C + Send + 'static,
    {
        Self::flat_map(fa, move |a| Self::map(fb, move |b| function(a, b)))
    }

    /// Removes one layer of nesting.
    fn flatten<A>(ffa: Self::Of<Self::Of<A>>) -> Self::Of<A>
    where
        A: Send + 'static,
    {
        Self::flat_map(ffa, |fa| fa)
    }
}

// =============================================================================
// Standard Library Implementations
// =============================================================================

impl Monad for OptionKind {
    #[inline]
    fn pure<A: Send + 'static>(value: A) -> Option<A> {
        Some(value)
    }

    #[inline]
    fn flat_map<A, B, F>(fa: Option<A>, function: F) -> Option<B>
    where
        A: Send + 'static,
        B: Send + 'static,
        F: FnOnce(A) -> Option<B> + Send + 'static,
    {
        fa.and_then(function)
    }

    fn tail_rec_m<S, B, F>(initial: S, mut step: F) -> Option<B>
    where
        S: Send + 'static,
        B: Send + 'static,
        F: FnMut(S) -> Option<Either<S, B>> + Send + 'static,
    {
        let mut state = initial;
        loop {
            match step(state)? {
                Either::Left(next) => state = next,
                Either::Right(result) => return Some(result),
            }
        }
    }
}

impl<E: Send + 'static> Monad for ResultKind<E> {
    #[inline]
    fn pure<A: Send + 'static>(value: A) -> Result<A, E> {
        Ok(value)
    }

    #[inline]
    fn flat_map<A, B, F>(fa: Result<A, E>, function: F) -> Result<B, E>
    where
        A: Send + 'static,
        B: Send + 'static,
        F: FnOnce(A) -> Result<B, E> + Send + 'static,
    {
        fa.and_then(function)
    }

    fn tail_rec_m<S, B, F>(initial: S, mut step: F) -> Result<B, E>
    where
        S: Send + 'static,
        B: Send + 'static,
        F: FnMut(S) -> Result<Either<S, B>, E> + Send + 'static,
    {
        let mut state = initial;
        loop {
            match step(state)? {
                Either::Left(next) => state = next,
                Either::Right(result) => return Ok(result),
            }
        }
    }
}

impl Monad for IdentityKind {
    #[inline]
    fn pure<A: Send + 'static>(value: A) -> Identity<A> {
        Identity(value)
    }

    #[inline]
    fn flat_map<A, B, F>(fa: Identity<A>, function: F) -> Identity<B>
    where
        A: Send + 'static,
        B: Send + 'static,
        F: FnOnce(A) -> Identity<B> + Send + 'static,
    {
        function(fa.0)
    }

    fn tail_rec_m<S, B, F>(initial: S, mut step: F) -> Identity<B>
    where
        S: Send + 'static,
        B: Send + 'static,
        F: FnMut(S) -> Identity<Either<S, B>> + Send + 'static,
    {
        let mut state = initial;
        loop {
            match step(state).0 {
                Either::Left(next) => state = next,
                Either::Right(result) => return Identity(result),
            }
        }
    }
}
