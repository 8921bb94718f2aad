//! `EitherT` - Either monad transformer.
//!
//! `EitherT<M, L, R>` wraps `M<Either<L, R>>`: a computation in the base
//! carrier `M` that may stop early with a `Left`. Its capabilities are derived
//! from the base carrier's and from the `Either` algebra.
//!
//! # Error Strategies
//!
//! The witness [`EitherTKind<M, L, S>`] selects how errors of type `L` travel:
//!
//! - [`ViaEither`] keeps them in the `Either` layer. `raise_error(l)` is
//!   `M::pure(Left(l))` and handlers inspect the `Either`. Works over any
//!   `Monad`.
//! - [`ViaBase`] hands them to the base carrier's own [`ErrorChannel<L>`]. The
//!   base short-circuits and handles them; the `Either` layer is bypassed on
//!   error paths, so a `Left` built with [`EitherT::left`] is not seen by a
//!   `ViaBase` handler.
//!
//! Both witnesses share the same value type, so one `EitherT` can be driven
//! under either strategy.
//!
//! # Examples
//!
//! ```rust
//! use purefx::control::Either;
//! use purefx::effect::{EitherT, EitherTKind, ErrorChannel, ViaEither};
//! use purefx::typeclass::{Identity, IdentityKind};
//!
//! type Checked = EitherTKind<IdentityKind, String, ViaEither>;
//!
//! let failed: EitherT<IdentityKind, String, i32> = Checked::raise_error("boom".to_string());
//! let recovered = Checked::handle_error(failed, |error| error.len() as i32);
//! assert_eq!(recovered.value(), Identity(Either::Right(4)));
//! ```

use std::fmt;
use std::marker::PhantomData;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use tracing::warn;

use super::bracket::Bracket;
use super::defer::Defer;
use super::error::EffectError;
use super::error_channel::ErrorChannel;
use super::monad_defer::MonadDefer;
use super::scheduler::Scheduler;
use crate::control::Either;
use crate::typeclass::{Functor, Kind, Monad};

// =============================================================================
// EitherT Value
// =============================================================================

/// A base-carrier computation producing `Either<L, R>`.
pub struct EitherT<M: Kind, L: Send + 'static, R: Send + 'static> {
    value: M::Of<Either<L, R>>,
}

impl<M: Kind, L: Send + 'static, R: Send + 'static> EitherT<M, L, R> {
    /// Wraps a base computation.
    pub const fn new(value: M::Of<Either<L, R>>) -> Self {
        Self { value }
    }

    /// Unwraps the base computation.
    pub fn value(self) -> M::Of<Either<L, R>> {
        self.value
    }
}

impl<M: Monad, L: Send + 'static, R: Send + 'static> EitherT<M, L, R> {
    /// A successful computation.
    pub fn right(value: R) -> Self {
        Self::new(M::pure(Either::Right(value)))
    }

    /// A computation that stopped with `error` in the `Either` layer.
    pub fn left(error: L) -> Self {
        Self::new(M::pure(Either::Left(error)))
    }

    /// Lifts a base computation; its value becomes a `Right`.
    pub fn lift(base: M::Of<R>) -> Self {
        Self::new(M::map(base, Either::Right))
    }

    /// Lifts a plain `Either`.
    pub fn from_either(either: Either<L, R>) -> Self {
        Self::new(M::pure(either))
    }

    /// Transforms the `Right` value.
    pub fn map<B, F>(self, function: F) -> EitherT<M, L, B>
    where
        B: Send + 'static,
        F: FnOnce(R) -> B + Send + 'static,
    {
        EitherT::new(M::map(self.value, move |either: Either<L, R>| {
            either.map(function)
        }))
    }

    /// Continues with `function` on `Right`; a `Left` short-circuits.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use purefx::control::Either;
    /// use purefx::effect::EitherT;
    /// use purefx::typeclass::{Identity, IdentityKind};
    ///
    /// fn positive(value: i32) -> EitherT<IdentityKind, String, i32> {
    ///     if value > 0 {
    ///         EitherT::right(value)
    ///     } else {
    ///         EitherT::left(format!("{value} is not positive"))
    ///     }
    /// }
    ///
    /// let doubled = positive(21).flat_map(|value| EitherT::right(value * 2));
    /// assert_eq!(doubled.value(), Identity(Either::Right(42)));
    ///
    /// let rejected = positive(-1).flat_map(|value| EitherT::right(value * 2));
    /// assert_eq!(rejected.value(), Identity(Either::Left("-1 is not positive".to_string())));
    /// ```
    pub fn flat_map<B, F>(self, function: F) -> EitherT<M, L, B>
    where
        B: Send + 'static,
        F: FnOnce(R) -> EitherT<M, L, B> + Send + 'static,
    {
        EitherT::new(M::flat_map(self.value, move |either| match either {
            Either::Left(error) => M::pure(Either::Left(error)),
            Either::Right(value) => function(value).value,
        }))
    }

    /// Like [`EitherT::flat_map`] with a function returning the base carrier.
    pub fn flat_map_f<B, F>(self, function: F) -> EitherT<M, L, B>
    where
        B: Send + 'static,
        F: FnOnce(R) -> M::Of<Either<L, B>> + Send + 'static,
    {
        self.flat_map(move |value| EitherT::new(function(value)))
    }

    /// Transforms the `Left` value.
    pub fn map_left<T, F>(self, function: F) -> EitherT<M, T, R>
    where
        T: Send + 'static,
        F: FnOnce(L) -> T + Send + 'static,
    {
        EitherT::new(M::map(self.value, move |either: Either<L, R>| {
            either.map_left(function)
        }))
    }

    /// Transforms both sides.
    pub fn bimap<T, U, F, G>(self, left_function: F, right_function: G) -> EitherT<M, T, U>
    where
        T: Send + 'static,
        U: Send + 'static,
        F: FnOnce(L) -> T + Send + 'static,
        G: FnOnce(R) -> U + Send + 'static,
    {
        EitherT::new(M::map(self.value, move |either: Either<L, R>| {
            either.bimap(left_function, right_function)
        }))
    }

    /// Collapses both sides into one base value.
    pub fn fold<B, F, G>(self, left_function: F, right_function: G) -> M::Of<B>
    where
        B: Send + 'static,
        F: FnOnce(L) -> B + Send + 'static,
        G: FnOnce(R) -> B + Send + 'static,
    {
        M::map(self.value, move |either: Either<L, R>| {
            either.fold(left_function, right_function)
        })
    }

    /// Exchanges `Left` and `Right`.
    pub fn swap(self) -> EitherT<M, R, L> {
        EitherT::new(M::map(self.value, Either::swap))
    }

    /// The `Right` value, or `default` applied to the `Left`.
    pub fn get_or_else<F>(self, default: F) -> M::Of<R>
    where
        F: FnOnce(L) -> R + Send + 'static,
    {
        M::map(self.value, move |either: Either<L, R>| {
            either.right_or_else(default)
        })
    }
}

impl<M, L, R> Clone for EitherT<M, L, R>
where
    M: Kind,
    L: Send + 'static,
    R: Send + 'static,
    M::Of<Either<L, R>>: Clone,
{
    fn clone(&self) -> Self {
        Self::new(self.value.clone())
    }
}

impl<M, L, R> fmt::Debug for EitherT<M, L, R>
where
    M: Kind,
    L: Send + 'static,
    R: Send + 'static,
    M::Of<Either<L, R>>: fmt::Debug,
{
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.debug_tuple("EitherT").field(&self.value).finish()
    }
}

// =============================================================================
// Strategies
// =============================================================================

/// Errors stay in the `Either` layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct ViaEither;

/// Errors are raised in the base carrier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct ViaBase;

/// How `bracket` reports an acquire that returned `Left`.
///
/// A failed acquire leaves no resource to hand to `use`; `recover_acquire`
/// builds the bracket's outcome in the strategy's representation instead.
pub trait ErrorStrategy: 'static {
    /// Builds the outcome for a bracket whose acquire returned `Left(error)`.
    fn recover_acquire<M, A>(error: EffectError) -> M::Of<Either<EffectError, A>>
    where
        M: MonadDefer,
        A: Send + 'static;
}

impl ErrorStrategy for ViaEither {
    fn recover_acquire<M, A>(error: EffectError) -> M::Of<Either<EffectError, A>>
    where
        M: MonadDefer,
        A: Send + 'static,
    {
        M::pure(Either::Left(error))
    }
}

impl ErrorStrategy for ViaBase {
    fn recover_acquire<M, A>(error: EffectError) -> M::Of<Either<EffectError, A>>
    where
        M: MonadDefer,
        A: Send + 'static,
    {
        M::raise_error(error)
    }
}

// =============================================================================
// Witness and Capability Instances
// =============================================================================

/// Witness for [`EitherT`] over `M` with left type `L` and error strategy `S`.
pub struct EitherTKind<M, L, S = ViaEither>(PhantomData<fn() -> (M, L, S)>);

impl<M: Kind, L: Send + 'static, S: 'static> Kind for EitherTKind<M, L, S> {
    type Of<T: Send + 'static> = EitherT<M, L, T>;
}

impl<M: Functor, L: Send + 'static, S: 'static> Functor for EitherTKind<M, L, S> {
    fn map<A, B, F>(fa: EitherT<M, L, A>, function: F) -> EitherT<M, L, B>
    where
        A: Send + 'static,
        B: Send + 'static,
        F: FnOnce(A) -> B + Send + 'static,
    {
        EitherT::new(M::map(fa.value, move |either: Either<L, A>| {
            either.map(function)
        }))
    }
}

impl<M: Monad, L: Send + 'static, S: 'static> Monad for EitherTKind<M, L, S> {
    fn pure<A: Send + 'static>(value: A) -> EitherT<M, L, A> {
        EitherT::right(value)
    }

    fn flat_map<A, B, F>(fa: EitherT<M, L, A>, function: F) -> EitherT<M, L, B>
    where
        A: Send + 'static,
        B: Send + 'static,
        F: FnOnce(A) -> EitherT<M, L, B> + Send + 'static,
    {
        fa.flat_map(function)
    }

    fn tail_rec_m<T, B, F>(initial: T, mut step: F) -> EitherT<M, L, B>
    where
        T: Send + 'static,
        B: Send + 'static,
        F: FnMut(T) -> EitherT<M, L, Either<T, B>> + Send + 'static,
    {
        EitherT::new(M::tail_rec_m::<T, Either<L, B>, _>(initial, move |state| {
            M::map(
                step(state).value,
                |either: Either<L, Either<T, B>>| match either {
                    Either::Left(error) => Either::Right(Either::Left(error)),
                    Either::Right(Either::Left(next)) => Either::Left(next),
                    Either::Right(Either::Right(result)) => Either::Right(Either::Right(result)),
                },
            )
        }))
    }
}

impl<M: Monad, L: Send + 'static> ErrorChannel<L> for EitherTKind<M, L, ViaEither> {
    fn raise_error<A: Send + 'static>(error: L) -> EitherT<M, L, A> {
        EitherT::left(error)
    }

    fn handle_error_with<A, H>(fa: EitherT<M, L, A>, handler: H) -> EitherT<M, L, A>
    where
        A: Send + 'static,
        H: FnOnce(L) -> EitherT<M, L, A> + Send + 'static,
    {
        EitherT::new(M::flat_map(fa.value, move |either| match either {
            Either::Left(error) => handler(error).value,
            Either::Right(value) => M::pure(Either::Right(value)),
        }))
    }
}

impl<M: ErrorChannel<L>, L: Send + 'static> ErrorChannel<L> for EitherTKind<M, L, ViaBase> {
    fn raise_error<A: Send + 'static>(error: L) -> EitherT<M, L, A> {
        EitherT::new(M::raise_error(error))
    }

    fn handle_error_with<A, H>(fa: EitherT<M, L, A>, handler: H) -> EitherT<M, L, A>
    where
        A: Send + 'static,
        H: FnOnce(L) -> EitherT<M, L, A> + Send + 'static,
    {
        EitherT::new(M::handle_error_with(fa.value, move |error| {
            handler(error).value
        }))
    }
}

impl<M: Defer, L: Send + 'static, S: 'static> Defer for EitherTKind<M, L, S> {
    fn defer<A, F>(supplier: F) -> EitherT<M, L, A>
    where
        A: Send + 'static,
        F: FnOnce() -> EitherT<M, L, A> + Send + 'static,
    {
        EitherT::new(M::defer(move || supplier().value))
    }
}

impl<M, L, S> Scheduler for EitherTKind<M, L, S>
where
    M: Functor + Scheduler,
    L: Send + 'static,
    S: 'static,
{
    fn sleep(duration: Duration) -> EitherT<M, L, ()> {
        EitherT::new(M::map(M::sleep(duration), Either::Right))
    }
}

impl<M: MonadDefer, S: ErrorStrategy> Bracket for EitherTKind<M, EffectError, S> {
    /// Brackets through the base carrier with `Either<EffectError, R>` as the
    /// resource.
    ///
    /// - A `Left` from `acquire` skips `use_resource` and `release` and is
    ///   reported through [`ErrorStrategy::recover_acquire`].
    /// - A `Left` from `use_resource` stays in the `Either` layer.
    /// - Base failures stay base failures.
    /// - A `Left` from `release` is raised in `M`, so `M`'s precedence rules
    ///   apply; it is dropped when `use_resource` returned a `Left`, and
    ///   reported as a `Left` when `use_resource` returned a `Right`.
    fn bracket<R, B, U, L>(
        acquire: EitherT<M, EffectError, R>,
        use_resource: U,
        release: L,
    ) -> EitherT<M, EffectError, B>
    where
        R: Clone + Send + 'static,
        B: Send + 'static,
        U: FnOnce(R) -> EitherT<M, EffectError, B> + Send + 'static,
        L: FnOnce(R) -> EitherT<M, EffectError, ()> + Send + 'static,
    {
        let progress = Arc::new(UseProgress::default());
        let used = Arc::clone(&progress);
        let releasing = Arc::clone(&progress);

        let outcome = M::bracket::<Either<EffectError, R>, Either<EffectError, B>, _, _>(
            acquire.value,
            move |acquired: Either<EffectError, R>| match acquired {
                Either::Left(error) => S::recover_acquire::<M, B>(error),
                Either::Right(resource) => {
                    M::map::<Either<EffectError, B>, Either<EffectError, B>, _>(
                        use_resource(resource).value,
                        move |result: Either<EffectError, B>| {
                            used.record_use(result.is_left());
                            result
                        },
                    )
                }
            },
            move |acquired: Either<EffectError, R>| match acquired {
                Either::Left(_) => M::pure(()),
                Either::Right(resource) => M::flat_map::<Either<EffectError, ()>, (), _>(
                    release(resource).value,
                    move |released: Either<EffectError, ()>| match released {
                        Either::Right(()) => M::pure(()),
                        Either::Left(error) => releasing.release_left::<M>(error),
                    },
                ),
            },
        );

        EitherT::new(M::handle_error_with::<Either<EffectError, B>, _>(outcome, move |error: EffectError| {
            if progress.release_reported.load(Ordering::SeqCst) {
                M::pure(Either::Left(error))
            } else {
                M::raise_error(error)
            }
        }))
    }
}

/// What an `EitherT` bracket's use step produced, seen from its release.
#[derive(Debug, Default)]
struct UseProgress {
    returned_right: AtomicBool,
    returned_left: AtomicBool,
    release_reported: AtomicBool,
}

impl UseProgress {
    fn record_use(&self, is_left: bool) {
        let flag = if is_left { &self.returned_left } else { &self.returned_right };
        flag.store(true, Ordering::SeqCst);
    }

    fn release_left<M: MonadDefer>(&self, error: EffectError) -> M::Of<()> {
        if self.returned_left.load(Ordering::SeqCst) {
            warn!(%error, "release returned Left after use returned Left; keeping the use Left");
            return M::pure(());
        }
        if self.returned_right.load(Ordering::SeqCst) {
            self.release_reported.store(true, Ordering::SeqCst);
        }
        M::raise_error(error)
    }
}
