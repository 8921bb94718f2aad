//! Combining instruction sets.
//!
//! [`CoproductKind<F, G>`] is the effect whose steps are either `F` steps or
//! `G` steps. A program written against one small instruction set is lifted
//! into the combined one with an [`Inject`], and the combined program is
//! interpreted by pairing one interpreter per side with [`Or`].
//!
//! # Examples
//!
//! ```rust
//! use purefx::control::{CoproductKind, IdentityInterpreter, InjectLeft, InjectRight, Interpreter, Or, Program};
//! use purefx::typeclass::{Identity, IdentityKind, OptionKind};
//!
//! struct Always;
//!
//! impl Interpreter<IdentityKind, OptionKind> for Always {
//!     fn apply<T: Send + 'static>(&mut self, effect: Identity<T>) -> Option<T> {
//!         Some(effect.into_inner())
//!     }
//! }
//!
//! type Both = CoproductKind<IdentityKind, OptionKind>;
//!
//! let program = Program::<Both, i32>::inject::<IdentityKind, _>(&InjectLeft, Identity(20))
//!     .flat_map(|n| Program::inject::<OptionKind, _>(&InjectRight::direct(), Some(n + 1)));
//!
//! let result = program.fold_map::<OptionKind, _>(Or::new(Always, IdentityInterpreter));
//! assert_eq!(result, Some(21));
//! ```

use std::marker::PhantomData;

use super::Either;
use super::program::{IdentityInterpreter, Interpreter};
use crate::typeclass::{Functor, Kind};

/// Witness for an effect that is either an `F` step or a `G` step.
pub struct CoproductKind<F, G>(PhantomData<fn() -> (F, G)>);

impl<F: Kind, G: Kind> Kind for CoproductKind<F, G> {
    type Of<T: Send + 'static> = Either<F::Of<T>, G::Of<T>>;
}

impl<F: Functor, G: Functor> Functor for CoproductKind<F, G> {
    fn map<A, B, M>(fa: Either<F::Of<A>, G::Of<A>>, function: M) -> Either<F::Of<B>, G::Of<B>>
    where
        A: Send + 'static,
        B: Send + 'static,
        M: FnOnce(A) -> B + Send + 'static,
    {
        match fa {
            Either::Left(effect) => Either::Left(F::map(effect, function)),
            Either::Right(effect) => Either::Right(G::map(effect, function)),
        }
    }
}

/// An embedding of the effect `F` into the larger effect `G`.
pub trait Inject<F: Kind, G: Kind> {
    /// Embeds one step.
    fn inject<T: Send + 'static>(&self, effect: F::Of<T>) -> G::Of<T>;
}

impl<F: Kind> Inject<F, F> for IdentityInterpreter {
    #[inline]
    fn inject<T: Send + 'static>(&self, effect: F::Of<T>) -> F::Of<T> {
        effect
    }
}

/// Embeds `F` as the left side of `CoproductKind<F, G>`.
#[derive(Debug, Clone, Copy, Default)]
pub struct InjectLeft;

impl<F: Kind, G: Kind> Inject<F, CoproductKind<F, G>> for InjectLeft {
    fn inject<T: Send + 'static>(&self, effect: F::Of<T>) -> Either<F::Of<T>, G::Of<T>> {
        Either::Left(effect)
    }
}

/// Embeds into the right side of a coproduct, through the wrapped injection
/// for nested coproducts such as `CoproductKind<A, CoproductKind<B, C>>`.
#[derive(Debug, Clone, Copy, Default)]
pub struct InjectRight<I = IdentityInterpreter>(pub I);

impl InjectRight {
    /// Embeds `G` as the right side of `CoproductKind<F, G>`.
    pub const fn direct() -> Self {
        Self(IdentityInterpreter)
    }
}

impl<F, G, H, I> Inject<F, CoproductKind<H, G>> for InjectRight<I>
where
    F: Kind,
    G: Kind,
    H: Kind,
    I: Inject<F, G>,
{
    fn inject<T: Send + 'static>(&self, effect: F::Of<T>) -> Either<H::Of<T>, G::Of<T>> {
        Either::Right(self.0.inject(effect))
    }
}

/// Interprets `CoproductKind<F, G>` with one interpreter per side.
#[derive(Debug, Clone, Copy, Default)]
pub struct Or<L, R> {
    left: L,
    right: R,
}

impl<L, R> Or<L, R> {
    /// Pairs an interpreter for the left steps with one for the right steps.
    pub const fn new(left: L, right: R) -> Self {
        Self { left, right }
    }
}

impl<F, G, H, L, R> Interpreter<CoproductKind<F, G>, H> for Or<L, R>
where
    F: Kind,
    G: Kind,
    H: Kind,
    L: Interpreter<F, H>,
    R: Interpreter<G, H>,
{
    fn apply<T: Send + 'static>(&mut self, effect: Either<F::Of<T>, G::Of<T>>) -> H::Of<T> {
        match effect {
            Either::Left(effect) => self.left.apply(effect),
            Either::Right(effect) => self.right.apply(effect),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::control::Program;
    use crate::typeclass::{Identity, IdentityKind, OptionKind};
    use rstest::rstest;

    type Both = CoproductKind<IdentityKind, OptionKind>;
    type Three = CoproductKind<IdentityKind, CoproductKind<OptionKind, IdentityKind>>;

    struct Always;

    impl Interpreter<IdentityKind, OptionKind> for Always {
        fn apply<T: Send + 'static>(&mut self, effect: Identity<T>) -> Option<T> {
            Some(effect.into_inner())
        }
    }

    #[rstest]
    fn test_inject_left_and_right() {
        let left: Either<Identity<i32>, Option<i32>> =
            <InjectLeft as Inject<IdentityKind, Both>>::inject(&InjectLeft, Identity(1));
        assert_eq!(left, Either::Left(Identity(1)));

        let right: Either<Identity<i32>, Option<i32>> =
            <InjectRight as Inject<OptionKind, Both>>::inject(&InjectRight::direct(), Some(2));
        assert_eq!(right, Either::Right(Some(2)));
    }

    #[rstest]
    fn test_nested_injection_reaches_the_middle() {
        let injection = InjectRight(InjectLeft);
        let middle = <InjectRight<InjectLeft> as Inject<OptionKind, Three>>::inject(&injection, Some(3));
        assert_eq!(middle, Either::Right(Either::Left(Some(3))));
    }

    #[rstest]
    fn test_coproduct_map_keeps_the_side() {
        let mapped = Both::map(Either::Right(Some(4)), |n: i32| n * 10);
        assert_eq!(mapped, Either::Right(Some(40)));
    }

    #[rstest]
    #[case(Some(1), Some(12))]
    #[case(None, None)]
    fn test_or_routes_each_side(#[case] right_step: Option<i32>, #[case] expected: Option<i32>) {
        let program = Program::<Both, i32>::inject::<IdentityKind, _>(&InjectLeft, Identity(10))
            .flat_map(move |n| {
                Program::inject::<OptionKind, _>(&InjectRight::direct(), right_step).map(move |m| n + m + 1)
            });

        let result = program.fold_map::<OptionKind, _>(Or::new(Always, IdentityInterpreter));
        assert_eq!(result, expected);
    }
}
