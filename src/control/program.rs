//! Stack-safe effect programs.
//!
//! A [`Program<F, A>`] describes a computation over the effect type `F` that
//! eventually produces an `A`. It is a plain value: building one runs nothing.
//! The computation only happens when the program is interpreted with
//! [`Program::resume`], [`Program::step`] or [`Program::fold_map`].
//!
//! # Design
//!
//! ```text
//! Program<F, A> = Done(A)
//!               | Suspend(F<A>)
//!               | Bind(Program<F, X>, X -> Program<F, A>)
//! ```
//!
//! Intermediate values are type-erased (`Box<dyn Any + Send>`) so that `Bind`
//! can hide its `X`; the typed facade restores the type where it is known.
//!
//! Before a program is interpreted, a `Bind` whose source is again a `Bind` is
//! rewritten
//!
//! ```text
//! Bind(Bind(p, f), g)  =>  Bind(p, x -> Bind(f(x), g))
//! ```
//!
//! and this is repeated until the source is no longer a `Bind`. The composed
//! continuation `x -> Bind(f(x), g)` is stored as a queue of arrows rather
//! than as a closure capturing closures, so rewriting, applying and dropping
//! it never recurse.
//!
//! [`Program::fold_map`] drives the normalized program through the target
//! carrier's [`Monad::tail_rec_m`], so a chain of N binds runs in N loop
//! iterations and constant native stack, provided the target's `tail_rec_m`
//! is itself iterative.
//!
//! # Examples
//!
//! ```rust
//! use purefx::control::{IdentityInterpreter, Program};
//! use purefx::typeclass::{Identity, IdentityKind};
//!
//! let mut program = Program::<IdentityKind, u64>::pure(0);
//! for _ in 0..100_000 {
//!     program = program.flat_map(|n| Program::pure(n + 1));
//! }
//!
//! let result = program.fold_map::<IdentityKind, _>(IdentityInterpreter);
//! assert_eq!(result, Identity(100_000));
//! ```

use std::any::Any;
use std::collections::VecDeque;
use std::fmt;
use std::marker::PhantomData;
use std::mem;

use static_assertions::assert_impl_all;
use tracing::trace;

use super::Either;
use super::inject::Inject;
use crate::typeclass::{Functor, IdentityKind, Kind, Monad};

// =============================================================================
// Erased Nodes
// =============================================================================

type Erased = Box<dyn Any + Send>;

type Arrow<F> = Box<dyn FnOnce(Erased) -> Node<F> + Send>;

/// Kleisli composition of arrows, applied front to back.
///
/// Applying `[f, g, h]` to `x` yields `Bind(f(x), [g, h])`.
struct Continuation<F: Kind> {
    arrows: VecDeque<Arrow<F>>,
}

impl<F: Kind> Continuation<F> {
    fn single(arrow: Arrow<F>) -> Self {
        let mut arrows = VecDeque::with_capacity(1);
        arrows.push_back(arrow);
        Self { arrows }
    }

    /// `x -> Bind(self(x), next)`.
    ///
    /// The shorter queue is moved into the longer one.
    fn and_then(mut self, mut next: Self) -> Self {
        if self.arrows.len() <= next.arrows.len() {
            while let Some(arrow) = self.arrows.pop_back() {
                next.arrows.push_front(arrow);
            }
            next
        } else {
            self.arrows.append(&mut next.arrows);
            self
        }
    }

    fn apply(mut self, value: Erased) -> Node<F> {
        let Some(arrow) = self.arrows.pop_front() else {
            return Node::Done(value);
        };
        let next = arrow(value);
        if self.arrows.is_empty() {
            next
        } else {
            Node::Bind(Box::new(next), self)
        }
    }
}

enum Node<F: Kind> {
    Done(Erased),
    Suspend(F::Of<Erased>),
    Bind(Box<Node<F>>, Continuation<F>),
}

/// A node with no `Bind` left in source position.
enum Normalized<F: Kind> {
    Done(Erased),
    Suspend(F::Of<Erased>),
    Bound(F::Of<Erased>, Continuation<F>),
}

impl<F: Kind> Node<F> {
    fn unit() -> Self {
        Self::Done(Box::new(()))
    }

    fn normalize(self) -> Normalized<F> {
        let mut current = self;
        loop {
            current = match current {
                Self::Done(value) => return Normalized::Done(value),
                Self::Suspend(effect) => return Normalized::Suspend(effect),
                Self::Bind(source, continuation) => match *source {
                    Self::Done(value) => continuation.apply(value),
                    Self::Suspend(effect) => return Normalized::Bound(effect, continuation),
                    Self::Bind(inner, inner_continuation) => {
                        Self::Bind(inner, inner_continuation.and_then(continuation))
                    }
                },
            };
        }
    }
}

impl<F: Kind> Normalized<F> {
    fn into_node(self) -> Node<F> {
        match self {
            Self::Done(value) => Node::Done(value),
            Self::Suspend(effect) => Node::Suspend(effect),
            Self::Bound(effect, continuation) => {
                Node::Bind(Box::new(Node::Suspend(effect)), continuation)
            }
        }
    }
}

fn reveal<A: 'static>(value: Erased) -> A {
    *value
        .downcast::<A>()
        .expect("Type mismatch in program continuation")
}

// =============================================================================
// Program
// =============================================================================

/// The outermost constructor of a [`Program`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Shape {
    /// A finished value.
    Done,
    /// A single suspended effect.
    Suspend,
    /// A source program followed by a continuation.
    Bind,
}

/// A description of an effectful computation over `F` producing `A`.
///
/// Programs are `Send` and consumed by exactly one interpretation call.
pub struct Program<F: Kind, A> {
    node: Node<F>,
    _result: PhantomData<fn() -> A>,
}

assert_impl_all!(Program<IdentityKind, String>: Send);

impl<F: Kind, A: Send + 'static> Program<F, A> {
    const fn from_node(node: Node<F>) -> Self {
        Self {
            node,
            _result: PhantomData,
        }
    }

    fn into_node(mut self) -> Node<F> {
        mem::replace(&mut self.node, Node::unit())
    }

    // =========================================================================
    // Construction
    // =========================================================================

    /// A finished program.
    #[inline]
    pub fn pure(value: A) -> Self {
        Self::from_node(Node::Done(Box::new(value)))
    }

    /// A program made of a single effect step.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use purefx::control::{Program, Shape};
    /// use purefx::typeclass::{Identity, IdentityKind};
    ///
    /// let program = Program::<IdentityKind, i32>::lift(Identity(3));
    /// assert_eq!(program.shape(), Shape::Suspend);
    /// ```
    pub fn lift(effect: F::Of<A>) -> Self
    where
        F: Functor,
    {
        Self::from_node(Node::Suspend(F::map(effect, |value: A| {
            Box::new(value) as Erased
        })))
    }

    /// A program made of a single step of a smaller effect `E`, embedded into
    /// `F` by `injection`.
    ///
    /// See [`CoproductKind`](super::CoproductKind) for combining effects.
    pub fn inject<E, I>(injection: &I, effect: E::Of<A>) -> Self
    where
        E: Kind,
        F: Functor,
        I: Inject<E, F>,
    {
        Self::lift(injection.inject(effect))
    }

    /// Defers building the program until it is interpreted.
    ///
    /// `supplier` runs once, when the interpreter reaches this point; this is
    /// what keeps self-referential definitions finite.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use purefx::control::{IdentityInterpreter, Program};
    /// use purefx::typeclass::{Identity, IdentityKind};
    ///
    /// fn count_down(n: u32) -> Program<IdentityKind, &'static str> {
    ///     if n == 0 {
    ///         Program::pure("liftoff")
    ///     } else {
    ///         Program::defer(move || count_down(n - 1))
    ///     }
    /// }
    ///
    /// let result = count_down(50_000).fold_map::<IdentityKind, _>(IdentityInterpreter);
    /// assert_eq!(result, Identity("liftoff"));
    /// ```
    pub fn defer<S>(supplier: S) -> Self
    where
        S: FnOnce() -> Self + Send + 'static,
    {
        Program::<F, ()>::pure(()).flat_map(move |()| supplier())
    }

    // =========================================================================
    // Composition
    // =========================================================================

    /// Continues with a program computed from this program's result.
    ///
    /// Runs in O(1) and executes nothing.
    pub fn flat_map<B, K>(self, continuation: K) -> Program<F, B>
    where
        B: Send + 'static,
        K: FnOnce(A) -> Program<F, B> + Send + 'static,
    {
        let arrow: Arrow<F> =
            Box::new(move |value: Erased| continuation(reveal::<A>(value)).into_node());
        Program::from_node(Node::Bind(
            Box::new(self.into_node()),
            Continuation::single(arrow),
        ))
    }

    /// Transforms the result.
    pub fn map<B, M>(self, function: M) -> Program<F, B>
    where
        B: Send + 'static,
        M: FnOnce(A) -> B + Send + 'static,
    {
        self.flat_map(move |value| Program::pure(function(value)))
    }

    /// Runs `next` after this program, ignoring this program's result.
    pub fn and_then<B>(self, next: Program<F, B>) -> Program<F, B>
    where
        B: Send + 'static,
    {
        self.flat_map(move |_| next)
    }

    /// Runs this program, then `other`, and combines both results.
    pub fn map2<B, C, M>(self, other: Program<F, B>, function: M) -> Program<F, C>
    where
        B: Send + 'static,
        C: Send + 'static,
        M: FnOnce(A, B) -> C + Send + 'static,
    {
        self.flat_map(move |first| other.map(move |second| function(first, second)))
    }

    /// Discards the result.
    pub fn void(self) -> Program<F, ()> {
        self.map(|_| ())
    }

    // =========================================================================
    // Interpretation
    // =========================================================================

    /// Returns the outermost constructor.
    pub fn shape(&self) -> Shape {
        match &self.node {
            Node::Done(_) => Shape::Done,
            Node::Suspend(_) => Shape::Suspend,
            Node::Bind(..) => Shape::Bind,
        }
    }

    /// Flattens nested binds and inlines finished sources.
    ///
    /// The result is `Done`, `Suspend`, or a `Bind` whose source is a
    /// `Suspend`. No effect is run and no `Functor` is needed.
    pub fn step(self) -> Self {
        Self::from_node(self.into_node().normalize().into_node())
    }

    /// Advances the program to its next suspended effect.
    ///
    /// Returns `Right(value)` if the program finished, or `Left(effect)` where
    /// `effect` yields the rest of the program once run.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use purefx::control::{Either, Program};
    /// use purefx::typeclass::{Identity, IdentityKind};
    ///
    /// let program = Program::<IdentityKind, i32>::pure(1)
    ///     .flat_map(|n| Program::lift(Identity(n + 1)))
    ///     .map(|n| n * 10);
    ///
    /// let Either::Left(Identity(rest)) = program.resume() else {
    ///     panic!("expected a suspended step");
    /// };
    /// assert_eq!(rest.resume().right(), Some(20));
    /// ```
    pub fn resume(self) -> Either<F::Of<Self>, A>
    where
        F: Functor,
    {
        match self.into_node().normalize() {
            Normalized::Done(value) => Either::Right(reveal::<A>(value)),
            Normalized::Suspend(effect) => Either::Left(F::map(effect, |value: Erased| {
                Self::from_node(Node::Done(value))
            })),
            Normalized::Bound(effect, continuation) => {
                Either::Left(F::map(effect, move |value: Erased| {
                    Self::from_node(continuation.apply(value))
                }))
            }
        }
    }

    /// Interprets the program into the carrier `G`.
    ///
    /// Every suspended `F` effect is translated with `interpreter`, and the
    /// sequencing is driven by `G::tail_rec_m`. Native stack use is constant
    /// in the length of the program as long as `G::tail_rec_m` is iterative.
    pub fn fold_map<G, N>(self, mut interpreter: N) -> G::Of<A>
    where
        G: Monad,
        N: Interpreter<F, G> + Send + 'static,
    {
        G::tail_rec_m::<Self, A, _>(self, move |program: Self| {
            match program.into_node().normalize() {
                Normalized::Done(value) => {
                    trace!("program finished");
                    G::pure(Either::<Self, A>::Right(reveal::<A>(value)))
                }
                Normalized::Suspend(effect) => {
                    trace!("interpreting final effect");
                    G::map(interpreter.apply(effect), |value: Erased| {
                        Either::<Self, A>::Right(reveal::<A>(value))
                    })
                }
                Normalized::Bound(effect, continuation) => {
                    trace!("interpreting effect");
                    G::map(interpreter.apply(effect), move |value: Erased| {
                        Either::<Self, A>::Left(Self::from_node(continuation.apply(value)))
                    })
                }
            }
        })
    }

    /// Interprets the program in its own effect carrier.
    pub fn run(self) -> F::Of<A>
    where
        F: Monad,
    {
        self.fold_map::<F, _>(IdentityInterpreter)
    }
}

impl<F: Kind, A> Drop for Program<F, A> {
    fn drop(&mut self) {
        let mut current = mem::replace(&mut self.node, Node::unit());
        while let Node::Bind(source, continuation) = current {
            drop(continuation);
            current = *source;
        }
    }
}

impl<F: Kind, A: Send + 'static> fmt::Debug for Program<F, A> {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.debug_tuple("Program").field(&self.shape()).finish()
    }
}

// =============================================================================
// Interpreter
// =============================================================================

/// A natural transformation from the effect `F` to the carrier `G`.
///
/// `apply` must work for every result type, which is why this is a trait with
/// a generic method rather than a closure.
///
/// # Examples
///
/// ```rust
/// use purefx::control::Interpreter;
/// use purefx::typeclass::{Identity, IdentityKind, OptionKind};
///
/// struct Unwrap;
///
/// impl Interpreter<IdentityKind, OptionKind> for Unwrap {
///     fn apply<T: Send + 'static>(&mut self, effect: Identity<T>) -> Option<T> {
///         Some(effect.into_inner())
///     }
/// }
/// ```
pub trait Interpreter<F: Kind, G: Kind> {
    /// Translates one effect.
    fn apply<T: Send + 'static>(&mut self, effect: F::Of<T>) -> G::Of<T>;
}

/// The interpreter that leaves every effect unchanged.
#[derive(Debug, Clone, Copy, Default)]
pub struct IdentityInterpreter;

impl<F: Kind> Interpreter<F, F> for IdentityInterpreter {
    #[inline]
    fn apply<T: Send + 'static>(&mut self, effect: F::Of<T>) -> F::Of<T> {
        effect
    }
}

/// Turns an interpreter `F ~> G` into one that yields single-step programs
/// over `G`.
///
/// Folding with it translates a `Program<F, A>` into a `Program<G, A>`
/// without running anything.
///
/// # Examples
///
/// ```rust
/// use purefx::control::{Interpreter, Lifted, Program, ProgramKind};
/// use purefx::typeclass::{Identity, IdentityKind, OptionKind};
///
/// struct Always;
///
/// impl Interpreter<IdentityKind, OptionKind> for Always {
///     fn apply<T: Send + 'static>(&mut self, effect: Identity<T>) -> Option<T> {
///         Some(effect.into_inner())
///     }
/// }
///
/// let program = Program::<IdentityKind, i32>::lift(Identity(1)).map(|n| n + 1);
/// let translated: Program<OptionKind, i32> =
///     program.fold_map::<ProgramKind<OptionKind>, _>(Lifted::new(Always));
/// assert_eq!(translated.run(), Some(2));
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct Lifted<N>(N);

impl<N> Lifted<N> {
    /// Wraps `interpreter`.
    pub const fn new(interpreter: N) -> Self {
        Self(interpreter)
    }

    /// Unwraps the inner interpreter.
    pub fn into_inner(self) -> N {
        self.0
    }
}

impl<F, G, N> Interpreter<F, ProgramKind<G>> for Lifted<N>
where
    F: Kind,
    G: Functor,
    N: Interpreter<F, G>,
{
    fn apply<T: Send + 'static>(&mut self, effect: F::Of<T>) -> Program<G, T> {
        Program::lift(self.0.apply(effect))
    }
}

// =============================================================================
// Program as a Monad
// =============================================================================

/// Witness for [`Program`] over the effect `F`.
///
/// Folding into `ProgramKind<G>` translates a program over one effect into a
/// program over another.
pub struct ProgramKind<F>(PhantomData<fn() -> F>);

impl<F: Kind> Kind for ProgramKind<F> {
    type Of<T: Send + 'static> = Program<F, T>;
}

impl<F: Kind> Functor for ProgramKind<F> {
    fn map<A, B, M>(fa: Program<F, A>, function: M) -> Program<F, B>
    where
        A: Send + 'static,
        B: Send + 'static,
        M: FnOnce(A) -> B + Send + 'static,
    {
        fa.map(function)
    }
}

impl<F: Kind> Monad for ProgramKind<F> {
    fn pure<A: Send + 'static>(value: A) -> Program<F, A> {
        Program::pure(value)
    }

    fn flat_map<A, B, K>(fa: Program<F, A>, function: K) -> Program<F, B>
    where
        A: Send + 'static,
        B: Send + 'static,
        K: FnOnce(A) -> Program<F, B> + Send + 'static,
    {
        fa.flat_map(function)
    }

    fn tail_rec_m<S, B, K>(initial: S, mut step: K) -> Program<F, B>
    where
        S: Send + 'static,
        B: Send + 'static,
        K: FnMut(S) -> Program<F, Either<S, B>> + Send + 'static,
    {
        step(initial).flat_map(move |next| match next {
            Either::Left(state) => Self::tail_rec_m(state, step),
            Either::Right(result) => Program::pure(result),
        })
    }
}
