//! Functor type class - mapping over carrier values.
//!
//! # Laws
//!
//! ## Identity Law
//!
//! ```text
//! F::map(fa, |x| x) == fa
//! ```
//!
//! ## Composition Law
//!
//! ```text
//! F::map(F::map(fa, f), g) == F::map(fa, |x| g(f(x)))
//! ```
//!
//! # Examples
//!
//! ```rust
//! use purefx::typeclass::{Functor, OptionKind};
//!
//! let transformed = OptionKind::map(Some(5), |n: i32| n.to_string());
//! assert_eq!(transformed, Some("5".to_string()));
//!
//! let untouched = OptionKind::map(None, |n: i32| n.to_string());
//! assert_eq!(untouched, None);
//! ```

use super::higher::{Kind, OptionKind, ResultKind};
use super::identity::{Identity, IdentityKind};

/// A carrier whose result can be transformed without changing its shape.
///
/// `map` is the only operation the resumption engine needs from an effect
/// type: it is how a suspended step is erased and how `resume` attaches the
/// remaining computation to a suspended effect.
pub trait Functor: Kind {
    /// Applies `function` to the value produced by `fa`.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use purefx::typeclass::{Functor, Identity, IdentityKind};
    ///
    /// let doubled = IdentityKind::map(Identity(21), |n: i32| n * 2);
    /// assert_eq!(doubled, Identity(42));
    /// ```
    fn map<A, B, F>(fa: Self::Of<A>, function: F) -> Self::Of<B>
    where
        A: Send + 'static,
        B: Send + 'static,
        F: FnOnce(A) -> B + Send + 'static;

    /// Replaces the produced value with `value`.
    fn replace<A, B>(fa: Self::Of<A>, value: B) -> Self::Of<B>
    where
        A: Send + 'static,
        B: Send + 'static,
    {
        Self::map(fa, move |_| value)
    }

    /// Discards the produced value.
    fn void<A>(fa: Self::Of<A>) -> Self::Of<()>
    where
        A: Send + 'static,
    {
        Self::replace(fa, ())
    }
}

// =============================================================================
// Standard Library Implementations
// =============================================================================

impl Functor for OptionKind {
    #[inline]
    fn map<A, B, F>(fa: Option<A>, function: F) -> Option<B>
    where
        A: Send + 'static,
        B: Send + 'static,
        F: FnOnce(A) -> B + Send + 'static,
    {
        fa.map(function)
    }
}

impl<E: Send + 'static> Functor for ResultKind<E> {
    #[inline]
    fn map<A, B, F>(fa: Result<A, E>, function: F) -> Result<B, E>
    where
        A: Send + 'static,
        B: Send + 'static,
        F: FnOnce(A) -> B + Send + 'static,
    {
        fa.map(function)
    }
}

impl Functor for IdentityKind {
    #[inline]
    fn map<A, B, F>(fa: Identity<A>, function: F) -> Identity<B>
    where
        A: Send + 'static,
        B: Send + 'static,
        F: FnOnce(A) -> B + Send + 'static,
    {
        Identity(function(fa.0))
    }
}
