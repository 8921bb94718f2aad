//! The identity carrier.
//!
//! `Identity` adds no effect at all: `pure` wraps, `flat_map` applies. It is
//! the synchronous target used to run programs whose effects are themselves
//! pure descriptions, such as [`Trampoline`](crate::control::Trampoline), and
//! the simplest model for checking the monad laws.

use super::higher::Kind;

/// A value with no additional behaviour.
///
/// # Examples
///
/// ```rust
/// use purefx::typeclass::Identity;
///
/// let wrapped = Identity::new(42);
/// assert_eq!(wrapped.into_inner(), 42);
/// assert_eq!(Identity(7).0, 7);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Identity<A>(pub A);

impl<A> Identity<A> {
    /// Wraps `value`.
    #[inline]
    pub const fn new(value: A) -> Self {
        Self(value)
    }

    /// Returns the wrapped value.
    #[inline]
    pub fn into_inner(self) -> A {
        self.0
    }

    /// Borrows the wrapped value.
    #[inline]
    pub const fn as_inner(&self) -> &A {
        &self.0
    }
}

impl<A> From<A> for Identity<A> {
    fn from(value: A) -> Self {
        Self::new(value)
    }
}

/// Witness for [`Identity`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct IdentityKind;

impl Kind for IdentityKind {
    type Of<T: Send + 'static> = Identity<T>;
}
