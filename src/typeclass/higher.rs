//! Type-constructor witnesses through Generic Associated Types.
//!
//! Rust cannot abstract over a type constructor such as `IO<_>` directly, so
//! every carrier is represented by a zero-sized *witness* type implementing
//! [`Kind`]. The witness names the constructor and `Kind::Of<T>` applies it.
//!
//! Capabilities ([`Functor`](super::Functor), [`Monad`](super::Monad) and the
//! effect traits) are static traits on the witness. Nothing is passed around at
//! runtime: selecting a carrier means naming its witness in a type parameter.
//!
//! # Example
//!
//! ```rust
//! use purefx::typeclass::{Kind, OptionKind};
//!
//! fn nothing<F: Kind>() -> F::Of<String>
//! where
//!     F::Of<String>: Default,
//! {
//!     Default::default()
//! }
//!
//! let value: Option<String> = nothing::<OptionKind>();
//! assert_eq!(value, None);
//! ```

use std::marker::PhantomData;

/// A type constructor, identified by a witness type.
///
/// `Of<T>` is the constructor applied to `T`. Carried values must be
/// `Send + 'static` so that programs built over any carrier can cross thread
/// boundaries and be stored behind trait objects.
///
/// # Laws
///
/// The witness carries no data; two values of `Self::Of<T>` are only ever
/// related through the capability traits implemented on the witness.
pub trait Kind: 'static {
    /// The type constructor applied to `T`.
    type Of<T: Send + 'static>: Send + 'static;
}

// =============================================================================
// Standard Library Witnesses
// =============================================================================

/// Witness for [`Option`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct OptionKind;

impl Kind for OptionKind {
    type Of<T: Send + 'static> = Option<T>;
}

/// Witness for [`Result`] with a fixed error type `E`.
pub struct ResultKind<E>(PhantomData<fn() -> E>);

impl<E: Send + 'static> Kind for ResultKind<E> {
    type Of<T: Send + 'static> = Result<T, E>;
}
