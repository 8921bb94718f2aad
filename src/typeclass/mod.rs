//! Type class traits the resumption engine is written against.
//!
//! - [`Kind`]: type-constructor witness (GAT emulation of higher-kinded types)
//! - [`Functor`]: mapping over a carrier's result
//! - [`Monad`]: sequencing, including the stack-safe `tail_rec_m` primitive
//!
//! ## Witnesses
//!
//! Capabilities are implemented on zero-sized witness types rather than on the
//! carrier values themselves, so generic code can call `F::pure` or `F::map`
//! without holding a value of the carrier. This crate ships [`IdentityKind`],
//! [`OptionKind`] and [`ResultKind`] here; the effect carriers live in
//! [`crate::effect`].
//!
//! # Examples
//!
//! ```rust
//! use purefx::typeclass::{Functor, Monad, ResultKind};
//!
//! type Parsed = ResultKind<String>;
//!
//! let doubled = Parsed::flat_map(Ok(21), |n: i32| Parsed::pure(n * 2));
//! assert_eq!(Parsed::map(doubled, |n| n + 0), Ok(42));
//! ```

mod functor;
mod higher;
mod identity;
mod monad;

pub use functor::Functor;
pub use higher::{Kind, OptionKind, ResultKind};
pub use identity::{Identity, IdentityKind};
pub use monad::Monad;
