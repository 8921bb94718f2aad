//! # purefx
//!
//! Stack-safe effect programs for Rust.
//!
//! ## Overview
//!
//! A [`Program`](control::Program) describes an effectful computation before it
//! runs: pure values, suspended effect steps and sequencing. The program is
//! interpreted into any carrier that implements the capability traits, using
//! the carrier's own `tail_rec_m` so that arbitrarily deep chains run in
//! constant native stack.
//!
//! - **Type classes**: [`Kind`](typeclass::Kind), [`Functor`](typeclass::Functor),
//!   [`Monad`](typeclass::Monad)
//! - **Control**: [`Program`](control::Program), [`Trampoline`](control::Trampoline),
//!   [`Either`](control::Either)
//! - **Effects**: [`ErrorChannel`](effect::ErrorChannel), [`Defer`](effect::Defer),
//!   [`Bracket`](effect::Bracket), [`Scheduler`](effect::Scheduler),
//!   [`MonadDefer`](effect::MonadDefer) and the carriers [`IO`](effect::IO),
//!   `AsyncIO` and [`EitherT`](effect::EitherT)
//!
//! ## Feature Flags
//!
//! - `async` (default): the tokio-backed `AsyncIO` carrier
//! - `full`: enable all features
//!
//! ## Example
//!
//! ```rust
//! use purefx::prelude::*;
//!
//! let program = Program::<IOKind, i32>::lift(IO::new(|| 20))
//!     .flat_map(|value| Program::pure(value + 1))
//!     .map(|value| value * 2);
//!
//! let io: IO<i32> = program.fold_map::<IOKind, _>(IdentityInterpreter);
//! assert_eq!(io.run_unsafe(), Ok(42));
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]
// Note: Disabling redundant_closure_for_method_calls due to clippy 0.1.92 panic bug
#![allow(clippy::redundant_closure_for_method_calls)]

/// Prelude module for convenient imports.
///
/// Re-exports commonly used types and traits.
///
/// # Usage
///
/// ```rust
/// use purefx::prelude::*;
/// ```
pub mod prelude {
    pub use crate::control::*;
    pub use crate::effect::*;
    pub use crate::typeclass::*;
}

pub mod control;
pub mod effect;
pub mod typeclass;
