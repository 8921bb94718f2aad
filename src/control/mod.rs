//! Control structures: effect programs and stack-safe recursion.
//!
//! - [`Program`]: a description of an effectful computation, interpreted into
//!   any [`Monad`](crate::typeclass::Monad) with [`Program::fold_map`]
//! - [`Interpreter`]: translation of one effect type into a carrier, with
//!   [`Lifted`] to translate into another program and [`Or`] to interpret a
//!   [`CoproductKind`] of two effects
//! - [`Inject`]: embedding of a small effect into a combined one
//! - [`Trampoline`]: stack-safe recursion, built on `Program`
//! - [`Either`]: the loop signal of `tail_rec_m` and the error layer of `EitherT`
//!
//! # Examples
//!
//! ```rust
//! use purefx::control::{IdentityInterpreter, Program};
//! use purefx::typeclass::{Identity, IdentityKind};
//!
//! let program = Program::<IdentityKind, i32>::pure(1)
//!     .flat_map(|x| Program::lift(Identity(x + 1)))
//!     .flat_map(|y| Program::pure(y * 2));
//!
//! assert_eq!(program.fold_map::<IdentityKind, _>(IdentityInterpreter), Identity(4));
//! ```

mod either;
mod inject;
mod program;
mod trampoline;

pub use either::Either;
pub use inject::{CoproductKind, Inject, InjectLeft, InjectRight, Or};
pub use program::{IdentityInterpreter, Interpreter, Lifted, Program, ProgramKind, Shape};
pub use trampoline::{Thunk, ThunkKind, Trampoline};
