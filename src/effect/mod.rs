//! Effect capabilities and carriers.
//!
//! # Capabilities
//!
//! Static traits on carrier witnesses, layered on top of
//! [`Monad`](crate::typeclass::Monad):
//!
//! - [`ErrorChannel`]: raising and handling errors
//! - [`Defer`]: postponing construction of a computation
//! - [`Bracket`]: acquire / use / release with guaranteed release
//! - [`Scheduler`]: sleeping
//! - [`MonadDefer`]: all of the above with [`EffectError`] as the error
//!
//! # Carriers
//!
//! - [`IO`]: deferred synchronous side effects
//! - [`AsyncIO`]: deferred asynchronous side effects (feature `async`)
//! - [`EitherT`]: an `Either` layer over another carrier
//!
//! Side effects never run while a computation is being built:
//!
//! ```rust
//! use purefx::effect::IO;
//!
//! let io = IO::pure(10)
//!     .fmap(|x| x * 2)
//!     .flat_map(|x| IO::pure(x + 1));
//!
//! assert_eq!(io.run_unsafe(), Ok(21));
//! ```
//!
//! Generic code asks for a capability and works with every carrier:
//!
//! ```rust
//! use purefx::effect::{EffectError, IOKind, MonadDefer};
//!
//! fn parse<M: MonadDefer>(input: &'static str) -> M::Of<i32> {
//!     M::defer(move || match input.parse::<i32>() {
//!         Ok(number) => M::pure(number),
//!         Err(_) => M::raise(format!("not a number: {input}")),
//!     })
//! }
//!
//! assert_eq!(parse::<IOKind>("42").run_unsafe(), Ok(42));
//! assert_eq!(
//!     parse::<IOKind>("x").run_unsafe(),
//!     Err(EffectError::raised("not a number: x"))
//! );
//! ```

// =============================================================================
// Capabilities
// =============================================================================

mod bracket;
mod defer;
mod error;
mod error_channel;
mod monad_defer;
mod scheduler;

pub use bracket::Bracket;
pub use defer::Defer;
pub use error::EffectError;
pub use error_channel::ErrorChannel;
pub use monad_defer::MonadDefer;
pub use scheduler::Scheduler;

// =============================================================================
// IO Monad
// =============================================================================

mod io;

pub use io::{IO, IOKind};

// =============================================================================
// AsyncIO Monad (requires async feature)
// =============================================================================

#[cfg(feature = "async")]
mod async_io;

#[cfg(feature = "async")]
pub use async_io::{AsyncIO, AsyncIOKind};

// =============================================================================
// Monad Transformers
// =============================================================================

mod either_transformer;

pub use either_transformer::{EitherT, EitherTKind, ErrorStrategy, ViaBase, ViaEither};
