//! `Defer` type class - postponing the construction of a computation.

use crate::control::{Program, ProgramKind};
use crate::typeclass::Kind;

/// A carrier that can postpone building a computation until it runs.
///
/// Unlike `flat_map(pure(()), |_| ...)` on an eager carrier, `defer` must not
/// call `supplier` at construction time. Recursive definitions rely on this to
/// stay finite.
///
/// # Examples
///
/// ```rust
/// use purefx::effect::{Defer, IO, IOKind};
///
/// fn ones(remaining: u32, total: u32) -> IO<u32> {
///     if remaining == 0 {
///         IO::pure(total)
///     } else {
///         IOKind::defer(move || ones(remaining - 1, total + 1))
///     }
/// }
///
/// let program = ones(3, 0);
/// assert_eq!(program.run_unsafe(), Ok(3));
/// ```
pub trait Defer: Kind {
    /// A computation built by `supplier` when it is run.
    fn defer<A, S>(supplier: S) -> Self::Of<A>
    where
        A: Send + 'static,
        S: FnOnce() -> Self::Of<A> + Send + 'static;
}

impl<F: Kind> Defer for ProgramKind<F> {
    fn defer<A, S>(supplier: S) -> Program<F, A>
    where
        A: Send + 'static,
        S: FnOnce() -> Program<F, A> + Send + 'static,
    {
        Program::defer(supplier)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::typeclass::{Identity, IdentityKind};
    use rstest::rstest;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicBool, Ordering};

    #[rstest]
    fn program_defer_waits_for_interpretation() {
        let built = Arc::new(AtomicBool::new(false));
        let flag = Arc::clone(&built);
        let program = ProgramKind::<IdentityKind>::defer(move || {
            flag.store(true, Ordering::SeqCst);
            Program::pure("ready")
        });
        assert!(!built.load(Ordering::SeqCst));
        assert_eq!(program.run(), Identity("ready"));
        assert!(built.load(Ordering::SeqCst));
    }
}
