//! `AsyncIO` - deferred asynchronous side effects.
//!
//! `AsyncIO<A>` describes an asynchronous computation that yields `A` or
//! fails with an [`EffectError`]. Nothing runs until the value is awaited;
//! `AsyncIO` implements `Future` directly through a small pinned state
//! machine, so no unsafe code is needed.
//!
//! Panics raised while building or polling the inner future are caught and
//! surface as [`EffectError::Panicked`].
//!
//! # Cancellation
//!
//! Dropping an `AsyncIO` before it completes cancels it. This happens when a
//! [`AsyncIO::timeout`] elapses, when a `tokio::select!` branch loses, or when
//! a spawned task is aborted. A [`AsyncIO::bracket`] cancelled while its
//! resource is in use or being released still releases the resource exactly
//! once: the release is spawned on the current tokio runtime, or driven to
//! completion on the dropping thread when no runtime is active.
//! [`AsyncIO::timeout`] waits for such releases before it reports
//! [`EffectError::TimedOut`]; cancellation from outside (an aborted task, a
//! lost `select!` branch) cannot wait, so the release finishes in the
//! background.
//!
//! # Examples
//!
//! ```rust
//! use purefx::effect::AsyncIO;
//!
//! # tokio::runtime::Builder::new_current_thread().enable_all().build().unwrap().block_on(async {
//! let async_io = AsyncIO::new(|| async { 10 })
//!     .fmap(|x| x * 2)
//!     .flat_map(|x| AsyncIO::pure(x + 1));
//!
//! assert_eq!(async_io.await, Ok(21));
//! # });
//! ```

use std::fmt;
use std::future::Future;
use std::panic::{AssertUnwindSafe, catch_unwind};
use std::pin::Pin;
use std::sync::{Arc, Mutex, PoisonError};
use std::task::{Context, Poll, ready};
use std::time::Duration;

use futures::FutureExt;
use futures::future::{BoxFuture, Shared};
use pin_project_lite::pin_project;
use tracing::{debug, warn};

use super::bracket::{Bracket, settle};
use super::defer::Defer;
use super::error::EffectError;
use super::error_channel::ErrorChannel;
use super::scheduler::Scheduler;
use crate::control::Either;
use crate::typeclass::{Functor, Kind, Monad};

type Thunk<A> = Box<dyn FnOnce() -> BoxFuture<'static, Result<A, EffectError>> + Send>;

// =============================================================================
// AsyncIO Struct Definition
// =============================================================================

pin_project! {
    /// A deferred asynchronous computation producing `A`.
    ///
    /// # Monad Laws
    ///
    /// 1. **Left Identity**: `AsyncIO::pure(a).flat_map(f) == f(a)`
    /// 2. **Right Identity**: `m.flat_map(AsyncIO::pure) == m`
    /// 3. **Associativity**: `m.flat_map(f).flat_map(g) == m.flat_map(|x| f(x).flat_map(g))`
    pub struct AsyncIO<A> {
        #[pin]
        state: AsyncIOState<A>,
    }
}

pin_project! {
    /// Lifecycle of an `AsyncIO`.
    ///
    /// - `Ready` -> `Completed` (outcome known at construction)
    /// - `Defer` -> `Running` (first poll builds the future)
    /// - `Running` -> `Completed`
    #[project = AsyncIOStateProj]
    enum AsyncIOState<A> {
        Ready {
            outcome: Option<Result<A, EffectError>>,
        },
        Defer {
            thunk: Option<Thunk<A>>,
        },
        Running {
            #[pin]
            future: BoxFuture<'static, Result<A, EffectError>>,
        },
        Completed,
    }
}

// =============================================================================
// Future Implementation
// =============================================================================

impl<A> Future for AsyncIO<A> {
    type Output = Result<A, EffectError>;

    fn poll(self: Pin<&mut Self>, context: &mut Context<'_>) -> Poll<Self::Output> {
        let mut this = self.project();

        loop {
            match this.state.as_mut().project() {
                AsyncIOStateProj::Ready { outcome } => {
                    // INVARIANT: Ready is left for Completed on its first poll
                    let outcome = outcome
                        .take()
                        .expect("AsyncIO internal error: Ready outcome was already consumed");
                    this.state.set(AsyncIOState::Completed);
                    return Poll::Ready(outcome);
                }
                AsyncIOStateProj::Defer { thunk } => {
                    // INVARIANT: Defer is left for Running on its first poll
                    let thunk = thunk
                        .take()
                        .expect("AsyncIO internal error: Defer thunk was already consumed");
                    let future = thunk();
                    this.state.set(AsyncIOState::Running { future });
                }
                AsyncIOStateProj::Running { future } => {
                    let outcome = ready!(future.poll(context));
                    this.state.set(AsyncIOState::Completed);
                    return Poll::Ready(outcome);
                }
                AsyncIOStateProj::Completed => panic!("AsyncIO polled after completion"),
            }
        }
    }
}

// =============================================================================
// Construction
// =============================================================================

impl<A: Send + 'static> AsyncIO<A> {
    const fn from_thunk(thunk: Thunk<A>) -> Self {
        Self {
            state: AsyncIOState::Defer { thunk: Some(thunk) },
        }
    }

    const fn ready(outcome: Result<A, EffectError>) -> Self {
        Self {
            state: AsyncIOState::Ready {
                outcome: Some(outcome),
            },
        }
    }

    /// Wraps a closure producing a future that may fail.
    #[must_use]
    pub fn try_new<F, Fut>(action: F) -> Self
    where
        F: FnOnce() -> Fut + Send + 'static,
        Fut: Future<Output = Result<A, EffectError>> + Send + 'static,
    {
        Self::from_thunk(Box::new(move || match catch_unwind(AssertUnwindSafe(action)) {
            Ok(future) => AssertUnwindSafe(future)
                .catch_unwind()
                .map(|outcome| {
                    outcome.unwrap_or_else(|payload| Err(EffectError::from_panic(payload.as_ref())))
                })
                .boxed(),
            Err(payload) => {
                futures::future::ready(Err(EffectError::from_panic(payload.as_ref()))).boxed()
            }
        }))
    }

    /// Wraps a closure producing a future.
    ///
    /// The closure is not called until the `AsyncIO` is awaited.
    #[must_use]
    pub fn new<F, Fut>(action: F) -> Self
    where
        F: FnOnce() -> Fut + Send + 'static,
        Fut: Future<Output = A> + Send + 'static,
    {
        Self::try_new(move || action().map(Ok))
    }

    /// Wraps an existing future.
    #[must_use]
    pub fn from_future<Fut>(future: Fut) -> Self
    where
        Fut: Future<Output = A> + Send + 'static,
    {
        Self::new(move || future)
    }

    /// An action that yields `value`.
    #[must_use]
    pub const fn pure(value: A) -> Self {
        Self::ready(Ok(value))
    }

    /// An action that fails with `error`.
    #[must_use]
    pub const fn fail(error: EffectError) -> Self {
        Self::ready(Err(error))
    }

    /// Builds the action with `supplier` only when it is awaited.
    #[must_use]
    pub fn suspend<F>(supplier: F) -> Self
    where
        F: FnOnce() -> Self + Send + 'static,
    {
        Self::try_new(supplier)
    }

    /// Awaits the action.
    ///
    /// # Errors
    ///
    /// Returns the error the action raised, [`EffectError::Panicked`] if it
    /// panicked, or [`EffectError::TimedOut`] from [`AsyncIO::timeout`].
    pub async fn run_async(self) -> Result<A, EffectError> {
        self.await
    }

    // =========================================================================
    // Composition
    // =========================================================================

    /// Transforms the result.
    #[must_use]
    pub fn fmap<B, F>(self, function: F) -> AsyncIO<B>
    where
        B: Send + 'static,
        F: FnOnce(A) -> B + Send + 'static,
    {
        AsyncIO::try_new(move || async move { self.await.map(function) })
    }

    /// Continues with an action that depends on the result.
    #[must_use]
    pub fn flat_map<B, F>(self, function: F) -> AsyncIO<B>
    where
        B: Send + 'static,
        F: FnOnce(A) -> AsyncIO<B> + Send + 'static,
    {
        AsyncIO::try_new(move || async move {
            let value = self.await?;
            function(value).await
        })
    }

    /// Alias for [`AsyncIO::flat_map`].
    #[must_use]
    pub fn and_then<B, F>(self, function: F) -> AsyncIO<B>
    where
        B: Send + 'static,
        F: FnOnce(A) -> AsyncIO<B> + Send + 'static,
    {
        self.flat_map(function)
    }

    /// Runs `next` after this action, discarding this result.
    #[must_use]
    pub fn then<B: Send + 'static>(self, next: AsyncIO<B>) -> AsyncIO<B> {
        self.flat_map(move |_| next)
    }

    /// Runs both actions one after the other and combines their results.
    #[must_use]
    pub fn map2<B, C, F>(self, other: AsyncIO<B>, function: F) -> AsyncIO<C>
    where
        B: Send + 'static,
        C: Send + 'static,
        F: FnOnce(A, B) -> C + Send + 'static,
    {
        self.flat_map(move |first| other.fmap(move |second| function(first, second)))
    }

    /// Runs both actions concurrently and combines their results.
    ///
    /// Results are combined in argument order. When both sides fail, the error
    /// of `self` is returned.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use purefx::effect::AsyncIO;
    ///
    /// # tokio::runtime::Builder::new_current_thread().enable_all().build().unwrap().block_on(async {
    /// let sum = AsyncIO::pure(40).par_map2(AsyncIO::pure(2), |a, b| a + b);
    /// assert_eq!(sum.await, Ok(42));
    /// # });
    /// ```
    #[must_use]
    pub fn par_map2<B, C, F>(self, other: AsyncIO<B>, function: F) -> AsyncIO<C>
    where
        B: Send + 'static,
        C: Send + 'static,
        F: FnOnce(A, B) -> C + Send + 'static,
    {
        AsyncIO::try_new(move || async move {
            let (first, second) = futures::future::join(self, other).await;
            Ok(function(first?, second?))
        })
    }

    /// Runs both actions concurrently and pairs their results.
    #[must_use]
    pub fn par<B: Send + 'static>(self, other: AsyncIO<B>) -> AsyncIO<(A, B)> {
        self.par_map2(other, |first, second| (first, second))
    }

    // =========================================================================
    // Errors, Time and Resources
    // =========================================================================

    /// Recovers from a failure with the action returned by `handler`.
    #[must_use]
    pub fn handle_error_with<H>(self, handler: H) -> Self
    where
        H: FnOnce(EffectError) -> Self + Send + 'static,
    {
        Self::try_new(move || async move {
            match self.await {
                Ok(value) => Ok(value),
                Err(error) => handler(error).await,
            }
        })
    }

    /// Exposes the outcome as a value.
    #[must_use]
    pub fn attempt(self) -> AsyncIO<Either<EffectError, A>> {
        AsyncIO::try_new(move || async move { Ok(Either::from(self.await)) })
    }

    /// Fails with [`EffectError::TimedOut`] if the action does not finish
    /// within `duration`; the unfinished action is cancelled.
    ///
    /// Releases of brackets cancelled this way finish before the outcome is
    /// returned.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use std::time::Duration;
    /// use purefx::effect::{AsyncIO, EffectError};
    ///
    /// # tokio::runtime::Builder::new_current_thread().enable_all().start_paused(true).build().unwrap().block_on(async {
    /// let slow = AsyncIO::sleep(Duration::from_secs(10)).timeout(Duration::from_millis(100));
    /// assert_eq!(
    ///     slow.await,
    ///     Err(EffectError::TimedOut { after: Duration::from_millis(100) })
    /// );
    /// # });
    /// ```
    #[must_use]
    pub fn timeout(self, duration: Duration) -> Self {
        Self::try_new(move || async move {
            let scope = ReleaseScope::nested();
            let timed = tokio::time::timeout(duration, RELEASE_SCOPE.scope(scope.clone(), self));
            let outcome = timed.await;
            scope.wait().await;
            match outcome {
                Ok(outcome) => outcome,
                Err(_) => {
                    debug!(?duration, "AsyncIO timed out; cancelled");
                    Err(EffectError::TimedOut { after: duration })
                }
            }
        })
    }

    /// Acquires a resource, uses it, and always releases it.
    ///
    /// See [`Bracket`] for the ordering and error-precedence rules.
    /// Cancellation while the resource is in use, or while it is being
    /// released, still runs `release` to completion exactly once.
    #[must_use]
    pub fn bracket<R, U, L>(acquire: AsyncIO<R>, use_resource: U, release: L) -> Self
    where
        R: Clone + Send + 'static,
        U: FnOnce(R) -> Self + Send + 'static,
        L: FnOnce(R) -> AsyncIO<()> + Send + 'static,
    {
        Self::try_new(move || async move {
            let resource = acquire.await?;
            debug!("resource acquired");
            let mut guard = ReleaseGuard::new(resource.clone(), release);
            let outcome = Self::suspend(move || use_resource(resource)).await;
            let released = guard.release().await;
            debug!(
                use_failed = outcome.is_err(),
                release_failed = released.is_err(),
                "resource released"
            );
            settle(outcome, released)
        })
    }
}

impl AsyncIO<()> {
    /// Completes after `duration` on the tokio timer.
    #[must_use]
    pub fn sleep(duration: Duration) -> Self {
        Self::new(move || tokio::time::sleep(duration))
    }
}

impl<A> fmt::Debug for AsyncIO<A> {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str("AsyncIO(<deferred>)")
    }
}

// =============================================================================
// Release Guard
// =============================================================================

type PendingRelease = Shared<BoxFuture<'static, ()>>;

tokio::task_local! {
    static RELEASE_SCOPE: ReleaseScope;
}

/// Collects releases that were moved off a cancelled bracket.
///
/// A scope is installed by each [`AsyncIO::timeout`]; a release registered
/// with it is also registered with every enclosing scope, so an outer
/// timeout still waits when an inner one is itself cancelled.
#[derive(Clone)]
struct ReleaseScope {
    pending: Arc<Mutex<Vec<PendingRelease>>>,
    parent: Option<Box<ReleaseScope>>,
}

impl ReleaseScope {
    fn current() -> Option<Self> {
        RELEASE_SCOPE.try_with(Clone::clone).ok()
    }

    fn nested() -> Self {
        Self {
            pending: Arc::default(),
            parent: Self::current().map(Box::new),
        }
    }

    fn register(&self, release: &PendingRelease) {
        let mut scope = Some(self);
        while let Some(current) = scope {
            current
                .pending
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .push(release.clone());
            scope = current.parent.as_deref();
        }
    }

    async fn wait(&self) {
        let pending = std::mem::take(
            &mut *self.pending.lock().unwrap_or_else(PoisonError::into_inner),
        );
        if !pending.is_empty() {
            debug!(releases = pending.len(), "waiting for cancelled releases");
            futures::future::join_all(pending).await;
        }
    }
}

/// Owns a bracket's release until it has run to completion.
///
/// Dropping a guard that still holds its release means the bracket was
/// cancelled while in use or while releasing; the release, possibly already
/// half-polled, is then finished off the dropped future.
struct ReleaseGuard {
    pending: Option<BoxFuture<'static, Result<(), EffectError>>>,
    scope: Option<ReleaseScope>,
}

impl ReleaseGuard {
    fn new<R, L>(resource: R, release: L) -> Self
    where
        R: Send + 'static,
        L: FnOnce(R) -> AsyncIO<()> + Send + 'static,
    {
        Self {
            pending: Some(AsyncIO::suspend(move || release(resource)).boxed()),
            scope: ReleaseScope::current(),
        }
    }

    async fn release(&mut self) -> Result<(), EffectError> {
        let outcome = match self.pending.as_mut() {
            Some(release) => release.await,
            None => Ok(()),
        };
        self.pending = None;
        outcome
    }
}

impl Drop for ReleaseGuard {
    fn drop(&mut self) {
        let Some(release) = self.pending.take() else {
            return;
        };
        debug!("bracket cancelled before release finished; releasing resource");
        let finished = async move {
            if let Err(error) = release.await {
                warn!(%error, "release after cancellation failed");
            }
        };
        match tokio::runtime::Handle::try_current() {
            Ok(handle) => {
                let task = handle.spawn(finished).map(|_| ()).boxed().shared();
                if let Some(scope) = &self.scope {
                    scope.register(&task);
                }
            }
            Err(_) => futures::executor::block_on(finished),
        }
    }
}

// =============================================================================
// Capability Instances
// =============================================================================

/// Witness for [`AsyncIO`].
#[derive(Debug, Clone, Copy, Default)]
pub struct AsyncIOKind;

impl Kind for AsyncIOKind {
    type Of<T: Send + 'static> = AsyncIO<T>;
}

impl Functor for AsyncIOKind {
    fn map<A, B, F>(fa: AsyncIO<A>, function: F) -> AsyncIO<B>
    where
        A: Send + 'static,
        B: Send + 'static,
        F: FnOnce(A) -> B + Send + 'static,
    {
        fa.fmap(function)
    }
}

impl Monad for AsyncIOKind {
    fn pure<A: Send + 'static>(value: A) -> AsyncIO<A> {
        AsyncIO::pure(value)
    }

    fn flat_map<A, B, F>(fa: AsyncIO<A>, function: F) -> AsyncIO<B>
    where
        A: Send + 'static,
        B: Send + 'static,
        F: FnOnce(A) -> AsyncIO<B> + Send + 'static,
    {
        fa.flat_map(function)
    }

    fn tail_rec_m<S, B, F>(initial: S, mut step: F) -> AsyncIO<B>
    where
        S: Send + 'static,
        B: Send + 'static,
        F: FnMut(S) -> AsyncIO<Either<S, B>> + Send + 'static,
    {
        AsyncIO::try_new(move || async move {
            let mut state = initial;
            loop {
                match step(state).await? {
                    Either::Left(next) => state = next,
                    Either::Right(result) => return Ok(result),
                }
            }
        })
    }
}

impl ErrorChannel<EffectError> for AsyncIOKind {
    fn raise_error<A: Send + 'static>(error: EffectError) -> AsyncIO<A> {
        AsyncIO::fail(error)
    }

    fn handle_error_with<A, H>(fa: AsyncIO<A>, handler: H) -> AsyncIO<A>
    where
        A: Send + 'static,
        H: FnOnce(EffectError) -> AsyncIO<A> + Send + 'static,
    {
        fa.handle_error_with(handler)
    }
}

impl Defer for AsyncIOKind {
    fn defer<A, S>(supplier: S) -> AsyncIO<A>
    where
        A: Send + 'static,
        S: FnOnce() -> AsyncIO<A> + Send + 'static,
    {
        AsyncIO::suspend(supplier)
    }
}

impl Bracket for AsyncIOKind {
    fn bracket<R, B, U, L>(acquire: AsyncIO<R>, use_resource: U, release: L) -> AsyncIO<B>
    where
        R: Clone + Send + 'static,
        B: Send + 'static,
        U: FnOnce(R) -> AsyncIO<B> + Send + 'static,
        L: FnOnce(R) -> AsyncIO<()> + Send + 'static,
    {
        AsyncIO::bracket(acquire, use_resource, release)
    }
}

impl Scheduler for AsyncIOKind {
    fn sleep(duration: Duration) -> AsyncIO<()> {
        AsyncIO::sleep(duration)
    }
}
