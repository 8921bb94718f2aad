//! Error type of the throwable-like error channel.
//!
//! [`EffectError`] is what [`IO`](super::IO), `AsyncIO` and every
//! [`MonadDefer`](super::MonadDefer) carrier raise: explicit failures, panics
//! captured while running a suspended step, cancellation and timeouts.

use std::any::Any;
use std::fmt;
use std::time::Duration;

/// A failure surfaced through an effect carrier's error channel.
///
/// # Examples
///
/// ```rust
/// use purefx::effect::EffectError;
///
/// let error = EffectError::raised("disk full");
/// assert_eq!(format!("{error}"), "effect raised: disk full");
/// assert_eq!(error.message(), Some("disk full"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum EffectError {
    /// Raised explicitly by user code.
    Raised {
        /// Description of the failure.
        message: String,
    },
    /// A panic was caught while running a suspended step.
    Panicked {
        /// The panic payload, if it was a string.
        message: String,
    },
    /// The computation was cancelled before it completed.
    Cancelled,
    /// The computation did not complete within its time limit.
    TimedOut {
        /// The limit that elapsed.
        after: Duration,
    },
}

impl EffectError {
    /// An explicitly raised error.
    pub fn raised(message: impl Into<String>) -> Self {
        Self::Raised {
            message: message.into(),
        }
    }

    /// Builds a [`EffectError::Panicked`] from a `catch_unwind` payload.
    pub fn from_panic(payload: &(dyn Any + Send)) -> Self {
        let message = payload
            .downcast_ref::<&str>()
            .map(|message| (*message).to_string())
            .or_else(|| payload.downcast_ref::<String>().cloned())
            .unwrap_or_else(|| "non-string panic payload".to_string());
        Self::Panicked { message }
    }

    /// The message carried by `Raised` and `Panicked`.
    pub fn message(&self) -> Option<&str> {
        match self {
            Self::Raised { message } | Self::Panicked { message } => Some(message),
            Self::Cancelled | Self::TimedOut { .. } => None,
        }
    }

    /// Returns `true` for [`EffectError::Cancelled`].
    pub const fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled)
    }
}

impl fmt::Display for EffectError {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Raised { message } => write!(formatter, "effect raised: {message}"),
            Self::Panicked { message } => write!(formatter, "effect panicked: {message}"),
            Self::Cancelled => write!(formatter, "effect cancelled"),
            Self::TimedOut { after } => write!(formatter, "effect timed out after {after:?}"),
        }
    }
}

impl std::error::Error for EffectError {}

/// Runs `body`, turning a panic into [`EffectError::Panicked`].
pub(crate) fn catch_panic<T, B>(body: B) -> Result<T, EffectError>
where
    B: FnOnce() -> Result<T, EffectError>,
{
    std::panic::catch_unwind(std::panic::AssertUnwindSafe(body))
        .unwrap_or_else(|payload| Err(EffectError::from_panic(payload.as_ref())))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(EffectError::raised("boom"), "effect raised: boom")]
    #[case(EffectError::Panicked { message: "oops".to_string() }, "effect panicked: oops")]
    #[case(EffectError::Cancelled, "effect cancelled")]
    #[case(EffectError::TimedOut { after: Duration::from_millis(5) }, "effect timed out after 5ms")]
    fn test_effect_error_display(#[case] error: EffectError, #[case] expected: &str) {
        assert_eq!(format!("{error}"), expected);
    }

    #[rstest]
    fn test_message_only_for_raised_and_panicked() {
        assert_eq!(EffectError::raised("a").message(), Some("a"));
        assert_eq!(EffectError::Cancelled.message(), None);
        assert!(EffectError::Cancelled.is_cancelled());
    }

    #[rstest]
    fn test_catch_panic_with_str_payload() {
        let result: Result<i32, EffectError> = catch_panic(|| panic!("static message"));
        assert_eq!(
            result,
            Err(EffectError::Panicked {
                message: "static message".to_string()
            })
        );
    }

    #[rstest]
    fn test_catch_panic_with_string_payload() {
        let code = 7;
        let result: Result<i32, EffectError> = catch_panic(|| panic!("code {code}"));
        assert_eq!(result.unwrap_err().message(), Some("code 7"));
    }

    #[rstest]
    fn test_catch_panic_passes_results_through() {
        assert_eq!(catch_panic(|| Ok::<_, EffectError>(3)), Ok(3));
    }

    #[rstest]
    fn test_effect_error_is_std_error() {
        let error: Box<dyn std::error::Error> = Box::new(EffectError::Cancelled);
        assert_eq!(error.to_string(), "effect cancelled");
    }
}
