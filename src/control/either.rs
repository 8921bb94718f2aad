//! Either type - a value that is one of two alternatives.
//!
//! The engine uses `Either` in two roles:
//!
//! - as the loop signal of [`Monad::tail_rec_m`](crate::typeclass::Monad::tail_rec_m):
//!   `Left(next_state)` keeps iterating, `Right(result)` stops;
//! - as the error layer of [`EitherT`](crate::effect::EitherT) and the result of
//!   `attempt`: `Left(error)` or `Right(value)`.
//!
//! # Examples
//!
//! ```rust
//! use purefx::control::Either;
//!
//! let parsed: Either<String, i32> = "42".parse::<i32>().map_err(|e| e.to_string()).into();
//! let described = parsed.fold(|error| format!("bad: {error}"), |n| format!("ok: {n}"));
//! assert_eq!(described, "ok: 42");
//! ```

/// A value that is either `Left(L)` or `Right(R)`.
///
/// `Right` is the "success" or "finished" side; combinators that act on one
/// side only (`map`, `flat_map`) act on `Right`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Either<L, R> {
    /// The left alternative: an error, or a state that needs more work.
    Left(L),
    /// The right alternative: a value, or a finished result.
    Right(R),
}

impl<L, R> Either<L, R> {
    /// Returns `true` if this is a `Left`.
    #[inline]
    pub const fn is_left(&self) -> bool {
        matches!(self, Self::Left(_))
    }

    /// Returns `true` if this is a `Right`.
    #[inline]
    pub const fn is_right(&self) -> bool {
        matches!(self, Self::Right(_))
    }

    /// Returns the left value, if any.
    #[inline]
    pub fn left(self) -> Option<L> {
        match self {
            Self::Left(value) => Some(value),
            Self::Right(_) => None,
        }
    }

    /// Returns the right value, if any.
    #[inline]
    pub fn right(self) -> Option<R> {
        match self {
            Self::Left(_) => None,
            Self::Right(value) => Some(value),
        }
    }

    /// Transforms the right value.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use purefx::control::Either;
    ///
    /// let value: Either<String, i32> = Either::Right(4);
    /// assert_eq!(value.map(|n| n * 2), Either::Right(8));
    /// ```
    #[inline]
    pub fn map<T, F>(self, function: F) -> Either<L, T>
    where
        F: FnOnce(R) -> T,
    {
        match self {
            Self::Left(value) => Either::Left(value),
            Self::Right(value) => Either::Right(function(value)),
        }
    }

    /// Transforms the left value.
    #[inline]
    pub fn map_left<T, F>(self, function: F) -> Either<T, R>
    where
        F: FnOnce(L) -> T,
    {
        match self {
            Self::Left(value) => Either::Left(function(value)),
            Self::Right(value) => Either::Right(value),
        }
    }

    /// Transforms whichever side is present.
    #[inline]
    pub fn bimap<T, U, F, G>(self, left_function: F, right_function: G) -> Either<T, U>
    where
        F: FnOnce(L) -> T,
        G: FnOnce(R) -> U,
    {
        match self {
            Self::Left(value) => Either::Left(left_function(value)),
            Self::Right(value) => Either::Right(right_function(value)),
        }
    }

    /// Chains a computation on the right value.
    #[inline]
    pub fn flat_map<T, F>(self, function: F) -> Either<L, T>
    where
        F: FnOnce(R) -> Either<L, T>,
    {
        match self {
            Self::Left(value) => Either::Left(value),
            Self::Right(value) => function(value),
        }
    }

    /// Collapses both sides into one value.
    #[inline]
    pub fn fold<T, F, G>(self, left_function: F, right_function: G) -> T
    where
        F: FnOnce(L) -> T,
        G: FnOnce(R) -> T,
    {
        match self {
            Self::Left(value) => left_function(value),
            Self::Right(value) => right_function(value),
        }
    }

    /// Exchanges the two sides.
    #[inline]
    pub fn swap(self) -> Either<R, L> {
        match self {
            Self::Left(value) => Either::Right(value),
            Self::Right(value) => Either::Left(value),
        }
    }

    /// Returns the right value, or computes one from the left value.
    #[inline]
    pub fn right_or_else<F>(self, function: F) -> R
    where
        F: FnOnce(L) -> R,
    {
        match self {
            Self::Left(value) => function(value),
            Self::Right(value) => value,
        }
    }

    /// Converts into a `Result`, `Right` becoming `Ok`.
    #[inline]
    pub fn into_result(self) -> Result<R, L> {
        self.into()
    }
}

impl<L, R> From<Result<R, L>> for Either<L, R> {
    /// `Ok(r)` becomes `Right(r)`, `Err(e)` becomes `Left(e)`.
    #[inline]
    fn from(result: Result<R, L>) -> Self {
        match result {
            Ok(value) => Self::Right(value),
            Err(error) => Self::Left(error),
        }
    }
}

impl<L, R> From<Either<L, R>> for Result<R, L> {
    /// `Right(r)` becomes `Ok(r)`, `Left(l)` becomes `Err(l)`.
    #[inline]
    fn from(either: Either<L, R>) -> Self {
        match either {
            Either::Left(value) => Err(value),
            Either::Right(value) => Ok(value),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    fn sides_are_reported() {
        let left: Either<i32, &str> = Either::Left(1);
        let right: Either<i32, &str> = Either::Right("r");
        assert!(left.is_left() && !left.is_right());
        assert!(right.is_right() && !right.is_left());
        assert_eq!(left.left(), Some(1));
        assert_eq!(right.right(), Some("r"));
    }

    #[rstest]
    #[case(Either::Right(3), Either::Right(6))]
    #[case(Either::Left("e"), Either::Left("e"))]
    fn map_only_touches_right(
        #[case] input: Either<&'static str, i32>,
        #[case] expected: Either<&'static str, i32>,
    ) {
        assert_eq!(input.map(|n| n * 2), expected);
    }

    #[rstest]
    fn flat_map_short_circuits_on_left() {
        let start: Either<String, i32> = Either::Left("stop".to_string());
        let result = start.flat_map(|n| Either::Right(n + 1));
        assert_eq!(result, Either::Left("stop".to_string()));
    }

    #[rstest]
    fn swap_and_bimap() {
        let value: Either<i32, String> = Either::Left(5);
        assert_eq!(value.clone().swap(), Either::Right(5));
        assert_eq!(value.bimap(|n| n + 1, |s| s.len()), Either::Left(6));
    }

    #[rstest]
    fn result_conversion_roundtrip() {
        let either: Either<String, i32> = Ok::<i32, String>(42).into();
        assert_eq!(either.into_result(), Ok(42));

        let either: Either<String, i32> = Err::<i32, String>("boom".to_string()).into();
        assert_eq!(either.right_or_else(|e| e.len() as i32), 4);
    }
}
