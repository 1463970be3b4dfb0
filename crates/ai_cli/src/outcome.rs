use crate::error::AppError;

/// Result of a command or chat loop: finished, cancelled by the user, or failed.
///
/// Cancellation is a normal ending and exits with status 0 like success.
#[must_use]
#[derive(Debug)]
pub enum Outcome<T> {
    Ok(T),
    Cancelled,
    Failed(AppError),
}

impl<T> Outcome<T> {
    pub fn failed(error: impl Into<AppError>) -> Self {
        Self::Failed(error.into())
    }

    /// Collapses a fallible step that may itself end in cancellation.
    pub fn flatten(result: Result<Outcome<T>, AppError>) -> Self {
        match result {
            Ok(outcome) => outcome,
            Err(error) => Self::Failed(error),
        }
    }

    pub fn is_ok(&self) -> bool {
        matches!(self, Self::Ok(_))
    }

    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled)
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, Self::Failed(_))
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Outcome<U> {
        match self {
            Self::Ok(value) => Outcome::Ok(f(value)),
            Self::Cancelled => Outcome::Cancelled,
            Self::Failed(error) => Outcome::Failed(error),
        }
    }

    pub fn exit_code(&self) -> u8 {
        match self {
            Self::Ok(_) | Self::Cancelled => 0,
            Self::Failed(_) => 1,
        }
    }
}

impl<T> From<Result<T, AppError>> for Outcome<T> {
    fn from(result: Result<T, AppError>) -> Self {
        match result {
            Ok(value) => Self::Ok(value),
            Err(error) => Self::Failed(error),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::Outcome;
    use crate::error::AppError;

    #[test]
    fn exit_codes_treat_cancel_as_success() {
        assert_eq!(Outcome::Ok(()).exit_code(), 0);
        assert_eq!(Outcome::<()>::Cancelled.exit_code(), 0);
        assert_eq!(
            Outcome::<()>::failed(AppError::invalid_argument("bad")).exit_code(),
            1
        );
    }

    #[test]
    fn flatten_keeps_inner_outcome_or_wraps_error() {
        assert!(Outcome::flatten(Ok(Outcome::<()>::Cancelled)).is_cancelled());
        assert!(Outcome::<()>::flatten(Err(AppError::invalid_argument("bad"))).is_failed());
        assert!(matches!(
            Outcome::flatten(Ok(Outcome::Ok(2))).map(|value| value * 2),
            Outcome::Ok(4)
        ));
    }
}
