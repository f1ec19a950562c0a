use std::fmt;

/// State of an asynchronous computation as seen by a synchronous reader.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AsyncOutcome<T, E> {
    Pending,
    Loaded(T),
    Failed(E),
}

impl<T, E> Default for AsyncOutcome<T, E> {
    fn default() -> Self {
        AsyncOutcome::Pending
    }
}

impl<T, E> AsyncOutcome<T, E> {
    pub fn is_pending(&self) -> bool {
        matches!(self, AsyncOutcome::Pending)
    }

    pub fn is_loaded(&self) -> bool {
        matches!(self, AsyncOutcome::Loaded(_))
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, AsyncOutcome::Failed(_))
    }

    /// The loaded value, if any
    pub fn loaded(&self) -> Option<&T> {
        match self {
            AsyncOutcome::Loaded(value) => Some(value),
            _ => None,
        }
    }

    /// The failure, if any
    pub fn error(&self) -> Option<&E> {
        match self {
            AsyncOutcome::Failed(error) => Some(error),
            _ => None,
        }
    }

    pub fn as_ref(&self) -> AsyncOutcome<&T, &E> {
        match self {
            AsyncOutcome::Pending => AsyncOutcome::Pending,
            AsyncOutcome::Loaded(value) => AsyncOutcome::Loaded(value),
            AsyncOutcome::Failed(error) => AsyncOutcome::Failed(error),
        }
    }

    pub fn map<U, F>(self, f: F) -> AsyncOutcome<U, E>
    where
        F: FnOnce(T) -> U,
    {
        match self {
            AsyncOutcome::Pending => AsyncOutcome::Pending,
            AsyncOutcome::Loaded(value) => AsyncOutcome::Loaded(f(value)),
            AsyncOutcome::Failed(error) => AsyncOutcome::Failed(error),
        }
    }

    /// Short lowercase name of the active variant, used in logs
    pub fn label(&self) -> &'static str {
        match self {
            AsyncOutcome::Pending => "pending",
            AsyncOutcome::Loaded(_) => "loaded",
            AsyncOutcome::Failed(_) => "error",
        }
    }
}

impl<T, E> From<Result<T, E>> for AsyncOutcome<T, E> {
    fn from(result: Result<T, E>) -> Self {
        match result {
            Ok(value) => AsyncOutcome::Loaded(value),
            Err(error) => AsyncOutcome::Failed(error),
        }
    }
}

impl<T, E> fmt::Display for AsyncOutcome<T, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}
