use std::sync::Arc;

use crate::woo::WooError;

/// Outcome of one store request as seen by a screen.
///
/// Queries pass through `Loading` before settling; mutations settle
/// directly. The error keeps the exact cause the data source raised and is
/// shared so that states can be cloned into every observer.
#[derive(Debug)]
pub enum LoadState<T> {
    Loading,
    Success(T),
    Error(Arc<WooError>),
}

impl<T> LoadState<T> {
    #[must_use]
    pub const fn is_loading(&self) -> bool {
        matches!(self, Self::Loading)
    }

    /// `Success` or `Error`.
    #[must_use]
    pub const fn is_terminal(&self) -> bool {
        !self.is_loading()
    }

    #[must_use]
    pub const fn success(&self) -> Option<&T> {
        match self {
            Self::Success(value) => Some(value),
            _ => None,
        }
    }

    #[must_use]
    pub fn error(&self) -> Option<&WooError> {
        match self {
            Self::Error(error) => Some(error),
            _ => None,
        }
    }

    #[must_use]
    pub fn into_success(self) -> Option<T> {
        match self {
            Self::Success(value) => Some(value),
            _ => None,
        }
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> LoadState<U> {
        match self {
            Self::Loading => LoadState::Loading,
            Self::Success(value) => LoadState::Success(f(value)),
            Self::Error(error) => LoadState::Error(error),
        }
    }
}

impl<T: Clone> Clone for LoadState<T> {
    fn clone(&self) -> Self {
        match self {
            Self::Loading => Self::Loading,
            Self::Success(value) => Self::Success(value.clone()),
            Self::Error(error) => Self::Error(Arc::clone(error)),
        }
    }
}

impl<T> From<Result<T, WooError>> for LoadState<T> {
    fn from(result: Result<T, WooError>) -> Self {
        match result {
            Ok(value) => Self::Success(value),
            Err(error) => Self::Error(Arc::new(error)),
        }
    }
}
