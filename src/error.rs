use thiserror::Error;

/// Result type for pool operations.
pub type Result<T, E = std::io::Error> = std::result::Result<T, Error<E>>;

/// Errors returned by [`Pool`](crate::Pool) construction and acquisition.
///
/// `E` is the error type of the resource factory.
#[derive(Error, Debug)]
pub enum Error<E = std::io::Error> {
    /// Construction parameters are invalid.
    #[error("invalid pool configuration: {0}")]
    InvalidConfiguration(String),

    /// The pool is closed and holds no idle resources.
    #[error("pool has been closed")]
    PoolClosed,

    /// The resource factory failed.
    #[error(transparent)]
    Factory(E),
}

impl<E> Error<E> {
    /// Whether this is [`Error::PoolClosed`].
    pub fn is_closed(&self) -> bool {
        matches!(self, Error::PoolClosed)
    }

    /// Take the factory error, if this is one.
    pub fn into_factory(self) -> Option<E> {
        match self {
            Error::Factory(e) => Some(e),
            _ => None,
        }
    }
}
