use std::net::{Shutdown, TcpStream};

/// A handle the pool can close.
///
/// The pool never looks inside a resource. It only stores it, hands it out,
/// or calls [`close`](Resource::close) on it. `close` consumes the handle, so
/// the pool can close each handle at most once.
///
/// # Example
///
/// ```rust
/// use closer_pool::Resource;
///
/// struct Session(u32);
///
/// impl Resource for Session {
///     type Error = std::convert::Infallible;
///
///     fn close(self) -> Result<(), Self::Error> {
///         Ok(())
///     }
/// }
/// ```
pub trait Resource {
    /// Error returned when closing fails.
    type Error: std::error::Error;

    /// Release whatever the handle holds.
    fn close(self) -> Result<(), Self::Error>;
}

impl Resource for TcpStream {
    type Error = std::io::Error;

    fn close(self) -> Result<(), Self::Error> {
        self.shutdown(Shutdown::Both)
    }
}
