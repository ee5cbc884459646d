use std::sync::Arc;

use crate::pool::Factory;
use crate::{Config, Pool, Resource, Result};

/// A builder for creating a [`Pool`] with custom configuration.
///
/// The builder keeps its factory, so it can build several pools that share
/// the same way of making resources.
///
/// # Example
///
/// ```rust
/// use closer_pool::{Builder, Pool, Resource};
///
/// struct Conn;
///
/// impl Resource for Conn {
///     type Error = std::io::Error;
///     fn close(self) -> Result<(), Self::Error> {
///         Ok(())
///     }
/// }
///
/// let mut builder = Builder::new(|| Ok(Conn));
/// let pool: Pool<Conn> = builder.capacity(10).prealloc(5).build().unwrap();
/// assert_eq!(pool.capacity(), 10);
/// assert_eq!(pool.idle(), 5);
/// ```
pub struct Builder<R: Resource, E = std::io::Error> {
    /// Configuration of the pool.
    config: Config,
    factory: Factory<R, E>,
}

impl<R: Resource, E> Builder<R, E> {
    /// Create a new builder with default configuration.
    pub fn new<F>(factory: F) -> Self
    where
        F: Fn() -> std::result::Result<R, E> + Send + Sync + 'static,
    {
        Self {
            config: Config::default(),
            factory: Arc::new(factory),
        }
    }

    /// Set the number of resources built when the pool is created.
    pub fn prealloc(&mut self, prealloc: usize) -> &mut Self {
        self.config.prealloc = prealloc;
        self
    }

    /// Set the maximum number of idle resources.
    pub fn capacity(&mut self, capacity: usize) -> &mut Self {
        self.config.capacity = capacity;
        self
    }

    /// Replace the whole configuration.
    pub fn config(&mut self, config: Config) -> &mut Self {
        self.config = config;
        self
    }

    /// Build the pool with the current configuration.
    pub fn build(&mut self) -> Result<Pool<R, E>, E> {
        Pool::from_factory(self.factory.clone(), self.config)
    }
}
