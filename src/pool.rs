use std::fmt;
use std::sync::Arc;
use std::sync::atomic::AtomicBool;
use std::sync::atomic::Ordering::*;

use crossbeam_queue::ArrayQueue;
use parking_lot::Mutex;
use tracing::{debug, warn};

use crate::{Entry, Error, OwnedEntry, Resource, Result};

/// Shared resource constructor.
pub(crate) type Factory<R, E> = Arc<dyn Fn() -> std::result::Result<R, E> + Send + Sync>;

/// A bounded pool of closable resources.
///
/// The pool keeps at most [`capacity`](Pool::capacity) idle resources. It
/// does not limit how many resources are in use at once: when the idle
/// queue is empty, [`acquire`](Pool::acquire) always builds a new one.
///
/// [`acquire`](Pool::acquire) never takes the lifecycle lock, so it may hand
/// out a freshly built resource while [`close`](Pool::close) is running on
/// another thread. Releasing that resource later closes it.
///
/// # Examples
///
/// ```rust
/// use closer_pool::{Pool, Resource};
/// use std::sync::Arc;
///
/// struct Conn(usize);
///
/// impl Resource for Conn {
///     type Error = std::io::Error;
///     fn close(self) -> Result<(), Self::Error> {
///         Ok(())
///     }
/// }
///
/// let pool: Arc<Pool<Conn>> = Arc::new(Pool::new(|| Ok(Conn(7)), 4).unwrap());
///
/// let handles: Vec<_> = (0..4)
///     .map(|_| {
///         let pool = pool.clone();
///         std::thread::spawn(move || {
///             let conn = pool.acquire().unwrap();
///             assert_eq!(conn.0, 7);
///             pool.release(conn);
///         })
///     })
///     .collect();
///
/// for handle in handles {
///     handle.join().unwrap();
/// }
/// assert!(pool.idle() <= pool.capacity());
/// pool.close();
/// assert_eq!(pool.idle(), 0);
/// ```
pub struct Pool<R: Resource, E = std::io::Error> {
    /// Configuration of the pool.
    config: Config,
    /// Idle resources, bounded by `config.capacity`.
    idle: ArrayQueue<R>,
    /// Builds a resource on an idle miss.
    factory: Factory<R, E>,
    /// Lifecycle state. Release and close hold this lock.
    state: Mutex<State>,
    /// Mirror of `state == Closed` readable without the lock.
    closed: AtomicBool,
}

impl<R: Resource, E> fmt::Debug for Pool<R, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Pool")
            .field("config", &self.config)
            .field("idle", &self.idle.len())
            .field("closed", &self.closed.load(Relaxed))
            .finish_non_exhaustive()
    }
}

impl<R: Resource, E> Drop for Pool<R, E> {
    fn drop(&mut self) {
        self.close();
    }
}

impl<R: Resource, E> Pool<R, E> {
    /// Create a new open pool keeping at most `capacity` idle resources.
    ///
    /// Fails with [`Error::InvalidConfiguration`] if `capacity` is zero.
    ///
    /// # Example
    ///
    /// ```rust
    /// # use closer_pool::{Error, Pool, Resource};
    /// # struct Conn;
    /// # impl Resource for Conn {
    /// #     type Error = std::io::Error;
    /// #     fn close(self) -> Result<(), Self::Error> { Ok(()) }
    /// # }
    /// let pool: Pool<Conn> = Pool::new(|| Ok(Conn), 10).unwrap();
    /// assert_eq!(pool.capacity(), 10);
    /// assert_eq!(pool.idle(), 0);
    ///
    /// let err = Pool::new(|| Ok::<_, std::io::Error>(Conn), 0).unwrap_err();
    /// assert!(matches!(err, Error::InvalidConfiguration(_)));
    /// ```
    pub fn new<F>(factory: F, capacity: usize) -> Result<Self, E>
    where
        F: Fn() -> std::result::Result<R, E> + Send + Sync + 'static,
    {
        Self::with_config(
            factory,
            Config {
                capacity,
                ..Default::default()
            },
        )
    }

    /// Create a new pool with the given configuration.
    ///
    /// `config.prealloc` resources are built up front and placed in the
    /// idle queue. If the factory fails while doing so, the resources built
    /// so far are closed and the factory error is returned.
    ///
    /// # Example
    ///
    /// ```rust
    /// # use closer_pool::{Config, Pool, Resource};
    /// # struct Conn;
    /// # impl Resource for Conn {
    /// #     type Error = std::io::Error;
    /// #     fn close(self) -> Result<(), Self::Error> { Ok(()) }
    /// # }
    /// let config = Config { capacity: 4, prealloc: 2 };
    /// let pool: Pool<Conn> = Pool::with_config(|| Ok(Conn), config).unwrap();
    /// assert_eq!(pool.idle(), 2);
    /// ```
    pub fn with_config<F>(factory: F, config: Config) -> Result<Self, E>
    where
        F: Fn() -> std::result::Result<R, E> + Send + Sync + 'static,
    {
        Self::from_factory(Arc::new(factory), config)
    }

    pub(crate) fn from_factory(factory: Factory<R, E>, config: Config) -> Result<Self, E> {
        config.validate::<E>()?;

        let pool = Self {
            idle: ArrayQueue::new(config.capacity),
            factory,
            state: Mutex::new(State::Open),
            closed: AtomicBool::new(false),
            config,
        };
        for built in 0..pool.config.prealloc {
            match (pool.factory)() {
                Ok(resource) => {
                    if let Err(resource) = pool.idle.push(resource) {
                        close_resource(resource, "preallocation overflow");
                    }
                }
                Err(err) => {
                    warn!(built, prealloc = pool.config.prealloc, "factory failed during preallocation");
                    pool.close();
                    return Err(Error::Factory(err));
                }
            }
        }
        Ok(pool)
    }

    /// Get the capacity of the pool.
    pub fn capacity(&self) -> usize {
        self.config.capacity
    }

    /// Get the configuration the pool was built with.
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Get the number of idle resources.
    ///
    /// # Example
    ///
    /// ```rust
    /// # use closer_pool::{Pool, Resource};
    /// # struct Conn;
    /// # impl Resource for Conn {
    /// #     type Error = std::io::Error;
    /// #     fn close(self) -> Result<(), Self::Error> { Ok(()) }
    /// # }
    /// let pool: Pool<Conn> = Pool::new(|| Ok(Conn), 2).unwrap();
    /// let conn = pool.acquire().unwrap();
    /// assert_eq!(pool.idle(), 0);
    /// pool.release(conn);
    /// assert_eq!(pool.idle(), 1);
    /// ```
    pub fn idle(&self) -> usize {
        self.idle.len()
    }

    /// Check if the pool has been closed.
    pub fn is_closed(&self) -> bool {
        self.closed.load(Acquire)
    }

    /// Get the lifecycle state.
    pub fn state(&self) -> State {
        *self.state.lock()
    }

    /// Take a snapshot of the pool.
    pub fn status(&self) -> Status {
        Status {
            capacity: self.config.capacity,
            idle: self.idle.len(),
            state: self.state(),
        }
    }

    /// Acquire a resource without blocking.
    ///
    /// An idle resource is returned if there is one. Otherwise the factory
    /// is called and its result returned as is. Once the pool is closed and
    /// drained, this returns [`Error::PoolClosed`].
    ///
    /// # Example
    ///
    /// ```rust
    /// # use closer_pool::{Pool, Resource};
    /// # #[derive(Debug)]
    /// # struct Conn;
    /// # impl Resource for Conn {
    /// #     type Error = std::io::Error;
    /// #     fn close(self) -> Result<(), Self::Error> { Ok(()) }
    /// # }
    /// let pool: Pool<Conn> = Pool::new(|| Ok(Conn), 1).unwrap();
    /// let conn = pool.acquire().unwrap();
    /// pool.release(conn);
    /// pool.close();
    /// assert!(pool.acquire().unwrap_err().is_closed());
    /// ```
    pub fn acquire(&self) -> Result<R, E> {
        if let Some(resource) = self.idle.pop() {
            debug!(idle = self.idle.len(), "acquired idle resource");
            return Ok(resource);
        }
        if self.closed.load(Acquire) {
            return Err(Error::PoolClosed);
        }
        debug!("idle queue empty, building resource");
        (self.factory)().map_err(Error::Factory)
    }

    /// Acquire a resource wrapped in an [`Entry`] that releases it on drop.
    ///
    /// # Example
    ///
    /// ```rust
    /// # use closer_pool::{Pool, Resource};
    /// # struct Conn;
    /// # impl Resource for Conn {
    /// #     type Error = std::io::Error;
    /// #     fn close(self) -> Result<(), Self::Error> { Ok(()) }
    /// # }
    /// let pool: Pool<Conn> = Pool::new(|| Ok(Conn), 1).unwrap();
    /// {
    ///     let _conn = pool.acquire_entry().unwrap();
    ///     assert_eq!(pool.idle(), 0);
    /// }
    /// assert_eq!(pool.idle(), 1);
    /// ```
    pub fn acquire_entry(&self) -> Result<Entry<'_, R, E>, E> {
        self.acquire().map(|resource| Entry {
            resource: Some(resource),
            pool: self,
        })
    }

    /// Acquire a resource wrapped in an [`OwnedEntry`] holding an `Arc` to
    /// the pool.
    pub fn acquire_owned(self: &Arc<Self>) -> Result<OwnedEntry<R, E>, E> {
        self.acquire().map(|resource| OwnedEntry {
            resource: Some(resource),
            pool: self.clone(),
        })
    }

    /// Return a resource to the pool.
    ///
    /// The resource goes back to the idle queue if the pool is open and the
    /// queue has room. Otherwise it is closed. Close errors are logged.
    ///
    /// # Example
    ///
    /// ```rust
    /// # use closer_pool::{Pool, Resource};
    /// # struct Conn;
    /// # impl Resource for Conn {
    /// #     type Error = std::io::Error;
    /// #     fn close(self) -> Result<(), Self::Error> { Ok(()) }
    /// # }
    /// let pool: Pool<Conn> = Pool::new(|| Ok(Conn), 1).unwrap();
    /// let first = pool.acquire().unwrap();
    /// let second = pool.acquire().unwrap();
    /// pool.release(first);
    /// // The idle queue is full, so this one is closed.
    /// pool.release(second);
    /// assert_eq!(pool.idle(), 1);
    /// ```
    pub fn release(&self, resource: R) {
        let state = self.state.lock();
        if *state == State::Closed {
            drop(state);
            debug!("pool closed, closing released resource");
            close_resource(resource, "released after close");
            return;
        }
        match self.idle.push(resource) {
            Ok(()) => debug!(idle = self.idle.len(), "released resource to idle queue"),
            Err(resource) => {
                drop(state);
                debug!(capacity = self.config.capacity, "idle queue full, closing released resource");
                close_resource(resource, "idle queue full");
            }
        }
    }

    /// Close a resource instead of returning it to the pool.
    pub fn discard(&self, resource: R) {
        debug!("discarding resource");
        close_resource(resource, "discarded");
    }

    /// Close the pool and every idle resource.
    ///
    /// Calling this more than once has no further effect. Resources that are
    /// checked out are not touched; they are closed when released.
    ///
    /// The idle queue is emptied before any resource is closed. If a
    /// resource's `close` panics, the rest are still closed while unwinding.
    pub fn close(&self) {
        let mut state = self.state.lock();
        if *state == State::Closed {
            return;
        }
        *state = State::Closed;
        self.closed.store(true, Release);

        let drained: Vec<R> = std::iter::from_fn(|| self.idle.pop()).collect();
        debug!(drained = drained.len(), "pool closed");
        let mut remaining = CloseRemaining(drained.into_iter());
        while let Some(resource) = remaining.0.next() {
            close_resource(resource, "pool closed");
        }
    }
}

/// Closes whatever is left of a drain if a resource's `close` panics.
struct CloseRemaining<R: Resource>(std::vec::IntoIter<R>);

impl<R: Resource> Drop for CloseRemaining<R> {
    fn drop(&mut self) {
        for resource in self.0.by_ref() {
            close_resource(resource, "pool closed");
        }
    }
}

/// Close `resource`, logging a failure.
fn close_resource<R: Resource>(resource: R, reason: &'static str) {
    if let Err(err) = resource.close() {
        warn!(error = %err, reason, "failed to close resource");
    }
}

/// Lifecycle state of a [`Pool`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum State {
    /// Accepting acquires and releases.
    Open,
    /// Shut down. Terminal.
    Closed,
}

/// A point-in-time view of a [`Pool`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Status {
    /// Maximum number of idle resources.
    pub capacity: usize,
    /// Idle resources at the time of the snapshot.
    pub idle: usize,
    /// Lifecycle state.
    pub state: State,
}

/// Configuration for the pool.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct Config {
    /// Maximum number of idle resources kept by the pool.
    pub capacity: usize,
    /// Number of resources to build when the pool is created.
    pub prealloc: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            capacity: 16,
            prealloc: 0,
        }
    }
}

impl Config {
    pub(crate) fn validate<E>(&self) -> Result<(), E> {
        if self.capacity == 0 {
            return Err(Error::InvalidConfiguration(
                "capacity must be greater than zero".to_string(),
            ));
        }
        if self.prealloc > self.capacity {
            return Err(Error::InvalidConfiguration(format!(
                "prealloc ({}) must be less than or equal to capacity ({})",
                self.prealloc, self.capacity
            )));
        }
        Ok(())
    }
}
