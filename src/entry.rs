use std::fmt::{self, Debug};
use std::ops::{Deref, DerefMut};
use std::sync::Arc;

use crate::{Pool, Resource};

/// A resource checked out of a [`Pool`].
///
/// `Entry` holds the resource and a reference to the pool. When the
/// `Entry` is dropped, the resource is released back to the pool.
pub struct Entry<'a, R: Resource, E = std::io::Error> {
    // `resource` is always `Some` until the entry is consumed or dropped.
    pub(crate) resource: Option<R>,
    pub(crate) pool: &'a Pool<R, E>,
}

impl<'a, R: Resource + Debug, E> Debug for Entry<'a, R, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Entry").field(&self.resource).finish()
    }
}

impl<'a, R: Resource, E> Drop for Entry<'a, R, E> {
    fn drop(&mut self) {
        if let Some(resource) = self.resource.take() {
            self.pool.release(resource);
        }
    }
}

impl<'a, R: Resource, E> Deref for Entry<'a, R, E> {
    type Target = R;
    fn deref(&self) -> &Self::Target {
        self.get()
    }
}

impl<'a, R: Resource, E> DerefMut for Entry<'a, R, E> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        self.get_mut()
    }
}

impl<'a, R: Resource, E> Entry<'a, R, E> {
    /// Get reference to the inner resource.
    pub fn get(&self) -> &R {
        match &self.resource {
            Some(resource) => resource,
            None => unreachable!("entry resource taken before drop"),
        }
    }

    /// Get mutable reference to the inner resource.
    pub fn get_mut(&mut self) -> &mut R {
        match &mut self.resource {
            Some(resource) => resource,
            None => unreachable!("entry resource taken before drop"),
        }
    }

    /// Detach the resource. It will not be returned to the pool.
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
    /// let conn = pool.acquire_entry().unwrap().into_inner();
    /// assert_eq!(pool.idle(), 0);
    /// pool.release(conn);
    /// assert_eq!(pool.idle(), 1);
    /// ```
    pub fn into_inner(mut self) -> R {
        match self.resource.take() {
            Some(resource) => resource,
            None => unreachable!("entry resource taken before drop"),
        }
    }

    /// Close the resource instead of returning it to the pool.
    pub fn discard(mut self) {
        if let Some(resource) = self.resource.take() {
            self.pool.discard(resource);
        }
    }
}

/// An owned resource checked out of a [`Pool`].
///
/// `OwnedEntry` holds the resource and an `Arc` reference to the pool, so it
/// can be sent to another thread. When the `OwnedEntry` is dropped, the
/// resource is released back to the pool.
pub struct OwnedEntry<R: Resource, E = std::io::Error> {
    // `resource` is always `Some` until the entry is consumed or dropped.
    pub(crate) resource: Option<R>,
    pub(crate) pool: Arc<Pool<R, E>>,
}

impl<R: Resource + Debug, E> Debug for OwnedEntry<R, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("OwnedEntry").field(&self.resource).finish()
    }
}

impl<R: Resource, E> Drop for OwnedEntry<R, E> {
    fn drop(&mut self) {
        if let Some(resource) = self.resource.take() {
            self.pool.release(resource);
        }
    }
}

impl<R: Resource, E> Deref for OwnedEntry<R, E> {
    type Target = R;
    fn deref(&self) -> &Self::Target {
        self.get()
    }
}

impl<R: Resource, E> DerefMut for OwnedEntry<R, E> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        self.get_mut()
    }
}

impl<R: Resource, E> OwnedEntry<R, E> {
    /// Get reference to the inner resource.
    pub fn get(&self) -> &R {
        match &self.resource {
            Some(resource) => resource,
            None => unreachable!("entry resource taken before drop"),
        }
    }

    /// Get mutable reference to the inner resource.
    pub fn get_mut(&mut self) -> &mut R {
        match &mut self.resource {
            Some(resource) => resource,
            None => unreachable!("entry resource taken before drop"),
        }
    }

    /// Get the pool this entry came from.
    pub fn pool(&self) -> &Arc<Pool<R, E>> {
        &self.pool
    }

    /// Detach the resource. It will not be returned to the pool.
    pub fn into_inner(mut self) -> R {
        match self.resource.take() {
            Some(resource) => resource,
            None => unreachable!("entry resource taken before drop"),
        }
    }

    /// Close the resource instead of returning it to the pool.
    pub fn discard(mut self) {
        if let Some(resource) = self.resource.take() {
            self.pool.discard(resource);
        }
    }
}
