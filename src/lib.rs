//! A bounded pool of closable resources.
//!
//! # Features
//!
//! - Bounded idle storage: at most `capacity` released resources are kept.
//! - Non-blocking: `acquire` takes an idle resource or builds a new one, it
//! never waits.
//! - Thread-safe: Multiple threads can acquire and release concurrently.
//! - Orderly shutdown: `close` closes every idle resource exactly once, and
//! resources released after it are closed instead of stored.
//!
//! The pool bounds idle resources, not resources in use. Under load it may
//! hand out more than `capacity` resources at once; the surplus is closed as
//! it comes back.
//!
//! # Examples
//!
//! ## Acquire and release
//!
//! ```rust
//! use closer_pool::{Pool, Resource};
//!
//! #[derive(Debug, PartialEq)]
//! struct Conn(u32);
//!
//! impl Resource for Conn {
//!     type Error = std::io::Error;
//!     fn close(self) -> Result<(), Self::Error> {
//!         Ok(())
//!     }
//! }
//!
//! let pool: Pool<Conn> = Pool::new(|| Ok(Conn(1)), 1).unwrap();
//! let conn = pool.acquire().unwrap();
//! pool.release(conn);
//! assert_eq!(pool.idle(), 1);
//!
//! pool.close();
//! assert_eq!(pool.idle(), 0);
//! assert!(pool.acquire().unwrap_err().is_closed());
//! ```
//!
//! ## Multiple threads sharing a pool
//!
//! ```rust
//! use closer_pool::{Pool, Resource};
//! use std::sync::atomic::{AtomicU32, Ordering};
//! use std::sync::{Arc, mpsc};
//!
//! struct Conn(u32);
//!
//! impl Resource for Conn {
//!     type Error = std::io::Error;
//!     fn close(self) -> Result<(), Self::Error> {
//!         Ok(())
//!     }
//! }
//!
//! let next = AtomicU32::new(0);
//! let pool: Arc<Pool<Conn>> = Arc::new(
//!     Pool::new(move || Ok(Conn(next.fetch_add(1, Ordering::Relaxed))), 2).unwrap(),
//! );
//!
//! let (tx, rx) = mpsc::channel();
//! let senders: Vec<_> = (0..2)
//!     .map(|_| {
//!         let pool = pool.clone();
//!         let tx = tx.clone();
//!         std::thread::spawn(move || {
//!             let conn = pool.acquire_owned().unwrap();
//!             tx.send(conn).unwrap();
//!         })
//!     })
//!     .collect();
//! drop(tx);
//!
//! for sender in senders {
//!     sender.join().unwrap();
//! }
//! let mut ids: Vec<u32> = rx.iter().map(|conn| conn.0).collect();
//! ids.sort();
//! assert_eq!(ids, vec![0, 1]);
//! assert_eq!(pool.idle(), 2);
//! ```

mod builder;
mod entry;
mod error;
mod pool;
mod resource;

pub use builder::Builder;
pub use entry::{Entry, OwnedEntry};
pub use error::{Error, Result};
pub use pool::{Config, Pool, State, Status};
pub use resource::Resource;
