use std::io;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, mpsc};

use closer_pool::{Pool, Resource};

#[derive(Debug)]
struct Buffer {
    id: usize,
    data: Vec<u8>,
    closed: Arc<AtomicUsize>,
}

impl Resource for Buffer {
    type Error = io::Error;

    fn close(self) -> Result<(), Self::Error> {
        self.closed.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

fn buffer_pool(capacity: usize) -> (Arc<AtomicUsize>, Pool<Buffer>) {
    let closed = Arc::new(AtomicUsize::new(0));
    let built = AtomicUsize::new(0);
    let factory_closed = closed.clone();
    let pool = Pool::new(
        move || {
            Ok(Buffer {
                id: built.fetch_add(1, Ordering::SeqCst),
                data: Vec::new(),
                closed: factory_closed.clone(),
            })
        },
        capacity,
    )
    .unwrap();
    (closed, pool)
}

#[test]
fn entry_releases_on_drop() {
    let (_closed, pool) = buffer_pool(2);
    let mut entry = pool.acquire_entry().unwrap();
    entry.data.extend_from_slice(b"hello");
    assert_eq!(pool.idle(), 0);
    drop(entry);
    assert_eq!(pool.idle(), 1);

    // State set through the entry survives the round trip.
    let entry = pool.acquire_entry().unwrap();
    assert_eq!(entry.id, 0);
    assert_eq!(entry.get().data.as_slice(), b"hello");
}

#[test]
fn entry_into_inner_detaches() {
    let (closed, pool) = buffer_pool(2);
    let buffer = pool.acquire_entry().unwrap().into_inner();
    assert_eq!(pool.idle(), 0);
    assert_eq!(closed.load(Ordering::SeqCst), 0);
    pool.release(buffer);
    assert_eq!(pool.idle(), 1);
}

#[test]
fn entry_discard_closes() {
    let (closed, pool) = buffer_pool(2);
    let entry = pool.acquire_entry().unwrap();
    entry.discard();
    assert_eq!(pool.idle(), 0);
    assert_eq!(closed.load(Ordering::SeqCst), 1);
}

#[test]
fn entry_dropped_after_close_is_closed() {
    let (closed, pool) = buffer_pool(2);
    let entry = pool.acquire_entry().unwrap();
    pool.close();
    drop(entry);
    assert_eq!(pool.idle(), 0);
    assert_eq!(closed.load(Ordering::SeqCst), 1);
}

#[test]
fn owned_entry_across_threads() {
    let (closed, pool) = buffer_pool(4);
    let pool = Arc::new(pool);
    let (tx, rx) = mpsc::channel();

    let senders: Vec<_> = (0..4)
        .map(|i| {
            let pool = pool.clone();
            let tx = tx.clone();
            std::thread::spawn(move || {
                let mut entry = pool.acquire_owned().unwrap();
                entry.get_mut().data.push(i as u8);
                tx.send((i, entry)).unwrap();
            })
        })
        .collect();
    drop(tx);

    let receiver = std::thread::spawn(move || {
        let mut seen = 0;
        while let Ok((i, entry)) = rx.recv() {
            assert_eq!(entry.data, vec![i as u8]);
            seen += 1;
        }
        seen
    });

    for sender in senders {
        sender.join().unwrap();
    }
    assert_eq!(receiver.join().unwrap(), 4);
    assert!(Arc::ptr_eq(&pool, pool.acquire_owned().unwrap().pool()));
    assert_eq!(pool.idle(), 4);
    assert_eq!(closed.load(Ordering::SeqCst), 0);
}

#[test]
fn owned_entry_keeps_pool_alive() {
    let (closed, pool) = buffer_pool(1);
    let pool = Arc::new(pool);
    let entry = pool.acquire_owned().unwrap();
    drop(pool);

    // The entry still holds the pool; dropping it releases then drops the pool.
    drop(entry);
    assert_eq!(closed.load(Ordering::SeqCst), 1);
}
