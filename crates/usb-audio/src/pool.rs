//! Fixed-capacity stream buffer pool.
//!
//! All streaming I/O in the audio subsystem goes through buffers leased from
//! one pool with a single configured buffer size. Allocation is always
//! non-blocking: the receive path runs from interrupt context and drops the
//! frame when the pool is empty rather than waiting. A [`StreamBuffer`] is
//! exclusively owned by whichever stage currently holds it and returns its
//! storage to the pool when dropped, so there is exactly one releaser per
//! buffer per pass.

use std::cell::RefCell;
use std::fmt;
use std::ops::{Deref, DerefMut};
use std::rc::Rc;

struct PoolInner {
    free: Vec<Box<[u8]>>,
    buffer_capacity: usize,
}

/// Cheaply cloneable handle to a pool of fixed-size buffers.
#[derive(Clone)]
pub struct BufferPool {
    inner: Rc<RefCell<PoolInner>>,
}

impl BufferPool {
    pub fn new(buffer_count: usize, buffer_capacity: usize) -> Self {
        let free = (0..buffer_count)
            .map(|_| vec![0u8; buffer_capacity].into_boxed_slice())
            .collect();
        Self {
            inner: Rc::new(RefCell::new(PoolInner {
                free,
                buffer_capacity,
            })),
        }
    }

    /// Leases a buffer. Never blocks; `None` when the pool is exhausted.
    pub fn alloc(&self) -> Option<StreamBuffer> {
        let storage = self.inner.borrow_mut().free.pop()?;
        Some(StreamBuffer {
            storage: Some(storage),
            pool: Rc::clone(&self.inner),
        })
    }

    /// Size of every buffer in the pool.
    pub fn buffer_capacity(&self) -> usize {
        self.inner.borrow().buffer_capacity
    }

    /// Buffers currently available for lease.
    pub fn available(&self) -> usize {
        self.inner.borrow().free.len()
    }
}

/// A fixed-capacity byte buffer leased from a [`BufferPool`].
pub struct StreamBuffer {
    storage: Option<Box<[u8]>>,
    pool: Rc<RefCell<PoolInner>>,
}

impl StreamBuffer {
    pub fn capacity(&self) -> usize {
        self.as_slice().len()
    }

    fn as_slice(&self) -> &[u8] {
        self.storage.as_deref().unwrap_or(&[])
    }
}

// Contents are in-flight audio samples; only the shape is worth printing.
impl fmt::Debug for StreamBuffer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StreamBuffer")
            .field("capacity", &self.capacity())
            .finish()
    }
}

impl Deref for StreamBuffer {
    type Target = [u8];

    fn deref(&self) -> &[u8] {
        self.as_slice()
    }
}

impl DerefMut for StreamBuffer {
    fn deref_mut(&mut self) -> &mut [u8] {
        self.storage.as_deref_mut().unwrap_or(&mut [])
    }
}

impl Drop for StreamBuffer {
    fn drop(&mut self) {
        if let Some(storage) = self.storage.take() {
            self.pool.borrow_mut().free.push(storage);
        }
    }
}
