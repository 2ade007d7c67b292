use std::collections::VecDeque;

/// A capped FIFO of deferred transmit buffers.
///
/// Unlike a typical ring buffer, a full queue does not evict its oldest
/// element to make room: `push` rejects and hands the caller back the
/// buffer that didn't fit (§4.1's `Unresolved` outcome), so an entry never
/// silently loses traffic it already accepted.
#[derive(Debug, Clone)]
pub struct BoundedQueue<T> {
    inner: VecDeque<T>,
    cap: usize,
}

impl<T> BoundedQueue<T> {
    pub fn new(cap: usize) -> Self {
        Self {
            inner: VecDeque::new(),
            cap,
        }
    }

    pub fn cap(&self) -> usize {
        self.cap
    }

    pub fn set_cap(&mut self, cap: usize) {
        self.cap = cap;
    }

    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    /// Appends `item`, or returns it back to the caller if the queue is at
    /// capacity.
    pub fn push(&mut self, item: T) -> Result<(), T> {
        if self.inner.len() >= self.cap {
            return Err(item);
        }
        self.inner.push_back(item);
        Ok(())
    }

    /// Removes and returns every queued item, in FIFO order.
    pub fn drain(&mut self) -> Vec<T> {
        self.inner.drain(..).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn push_respects_cap() {
        let mut q = BoundedQueue::new(2);
        assert!(q.push(1).is_ok());
        assert!(q.push(2).is_ok());
        assert_eq!(q.push(3), Err(3));
        assert_eq!(q.len(), 2);
    }

    #[test]
    fn drain_preserves_order() {
        let mut q = BoundedQueue::new(4);
        q.push(1).unwrap();
        q.push(2).unwrap();
        q.push(3).unwrap();
        assert_eq!(q.drain(), vec![1, 2, 3]);
        assert!(q.is_empty());
    }

    #[test]
    fn zero_cap_rejects_everything() {
        let mut q: BoundedQueue<u8> = BoundedQueue::new(0);
        assert_eq!(q.push(1), Err(1));
    }
}
