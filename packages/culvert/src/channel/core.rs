// synchronized queue at the center of the channel. the exposed API is a thin wrapper around
// this. everything concurrency-correctness-sensitive lives in this module: the lock, the
// condvar, and the rule that the buffer is never observed or mutated except through the lock.

use super::buffer::InlineQueue;
use std::{
    mem::take,
    sync::{Arc, Condvar, Mutex},
};


// inline capacity of the message buffer. bursts up to this length never heap-allocate.
pub(crate) const INLINE: usize = 8;

// handle to a channel's shared queue. cloning is a reference count bump; the queue is freed
// when the last handle (sender, receiver, or drained-batch-in-flight) goes away.
pub(crate) struct Queue<T>(Arc<Shared<T>>);

// channel shared state.
struct Shared<T> {
    // buffered messages, oldest at the front.
    //
    // invariant: only ever touched while this mutex is held.
    elems: Mutex<InlineQueue<T, INLINE>>,
    // signalled once per push. a blocking pop sleeps on this while `elems` is empty; wait
    // releases the mutex while suspended and reacquires it before the predicate is re-tested,
    // so no push can slip between the emptiness check and the sleep.
    nonempty: Condvar,
}

impl<T> Queue<T> {
    // construct an empty queue with a handle count of 1.
    pub(crate) fn new() -> Self {
        Queue(Arc::new(Shared {
            elems: Mutex::new(InlineQueue::new()),
            nonempty: Condvar::new(),
        }))
    }

    // number of live handles to this queue, counting this one.
    pub(crate) fn handle_count(&self) -> usize {
        Arc::strong_count(&self.0)
    }

    // append an element to the back and wake one waiting pop, if any. never blocks beyond
    // lock contention: the queue is unbounded.
    pub(crate) fn push(&self, elem: T) {
        let mut lock = self.0.elems.lock().unwrap();
        lock.push_back(elem);
        self.0.nonempty.notify_one();
    }

    // remove and return the front element, blocking while the queue is empty.
    //
    // this is the only operation that can suspend the calling thread, and it has no timeout
    // and no cancellation path. if nothing is ever pushed again, it blocks forever.
    pub(crate) fn pop(&self) -> T {
        let mut lock = self.0.elems.lock().unwrap();
        loop {
            if let Some(elem) = lock.pop_front() {
                return elem;
            }
            trace!("recv blocking on empty channel");
            lock = self.0.nonempty.wait(lock).unwrap();
        }
    }

    // remove and return the front element, or None if the queue is empty. never blocks.
    pub(crate) fn try_pop(&self) -> Option<T> {
        self.0.elems.lock().unwrap().pop_front()
    }

    // detach the entire buffer in one motion, leaving the queue empty. never blocks.
    //
    // the returned batch is exactly the elements whose pushes acquired the lock before this
    // call did, in FIFO order; a concurrent push lands either wholly in the batch or wholly
    // in the now-empty queue, never lost and never duplicated.
    pub(crate) fn try_pop_all(&self) -> InlineQueue<T, INLINE> {
        take(&mut *self.0.elems.lock().unwrap())
    }
}

impl<T> Clone for Queue<T> {
    fn clone(&self) -> Self {
        Queue(Arc::clone(&self.0))
    }
}
