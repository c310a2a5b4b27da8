// exposed API of channels

use super::{
    buffer::InlineQueue,
    core::{self, INLINE},
};
use std::fmt::{self, Formatter, Debug};


/// Create a channel
///
/// Returns a linked pair of handles over one shared queue: a cloneable [`Sender`] and the
/// channel's single [`Receiver`]. The queue lives as long as at least one handle does.
pub fn channel<T>() -> (Sender<T>, Receiver<T>) {
    let queue = core::Queue::new();
    trace!("channel created");
    (Sender { queue: queue.clone() }, Receiver { queue })
}

/// Sending half of a channel
///
/// Cloning a `Sender` is the only way to obtain additional producers, and is cheap: all clones
/// share the same underlying queue, and the clone itself is a reference count bump.
pub struct Sender<T> {
    queue: core::Queue<T>,
}

impl<T> Sender<T> {
    /// Send a message down the channel
    ///
    /// Takes ownership of `msg`: once sent, the value belongs to whoever receives it. The
    /// channel is unbounded, so this never blocks (beyond lock contention) and cannot fail.
    /// Sends from different senders are serialized by the queue's lock, and messages are
    /// delivered in the order their sends acquired it.
    pub fn send(&self, msg: T) {
        self.queue.push(msg);
    }
}

impl<T> Clone for Sender<T> {
    fn clone(&self) -> Self {
        Sender { queue: self.queue.clone() }
    }
}

impl<T> Debug for Sender<T> {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        f.debug_struct("Sender").finish_non_exhaustive()
    }
}

/// Receiving half of a channel
///
/// Exactly one `Receiver` exists per channel. It deliberately does not implement `Clone`: the
/// single-consumer guarantee is structural, not a convention. It can still be moved to whatever
/// thread should consume the channel.
pub struct Receiver<T> {
    queue: core::Queue<T>,
}

impl<T> Receiver<T> {
    /// Receive the next message, blocking until one is available
    ///
    /// This is the only blocking operation on the channel, and it has no timeout and no
    /// cancellation path. In particular, dropping every `Sender` produces no wake-up: a `recv`
    /// on a channel whose senders are all gone blocks forever. Guarding against that is the
    /// application protocol's job (for example with an explicit shutdown message).
    pub fn recv(&self) -> T {
        self.queue.pop()
    }

    /// Receive the next message if one is already buffered, without blocking
    ///
    /// Returns `None` if the channel is currently empty. An empty channel and a channel whose
    /// senders have all been dropped are indistinguishable here.
    pub fn try_recv(&self) -> Option<T> {
        self.queue.try_pop()
    }

    /// Detach everything currently buffered as one ordered batch, without blocking
    ///
    /// The channel is left empty in the same atomic motion, so a message pushed concurrently
    /// ends up either in the returned batch or in the channel, never lost and never in both.
    /// Returns an empty batch if the channel was empty.
    pub fn try_recv_all(&self) -> Batch<T> {
        Batch(self.queue.try_pop_all())
    }
}

impl<T> Debug for Receiver<T> {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        f.debug_struct("Receiver").finish_non_exhaustive()
    }
}

/// Ordered batch of messages drained from a channel by [`Receiver::try_recv_all`]
///
/// Iterating yields the messages in the order they were sent.
pub struct Batch<T>(InlineQueue<T, INLINE>);

impl<T> Batch<T> {
    /// Number of messages remaining in the batch
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether the batch has no messages remaining
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<T> Iterator for Batch<T> {
    type Item = T;

    fn next(&mut self) -> Option<T> {
        self.0.pop_front()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.len(), Some(self.len()))
    }
}

impl<T> ExactSizeIterator for Batch<T> {}

impl<T> Default for Batch<T> {
    fn default() -> Self {
        Batch(InlineQueue::new())
    }
}

impl<T: Debug> Debug for Batch<T> {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        Debug::fmt(&self.0, f)
    }
}


// ==== tests ====


#[cfg(test)]
mod tests {
    use super::*;
    use std::{
        sync::{mpsc, Arc},
        thread,
        time::Duration,
    };

    struct Message {
        id: u32,
        text: String,
    }

    fn message(id: u32) -> Message {
        Message { id, text: "Hello, World!".to_owned() }
    }

    #[test]
    fn create() {
        let (tx, rx) = channel::<Message>();
        assert_eq!(tx.queue.handle_count(), 2);
        assert!(rx.try_recv().is_none());
    }

    #[test]
    fn send_and_recv() {
        let (tx, rx) = channel();
        tx.send(message(1));
        let received = rx.recv();
        assert_eq!(received.id, 1);
        assert_eq!(received.text, "Hello, World!");
    }

    #[test]
    fn fifo_order() {
        let (tx, rx) = channel();
        tx.send(message(1));
        tx.send(message(2));
        tx.send(message(3));
        assert_eq!(rx.recv().id, 1);
        assert_eq!(rx.recv().id, 2);
        assert_eq!(rx.recv().id, 3);
    }

    #[test]
    fn try_recv_alternates_with_sends() {
        let (tx, rx) = channel();
        assert!(rx.try_recv().is_none());
        tx.send(message(1));
        assert_eq!(rx.try_recv().unwrap().id, 1);
        assert!(rx.try_recv().is_none());
    }

    #[test]
    fn try_recv_all_drains_in_order() {
        let (tx, rx) = channel();
        assert!(rx.try_recv_all().is_empty());

        tx.send(message(1));
        tx.send(message(2));
        let batch = rx.try_recv_all();
        assert_eq!(batch.len(), 2);
        let ids: Vec<u32> = batch.map(|m| m.id).collect();
        assert_eq!(ids, vec![1, 2]);

        assert!(rx.try_recv_all().is_empty());

        // the channel stays usable after a drain
        tx.send(message(3));
        assert_eq!(rx.recv().id, 3);
    }

    #[test]
    fn boxed_value_is_consumed_by_send() {
        // a Copy type still transfers ownership when boxed, same as any other message
        #[derive(Clone, Copy)]
        struct Tag(u32);

        let (tx, rx) = channel();
        let boxed = Box::new(Tag(1));
        tx.send(boxed);
        // `boxed` is moved out of scope here; using it again would not compile
        assert_eq!(rx.recv().0, 1);
    }

    #[test]
    fn cloning_senders_bumps_handle_count() {
        let (tx, rx) = channel::<Message>();
        assert_eq!(tx.queue.handle_count(), 2);

        let tx2 = tx.clone();
        assert_eq!(tx.queue.handle_count(), 3);
        let tx3 = tx2.clone();
        assert_eq!(tx.queue.handle_count(), 4);

        drop(tx3);
        assert_eq!(tx.queue.handle_count(), 3);
        drop(rx);
        assert_eq!(tx.queue.handle_count(), 2);
        drop(tx2);
        assert_eq!(tx.queue.handle_count(), 1);
    }

    #[test]
    fn undelivered_messages_dropped_with_last_handle() {
        let marker = Arc::new(());

        let (tx, rx) = channel();
        tx.send(Arc::clone(&marker));
        tx.send(Arc::clone(&marker));
        assert_eq!(Arc::strong_count(&marker), 3);

        drop(tx);
        // the queue (and everything buffered in it) lives while any handle does
        assert_eq!(Arc::strong_count(&marker), 3);
        drop(rx);
        assert_eq!(Arc::strong_count(&marker), 1);
    }

    #[test]
    fn threaded_fifo_1000() {
        let (tx, rx) = channel();

        let producer = thread::spawn(move || {
            for i in 1..=1000u32 {
                tx.send(message(i));
            }
        });
        for i in 1..=1000u32 {
            assert_eq!(rx.recv().id, i);
        }
        producer.join().unwrap();
    }

    #[test]
    fn many_producers_no_loss_no_duplication() {
        const PRODUCERS: u32 = 8;
        const PER_PRODUCER: u32 = 250;

        let (tx, rx) = channel();
        let handles: Vec<_> = (0..PRODUCERS)
            .map(|producer| {
                let tx = tx.clone();
                thread::spawn(move || {
                    for seq in 0..PER_PRODUCER {
                        tx.send((producer, seq));
                    }
                })
            })
            .collect();
        drop(tx);

        // per-producer sequences must come out in order; interleaving across producers is
        // whatever order their sends took the lock
        let mut next_seq = [0u32; PRODUCERS as usize];
        for _ in 0..PRODUCERS * PER_PRODUCER {
            let (producer, seq) = rx.recv();
            assert_eq!(seq, next_seq[producer as usize]);
            next_seq[producer as usize] += 1;
        }
        assert!(rx.try_recv().is_none());
        assert!(next_seq.iter().all(|&n| n == PER_PRODUCER));

        for handle in handles {
            handle.join().unwrap();
        }
    }

    #[test]
    fn recv_blocks_until_a_send_occurs() {
        let (tx, rx) = channel();
        let (done_tx, done_rx) = mpsc::channel();

        let consumer = thread::spawn(move || {
            let value: u32 = rx.recv();
            done_tx.send(value).unwrap();
        });

        // give the consumer time to reach its blocking recv, then confirm it hasn't returned
        thread::sleep(Duration::from_millis(50));
        assert_eq!(done_rx.try_recv(), Err(mpsc::TryRecvError::Empty));

        tx.send(42);
        // the timeout bounds the test if blocking were broken; it is not part of the channel API
        assert_eq!(done_rx.recv_timeout(Duration::from_secs(5)).unwrap(), 42);
        consumer.join().unwrap();
    }

    #[test]
    fn drain_races_with_concurrent_sends() {
        const TOTAL: u32 = 10_000;

        let (tx, rx) = channel();
        let producer = thread::spawn(move || {
            for i in 0..TOTAL {
                tx.send(i);
            }
        });

        // alternate batch drains and single pops while the producer runs; every message must
        // arrive exactly once, in order
        let mut expected = 0u32;
        while expected < TOTAL {
            for got in rx.try_recv_all() {
                assert_eq!(got, expected);
                expected += 1;
            }
            if expected < TOTAL {
                assert_eq!(rx.recv(), expected);
                expected += 1;
            }
        }
        assert!(rx.try_recv().is_none());
        producer.join().unwrap();
    }

    #[test]
    fn debug_impls() {
        let (tx, rx) = channel();
        assert_eq!(format!("{:?}", tx), "Sender { .. }");
        assert_eq!(format!("{:?}", rx), "Receiver { .. }");
        tx.send(1u32);
        tx.send(2u32);
        assert_eq!(format!("{:?}", rx.try_recv_all()), "[1, 2]");
    }
}
