// implementation of the culvert channel.
//
// the architecture is as such:
//
// sender/receiver handles wrap around Arc<shared state>
//                                          |
//          /-------------------------------/
//          v
//       shared state
//          |
//          |------ it contains a Mutex<buffer::InlineQueue<T>>, which is an externally-safe,
//          |       not-itself-concurrent FIFO used to hold the buffered messages. every
//          |       observation or mutation of the buffer goes through this mutex.
//          |
//          \------ it contains a Condvar signalled once per push, which is what a blocking
//                  recv sleeps on while the buffer is empty.
//
// blocking is plain mutex + condvar with a predicate loop; there are no queues of waiters
// because the receiver is unique, so at most one thread ever sleeps on the condvar.
//
// the organization of these modules is as such:
//
//      buffer<---------------core: the concurrency-correctness surface. locking, waiting,
//                            ^     waking, and the atomic whole-buffer drain all live here.
//                            |
//                            api: thin public wrapper around core: the channel() factory,
//                                 the handle types, and the Batch type returned by draining.
//                                 the crate re-exports this API publically.

pub(crate) mod api;

mod buffer;
mod core;
