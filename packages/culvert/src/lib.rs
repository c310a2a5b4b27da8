//! Blocking, unbounded, multi-producer single-consumer channel.
//!
//! A culvert channel is created by calling the [`channel`] function, which creates a linked pair
//! of [`Sender<T>`] and [`Receiver<T>`]. Any number of additional senders can be produced by
//! cloning the first one; the receiver is unique and cannot be cloned, so exactly one thread
//! consumes the channel. Messages come out in the order their sends were serialized by the
//! channel's internal lock.
//!
//! Sending consumes the message: `send` takes its argument by value, so once a value has gone
//! into the channel the producer cannot touch it again. This is the whole "hand it off and
//! forget it" contract, and in Rust it falls out of move semantics directly. (The same contract
//! in languages with implicit copying needs a move-only constraint on the message type; here no
//! bound is required, and types that happen to be `Copy` are still moved when sent.)
//!
//! The channel is unbounded: `send` never blocks and cannot fail. On the receiving side there
//! are three ways to take messages out:
//!
//! - [`Receiver::recv`] blocks until a message is available,
//! - [`Receiver::try_recv`] returns `None` instead of blocking,
//! - [`Receiver::try_recv_all`] detaches everything buffered so far as one ordered [`Batch`].
//!
//! There is no disconnect signal: dropping every sender does not wake a blocked `recv`, which
//! will then block forever. If a consumer needs to learn that producers are gone, that has to
//! travel through the channel itself (or out of band) as part of the application's protocol.
//!
//! ```
//! use std::thread;
//!
//! struct Message {
//!     id: u32,
//!     text: String,
//! }
//!
//! let (tx, rx) = culvert::channel::<Message>();
//!
//! let sender = thread::spawn(move || {
//!     tx.send(Message { id: 1, text: "Hello, World!".to_owned() });
//! });
//!
//! let message = rx.recv();
//! assert_eq!(message.id, 1);
//! assert_eq!(message.text, "Hello, World!");
//!
//! sender.join().unwrap();
//! ```

#[macro_use]
extern crate tracing;

mod channel;

pub use crate::channel::api::*;
