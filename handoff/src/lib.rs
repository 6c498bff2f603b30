//! # Crate handoff
//!
//! ## handoff
//!
//! The `handoff` crate provides a blocking, unbounded FIFO used to move owned
//! items from any number of producer threads to a single consumer thread.
//!
//! Producers never wait on the consumer. The consumer sleeps on a condition
//! variable until work arrives, and a cooperative shutdown lets it drain what
//! is left before it sees the end of the stream.
//!
//! ### Example
//!
//! ```
//! use handoff::HandoffQueue;
//! use std::sync::Arc;
//! use std::thread;
//!
//! let queue = Arc::new(HandoffQueue::new());
//!
//! let consumer = {
//!     let queue = Arc::clone(&queue);
//!     thread::spawn(move || {
//!         let mut received = vec![];
//!         while let Some(item) = queue.dequeue() {
//!             received.push(item);
//!         }
//!         received
//!     })
//! };
//!
//! queue.enqueue("first");
//! queue.enqueue("second");
//! queue.signal_shutdown();
//!
//! assert_eq!(consumer.join().unwrap(), vec!["first", "second"]);
//! ```

mod queue;

pub use queue::HandoffQueue;
