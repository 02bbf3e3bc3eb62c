//! `croak` is a client-side CoAP runtime: you hand it requests, it drives
//! the UDP conversation that answers them.
//!
//! ## CoAP
//! CoAP is an application-level network protocol that copies the semantics
//! of HTTP to an environment conducive to **constrained** devices (weak
//! hardware, small battery capacity, etc.)
//!
//! This means that you can write and run two-way RESTful communication
//! between devices very similarly to the networking semantics you are
//! most likely very familiar with.
//!
//! ### Similarities to HTTP
//! CoAP has the same verbs and many of the same semantics as HTTP;
//! - GET, POST, PUT, DELETE
//! - Headers (renamed to [Options](https://datatracker.ietf.org/doc/html/rfc7252#section-5.10))
//! - Data format independent (via the [Content-Format](https://datatracker.ietf.org/doc/html/rfc7252#section-12.3) Option)
//! - [Response status codes](https://datatracker.ietf.org/doc/html/rfc7252#section-5.9)
//!
//! ### Differences from HTTP
//! - CoAP customarily sits on top of UDP, so the transport gives you no
//!   "conversation"; reliability (CON retransmission, ACK matching) is
//!   this crate's job.
//! - Payloads larger than a negotiated block size travel as a chain of
//!   block exchanges ([RFC7959](https://datatracker.ietf.org/doc/html/rfc7959)),
//!   which [`core::Core`] drives transparently for both request bodies
//!   (Block1) and response bodies (Block2).
//!
//! ## What this crate is
//! A single-threaded, poll-driven client: at most one request is on the
//! wire at a time and the rest wait in a FIFO queue. The socket, clock and
//! host resolver are seams ([`net::Socket`], [`time::Clock`],
//! [`resolve::Resolve`]) with std implementations in [`sys`].

#![doc(html_root_url = "https://docs.rs/croak/0.2.3")]
#![cfg_attr(not(test),
            deny(missing_debug_implementations,
                 unreachable_pub,
                 unsafe_code,
                 missing_copy_implementations))]
#![deny(missing_docs)]

/// Runtime configuration
pub mod config;

/// The client core: request dispatch, reliability, block-wise transfer
pub mod core;

/// Sockets & datagrams
pub mod net;

/// CoAP requests
pub mod req;

/// Host name resolution
pub mod resolve;

/// CoAP responses & terminal request failures
pub mod resp;

/// Non-blocking retry timer
pub mod retry;

/// std implementations of the clock, socket & resolver seams
pub mod sys;

/// Clocks and durations
pub mod time;

mod logging;

#[cfg(test)]
pub(crate) mod test;
