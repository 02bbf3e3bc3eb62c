use std::net::SocketAddr;

use croak_msg::{Id, MessageToBytesError, Token};

/// The context that an error occurred in
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum When {
  /// We were polling for a message when the error occurred
  Polling,
  /// We were sending a message
  SendingMessage(Option<SocketAddr>, Id, Token),
}

impl When {
  /// Construct a specific error from the context the error occurred in
  pub fn what<E>(self, what: What<E>) -> Error<E> {
    Error { when: self, what }
  }
}

/// An operational error encounterable from within the core.
///
/// These are distinct from [`crate::resp::Fail`]: a `Fail` is the
/// terminal state of one request, an `Error` is the machinery itself
/// misbehaving (socket, serialization, clock).
#[derive(Debug, Clone, PartialEq)]
pub struct Error<E> {
  /// What happened?
  pub what: What<E>,
  /// What were we doing when it happened?
  pub when: When,
}

/// A contextless error with some additional debug data attached.
#[derive(Debug, Clone, PartialEq)]
pub enum What<E> {
  /// Some socket operation failed
  SockError(E),
  /// Serializing a message to bytes failed
  ToBytes(MessageToBytesError),
  /// The clock failed to provide timing.
  ///
  /// See [`embedded_time::clock::Error`]
  ClockError,
}
