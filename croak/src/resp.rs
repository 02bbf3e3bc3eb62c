use std::string::FromUtf8Error;

use croak_msg::Code;

/// A completed response.
///
/// 4.xx and 5.xx statuses arrive here too: a server that answers is a
/// server that answered, and the status code is part of the answer.
/// [`Fail`] is reserved for exchanges that never produced one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resp {
  pub(crate) code: Code,
  pub(crate) content_format: Option<u16>,
  pub(crate) payload: Vec<u8>,
}

impl Resp {
  /// The response status code (e.g. 2.05 Content)
  pub fn code(&self) -> Code {
    self.code
  }

  /// The Content-Format code carried by the response, if any
  pub fn content_format(&self) -> Option<u16> {
    self.content_format
  }

  /// The response payload; for block-wise responses, every block
  /// reassembled in order
  pub fn payload(&self) -> &[u8] {
    &self.payload
  }

  /// Copy the payload and attempt to interpret it as a UTF-8 string
  pub fn payload_string(&self) -> Result<String, FromUtf8Error> {
    String::from_utf8(self.payload.clone())
  }
}

/// Ways a request can terminate without a response.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Fail {
  /// The request URL's scheme was not `coap`; nothing was sent.
  SchemeNotCoap,
  /// The resolver could not produce an address for the URL's host.
  HostNotFound,
  /// An inbound message could not be parsed, or a block arrived out of
  /// sequence.
  InvalidPdu,
  /// The retransmission schedule was exhausted with no response.
  Timeout,
  /// The caller cancelled the request.
  Cancelled,
  /// The server answered with RESET: it received us but wants no part
  /// of this exchange.
  Reset,
}

/// The terminal state of a submitted request.
pub type Reply = Result<Resp, Fail>;
