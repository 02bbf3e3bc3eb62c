//! `croak-msg` is the wire layer of the `croak` CoAP client:
//! a low-level representation of CoAP messages and their
//! serialization to & from the RFC7252 byte layout.
//!
//! ## What it does
//! - packs & parses the fixed 4-byte header, token, option list and payload
//! - compresses option numbers into deltas (with the 13/14 extended forms)
//!   on the way out, and accumulates them back on the way in
//! - packs & parses the RFC7959 block descriptor carried by the
//!   Block1/Block2 options
//!
//! ## What it does not do
//! This crate explicitly does **not** know or care about how messages are
//! sent and received; for the client runtime that drives a socket with
//! these data structures, see `croak`.

#![doc(html_root_url = "https://docs.rs/croak-msg/0.4.2")]
#![cfg_attr(not(test),
            deny(missing_debug_implementations,
                 unreachable_pub,
                 unsafe_code,
                 missing_copy_implementations))]
#![deny(missing_docs)]

mod cursor;

/// Message, options, and related data structures
pub mod msg;

mod from_bytes;
mod to_bytes;

pub use from_bytes::TryFromBytes;
pub use msg::*;
pub use to_bytes::{MessageToBytesError, TryIntoBytes};

#[cfg(test)]
macro_rules! assert_eqb {
  ($actual:expr, $expected:expr) => {
    if $actual != $expected {
      panic!("expected {:08b} to equal {:08b}", $actual, $expected)
    }
  };
}

#[cfg(test)]
pub(crate) use assert_eqb;

/// A message and its byte representation, shared by the codec tests.
///
/// ```text
/// CON GET id=1 token=[254]
///   Content-Format: "application/json" (as an opaque 16-byte value)
/// payload "hello, world!"
/// ```
#[cfg(test)]
pub(crate) fn test_msg() -> (Message, Vec<u8>) {
  let header: [u8; 4] = 0b_01_00_0001_00000001_0000000000000001u32.to_be_bytes();
  let token: [u8; 1] = [254u8];
  let content_format: &[u8] = b"application/json";
  let options: [&[u8]; 2] = [&[0b_1100_1101u8, 0b0000_0011u8], content_format];
  let payload: [&[u8]; 2] = [&[0b_11111111u8], b"hello, world!"];
  let bytes = [header.as_ref(),
               token.as_ref(),
               options.concat().as_ref(),
               payload.concat().as_ref()].concat();

  let mut msg = Message::new(Type::Con,
                             Code::new(0, 1),
                             Id(1),
                             Token(tinyvec::array_vec!([u8; 8] => 254)));
  msg.add(OptNumber::CONTENT_FORMAT, OptValue(content_format.to_vec()));
  msg.payload = Payload(b"hello, world!".to_vec());

  (msg, bytes)
}
