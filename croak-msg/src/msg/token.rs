use tinyvec::ArrayVec;

/// # Message Token
///
/// An opaque sequence of 0-8 bytes correlating a request with its
/// response(s).
///
/// Note that this is different from [`crate::Id`], which identifies a
/// single message that may be retransmitted; a request keeps its token
/// across every message in its exchange (retransmissions, separate
/// responses, block follow-ups) while the id changes.
#[derive(Copy, Clone, Default, PartialEq, PartialOrd, Debug)]
pub struct Token(pub ArrayVec<[u8; 8]>);

impl Token {
  /// Build a token from raw bytes; at most 8 are kept.
  pub fn from_bytes(bytes: &[u8]) -> Self {
    Self(bytes.iter().copied().take(8).collect())
  }
}
