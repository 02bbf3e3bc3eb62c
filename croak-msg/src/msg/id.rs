#[allow(unused_imports)]
use crate::Token;

/// # Message ID
///
/// 16-bit unsigned integer in network byte order. Used to match messages
/// of type Acknowledgement/Reset to messages of type Confirmable/
/// Non-confirmable, and to detect duplicated messages.
///
/// For the difference between [`Id`] and [`Token`], see [`Token`].
#[derive(Copy, Clone, Hash, PartialEq, PartialOrd, Debug, Eq, Ord)]
pub struct Id(pub u16);

impl Id {
  /// Create an Id from a big-endian 2-byte unsigned int
  pub fn from_be_bytes(bs: [u8; 2]) -> Self {
    Self(u16::from_be_bytes(bs))
  }

  /// The id one greater than this one, wrapping at the 16-bit boundary.
  ///
  /// Block follow-up requests use this; the id of block N+1 is exactly
  /// one greater than the id of block N.
  pub fn next(&self) -> Self {
    Self(self.0.wrapping_add(1))
  }
}
