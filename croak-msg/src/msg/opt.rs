use super::parse_error::OptParseError;
use crate::cursor::Cursor;

/// The Option number identifies which Option is being set
/// (e.g. Content-Format has a Number of 12)
///
/// <details>
/// <summary>Click to see table of Option Numbers defined in RFC7252</summary>
///
/// ```text
/// +--------+------------------+-----------+
/// | Number | Name             | Reference |
/// +--------+------------------+-----------+
/// |      1 | If-Match         | [RFC7252] |
/// |      3 | Uri-Host         | [RFC7252] |
/// |      4 | ETag             | [RFC7252] |
/// |      5 | If-None-Match    | [RFC7252] |
/// |      7 | Uri-Port         | [RFC7252] |
/// |      8 | Location-Path    | [RFC7252] |
/// |     11 | Uri-Path         | [RFC7252] |
/// |     12 | Content-Format   | [RFC7252] |
/// |     14 | Max-Age          | [RFC7252] |
/// |     15 | Uri-Query        | [RFC7252] |
/// |     17 | Accept           | [RFC7252] |
/// |     20 | Location-Query   | [RFC7252] |
/// |     23 | Block2           | [RFC7959] |
/// |     27 | Block1           | [RFC7959] |
/// +--------+------------------+-----------+
/// ```
/// </details>
///
/// # Related
/// - [RFC7252#section-5.4.6 Option Numbers](https://datatracker.ietf.org/doc/html/rfc7252#section-5.4.6)
#[derive(Copy, Clone, Hash, PartialEq, Eq, PartialOrd, Ord, Debug)]
pub struct OptNumber(pub u32);

impl OptNumber {
  /// Uri-Host (3)
  pub const URI_HOST: Self = Self(3);
  /// Uri-Port (7)
  pub const URI_PORT: Self = Self(7);
  /// Uri-Path (11), repeatable
  pub const URI_PATH: Self = Self(11);
  /// Content-Format (12)
  pub const CONTENT_FORMAT: Self = Self(12);
  /// Uri-Query (15), repeatable
  pub const URI_QUERY: Self = Self(15);
  /// Block2 (23), response payload block descriptor
  pub const BLOCK2: Self = Self(23);
  /// Block1 (27), request payload block descriptor
  pub const BLOCK1: Self = Self(27);
}

/// Option Value
///
/// # Related
/// - [RFC7252#section-3.1 Option Format](https://datatracker.ietf.org/doc/html/rfc7252#section-3.1)
#[derive(Default, Clone, PartialEq, Eq, Debug)]
pub struct OptValue(pub Vec<u8>);

impl OptValue {
  /// Interpret the value as a network-byte-order unsigned integer.
  ///
  /// Values longer than 4 bytes yield `None`.
  pub fn uint(&self) -> Option<u32> {
    if self.0.len() > 4 {
      return None;
    }

    Some(self.0.iter().fold(0u32, |acc, b| (acc << 8) | *b as u32))
  }
}

/// A single option: its absolute number and value.
///
/// The on-wire delta compression is a serialization detail; in memory
/// options always carry their absolute number.
///
/// # Related
/// - [RFC7252#section-5.4 Options](https://datatracker.ietf.org/doc/html/rfc7252#section-5.4)
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct Opt {
  /// See [`OptNumber`]
  pub number: OptNumber,
  /// See [`OptValue`]
  pub value: OptValue,
}

/// Decode a delta or length nibble, consuming its extension bytes.
///
/// ```text
/// | nibble | meaning                                |
/// | 0..13  | the value itself                       |
/// | 13     | one extension byte holds value - 13    |
/// | 14     | two extension bytes hold value - 269   |
/// | 15     | reserved -> `reserved_err`             |
/// ```
pub(crate) fn opt_len_or_delta(head: u8,
                               bytes: &mut Cursor<'_>,
                               reserved_err: OptParseError)
                               -> Result<u32, OptParseError> {
  match head {
    | 15 => Err(reserved_err),
    | 13 => {
      let n = bytes.next().ok_or_else(OptParseError::eof)?;
      Ok(n as u32 + 13)
    },
    | 14 => match bytes.take_exact(2) {
      | Some(&[a, b]) => Ok(u16::from_be_bytes([a, b]) as u32 + 269),
      | _ => Err(OptParseError::eof()),
    },
    | _ => Ok(head as u32),
  }
}

impl Opt {
  /// Parse one option from the cursor, given the running option number.
  ///
  /// The caller is expected to have already ruled out the payload marker
  /// (0xFF) by peeking at `header`.
  pub(crate) fn parse(header: u8,
                      running_number: u32,
                      bytes: &mut Cursor<'_>)
                      -> Result<Self, OptParseError> {
    let delta = opt_len_or_delta(header >> 4,
                                 bytes,
                                 OptParseError::OptionDeltaReservedValue(15))?;
    let len = opt_len_or_delta(header & 0b1111,
                               bytes,
                               OptParseError::ValueLengthReservedValue(15))?;
    let value = bytes.take_exact(len as usize)
                     .ok_or_else(OptParseError::eof)?;

    Ok(Opt { number: OptNumber(running_number + delta),
             value: OptValue(value.to_vec()) })
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn parse_opt() {
    // delta 1, len 1
    let mut bytes = Cursor::new(&[0b0000_0001]);
    let opt = Opt::parse(0b0001_0001, 0, &mut bytes).unwrap();
    assert_eq!(opt,
               Opt { number: OptNumber(1),
                     value: OptValue(vec![1]) });
  }

  #[test]
  fn parse_opt_with_extended_delta() {
    // delta 13 + 11 = 24, len 1; running number 3 -> 27
    let mut bytes = Cursor::new(&[11, 0xAB]);
    let opt = Opt::parse(0b1101_0001, 3, &mut bytes).unwrap();
    assert_eq!(opt,
               Opt { number: OptNumber(27),
                     value: OptValue(vec![0xAB]) });
  }

  #[test]
  fn parse_opt_with_16bit_len() {
    let value = core::iter::repeat(1u8).take(300).collect::<Vec<_>>();
    let bytes = [(300u16 - 269).to_be_bytes().to_vec(), value.clone()].concat();
    let mut bytes = Cursor::new(&bytes);
    let opt = Opt::parse(0b0000_1110, 0, &mut bytes).unwrap();
    assert_eq!(opt.value, OptValue(value));
  }

  #[test]
  fn reserved_nibbles_rejected() {
    let mut bytes = Cursor::new(&[]);
    assert_eq!(Opt::parse(0b1111_0000, 0, &mut bytes),
               Err(OptParseError::OptionDeltaReservedValue(15)));

    let mut bytes = Cursor::new(&[]);
    assert_eq!(Opt::parse(0b0000_1111, 0, &mut bytes),
               Err(OptParseError::ValueLengthReservedValue(15)));
  }

  #[test]
  fn truncated_value_rejected() {
    // len says 2, only 1 byte follows
    let mut bytes = Cursor::new(&[1]);
    assert_eq!(Opt::parse(0b0000_0010, 0, &mut bytes),
               Err(OptParseError::UnexpectedEndOfStream));
  }

  #[test]
  fn uint() {
    assert_eq!(OptValue(vec![]).uint(), Some(0));
    assert_eq!(OptValue(vec![41]).uint(), Some(41));
    assert_eq!(OptValue(vec![1, 0]).uint(), Some(256));
    assert_eq!(OptValue(vec![1, 2, 3, 4, 5]).uint(), None);
  }
}
