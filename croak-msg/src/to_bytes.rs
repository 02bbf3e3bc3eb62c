use tinyvec::ArrayVec;

use crate::msg::{Byte1, Id, Message, Opt};

/// Trait allowing fallible conversion into the CoAP byte layout
pub trait TryIntoBytes {
  /// Error type yielded if conversion fails
  type Error;

  /// Try to convert into a byte vector
  ///
  /// ```
  /// use croak_msg::{Code, Id, Message, Token, Type, TryIntoBytes};
  ///
  /// let msg = Message::new(Type::Con, Code::new(0, 1), Id(1), Token(Default::default()));
  /// let bytes: Vec<u8> = msg.try_into_bytes().unwrap();
  /// ```
  fn try_into_bytes(self) -> Result<Vec<u8>, Self::Error>;
}

/// Errors encounterable serializing to bytes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageToBytesError {
  /// The option list was not sorted by option number, so the deltas
  /// would have to be negative
  OptOutOfOrder {
    /// Number of the preceding option
    prev: u32,
    /// Number of the out-of-order option
    next: u32,
  },

  /// The gap between consecutive option numbers exceeds what the
  /// two-byte extended delta can express
  DeltaTooLarge(u32),

  /// An option value was longer than the two-byte extended length can
  /// express
  ValueTooLong(usize),
}

impl TryIntoBytes for Message {
  type Error = MessageToBytesError;

  fn try_into_bytes(self) -> Result<Vec<u8>, Self::Error> {
    let mut bytes = Vec::<u8>::new();

    let byte1: u8 = Byte1 { tkl: self.token.0.len() as u8,
                            ver: self.ver,
                            ty: self.ty }.into();

    bytes.push(byte1);
    bytes.push(self.code.into());
    bytes.extend(<[u8; 2]>::from(self.id));
    bytes.extend(self.token.0);

    let mut number = 0u32;
    for opt in &self.opts {
      opt.extend_bytes(number, &mut bytes)?;
      number = opt.number.0;
    }

    if !self.payload.0.is_empty() {
      bytes.push(0b11111111);
      bytes.extend(self.payload.0);
    }

    Ok(bytes)
  }
}

impl Opt {
  /// Append this option's header, extension bytes and value, given the
  /// number of the option serialized before it.
  pub(crate) fn extend_bytes(&self,
                             prev_number: u32,
                             bytes: &mut Vec<u8>)
                             -> Result<(), MessageToBytesError> {
    if self.number.0 < prev_number {
      return Err(MessageToBytesError::OptOutOfOrder { prev: prev_number,
                                                      next: self.number.0 });
    }

    let delta = self.number.0 - prev_number;
    let (delta_nibble, delta_ext) =
      opt_len_or_delta(delta).ok_or(MessageToBytesError::DeltaTooLarge(delta))?;

    let len = self.value.0.len();
    let (len_nibble, len_ext) = u32::try_from(len).ok()
                                                  .and_then(opt_len_or_delta)
                                                  .ok_or(MessageToBytesError::ValueTooLong(len))?;

    bytes.push((delta_nibble << 4) | len_nibble);
    bytes.extend(delta_ext);
    bytes.extend(len_ext);
    bytes.extend(&self.value.0);

    Ok(())
  }
}

/// Encode a delta or length as its nibble + extension bytes, the inverse
/// of the parser's extension handling; `None` when it cannot be expressed.
pub(crate) fn opt_len_or_delta(val: u32) -> Option<(u8, ArrayVec<[u8; 2]>)> {
  match val {
    | n if n > 65535 + 269 => None,
    | n if n >= 269 => {
      let mut bytes = ArrayVec::new();
      bytes.extend(((n - 269) as u16).to_be_bytes());
      Some((14, bytes))
    },
    | n if n >= 13 => {
      let mut bytes = ArrayVec::new();
      bytes.push((n - 13) as u8);
      Some((13, bytes))
    },
    | n => Some((n as u8, ArrayVec::new())),
  }
}

impl From<Id> for [u8; 2] {
  fn from(id: Id) -> [u8; 2] {
    id.0.to_be_bytes()
  }
}

impl From<Byte1> for u8 {
  fn from(b: Byte1) -> u8 {
    let ver = b.ver.0 << 6;
    let ty = u8::from(b.ty) << 4;
    let tkl = b.tkl;

    ver | ty | tkl
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::assert_eqb;
  use crate::msg::{OptNumber, OptValue, Type, Version};

  macro_rules! assert_eqb_iter {
    ($actual:expr, $expected:expr) => {
      if $actual.iter().ne($expected.iter()) {
        panic!("expected {:?} to equal {:?}",
               $actual.into_iter()
                      .map(|b| format!("{:08b}", b))
                      .collect::<Vec<_>>(),
               $expected.into_iter()
                        .map(|b| format!("{:08b}", b))
                        .collect::<Vec<_>>())
      }
    };
  }

  #[test]
  fn msg() {
    let (msg, expected) = crate::test_msg();
    let actual: Vec<u8> = msg.try_into_bytes().unwrap();
    assert_eqb_iter!(actual, expected);
  }

  #[test]
  fn byte_1() {
    let byte = Byte1 { ver: Version(1),
                       ty: Type::Ack,
                       tkl: 3 };
    let actual: u8 = byte.into();
    let expected = 0b_01_10_0011u8;
    assert_eqb!(actual, expected)
  }

  #[test]
  fn id() {
    let id = Id(16);
    let actual = u16::from_be_bytes(id.into());
    assert_eqb!(actual, 16)
  }

  #[test]
  fn opt() {
    use core::iter::repeat;

    // (prev number, number, value, expected bytes)
    let cases: [(u32, u32, Vec<u8>, Vec<u8>); 4] =
      [(0, 1, vec![1], vec![0b0001_0001, 1]),
       (0, 24, vec![1], vec![0b1101_0001, 24 - 13, 1]),
       (0,
        24,
        repeat(1).take(100).collect(),
        [[0b1101_1101u8, 24 - 13, 100 - 13].as_ref(),
         repeat(1).take(100).collect::<Vec<u8>>().as_ref()].concat()),
       (0,
        24,
        repeat(1).take(300).collect(),
        [[0b1101_1110, 24 - 13].as_ref(),
         (300u16 - 269).to_be_bytes().as_ref(),
         repeat(1).take(300).collect::<Vec<u8>>().as_ref()].concat())];

    cases.into_iter().for_each(|(prev, number, value, expected)| {
                       let opt = Opt { number: OptNumber(number),
                                       value: OptValue(value) };
                       let mut actual = Vec::<u8>::new();
                       opt.extend_bytes(prev, &mut actual).unwrap();
                       assert_eqb_iter!(actual, expected)
                     });
  }

  #[test]
  fn out_of_order_opts_rejected() {
    let opt = Opt { number: OptNumber(3),
                    value: OptValue(vec![]) };
    let mut bytes = Vec::new();
    assert_eq!(opt.extend_bytes(11, &mut bytes),
               Err(MessageToBytesError::OptOutOfOrder { prev: 11, next: 3 }));
  }

  #[test]
  fn delta_accumulation_round_trips() {
    use crate::msg::{Code, Message, Token, Type};
    use crate::TryFromBytes;

    let mut msg = Message::new(Type::Con,
                               Code::new(0, 1),
                               Id(7),
                               Token(tinyvec::array_vec!([u8; 8] => 1, 2, 3, 4)));
    for n in [3u32, 7, 11, 11, 15, 23, 2000] {
      msg.add(OptNumber(n), OptValue(vec![n as u8]));
    }

    let parsed = Message::try_from_bytes(msg.clone().try_into_bytes().unwrap()).unwrap();
    assert_eq!(parsed, msg);
    assert_eq!(parsed.opts.iter().map(|o| o.number.0).collect::<Vec<_>>(),
               vec![3, 7, 11, 11, 15, 23, 2000]);
  }

  #[test]
  fn no_payload_marker() {
    use crate::msg::{Code, Message, Token, Type};

    let msg = Message::new(Type::Con,
                           Code { class: 2,
                                  detail: 5 },
                           Id(0),
                           Token(Default::default()));

    assert_ne!(msg.try_into_bytes().unwrap().last(), Some(&0b11111111));
  }
}
