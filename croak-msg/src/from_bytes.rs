use crate::cursor::Cursor;
use crate::msg::{Byte1, Id, Message, MessageParseError, Opt, Payload, Token};

/// Trait for converting a sequence of bytes into some data structure
pub trait TryFromBytes: Sized {
  /// Error type yielded if conversion fails
  type Error;

  /// Try to convert from some sequence of bytes into `Self`
  fn try_from_bytes<B: AsRef<[u8]>>(bytes: B) -> Result<Self, Self::Error>;
}

impl TryFromBytes for Message {
  type Error = MessageParseError;

  fn try_from_bytes<B: AsRef<[u8]>>(bytes: B) -> Result<Self, Self::Error> {
    let mut bytes = Cursor::new(bytes.as_ref());

    let Byte1 { tkl, ty, ver } = bytes.next()
                                      .ok_or_else(MessageParseError::eof)?
                                      .try_into()?;

    if ver.0 != 1 {
      return Err(MessageParseError::InvalidVersion(ver.0));
    }

    if tkl > 8 {
      return Err(MessageParseError::InvalidTokenLength(tkl));
    }

    let code = bytes.next().ok_or_else(MessageParseError::eof)?.into();
    let id = match bytes.take_exact(2) {
      | Some(&[a, b]) => Id::from_be_bytes([a, b]),
      | _ => return Err(MessageParseError::eof()),
    };
    let token = bytes.take_exact(tkl as usize)
                     .map(Token::from_bytes)
                     .ok_or_else(MessageParseError::eof)?;

    let mut opts = Vec::<Opt>::new();
    let mut payload = Payload(Vec::new());

    loop {
      match bytes.next() {
        | None => break,
        | Some(0xFF) => {
          let rest = bytes.take_until_end();
          if rest.is_empty() {
            return Err(MessageParseError::PayloadMarkerNoPayload);
          }

          payload = Payload(rest.to_vec());
          break;
        },
        | Some(header) => {
          let number = opts.last().map(|o| o.number.0).unwrap_or(0);
          let opt = Opt::parse(header, number, &mut bytes).map_err(MessageParseError::OptParseError)?;
          opts.push(opt);
        },
      }
    }

    Ok(Message { id,
                 ty,
                 ver,
                 code,
                 token,
                 opts,
                 payload })
  }
}
