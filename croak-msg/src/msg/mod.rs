/// Message Code
pub mod code;

/// Block descriptor carried by the Block1 / Block2 options
pub mod block;

/// Message ID
pub mod id;

/// Message Options
pub mod opt;

/// Message parsing errors
pub mod parse_error;

/// Message Token
pub mod token;

/// Message Type
pub mod ty;

/// Message Version
pub mod ver;

pub use block::*;
pub use code::*;
pub use id::*;
pub use opt::*;
pub use parse_error::*;
pub use token::*;
pub use ty::*;
pub use ver::*;

/// Low-level representation of the message payload
///
/// Both requests and responses may include a payload, depending on the
/// Method or Response Code, respectively.
///
/// # Related
/// - [RFC7252#section-5.5 Payloads and Representations](https://datatracker.ietf.org/doc/html/rfc7252#section-5.5)
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Payload(pub Vec<u8>);

impl Payload {
  /// Borrow the payload as a byte slice
  pub fn as_bytes(&self) -> &[u8] {
    &self.0
  }
}

/// Struct representing the first byte of a message.
///
/// ```text
/// CoAP version
/// |
/// |  Message type (CON, NON, ACK, RESET)
/// |  |
/// |  |  Length of token, in bytes. (4-bit integer)
/// |  |  |
/// vv vv vvvv
/// 01 00 0000
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct Byte1 {
  pub(crate) ver: Version,
  pub(crate) ty: Type,
  pub(crate) tkl: u8,
}

impl TryFrom<u8> for Byte1 {
  type Error = MessageParseError;

  fn try_from(b: u8) -> Result<Self, Self::Error> {
    let ver = b >> 6; // bits 0 & 1
    let ty = b >> 4 & 0b11; // bits 2 & 3
    let tkl = b & 0b1111u8; // last 4 bits

    Ok(Byte1 { ver: Version(ver),
               ty: Type::try_from(ty)?,
               tkl })
  }
}

/// # CoAP Messages
///
/// A fully parsed (or yet-to-be-serialized) CoAP message; the
/// request/response semantics live in the `croak` runtime, this struct is
/// **just** the data on the wire.
///
/// ## Options
/// `opts` is the ordered option list. [`Message::add`] keeps it sorted by
/// option number (repeats allowed, insertion order preserved among equal
/// numbers), which is what the delta encoding in `TryIntoBytes` relies on.
///
/// ```
/// use croak_msg::{Code, Id, Message, Token, Type};
///
/// let ping = Message::new(Type::Con, Code::EMPTY, Id(32), Token(Default::default()));
/// assert_eq!(ping.code.kind(), croak_msg::CodeKind::Empty);
/// ```
///
/// See [RFC7252 - Message Details](https://datatracker.ietf.org/doc/html/rfc7252#section-3) for context
#[derive(Clone, Debug, PartialEq)]
pub struct Message {
  /// see [`Id`] for details
  pub id: Id,
  /// see [`Type`] for details
  pub ty: Type,
  /// see [`Version`] for details
  pub ver: Version,
  /// see [`Token`] for details
  pub token: Token,
  /// see [`Code`] for details
  pub code: Code,
  /// see [`Opt`] for details
  pub opts: Vec<Opt>,
  /// see [`Payload`]
  pub payload: Payload,
}

impl Message {
  /// Create a new message with no options and an empty payload
  pub fn new(ty: Type, code: Code, id: Id, token: Token) -> Self {
    Self { id,
           token,
           ty,
           code,
           ver: Version::default(),
           opts: Vec::new(),
           payload: Payload(Vec::new()) }
  }

  /// Create the empty ACK for a received message id.
  ///
  /// Empty messages carry no token, options or payload; this is what a
  /// client sends back when a separate (CONfirmable) response arrives.
  pub fn empty_ack(id: Id) -> Self {
    Self::new(Type::Ack, Code::EMPTY, id, Token(Default::default()))
  }

  /// Insert a value for an option, keeping the option list sorted.
  ///
  /// Values for repeatable options (Uri-Path, Uri-Query) are appended
  /// after any existing values for the same number.
  pub fn add(&mut self, n: OptNumber, v: OptValue) {
    let ix = self.opts
                 .iter()
                 .position(|o| o.number.0 > n.0)
                 .unwrap_or(self.opts.len());
    self.opts.insert(ix, Opt { number: n, value: v });
  }

  /// Replace any existing values for an option with a new one.
  pub fn set(&mut self, n: OptNumber, v: OptValue) {
    self.opts.retain(|o| o.number != n);
    self.add(n, v);
  }

  /// Whether at least one value for the option is present.
  pub fn has(&self, n: OptNumber) -> bool {
    self.get_first(n).is_some()
  }

  /// Get the value of an option, taking the first if there are multiple.
  pub fn get_first(&self, n: OptNumber) -> Option<&OptValue> {
    self.opts
        .iter()
        .find(|o| o.number == n)
        .map(|o| &o.value)
  }

  /// Update the value for the Uri-Host option.
  pub fn set_host<S>(&mut self, host: S)
    where S: AsRef<str>
  {
    self.set(OptNumber::URI_HOST,
             OptValue(host.as_ref().as_bytes().to_vec()));
  }

  /// Update the value for the Uri-Port option.
  pub fn set_port(&mut self, port: u16) {
    self.set(OptNumber::URI_PORT, OptValue(port.to_be_bytes().to_vec()));
  }

  /// Insert a new Uri-Path segment, alongside any existing segments.
  pub fn add_path_segment<S>(&mut self, segment: S)
    where S: AsRef<str>
  {
    self.add(OptNumber::URI_PATH,
             OptValue(segment.as_ref().as_bytes().to_vec()));
  }

  /// Insert a new Uri-Query value, alongside any existing values.
  pub fn add_query<S>(&mut self, query: S)
    where S: AsRef<str>
  {
    self.add(OptNumber::URI_QUERY,
             OptValue(query.as_ref().as_bytes().to_vec()));
  }

  /// Update the value for the Content-Format option.
  pub fn set_content_format(&mut self, format: u16) {
    let bytes = if format < 256 {
      vec![format as u8]
    } else {
      format.to_be_bytes().to_vec()
    };
    self.set(OptNumber::CONTENT_FORMAT, OptValue(bytes));
  }

  /// Get the value for the Content-Format option.
  pub fn content_format(&self) -> Option<u16> {
    self.get_first(OptNumber::CONTENT_FORMAT)
        .and_then(OptValue::uint)
        .and_then(|v| u16::try_from(v).ok())
  }

  /// Update the value for the Block1 option.
  pub fn set_block1(&mut self, block: Block) {
    self.set(OptNumber::BLOCK1, OptValue(block.to_bytes().to_vec()));
  }

  /// Get the value for the Block1 option.
  ///
  /// Yields `None` when the option is absent **or** malformed; use
  /// [`Message::has`] first when the two need to be told apart.
  pub fn block1(&self) -> Option<Block> {
    self.get_first(OptNumber::BLOCK1)
        .and_then(|v| Block::try_from_bytes(&v.0).ok())
  }

  /// Update the value for the Block2 option.
  pub fn set_block2(&mut self, block: Block) {
    self.set(OptNumber::BLOCK2, OptValue(block.to_bytes().to_vec()));
  }

  /// Get the value for the Block2 option.
  ///
  /// `None` when absent or malformed, as with [`Message::block1`].
  pub fn block2(&self) -> Option<Block> {
    self.get_first(OptNumber::BLOCK2)
        .and_then(|v| Block::try_from_bytes(&v.0).ok())
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn add_keeps_opts_sorted() {
    let mut msg = Message::new(Type::Con,
                               Code::new(0, 1),
                               Id(1),
                               Token(Default::default()));
    msg.add(OptNumber::URI_PATH, OptValue(b"a".to_vec()));
    msg.add(OptNumber::URI_HOST, OptValue(b"h".to_vec()));
    msg.add(OptNumber::URI_PATH, OptValue(b"b".to_vec()));
    msg.add(OptNumber::BLOCK2, OptValue(vec![0x02]));

    let numbers = msg.opts.iter().map(|o| o.number.0).collect::<Vec<_>>();
    assert_eq!(numbers, vec![3, 11, 11, 23]);

    // repeated path segments keep their insertion order
    assert_eq!(msg.opts[1].value.0, b"a".to_vec());
    assert_eq!(msg.opts[2].value.0, b"b".to_vec());
  }

  #[test]
  fn set_replaces() {
    let mut msg = Message::new(Type::Con,
                               Code::new(0, 1),
                               Id(1),
                               Token(Default::default()));
    msg.set_content_format(0);
    msg.set_content_format(41);
    assert_eq!(msg.opts.len(), 1);
    assert_eq!(msg.content_format(), Some(41));
  }

  #[test]
  fn block_options() {
    let mut msg = Message::new(Type::Ack,
                               Code::new(2, 5),
                               Id(1),
                               Token(Default::default()));
    let block = Block::new(4, true, 2).unwrap();
    msg.set_block2(block);

    assert!(msg.has(OptNumber::BLOCK2));
    assert!(!msg.has(OptNumber::BLOCK1));
    assert_eq!(msg.block2(), Some(block));
    assert_eq!(msg.block1(), None);
  }

  #[test]
  fn empty_ack() {
    let ack = Message::empty_ack(Id(42));
    assert_eq!(ack.ty, Type::Ack);
    assert_eq!(ack.code.kind(), CodeKind::Empty);
    assert_eq!(ack.id, Id(42));
    assert!(ack.token.0.is_empty());
    assert!(ack.opts.is_empty());
    assert!(ack.payload.0.is_empty());
  }
}
