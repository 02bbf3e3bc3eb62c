use croak_msg::Message;

/// One-line human summary of a message, used with directional arrows in
/// the send/receive logs.
pub(crate) fn msg_summary(msg: &Message) -> String {
  format!("{:?}: {:?} {} id={} with {} byte payload",
          msg.code.kind(),
          msg.ty,
          msg.code,
          msg.id.0,
          msg.payload.0.len())
}

#[cfg(test)]
mod tests {
  use croak_msg::{Code, Id, Message, Payload, Token, Type};

  use super::*;

  #[test]
  fn summary() {
    let mut msg = Message::new(Type::Ack, Code::new(2, 5), Id(7), Token(Default::default()));
    msg.payload = Payload(b"hi".to_vec());
    assert_eq!(msg_summary(&msg), "Response: Ack 2.05 id=7 with 2 byte payload");
  }
}
