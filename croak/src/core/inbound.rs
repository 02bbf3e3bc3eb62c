//! Core methods that manage inbound messages: draining the socket and
//! routing responses to the active transaction.
//!
//! For core methods that manage outbound messages, see [`super::outbound`].

use croak_msg::{CodeKind, Message, OptNumber, TryFromBytes, TryIntoBytes, Type};

use super::error::{Error, What, When};
use super::{Core, Transaction};
use crate::logging;
use crate::net::{Addrd, Dgram, Socket};
use crate::resolve::Resolve;
use crate::resp::{Fail, Resp};
use crate::time::Clock;

impl<Clk, Sock, R> Core<Clk, Sock, R>
  where Clk: Clock,
        Sock: Socket,
        R: Resolve
{
  /// Process every datagram buffered in the socket, in arrival order.
  pub(super) fn drain_sock(&mut self) -> Result<(), Error<Sock::Error>> {
    loop {
      match self.sock.poll() {
        | Ok(Some(dgram)) => self.dgram_recvd(dgram)?,
        | Ok(None) => break Ok(()),
        | Err(e) => break Err(When::Polling.what(What::SockError(e))),
      }
    }
  }

  fn dgram_recvd(&mut self, dgram: Addrd<Dgram>) -> Result<(), Error<Sock::Error>> {
    match Message::try_from_bytes(&dgram.data()[..]) {
      | Err(e) => {
        log::warn!("got invalid message: {:?}", e);
        if let Some(tx) = self.active.take() {
          self.finish(tx, Err(Fail::InvalidPdu));
        }
        Ok(())
      },
      | Ok(msg) => {
        log::debug!("<--- {}", logging::msg_summary(&msg));
        self.route(msg)
      },
    }
  }

  /// Match an inbound message against the active transaction: first by
  /// message id, then by token; anything matching neither is dropped.
  fn route(&mut self, msg: Message) -> Result<(), Error<Sock::Error>> {
    let Some(tx) = self.active.take() else {
      log::trace!("got message without a request, dropping");
      return Ok(());
    };

    if msg.id == tx.id {
      self.id_based(tx, msg)
    } else if msg.token == tx.token {
      self.separate_response(tx, msg)
    } else {
      log::trace!("message matches neither id nor token, dropping");
      self.active = Some(tx);
      Ok(())
    }
  }

  /// The message acknowledges (or resets) the request we most recently
  /// sent.
  fn id_based(&mut self, mut tx: Transaction<Clk>, msg: Message) -> Result<(), Error<Sock::Error>> {
    if msg.ty == Type::Reset {
      self.finish(tx, Err(Fail::Reset));
      return Ok(());
    }

    if msg.ty == Type::Ack && msg.code.kind() == CodeKind::Empty {
      // the response will be sent separately, bearing our token
      log::debug!("got empty ack, data will be sent separately");
      tx.retry = None;
      self.active = Some(tx);
      return Ok(());
    }

    if msg.ty == Type::Ack && msg.has(OptNumber::BLOCK1) {
      return self.block1_advance(tx, msg);
    }

    if msg.ty == Type::Ack && msg.has(OptNumber::BLOCK2) {
      return self.block2_advance(tx, msg);
    }

    // piggybacked response
    tx.acc.extend_from_slice(&msg.payload.0);
    let resp = Resp { code: msg.code,
                      content_format: msg.content_format(),
                      payload: core::mem::take(&mut tx.acc) };
    self.finish(tx, Ok(resp));
    Ok(())
  }

  /// The message is a separate response bearing our token: acknowledge
  /// it with an empty ACK and complete the reply.
  fn separate_response(&mut self,
                       mut tx: Transaction<Clk>,
                       msg: Message)
                       -> Result<(), Error<Sock::Error>> {
    let Some(addr) = tx.endpoint else {
      self.active = Some(tx);
      return Ok(());
    };

    let ack = Message::empty_ack(msg.id);
    let when = When::SendingMessage(Some(addr), ack.id, ack.token);
    log::debug!("---> {}", logging::msg_summary(&ack));

    let acked = ack.try_into_bytes()
                   .map_err(|e| when.what(What::ToBytes(e)))
                   .and_then(|bytes| {
                     Self::send_raw(&self.sock, addr, &bytes)
                         .map_err(|e| when.what(What::SockError(e)))
                   });

    tx.acc.extend_from_slice(&msg.payload.0);
    let resp = Resp { code: msg.code,
                      content_format: msg.content_format(),
                      payload: core::mem::take(&mut tx.acc) };
    self.finish(tx, Ok(resp));

    acked
  }
}
