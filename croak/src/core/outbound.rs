//! Core methods that manage outbound messages: starting transactions,
//! retransmission, and block follow-up requests.
//!
//! For core methods that manage inbound messages, see [`super::inbound`].

use std::net::SocketAddr;

use croak_msg::{Block, Id, Message, Payload, TryIntoBytes, Type};

use super::error::{Error, What, When};
use super::{Core, Transaction};
use crate::config::DEFAULT_PORT;
use crate::logging;
use crate::net::{Addrd, Socket};
use crate::req::Method;
use crate::resolve::Resolve;
use crate::resp::{Fail, Resp};
use crate::retry::{RetryTimer, YouShould};
use crate::time::Clock;

impl<Clk, Sock, R> Core<Clk, Sock, R>
  where Clk: Clock,
        Sock: Socket,
        R: Resolve
{
  /// Start the transaction sitting in the active slot: resolve its host,
  /// build the initial PDU, send it, and arm the retransmission timer.
  pub(super) fn start_active(&mut self) -> Result<(), Error<Sock::Error>> {
    let Some(mut tx) = self.active.take() else {
      return Ok(());
    };

    let ip = match self.resolver.resolve(&tx.req.url.host) {
      | Ok(ip) => ip,
      | Err(e) => {
        log::warn!("host lookup for {:?} failed: {:?}", tx.req.url.host, e);
        self.finish(tx, Err(Fail::HostNotFound));
        return Ok(());
      },
    };

    let port = tx.req.url.port.unwrap_or(self.config.default_port);
    let addr = SocketAddr::new(ip, port);

    tx.endpoint = Some(addr);
    tx.id = self.fresh_id();
    // Uri-Host is only worth sending when the url named something other
    // than the address itself
    tx.host_opt = tx.req.url.host != ip.to_string();

    let msg = self.initial_msg(&tx);
    self.arm_and_send(tx, addr, msg)
  }

  /// The first PDU of a transaction.
  fn initial_msg(&self, tx: &Transaction<Clk>) -> Message {
    let mut msg = self.base_msg(tx, tx.id);
    let szx = self.config.block_szx;

    if tx.req.method == Method::GET {
      // announce the response block size we want
      if let Some(block) = Block::new(0, false, szx) {
        msg.set_block2(block);
      }
    }

    if tx.req.method == Method::POST || tx.req.method == Method::PUT {
      msg.set_content_format(tx.req.content_format);

      let size = self.config.block_size();
      if tx.req.payload.len() > size {
        if let Some(block) = Block::new(0, true, szx) {
          msg.set_block1(block);
        }
        msg.payload = Payload(tx.req.payload[..size].to_vec());
      } else {
        msg.payload = Payload(tx.req.payload.clone());
      }
    }

    msg
  }

  /// Method, type, token and the uri options every PDU of a transaction
  /// carries: Uri-Host when the host was looked up, Uri-Port when the
  /// endpoint is on a non-default port, then path segments and query.
  pub(super) fn base_msg(&self, tx: &Transaction<Clk>, id: Id) -> Message {
    let mut msg = Message::new(tx.req.ty, tx.req.method.code(), id, tx.token);

    if tx.host_opt {
      msg.set_host(&tx.req.url.host);
    }

    if let Some(endpoint) = tx.endpoint {
      if endpoint.port() != DEFAULT_PORT {
        msg.set_port(endpoint.port());
      }
    }

    for segment in tx.req.url.path.split('/').filter(|s| !s.is_empty()) {
      msg.add_path_segment(segment);
    }

    if let Some(query) = &tx.req.url.query {
      msg.add_query(query);
    }

    msg
  }

  /// Serialize and send a PDU for this transaction, remembering the
  /// bytes for retransmission and arming a fresh retry timer.
  ///
  /// CONfirmable transactions go back to the active slot to await their
  /// response; a NON is complete the moment it leaves.
  pub(super) fn arm_and_send(&mut self,
                             mut tx: Transaction<Clk>,
                             addr: SocketAddr,
                             msg: Message)
                             -> Result<(), Error<Sock::Error>> {
    let when = When::SendingMessage(Some(addr), msg.id, msg.token);
    log::debug!("---> {}", logging::msg_summary(&msg));

    let bytes = match msg.try_into_bytes() {
      | Ok(bytes) => bytes,
      | Err(e) => {
        log::error!("serializing request failed: {:?}", e);
        self.finish(tx, Err(Fail::InvalidPdu));
        return Ok(());
      },
    };
    tx.last_dgram = bytes;

    let clock_err = if tx.req.ty == Type::Con {
      match self.clock.try_now() {
        | Ok(now) => {
          tx.retry = Some(RetryTimer::new(now, self.config.strategy(), self.config.max_sends()));
          None
        },
        | Err(_) => Some(when.what(What::ClockError)),
      }
    } else {
      None
    };

    let sent = Self::send_raw(&self.sock, addr, &tx.last_dgram)
                   .map_err(|e| when.what(What::SockError(e)));

    if tx.req.ty == Type::Con {
      self.active = Some(tx);
    } else {
      self.finish(tx,
                  Ok(Resp { code: croak_msg::Code::EMPTY,
                            content_format: None,
                            payload: Vec::new() }));
    }

    match clock_err {
      | Some(e) => Err(e),
      | None => sent,
    }
  }

  pub(super) fn send_raw(sock: &Sock, addr: SocketAddr, bytes: &[u8]) -> Result<(), Sock::Error> {
    nb::block!(sock.send(Addrd(bytes, addr)))
  }

  /// Let the active transaction's retry timer decide whether to resend
  /// the last datagram or give up.
  pub(super) fn check_retry(&mut self) -> Result<(), Error<Sock::Error>> {
    let decision = match self.active.as_mut() {
      | Some(Transaction { retry: Some(retry), .. }) => {
        let now = self.clock
                      .try_now()
                      .map_err(|_| When::Polling.what(What::ClockError))?;

        match retry.what_should_i_do(now) {
          | Ok(should) => Some(should),
          | Err(nb::Error::WouldBlock) => None,
          | Err(nb::Error::Other(never)) => match never {},
        }
      },
      | _ => None,
    };

    match decision {
      | Some(YouShould::Retry) => {
        if let Some(tx) = self.active.as_ref() {
          if let Some(addr) = tx.endpoint {
            log::debug!("no response yet, retransmitting id={}", tx.id.0);
            let when = When::SendingMessage(Some(addr), tx.id, tx.token);
            Self::send_raw(&self.sock, addr, &tx.last_dgram)
                .map_err(|e| when.what(What::SockError(e)))?;
          }
        }
        Ok(())
      },
      | Some(YouShould::Cry) => {
        if let Some(tx) = self.active.take() {
          log::warn!("no response after {} sends", self.config.max_sends().0);
          self.finish(tx, Err(Fail::Timeout));
        }
        Ok(())
      },
      | None => Ok(()),
    }
  }

  /// Advance a Block1 upload after the server acked the block we most
  /// recently sent: cut the next chunk and send it, or finish if the
  /// whole payload has been acked.
  pub(super) fn block1_advance(&mut self,
                               mut tx: Transaction<Clk>,
                               msg: Message)
                               -> Result<(), Error<Sock::Error>> {
    let Some(block) = msg.block1() else {
      self.finish(tx, Err(Fail::InvalidPdu));
      return Ok(());
    };

    if block.num() != tx.next_block {
      log::warn!("block1 ack out of sequence: acked #{}, sent #{}",
                 block.num(),
                 tx.next_block);
      self.finish(tx, Err(Fail::InvalidPdu));
      return Ok(());
    }

    let size = self.config.block_size();
    let payload = &tx.req.payload;
    let offset = (block.num() as usize + 1) * size;
    let chunk = payload.get(offset..payload.len().min(offset + size))
                       .unwrap_or(&[])
                       .to_vec();

    if chunk.is_empty() {
      // every block was acked; the server's verdict rides on this ack
      let resp = Resp { code: msg.code,
                        content_format: msg.content_format(),
                        payload: msg.payload.0 };
      self.finish(tx, Ok(resp));
      return Ok(());
    }

    let more = !(chunk.len() < size || offset + size == payload.len());
    let num = block.num() + 1;

    let Some(next_block) = Block::new(num, more, self.config.block_szx) else {
      self.finish(tx, Err(Fail::InvalidPdu));
      return Ok(());
    };

    let id = msg.id.next();
    let mut next = self.base_msg(&tx, id);
    next.set_block1(next_block);
    next.payload = Payload(chunk);

    tx.id = id;
    tx.next_block = num;

    let Some(addr) = tx.endpoint else {
      self.active = Some(tx);
      return Ok(());
    };

    log::debug!("sent block #{} successfully, sending #{}", block.num(), num);
    self.arm_and_send(tx, addr, next)
  }

  /// Advance a Block2 download after a block of the response arrived:
  /// stash the payload and request the next block, or finish if this was
  /// the last one.
  pub(super) fn block2_advance(&mut self,
                               mut tx: Transaction<Clk>,
                               msg: Message)
                               -> Result<(), Error<Sock::Error>> {
    let Some(block) = msg.block2() else {
      self.finish(tx, Err(Fail::InvalidPdu));
      return Ok(());
    };

    if block.num() != tx.next_block {
      log::warn!("block2 out of sequence: got #{}, asked for #{}",
                 block.num(),
                 tx.next_block);
      self.finish(tx, Err(Fail::InvalidPdu));
      return Ok(());
    }

    tx.acc.extend_from_slice(&msg.payload.0);

    if !block.more() {
      let resp = Resp { code: msg.code,
                        content_format: msg.content_format(),
                        payload: core::mem::take(&mut tx.acc) };
      self.finish(tx, Ok(resp));
      return Ok(());
    }

    let num = block.num() + 1;
    let Some(next_block) = Block::new(num, false, self.config.block_szx) else {
      self.finish(tx, Err(Fail::InvalidPdu));
      return Ok(());
    };

    let id = msg.id.next();
    let mut next = self.base_msg(&tx, id);
    next.set_block2(next_block);

    tx.id = id;
    tx.next_block = num;

    let Some(addr) = tx.endpoint else {
      self.active = Some(tx);
      return Ok(());
    };

    log::debug!("got block #{}, requesting #{}", block.num(), num);
    self.arm_and_send(tx, addr, next)
  }
}
