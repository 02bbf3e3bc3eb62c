use std::collections::VecDeque;
use std::net::SocketAddr;

use croak_msg::{Id, Token};
use rand::{Rng, RngCore, SeedableRng};
use rand_chacha::ChaCha8Rng;

use crate::config::Config;
use crate::net::Socket;
use crate::req::Req;
use crate::resolve::Resolve;
use crate::resp::{Fail, Reply};
use crate::retry::RetryTimer;
use crate::time::{Clock, Millis};

/// Operational errors
pub mod error;

mod inbound;
mod outbound;

use error::Error;

/// The mutable per-request record: everything the core needs to drive
/// one request from submission to its terminal state.
pub(crate) struct Transaction<Clk: Clock> {
  pub(crate) req: Req,
  pub(crate) token: Token,
  pub(crate) id: Id,
  /// Resolved address; `None` until the transaction starts
  pub(crate) endpoint: Option<SocketAddr>,
  /// Whether the initial PDU carried a Uri-Host option (i.e. the URL
  /// host had to be looked up); block follow-ups re-add it when set
  pub(crate) host_opt: bool,
  /// The exact bytes most recently sent, kept for retransmission
  pub(crate) last_dgram: Vec<u8>,
  /// Armed while a CON send awaits acknowledgement
  pub(crate) retry: Option<RetryTimer<Clk>>,
  /// Response payload accumulated across Block2 exchanges
  pub(crate) acc: Vec<u8>,
  /// Block1: the block number most recently sent.
  /// Block2: the block number most recently requested.
  pub(crate) next_block: u32,
}

impl<Clk: Clock> Transaction<Clk> {
  fn new(req: Req, token: Token) -> Self {
    Self { req,
           token,
           id: Id(0),
           endpoint: None,
           host_opt: false,
           last_dgram: Vec::new(),
           retry: None,
           acc: Vec::new(),
           next_block: 0 }
  }
}

/// A client-side CoAP runtime: a single-in-flight request dispatcher
/// over one UDP socket.
///
/// At most one transaction is active at any instant; requests submitted
/// while one is in flight wait in a FIFO queue. The active transaction
/// owns the retransmission timer, and block-wise transfers
/// (RFC7959) are driven transparently: large request payloads go out in
/// Block1 chunks, large response payloads are reassembled from Block2
/// chunks, and the reply the caller sees is the whole thing.
///
/// The core never blocks: [`Core::poll_reply`] does a bounded amount of
/// work (start queued requests, drain the socket, run the retry timer)
/// and yields `nb::Error::WouldBlock` until the polled request reaches a
/// terminal state.
///
/// ```no_run
/// use croak::config::Config;
/// use croak::core::Core;
/// use croak::req::Req;
/// use croak::sys;
///
/// let sock = std::net::UdpSocket::bind("0.0.0.0:0").unwrap();
/// let mut core = Core::new(Config::default(), sys::Clock::new(), sock, sys::Resolver);
///
/// let token = core.submit(Req::get("coap://192.0.2.1/hello".parse().unwrap()))
///                 .unwrap();
///
/// match nb::block!(core.poll_reply(token)).unwrap() {
///   | Ok(resp) => println!("{}: {:?}", resp.code(), resp.payload_string()),
///   | Err(fail) => eprintln!("request failed: {:?}", fail),
/// }
/// ```
#[allow(missing_debug_implementations)]
pub struct Core<Clk: Clock, Sock: Socket, R: Resolve> {
  pub(crate) config: Config,
  pub(crate) clock: Clk,
  pub(crate) sock: Sock,
  pub(crate) resolver: R,
  rng: ChaCha8Rng,
  /// The one transaction allowed on the wire right now
  active: Option<Transaction<Clk>>,
  /// Submitted transactions waiting for the active slot, oldest first
  queue: VecDeque<Transaction<Clk>>,
  /// Terminal replies awaiting pickup by their callers
  done: Vec<(Token, Reply)>,
  /// Id of the most recently finished transaction; a fresh transaction
  /// must not reuse it
  last_id: Option<u16>,
}

impl<Clk, Sock, R> Core<Clk, Sock, R>
  where Clk: Clock,
        Sock: Socket,
        R: Resolve
{
  /// Create a new core over a socket, clock and resolver.
  pub fn new(config: Config, clock: Clk, sock: Sock, resolver: R) -> Self {
    let seed = clock.try_now()
                    .ok()
                    .and_then(|now| Millis::try_from(now.duration_since_epoch()).ok())
                    .map(|ms| ms.0)
                    .unwrap_or(0);

    Self { config,
           clock,
           sock,
           resolver,
           rng: ChaCha8Rng::seed_from_u64(seed),
           active: None,
           queue: VecDeque::new(),
           done: Vec::new(),
           last_id: None }
  }

  /// Submit a request, yielding the token that identifies its reply.
  ///
  /// The request starts immediately when nothing is in flight, and is
  /// queued behind the active transaction otherwise. A URL whose scheme
  /// is not `coap` finishes synchronously as
  /// [`Fail::SchemeNotCoap`] without touching the dispatcher.
  pub fn submit(&mut self, req: Req) -> Result<Token, Error<Sock::Error>> {
    let token = self.fresh_token();

    if req.url.scheme != "coap" {
      log::warn!("rejecting request with scheme {:?}", req.url.scheme);
      self.done.push((token, Err(Fail::SchemeNotCoap)));
      return Ok(token);
    }

    self.queue.push_back(Transaction::new(req, token));
    self.service()?;

    Ok(token)
  }

  /// Poll for the terminal state of a submitted request.
  ///
  /// Each call starts queued transactions if the active slot is free,
  /// processes every datagram buffered in the socket, and runs the
  /// retransmission timer; `nb::Error::WouldBlock` means "not done yet,
  /// poll again".
  pub fn poll_reply(&mut self, token: Token) -> nb::Result<Reply, Error<Sock::Error>> {
    self.tick().map_err(nb::Error::Other)?;
    self.take_done(token).ok_or(nb::Error::WouldBlock)
  }

  /// Cancel a submitted request.
  ///
  /// A queued request is removed before it ever touches the wire; the
  /// active one stops retransmitting and the next queued request is
  /// promoted. Either way the reply finishes as [`Fail::Cancelled`].
  /// Datagrams already sent stay sent.
  pub fn cancel(&mut self, token: Token) -> Result<(), Error<Sock::Error>> {
    if self.active.as_ref().map(|tx| tx.token == token).unwrap_or(false) {
      if let Some(tx) = self.active.take() {
        log::debug!("cancelling the active request");
        self.finish(tx, Err(Fail::Cancelled));
      }
      self.service()?;
    } else if let Some(ix) = self.queue.iter().position(|tx| tx.token == token) {
      if let Some(tx) = self.queue.remove(ix) {
        self.finish(tx, Err(Fail::Cancelled));
      }
    }

    Ok(())
  }

  fn tick(&mut self) -> Result<(), Error<Sock::Error>> {
    self.service()?;
    self.drain_sock()?;
    self.check_retry()?;
    // finishing may have freed the active slot
    self.service()
  }

  /// Promote queued transactions until one survives its start (or the
  /// queue runs dry); starts that fail synchronously finish their reply
  /// and free the slot again.
  fn service(&mut self) -> Result<(), Error<Sock::Error>> {
    while self.active.is_none() {
      match self.queue.pop_front() {
        | None => break,
        | Some(tx) => {
          self.active = Some(tx);
          self.start_active()?;
        },
      }
    }

    Ok(())
  }

  pub(crate) fn finish(&mut self, tx: Transaction<Clk>, reply: Reply) {
    if tx.endpoint.is_some() {
      self.last_id = Some(tx.id.0);
    }

    match &reply {
      | Ok(resp) => log::debug!("request finished: {}", resp.code()),
      | Err(fail) => log::debug!("request failed: {:?}", fail),
    }

    self.done.push((tx.token, reply));
  }

  fn take_done(&mut self, token: Token) -> Option<Reply> {
    self.done
        .iter()
        .position(|(t, _)| *t == token)
        .map(|ix| self.done.swap_remove(ix).1)
  }

  fn fresh_token(&mut self) -> Token {
    let mut bytes = [0u8; 4];
    self.rng.fill_bytes(&mut bytes);
    Token::from_bytes(&bytes)
  }

  pub(crate) fn fresh_id(&mut self) -> Id {
    let id = Id(self.rng.gen());
    match self.last_id {
      | Some(last) if last == id.0 => id.next(),
      | _ => id,
    }
  }
}
