#![allow(dead_code)]

use std::net::IpAddr;
use std::sync::{Arc, Mutex};

use embedded_time::rate::Fraction;
use embedded_time::Instant;

use crate::net::{Addrd, Socket};
use crate::resolve::Resolve;

/// A clock the test advances by hand (ticks are milliseconds).
///
/// Clones share the same underlying time, so tests keep one clone and
/// hand the other to the core under test.
#[derive(Clone, Debug, Default)]
pub struct ClockMock(Arc<Mutex<u64>>);

impl ClockMock {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn set(&self, millis: u64) {
    *self.0.lock().unwrap() = millis;
  }
}

impl embedded_time::Clock for ClockMock {
  type T = u64;

  const SCALING_FACTOR: Fraction = Fraction::new(1, 1_000);

  fn try_now(&self) -> Result<Instant<Self>, embedded_time::clock::Error> {
    Ok(Instant::new(*self.0.lock().unwrap()))
  }
}

/// A mocked socket
#[derive(Debug, Default)]
pub struct SockMock {
  /// Inbound bytes from remote sockets. Address represents the sender
  pub rx: Arc<Mutex<Vec<Addrd<Vec<u8>>>>>,
  /// Outbound bytes to remote sockets. Address represents the destination
  pub tx: Arc<Mutex<Vec<Addrd<Vec<u8>>>>>,
}

impl SockMock {
  pub fn new() -> Self {
    Self::default()
  }
}

impl Socket for SockMock {
  type Error = ();

  fn send(&self, buf: Addrd<&[u8]>) -> nb::Result<(), Self::Error> {
    self.tx.lock().unwrap().push(buf.map(Vec::from));
    Ok(())
  }

  fn recv(&self, buf: &mut [u8]) -> nb::Result<Addrd<usize>, Self::Error> {
    let mut rx = self.rx.lock().unwrap();

    if rx.is_empty() {
      return Err(nb::Error::WouldBlock);
    }

    let dgram = rx.remove(0);
    dgram.data().iter().enumerate().for_each(|(ix, byte)| buf[ix] = *byte);

    Ok(dgram.map(|bytes| bytes.len()))
  }
}

/// [`Resolve`] backed by a static table.
///
/// Hosts that parse as IP address literals resolve to themselves; any
/// other host not in the table fails the lookup.
#[derive(Debug, Default)]
pub struct ResolverMock(pub Vec<(&'static str, IpAddr)>);

impl Resolve for ResolverMock {
  type Error = ();

  fn resolve(&self, host: &str) -> Result<IpAddr, Self::Error> {
    if let Ok(ip) = host.parse::<IpAddr>() {
      return Ok(ip);
    }

    self.0
        .iter()
        .find(|(h, _)| *h == host)
        .map(|(_, ip)| *ip)
        .ok_or(())
  }
}
