use std::io;
use std::net::{IpAddr, ToSocketAddrs, UdpSocket};

use embedded_time::rate::Fraction;

use crate::net::{Addrd, Socket};
use crate::resolve::Resolve;

/// Implement [`embedded_time::Clock`] using [`std::time`] primitives
#[derive(Debug, Clone, Copy)]
pub struct Clock(std::time::Instant);

impl Default for Clock {
  fn default() -> Self {
    Self::new()
  }
}

impl Clock {
  /// Create a new clock; its epoch is the moment of creation
  pub fn new() -> Self {
    Self(std::time::Instant::now())
  }
}

impl embedded_time::Clock for Clock {
  type T = u64;

  // nanoseconds
  const SCALING_FACTOR: Fraction = Fraction::new(1, 1_000_000_000);

  fn try_now(&self) -> Result<embedded_time::Instant<Self>, embedded_time::clock::Error> {
    let elapsed = std::time::Instant::now().duration_since(self.0);
    Ok(embedded_time::Instant::new(elapsed.as_nanos() as u64))
  }
}

impl Socket for UdpSocket {
  type Error = io::Error;

  fn send(&self, msg: Addrd<&[u8]>) -> nb::Result<(), Self::Error> {
    self.set_nonblocking(true)
        .and_then(|_| UdpSocket::send_to(self, msg.data(), msg.addr()))
        .map(|_| ())
        .map_err(io_to_nb)
  }

  fn recv(&self, buffer: &mut [u8]) -> nb::Result<Addrd<usize>, Self::Error> {
    self.set_nonblocking(true)
        .and_then(|_| UdpSocket::recv_from(self, buffer))
        .map(|(n, addr)| Addrd(n, addr))
        .map_err(io_to_nb)
  }
}

fn io_to_nb(err: io::Error) -> nb::Error<io::Error> {
  match err.kind() {
    | io::ErrorKind::WouldBlock => nb::Error::WouldBlock,
    | _ => nb::Error::Other(err),
  }
}

/// [`Resolve`] backed by the platform resolver.
///
/// Hosts that already parse as IP address literals resolve to themselves
/// without a lookup.
#[derive(Debug, Clone, Copy, Default)]
pub struct Resolver;

impl Resolve for Resolver {
  type Error = io::Error;

  fn resolve(&self, host: &str) -> Result<IpAddr, Self::Error> {
    if let Ok(ip) = host.parse::<IpAddr>() {
      return Ok(ip);
    }

    (host, 0u16).to_socket_addrs()?
                .next()
                .map(|addr| addr.ip())
                .ok_or_else(|| {
                  io::Error::new(io::ErrorKind::NotFound, "host lookup yielded no addresses")
                })
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn address_literals_skip_lookup() {
    assert_eq!(Resolver.resolve("192.0.2.1").unwrap(),
               "192.0.2.1".parse::<IpAddr>().unwrap());
    assert_eq!(Resolver.resolve("2001:db8::1").unwrap(),
               "2001:db8::1".parse::<IpAddr>().unwrap());
  }

  #[test]
  fn clock_is_monotonic() {
    use embedded_time::Clock as _;

    let clock = Clock::new();
    let a = clock.try_now().unwrap();
    let b = clock.try_now().unwrap();
    assert!(b >= a);
  }
}
