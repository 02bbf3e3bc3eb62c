use std::net::IpAddr;

/// Host name resolution, as consumed by the client core.
///
/// The core invokes this exactly once per transaction start, before the
/// first datagram goes out. Failures surface to the caller as
/// [`crate::resp::Fail::HostNotFound`].
///
/// A std implementation backed by the platform resolver lives at
/// [`crate::sys::Resolver`].
pub trait Resolve {
  /// The error yielded by a failed lookup
  type Error: core::fmt::Debug;

  /// Resolve a host name to an address
  fn resolve(&self, host: &str) -> Result<IpAddr, Self::Error>;
}
