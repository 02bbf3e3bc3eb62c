use croak_msg::Type;

/// Request methods
pub mod method;

/// Request URLs
pub mod url;

pub use method::Method;
pub use url::{Url, UrlParseError};

/// A request to be submitted to [`crate::core::Core::submit`].
///
/// Immutable user input: where to send it, how, and what to carry.
/// Everything protocol-level (ids, tokens, options, blocking a large
/// payload) is the core's business, not yours.
///
/// ```
/// use croak::req::Req;
///
/// let mut req = Req::post("coap://192.0.2.1/lily/pads".parse().unwrap());
/// req.set_payload("occupied".bytes());
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Req {
  pub(crate) url: Url,
  pub(crate) method: Method,
  pub(crate) ty: Type,
  pub(crate) content_format: u16,
  pub(crate) payload: Vec<u8>,
}

impl Req {
  fn new(method: Method, url: Url) -> Self {
    Self { url,
           method,
           ty: Type::Con,
           content_format: 0,
           payload: Vec::new() }
  }

  /// Creates a new GET request
  pub fn get(url: Url) -> Self {
    Self::new(Method::GET, url)
  }

  /// Creates a new POST request
  pub fn post(url: Url) -> Self {
    Self::new(Method::POST, url)
  }

  /// Creates a new PUT request
  pub fn put(url: Url) -> Self {
    Self::new(Method::PUT, url)
  }

  /// Creates a new DELETE request
  pub fn delete(url: Url) -> Self {
    Self::new(Method::DELETE, url)
  }

  /// Creates a new EMPTY request (a CoAP ping).
  ///
  /// A reachable server answers one of these with RESET, which the
  /// reply surfaces as [`crate::resp::Fail::Reset`].
  pub fn ping(url: Url) -> Self {
    Self::new(Method::EMPTY, url)
  }

  /// Add a payload to this request
  pub fn set_payload<P: IntoIterator<Item = u8>>(&mut self, payload: P) {
    self.payload = payload.into_iter().collect();
  }

  /// Set the Content-Format code sent with POST/PUT payloads.
  ///
  /// Defaults to 0 (text/plain).
  pub fn set_content_format(&mut self, format: u16) {
    self.content_format = format;
  }

  /// Send this request non-confirmably: one datagram, no retransmission,
  /// and the reply completes as soon as it leaves.
  pub fn non_confirmable(mut self) -> Self {
    self.ty = Type::Non;
    self
  }

  /// The URL this request is addressed to
  pub fn url(&self) -> &Url {
    &self.url
  }

  /// This request's method
  pub fn method(&self) -> Method {
    self.method
  }

  /// Get the payload's raw bytes
  pub fn payload(&self) -> &[u8] {
    &self.payload
  }
}
